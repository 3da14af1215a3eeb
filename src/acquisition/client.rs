//! The upstream weather provider boundary.
//!
//! The router only ever talks to [`UpstreamWeatherClient`]; the provider's
//! wire format is parsed behind this trait and surfaces as the raw payload
//! types below, already carrying condition labels instead of wire codes.

use crate::acquisition::error::AcquisitionError;
use crate::types::division::LatLon;
use crate::types::weather_condition::WeatherCondition;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

/// One upstream hour of forecast data.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHour {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub condition: WeatherCondition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawHourlyPayload {
    pub hours: Vec<RawHour>,
}

/// One upstream day of aggregate forecast data.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDay {
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub mean_wind: f64,
    pub mean_humidity: f64,
    pub condition: WeatherCondition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDailyPayload {
    pub days: Vec<RawDay>,
}

/// The two logical operations the acquisition router needs from a provider.
#[async_trait]
pub trait UpstreamWeatherClient: Send + Sync {
    /// Hour-by-hour forecast for the next `hours` hours at `coord`.
    async fn get_hourly(
        &self,
        coord: LatLon,
        hours: u32,
    ) -> Result<RawHourlyPayload, AcquisitionError>;

    /// Daily aggregates for the next `days` days at `coord`.
    async fn get_daily(
        &self,
        coord: LatLon,
        days: u32,
    ) -> Result<RawDailyPayload, AcquisitionError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted in-process client so degradation and retry behaviour can be
    //! exercised without network access.

    use super::*;
    use crate::acquisition::today;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone, Copy)]
    pub(crate) enum Failure {
        None,
        /// Fails with a retryable timeout error.
        Timeout,
        /// Fails with a non-retryable payload error.
        Payload,
        /// Hangs far longer than any test deadline before answering.
        Stall,
    }

    #[derive(Debug)]
    pub(crate) struct ScriptedClient {
        pub(crate) hourly: Failure,
        pub(crate) daily: Failure,
        pub(crate) hourly_calls: AtomicU32,
        pub(crate) daily_calls: AtomicU32,
    }

    impl ScriptedClient {
        pub(crate) fn new(hourly: Failure, daily: Failure) -> Self {
            Self {
                hourly,
                daily,
                hourly_calls: AtomicU32::new(0),
                daily_calls: AtomicU32::new(0),
            }
        }

        pub(crate) fn healthy() -> Self {
            Self::new(Failure::None, Failure::None)
        }

        async fn respond(mode: Failure) -> Option<AcquisitionError> {
            match mode {
                Failure::None => None,
                Failure::Timeout => Some(AcquisitionError::Timeout(Duration::from_secs(10))),
                Failure::Payload => {
                    Some(AcquisitionError::Payload("scripted failure".to_string()))
                }
                Failure::Stall => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    None
                }
            }
        }
    }

    #[async_trait]
    impl UpstreamWeatherClient for ScriptedClient {
        async fn get_hourly(
            &self,
            _coord: LatLon,
            hours: u32,
        ) -> Result<RawHourlyPayload, AcquisitionError> {
            self.hourly_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(e) = Self::respond(self.hourly).await {
                return Err(e);
            }
            let start = today().and_hms_opt(0, 0, 0).expect("midnight is valid");
            let hours = (0..hours)
                .map(|i| RawHour {
                    time: start + ChronoDuration::hours(i as i64),
                    temperature: 20.0 + (i % 24) as f64 * 0.5,
                    humidity: 60.0,
                    wind_speed: 10.0,
                    condition: WeatherCondition::PartlyCloudy,
                })
                .collect();
            Ok(RawHourlyPayload { hours })
        }

        async fn get_daily(
            &self,
            _coord: LatLon,
            days: u32,
        ) -> Result<RawDailyPayload, AcquisitionError> {
            self.daily_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(e) = Self::respond(self.daily).await {
                return Err(e);
            }
            let today = today();
            let days = (0..days)
                .map(|i| RawDay {
                    date: today + ChronoDuration::days(i as i64),
                    temp_max: 28.0,
                    temp_min: 18.0,
                    mean_wind: 12.0,
                    mean_humidity: 65.0,
                    condition: WeatherCondition::Overcast,
                })
                .collect();
            Ok(RawDailyPayload { days })
        }
    }
}
