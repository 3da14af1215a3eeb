//! Production [`UpstreamWeatherClient`] backed by the Open-Meteo forecast
//! API. All wire-format knowledge (field names, WMO codes, timestamp
//! formats) stays inside this module.

use crate::acquisition::client::{
    RawDailyPayload, RawDay, RawHour, RawHourlyPayload, UpstreamWeatherClient,
};
use crate::acquisition::error::AcquisitionError;
use crate::types::division::LatLon;
use crate::types::weather_condition::WeatherCondition;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use reqwest::Client;
use serde::Deserialize;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code";
const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,wind_speed_10m_mean,relative_humidity_2m_mean,weather_code";
const TIMEZONE: &str = "Asia/Shanghai";
const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub struct OpenMeteoClient {
    http: Client,
    endpoint: String,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_endpoint(FORECAST_URL)
    }

    /// Points the client at a different forecast endpoint. Used by tests to
    /// talk to a local mock server.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn fetch_json(&self, query: &[(&str, String)]) -> Result<String, AcquisitionError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| AcquisitionError::NetworkRequest(self.endpoint.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    AcquisitionError::HttpStatus {
                        url: self.endpoint.clone(),
                        status,
                        source: e,
                    }
                } else {
                    AcquisitionError::NetworkRequest(self.endpoint.clone(), e)
                });
            }
        };

        response
            .text()
            .await
            .map_err(|e| AcquisitionError::NetworkRequest(self.endpoint.clone(), e))
    }
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    relative_humidity_2m: Vec<f64>,
    wind_speed_10m: Vec<f64>,
    weather_code: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    wind_speed_10m_mean: Vec<f64>,
    relative_humidity_2m_mean: Vec<f64>,
    weather_code: Vec<u8>,
}

impl HourlyBlock {
    fn into_payload(self) -> Result<RawHourlyPayload, AcquisitionError> {
        let len = self.time.len();
        if self.temperature_2m.len() != len
            || self.relative_humidity_2m.len() != len
            || self.wind_speed_10m.len() != len
            || self.weather_code.len() != len
        {
            return Err(AcquisitionError::Payload(
                "hourly arrays have mismatched lengths".to_string(),
            ));
        }
        let mut hours = Vec::with_capacity(len);
        for i in 0..len {
            let time = NaiveDateTime::parse_from_str(&self.time[i], HOURLY_TIME_FORMAT)
                .map_err(|e| {
                    AcquisitionError::Payload(format!(
                        "bad hourly timestamp '{}': {e}",
                        self.time[i]
                    ))
                })?;
            hours.push(RawHour {
                time,
                temperature: self.temperature_2m[i],
                humidity: self.relative_humidity_2m[i],
                wind_speed: self.wind_speed_10m[i],
                condition: WeatherCondition::from_wmo_code(self.weather_code[i]),
            });
        }
        Ok(RawHourlyPayload { hours })
    }
}

impl DailyBlock {
    fn into_payload(self) -> Result<RawDailyPayload, AcquisitionError> {
        let len = self.time.len();
        if self.temperature_2m_max.len() != len
            || self.temperature_2m_min.len() != len
            || self.wind_speed_10m_mean.len() != len
            || self.relative_humidity_2m_mean.len() != len
            || self.weather_code.len() != len
        {
            return Err(AcquisitionError::Payload(
                "daily arrays have mismatched lengths".to_string(),
            ));
        }
        let mut days = Vec::with_capacity(len);
        for i in 0..len {
            let date = NaiveDate::parse_from_str(&self.time[i], "%Y-%m-%d").map_err(|e| {
                AcquisitionError::Payload(format!("bad daily date '{}': {e}", self.time[i]))
            })?;
            days.push(RawDay {
                date,
                temp_max: self.temperature_2m_max[i],
                temp_min: self.temperature_2m_min[i],
                mean_wind: self.wind_speed_10m_mean[i],
                mean_humidity: self.relative_humidity_2m_mean[i],
                condition: WeatherCondition::from_wmo_code(self.weather_code[i]),
            });
        }
        Ok(RawDailyPayload { days })
    }
}

#[async_trait]
impl UpstreamWeatherClient for OpenMeteoClient {
    async fn get_hourly(
        &self,
        coord: LatLon,
        hours: u32,
    ) -> Result<RawHourlyPayload, AcquisitionError> {
        let forecast_days = hours.div_ceil(24).clamp(1, 16);
        info!(
            "requesting {hours}h of hourly forecast at ({}, {})",
            coord.0, coord.1
        );
        let body = self
            .fetch_json(&[
                ("latitude", coord.0.to_string()),
                ("longitude", coord.1.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("forecast_days", forecast_days.to_string()),
                ("timezone", TIMEZONE.to_string()),
            ])
            .await?;
        let response: HourlyResponse = serde_json::from_str(&body)?;
        response.hourly.into_payload()
    }

    async fn get_daily(
        &self,
        coord: LatLon,
        days: u32,
    ) -> Result<RawDailyPayload, AcquisitionError> {
        let forecast_days = days.clamp(1, 16);
        info!(
            "requesting {days}d of daily forecast at ({}, {})",
            coord.0, coord.1
        );
        let body = self
            .fetch_json(&[
                ("latitude", coord.0.to_string()),
                ("longitude", coord.1.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("forecast_days", forecast_days.to_string()),
                ("timezone", TIMEZONE.to_string()),
            ])
            .await?;
        let response: DailyResponse = serde_json::from_str(&body)?;
        response.daily.into_payload()
    }
}
