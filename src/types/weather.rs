//! Forecast value types: acquisition tiers, hourly points, daily aggregates,
//! cached forecasts and the public [`WeatherResult`].

use crate::types::location::LocationInfo;
use crate::types::weather_condition::WeatherCondition;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The fidelity at which forecast data is acquired.
///
/// The tier is chosen from the target date's distance from today and each
/// tier carries its own cache TTL: the closer the date, the fresher the data
/// must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastTier {
    /// Hour-by-hour upstream forecast, for dates up to 3 days out.
    Hourly,
    /// Daily aggregates expanded to hourly points, for dates up to 7 days out.
    Daily,
    /// Locally synthesized data from seasonal baselines, beyond 7 days or
    /// when every upstream tier failed.
    Simulation,
}

impl ForecastTier {
    /// Picks the tier for a date `days_ahead` days from today.
    ///
    /// Boundaries are inclusive: `+3` still routes [`ForecastTier::Hourly`],
    /// `+7` still routes [`ForecastTier::Daily`]. Dates in the past route
    /// `Hourly` as well.
    pub fn for_days_ahead(days_ahead: i64) -> Self {
        if days_ahead <= 3 {
            ForecastTier::Hourly
        } else if days_ahead <= 7 {
            ForecastTier::Daily
        } else {
            ForecastTier::Simulation
        }
    }

    /// Cache time-to-live for data acquired at this tier.
    pub fn ttl(&self) -> Duration {
        match self {
            ForecastTier::Hourly => Duration::from_secs(30 * 60),
            ForecastTier::Daily => Duration::from_secs(2 * 60 * 60),
            ForecastTier::Simulation => Duration::from_secs(24 * 60 * 60),
        }
    }

    pub(crate) fn key_segment(&self) -> &'static str {
        match self {
            ForecastTier::Hourly => "hourly",
            ForecastTier::Daily => "daily",
            ForecastTier::Simulation => "simulation",
        }
    }
}

impl fmt::Display for ForecastTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_segment())
    }
}

/// Provenance of a [`WeatherResult`]: the acquisition tier that produced the
/// data, or [`WeatherSource::Cache`] when the result was served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherSource {
    Hourly,
    Daily,
    Simulation,
    Cache,
}

impl From<ForecastTier> for WeatherSource {
    fn from(tier: ForecastTier) -> Self {
        match tier {
            ForecastTier::Hourly => WeatherSource::Hourly,
            ForecastTier::Daily => WeatherSource::Daily,
            ForecastTier::Simulation => WeatherSource::Simulation,
        }
    }
}

/// One hour of forecast data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourPoint {
    /// Hour of day, `0..=23`.
    pub hour: u32,
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Relative humidity in percent, `0..=100`.
    pub humidity: f64,
    pub condition: WeatherCondition,
}

/// A one-day aggregate, the input of daily-to-hourly interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub temp_max: f64,
    pub temp_min: f64,
    pub mean_wind: f64,
    pub mean_humidity: f64,
    pub condition: WeatherCondition,
}

/// The value stored in the tiered cache: acquisition output stripped of the
/// per-query resolution, so one entry serves every query that resolves to the
/// same division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedForecast {
    /// The tier that actually produced the data (may be lower than the tier
    /// in the cache key when acquisition degraded).
    pub tier: ForecastTier,
    /// Data confidence assigned by the producing tier.
    pub confidence: f64,
    pub hourly: Vec<HourPoint>,
}

/// The single public output of the crate.
///
/// Invariant: `hourly` always holds exactly 24 points, regardless of source.
#[derive(Debug, Clone)]
pub struct WeatherResult {
    pub location: LocationInfo,
    pub date: NaiveDate,
    pub hourly: Vec<HourPoint>,
    pub source: WeatherSource,
    /// Combined resolution and data confidence in `[0, 1]`.
    pub confidence: f64,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(ForecastTier::for_days_ahead(0), ForecastTier::Hourly);
        assert_eq!(ForecastTier::for_days_ahead(3), ForecastTier::Hourly);
        assert_eq!(ForecastTier::for_days_ahead(4), ForecastTier::Daily);
        assert_eq!(ForecastTier::for_days_ahead(7), ForecastTier::Daily);
        assert_eq!(ForecastTier::for_days_ahead(8), ForecastTier::Simulation);
        assert_eq!(ForecastTier::for_days_ahead(-1), ForecastTier::Hourly);
    }

    #[test]
    fn tier_ttls_grow_with_staleness_tolerance() {
        assert!(ForecastTier::Hourly.ttl() < ForecastTier::Daily.ttl());
        assert!(ForecastTier::Daily.ttl() < ForecastTier::Simulation.ttl());
    }
}
