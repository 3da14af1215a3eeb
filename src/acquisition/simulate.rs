//! Deterministic climatological fallback.
//!
//! When every live tier has failed, or the requested date is beyond any
//! forecast horizon, a simulated day is synthesised from seasonal baselines
//! keyed by the province prefix of the division code. The output depends
//! only on the division and the date, so repeated calls agree.

use crate::acquisition::interpolate::expand_day;
use crate::types::division::AdministrativeUnit;
use crate::types::weather::{DailySummary, HourPoint};
use crate::types::weather_condition::WeatherCondition;
use chrono::{Datelike, NaiveDate};
use log::debug;

/// Confidence reported when a province baseline backs the simulation.
const BASELINE_CONFIDENCE: f64 = 0.6;
/// Confidence reported when only the latitude fallback is available.
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Typical conditions for one season in one region.
#[derive(Debug, Clone, Copy)]
struct SeasonBaseline {
    temp_max: f64,
    temp_min: f64,
    mean_wind: f64,
    mean_humidity: f64,
    condition: WeatherCondition,
}

const fn season(
    temp_max: f64,
    temp_min: f64,
    mean_wind: f64,
    mean_humidity: f64,
    condition: WeatherCondition,
) -> SeasonBaseline {
    SeasonBaseline {
        temp_max,
        temp_min,
        mean_wind,
        mean_humidity,
        condition,
    }
}

/// Seasonal baselines per province code prefix, ordered winter, spring,
/// summer, autumn.
const PROVINCE_BASELINES: &[(&str, [SeasonBaseline; 4])] = &[
    // Beijing
    ("11", [
        season(2.0, -8.0, 10.0, 40.0, WeatherCondition::Clear),
        season(20.0, 7.0, 14.0, 45.0, WeatherCondition::PartlyCloudy),
        season(31.0, 21.0, 9.0, 70.0, WeatherCondition::Thunderstorm),
        season(19.0, 7.0, 10.0, 55.0, WeatherCondition::Clear),
    ]),
    // Heilongjiang
    ("23", [
        season(-12.0, -24.0, 12.0, 70.0, WeatherCondition::Snow),
        season(12.0, -1.0, 16.0, 50.0, WeatherCondition::PartlyCloudy),
        season(27.0, 16.0, 10.0, 75.0, WeatherCondition::RainShower),
        season(10.0, -2.0, 13.0, 60.0, WeatherCondition::Overcast),
    ]),
    // Shanghai
    ("31", [
        season(9.0, 1.0, 13.0, 70.0, WeatherCondition::Overcast),
        season(19.0, 11.0, 14.0, 72.0, WeatherCondition::Drizzle),
        season(33.0, 26.0, 12.0, 80.0, WeatherCondition::Thunderstorm),
        season(22.0, 14.0, 12.0, 70.0, WeatherCondition::PartlyCloudy),
    ]),
    // Zhejiang
    ("33", [
        season(10.0, 2.0, 11.0, 72.0, WeatherCondition::Overcast),
        season(21.0, 12.0, 12.0, 75.0, WeatherCondition::Drizzle),
        season(34.0, 25.0, 10.0, 78.0, WeatherCondition::Thunderstorm),
        season(23.0, 14.0, 11.0, 70.0, WeatherCondition::PartlyCloudy),
    ]),
    // Guangdong
    ("44", [
        season(19.0, 11.0, 12.0, 65.0, WeatherCondition::PartlyCloudy),
        season(27.0, 20.0, 11.0, 82.0, WeatherCondition::RainShower),
        season(33.0, 26.0, 13.0, 83.0, WeatherCondition::Thunderstorm),
        season(28.0, 20.0, 12.0, 70.0, WeatherCondition::Clear),
    ]),
    // Sichuan
    ("51", [
        season(9.0, 3.0, 6.0, 80.0, WeatherCondition::Fog),
        season(22.0, 13.0, 8.0, 75.0, WeatherCondition::Overcast),
        season(30.0, 22.0, 7.0, 82.0, WeatherCondition::Rain),
        season(20.0, 14.0, 6.0, 82.0, WeatherCondition::Drizzle),
    ]),
];

/// A simulated day plus the confidence its origin supports.
#[derive(Debug, Clone)]
pub struct SimulatedDay {
    pub hourly: Vec<HourPoint>,
    pub confidence: f64,
}

#[derive(Debug, Default)]
pub struct Simulator;

impl Simulator {
    pub fn new() -> Self {
        Self
    }

    /// Builds a full simulated day for `unit` on `date`.
    pub fn simulate(&self, unit: &AdministrativeUnit, date: NaiveDate) -> SimulatedDay {
        let season = season_index(date);
        let (baseline, confidence) = match province_baseline(&unit.code, season) {
            Some(baseline) => (baseline, BASELINE_CONFIDENCE),
            None => {
                debug!(
                    "no climate baseline for division {}, falling back to latitude model",
                    unit.code
                );
                (
                    latitude_baseline(unit.coordinate.0, season),
                    FALLBACK_CONFIDENCE,
                )
            }
        };

        let summary = DailySummary {
            temp_max: baseline.temp_max,
            temp_min: baseline.temp_min,
            mean_wind: baseline.mean_wind,
            mean_humidity: baseline.mean_humidity,
            condition: baseline.condition,
        };
        SimulatedDay {
            hourly: expand_day(&summary),
            confidence,
        }
    }
}

/// Meteorological seasons: Dec-Feb winter (0), then spring, summer, autumn.
fn season_index(date: NaiveDate) -> usize {
    match date.month() {
        12 | 1 | 2 => 0,
        3..=5 => 1,
        6..=8 => 2,
        _ => 3,
    }
}

fn province_baseline(code: &str, season: usize) -> Option<SeasonBaseline> {
    let prefix = code.get(0..2)?;
    PROVINCE_BASELINES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, seasons)| seasons[season])
}

/// Crude latitude-driven baseline for provinces without a curated entry.
/// Annual means shrink toward the equator; the seasonal swing grows with
/// latitude.
fn latitude_baseline(latitude: f64, season: usize) -> SeasonBaseline {
    let annual_mean = 28.0 - 0.5 * latitude.abs();
    let swing = 4.0 + 0.4 * latitude.abs();
    let seasonal_shift = match season {
        0 => -swing,
        2 => swing,
        _ => 0.0,
    };
    let mid = annual_mean + seasonal_shift;
    season_baseline_around(mid)
}

fn season_baseline_around(mid: f64) -> SeasonBaseline {
    SeasonBaseline {
        temp_max: mid + 5.0,
        temp_min: mid - 5.0,
        mean_wind: 10.0,
        mean_humidity: 65.0,
        condition: WeatherCondition::PartlyCloudy,
    }
}
