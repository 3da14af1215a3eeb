//! Expansion of daily aggregates into a plausible 24 hour curve.
//!
//! Daily forecasts only carry extremes and means, but callers always receive
//! hour points. The expansion uses a piecewise cosine diurnal cycle with the
//! minimum at 06:00 and the maximum at 14:00, which is where the extremes of
//! a typical day actually sit, so `temp_min` and `temp_max` are reproduced
//! exactly at those hours.

use crate::types::weather::{DailySummary, HourPoint};

const MIN_HOUR: f64 = 6.0;
const MAX_HOUR: f64 = 14.0;
const WIND_SWING: f64 = 0.3;

/// Expands one [`DailySummary`] into 24 [`HourPoint`]s, hours 0 through 23.
pub fn expand_day(day: &DailySummary) -> Vec<HourPoint> {
    let span = day.temp_max - day.temp_min;
    let mean_temp = (day.temp_max + day.temp_min) / 2.0;

    (0..24)
        .map(|hour| {
            let temperature = temperature_at(hour as f64, day.temp_min, span);
            HourPoint {
                hour,
                temperature,
                wind_speed: wind_at(hour as f64, day.mean_wind),
                humidity: humidity_at(temperature, mean_temp, day.mean_humidity),
                condition: day.condition,
            }
        })
        .collect()
}

/// Rising half-cosine from the 06:00 minimum to the 14:00 maximum, falling
/// half-cosine over the remaining 16 hours (wrapping through midnight).
fn temperature_at(hour: f64, temp_min: f64, span: f64) -> f64 {
    use std::f64::consts::PI;
    if (MIN_HOUR..=MAX_HOUR).contains(&hour) {
        let phase = (hour - MIN_HOUR) / (MAX_HOUR - MIN_HOUR);
        temp_min + span * (1.0 - (PI * phase).cos()) / 2.0
    } else {
        let since_peak = if hour > MAX_HOUR {
            hour - MAX_HOUR
        } else {
            hour + 24.0 - MAX_HOUR
        };
        let phase = since_peak / (24.0 - (MAX_HOUR - MIN_HOUR));
        temp_min + span - span * (1.0 - (PI * phase).cos()) / 2.0
    }
}

/// Winds pick up through the afternoon and slacken overnight around the
/// daily mean.
fn wind_at(hour: f64, mean_wind: f64) -> f64 {
    use std::f64::consts::PI;
    (mean_wind * (1.0 + WIND_SWING * (2.0 * PI * (hour - 9.0) / 24.0).sin())).max(0.0)
}

/// Relative humidity moves opposite to temperature, clamped to a valid
/// percentage.
fn humidity_at(temperature: f64, mean_temp: f64, mean_humidity: f64) -> f64 {
    (mean_humidity - 2.0 * (temperature - mean_temp)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::weather_condition::WeatherCondition;

    fn summer_day() -> DailySummary {
        DailySummary {
            temp_max: 31.0,
            temp_min: 22.0,
            mean_wind: 12.0,
            mean_humidity: 70.0,
            condition: WeatherCondition::PartlyCloudy,
        }
    }

    #[test]
    fn produces_a_full_day_of_hours() {
        let hours = expand_day(&summer_day());
        assert_eq!(hours.len(), 24);
        for (i, point) in hours.iter().enumerate() {
            assert_eq!(point.hour, i as u32);
        }
    }

    #[test]
    fn extremes_land_on_their_hours() {
        let day = summer_day();
        let hours = expand_day(&day);
        assert!((hours[6].temperature - day.temp_min).abs() < 1e-9);
        assert!((hours[14].temperature - day.temp_max).abs() < 1e-9);
        for point in &hours {
            assert!(point.temperature >= day.temp_min - 1e-9);
            assert!(point.temperature <= day.temp_max + 1e-9);
        }
    }

    #[test]
    fn overnight_curve_is_continuous_across_midnight() {
        let hours = expand_day(&summer_day());
        // 23:00 to 00:00 is one step on the falling branch, so the jump must
        // stay small.
        let step = (hours[23].temperature - hours[0].temperature).abs();
        assert!(step < 1.0, "midnight discontinuity of {step}");
    }

    #[test]
    fn humidity_stays_a_valid_percentage() {
        let extreme = DailySummary {
            temp_max: 45.0,
            temp_min: 5.0,
            mean_wind: 3.0,
            mean_humidity: 95.0,
            condition: WeatherCondition::Clear,
        };
        for point in expand_day(&extreme) {
            assert!((0.0..=100.0).contains(&point.humidity));
        }
    }

    #[test]
    fn condition_and_wind_sign_are_preserved() {
        let day = summer_day();
        for point in expand_day(&day) {
            assert_eq!(point.condition, day.condition);
            assert!(point.wind_speed >= 0.0);
        }
    }
}
