//! Defines the `WeatherCondition` enum, mapping WMO numeric weather codes to
//! descriptive variants.

use serde::{Deserialize, Serialize};

/// A qualitative weather condition label.
///
/// Upstream forecast payloads report WMO 4677 weather codes; these are mapped
/// to variants at the client boundary via [`WeatherCondition::from_wmo_code`]
/// so that nothing past the client needs to know about wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    FreezingRain,
    Snow,
    HeavySnow,
    RainShower,
    SnowShower,
    Thunderstorm,
}

impl WeatherCondition {
    /// Maps a WMO 4677 weather code to a condition label.
    ///
    /// Codes that do not describe a distinct condition (reserved or unused
    /// values) fall back to [`WeatherCondition::Overcast`].
    pub fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1 | 2 => WeatherCondition::PartlyCloudy,
            3 => WeatherCondition::Overcast,
            45 | 48 => WeatherCondition::Fog,
            51..=57 => WeatherCondition::Drizzle,
            61 | 63 => WeatherCondition::Rain,
            65 => WeatherCondition::HeavyRain,
            66 | 67 => WeatherCondition::FreezingRain,
            71 | 73 | 77 => WeatherCondition::Snow,
            75 => WeatherCondition::HeavySnow,
            80..=82 => WeatherCondition::RainShower,
            85 | 86 => WeatherCondition::SnowShower,
            95..=99 => WeatherCondition::Thunderstorm,
            _ => WeatherCondition::Overcast,
        }
    }
}
