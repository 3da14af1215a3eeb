use crate::types::weather::ForecastTier;
use chrono::NaiveDate;
use std::fmt;

/// Identifies one cached forecast: division code + target date + the tier
/// the request was scheduled at. Including the tier keeps entries of
/// different fidelity (and different TTLs) from colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    code: String,
    date: NaiveDate,
    tier: ForecastTier,
}

impl CacheKey {
    pub fn new(code: &str, date: NaiveDate, tier: ForecastTier) -> Self {
        Self {
            code: code.to_string(),
            date,
            tier,
        }
    }

    /// File name of the entry in the file tier. Codes and dates only contain
    /// filesystem-safe characters.
    pub(crate) fn file_name(&self) -> String {
        format!("{}_{}_{}.bin", self.code, self.date, self.tier.key_segment())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.code, self.date, self.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_differ_by_tier() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        let hourly = CacheKey::new("330110", date, ForecastTier::Hourly);
        let daily = CacheKey::new("330110", date, ForecastTier::Daily);
        assert_ne!(hourly, daily);
        assert_ne!(hourly.file_name(), daily.file_name());
        assert_eq!(hourly.file_name(), "330110_2026-08-27_hourly.bin");
    }
}
