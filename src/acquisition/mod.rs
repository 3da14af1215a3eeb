pub mod client;
pub mod error;
pub mod interpolate;
pub mod open_meteo;
pub mod router;
pub mod simulate;

pub use client::UpstreamWeatherClient;
pub use open_meteo::OpenMeteoClient;
pub use router::ForecastRouter;

use chrono::{NaiveDate, TimeDelta, Utc};

/// The current date in China Standard Time (UTC+8), the timezone upstream
/// forecasts are requested in. Tier selection and payload filtering must use
/// this date, not the host's local date; a host west of UTC+8 would otherwise
/// ask for "today" hours the provider no longer reports.
pub fn today() -> NaiveDate {
    (Utc::now() + TimeDelta::hours(8)).date_naive()
}
