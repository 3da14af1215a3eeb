mod acquisition;
mod cache;
mod divisions;
mod error;
mod tianqi;
mod types;
mod utils;

pub use error::TianqiError;
pub use tianqi::*;

pub use acquisition::client::{
    RawDailyPayload, RawDay, RawHour, RawHourlyPayload, UpstreamWeatherClient,
};
pub use acquisition::error::AcquisitionError;
pub use acquisition::open_meteo::OpenMeteoClient;
pub use acquisition::router::{Acquired, ForecastRouter, TierData};

pub use cache::error::CacheError;
pub use cache::{CacheKey, TieredCache};

pub use divisions::dataset::load_units;
pub use divisions::error::{DivisionError, ResolveError};
pub use divisions::index::DivisionIndex;
pub use divisions::matcher::PlaceMatcher;

pub use types::division::{AdministrativeUnit, DivisionLevel, LatLon};
pub use types::location::{LocationInfo, MatchStrategy};
pub use types::weather::{
    CachedForecast, DailySummary, ForecastTier, HourPoint, WeatherResult, WeatherSource,
};
pub use types::weather_condition::WeatherCondition;
