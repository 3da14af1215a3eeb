//! The main entry point of the crate: resolve a free-text Chinese place name
//! and return a full day of weather for it, served from cache when possible
//! and degraded gracefully when upstream data is unavailable.

use crate::acquisition::interpolate::expand_day;
use crate::acquisition::open_meteo::OpenMeteoClient;
use crate::acquisition::router::{ForecastRouter, TierData};
use crate::acquisition::{today, UpstreamWeatherClient};
use crate::cache::{CacheKey, TieredCache};
use crate::divisions::dataset::load_units;
use crate::divisions::index::DivisionIndex;
use crate::divisions::matcher::PlaceMatcher;
use crate::error::TianqiError;
use crate::types::weather::{CachedForecast, ForecastTier, WeatherResult, WeatherSource};
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::NaiveDate;
use log::warn;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The main client for place resolution and weather acquisition.
///
/// Holds the loaded division index, the two-level forecast cache, and the
/// acquisition router. Construct one with [`Tianqi::new`] (default cache
/// directory) or [`Tianqi::with_cache_folder`], then call
/// [`Tianqi::get_weather`].
///
/// # Examples
///
/// ```rust
/// # use tianqi::{Tianqi, TianqiError};
/// # use chrono::NaiveDate;
/// # use std::path::PathBuf;
/// # async fn run() -> Result<(), TianqiError> {
/// let client = Tianqi::new(PathBuf::from("data/divisions.json.gz")).await?;
/// let weather = client
///     .get_weather()
///     .query("杭州市余杭区")
///     .date(NaiveDate::from_ymd_opt(2026, 8, 29).unwrap())
///     .call()
///     .await?;
/// println!("{} at 14:00: {:.1}°C", weather.location.unit.name, weather.hourly[14].temperature);
/// # Ok(())
/// # }
/// ```
pub struct Tianqi {
    matcher: PlaceMatcher,
    cache: TieredCache,
    router: ForecastRouter,
}

#[bon]
impl Tianqi {
    /// Creates a client with an explicit cache directory.
    ///
    /// The directory is created if missing and holds both the division
    /// snapshot and the file tier of the forecast cache.
    ///
    /// # Errors
    ///
    /// Returns [`TianqiError::CacheDirCreation`] if the directory cannot be
    /// created, and [`TianqiError::Division`] variants if the dataset at
    /// `dataset_path` cannot be loaded.
    pub async fn with_cache_folder(
        dataset_path: PathBuf,
        cache_folder: PathBuf,
    ) -> Result<Self, TianqiError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| TianqiError::CacheDirCreation(cache_folder.clone(), e))?;

        let units = load_units(&dataset_path, &cache_folder).await?;
        let index = Arc::new(DivisionIndex::new(units));
        let router = ForecastRouter::builder()
            .client(Arc::new(OpenMeteoClient::new()) as Arc<dyn UpstreamWeatherClient>)
            .build();

        Ok(Self::from_parts(
            PlaceMatcher::new(index),
            TieredCache::new(&cache_folder),
            router,
        ))
    }

    /// Creates a client using the default cache directory, resolved through
    /// the `dirs` crate (e.g. `~/.cache/tianqi_cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`TianqiError::CacheDirResolution`] if no cache directory can
    /// be determined, plus the errors of [`Tianqi::with_cache_folder`].
    pub async fn new(dataset_path: PathBuf) -> Result<Self, TianqiError> {
        let cache_folder = get_cache_dir().map_err(TianqiError::CacheDirResolution)?;
        Self::with_cache_folder(dataset_path, cache_folder).await
    }

    /// Assembles a client from already-built parts. This is the injection
    /// seam: swap the router's upstream client or point the cache at a
    /// temporary directory without touching the network or home directory.
    pub fn from_parts(matcher: PlaceMatcher, cache: TieredCache, router: ForecastRouter) -> Self {
        Self {
            matcher,
            cache,
            router,
        }
    }

    /// Resolves `query` and returns 24 hour points of weather for `date`.
    ///
    /// The target date's distance from today picks the acquisition tier
    /// (hourly up to 3 days out, daily aggregates up to 7, simulation
    /// beyond); failures degrade down that ladder, so this method only errors
    /// on resolution, never on acquisition. Results are cached per division,
    /// date and tier.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.query(&str)`: **Required.** Free-text place name, e.g. "余杭区",
    ///   "浙江省杭州市余杭区", "hangzhou".
    /// * `.date(NaiveDate)`: **Required.** The calendar day to forecast.
    /// * `.deadline(Duration)`: Optional. Upper bound on acquisition time;
    ///   when it elapses the result falls back to simulation instead of
    ///   blocking.
    ///
    /// # Errors
    ///
    /// Returns [`TianqiError::Resolve`] when no division matches `query` with
    /// sufficient confidence.
    #[builder]
    pub async fn get_weather(
        &self,
        query: &str,
        date: NaiveDate,
        deadline: Option<Duration>,
    ) -> Result<WeatherResult, TianqiError> {
        let location = self.matcher.resolve(query)?;
        // Dates are interpreted in the provider timezone, matching the
        // timestamps of the payloads.
        let today = today();
        let scheduled = ForecastTier::for_days_ahead((date - today).num_days());
        let key = CacheKey::new(&location.unit.code, date, scheduled);

        if let Some(stored) = self.cache.get(&key).await {
            return Ok(WeatherResult {
                confidence: location.confidence * stored.confidence,
                location,
                date,
                hourly: stored.hourly,
                source: WeatherSource::Cache,
                cached: true,
            });
        }

        let acquisition = self.router.acquire_from(&location.unit, date, today);
        let acquired = match deadline {
            Some(limit) => match tokio::time::timeout(limit, acquisition).await {
                Ok(acquired) => acquired,
                Err(_) => {
                    warn!(
                        "acquisition deadline of {limit:?} elapsed for '{query}', simulating"
                    );
                    self.router.simulate(&location.unit, date, scheduled)
                }
            },
            None => acquisition.await,
        };

        let hourly = match acquired.data {
            TierData::Hourly(points) => points,
            TierData::Daily(summary) => expand_day(&summary),
            TierData::Simulated(points) => points,
        };

        let stored = CachedForecast {
            tier: acquired.tier,
            confidence: acquired.confidence,
            hourly: hourly.clone(),
        };
        self.cache
            .set(&key, &stored, cache_ttl(scheduled, acquired.tier))
            .await;

        Ok(WeatherResult {
            confidence: location.confidence * acquired.confidence,
            location,
            date,
            hourly,
            source: acquired.tier.into(),
            cached: false,
        })
    }
}

/// TTL for a freshly acquired entry. Degraded data never outlives the TTL of
/// the tier the date scheduled, so an upstream outage on a near date is
/// retried as soon as the scheduled tier's entry would have gone stale.
fn cache_ttl(scheduled: ForecastTier, actual: ForecastTier) -> Duration {
    actual.ttl().min(scheduled.ttl())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::client::testing::{Failure, ScriptedClient};
    use crate::divisions::error::ResolveError;
    use crate::divisions::testing::sample_index;
    use crate::types::location::MatchStrategy;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn client_with(upstream: ScriptedClient) -> (Arc<ScriptedClient>, Tianqi, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let upstream = Arc::new(upstream);
        let router = ForecastRouter::builder()
            .client(upstream.clone() as Arc<dyn UpstreamWeatherClient>)
            .backoff_base(Duration::from_millis(1))
            .build();
        let tianqi = Tianqi::from_parts(
            PlaceMatcher::new(sample_index()),
            TieredCache::new(dir.path()),
            router,
        );
        (upstream, tianqi, dir)
    }

    #[tokio::test]
    async fn resolves_and_returns_a_full_day() {
        let (_upstream, tianqi, _dir) = client_with(ScriptedClient::healthy());
        let today = today();

        let weather = tianqi
            .get_weather()
            .query("杭州市余杭区")
            .date(today)
            .call()
            .await
            .unwrap();

        assert_eq!(weather.location.unit.code, "330110");
        assert_eq!(weather.location.strategy, MatchStrategy::Hierarchical);
        assert_eq!(weather.hourly.len(), 24);
        assert_eq!(weather.source, WeatherSource::Hourly);
        assert!(!weather.cached);
        assert!((weather.confidence - 0.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn repeated_queries_are_served_from_cache() {
        let (upstream, tianqi, _dir) = client_with(ScriptedClient::healthy());
        let today = today();

        let first = tianqi
            .get_weather()
            .query("余杭区")
            .date(today)
            .call()
            .await
            .unwrap();
        let second = tianqi
            .get_weather()
            .query("余杭区")
            .date(today)
            .call()
            .await
            .unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.source, WeatherSource::Cache);
        assert_eq!(second.hourly, first.hourly);
        assert_eq!(upstream.hourly_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_queries_for_one_division_share_a_cache_entry() {
        let (upstream, tianqi, _dir) = client_with(ScriptedClient::healthy());
        let today = today();

        tianqi
            .get_weather()
            .query("余杭区")
            .date(today)
            .call()
            .await
            .unwrap();
        let via_compound = tianqi
            .get_weather()
            .query("杭州市余杭区")
            .date(today)
            .call()
            .await
            .unwrap();

        assert!(via_compound.cached);
        assert_eq!(upstream.hourly_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_places_are_an_error() {
        let (_upstream, tianqi, _dir) = client_with(ScriptedClient::healthy());
        let today = today();

        let result = tianqi
            .get_weather()
            .query("不存在的地方")
            .date(today)
            .call()
            .await;

        assert!(matches!(
            result,
            Err(TianqiError::Resolve(ResolveError::PlaceNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn upstream_outage_degrades_to_simulation() {
        let (_upstream, tianqi, _dir) =
            client_with(ScriptedClient::new(Failure::Payload, Failure::Payload));
        let today = today();

        let weather = tianqi
            .get_weather()
            .query("西湖区")
            .date(today)
            .call()
            .await
            .unwrap();

        assert_eq!(weather.source, WeatherSource::Simulation);
        assert_eq!(weather.hourly.len(), 24);
        assert!(weather.confidence < 0.7);
    }

    #[tokio::test]
    async fn daily_tier_results_are_expanded_to_hours() {
        let (_upstream, tianqi, _dir) = client_with(ScriptedClient::healthy());
        let today = today();
        let date = today + chrono::Duration::days(5);

        let weather = tianqi
            .get_weather()
            .query("临安区")
            .date(date)
            .call()
            .await
            .unwrap();

        assert_eq!(weather.source, WeatherSource::Daily);
        assert_eq!(weather.hourly.len(), 24);
        // ScriptedClient days run 18 to 28 degrees; the expanded extremes
        // must land on the diurnal min and max hours.
        assert!((weather.hourly[6].temperature - 18.0).abs() < 1e-9);
        assert!((weather.hourly[14].temperature - 28.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn approximate_matches_carry_reduced_confidence() {
        let (_upstream, tianqi, _dir) = client_with(ScriptedClient::healthy());
        let today = today();

        // 河桥镇 is not in the index; its parent 临安区 is.
        let weather = tianqi
            .get_weather()
            .query("临安区河桥镇")
            .date(today)
            .call()
            .await
            .unwrap();

        assert_eq!(weather.location.unit.code, "330112");
        assert!(weather.location.approximate);
        assert!(weather.confidence < 0.95);
    }

    #[tokio::test]
    async fn deadline_expiry_falls_back_to_simulation() {
        let (upstream, tianqi, _dir) =
            client_with(ScriptedClient::new(Failure::Stall, Failure::Stall));
        let today = today();

        let weather = tianqi
            .get_weather()
            .query("余杭区")
            .date(today)
            .deadline(Duration::from_millis(50))
            .call()
            .await
            .unwrap();

        assert_eq!(weather.source, WeatherSource::Simulation);
        assert_eq!(weather.hourly.len(), 24);
        assert!(weather.confidence < 0.7);
        // The stalled upstream was attempted but never answered.
        assert_eq!(upstream.hourly_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn degraded_entries_expire_on_the_scheduled_tier_ttl() {
        assert_eq!(
            cache_ttl(ForecastTier::Hourly, ForecastTier::Simulation),
            ForecastTier::Hourly.ttl()
        );
        assert_eq!(
            cache_ttl(ForecastTier::Daily, ForecastTier::Simulation),
            ForecastTier::Daily.ttl()
        );
        assert_eq!(
            cache_ttl(ForecastTier::Hourly, ForecastTier::Hourly),
            ForecastTier::Hourly.ttl()
        );
        assert_eq!(
            cache_ttl(ForecastTier::Simulation, ForecastTier::Simulation),
            ForecastTier::Simulation.ttl()
        );
    }
}
