//! Tier selection and degradation.
//!
//! The router owns the upstream client and the simulator. Acquisition starts
//! at the tier the target date schedules and walks a fixed ladder downward on
//! failure, so the caller always receives data; only its confidence drops.

use crate::acquisition::client::UpstreamWeatherClient;
use crate::acquisition::error::AcquisitionError;
use crate::acquisition::simulate::Simulator;
use crate::acquisition::today;
use crate::types::division::AdministrativeUnit;
use crate::types::weather::{DailySummary, ForecastTier, HourPoint};
use bon::bon;
use chrono::{NaiveDate, Timelike};
use log::{info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Data confidence of a live hour-by-hour forecast.
const HOURLY_CONFIDENCE: f64 = 0.95;
/// Data confidence of daily aggregates.
const DAILY_CONFIDENCE: f64 = 0.85;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Payload of a successful acquisition, tagged with the tier that produced it.
#[derive(Debug, Clone)]
pub enum TierData {
    Hourly(Vec<HourPoint>),
    Daily(DailySummary),
    Simulated(Vec<HourPoint>),
}

/// The outcome of one acquisition: what was scheduled, what actually
/// delivered, and how much the data is worth.
#[derive(Debug, Clone)]
pub struct Acquired {
    /// Tier the date's distance scheduled.
    pub scheduled: ForecastTier,
    /// Tier that actually produced the data, `<=` scheduled in fidelity.
    pub tier: ForecastTier,
    pub confidence: f64,
    pub data: TierData,
}

pub struct ForecastRouter {
    client: Arc<dyn UpstreamWeatherClient>,
    simulator: Simulator,
    timeout: Duration,
    max_retries: u32,
    backoff_base: Duration,
}

#[bon]
impl ForecastRouter {
    #[builder]
    pub fn new(
        client: Arc<dyn UpstreamWeatherClient>,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
        #[builder(default = DEFAULT_MAX_RETRIES)] max_retries: u32,
        #[builder(default = DEFAULT_BACKOFF_BASE)] backoff_base: Duration,
    ) -> Self {
        Self {
            client,
            simulator: Simulator::new(),
            timeout,
            max_retries,
            backoff_base,
        }
    }
}

impl ForecastRouter {
    /// The tiers tried, in order, when acquisition starts at `start`.
    /// Degradation only ever moves toward lower fidelity and always ends at
    /// simulation, which cannot fail.
    pub fn degradation_ladder(start: ForecastTier) -> &'static [ForecastTier] {
        match start {
            ForecastTier::Hourly => &[
                ForecastTier::Hourly,
                ForecastTier::Daily,
                ForecastTier::Simulation,
            ],
            ForecastTier::Daily => &[ForecastTier::Daily, ForecastTier::Simulation],
            ForecastTier::Simulation => &[ForecastTier::Simulation],
        }
    }

    /// Acquires forecast data for `unit` on `date`, relative to the current
    /// date in the provider timezone.
    pub async fn acquire(&self, unit: &AdministrativeUnit, date: NaiveDate) -> Acquired {
        self.acquire_from(unit, date, today()).await
    }

    /// Like [`ForecastRouter::acquire`] with an explicit "today", so tier
    /// selection is reproducible.
    pub async fn acquire_from(
        &self,
        unit: &AdministrativeUnit,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Acquired {
        let days_ahead = (date - today).num_days();
        let scheduled = ForecastTier::for_days_ahead(days_ahead);

        for &tier in Self::degradation_ladder(scheduled) {
            let result = match tier {
                ForecastTier::Hourly => self.fetch_hourly(unit, date, days_ahead).await,
                ForecastTier::Daily => self.fetch_daily(unit, date, days_ahead).await,
                ForecastTier::Simulation => return self.simulate(unit, date, scheduled),
            };
            match result {
                Ok((data, confidence)) => {
                    if tier != scheduled {
                        info!(
                            "forecast for {} on {date} degraded from {scheduled} to {tier}",
                            unit.name
                        );
                    }
                    return Acquired {
                        scheduled,
                        tier,
                        confidence,
                        data,
                    };
                }
                Err(e) => {
                    warn!("{tier} acquisition failed for {} on {date}: {e}", unit.name);
                }
            }
        }
        // Ladders always end in Simulation, which returns above.
        self.simulate(unit, date, scheduled)
    }

    /// Builds a simulated result directly, bypassing the upstream client.
    /// Used for far dates and as the terminal rung of every ladder.
    pub fn simulate(
        &self,
        unit: &AdministrativeUnit,
        date: NaiveDate,
        scheduled: ForecastTier,
    ) -> Acquired {
        let day = self.simulator.simulate(unit, date);
        Acquired {
            scheduled,
            tier: ForecastTier::Simulation,
            confidence: day.confidence,
            data: TierData::Simulated(day.hourly),
        }
    }

    async fn fetch_hourly(
        &self,
        unit: &AdministrativeUnit,
        date: NaiveDate,
        days_ahead: i64,
    ) -> Result<(TierData, f64), AcquisitionError> {
        let hours = ((days_ahead.max(0) + 1) * 24) as u32;
        let coord = unit.coordinate;
        let client = Arc::clone(&self.client);
        let payload = self
            .with_retries(move || {
                let client = Arc::clone(&client);
                async move { client.get_hourly(coord, hours).await }
            })
            .await?;

        let points: Vec<HourPoint> = payload
            .hours
            .into_iter()
            .filter(|h| h.time.date() == date)
            .map(|h| HourPoint {
                hour: h.time.hour(),
                temperature: h.temperature,
                wind_speed: h.wind_speed,
                humidity: h.humidity,
                condition: h.condition,
            })
            .collect();

        if points.len() != 24 {
            return Err(AcquisitionError::Payload(format!(
                "expected 24 hours for {date}, got {}",
                points.len()
            )));
        }
        Ok((TierData::Hourly(points), HOURLY_CONFIDENCE))
    }

    async fn fetch_daily(
        &self,
        unit: &AdministrativeUnit,
        date: NaiveDate,
        days_ahead: i64,
    ) -> Result<(TierData, f64), AcquisitionError> {
        let days = (days_ahead.max(0) + 1) as u32;
        let coord = unit.coordinate;
        let client = Arc::clone(&self.client);
        let payload = self
            .with_retries(move || {
                let client = Arc::clone(&client);
                async move { client.get_daily(coord, days).await }
            })
            .await?;

        let day = payload
            .days
            .into_iter()
            .find(|d| d.date == date)
            .ok_or_else(|| AcquisitionError::Payload(format!("no daily entry for {date}")))?;

        let summary = DailySummary {
            temp_max: day.temp_max,
            temp_min: day.temp_min,
            mean_wind: day.mean_wind,
            mean_humidity: day.mean_humidity,
            condition: day.condition,
        };
        Ok((TierData::Daily(summary), DAILY_CONFIDENCE))
    }

    /// Runs `op` under the configured timeout, retrying transient failures
    /// with exponential backoff.
    async fn with_retries<T, F, Fut>(&self, mut op: F) -> Result<T, AcquisitionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AcquisitionError>>,
    {
        let mut attempt = 0u32;
        loop {
            let result = match tokio::time::timeout(self.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(AcquisitionError::Timeout(self.timeout)),
            };
            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff_base * 2u32.pow(attempt - 1);
                    warn!("upstream attempt {attempt} failed ({e}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::client::testing::{Failure, ScriptedClient};
    use crate::types::division::{DivisionLevel, LatLon};
    use std::sync::atomic::Ordering;

    fn yuhang() -> AdministrativeUnit {
        AdministrativeUnit {
            code: "330110".to_string(),
            name: "余杭区".to_string(),
            parent_code: Some("330100".to_string()),
            level: DivisionLevel::County,
            coordinate: LatLon(30.42, 120.30),
            pinyin: "yuhang".to_string(),
            aliases: Vec::new(),
            population: Some(1_226_673),
        }
    }

    fn router(client: ScriptedClient) -> (Arc<ScriptedClient>, ForecastRouter) {
        let client = Arc::new(client);
        let router = ForecastRouter::builder()
            .client(client.clone() as Arc<dyn UpstreamWeatherClient>)
            .backoff_base(Duration::from_millis(1))
            .build();
        (client, router)
    }

    #[tokio::test]
    async fn near_dates_deliver_hourly_data() {
        let (client, router) = router(ScriptedClient::healthy());
        let today = today();
        let acquired = router.acquire_from(&yuhang(), today, today).await;

        assert_eq!(acquired.scheduled, ForecastTier::Hourly);
        assert_eq!(acquired.tier, ForecastTier::Hourly);
        assert_eq!(acquired.confidence, HOURLY_CONFIDENCE);
        match acquired.data {
            TierData::Hourly(points) => assert_eq!(points.len(), 24),
            other => panic!("expected hourly data, got {other:?}"),
        }
        assert_eq!(client.daily_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mid_range_dates_skip_the_hourly_tier() {
        let (client, router) = router(ScriptedClient::healthy());
        let today = today();
        let date = today + chrono::Duration::days(5);
        let acquired = router.acquire_from(&yuhang(), date, today).await;

        assert_eq!(acquired.scheduled, ForecastTier::Daily);
        assert_eq!(acquired.tier, ForecastTier::Daily);
        assert!(matches!(acquired.data, TierData::Daily(_)));
        assert_eq!(client.hourly_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn far_dates_are_simulated_without_touching_upstream() {
        let (client, router) = router(ScriptedClient::healthy());
        let today = today();
        let date = today + chrono::Duration::days(30);
        let acquired = router.acquire_from(&yuhang(), date, today).await;

        assert_eq!(acquired.tier, ForecastTier::Simulation);
        assert_eq!(client.hourly_calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.daily_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn hourly_failure_degrades_to_daily() {
        let (client, router) = router(ScriptedClient::new(Failure::Payload, Failure::None));
        let today = today();
        let acquired = router.acquire_from(&yuhang(), today, today).await;

        assert_eq!(acquired.scheduled, ForecastTier::Hourly);
        assert_eq!(acquired.tier, ForecastTier::Daily);
        assert_eq!(acquired.confidence, DAILY_CONFIDENCE);
        // Payload errors are not retryable, so exactly one upstream attempt.
        assert_eq!(client.hourly_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.daily_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn total_upstream_failure_still_yields_a_low_confidence_day() {
        let (_client, router) = router(ScriptedClient::new(Failure::Payload, Failure::Payload));
        let today = today();
        let acquired = router.acquire_from(&yuhang(), today, today).await;

        assert_eq!(acquired.tier, ForecastTier::Simulation);
        assert!(acquired.confidence < 0.7);
        match acquired.data {
            TierData::Simulated(points) => assert_eq!(points.len(), 24),
            other => panic!("expected simulated data, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let (client, router) = router(ScriptedClient::new(Failure::Timeout, Failure::None));
        let today = today();
        let acquired = router.acquire_from(&yuhang(), today, today).await;

        // Initial attempt plus DEFAULT_MAX_RETRIES retries before degrading.
        assert_eq!(
            client.hourly_calls.load(Ordering::SeqCst),
            1 + DEFAULT_MAX_RETRIES
        );
        assert_eq!(acquired.tier, ForecastTier::Daily);
    }

    #[test]
    fn ladders_always_end_in_simulation() {
        for start in [
            ForecastTier::Hourly,
            ForecastTier::Daily,
            ForecastTier::Simulation,
        ] {
            let ladder = ForecastRouter::degradation_ladder(start);
            assert_eq!(ladder.first(), Some(&start));
            assert_eq!(ladder.last(), Some(&ForecastTier::Simulation));
        }
    }
}
