use crate::aggregator::MetricAggregator;
use crate::presenter::Presenter;
use crate::sensors::{FallbackMemorySource, SensorSource};
use crate::state::AlertState;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// One full poll cycle: sample, evaluate, deliver. Runs to completion before
/// the next tick is considered; a failed sample has already degraded to an
/// empty snapshot inside the aggregator, so nothing here can abort the loop.
pub fn tick<S, F, P>(
    aggregator: &mut MetricAggregator<S, F>,
    alert: &mut AlertState,
    now_unix: i64,
    presenter: &mut P,
) where
    S: SensorSource,
    F: FallbackMemorySource,
    P: Presenter,
{
    let snapshot = aggregator.sample();
    let event = alert.evaluate(&snapshot, now_unix);
    presenter.on_snapshot(&snapshot);
    if let Some(event) = event {
        presenter.on_alert(&event);
    }
}

/// Fixed-period loop driving the pipeline until shutdown is signalled. Missed
/// ticks are skipped rather than bursted, so a slow cycle delays the next one
/// instead of overlapping it.
pub async fn run<S, F, P>(
    mut aggregator: MetricAggregator<S, F>,
    mut presenter: P,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: SensorSource,
    F: FallbackMemorySource,
    P: Presenter,
{
    let mut alert = AlertState::new();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!("shutdown signal received, stopping monitor loop");
                break;
            }
            _ = ticker.tick() => {
                tick(&mut aggregator, &mut alert, now_unix(), &mut presenter);
            }
        }
    }
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
