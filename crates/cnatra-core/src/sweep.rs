//! Runs schedule sessions for every squadron the store reports as missing schedules.

use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::ScraperConfig;
use crate::error::{ScheduleError, StoreError};
use crate::parser::ScheduleBatchResult;
use crate::session::ScheduleSession;
use crate::store::{ScheduleStore, SquadronDates};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SquadronOutcome {
    Recorded { published: usize, requested: usize },
    Failed { attempts: usize, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquadronReport {
    pub squadron_id: String,
    #[serde(flatten)]
    pub outcome: SquadronOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub squadrons: Vec<SquadronReport>,
}

impl SweepReport {
    pub fn published(&self) -> usize {
        self.squadrons
            .iter()
            .map(|report| match report.outcome {
                SquadronOutcome::Recorded { published, .. } => published,
                SquadronOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> usize {
        self.squadrons
            .iter()
            .filter(|report| matches!(report.outcome, SquadronOutcome::Failed { .. }))
            .count()
    }
}

/// Fetch every missing schedule and record what was published.
///
/// Squadrons run concurrently up to `config.concurrency`; a failing squadron is reported
/// and never stops the others.
pub async fn run_sweep<S, T>(
    store: &mut S,
    transport: &T,
    config: &ScraperConfig,
) -> Result<SweepReport, StoreError>
where
    S: ScheduleStore,
    T: Transport,
{
    let pending = store.squadrons_missing_schedules()?;
    info!(
        squadrons = pending.len(),
        concurrency = config.concurrency,
        "Starting schedule sweep"
    );

    let mut results = stream::iter(pending)
        .map(|squadron| async move {
            let result = fetch_with_retries(transport, config, &squadron).await;
            (squadron, result)
        })
        .buffer_unordered(config.concurrency.max(1));

    let mut report = SweepReport::default();
    while let Some((squadron, result)) = results.next().await {
        let outcome = match result {
            Ok(schedules) => {
                store.record_schedules(&squadron.squadron_id, &schedules)?;
                info!(
                    squadron = %squadron.squadron_id,
                    published = schedules.len(),
                    requested = squadron.dates.len(),
                    "Recorded schedules"
                );
                SquadronOutcome::Recorded {
                    published: schedules.len(),
                    requested: squadron.dates.len(),
                }
            }
            Err((attempts, err)) => {
                warn!(squadron = %squadron.squadron_id, attempts, error = %err, "Squadron failed");
                SquadronOutcome::Failed {
                    attempts,
                    error: err.to_string(),
                }
            }
        };
        report.squadrons.push(SquadronReport {
            squadron_id: squadron.squadron_id,
            outcome,
        });
    }

    report
        .squadrons
        .sort_by(|a, b| a.squadron_id.cmp(&b.squadron_id));
    Ok(report)
}

async fn fetch_with_retries<T: Transport>(
    transport: &T,
    config: &ScraperConfig,
    squadron: &SquadronDates,
) -> Result<ScheduleBatchResult, (usize, ScheduleError)> {
    let max = config.max_retries.max(1);
    let backoff = Duration::from_millis(config.retry_backoff_ms);
    let session = ScheduleSession::new(transport, &config.schedule_url, &squadron.squadron_id);
    let mut attempt = 0usize;

    loop {
        attempt += 1;
        match session.fetch_schedules(&squadron.dates).await {
            Ok(schedules) => return Ok(schedules),
            Err(err) => {
                if attempt >= max || !err.is_retryable() {
                    return Err((attempt, err));
                }
                warn!(
                    squadron = %squadron.squadron_id,
                    attempt,
                    error = %err,
                    "Retrying schedule session"
                );
                sleep(backoff).await;
            }
        }
    }
}
