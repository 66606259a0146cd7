//! The outer harvest loop
//!
//! Strictly sequential: one item is fully processed (search → extraction →
//! sink append → queue update) before the next begins. Every per-item
//! outcome is routed through one classifier, so business skips,
//! deterministic dead ends and session-fatal faults each take exactly one
//! path and no error escapes the loop. The loop ends on queue exhaustion,
//! an operator interrupt, or the consecutive-fault safeguard.
//!
//! An item is only marked done after its record is durably written: a
//! crash between the two re-processes the item on the next run and appends
//! a duplicate record rather than losing one (at-least-once).

use crate::client::ClientFactory;
use crate::config::Config;
use crate::harvest::protocol::{ItemOutcome, Navigator, StepError};
use crate::harvest::throttle::Throttle;
use crate::output::RecordSink;
use crate::queue::FileQueue;
use crate::record::CompanyRecord;
use crate::session::{BootstrapGate, SessionManager};
use crate::{HarvestError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the loop decided to do with one item's outcome
#[derive(Debug)]
enum Decision {
    /// Append the record and mark the item done
    Persist(Box<CompanyRecord>),

    /// Mark the item skipped; a business rule, not an error
    Skip(String),

    /// Mark the item failed; deterministic, retrying cannot help
    Fail(String),

    /// Destroy the session and leave the item pending for another pass
    RestartSession(String),
}

/// Routes every per-item outcome to exactly one decision
///
/// The identity gate lives here: a record without a name never reaches the
/// sink. Session-shaped faults leave the item pending behind a session
/// restart; there is no other error path out of an item.
fn classify(outcome: std::result::Result<ItemOutcome, StepError>) -> Decision {
    match outcome {
        Ok(ItemOutcome::Collected(record)) if record.is_collected() => Decision::Persist(record),
        Ok(ItemOutcome::Collected(_)) => Decision::Fail("no identity extracted".to_string()),
        Ok(ItemOutcome::Flagged(reason)) => Decision::Skip(reason),
        Ok(ItemOutcome::Rejected(reason)) => Decision::Fail(reason),
        Err(StepError::RateLimited) => Decision::RestartSession("search limit reached".to_string()),
        Err(StepError::Client(e)) => Decision::RestartSession(e.to_string()),
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items completed with a durably written record this run
    pub done: usize,

    /// Items excluded by the flagged-candidate rule this run
    pub skipped: usize,

    /// Items given up on this run
    pub failed: usize,

    /// Session-fatal faults absorbed this run
    pub faults: usize,

    /// True when the run stopped on the operator interrupt
    pub interrupted: bool,
}

/// The sequential harvest worker
pub struct Orchestrator {
    config: Config,
    queue: FileQueue,
    sink: Box<dyn RecordSink>,
    sessions: SessionManager,
    navigator: Navigator,
    shutdown: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Loads the queue and wires the components together
    ///
    /// # Arguments
    ///
    /// * `config` - The full harvester configuration
    /// * `factory` - Builds page clients; called again after every fault
    /// * `gate` - Optional one-time manual bootstrap checkpoint
    /// * `sink` - Durable destination for completed records
    pub fn new(
        config: Config,
        factory: Box<dyn ClientFactory>,
        gate: Option<Box<dyn BootstrapGate>>,
        sink: Box<dyn RecordSink>,
    ) -> Result<Self> {
        let queue = FileQueue::load(Path::new(&config.queue.path))?;
        let sessions = SessionManager::new(factory, gate, config.restart_delay_range());
        let navigator = Navigator::new(
            config.site.clone(),
            Throttle::new(config.throttle_range()),
            config.wait_timeout(),
        );

        Ok(Self {
            config,
            queue,
            sink,
            sessions,
            navigator,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag checked between items; setting it stops the loop at the next
    /// iteration with the queue fully consistent
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Runs the loop until queue exhaustion, interrupt, or the
    /// consecutive-fault safeguard
    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut attempts: HashMap<String, u32> = HashMap::new();
        let mut consecutive_faults: u32 = 0;

        let counts = self.queue.counts();
        tracing::info!(
            "Starting harvest: {} pending of {} items",
            counts.pending,
            self.queue.len()
        );

        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                tracing::info!("Interrupt received, stopping between items");
                summary.interrupted = true;
                break;
            }

            let id = match self.queue.next_pending() {
                Some(item) => item.id.clone(),
                None => {
                    tracing::info!("Queue exhausted");
                    break;
                }
            };
            tracing::info!("Processing {}", id);

            let decision = match self.sessions.acquire().await {
                Ok(client) => classify(self.navigator.run_item(client, &id).await),
                Err(e) => Decision::RestartSession(format!("session unavailable: {}", e)),
            };

            match decision {
                Decision::Persist(record) => {
                    self.sink.append(&record)?;
                    self.queue.mark_done(&id)?;
                    attempts.remove(&id);
                    consecutive_faults = 0;
                    summary.done += 1;
                    tracing::info!("{}: record collected", id);
                }

                Decision::Skip(reason) => {
                    self.queue.mark_skipped(&id, &reason)?;
                    attempts.remove(&id);
                    consecutive_faults = 0;
                    summary.skipped += 1;
                    tracing::info!("{}: skipped ({})", id, reason);
                }

                Decision::Fail(reason) => {
                    self.queue.mark_failed(&id, &reason)?;
                    attempts.remove(&id);
                    consecutive_faults = 0;
                    summary.failed += 1;
                    tracing::warn!("{}: failed ({})", id, reason);
                }

                Decision::RestartSession(reason) => {
                    summary.faults += 1;
                    consecutive_faults += 1;

                    let tries = attempts.entry(id.clone()).or_insert(0);
                    *tries += 1;
                    let tries = *tries;

                    if tries >= self.config.retry.max_item_attempts {
                        self.queue.mark_failed(
                            &id,
                            &format!("{} session faults, last: {}", tries, reason),
                        )?;
                        attempts.remove(&id);
                        summary.failed += 1;
                        tracing::warn!(
                            "{}: giving up after {} faulted attempts ({})",
                            id,
                            tries,
                            reason
                        );
                    } else {
                        tracing::warn!(
                            "{}: attempt {}/{} faulted ({}), item stays pending",
                            id,
                            tries,
                            self.config.retry.max_item_attempts,
                            reason
                        );
                    }

                    if consecutive_faults >= self.config.retry.max_consecutive_faults {
                        self.sessions.close().await;
                        return Err(HarvestError::Aborted(format!(
                            "{} consecutive session faults without progress, last: {}",
                            consecutive_faults, reason
                        )));
                    }

                    self.sessions.report_fault(&reason).await;
                }
            }
        }

        self.sessions.close().await;

        let counts = self.queue.counts();
        tracing::info!(
            "Harvest finished: {} done, {} skipped, {} failed this run; {} still pending",
            summary.done,
            summary.skipped,
            summary.failed,
            counts.pending
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;

    fn collected(name: Option<&str>) -> std::result::Result<ItemOutcome, StepError> {
        let mut record = CompanyRecord::new("556631-3788");
        record.identity.name = name.map(|n| n.to_string());
        Ok(ItemOutcome::Collected(Box::new(record)))
    }

    #[test]
    fn test_classify_collected_record_is_persisted() {
        assert!(matches!(
            classify(collected(Some("Example AB"))),
            Decision::Persist(_)
        ));
    }

    #[test]
    fn test_classify_empty_identity_never_reaches_sink() {
        assert!(matches!(
            classify(collected(None)),
            Decision::Fail(reason) if reason == "no identity extracted"
        ));
    }

    #[test]
    fn test_classify_flagged_is_a_skip() {
        assert!(matches!(
            classify(Ok(ItemOutcome::Flagged("Har anmärkning".to_string()))),
            Decision::Skip(_)
        ));
    }

    #[test]
    fn test_classify_faults_restart_the_session() {
        assert!(matches!(
            classify(Err(StepError::RateLimited)),
            Decision::RestartSession(_)
        ));
        assert!(matches!(
            classify(Err(StepError::Client(ClientError::Crashed))),
            Decision::RestartSession(_)
        ));
    }
}
