//! Resumable, sequential batch runner.
//!
//! Cases already present in the success log, or completed earlier in the
//! same run, are skipped. Each remaining case gets a fresh session and one
//! message; the outcome is appended to the ledger before the next case starts. Remote errors are recorded and never
//! stop the batch. Only local I/O failures abort the run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use dxeval_client::{ChatBackend, ChatError};
use tracing::{debug, info, warn};

use crate::case::{Case, UNKNOWN_GROUND_TRUTH};
use crate::ledger::{FailureKind, FailureRecord, Ledger, ResultRecord};
use crate::prompt::VerificationWriter;

/// Knobs for one batch run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Delay after every case that made remote calls.
    pub pacing: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(200),
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub interrupted: bool,
}

impl RunSummary {
    /// Cases neither skipped nor finished, e.g. after an interrupt.
    pub fn pending(&self) -> usize {
        self.total - self.skipped - self.succeeded - self.failed
    }
}

enum Outcome {
    Succeeded,
    Failed { called: bool },
}

impl Outcome {
    fn made_calls(&self) -> bool {
        !matches!(self, Outcome::Failed { called: false })
    }
}

pub struct BatchRunner {
    backend: Arc<dyn ChatBackend>,
    ledger: Ledger,
    settings: RunSettings,
    verification: Option<VerificationWriter>,
}

impl BatchRunner {
    pub fn new(backend: Arc<dyn ChatBackend>, ledger: Ledger, settings: RunSettings) -> Self {
        Self {
            backend,
            ledger,
            settings,
            verification: None,
        }
    }

    /// Also write a verification prompt for every successful case.
    pub fn with_verification(mut self, writer: VerificationWriter) -> Self {
        self.verification = Some(writer);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Process every case not yet in the success log.
    pub async fn run(&self, cases: &[Case]) -> Result<RunSummary> {
        self.run_until(cases, std::future::pending::<()>()).await
    }

    /// Like [`run`](Self::run), but stops as soon as `shutdown` completes.
    /// The case in flight at that moment is abandoned; it is retried on the
    /// next run since nothing was logged for it.
    pub async fn run_until<F>(&self, cases: &[Case], shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut done = self.ledger.load_done()?;
        if !done.is_empty() {
            info!(done = done.len(), "resuming from existing log");
        }

        let mut summary = RunSummary {
            total: cases.len(),
            ..RunSummary::default()
        };

        for case in cases {
            if done.contains(&case.id) {
                debug!(id = %case.id, "already done, skipping");
                summary.skipped += 1;
                continue;
            }

            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    summary.interrupted = true;
                    break;
                }
                outcome = self.process(case) => outcome?,
            };

            let paced = outcome.made_calls();
            match outcome {
                Outcome::Succeeded => {
                    // Later blocks with the same id must not be logged twice.
                    done.insert(case.id.clone());
                    summary.succeeded += 1;
                }
                Outcome::Failed { .. } => summary.failed += 1,
            }

            if paced && !self.settings.pacing.is_zero() {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        summary.interrupted = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.settings.pacing) => {}
                }
            }
        }

        if summary.interrupted {
            warn!(pending = summary.pending(), "run interrupted");
        }
        info!(
            backend = self.backend.backend_name(),
            total = summary.total,
            skipped = summary.skipped,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch finished"
        );
        Ok(summary)
    }

    async fn process(&self, case: &Case) -> Result<Outcome> {
        if !case.has_body() {
            warn!(id = %case.id, "empty body after redaction, not sent");
            self.record_failure(case, FailureKind::EmptyBody, "empty body", None)?;
            return Ok(Outcome::Failed { called: false });
        }

        let session = match self.backend.create_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(id = %case.id, error = %e, "create session failed");
                self.record_failure(
                    case,
                    FailureKind::CreateSessionFailed,
                    &e.to_string(),
                    Some(&e),
                )?;
                return Ok(Outcome::Failed { called: true });
            }
        };

        let response = match self.backend.send_message(&session, &case.body).await {
            Ok(response) => response,
            Err(e) => {
                warn!(id = %case.id, session = %session, error = %e, "send message failed");
                self.record_failure(
                    case,
                    FailureKind::SendMessageFailed,
                    &e.to_string(),
                    Some(&e),
                )?;
                return Ok(Outcome::Failed { called: true });
            }
        };

        let output = response.text();
        if let Some(writer) = &self.verification {
            let ground_truth = case.ground_truth.as_deref().unwrap_or(UNKNOWN_GROUND_TRUTH);
            writer.write(&case.id, ground_truth, &output)?;
        }

        self.ledger.append_result(&ResultRecord {
            idx: case.idx,
            id: case.id.clone(),
            dataset_id: case.dataset_id.clone(),
            ground_truth: case.ground_truth.clone(),
            output,
            response: Some(response.raw),
            recorded_at: Utc::now(),
        })?;
        debug!(id = %case.id, "case done");
        Ok(Outcome::Succeeded)
    }

    fn record_failure(
        &self,
        case: &Case,
        kind: FailureKind,
        message: &str,
        error: Option<&ChatError>,
    ) -> Result<()> {
        self.ledger.append_failure(&FailureRecord {
            idx: case.idx,
            id: case.id.clone(),
            dataset_id: case.dataset_id.clone(),
            error: kind,
            message: message.to_string(),
            status: error.and_then(ChatError::status),
            body: error.and_then(ChatError::body).map(str::to_string),
            recorded_at: Utc::now(),
        })
    }
}
