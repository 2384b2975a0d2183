//! Print orchestrator implementation.
//!
//! Discovery runs from a polling loop (one per engine) or a manual trigger;
//! the drain is single-flight and pops jobs strictly in FIFO order. Stopping
//! the polling loop never interrupts a cycle already in flight: the stop flag
//! is only checked between cycles.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::gateway::{GatewayError, PhotoGateway, PrintOutcome};
use crate::printer::PhotoPrinter;

use super::config::OrchestratorConfig;
use super::types::{JobStatus, OrchestratorError, OrchestratorStatus, PrintJob};

struct PollingHandle {
    event_id: String,
    stop: Arc<AtomicBool>,
}

#[derive(Default)]
struct EngineState {
    /// Live jobs: everything queued plus the one printing. Jobs are dropped
    /// as they settle terminally.
    jobs: Vec<PrintJob>,
    /// FIFO of queued job ids.
    queue: VecDeque<Uuid>,
    /// Single-flight flag for the drain.
    processing: bool,
    consecutive_rate_limits: u32,
    breaker_open_until: Option<DateTime<Utc>>,
    polling: Option<PollingHandle>,
}

/// The print orchestrator - discovers pending photos and drives print jobs.
///
/// Cheap to clone; clones share the same queue and breaker state. Multiple
/// independent engines can coexist, there are no ambient globals.
#[derive(Clone)]
pub struct PrintOrchestrator {
    gateway: Arc<dyn PhotoGateway>,
    printer: Arc<dyn PhotoPrinter>,
    config: OrchestratorConfig,
    state: Arc<Mutex<EngineState>>,
}

impl PrintOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        gateway: Arc<dyn PhotoGateway>,
        printer: Arc<dyn PhotoPrinter>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            printer,
            config,
            state: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    /// Arm the polling loop for an event, replacing any previous loop.
    ///
    /// The first cycle runs immediately; subsequent cycles run `interval`
    /// after the previous cycle finishes. Cycles never overlap.
    pub async fn start_polling(
        &self,
        event_id: &str,
        interval: Duration,
    ) -> Result<(), OrchestratorError> {
        let event_id = event_id.trim();
        if event_id.is_empty() {
            return Err(OrchestratorError::InvalidArgument(
                "event id is required".to_string(),
            ));
        }
        if interval.is_zero() {
            return Err(OrchestratorError::InvalidArgument(
                "polling interval must be positive".to_string(),
            ));
        }

        let stop = Arc::new(AtomicBool::new(false));
        {
            let mut state = self.state.lock().await;
            if let Some(old) = state.polling.take() {
                info!(event_id = %old.event_id, "replacing polling loop");
                old.stop.store(true, Ordering::SeqCst);
            }
            state.polling = Some(PollingHandle {
                event_id: event_id.to_string(),
                stop: Arc::clone(&stop),
            });
        }

        let this = self.clone();
        let event = event_id.to_string();
        tokio::spawn(async move {
            info!(event_id = %event, interval_ms = interval.as_millis() as u64, "polling loop started");
            loop {
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                this.run_cycle(&event).await;
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
            info!(event_id = %event, "polling loop stopped");
        });

        Ok(())
    }

    /// Stop the polling loop. Idempotent; a cycle already in flight finishes.
    pub async fn stop_polling(&self) {
        let mut state = self.state.lock().await;
        if let Some(handle) = state.polling.take() {
            handle.stop.store(true, Ordering::SeqCst);
            info!(event_id = %handle.event_id, "polling stop requested");
        }
    }

    /// Discover and print every pending photo for an event right now.
    ///
    /// Independent of the polling loop and not gated by the breaker, though
    /// a rate-limited fetch here still counts toward opening it. Returns the
    /// number of newly queued jobs; the drain has finished when this returns.
    pub async fn print_event(&self, event_id: &str) -> Result<usize, OrchestratorError> {
        let event_id = event_id.trim();
        if event_id.is_empty() {
            return Err(OrchestratorError::InvalidArgument(
                "event id is required".to_string(),
            ));
        }

        let queued = self
            .discover(event_id, self.config.manual_batch_size)
            .await?;
        info!(event_id, queued, "manual print-event discovery finished");

        self.drain().await;
        Ok(queued)
    }

    /// Discard queued jobs. The job currently printing is unaffected.
    pub async fn clear_queue(&self) -> usize {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let discarded: HashSet<Uuid> = state.queue.drain(..).collect();
        state.jobs.retain(|job| !discarded.contains(&job.id));

        if !discarded.is_empty() {
            info!(discarded = discarded.len(), "print queue cleared");
        }
        discarded.len()
    }

    /// Snapshot of the engine's current state.
    pub async fn status(&self) -> OrchestratorStatus {
        let state = self.state.lock().await;
        OrchestratorStatus {
            polling: state.polling.is_some(),
            event_id: state.polling.as_ref().map(|h| h.event_id.clone()),
            queue_len: state.queue.len(),
            processing: state.processing,
            jobs: state.jobs.clone(),
            consecutive_rate_limits: state.consecutive_rate_limits,
            breaker_open_until: state.breaker_open_until,
        }
    }

    /// One polling cycle: breaker gate, discovery, drain.
    async fn run_cycle(&self, event_id: &str) {
        if !self.breaker_allows().await {
            return;
        }

        match self.discover(event_id, self.config.poll_batch_size).await {
            Ok(queued) if queued > 0 => {
                info!(event_id, queued, "polling discovered new photos");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(event_id, error = %e, "polling discovery failed");
            }
        }

        self.drain().await;
    }

    /// Check the circuit breaker, closing it if its window has passed.
    async fn breaker_allows(&self) -> bool {
        let mut state = self.state.lock().await;
        match state.breaker_open_until {
            Some(until) if until > Utc::now() => {
                debug!(open_until = %until, "circuit breaker open, skipping cycle");
                false
            }
            Some(_) => {
                state.breaker_open_until = None;
                state.consecutive_rate_limits = 0;
                info!("circuit breaker closed, resuming polling");
                true
            }
            None => true,
        }
    }

    /// Fetch pending photos and enqueue the ones without a live job.
    ///
    /// Returns the number of newly queued jobs. A rate-limited fetch bumps
    /// the breaker counter and opens the breaker at the threshold.
    async fn discover(&self, event_id: &str, limit: usize) -> Result<usize, GatewayError> {
        match self.gateway.fetch_pending(event_id, "pending", limit).await {
            Ok(pending) => {
                let mut state = self.state.lock().await;
                state.consecutive_rate_limits = 0;

                let mut queued = 0;
                for photo in pending.photos {
                    // Only live jobs are retained, so photo id match is enough.
                    if state.jobs.iter().any(|job| job.photo_id == photo.id) {
                        continue;
                    }

                    let job_event = if photo.event_id.is_empty() {
                        event_id
                    } else {
                        photo.event_id.as_str()
                    };
                    let job = PrintJob::new(&photo.id, job_event);
                    debug!(photo_id = %photo.id, job_id = %job.id, "queued print job");
                    state.queue.push_back(job.id);
                    state.jobs.push(job);
                    queued += 1;
                }
                Ok(queued)
            }
            Err(GatewayError::RateLimited) => {
                let mut state = self.state.lock().await;
                state.consecutive_rate_limits += 1;
                if state.consecutive_rate_limits >= self.config.breaker_threshold {
                    let until = Utc::now()
                        + chrono::Duration::milliseconds(self.config.breaker_open_ms as i64);
                    state.breaker_open_until = Some(until);
                    state.consecutive_rate_limits = 0;
                    warn!(open_until = %until, "circuit breaker opened after repeated rate limits");
                }
                Err(GatewayError::RateLimited)
            }
            Err(e) => Err(e),
        }
    }

    /// Pop and print queued jobs until the queue is empty.
    ///
    /// Single-flight: a second caller returns immediately while a drain is
    /// running, its jobs are picked up by the drain already in progress.
    async fn drain(&self) {
        {
            let mut state = self.state.lock().await;
            if state.processing {
                return;
            }
            state.processing = true;
        }

        loop {
            let (job_id, photo_id, attempt) = {
                let mut guard = self.state.lock().await;
                let state = &mut *guard;
                match state.queue.pop_front() {
                    Some(job_id) => {
                        match state.jobs.iter_mut().find(|job| job.id == job_id) {
                            Some(job) => {
                                job.status = JobStatus::Printing;
                                job.attempts += 1;
                                (job_id, job.photo_id.clone(), job.attempts)
                            }
                            // Queue entry survived a concurrent clear; skip it.
                            None => continue,
                        }
                    }
                    None => {
                        state.processing = false;
                        return;
                    }
                }
            };

            match self.print_one(&photo_id).await {
                Ok(()) => self.complete_job(job_id, &photo_id).await,
                Err(e) => self.fail_attempt(job_id, &photo_id, attempt, e).await,
            }
        }
    }

    /// Fetch one photo and print it.
    async fn print_one(&self, photo_id: &str) -> Result<(), OrchestratorError> {
        let photo = self.gateway.fetch_photo(photo_id).await?;
        self.printer.print_photo(&photo).await?;
        Ok(())
    }

    /// Settle a job terminally as completed. The job leaves the engine.
    async fn complete_job(&self, job_id: Uuid, photo_id: &str) {
        {
            let mut state = self.state.lock().await;
            if let Some(pos) = state.jobs.iter().position(|job| job.id == job_id) {
                let mut job = state.jobs.remove(pos);
                job.status = JobStatus::Completed;
                job.completed_at = Some(Utc::now());
                info!(job_id = %job.id, photo_id, attempts = job.attempts, "print job completed");
            }
        }

        if let Err(e) = self
            .gateway
            .report_status(photo_id, PrintOutcome::Printed)
            .await
        {
            warn!(photo_id, error = %e, "failed to report printed status");
        }
    }

    /// Record a failed attempt: re-queue below the cap, settle terminally
    /// at it. Terminal jobs leave the engine.
    async fn fail_attempt(
        &self,
        job_id: Uuid,
        photo_id: &str,
        attempt: u32,
        error: OrchestratorError,
    ) {
        let message = error.to_string();
        let terminal = attempt >= self.config.max_attempts;

        {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            if terminal {
                if let Some(pos) = state.jobs.iter().position(|job| job.id == job_id) {
                    let mut job = state.jobs.remove(pos);
                    job.status = JobStatus::Failed;
                    job.completed_at = Some(Utc::now());
                    job.error = Some(message.clone());
                    warn!(
                        job_id = %job.id,
                        photo_id,
                        attempts = job.attempts,
                        error = %message,
                        "print job failed terminally"
                    );
                }
            } else if let Some(job) = state.jobs.iter_mut().find(|job| job.id == job_id) {
                job.status = JobStatus::Queued;
                job.error = Some(message.clone());
                state.queue.push_back(job_id);
                warn!(
                    job_id = %job.id,
                    photo_id,
                    attempt,
                    error = %message,
                    "print attempt failed, re-queued"
                );
            }
        }

        if terminal {
            if let Err(e) = self
                .gateway
                .report_status(photo_id, PrintOutcome::Failed)
                .await
            {
                warn!(photo_id, error = %e, "failed to report failed status");
            }
        }
    }
}
