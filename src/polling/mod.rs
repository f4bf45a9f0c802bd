//! Polling controller for one dashboard chart.
//!
//! A controller fetches its feed immediately on [`PollingController::start`],
//! then again on every interval tick until [`PollingController::stop`]. Ticks
//! and fetches are decoupled: each tick spawns its own fetch task, so a hung
//! request never holds back the next refresh.
//!
//! Every start opens a new *generation*. A fetch remembers the generation and
//! sequence number it was issued under and is applied to the view only if that
//! generation is still current, the controller is still polling, and no later
//! request of the same generation has already landed. Anything else is
//! dropped on arrival, so a slow response for a previous model version can
//! never overwrite the view of the current one.

mod error;
pub mod view;

#[cfg(test)]
mod tests;

pub use error::PollingError;
pub use view::{ChartKind, ChartTransform, ChartViewModel, ViewResult};

use crate::client::{FetchError, MetricsSource};
use crate::config::MonitorConfig;
use crate::transform::ChartSeries;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Never started
    Idle,
    /// Timer armed, results are being applied
    Polling,
    /// Stopped; late results are ignored
    Stopped,
}

/// Epoch bookkeeping shared with in-flight fetch tasks.
#[derive(Debug)]
struct PollState {
    phase: PollPhase,
    generation: u64,
    /// Last sequence number handed out in this generation
    issued_seq: u64,
    /// Highest sequence number applied in this generation
    applied_seq: u64,
}

struct Inner<S> {
    chart: ChartKind,
    source: Arc<S>,
    transform: ChartTransform,
    state: Mutex<PollState>,
    view: watch::Sender<ChartViewModel>,
}

/// Repeating timer owned by a controller. Dropping it cancels the loop.
struct PollTimer {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Drives the refresh loop for one chart.
///
/// `start` and ticks spawn onto the current tokio runtime, so they must be
/// called from within one.
pub struct PollingController<S: MetricsSource> {
    inner: Arc<Inner<S>>,
    interval: Duration,
    tracked_version: Option<String>,
    timer: Option<PollTimer>,
}

impl<S: MetricsSource> PollingController<S> {
    pub fn new(
        chart: ChartKind,
        source: Arc<S>,
        transform: ChartTransform,
        interval: Duration,
    ) -> Self {
        let (view, _) = watch::channel(ChartViewModel::idle(chart));
        Self {
            inner: Arc::new(Inner {
                chart,
                source,
                transform,
                state: Mutex::new(PollState {
                    phase: PollPhase::Idle,
                    generation: 0,
                    issued_seq: 0,
                    applied_seq: 0,
                }),
                view,
            }),
            interval,
            tracked_version: None,
            timer: None,
        }
    }

    /// Build a controller for `chart` from configuration.
    pub fn for_chart(chart: ChartKind, source: Arc<S>, config: &MonitorConfig) -> Self {
        let transform = ChartTransform::for_chart(chart, &config.polling, &config.dashboard);
        Self::new(chart, source, transform, config.polling.interval())
    }

    pub fn chart(&self) -> ChartKind {
        self.inner.chart
    }

    pub fn tracked_version(&self) -> Option<&str> {
        self.tracked_version.as_deref()
    }

    pub fn phase(&self) -> PollPhase {
        self.inner.lock_state().phase
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock_state().generation
    }

    pub fn is_polling(&self) -> bool {
        self.phase() == PollPhase::Polling
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> ChartViewModel {
        self.inner.view.borrow().clone()
    }

    /// Receive every view change.
    pub fn subscribe(&self) -> watch::Receiver<ChartViewModel> {
        self.inner.view.subscribe()
    }

    /// Begin polling `model_version`.
    ///
    /// Stops any current loop first, opens a new generation, resets the view
    /// to loading, fetches once immediately and arms the interval timer.
    pub fn start(&mut self, model_version: &str) -> Result<(), PollingError> {
        if model_version.is_empty() {
            return Err(PollingError::EmptyModelVersion);
        }

        self.stop();

        let generation = {
            let mut state = self.inner.lock_state();
            state.generation += 1;
            state.phase = PollPhase::Polling;
            state.issued_seq = 0;
            state.applied_seq = 0;
            self.inner.view.send_replace(ChartViewModel::loading(
                self.inner.chart,
                model_version,
                state.generation,
            ));
            state.generation
        };
        self.tracked_version = Some(model_version.to_string());

        tracing::info!(
            chart = %self.inner.chart,
            model_version = model_version,
            generation = generation,
            interval_seconds = self.interval.as_secs_f64(),
            "Polling started"
        );

        Inner::spawn_fetch(&self.inner, model_version, generation);

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let inner = Arc::clone(&self.inner);
        let version = model_version.to_string();
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => Inner::spawn_fetch(&inner, &version, generation),
                }
            }
        });
        self.timer = Some(PollTimer {
            cancel,
            handle: Some(handle),
        });

        Ok(())
    }

    /// Cancel the timer and stop applying results. Idempotent.
    ///
    /// In-flight fetches are not aborted; their results are ignored on arrival.
    pub fn stop(&mut self) {
        // Dropping the timer cancels it
        self.timer.take();

        let mut state = self.inner.lock_state();
        if state.phase == PollPhase::Polling {
            tracing::info!(
                chart = %self.inner.chart,
                model_version = self.tracked_version.as_deref().unwrap_or_default(),
                generation = state.generation,
                "Polling stopped"
            );
        }
        state.phase = PollPhase::Stopped;
    }

    /// Stop and wait for the timer task to finish.
    pub async fn shutdown(&mut self) {
        let timer = self.timer.take();
        self.stop();
        if let Some(mut timer) = timer {
            timer.cancel.cancel();
            if let Some(handle) = timer.handle.take() {
                let _ = handle.await;
            }
        }
    }
}

impl<S: MetricsSource> Drop for PollingController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S: MetricsSource> Inner<S> {
    fn lock_state(&self) -> MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue one fetch tagged with the current generation and the next sequence number.
    fn spawn_fetch(inner: &Arc<Self>, model_version: &str, generation: u64) {
        let seq = {
            let mut state = inner.lock_state();
            if state.generation != generation || state.phase != PollPhase::Polling {
                return;
            }
            state.issued_seq += 1;
            state.issued_seq
        };

        let inner = Arc::clone(inner);
        let version = model_version.to_string();
        tokio::spawn(async move {
            let outcome = match inner.source.fetch(inner.chart.endpoint(), &version).await {
                Ok(payload) => inner.transform.apply(&payload),
                Err(e) => Err(e),
            };
            inner.apply(&version, generation, seq, outcome);
        });
    }

    /// Publish a completed fetch unless it has been superseded.
    ///
    /// Returns whether the view was updated.
    fn apply(
        &self,
        model_version: &str,
        generation: u64,
        seq: u64,
        outcome: Result<Option<ChartSeries>, FetchError>,
    ) -> bool {
        let mut state = self.lock_state();

        if state.phase != PollPhase::Polling
            || state.generation != generation
            || seq <= state.applied_seq
        {
            tracing::trace!(
                chart = %self.chart,
                model_version = model_version,
                generation = generation,
                current_generation = state.generation,
                seq = seq,
                "Discarding superseded result"
            );
            metrics::counter!("ml_monitor_stale_results_total", "chart" => self.chart.endpoint().as_str())
                .increment(1);
            return false;
        }
        state.applied_seq = seq;

        let result = match outcome {
            Ok(Some(series)) => {
                tracing::debug!(
                    chart = %self.chart,
                    model_version = model_version,
                    generation = generation,
                    points = series.len(),
                    "Chart updated"
                );
                ViewResult::Ok { series }
            }
            Ok(None) => ViewResult::Empty {
                message: self.chart.empty_message().to_string(),
            },
            Err(e) => {
                tracing::warn!(
                    chart = %self.chart,
                    model_version = model_version,
                    generation = generation,
                    error = %e,
                    "Metrics fetch failed"
                );
                ViewResult::Failed {
                    message: self.chart.failure_message().to_string(),
                }
            }
        };

        // Published under the state lock so a concurrent `start` cannot interleave
        self.view.send_modify(|view| {
            view.result = Some(result);
            view.updated_at = Some(chrono::Utc::now());
        });

        true
    }
}
