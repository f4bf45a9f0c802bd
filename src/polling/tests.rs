//! Unit tests for the polling controller.
//!
//! Time is paused so interval ticks are driven explicitly with
//! `tokio::time::advance`.

use super::*;
use crate::client::{EndpointKind, FeatureDriftRecord, MetricSample, RawPayload};
use crate::config::{DashboardConfig, PollingConfig};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use tokio::sync::oneshot;

type FetchResult = Result<RawPayload, FetchError>;

enum Step {
    Ready(FetchResult),
    Gated(oneshot::Receiver<FetchResult>),
}

/// Metrics source that replays a script, one step per fetch.
///
/// Once the script runs out every fetch answers with `fallback`.
struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(EndpointKind, String)>>,
    fallback: FetchResult,
}

impl ScriptedSource {
    fn new(fallback: FetchResult) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fallback,
        })
    }

    fn push(&self, result: FetchResult) {
        self.steps.lock().unwrap().push_back(Step::Ready(result));
    }

    /// Queue a fetch that completes only when the returned sender fires.
    fn gate(&self) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().unwrap().push_back(Step::Gated(rx));
        tx
    }

    fn calls(&self) -> Vec<(EndpointKind, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsSource for ScriptedSource {
    async fn fetch(&self, kind: EndpointKind, model_version: &str) -> FetchResult {
        self.calls
            .lock()
            .unwrap()
            .push((kind, model_version.to_string()));
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Ready(result)) => result,
            Some(Step::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Network("gate dropped".to_string()))),
            None => self.fallback.clone(),
        }
    }
}

fn performance(points: &[(u32, f64)]) -> RawPayload {
    RawPayload::Performance(
        points
            .iter()
            .map(|(hour, accuracy)| MetricSample {
                timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(*hour, 0, 0)
                    .unwrap(),
                accuracy: Some(*accuracy),
                data_drift_score: Some(0.1),
                precision: None,
                recall: None,
                f1_score: None,
            })
            .collect(),
    )
}

fn drift(names: &[&str]) -> RawPayload {
    RawPayload::Drift(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| FeatureDriftRecord {
                feature_name: name.to_string(),
                drift_score: i as f64 / 100.0,
                p_value: None,
            })
            .collect(),
    )
}

const INTERVAL: Duration = Duration::from_secs(15);

fn controller(chart: ChartKind, source: Arc<ScriptedSource>) -> PollingController<ScriptedSource> {
    let transform =
        ChartTransform::for_chart(chart, &PollingConfig::default(), &DashboardConfig::default());
    PollingController::new(chart, source, transform, INTERVAL)
}

/// Let spawned fetch tasks run to completion.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn accuracy_values(view: &ChartViewModel) -> Vec<f64> {
    view.series()
        .and_then(|s| s.dimension("Accuracy"))
        .map(|d| d.values.clone())
        .unwrap_or_default()
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_new_controller_is_idle() {
    let source = ScriptedSource::new(Ok(performance(&[])));
    let ctrl = controller(ChartKind::Performance, source.clone());

    assert_eq!(ctrl.phase(), PollPhase::Idle);
    assert_eq!(ctrl.generation(), 0);
    assert!(ctrl.view().is_loading());
    assert!(ctrl.view().model_version.is_none());
    assert!(source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_start_fetches_immediately() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;

    assert_eq!(
        source.calls(),
        vec![(EndpointKind::Performance, "m_v1".to_string())]
    );
    assert_eq!(ctrl.phase(), PollPhase::Polling);
    assert_eq!(ctrl.tracked_version(), Some("m_v1"));
    assert_eq!(accuracy_values(&ctrl.view()), vec![0.9]);
}

#[tokio::test(start_paused = true)]
async fn test_interval_ticks_refetch() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;
    assert_eq!(source.calls().len(), 1);

    tokio::time::advance(Duration::from_secs(14)).await;
    settle().await;
    assert_eq!(source.calls().len(), 1, "no tick before the interval elapses");

    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(source.calls().len(), 2);

    tokio::time::advance(INTERVAL).await;
    settle().await;
    assert_eq!(source.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_start_rejects_empty_version() {
    let source = ScriptedSource::new(Ok(performance(&[])));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    assert_eq!(ctrl.start(""), Err(PollingError::EmptyModelVersion));
    settle().await;
    assert!(source.calls().is_empty());
    assert_eq!(ctrl.phase(), PollPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_and_halts_fetching() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;

    ctrl.stop();
    ctrl.stop();
    ctrl.stop();
    assert_eq!(ctrl.phase(), PollPhase::Stopped);

    tokio::time::advance(INTERVAL * 4).await;
    settle().await;
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_start_is_harmless() {
    let source = ScriptedSource::new(Ok(performance(&[])));
    let mut ctrl = controller(ChartKind::Drift, source.clone());

    ctrl.stop();
    ctrl.stop();
    assert_eq!(ctrl.phase(), PollPhase::Stopped);
    assert!(source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_timer() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    {
        let mut ctrl = controller(ChartKind::Performance, source.clone());
        ctrl.start("m_v1").unwrap();
        settle().await;
    }

    tokio::time::advance(INTERVAL * 3).await;
    settle().await;
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_awaits_timer_task() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    ctrl.shutdown().await;
    assert_eq!(ctrl.phase(), PollPhase::Stopped);

    tokio::time::advance(INTERVAL * 2).await;
    settle().await;
    assert!(source.calls().len() <= 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_resumes_polling() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;
    ctrl.stop();
    ctrl.start("m_v1").unwrap();
    settle().await;

    assert_eq!(ctrl.generation(), 2);
    assert_eq!(ctrl.phase(), PollPhase::Polling);
    assert_eq!(source.calls().len(), 2);
    assert_eq!(accuracy_values(&ctrl.view()), vec![0.9]);
}

// ============================================================================
// View results
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_empty_feed_shows_no_data_message() {
    let source = ScriptedSource::new(Ok(performance(&[])));
    let mut ctrl = controller(ChartKind::Performance, source);

    ctrl.start("m_v1").unwrap();
    settle().await;

    let view = ctrl.view();
    assert_eq!(
        view.result,
        Some(ViewResult::Empty {
            message: "No data available for this model yet.".to_string()
        })
    );
    assert!(view.series().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failure_shows_fixed_message_without_cause() {
    let source = ScriptedSource::new(Err(FetchError::Network(
        "connection refused at 10.0.0.1".to_string(),
    )));
    let mut ctrl = controller(ChartKind::Drift, source);

    ctrl.start("m_v1").unwrap();
    settle().await;

    let view = ctrl.view();
    assert!(view.is_failed());
    assert_eq!(view.message(), Some("Failed to fetch feature drift data."));
    assert!(!view.message().unwrap().contains("10.0.0.1"));
}

#[tokio::test(start_paused = true)]
async fn test_error_cleared_by_next_success() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9), (11, 0.85)])));
    source.push(Err(FetchError::Status(500)));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;
    assert!(ctrl.view().is_failed());

    tokio::time::advance(INTERVAL).await;
    settle().await;

    let view = ctrl.view();
    assert!(!view.is_failed());
    assert!(view.message().is_none());
    assert_eq!(accuracy_values(&view), vec![0.9, 0.85]);
}

#[tokio::test(start_paused = true)]
async fn test_polling_continues_after_failures() {
    let source = ScriptedSource::new(Err(FetchError::Timeout(5)));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    for _ in 0..5 {
        tokio::time::advance(INTERVAL).await;
        settle().await;
    }

    assert_eq!(source.calls().len(), 6);
    assert_eq!(ctrl.phase(), PollPhase::Polling);
}

#[tokio::test(start_paused = true)]
async fn test_drift_chart_ranks_and_reverses() {
    let source = ScriptedSource::new(Ok(drift(&["age", "income", "zip"])));
    let mut ctrl = controller(ChartKind::Drift, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;

    assert_eq!(source.calls()[0].0, EndpointKind::Drift);
    let view = ctrl.view();
    assert_eq!(view.series().unwrap().categories, vec!["zip", "income", "age"]);
}

#[tokio::test(start_paused = true)]
async fn test_subscriber_sees_updates() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    let mut ctrl = controller(ChartKind::Performance, source);
    let mut rx = ctrl.subscribe();

    ctrl.start("m_v1").unwrap();

    rx.changed().await.unwrap();
    let mut view = rx.borrow_and_update().clone();
    while view.is_loading() {
        rx.changed().await.unwrap();
        view = rx.borrow_and_update().clone();
    }
    assert_eq!(view.model_version.as_deref(), Some("m_v1"));
    assert_eq!(accuracy_values(&view), vec![0.9]);
}

// ============================================================================
// Staleness
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_result_for_old_version_is_discarded() {
    let source = ScriptedSource::new(Ok(performance(&[(12, 0.5)])));
    let slow_v1 = source.gate();
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;
    let g1 = ctrl.generation();

    ctrl.start("m_v2").unwrap();
    settle().await;
    assert!(ctrl.generation() > g1);
    assert_eq!(accuracy_values(&ctrl.view()), vec![0.5]);

    // v1 answers after v2 has already been shown
    slow_v1.send(Ok(performance(&[(10, 0.99)]))).unwrap();
    settle().await;

    let view = ctrl.view();
    assert_eq!(view.model_version.as_deref(), Some("m_v2"));
    assert_eq!(accuracy_values(&view), vec![0.5]);
}

#[tokio::test(start_paused = true)]
async fn test_slow_failure_for_old_version_is_discarded() {
    let source = ScriptedSource::new(Ok(performance(&[(12, 0.5)])));
    let slow_v1 = source.gate();
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;
    ctrl.start("m_v2").unwrap();
    settle().await;

    slow_v1.send(Err(FetchError::Status(503))).unwrap();
    settle().await;

    assert!(!ctrl.view().is_failed());
}

#[tokio::test(start_paused = true)]
async fn test_version_change_resets_view_to_loading() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;
    assert!(!ctrl.view().is_loading());

    let _pending = source.gate();
    ctrl.start("m_v2").unwrap();

    let view = ctrl.view();
    assert!(view.is_loading());
    assert_eq!(view.model_version.as_deref(), Some("m_v2"));
    assert_eq!(view.generation, ctrl.generation());
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_completion_keeps_latest() {
    let source = ScriptedSource::new(Ok(performance(&[])));
    let first = source.gate();
    let second = source.gate();
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    tokio::time::advance(INTERVAL).await;
    settle().await;
    assert_eq!(source.calls().len(), 2);

    second.send(Ok(performance(&[(11, 0.7)]))).unwrap();
    settle().await;
    first.send(Ok(performance(&[(10, 0.2)]))).unwrap();
    settle().await;

    assert_eq!(accuracy_values(&ctrl.view()), vec![0.7]);
}

#[tokio::test(start_paused = true)]
async fn test_result_after_stop_is_ignored() {
    let source = ScriptedSource::new(Ok(performance(&[])));
    let pending = source.gate();
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;
    ctrl.stop();

    pending.send(Ok(performance(&[(10, 0.9)]))).unwrap();
    settle().await;

    assert!(ctrl.view().is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_hung_fetch_does_not_block_next_tick() {
    let source = ScriptedSource::new(Ok(performance(&[(11, 0.8)])));
    let _hung = source.gate();
    let mut ctrl = controller(ChartKind::Performance, source.clone());

    ctrl.start("m_v1").unwrap();
    settle().await;
    assert!(ctrl.view().is_loading());

    tokio::time::advance(INTERVAL).await;
    settle().await;

    assert_eq!(source.calls().len(), 2);
    assert_eq!(accuracy_values(&ctrl.view()), vec![0.8]);
}

#[tokio::test(start_paused = true)]
async fn test_mismatched_payload_is_a_failure() {
    let source = ScriptedSource::new(Ok(drift(&["age"])));
    let mut ctrl = controller(ChartKind::Performance, source);

    ctrl.start("m_v1").unwrap();
    settle().await;

    assert!(ctrl.view().is_failed());
}

#[tokio::test(start_paused = true)]
async fn test_unrenderable_time_format_shows_failure_every_tick() {
    let source = ScriptedSource::new(Ok(performance(&[(10, 0.9)])));
    let dashboard = DashboardConfig {
        time_format: "%Q".to_string(),
        ..DashboardConfig::default()
    };
    let transform =
        ChartTransform::for_chart(ChartKind::Performance, &PollingConfig::default(), &dashboard);
    let mut ctrl = PollingController::new(ChartKind::Performance, source.clone(), transform, INTERVAL);

    ctrl.start("m_v1").unwrap();
    settle().await;
    assert_eq!(
        ctrl.view().message(),
        Some("Failed to fetch metrics. Is the backend server running?")
    );

    tokio::time::advance(INTERVAL).await;
    settle().await;

    assert_eq!(source.calls().len(), 2);
    assert!(ctrl.view().is_failed());
    assert!(ctrl.is_polling());
}
