//! Routed monitoring dashboard.
//!
//! [`DashboardRoute`] binds the two chart controllers (performance and feature
//! drift) to the model version named by the current navigation path. Moving to
//! another version restarts both controllers in place instead of building new
//! ones, so the old timers are always released.

pub mod route;

pub use route::Route;

use crate::client::MetricsSource;
use crate::config::MonitorConfig;
use crate::polling::{ChartKind, ChartViewModel, PollingController, PollingError};
use std::sync::Arc;
use tokio::sync::watch;

/// One dashboard view with a controller per chart.
pub struct DashboardRoute<S: MetricsSource> {
    performance: PollingController<S>,
    drift: PollingController<S>,
    route: Route,
    demo_model_version: String,
}

impl<S: MetricsSource> DashboardRoute<S> {
    /// Build an unbound dashboard. Nothing is fetched until [`navigate`](Self::navigate).
    pub fn new(source: Arc<S>, config: &MonitorConfig) -> Self {
        Self {
            performance: PollingController::for_chart(
                ChartKind::Performance,
                Arc::clone(&source),
                config,
            ),
            drift: PollingController::for_chart(ChartKind::Drift, source, config),
            route: Route::Landing,
            demo_model_version: config.dashboard.demo_model_version.clone(),
        }
    }

    /// Build from explicit controllers (for custom intervals and tests).
    pub fn with_controllers(
        performance: PollingController<S>,
        drift: PollingController<S>,
        demo_model_version: impl Into<String>,
    ) -> Self {
        Self {
            performance,
            drift,
            route: Route::Landing,
            demo_model_version: demo_model_version.into(),
        }
    }

    /// Resolve `path` and bind the controllers to it.
    ///
    /// A dashboard path for a new version restarts both controllers; the same
    /// version again is a no-op. Any other route stops them.
    pub fn navigate(&mut self, path: &str) -> Result<&Route, PollingError> {
        let route = Route::parse(path);

        match &route {
            Route::Dashboard { model_version } => {
                let unchanged = self.model_version() == Some(model_version.as_str())
                    && self.performance.is_polling()
                    && self.drift.is_polling();
                if !unchanged {
                    tracing::info!(
                        model_version = %model_version,
                        previous = self.model_version().unwrap_or_default(),
                        "Binding dashboard to model version"
                    );
                    self.performance.stop();
                    self.drift.stop();
                    self.performance.start(model_version)?;
                    self.drift.start(model_version)?;
                }
            }
            Route::NotFound { path } => {
                tracing::warn!(path = %path, "No route for path");
                self.stop();
            }
            Route::Landing | Route::Upload => self.stop(),
        }

        self.route = route;
        Ok(&self.route)
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Version the charts are bound to, if a dashboard route is active.
    pub fn model_version(&self) -> Option<&str> {
        self.route.model_version()
    }

    /// Path of the demo dashboard linked from the landing page.
    pub fn demo_route(&self) -> Route {
        Route::dashboard(self.demo_model_version.clone())
    }

    pub fn performance(&self) -> &PollingController<S> {
        &self.performance
    }

    pub fn drift(&self) -> &PollingController<S> {
        &self.drift
    }

    /// Snapshot of both charts.
    pub fn views(&self) -> (ChartViewModel, ChartViewModel) {
        (self.performance.view(), self.drift.view())
    }

    pub fn subscribe(
        &self,
    ) -> (
        watch::Receiver<ChartViewModel>,
        watch::Receiver<ChartViewModel>,
    ) {
        (self.performance.subscribe(), self.drift.subscribe())
    }

    /// Stop both controllers. Idempotent.
    pub fn stop(&mut self) {
        self.performance.stop();
        self.drift.stop();
    }

    /// Stop both controllers and wait for their timers to finish.
    pub async fn shutdown(&mut self) {
        self.performance.shutdown().await;
        self.drift.shutdown().await;
    }
}
