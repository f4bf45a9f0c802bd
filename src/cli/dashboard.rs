//! Dashboard and navigation command handlers

use crate::cli::output::{
    format_dashboard, format_dashboard_json, format_landing, format_upload_page,
};
use crate::cli::{load_config_with_overrides, DashboardArgs, DisplayArgs, OpenArgs};
use crate::client::{MetricsClient, MetricsSource};
use crate::config::MonitorConfig;
use crate::dashboard::{DashboardRoute, Route};
use crate::logging::init_tracing;
use crate::polling::ChartViewModel;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::sync::watch;

/// Handle `ml-monitor dashboard`
pub async fn run_dashboard(args: DashboardArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.service, &args.display)?;
    init_tracing(&config.logging)?;

    let model_version = args
        .model_version
        .unwrap_or_else(|| config.dashboard.demo_model_version.clone());

    run_route(&config, &Route::dashboard(model_version).path(), &args.display).await
}

/// Handle `ml-monitor open <PATH>`
pub async fn run_open(args: OpenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.service, &args.display)?;
    init_tracing(&config.logging)?;

    run_route(&config, &args.path, &args.display).await
}

/// Navigate to `path` and render whatever page it resolves to.
///
/// Dashboard pages keep refreshing until Ctrl+C, or until the first complete
/// snapshot when `--once` is set.
pub async fn run_route(
    config: &MonitorConfig,
    path: &str,
    display: &DisplayArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = Arc::new(MetricsClient::new(&config.service)?);
    tracing::debug!(base_url = %client.base_url(), path, "Opening route");

    let mut dashboard = DashboardRoute::new(client, config);
    let route = dashboard.navigate(path)?.clone();

    match route {
        Route::Landing => println!("{}", format_landing(&dashboard.demo_route())),
        Route::Upload => println!("{}", format_upload_page()),
        Route::NotFound { path } => {
            return Err(format!("No page at '{}'. Try '/' for the landing page.", path).into())
        }
        Route::Dashboard { .. } => {
            let result = watch_dashboard(&dashboard, display).await;
            dashboard.shutdown().await;
            result?;
        }
    }

    Ok(())
}

/// Render the dashboard on every view change.
async fn watch_dashboard<S: MetricsSource>(
    dashboard: &DashboardRoute<S>,
    display: &DisplayArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut performance, mut drift) = dashboard.subscribe();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    if display.once {
        tokio::select! {
            snapshot = first_snapshot(&mut performance, &mut drift) => {
                let (performance, drift) = snapshot?;
                render(&performance, &drift, display.json, false)?;
            }
            _ = &mut shutdown => {}
        }
        return Ok(());
    }

    let clear = !display.json && std::io::stdout().is_terminal();
    loop {
        let (p, d) = (
            performance.borrow_and_update().clone(),
            drift.borrow_and_update().clone(),
        );
        render(&p, &d, display.json, clear)?;

        tokio::select! {
            changed = performance.changed() => {
                if changed.is_err() { break; }
            }
            changed = drift.changed() => {
                if changed.is_err() { break; }
            }
            _ = &mut shutdown => break,
        }
    }

    Ok(())
}

/// Wait until both charts have left the loading state.
pub async fn first_snapshot(
    performance: &mut watch::Receiver<ChartViewModel>,
    drift: &mut watch::Receiver<ChartViewModel>,
) -> Result<(ChartViewModel, ChartViewModel), watch::error::RecvError> {
    let p = performance.wait_for(|v| !v.is_loading()).await?.clone();
    let d = drift.wait_for(|v| !v.is_loading()).await?.clone();
    Ok((p, d))
}

fn render(
    performance: &ChartViewModel,
    drift: &ChartViewModel,
    json: bool,
    clear: bool,
) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", format_dashboard_json(performance, drift)?);
        return Ok(());
    }
    if clear {
        print!("\x1B[2J\x1B[H");
    }
    println!("{}", format_dashboard(performance, drift));
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, stopping dashboard");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, stopping dashboard");
        }
    }
}
