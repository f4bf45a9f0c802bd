//! Upload command handler

use crate::cli::dashboard::run_route;
use crate::cli::{load_config_with_overrides, UploadArgs};
use crate::client::MetricsClient;
use crate::logging::init_tracing;
use crate::upload::{UploadFlow, UploadForm};
use colored::Colorize;

/// Build the registration form from command-line arguments
pub fn form_from_args(args: &UploadArgs) -> UploadForm {
    UploadForm {
        model_name: args.name.clone().unwrap_or_default(),
        model_version: args.model_version.clone().unwrap_or_default(),
        model_file: args.model_file.clone(),
        data_file: args.data_file.clone(),
        description: args.description.clone(),
    }
}

/// Handle `ml-monitor upload`
///
/// Registers the model, then opens its dashboard unless `--no-follow` is set.
pub async fn run_upload(args: UploadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.service, &args.display)?;
    init_tracing(&config.logging)?;

    let client = MetricsClient::new(&config.service)?;
    let mut flow = UploadFlow::new(&client)?;
    let form = form_from_args(&args);

    let route = flow.submit(&form).await?;

    println!(
        "{} Registered {} {}",
        "✓".green(),
        form.model_name.bold(),
        form.model_version
    );
    println!("  Dashboard: {}", route);

    if args.no_follow {
        return Ok(());
    }

    run_route(&config, &route.path(), &args.display).await
}
