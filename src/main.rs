use clap::Parser;
use ml_monitor::cli::{
    dashboard, handle_completions, handle_config_init, upload, Cli, Commands, ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dashboard(args) => dashboard::run_dashboard(args).await,
        Commands::Open(args) => dashboard::run_open(args).await,
        Commands::Upload(args) => upload::run_upload(args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
