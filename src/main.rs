//! Nudge CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nudge::cli::commands::{config, init, nudge as nudge_cmd, run, task};
use nudge::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `run` installs its own subscriber from the loaded configuration.
    if !matches!(cli.command, Commands::Run(_)) {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Init(args) => init::execute(args, cli.json).await,
        Commands::Run(args) => run::execute(args, config_path, cli.json).await,
        Commands::Add(args) => task::execute_add(args, config_path, cli.json).await,
        Commands::List(args) => task::execute_list(args, config_path, cli.json).await,
        Commands::Done(args) => task::execute_done(args, config_path, cli.json).await,
        Commands::Delete(args) => task::execute_delete(args, config_path, cli.json).await,
        Commands::Tick => nudge_cmd::execute_tick(config_path, cli.json).await,
        Commands::TestNudge => nudge_cmd::execute_test_nudge(config_path, cli.json).await,
        Commands::Config(args) => config::execute(args, config_path, cli.json).await,
    };

    if let Err(err) = result {
        nudge::cli::handle_error(err, cli.json);
    }
}
