mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zteng_core::Router;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Offline commands don't need a router connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Band(args) => commands::band::handle(&args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "zteng", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to the router
        Command::Status => {
            let (router, _) = connect(&cli.global)?;
            commands::status::handle(&router, &cli.global).await
        }
        Command::Watch(args) => {
            let (router, scan_interval) = connect(&cli.global)?;
            commands::watch::handle(&router, &args, scan_interval, &cli.global).await
        }
    }
}

/// Build a `Router` from the config file, profile, and CLI overrides.
///
/// Also returns the profile's polling interval in seconds.
fn connect(global: &cli::GlobalOpts) -> Result<(Router, u64), CliError> {
    let cfg = config::load_config_or_default();
    let resolved = config::resolve(global, &cfg)?;
    let router = Router::new(resolved.router);
    tracing::debug!(
        profile = %resolved.profile_name,
        url = %router.config().url,
        timeout_secs = router.config().timeout.as_secs(),
        "resolved router"
    );
    Ok((router, resolved.scan_interval))
}
