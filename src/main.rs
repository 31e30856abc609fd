use anyhow::Result;
use clap::Parser;

use cache_sweeper::cli::{Cli, Command};
use cache_sweeper::commands;
use cache_sweeper::config::Config;
use cache_sweeper::engine::Engine;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        if commands::is_aborted(&err) {
            eprintln!("Cancelled.");
            std::process::exit(130);
        }
        return Err(err);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Completions(args) => commands::completions::run(args),
        command => {
            // Load configuration
            let config = Config::load(cli.config.as_deref())?;

            tracing::debug!(?config, "Loaded configuration");

            let engine = Engine::from_config(&config)?;
            tracing::debug!(targets = ?engine.registry().ids(), "Registry assembled");
            dispatch(&engine, command)?;
        }
    }

    Ok(())
}

fn dispatch(engine: &Engine, command: Command) -> Result<()> {
    match command {
        Command::Targets(args) => commands::targets::run(engine, args)?,
        Command::Scan(args) => {
            tracing::info!(?args, "Starting scan");
            commands::scan::run(engine, args)?;
        }
        Command::Clean(args) => {
            tracing::info!(?args, "Starting clean");
            commands::clean::run(engine, args)?;
        }
        Command::Serve => {
            tracing::info!("Serving requests on stdin");
            commands::serve::run(engine)?;
        }
        Command::Completions(args) => commands::completions::run(args),
    }

    Ok(())
}

fn init_logging(verbosity: u8, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if quiet {
        "warn"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cache_sweeper={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
