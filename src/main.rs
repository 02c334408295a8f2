use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use docvec::cli::commands::{handle_config, handle_embed, handle_estimate, handle_vector};
use docvec::cli::output::get_formatter;
use docvec::cli::{Cli, Commands};
use docvec::models::{Config, OutputFormat};

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "docvec=debug" } else { "docvec=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Config::load().context("failed to load config"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // `config init` must work even when the existing file is broken
    let config = match (&cli.command, load_config(cli.config.as_deref())) {
        (_, Ok(config)) => config,
        (Commands::Config(_), Err(e)) => {
            tracing::warn!("{e:#}; using defaults");
            Config::default()
        }
        (_, Err(e)) => return Err(e),
    };
    let format = cli.format.unwrap_or(config.output.default_format);

    tokio::select! {
        result = run_command(cli.command, &config, cli.config, format) => {
            if let Err(e) = result {
                eprint!("{}", with_newline(get_formatter(format).format_error(&format!("{e:#}"))));
                std::process::exit(1);
            }
        }
        _ = shutdown_signal() => {
            eprintln!("\nReceived shutdown signal, cleaning up...");
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    }

    Ok(())
}

fn with_newline(mut message: String) -> String {
    if !message.ends_with('\n') {
        message.push('\n');
    }
    message
}

async fn run_command(
    command: Commands,
    config: &Config,
    config_path: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        Commands::Estimate(args) => {
            handle_estimate(args, config, format).await?;
        }
        Commands::Embed(args) => {
            handle_embed(args, config, format).await?;
        }
        Commands::Vector(args) => {
            handle_vector(args, config).await?;
        }
        Commands::Config(cmd) => {
            handle_config(cmd, config, config_path.as_deref(), format).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
