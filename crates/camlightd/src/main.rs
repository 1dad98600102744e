use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use camlightd::config::Config;
use camlightd::config::Diagnostic;
use camlightd::config::LightTarget;
use camlightd::config::LogLevel;
use camlightd::integrations::elgato::failures;
use camlightd::integrations::elgato::Dispatch;
use camlightd::integrations::elgato::Dispatcher;
use camlightd::integrations::elgato::DryRun;
use camlightd::integrations::elgato::ElgatoClient;
use camlightd::integrations::elgato::LightClient;
use camlightd::source::EventReader;
use camlightd::source::LineSource;
use camlightd::source::ProcessSource;
use camlightd::source::ReaderSource;
use camlightd::Monitor;
use clap::Parser;
use clap::Subcommand;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;

/// Turn Elgato Key Lights on and off with the camera
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Read variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Overrides CAMLIGHT_LOG_LEVEL
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow camera events and switch the lights (default)
    Monitor {
        /// Read camera log lines from stdin instead of starting `log stream`
        #[arg(long)]
        stdin: bool,

        /// Log detected transitions without contacting the lights
        #[arg(long)]
        dry_run: bool,
    },

    /// Turn every light on
    On,

    /// Turn every light off
    Off,

    /// Print the current state of every light
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging is not up yet, so config errors go straight to stderr
    let (config, diagnostics) = match Config::load(cli.env_file.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = cli.log_level.unwrap_or(config.logging.level);
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(level))
        .init();

    for diagnostic in diagnostics {
        match diagnostic {
            Diagnostic::Warning(warning) => warn!("{}", warning),
        }
    }

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Option<Command>, config: Config) -> anyhow::Result<ExitCode> {
    let command = command.unwrap_or(Command::Monitor {
        stdin: false,
        dry_run: false,
    });

    let client = Arc::new(ElgatoClient::new(config.port).context("failed to create HTTP client")?);
    info!(
        "{} light(s) configured on port {}",
        config.lights.len(),
        config.port
    );

    match command {
        Command::Monitor { stdin, dry_run } => {
            if dry_run {
                monitor(Monitor::new(config.lights, DryRun), stdin).await
            } else {
                monitor(Monitor::new(config.lights, Dispatcher::new(client)), stdin).await
            }
        }
        Command::On => switch(client, &config.lights, true).await,
        Command::Off => switch(client, &config.lights, false).await,
        Command::Status => {
            for light in &config.lights {
                match client.query_status(&light.address).await {
                    Some(status) => println!("{}: {}", light.address, status),
                    None => println!("{}: unreachable", light.address),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// One-shot fan-out; fails if any light did not switch
async fn switch(client: Arc<ElgatoClient>, lights: &[LightTarget], on: bool) -> anyhow::Result<ExitCode> {
    let outcomes = Dispatcher::new(client).apply_all(lights, on).await;
    let failed = failures(&outcomes);
    if failed > 0 {
        anyhow::bail!("{} of {} lights failed", failed, outcomes.len());
    }
    Ok(ExitCode::SUCCESS)
}

async fn monitor<D: Dispatch>(monitor: Monitor<D>, stdin: bool) -> anyhow::Result<ExitCode> {
    if stdin {
        info!("Reading camera events from stdin");
        follow(monitor, ReaderSource::stdin()).await
    } else {
        let source = ProcessSource::camera_log().context("failed to start the camera log stream")?;
        info!("Following camera events from `{}`", source.program());
        follow(monitor, source).await
    }
}

async fn follow<D: Dispatch, S: LineSource>(mut monitor: Monitor<D>, source: S) -> anyhow::Result<ExitCode> {
    let mut events = EventReader::new(source);
    monitor
        .run_until(&mut events, shutdown_signal())
        .await
        .context("camera monitor failed")?;

    info!("camlightd stopped");
    Ok(ExitCode::SUCCESS)
}

/// Completes on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
