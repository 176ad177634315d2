use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, severity, Catalog, ClientError, ClientSettings, ComposeReport, Orchestrator,
    Submission,
};
use shared::domain::{DeviceCommand, ScentId};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "scent-desktop", about = "Compose scent sequences and play them on the device")]
struct Args {
    #[arg(long, global = true, help = "Composition service base URL")]
    composition_url: Option<String>,
    #[arg(long, global = true, help = "Playback service base URL")]
    playback_url: Option<String>,
    #[arg(long, global = true, help = "Scent catalog file path or URL")]
    catalog: Option<String>,
    #[arg(long, global = true, help = "Log filter, e.g. info or client_core=debug")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the severity score of a statement without contacting any service.
    Score { statement: String },
    /// Compose a scent sequence for a statement.
    Compose { statement: String },
    /// Compose a sequence, then play it on the device.
    Play { statement: String },
    /// Play a single scent slot.
    PlayScent {
        #[arg(long)]
        scent_id: i64,
        #[arg(long)]
        duration: u32,
    },
    /// Check that the playback service can reach the device.
    Probe,
    /// Check that both services are running.
    Health,
    /// List the scent catalog and flag shared device locations.
    Catalog,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let settings = resolve_settings(&args)?;

    match args.command {
        Command::Score { statement } => {
            let score = severity::score(&statement);
            println!("{}", render::score_line(score));
            Ok(ExitCode::SUCCESS)
        }
        Command::Catalog => {
            let catalog = Catalog::load(&settings.catalog_source(), &reqwest::Client::new()).await;
            print!("{}", render::catalog(&catalog));
            Ok(if catalog.is_empty() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        command => {
            let orchestrator = Orchestrator::connect(&settings).await;
            run_action(&orchestrator, command).await
        }
    }
}

async fn run_action(orchestrator: &Orchestrator, command: Command) -> Result<ExitCode> {
    let succeeded = match command {
        Command::Compose { statement } => compose(orchestrator, &statement).await,
        Command::Play { statement } => {
            compose(orchestrator, &statement).await
                && report(orchestrator.play().await, |outcome| {
                    println!("{}", render::outcome("Playback", outcome));
                    outcome.is_ok()
                })
        }
        Command::PlayScent { scent_id, duration } => {
            let command = DeviceCommand {
                scent_id: ScentId(scent_id),
                duration,
            };
            report(orchestrator.play_scent(command).await, |outcome| {
                println!("{}", render::outcome("Playback", outcome));
                outcome.is_ok()
            })
        }
        Command::Probe => report(orchestrator.probe().await, |outcome| {
            println!("{}", render::outcome("Device", outcome));
            outcome.is_ok()
        }),
        Command::Health => report(orchestrator.health().await, |health| {
            print!("{}", render::health(health));
            health.all_healthy()
        }),
        Command::Score { .. } | Command::Catalog => true,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn compose(orchestrator: &Orchestrator, statement: &str) -> bool {
    report(orchestrator.compose(statement).await, |composed| {
        print!("{}", render::compose_report(composed));
        matches!(composed, ComposeReport::Profile(_))
    })
}

fn report<T>(submission: Submission<T>, on_success: impl FnOnce(&T) -> bool) -> bool {
    match submission {
        Submission::Busy => {
            eprintln!("That action is already running; wait for it to finish.");
            false
        }
        Submission::Finished(Ok(value)) => on_success(&value),
        Submission::Finished(Err(error)) => {
            print_error(&error);
            false
        }
    }
}

fn print_error(error: &ClientError) {
    tracing::debug!(kind = ?error.kind(), ?error, "action failed");
    eprintln!("{}", render::error(error));
}

fn resolve_settings(args: &Args) -> Result<ClientSettings> {
    let mut settings = load_settings();
    if let Some(url) = &args.composition_url {
        settings.composition_url = url.clone();
    }
    if let Some(url) = &args.playback_url {
        settings.playback_url = url.clone();
    }
    if let Some(source) = &args.catalog {
        settings.catalog_source = source.clone();
    }
    settings.validated().context("invalid client settings")
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
