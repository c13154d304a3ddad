use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, HttpSimulationClient, Poller, PollerConfig, PollerEvent, SimulationBackend,
    SimulationControls,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(about = "Terminal dashboard for the supply-chain simulation")]
struct Args {
    /// TOML settings file. Defaults to ./dashboard.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured backend URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll continuously and redraw on every committed snapshot.
    Watch,
    /// Run one poll cycle and print the snapshot.
    Once {
        #[arg(long)]
        json: bool,
    },
    /// Toggle the simulation between running and paused.
    Pause,
    /// Ask the backend to inject a disruption.
    TriggerDisruption,
    /// Advance the simulation several steps at once.
    FastForward {
        #[arg(long)]
        n: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    let config = settings.poller_config()?;
    let backend: Arc<dyn SimulationBackend> = Arc::new(HttpSimulationClient::new(
        &config.base_url,
        config.request_timeout,
    )?);

    match args.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(backend, config).await,
        Command::Once { json } => once(backend, config, json).await,
        Command::Pause => {
            let mut controls = SimulationControls::new(backend, config.fast_forward_steps);
            controls.toggle_pause().await?;
            println!("pause toggled");
            Ok(())
        }
        Command::TriggerDisruption => {
            let controls = SimulationControls::new(backend, config.fast_forward_steps);
            controls.trigger_disruption().await?;
            println!("disruption triggered");
            Ok(())
        }
        Command::FastForward { n } => {
            let controls = SimulationControls::new(backend, config.fast_forward_steps);
            let steps = controls.fast_forward(n).await?;
            println!("fast-forwarded {steps} steps");
            Ok(())
        }
    }
}

async fn once(backend: Arc<dyn SimulationBackend>, config: PollerConfig, json: bool) -> Result<()> {
    let mut poller = Poller::new(backend, config);
    let snapshot = poller
        .poll_once()
        .await
        .context("simulation backend unavailable")?;
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
    } else {
        let clock = poller.clock_display().borrow().clone();
        print!("{}", render::snapshot(&snapshot, &clock));
    }
    Ok(())
}

async fn watch(backend: Arc<dyn SimulationBackend>, config: PollerConfig) -> Result<()> {
    let handle = Poller::new(backend, config).spawn();
    let mut snapshots = handle.subscribe_snapshots();
    let mut clock = handle.clock_display();
    let mut events = handle.subscribe_events();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for ctrl-c")?;
                info!("shutting down");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let now = clock.borrow_and_update().clone();
                print!("{}", render::snapshot(&snapshot, &now));
            }
            changed = clock.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("-- {}", *clock.borrow_and_update());
            }
            Ok(event) = events.recv() => {
                if let PollerEvent::PollFailed(reason) = event {
                    warn!(%reason, "showing last good snapshot");
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}
