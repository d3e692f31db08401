use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use mediqueue_tracker::api::QueueApiClient;
use mediqueue_tracker::command::{CommandType, ParsedCommand, USAGE};
use mediqueue_tracker::config::TrackerConfig;
use mediqueue_tracker::logging;
use mediqueue_tracker::queue::QueueStatusViewModel;
use mediqueue_tracker::render::{render_doctor_queue, render_state};

const REDRAW_INTERVAL: Duration = Duration::from_millis(500);
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = match ParsedCommand::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    if command.command_type == CommandType::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = TrackerConfig::load(&command.config_path)?;
    let _logging_guard = logging::init_logging(&config.log_dir, "mediqueue-tracker", &config.log_level)?;

    tracing::info!("MediQueue tracker started, backend at {}", config.api.base_url);
    match &config.loaded_from {
        Some(path) => tracing::debug!("Loaded configuration from {}", path.display()),
        None => tracing::info!("Config file {} not found, using defaults", command.config_path),
    }

    let client = QueueApiClient::new(&config.api).context("Failed to build HTTP client")?;

    match command.command_type {
        CommandType::Track { appointment_id } => track(client, &config, &appointment_id).await,
        CommandType::Doctor { doctor_id } => {
            let queue = client
                .fetch_doctor_queue(&doctor_id)
                .await
                .with_context(|| format!("Failed to load queue for doctor {}", doctor_id))?;
            print!("{}", render_doctor_queue(&doctor_id, &queue));
            Ok(())
        }
        CommandType::Help => Ok(()),
    }
}

/// Follow one appointment until Ctrl-C. Pressing Enter refreshes right away.
async fn track(client: QueueApiClient, config: &TrackerConfig, appointment_id: &str) -> anyhow::Result<()> {
    let view_model = Arc::new(
        QueueStatusViewModel::new(Arc::new(client)).with_poll_interval(config.poll_interval()),
    );

    if let Err(e) = view_model.initialize(appointment_id).await {
        print!("{}", render_state(&view_model.state().await));
        anyhow::bail!("Queue tracking not started: {}", e);
    }

    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut shown_sequence = None;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = redraw.tick() => {
                let state = view_model.state().await;
                if shown_sequence != Some(state.sequence) {
                    shown_sequence = Some(state.sequence);
                    print!("{}{}", CLEAR_SCREEN, render_state(&state));
                    println!("\nPress Enter to refresh, Ctrl-C to quit.");
                }
            }
            line = input.next_line(), if stdin_open => {
                match line {
                    Ok(Some(_)) => {
                        let view_model = view_model.clone();
                        tokio::spawn(async move {
                            if let Err(e) = view_model.refresh().await {
                                tracing::debug!("Manual refresh did not publish: {}", e);
                            }
                        });
                    }
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        tracing::warn!("Stopped reading stdin: {}", e);
                        stdin_open = false;
                    }
                }
            }
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Shutdown signal received.");
                break;
            }
        }
    }

    view_model.dispose();
    Ok(())
}
