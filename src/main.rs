//! Sign Speech - replays a recorded fingerspelling session and speaks the result.
//!
//! The recording holds per-frame classifier output (label and confidence, or no
//! hand) plus the user's speak/restart presses. Frames run through the
//! accumulator; spoken sentences go to a background text-to-speech worker.

use std::time::Instant;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use sign_speech::config::AppConfig;
use sign_speech::replay::{self, Pacing};
use sign_speech::session::SignSession;
use sign_speech::speech::{SpeechDispatcher, player_for, renderer_for};

/// Cancel `token` on Ctrl+C or SIGTERM.
async fn wait_for_shutdown(token: CancellationToken) {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("🛑 Received Ctrl+C, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        debug!("SIGTERM handler unavailable: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("🛑 Received SIGTERM, shutting down...");
        }
    }

    token.cancel();
}

fn main() -> Result<()> {
    let config = AppConfig::from_args();

    // Respect RUST_LOG, fall back to the verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(if config.verbose { "debug" } else { "info" }))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🤟 Sign Speech v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {:#}", e);
        std::process::exit(1);
    }
    config.log_config();

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().context("Failed to start async runtime")?;
    let result = runtime.block_on(run(config));

    // Speech jobs still running past the grace period are abandoned, not awaited
    runtime.shutdown_background();

    info!("✅ Sign Speech stopped");
    result
}

async fn run(config: AppConfig) -> Result<()> {
    let events = config.events.clone().context("No recording given")?;
    let steps = replay::load(&events).with_context(|| format!("Failed to load {}", events.display()))?;
    info!("Loaded {} step(s) from {}", steps.len(), events.display());

    let dispatcher = SpeechDispatcher::spawn(renderer_for(&config)?, player_for(&config)?, config.spool_dir.clone())
        .context("Failed to start speech worker")?;

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_shutdown(shutdown.clone()));

    let pacing = if config.realtime { Pacing::Realtime } else { Pacing::AsFastAsPossible };
    let start = Instant::now();
    let mut session = SignSession::new(config.accumulator_config(), &dispatcher, start);

    let finished = tokio::select! {
        summary = replay::drive(&mut session, &steps, pacing, start) => Some(summary),
        _ = shutdown.cancelled() => None,
    };

    match finished {
        Some(summary) => {
            info!(
                "Replay finished: {} frame(s), {} command(s), {} sentence(s) spoken",
                summary.frames,
                summary.commands,
                summary.spoken.len()
            );
            info!("✋ {}", summary.transcript);
            if config.speak_at_end {
                session.speak();
            }
        }
        None => info!("Replay interrupted at: {}", session.transcript()),
    }

    drop(session);
    dispatcher.shutdown(config.shutdown_grace()).await;
    Ok(())
}
