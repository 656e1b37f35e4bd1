use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use segment_player::core::{PlayerCore, PlayerEvent};
use segment_player::sim::SimulatedMedia;
use segment_player::PlaybackSettings;
use segment_proto::config::Config;
use segment_proto::protocol::{Broadcast, Command};
use segment_proto::segments::load_episodes;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

/// Headless audio segment player.
///
/// Reads JSON commands (`{"cmd":"Next"}`, `{"cmd":"Activate","index":3}`, …)
/// from stdin, one per line, and prints every state broadcast as a JSON line.
#[derive(Parser, Debug)]
#[command(name = "segplay", version)]
struct Args {
    /// Episode metadata files (`<name>.json` next to `<name>.segments.jsonl`)
    #[arg(required = true)]
    episodes: Vec<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Position-update cadence of the simulated element, in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Source URL the simulated element fails to load (repeatable)
    #[arg(long = "unavailable", value_name = "URL")]
    unavailable: Vec<String>,

    /// Start the first visible segment immediately
    #[arg(long)]
    autoplay: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };

    init_logging(&config.paths.log_file)?;
    tracing::info!("segplay starting…");

    // ── Load segments ────────────────────────────────────────────────────────
    let paths: Vec<PathBuf> = args
        .episodes
        .iter()
        .map(|p| config.resolve_episode(p))
        .collect();
    let segments = load_episodes(&paths)?;
    if segments.is_empty() {
        warn!("no segments loaded; commands will be no-ops");
    }

    let settings = PlaybackSettings::from(&config.playback);
    let tick = Duration::from_millis(args.tick_ms.unwrap_or(config.playback.tick_ms).max(10));

    // ── Channels ─────────────────────────────────────────────────────────────
    let (broadcast_tx, broadcast_rx) = broadcast::channel::<Broadcast>(1024);
    let (event_tx, event_rx) = mpsc::channel::<PlayerEvent>(1024);

    let media = SimulatedMedia::new(args.unavailable.iter().cloned());
    let core = PlayerCore::new(
        segments,
        media.clone(),
        settings,
        event_tx.clone(),
        broadcast_tx.clone(),
    );

    spawn_printer(broadcast_rx);
    media.spawn_clock(tick, event_tx.clone());
    spawn_stdin_reader(event_tx.clone());

    if args.autoplay {
        event_tx
            .send(PlayerEvent::Command(Command::TogglePause))
            .await
            .context("player core not running")?;
    }

    // ── Run PlayerCore until quit or Ctrl-C ──────────────────────────────────
    let mut core_task = tokio::spawn(core.run(event_rx));
    let controller = tokio::select! {
        res = &mut core_task => res??,
        _ = tokio::signal::ctrl_c() => {
            info!("segplay: interrupted");
            let _ = event_tx.send(PlayerEvent::Shutdown).await;
            core_task.await??
        }
    };

    info!(
        "segplay exiting at position {} of {}",
        controller.cursor(),
        controller.len()
    );
    Ok(())
}

fn init_logging(log_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // stdout carries JSON; the log path goes to stderr.
    eprintln!("segplay log: {}", log_path.display());
    Ok(())
}

fn spawn_printer(mut rx: broadcast::Receiver<Broadcast>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => match serde_json::to_string(&msg) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!("printer: cannot encode broadcast: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("printer: skipped {} broadcasts", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn spawn_stdin_reader(tx: mpsc::Sender<PlayerEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Command>(line) {
                        Ok(cmd) => {
                            if tx.send(PlayerEvent::Command(cmd)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("stdin: bad command {:?}: {}", line, e);
                            eprintln!("segplay: cannot parse command: {e}");
                        }
                    }
                }
                Ok(None) => {
                    info!("stdin closed; still playing until Quit or Ctrl-C");
                    break;
                }
                Err(e) => {
                    warn!("stdin: read error: {}", e);
                    break;
                }
            }
        }
    });
}
