//! Gesture Control - Main Entry Point
//!
//! Reads hand landmarks from a recorded or piped tracker stream, recognizes
//! stable gestures and drives an LED bank or a serial device.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};

use gesture_control::actuator::{Actuator, LedBackend, LogPins, SerialBackend, SysfsPins};
use gesture_control::config::ActuatorConfig;
use gesture_control::gesture::ThumbMode;
use gesture_control::landmarks::replay::{JsonLinesSource, STDIN_INPUT};
use gesture_control::telemetry::{init_logging, LogConfig};
use gesture_control::{PipelineConfig, Session, ShutdownFlag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Led,
    Serial,
}

#[derive(Debug, Parser)]
#[command(name = "gesture-control")]
#[command(about = "Turn hand gestures into LED and serial commands")]
struct Cli {
    /// Config file (default: <config dir>/gesture-control/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON-lines landmark stream; `-` reads stdin
    #[arg(long, default_value = "-")]
    input: String,
    #[arg(long, value_enum)]
    backend: Option<Backend>,
    /// Log LED pin writes instead of driving GPIO
    #[arg(long)]
    dry_run: bool,
    #[arg(long = "serial-port")]
    serial_port: Option<String>,
    #[arg(long = "stable-frames")]
    stable_frames: Option<u32>,
    /// Classify on the four fingers only
    #[arg(long = "ignore-thumb")]
    ignore_thumb: bool,
    /// Replay rate for recorded input
    #[arg(long)]
    fps: Option<u32>,
    #[arg(long = "log-json")]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        json_format: cli.log_json,
        ..LogConfig::default()
    };
    let _log_guard =
        init_logging(&log_config).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let mut config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli)?;
    config.validate()?;

    tracing::info!(
        stable_frames = config.stable_frames,
        idle_timeout = ?config.idle_timeout(),
        thumb_mode = ?config.thumb_mode,
        "Configuration ready"
    );

    let shutdown = ShutdownFlag::new();
    spawn_ctrl_c_watcher(shutdown.clone())?;

    let source = JsonLinesSource::from_input(&cli.input)
        .with_context(|| format!("Failed to open landmark stream {}", cli.input))?;
    let replayed = cli.input != STDIN_INPUT;

    let actuator = open_actuator(&config.actuator)?;

    let mut session = Session::new(source, actuator, &config, shutdown);
    if replayed {
        session = session.with_pacing(config.frame_interval());
    }

    let stats = session.run().context("Gesture session failed")?;
    tracing::info!(
        frames = stats.frames,
        commands = stats.commands_sent,
        idle_offs = stats.idle_offs,
        transmit_errors = stats.transmit_errors,
        "Done"
    );

    Ok(())
}

fn apply_overrides(config: &mut PipelineConfig, cli: &Cli) -> anyhow::Result<()> {
    match cli.backend {
        Some(Backend::Led) if !matches!(config.actuator, ActuatorConfig::Led { .. }) => {
            config.actuator = ActuatorConfig::default();
            // Switching backend invalidates a table written for the other one
            config.commands = None;
        }
        Some(Backend::Serial) if !matches!(config.actuator, ActuatorConfig::Serial { .. }) => {
            let Some(port) = cli.serial_port.clone() else {
                bail!("--backend serial needs --serial-port");
            };
            config.actuator = ActuatorConfig::Serial {
                port,
                baud: gesture_control::actuator::serial::DEFAULT_BAUD,
                settle_ms: gesture_control::actuator::serial::DEFAULT_SETTLE.as_millis() as u64,
                off_code: None,
            };
            config.commands = None;
        }
        _ => {}
    }

    match &mut config.actuator {
        ActuatorConfig::Led { dry_run, .. } => *dry_run |= cli.dry_run,
        ActuatorConfig::Serial { port, .. } => {
            if let Some(override_port) = &cli.serial_port {
                *port = override_port.clone();
            }
        }
    }

    if let Some(frames) = cli.stable_frames {
        config.stable_frames = frames;
    }
    if cli.ignore_thumb {
        config.thumb_mode = ThumbMode::Ignored;
    }
    if let Some(fps) = cli.fps {
        config.target_fps = fps;
    }
    Ok(())
}

fn open_actuator(config: &ActuatorConfig) -> anyhow::Result<Box<dyn Actuator>> {
    let actuator: Box<dyn Actuator> = match config {
        ActuatorConfig::Led { pins, dry_run: true } => {
            tracing::info!(?pins, "LED backend in dry-run mode");
            Box::new(LedBackend::new(pins.clone(), LogPins))
        }
        ActuatorConfig::Led { pins, dry_run: false } => {
            Box::new(LedBackend::new(pins.clone(), SysfsPins::new()))
        }
        ActuatorConfig::Serial {
            port,
            baud,
            settle_ms,
            off_code,
        } => Box::new(
            SerialBackend::open(port, *baud, Duration::from_millis(*settle_ms), *off_code)
                .context("Failed to open serial actuator")?,
        ),
    };
    Ok(actuator)
}

/// Flip the shutdown flag on Ctrl-C; the session notices at the next frame
fn spawn_ctrl_c_watcher(shutdown: ShutdownFlag) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    std::thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Interrupt received; stopping after the current frame");
                        shutdown.request();
                    }
                    Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
                }
            });
        })
        .context("Failed to spawn Ctrl-C watcher")?;

    Ok(())
}
