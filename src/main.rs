//! phsense daemon — main entry point.
//!
//! Hexagonal wiring on a Raspberry Pi:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                  │
//! │                                                           │
//! │  SensorPins        ChimePin        LogEventSink           │
//! │  (PinPort + edges) (PinPort)       (EventSink)            │
//! │  SystemClock       button ISRs ──▶ RequestLatch           │
//! │                                                           │
//! │  ────────────── Port Trait Boundary ───────────────       │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────┐      │
//! │  │  AcquisitionService (sensor thread)             │      │
//! │  │  sequencer · counter · classifier               │      │
//! │  └─────────────────────────────────────────────────┘      │
//! │                                                           │
//! │  Main thread: button poll → chime → request → audio       │
//! └───────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info, warn};

use phsense::adapters::clock::SystemClock;
use phsense::adapters::log_sink::LogEventSink;
use phsense::adapters::rpi::{self, ChimePin, SensorPins};
use phsense::app::events::ReadOutcome;
use phsense::app::ports::ClockPort;
use phsense::app::service::AcquisitionService;
use phsense::buttons::ButtonWatcher;
use phsense::config::SystemConfig;
use phsense::events::RequestLatch;
use phsense::feedback::{AudioLibrary, Chime, ChimePattern};
use phsense::reference::ReferenceTable;
use phsense::sensor::{EdgeCounter, ReadingCell};

/// Read the JSON config file, falling back to defaults on any problem —
/// a bad config must not keep the analyser from coming up.
fn load_config(path: &str) -> SystemConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(config) => {
                info!("configuration loaded from {path}");
                config
            }
            Err(e) => {
                warn!("bad config file {path}: {e}; using defaults");
                SystemConfig::default()
            }
        },
        Err(_) => {
            info!("no config file at {path}, using defaults");
            SystemConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("phsense v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "phsense.json".to_owned());
    let config = load_config(&config_path);

    // Reference tables load once, before any hardware is claimed.
    let narrow = ReferenceTable::from_csv_path(&config.narrow_table_path)
        .with_context(|| format!("loading narrow table {}", config.narrow_table_path))?;
    let wide = ReferenceTable::from_csv_path(&config.wide_table_path)
        .with_context(|| format!("loading wide table {}", config.wide_table_path))?;

    // Shared state between the three contexts.
    let clock = Arc::new(SystemClock::new());
    let committed = Arc::new(ReadingCell::new());
    let counter = Arc::new(Mutex::new(EdgeCounter::new(Arc::clone(&committed))));
    let latch = Arc::new(RequestLatch::new());

    // Hardware adapters.
    let gpio = rppal::gpio::Gpio::new().context("opening GPIO")?;
    let mut sensor_pins =
        SensorPins::new(&gpio, counter, Arc::clone(&clock)).context("claiming sensor pins")?;
    let mut chime_pins = ChimePin::new(&gpio).context("claiming chime pin")?;
    let _buttons = rpi::register_buttons(&gpio, Arc::clone(&latch))?;

    // SIGINT/SIGTERM both land here.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
            .context("installing signal handler")?;
    }

    // The acquisition service owns the sequencing thread.
    let (mut service, handle) =
        AcquisitionService::new(&config, Arc::clone(&committed), narrow, wide);
    let sensor_thread = {
        let clock = Arc::clone(&clock);
        let shutdown = Arc::clone(&shutdown);
        std::thread::Builder::new()
            .name("sensor".to_owned())
            .spawn(move || {
                let mut sink = LogEventSink::new();
                service.run(&mut sensor_pins, &*clock, &mut sink, &shutdown);
            })
            .context("spawning sensor thread")?
    };

    // Audible "ready".
    Chime::play(ChimePattern::Long, &mut chime_pins, &*clock);

    let audio = Arc::new(AudioLibrary::new(
        config.audio_dir.as_str(),
        config.audio_player.as_str(),
    ));
    let mut watcher = ButtonWatcher::new(Arc::clone(&latch));
    let poll_interval = Duration::from_millis(config.button_poll_interval_ms);

    while !shutdown.load(Ordering::SeqCst) {
        if let Some(kind) = watcher.poll(&*clock) {
            Chime::play(ChimePattern::for_request(kind), &mut chime_pins, &*clock);

            let audio = Arc::clone(&audio);
            let accepted = handle.request_reading(kind, move |outcome| match outcome {
                ReadOutcome::Match { label, .. } => {
                    if let Err(e) = audio.play(&label) {
                        error!("result playback failed: {e}");
                    }
                }
                ReadOutcome::NoSample => warn!("no usable sample; press again to retry"),
            });
            if !accepted {
                break;
            }
        }
        clock.sleep(poll_interval);
    }

    info!("shutting down");
    drop(handle);
    if sensor_thread.join().is_err() {
        error!("sensor thread panicked");
    }
    Ok(())
}
