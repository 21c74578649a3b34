//! Application entry point for the chat translator.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Resolve the capture region (configured, or derived from the screen).
//! 5. Start OCR on the blocking pool, falling back to an unavailable engine.
//! 6. Build the translator and the result sink from config.
//! 7. Spawn the pipeline orchestrator's dispatch loop.
//! 8. Enable monitoring and start the hotkey poller thread.
//! 9. Read manual triggers from stdin until `q`, EOF or Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use chat_translator::{
    capture::{primary_screen_size, CaptureRegion, RegionHandle, ScreenCapture},
    config::{AppConfig, OutputFormat},
    hotkey::{parse_key, HotkeyPoller, MonitorFlag, RdevKeyState, TriggerSource},
    ocr::{initialize_with_fallback, RecognitionEngine, TesseractEngine, UnavailableEngine},
    pipeline::{JsonLinesSink, LogSink, PipelineOrchestrator, ResultSink, Trigger},
    text::LineClusterer,
    translate::build_translator,
};

/// Fallback used when the screen size cannot be queried.
const FALLBACK_SCREEN: (u32, u32) = (1920, 1080);

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("chat translator starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(config))
}

async fn run(mut config: AppConfig) -> Result<()> {
    // 4. Capture region
    let (screen_w, screen_h) = primary_screen_size().unwrap_or_else(|e| {
        log::warn!("Could not query screen size ({e}); assuming {FALLBACK_SCREEN:?}");
        FALLBACK_SCREEN
    });
    let custom = config.capture.region.filter(|r| match r.validate() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Ignoring configured capture region ({e})");
            false
        }
    });
    let region = RegionHandle::new(CaptureRegion::default_chat_area(screen_w, screen_h), custom);
    log::info!(
        "Capture area: {} ({})",
        region.snapshot(),
        if region.is_custom() { "custom" } else { "default" }
    );

    // 5. OCR engine (may fail if tesseract is missing; degrade gracefully)
    let engine = start_ocr(&config).await;

    // 6. Translator + sink
    let translator = build_translator(&config.translator);
    let sink: Arc<dyn ResultSink> = match config.output.format {
        OutputFormat::Log => Arc::new(LogSink),
        OutputFormat::Json => Arc::new(JsonLinesSink::new(std::io::stdout())),
    };

    // 7. Orchestrator
    let orchestrator = Arc::new(
        PipelineOrchestrator::new(
            region.clone(),
            Arc::new(ScreenCapture::new()),
            engine,
            translator,
            sink,
        )
        .with_clusterer(LineClusterer::new(config.clustering.line_threshold))
        .with_target_language(config.translator.target_language.clone()),
    );

    let (trigger_tx, trigger_rx) = mpsc::channel::<Trigger>(4);
    let dispatcher = tokio::spawn(Arc::clone(&orchestrator).run(trigger_rx));

    // 8. Hotkey monitoring
    let monitoring = MonitorFlag::new();
    monitoring.enable();
    let hotkey = start_hotkey(&config, &monitoring, trigger_tx.clone());

    // 9. Manual triggers
    log::info!(
        "Press Enter (or type \"c\") to capture, \"r <left> <top> <width> <height>\" \
         to set the capture area, \"r\" to reset it, \"k <key>\" to change the hotkey, \
         \"q\" to quit"
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Ctrl-C received");
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(cmd)) => match cmd.trim() {
                        "" | "c" => {
                            if trigger_tx.try_send(Trigger::Manual).is_err() {
                                log::debug!("manual trigger dropped, queue full");
                            }
                        }
                        "q" => break,
                        cmd if cmd == "r" || cmd.starts_with("r ") => {
                            if let Err(e) = change_region(&cmd[1..], &region, &mut config) {
                                log::warn!("Region not changed: {e:#}");
                            }
                        }
                        cmd if cmd.starts_with("k ") => {
                            let keys = hotkey.as_deref();
                            if let Err(e) = change_key(&cmd[2..], keys, &mut config) {
                                log::warn!("Hotkey not changed: {e:#}");
                            }
                        }
                        other => log::warn!("Unknown command {other:?}"),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("Failed to read stdin: {e}");
                        break;
                    }
                }
            }
        }
    }

    // Shutdown
    monitoring.disable();
    drop(trigger_tx);
    dispatcher.abort();
    log::info!("chat translator stopped");
    Ok(())
}

/// `r` with no arguments resets to the default area; otherwise the arguments
/// are parsed as a region.  Settings are saved first; the live region only
/// changes once the save succeeded.
fn change_region(args: &str, region: &RegionHandle, config: &mut AppConfig) -> Result<()> {
    let args = args.trim();
    let selected = if args.is_empty() {
        None
    } else {
        Some(args.parse::<CaptureRegion>()?)
    };

    let mut updated = config.clone();
    updated.set_capture_region(selected)?;
    updated.save().context("failed to save settings")?;

    match selected {
        Some(r) => region.set(r)?,
        None => region.reset(),
    }
    *config = updated;
    Ok(())
}

/// Validate and save a new hotkey name, then rebind the running listener.
fn change_key(name: &str, keys: Option<&RdevKeyState>, config: &mut AppConfig) -> Result<()> {
    let mut updated = config.clone();
    let key = updated.set_capture_key(name)?;
    updated.save().context("failed to save settings")?;

    match keys {
        Some(keys) => keys.set_key(key),
        None => log::warn!("Hotkey listener is not running; {key:?} applies after a restart"),
    }
    *config = updated;
    Ok(())
}

// ---------------------------------------------------------------------------
// Startup helpers
// ---------------------------------------------------------------------------

async fn start_ocr(config: &AppConfig) -> Arc<dyn RecognitionEngine> {
    let languages = config.ocr.languages.clone();
    let prefer_acceleration = config.ocr.prefer_acceleration;

    let started = tokio::task::spawn_blocking(move || {
        initialize_with_fallback(prefer_acceleration, |accelerated| {
            TesseractEngine::initialize(&languages, accelerated)
        })
    })
    .await;

    match started {
        Ok(Ok(initialized)) => Arc::new(initialized.engine),
        Ok(Err(e)) => {
            log::error!("OCR unavailable: {e}. Triggers will be ignored.");
            Arc::new(UnavailableEngine {
                reason: e.to_string(),
            })
        }
        Err(e) => {
            log::error!("OCR start-up task failed: {e}");
            Arc::new(UnavailableEngine {
                reason: e.to_string(),
            })
        }
    }
}

/// Start the key-state listener and poller.  Failures leave manual triggers
/// working.  Returns the listener so the key can be rebound later.
fn start_hotkey(
    config: &AppConfig,
    monitoring: &MonitorFlag,
    trigger_tx: mpsc::Sender<Trigger>,
) -> Option<Arc<RdevKeyState>> {
    let key = parse_key(&config.hotkey.capture_key).unwrap_or_else(|| {
        log::warn!("Unknown hotkey {:?}; using F9", config.hotkey.capture_key);
        rdev::Key::F9
    });

    let keys = match RdevKeyState::start(key) {
        Ok(keys) => Arc::new(keys),
        Err(e) => {
            log::warn!("Hotkey listener unavailable ({e}); manual triggers only");
            return None;
        }
    };

    let poller = HotkeyPoller::new(
        Arc::clone(&keys),
        Duration::from_millis(config.hotkey.poll_interval_ms),
        Duration::from_millis(config.hotkey.cooldown_ms),
    );
    let fire = Box::new(move || {
        if trigger_tx.try_send(Trigger::Hotkey).is_err() {
            log::debug!("hotkey: trigger dropped, queue full");
        }
    });

    if let Err(e) = poller.spawn(monitoring.clone(), fire) {
        log::warn!("Hotkey poller unavailable ({e}); manual triggers only");
        return None;
    }
    Some(keys)
}
