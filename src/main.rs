//! Application entry point: EchoVerse.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the generator, link fetcher, PDF extractor and speech engine.
//! 5. Create session channels (`command`, `event`).
//! 6. Spawn the session worker on the tokio runtime.
//! 7. Open the default audio output device (optional).
//! 8. Run [`eframe::run_native`]; blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use echoverse::{
    app::ExplainerApp,
    audio::AudioPlayer,
    config::AppConfig,
    extract::{DocumentExtractor, LinkFetcher, LinkSource, PdfExtractor},
    generate::{ApiGenerator, Generator},
    session::{SessionCommand, SessionEvent, SessionWorker},
    speech::{EspeakSynthesizer, SpeechSynthesizer},
};
use tokio::sync::mpsc;

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("EchoVerse")
        .with_inner_size([width, height])
        .with_min_inner_size([420.0, 360.0])
        .with_drag_and_drop(true);

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("EchoVerse starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads: the worker loop + HTTP I/O)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // 4. Collaborators
    let generator: Arc<dyn Generator> = Arc::new(ApiGenerator::from_config(&config.generator));
    let fetcher: Arc<dyn LinkSource> = Arc::new(LinkFetcher::from_config(&config.fetch));
    let extractor: Arc<dyn DocumentExtractor> = Arc::new(PdfExtractor::new());
    let synthesizer: Arc<dyn SpeechSynthesizer> =
        Arc::new(EspeakSynthesizer::from_config(&config.speech));

    log::info!(
        "generator: {} at {}, speech engine: {}",
        config.generator.model,
        config.generator.base_url,
        config.speech.engine_binary
    );

    // 5. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<SessionCommand>(16);
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(32);

    // 6. Session worker
    let worker = SessionWorker::new(
        generator,
        fetcher,
        extractor,
        synthesizer,
        config.ui.preview_chars,
    );
    rt.spawn(worker.run(command_rx, event_tx));

    // 7. Speaker output (the app still runs without one)
    let player = match AudioPlayer::new() {
        Ok(player) => Some(player),
        Err(e) => {
            log::warn!("Audio output unavailable: {e}");
            None
        }
    };

    // 8. Build the egui app and run it (blocks until the window is closed)
    let app = ExplainerApp::new(command_tx, event_rx, player, config.clone());
    let options = native_options(&config);

    eframe::run_native(
        "EchoVerse",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))?;

    log::info!("EchoVerse shut down");
    Ok(())
}
