//! fmvoice - play the FM voice from the computer keyboard
//!
//! Run with: cargo run
//!
//! Set `FMVOICE_LOG=<path>` to write logs to a file; the terminal belongs to
//! the UI, so nothing is logged otherwise.

mod app;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::WrapErr;
use fm_voice::{
    config::{EnvelopeConfig, OscillatorConfig},
    graph::OscSlot,
    VoiceConfig,
};

use app::FmVoiceApp;

const LOG_ENV: &str = "FMVOICE_LOG";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging()?;

    // A bell-ish starting patch so the first key press already sounds FM.
    let config = VoiceConfig::default()
        .with_envelope(EnvelopeConfig::new(0.01, 0.6, 0.35, 0.8))
        .with_oscillator(OscSlot::One, OscillatorConfig::new(2, 1.0))
        .with_oscillator(OscSlot::Two, OscillatorConfig::new(1, 3.5))
        .with_oscillator(OscSlot::Three, OscillatorConfig::new(1, 2.0))
        .with_oscillator(OscSlot::Four, OscillatorConfig::new(0, 1.0));

    FmVoiceApp::new(config).run()
}

fn init_logging() -> color_eyre::Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };

    let file = File::create(&path)
        .wrap_err_with(|| format!("failed to open log file {}", path.to_string_lossy()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
