//! FmVoiceApp - audio stream setup and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::{error, info};

use fm_voice::{dsp::StereoFrame, graph::RenderCtx, FmVoice, VoiceConfig, MAX_BLOCK_SIZE};

use super::ui::{UiApp, VoiceStatus, VIS_BUFFER_SIZE};

pub struct FmVoiceApp {
    config: VoiceConfig,
}

impl FmVoiceApp {
    pub fn new(config: VoiceConfig) -> Self {
        Self { config }
    }

    /// Open the default output device and hand the terminal to the UI until
    /// the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, "audio device opened");

        let (mut voice, handle) = FmVoice::with_handle(self.config)?;
        let mut ctx = RenderCtx::new(sample_rate)?;

        // Audio → UI: scope frames and a per-callback status snapshot.
        let (mut scope_tx, scope_rx) = RingBuffer::<StereoFrame>::new(VIS_BUFFER_SIZE * 4);
        let (mut status_tx, status_rx) = RingBuffer::<VoiceStatus>::new(64);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                // Messages are drained once per chunk, so a control change
                // lands within MAX_BLOCK_SIZE frames.
                for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    voice.render_interleaved(chunk, channels, &mut ctx);
                    for frame in chunk.chunks(channels) {
                        if let Some(stereo) = scope_frame(frame) {
                            let _ = scope_tx.push(stereo);
                        }
                    }
                }

                let _ = status_tx.push(VoiceStatus::capture(voice.voice()));
            },
            |err| error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(handle, scope_rx, status_rx, sample_rate).run(&mut terminal);
        ratatui::restore();

        info!("shutting down");
        result
    }
}

/// Left and right of one interleaved device frame. A mono device shows its
/// downmix on both traces.
fn scope_frame(frame: &[f32]) -> Option<StereoFrame> {
    match frame {
        [mono] => Some(StereoFrame::new(*mono, *mono)),
        [left, right, ..] => Some(StereoFrame::new(*left, *right)),
        [] => None,
    }
}
