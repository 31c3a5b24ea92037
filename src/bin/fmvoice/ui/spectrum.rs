//! Spectrum analyzer widget
//!
//! FM sidebands sit at `carrier ± k·modulator`, so a log-frequency view of
//! the output shows directly what the index and ratio controls do.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of log-spaced points on the x axis
const SPECTRUM_BINS: usize = 96;
const LOWEST_FREQ: f32 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin for each display point
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 frequency, magnitude in dB)
    spectrum: Vec<(f64, f64)>,
    /// Frequency of the loudest display point, in Hz
    peak_freq: f64,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the scope buffer.
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        // Hann window
        let window: Vec<f32> = (0..buffer_len)
            .map(|i| {
                if buffer_len > 1 {
                    let denom = (buffer_len - 1) as f32;
                    0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();

        let max_freq = (sample_rate / 2.0).min(20_000.0).max(LOWEST_FREQ + 1.0) as f64;
        let min_freq = LOWEST_FREQ as f64;
        let half = (buffer_len / 2).max(1);

        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = min_freq * (max_freq / min_freq).powf(t);
            let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(index.min(half - 1));
            spectrum.push((freq.log10(), FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
            peak_freq: 0.0,
        }
    }

    /// Recompute from `buffer`; ignored if its length doesn't match the FFT.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let mut loudest = FLOOR_DB;
        for ((log_freq, magnitude_db), &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            *magnitude_db = (10.0 * (power as f64).log10()).max(FLOOR_DB);
            if *magnitude_db > loudest {
                loudest = *magnitude_db;
                self.peak_freq = 10f64.powf(*log_freq);
            }
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    pub fn peak_freq(&self) -> f64 {
        self.peak_freq
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let spectrum = analyzer.data();
    let block = Block::default()
        .title(format!(" Spectrum  peak ≈ {:.0} Hz ", analyzer.peak_freq()))
        .borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let (min_x, max_x) = match (spectrum.first(), spectrum.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => (1.0, 4.0),
    };
    let max_db = spectrum.iter().map(|(_, db)| *db).fold(FLOOR_DB, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
