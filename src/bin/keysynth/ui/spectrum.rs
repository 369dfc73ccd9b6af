//! Spectrum analyzer
//!
//! Hann-windowed FFT of the scope buffer, sampled at log-spaced frequencies
//! so the seven keys (C6..B6) and their octave shifts spread across the
//! width instead of bunching at the left edge.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const SPECTRUM_BINS: usize = 64;
const MIN_FREQ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin index for each display point
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 frequency, magnitude dB)
    points: Vec<(f64, f64)>,
    max_log_freq: f64,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft_len = fft_len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        let denom = (fft_len - 1) as f32;
        let window = (0..fft_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).max(MIN_FREQ * 2.0);
        let ratio = nyquist / MIN_FREQ;
        let half = fft_len / 2;

        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut points = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = MIN_FREQ * ratio.powf(t);
            let index = ((freq * fft_len as f64 / sample_rate as f64).round() as usize).min(half - 1);
            bin_indices.push(index);
            points.push((freq.log10(), FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            points,
            max_log_freq: nyquist.log10(),
        }
    }

    /// Recompute from the newest `fft_len` samples. Shorter input is ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        let len = self.window.len();
        if buffer.len() < len {
            return;
        }
        let recent = &buffer[buffer.len() - len..];

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(recent).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = len as f32 / 2.0;
        for (point, &index) in self.points.iter_mut().zip(&self.bin_indices) {
            let magnitude = self.scratch[index].norm() / norm;
            point.1 = (20.0 * (magnitude.max(1e-6) as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [MIN_FREQ.log10(), self.max_log_freq]
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(analyzer.data());

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds(analyzer.x_bounds())
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_peaks_near_its_frequency() {
        let sample_rate = 48_000.0;
        let mut analyzer = SpectrumAnalyzer::new(2048, sample_rate);
        let tone: Vec<f32> = (0..2048)
            .map(|i| (std::f32::consts::TAU * 1_000.0 * i as f32 / sample_rate).sin())
            .collect();
        analyzer.update(&tone);

        let (peak_log_freq, _) = analyzer
            .data()
            .iter()
            .copied()
            .fold((0.0, f64::MIN), |best, p| if p.1 > best.1 { p } else { best });
        let peak = 10f64.powf(peak_log_freq);
        assert!((800.0..1_250.0).contains(&peak), "peak at {peak}Hz");
    }

    #[test]
    fn short_buffers_are_ignored() {
        let mut analyzer = SpectrumAnalyzer::new(1024, 48_000.0);
        analyzer.update(&[1.0; 10]);
        assert!(analyzer.data().iter().all(|&(_, db)| db == FLOOR_DB));
    }
}
