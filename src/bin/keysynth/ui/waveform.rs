//! Oscilloscope over the rendered output, plotted in 8-bit output codes

use keysynth::io::quantize;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Output code of a silent sample
const MIDLINE: f64 = 128.0;

/*
  Each scope sample is drawn as a flat run one sample wide, so a signal
  sitting on a few codes reads as a staircase:

  130 ┤    ┌──┐
  129 ┤ ┌──┘  └──┐
  128 ┼─┘        └──
*/

/// Recover the output byte behind each dequantized scope sample.
pub fn output_codes(scope: &[f32]) -> Vec<u8> {
    scope.iter().map(|&sample| quantize(sample)).collect()
}

/// Step-plot points in `[0, 1] x [0, 255]`, two per code.
pub fn step_points(codes: &[u8]) -> Vec<(f64, f64)> {
    let width = codes.len().max(1) as f64;
    codes
        .iter()
        .enumerate()
        .flat_map(|(i, &code)| {
            let level = code as f64;
            [(i as f64 / width, level), ((i + 1) as f64 / width, level)]
        })
        .collect()
}

pub fn render_waveform(frame: &mut Frame, area: Rect, scope: &[f32]) {
    let codes = output_codes(scope);
    let (lo, hi) = codes
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &c| (lo.min(c), hi.max(c)));
    let title = if codes.is_empty() {
        " Scope (8-bit) ".to_string()
    } else {
        format!(" Scope (8-bit) codes {lo}..{hi} ")
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let data = step_points(&codes);
    let midline = [(0.0, MIDLINE), (1.0, MIDLINE)];

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&midline),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 255.0])
                .labels(vec!["0", "128", "255"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
