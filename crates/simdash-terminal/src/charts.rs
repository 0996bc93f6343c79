//! Horizontal text bar charts
//!
//! All series in one chart share a scale, so bars are comparable across
//! series the same way grouped bars on a common axis are.

use std::fmt::Write;

/// Bar character (ASCII)
const BAR_FULL: char = '#';

/// Narrowest bar area worth drawing
const MIN_BAR_WIDTH: usize = 10;

/// One named series of a chart; `None` values are drawn as `n/a`
pub struct Series<'a> {
    pub name: &'a str,
    pub values: &'a [Option<f64>],
}

/// Render a grouped horizontal bar chart
///
/// `format_value` renders the number printed after each bar. `width` is the
/// total line width available.
pub fn bar_chart(
    title: &str,
    labels: &[String],
    series: &[Series<'_>],
    width: usize,
    format_value: impl Fn(f64) -> String,
) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{title}");

    if labels.is_empty() {
        output.push_str("  (no data)\n");
        return output;
    }

    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let name_width = series
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);

    let max_value = series
        .iter()
        .flat_map(|s| s.values.iter().flatten())
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    // label, name, two gaps, and room for the value text
    let reserved = label_width + name_width + 4 + 14;
    let bar_width = width.saturating_sub(reserved).max(MIN_BAR_WIDTH);

    for (row, label) in labels.iter().enumerate() {
        for (index, s) in series.iter().enumerate() {
            let shown_label = if index == 0 { label.as_str() } else { "" };
            let value = s.values.get(row).copied().flatten();
            let (bar, text) = match value {
                Some(v) if v.is_finite() => (
                    scaled_bar(v, max_value, bar_width),
                    format_value(v),
                ),
                _ => (String::new(), "n/a".to_string()),
            };
            let _ = writeln!(
                output,
                "  {shown_label:<label_width$} {:<name_width$} {bar:<bar_width$} {text}",
                s.name
            );
        }
    }

    output
}

fn scaled_bar(value: f64, max_value: f64, bar_width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max_value) * bar_width as f64).round() as usize;
    // Non-zero values always get at least one mark
    std::iter::repeat_n(BAR_FULL, len.clamp(1, bar_width)).collect()
}
