//! Terminal visualization for statistics.
//!
//! Provides ASCII charts for the last seven days of focus time.

/// Characters for sparkline rendering.
const BAR_CHARS: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];
const FULL_BLOCK: char = '█';

/// Render a horizontal bar chart.
///
/// # Arguments
///
/// * `data` - Vec of (label, value) pairs
/// * `max_label_width` - Maximum width for labels
/// * `bar_width` - Width of the bar portion
///
/// # Returns
///
/// A multi-line string with the chart.
#[must_use]
pub fn render_bar_chart(data: &[(String, u64)], max_label_width: usize, bar_width: usize) -> String {
    if data.is_empty() {
        return String::new();
    }

    let max_value = data.iter().map(|(_, v)| *v).max().unwrap_or(1).max(1);
    let mut lines = Vec::new();

    for (label, value) in data {
        let truncated_label = if label.chars().count() > max_label_width {
            label.chars().take(max_label_width).collect::<String>()
        } else {
            format!("{label:max_label_width$}")
        };

        let bar_length = ((*value as f64 / max_value as f64) * bar_width as f64) as usize;
        let bar = FULL_BLOCK.to_string().repeat(bar_length);
        let padding = " ".repeat(bar_width.saturating_sub(bar_length));

        lines.push(format!("{truncated_label} |{bar}{padding} {value}"));
    }

    lines.join("\n")
}

/// Render a sparkline (compact inline chart).
///
/// Zero is always blank; any non-zero value shows at least the lowest bar.
#[must_use]
pub fn render_sparkline(values: &[u64]) -> String {
    if values.is_empty() {
        return String::new();
    }

    let max_value = values.iter().copied().max().unwrap_or(1).max(1);

    values
        .iter()
        .map(|&v| {
            if v == 0 {
                BAR_CHARS[0]
            } else {
                let normalized = (v as f64 / max_value as f64 * 7.0) as usize;
                BAR_CHARS[normalized.clamp(1, 7)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sparkline() {
        let values = [0, 2, 5, 3, 8, 4, 1];
        let sparkline = render_sparkline(&values);
        assert_eq!(sparkline.chars().count(), 7);
        assert!(sparkline.starts_with(' '));
        assert!(sparkline.contains('▇'));
    }

    #[test]
    fn test_render_sparkline_small_values_visible() {
        let sparkline = render_sparkline(&[1, 100]);
        assert_eq!(sparkline, "▁▇");
    }

    #[test]
    fn test_render_sparkline_empty() {
        assert!(render_sparkline(&[]).is_empty());
    }

    #[test]
    fn test_render_bar_chart() {
        let data = vec![
            ("Mon".to_string(), 25),
            ("Tue".to_string(), 50),
            ("Wed".to_string(), 0),
        ];
        let chart = render_bar_chart(&data, 3, 10);
        let lines: Vec<_> = chart.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains(&"█".repeat(10)));
        assert!(lines[2].ends_with(" 0"));
    }

    #[test]
    fn test_render_bar_chart_truncates_labels() {
        let data = vec![("Wednesday".to_string(), 1)];
        let chart = render_bar_chart(&data, 3, 4);
        assert!(chart.starts_with("Wed |"));
    }
}
