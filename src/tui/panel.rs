//! # Status Panel
//!
//! The read-only overlay rendered just above the prompt. Providers are
//! swappable behind `PanelSource`: given a target width and height they
//! return text lines, and `normalize` squares the result off to exactly
//! that many lines of exactly that many columns.
//!
//! Implementations must be pure with respect to layout — reading a clock is
//! fine, touching the terminal is not.

use unicode_width::UnicodeWidthChar;

/// Rows the overlay occupies when visible. Hidden, it reserves zero.
pub const PANEL_HEIGHT: u16 = 10;

pub trait PanelSource: Send + Sync {
    fn render(&self, width: u16, height: u16) -> Vec<String>;
}

/// Default panel: local time on the first line, blanks below.
pub struct ClockPanel;

impl PanelSource for ClockPanel {
    fn render(&self, _width: u16, height: u16) -> Vec<String> {
        let mut lines = vec![String::new(); height as usize];
        if let Some(first) = lines.first_mut() {
            *first = format!(
                "  Time: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
        }
        lines
    }
}

/// Pads or truncates provider output to exactly `height` lines, each exactly
/// `width` display columns (unicode-width aware).
pub fn normalize(lines: Vec<String>, width: u16, height: u16) -> Vec<String> {
    (0..height as usize)
        .map(|i| fit_width(lines.get(i).map(String::as_str).unwrap_or(""), width as usize))
        .collect()
}

fn fit_width(line: &str, width: usize) -> String {
    let mut out = String::new();
    let mut cols = 0;
    for ch in line.chars() {
        let w = ch.width().unwrap_or(0);
        if cols + w > width {
            break;
        }
        out.push(ch);
        cols += w;
    }
    out.push_str(&" ".repeat(width.saturating_sub(cols)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn clock_panel_fills_requested_height() {
        let lines = ClockPanel.render(80, 10);
        assert_eq!(lines.len(), 10);
        assert!(lines[0].contains("Time:"));
        assert!(lines[1..].iter().all(String::is_empty));
    }

    #[test]
    fn normalize_pads_every_line_to_width() {
        let lines = normalize(vec!["ab".to_string()], 5, 3);
        assert_eq!(lines, vec!["ab   ", "     ", "     "]);
    }

    #[test]
    fn normalize_truncates_overlong_lines_and_extra_rows() {
        let lines = normalize(
            vec!["abcdefgh".to_string(), "x".to_string(), "y".to_string()],
            4,
            2,
        );
        assert_eq!(lines, vec!["abcd", "x   "]);
    }

    #[test]
    fn normalize_counts_display_columns_not_chars() {
        // CJK chars are two columns wide; three of them do not fit in 5.
        let lines = normalize(vec!["时间时".to_string()], 5, 1);
        assert_eq!(lines[0].width(), 5);
        assert_eq!(lines[0], "时间 ");
    }

    #[test]
    fn custom_provider_is_swappable() {
        struct Fixed;
        impl PanelSource for Fixed {
            fn render(&self, _width: u16, height: u16) -> Vec<String> {
                vec!["fixed".to_string(); height as usize]
            }
        }
        let provider: Box<dyn PanelSource> = Box::new(Fixed);
        let lines = normalize(provider.render(8, 2), 8, 2);
        assert_eq!(lines, vec!["fixed   ", "fixed   "]);
    }
}
