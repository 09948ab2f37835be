//! Viewport layout: the status panel stacked above the input box.
//!
//! `reserved_rows` is the single source of the inline viewport height; the
//! event loop rebuilds the viewport whenever it changes (input growth,
//! panel toggle), which is what makes a toggle take effect immediately.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::input_box::InputBox;
use crate::tui::panel::{self, PANEL_HEIGHT};

/// Terminal rows the prompt surface claims: input box, plus the overlay
/// when visible. A hidden panel reserves zero extra rows.
pub fn reserved_rows(panel_visible: bool, input: &InputBox) -> u16 {
    input.height() + if panel_visible { PANEL_HEIGHT } else { 0 }
}

pub fn draw(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let area = frame.area();

    if app.panel_visible && area.height > tui.input_box.height() {
        let [panel_area, input_area] = Layout::vertical([Length(PANEL_HEIGHT), Min(3)]).areas(area);
        draw_panel(frame, panel_area, tui);
        tui.input_box.render(frame, input_area);
    } else {
        tui.input_box.render(frame, area);
    }
}

fn draw_panel(frame: &mut Frame, area: Rect, tui: &TuiState) {
    let lines = panel::normalize(
        tui.panel.render(area.width, area.height),
        area.width,
        area.height,
    );
    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    let style = Style::default()
        .fg(Color::Rgb(0xe6, 0xe6, 0xe6))
        .bg(Color::Rgb(0x30, 0x3a, 0x46));
    frame.render_widget(Paragraph::new(text).style(style), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn toggling_panel_twice_restores_reserved_rows() {
        let input = InputBox::new();
        let visible = reserved_rows(true, &input);
        let hidden = reserved_rows(false, &input);
        assert_eq!(visible - hidden, PANEL_HEIGHT);
        assert_eq!(reserved_rows(true, &input), visible);
    }

    #[test]
    fn reserved_rows_track_input_growth() {
        let mut input = InputBox::new();
        let before = reserved_rows(false, &input);
        input.buffer = "one\ntwo\nthree".to_string();
        assert_eq!(reserved_rows(false, &input), before + 2);
    }

    #[test]
    fn draw_shows_panel_only_when_visible() {
        let mut app = test_app();
        let mut tui = TuiState::new();

        let backend = TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, &app, &mut tui)).unwrap();
        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(text.contains("Time:"));

        app.panel_visible = false;
        terminal.draw(|f| draw(f, &app, &mut tui)).unwrap();
        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(!text.contains("Time:"));
    }
}
