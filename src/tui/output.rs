//! Terminal half of the output multiplexer.
//!
//! Queued blocks become lines in the scrolling region above the inline
//! viewport. `flush_deferred` runs only between frames on the loop thread —
//! ratatui's `insert_before` is the redraw-safe section, so scrollback
//! writes can never tear a half-painted prompt. Once the loop has exited
//! and the prompt is gone, `flush_direct` writes straight to stdout.

use std::io;

use ratatui::DefaultTerminal;
use ratatui::style::Color;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::core::outbox::{Outbox, OutputBlock};
use crate::tui::markdown;

/// Drains the outbox into the scrollback, preserving emit order.
pub fn flush_deferred(outbox: &mut Outbox, terminal: &mut DefaultTerminal) -> io::Result<()> {
    let width = terminal.size()?.width;
    while let Some(block) = outbox.pop() {
        let paragraph = Paragraph::new(block_text(block)).wrap(Wrap { trim: false });
        let height = paragraph.line_count(width).max(1) as u16;
        terminal.insert_before(height, |buf| paragraph.render(buf.area, buf))?;
    }
    Ok(())
}

/// Drains the outbox straight to stdout (prompt no longer active).
pub fn flush_direct(outbox: &mut Outbox) {
    while let Some(block) = outbox.pop() {
        match block {
            OutputBlock::Plain(s) | OutputBlock::Markdown(s) => println!("{s}"),
        }
    }
}

fn block_text(block: OutputBlock) -> Text<'static> {
    match block {
        OutputBlock::Plain(s) => Text::raw(s),
        OutputBlock::Markdown(s) => markdown::render(&s, Color::Reset),
    }
}
