//! # InputBox Component
//!
//! The multi-line line editor anchored at the bottom of the terminal.
//!
//! ## Responsibilities
//!
//! - Capture text input and editing (cursor movement, backspace, delete, paste)
//! - Enter submits; blank buffers are refused
//! - Ctrl+J inserts a newline, capped at 10 rows
//! - Tab completes slash commands
//! - Ctrl+D is EOF on an empty buffer, forward-delete otherwise
//!
//! The buffer uses hard newlines only — no soft wrap. Lines wider than the
//! box clip, matching the prompt's no-wrap rendering. The model id and busy
//! flag are props synced from the application state each frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::action::MAX_INPUT_ROWS;
use crate::core::commands;
use crate::tui::event::TuiEvent;

/// Top + bottom borders consumed vertically
const VERTICAL_OVERHEAD: u16 = 2;
/// Offset from area edge to content (border width)
const BORDER_OFFSET: u16 = 1;

const PLACEHOLDER: &str = "Message (Enter sends, Ctrl+J newline, /help for commands)";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter on a non-blank buffer)
    Submit(String),
    /// End of input (Ctrl+D on an empty buffer)
    Eof,
}

pub struct InputBox {
    /// Text buffer (internal state)
    pub buffer: String,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// Active model id (prop)
    pub model_id: &'static str,
    /// Request in flight (prop); shown in the title
    pub busy: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            model_id: "deepseek-chat",
            busy: false,
        }
    }

    /// Rows the box needs: content rows (1..=10) plus borders.
    pub fn height(&self) -> u16 {
        let rows = self.row_count().min(MAX_INPUT_ROWS) as u16;
        rows.max(1) + VERTICAL_OVERHEAD
    }

    fn row_count(&self) -> usize {
        self.buffer.split('\n').count()
    }

    fn line_start(&self, pos: usize) -> usize {
        self.buffer[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.buffer[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(self.buffer.len())
    }

    fn move_vertical(&mut self, down: bool) -> bool {
        let start = self.line_start(self.cursor);
        let column = self.buffer[start..self.cursor].chars().count();
        let target = if down {
            let end = self.line_end(self.cursor);
            if end == self.buffer.len() {
                return false;
            }
            end + 1
        } else {
            if start == 0 {
                return false;
            }
            self.line_start(start - 1)
        };
        let target_end = self.line_end(target);
        self.cursor = self.buffer[target..target_end]
            .char_indices()
            .nth(column)
            .map(|(i, _)| target + i)
            .unwrap_or(target_end);
        true
    }

    /// Completes a `/`-prefixed buffer: fills the unique candidate, or
    /// extends to the longest common prefix when several match.
    fn complete_command(&mut self) {
        if !self.buffer.starts_with('/') || self.buffer.contains('\n') {
            return;
        }
        let candidates = commands::completions(&self.buffer);
        let Some(first) = candidates.first() else {
            return;
        };
        let completed = if candidates.len() == 1 {
            first.to_string()
        } else {
            longest_common_prefix(&candidates).to_string()
        };
        if completed.len() > self.buffer.len() {
            self.buffer = completed;
            self.cursor = self.buffer.len();
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<InputEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                if *c == '\n' && self.row_count() >= MAX_INPUT_ROWS {
                    return None;
                }
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                None
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(self.cursor, text);
                self.cursor += text.len();
                None
            }
            TuiEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor);
                    self.buffer.drain(prev..self.cursor);
                    self.cursor = prev;
                }
                None
            }
            TuiEvent::Delete => {
                self.delete_forward();
                None
            }
            TuiEvent::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                }
                None
            }
            TuiEvent::CursorRight => {
                if self.cursor < self.buffer.len() {
                    self.cursor = next_char_boundary(&self.buffer, self.cursor);
                }
                None
            }
            TuiEvent::CursorUp => {
                self.move_vertical(false);
                None
            }
            TuiEvent::CursorDown => {
                self.move_vertical(true);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = self.line_start(self.cursor);
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.line_end(self.cursor);
                None
            }
            TuiEvent::Complete => {
                self.complete_command();
                None
            }
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    None
                } else {
                    self.cursor = 0;
                    Some(InputEvent::Submit(std::mem::take(&mut self.buffer)))
                }
            }
            TuiEvent::Eof => {
                if self.buffer.is_empty() {
                    Some(InputEvent::Eof)
                } else {
                    self.delete_forward();
                    None
                }
            }
            _ => None,
        }
    }

    fn delete_forward(&mut self) {
        if self.cursor < self.buffer.len() {
            let next = next_char_boundary(&self.buffer, self.cursor);
            self.buffer.drain(self.cursor..next);
        }
    }

    fn title(&self) -> String {
        if self.busy {
            return format!(" {} — waiting... ", self.model_id);
        }
        if self.buffer.starts_with('/') && !self.buffer.contains('\n') {
            let candidates = commands::completions(&self.buffer);
            if !candidates.is_empty() {
                return format!(" {} · {} ", self.model_id, candidates.join(" "));
            }
        }
        format!(" {} ", self.model_id)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(self.title());

        let input = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER)
                .block(block)
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM))
        } else {
            Paragraph::new(self.buffer.as_str())
                .block(block)
                .style(Style::default().fg(Color::Rgb(0xf0, 0xf0, 0xf0)))
        };
        frame.render_widget(input, area);

        let line_idx = self.buffer[..self.cursor].matches('\n').count() as u16;
        let start = self.line_start(self.cursor);
        let column = self.buffer[start..self.cursor].width() as u16;
        frame.set_cursor_position((
            area.x + BORDER_OFFSET + column,
            area.y + BORDER_OFFSET + line_idx,
        ));
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of the previous character boundary before `pos`.
fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the next character boundary after `pos`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

fn longest_common_prefix<'a>(candidates: &[&'a str]) -> &'a str {
    let Some(&first) = candidates.first() else {
        return "";
    };
    let mut end = first.len();
    for other in &candidates[1..] {
        end = first
            .char_indices()
            .take_while(|(i, c)| other[*i..].chars().next() == Some(*c))
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0)
            .min(end);
    }
    &first[..end]
}
