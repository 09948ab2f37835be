//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, renders the prompt
//! surface, and translates keyboard events into `core::Action` values.
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Terminal model
//!
//! Tern is not a full-screen app. The prompt surface (status panel + input
//! box) lives in an inline viewport pinned to the bottom of the terminal,
//! and all other output is inserted above it with `insert_before`, so the
//! transcript accumulates in the terminal's own scrollback. Inline
//! viewports cannot be resized in place, so the loop rebuilds the terminal
//! whenever the reserved row count changes (input growth, panel toggle).
//!
//! ## Scheduling
//!
//! One loop coordinates everything: it alone mutates `App` (via `update`),
//! drains the outbox between frames, and polls input — 50 ms cadence while
//! a request is in flight, a 1 s tick when idle so the panel clock
//! refreshes without input. Backend calls run on the tokio runtime and
//! report back through an mpsc channel; cancellation never aborts them, it
//! just advances the epoch so their completion is dropped on arrival.

pub mod event;
pub mod input_box;
pub mod markdown;
pub mod output;
pub mod panel;
pub mod ui;

use std::io;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use log::{debug, info, warn};
use ratatui::backend::CrosstermBackend;
use ratatui::{DefaultTerminal, Terminal, TerminalOptions, Viewport};

use crate::api::client::{BackendError, ChatBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::conversation::Turn;
use crate::core::history::HistoryFile;
use crate::core::state::App;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::input_box::{InputBox, InputEvent};
use crate::tui::panel::{ClockPanel, PanelSource};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub input_box: InputBox,
    /// Overlay provider; replaceable at runtime.
    pub panel: Box<dyn PanelSource>,
}

impl TuiState {
    pub fn new() -> Self {
        Self::with_panel(Box::new(ClockPanel))
    }

    pub fn with_panel(panel: Box<dyn PanelSource>) -> Self {
        Self {
            input_box: InputBox::new(),
            panel,
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(io::stdout(), EnableBracketedPaste)?;
        info!("Terminal modes enabled (bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableBracketedPaste);
    }
}

pub fn run(backend: Arc<dyn ChatBackend>, config: ResolvedConfig) -> io::Result<()> {
    let mut app = App::from_config(backend, &config);
    let mut tui = TuiState::new();
    let history = HistoryFile::open_default();

    app.outbox.emit(
        "Tern — chat with DeepSeek from your terminal.\n\
         Type /help for commands, /exit to quit.",
    );

    let rows = ui::reserved_rows(app.panel_visible, &tui.input_box);
    let terminal = ratatui::init_with_options(TerminalOptions {
        viewport: Viewport::Inline(rows),
    });
    let guard = match TerminalModeGuard::new() {
        Ok(g) => g,
        Err(e) => {
            ratatui::restore();
            return Err(e);
        }
    };

    let result = event_loop(&mut app, &mut tui, &history, terminal);

    ratatui::restore();
    drop(guard);

    // The prompt is gone; anything still queued goes straight to stdout.
    output::flush_direct(&mut app.outbox);

    result
}

fn event_loop(
    app: &mut App,
    tui: &mut TuiState,
    history: &HistoryFile,
    mut terminal: DefaultTerminal,
) -> io::Result<()> {
    // Channel for completions from background request tasks
    let (tx, rx) = mpsc::channel();
    let mut viewport_rows = ui::reserved_rows(app.panel_visible, &tui.input_box);
    let mut needs_redraw = true; // Force first frame

    loop {
        // Sync InputBox props with App state
        tui.input_box.model_id = app.model.id();
        tui.input_box.busy = app.busy;

        // Inline viewports cannot be resized in place: rebuild the terminal
        // whenever the prompt surface claims a different number of rows.
        let wanted = ui::reserved_rows(app.panel_visible, &tui.input_box);
        if wanted != viewport_rows {
            terminal.clear()?;
            terminal = Terminal::with_options(
                CrosstermBackend::new(io::stdout()),
                TerminalOptions {
                    viewport: Viewport::Inline(wanted),
                },
            )?;
            viewport_rows = wanted;
            needs_redraw = true;
        }

        // Scrollback writes happen here, between frames, in emit order.
        if !app.outbox.is_empty() {
            output::flush_deferred(&mut app.outbox, &mut terminal)?;
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw(f, app, tui))?;
            needs_redraw = false;
        }

        // Short cadence while a request is in flight; 1 s idle tick so the
        // panel clock refreshes even without input.
        let timeout = if app.busy {
            Duration::from_millis(50)
        } else {
            Duration::from_secs(1)
        };
        let first_event = poll_event_timeout(timeout);
        needs_redraw |= first_event.is_some() || app.panel_visible;

        let mut should_quit = false;

        // Process first event + drain all pending events before next draw
        for tui_event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let action = match tui_event {
                // Resize just needs a redraw (already flagged above)
                TuiEvent::Resize => continue,
                TuiEvent::Interrupt => Some(Action::Interrupt),
                TuiEvent::TogglePanel => Some(Action::TogglePanel),
                editor_event => match tui.input_box.handle_event(&editor_event) {
                    Some(InputEvent::Submit(text)) => {
                        history.append(&text);
                        Some(Action::Submit(text))
                    }
                    Some(InputEvent::Eof) => Some(Action::Eof),
                    None => None,
                },
            };
            if let Some(action) = action {
                match update(app, action) {
                    Effect::SpawnRequest => spawn_request(app, tx.clone()),
                    Effect::Quit => should_quit = true,
                    Effect::None => {}
                }
            }
        }

        // Handle background task completions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            match update(app, action) {
                Effect::SpawnRequest => spawn_request(app, tx.clone()),
                Effect::Quit => should_quit = true,
                Effect::None => {}
            }
        }

        if should_quit {
            return Ok(());
        }
    }
}

/// Starts the backend call for the current epoch on the tokio runtime.
///
/// The task gets clones of everything it reads and reports back through the
/// action channel; the epoch captured here is what `update` later checks the
/// completion against. There is deliberately no abort handle — a cancelled
/// call runs to completion (or its transport timeout) and is discarded.
fn spawn_request(app: &App, tx: mpsc::Sender<Action>) {
    info!("Spawning request for epoch {}", app.epoch);

    let backend = app.backend.clone();
    let turns = app.conversation.turns().to_vec();
    let model = app.model.id();
    let epoch = app.epoch;
    let streaming = app.streaming;

    tokio::spawn(async move {
        let result = if streaming {
            collect_stream(backend.as_ref(), &turns, model).await
        } else {
            backend.send(&turns, model).await
        };
        if tx.send(Action::Completed { epoch, result }).is_err() {
            warn!("Failed to send completion for epoch {epoch}: receiver dropped");
        }
    });
}

/// Accumulates stream fragments into one reply, committed at the end marker.
async fn collect_stream(
    backend: &dyn ChatBackend,
    turns: &[Turn],
    model: &str,
) -> Result<String, BackendError> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(64);
    let stream = backend.send_stream(turns, model, tx);
    let collect = async {
        let mut reply = String::new();
        while let Some(fragment) = rx.recv().await {
            reply.push_str(&fragment);
        }
        reply
    };
    let (result, reply) = tokio::join!(stream, collect);
    result.map(|()| reply)
}
