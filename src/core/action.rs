//! # Actions
//!
//! Everything that can happen in Tern becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! A background request finishes? That's `Action::Completed`.
//!
//! The `update()` function takes the current state and an action and
//! mutates the state. No I/O here: user-visible text goes to the outbox,
//! and anything the event loop must do (spawn a request, quit) comes back
//! as an `Effect`.
//!
//! ```text
//! State + Action  →  update()  →  State' + Effect
//! ```
//!
//! This is where the request lifecycle lives: submissions enter a FIFO,
//! dispatch is gated on the busy flag, and every request is tagged with the
//! epoch current at its start. A completion whose epoch no longer matches
//! is dropped without touching anything — that is the whole cancellation
//! mechanism; the underlying network call is never aborted.

use log::debug;

use crate::api::client::BackendError;
use crate::core::commands;
use crate::core::state::App;

/// Submissions longer than this many newline-delimited rows are truncated.
pub const MAX_INPUT_ROWS: usize = 10;

#[derive(Debug)]
pub enum Action {
    /// A line left the editor. Validated, then queued for dispatch.
    Submit(String),
    /// A background request finished. `epoch` is the value captured when
    /// the request started.
    Completed {
        epoch: u64,
        result: Result<String, BackendError>,
    },
    /// Ctrl+C: cancels the in-flight request while busy, shuts down while
    /// idle.
    Interrupt,
    /// F2 toggles the status panel.
    TogglePanel,
    /// The editor reported end-of-input (Ctrl+D on an empty buffer).
    Eof,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Spawn the backend call for the current epoch.
    SpawnRequest,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            let Some(line) = validate(app, text) else {
                return Effect::None;
            };
            app.pending.push_back(line);
            dispatch_pending(app)
        }
        Action::Completed { epoch, result } => {
            if epoch != app.epoch {
                // Superseded by a newer submission or a cancel. The busy
                // flag belongs to the current epoch, so it stays as-is.
                debug!(
                    "Dropping completion for stale epoch {epoch} (current {})",
                    app.epoch
                );
                return Effect::None;
            }
            app.busy = false;
            match result {
                Ok(reply) => {
                    app.outbox.emit("DeepSeek:");
                    app.outbox.emit_markdown(reply.clone());
                    app.outbox.emit("");
                    app.conversation.push_assistant(reply);
                }
                Err(err) => {
                    app.conversation.rollback_user();
                    app.outbox.emit(format!("Request failed: {err}"));
                }
            }
            dispatch_pending(app)
        }
        Action::Interrupt => {
            if app.busy {
                // Orphan the in-flight call: its completion will fail the
                // epoch check. The speculative user turn goes with it so a
                // retry does not resend a question nothing answered.
                app.epoch += 1;
                app.busy = false;
                app.conversation.rollback_user();
                app.outbox.emit("Request interrupted.");
                dispatch_pending(app)
            } else {
                app.shutting_down = true;
                app.outbox.emit("Bye!");
                Effect::Quit
            }
        }
        Action::TogglePanel => {
            app.panel_visible = !app.panel_visible;
            Effect::None
        }
        Action::Eof => {
            app.shutting_down = true;
            app.outbox.emit("Bye!");
            Effect::Quit
        }
    }
}

/// Discards blank submissions; truncates oversized ones with one notice.
fn validate(app: &mut App, text: String) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    if text.lines().count() > MAX_INPUT_ROWS {
        app.outbox
            .emit(format!("Input truncated to the first {MAX_INPUT_ROWS} rows."));
        return Some(
            text.lines()
                .take(MAX_INPUT_ROWS)
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    Some(text)
}

/// Pops queued lines in arrival order until one starts a request, the queue
/// drains, or a command requests shutdown. Never dispatches while busy.
fn dispatch_pending(app: &mut App) -> Effect {
    while !app.busy && !app.shutting_down {
        let Some(line) = app.pending.pop_front() else {
            break;
        };
        if line.starts_with('/') {
            if !commands::route(app, &line) {
                app.shutting_down = true;
                return Effect::Quit;
            }
            continue;
        }
        app.outbox.emit(format!("You: {line}"));
        app.conversation.push_user(line);
        app.epoch += 1;
        app.busy = true;
        app.outbox
            .emit(format!("{} is thinking...", app.model.id()));
        return Effect::SpawnRequest;
    }
    Effect::None
}
