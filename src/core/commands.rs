//! # Slash Commands
//!
//! Routing for the closed command set, plus the prefix completion used by
//! the input box. One table drives all three surfaces: parsing, `/help`
//! output, and completion candidates.

use crate::core::state::App;

/// Command table: exact string, description. Order is display order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show this help"),
    ("/exit", "Quit"),
    ("/quit", "Quit (same as /exit)"),
    ("/clear", "Clear the conversation history"),
    ("/model", "Toggle between deepseek-chat and deepseek-coder"),
    ("/history", "Show conversation history stats"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Quit,
    Clear,
    Model,
    History,
}

impl Command {
    /// Matches trimmed, case-folded input against the closed set. The `Err`
    /// carries the normalized text for the "unknown command" notice.
    pub fn parse(input: &str) -> Result<Command, String> {
        match input.trim().to_lowercase().as_str() {
            "/help" => Ok(Command::Help),
            "/exit" => Ok(Command::Exit),
            "/quit" => Ok(Command::Quit),
            "/clear" => Ok(Command::Clear),
            "/model" => Ok(Command::Model),
            "/history" => Ok(Command::History),
            other => Err(other.to_string()),
        }
    }
}

/// Completion engine: all commands starting with `prefix`. Pure.
pub fn completions(prefix: &str) -> Vec<&'static str> {
    COMMANDS
        .iter()
        .map(|(cmd, _)| *cmd)
        .filter(|cmd| cmd.starts_with(prefix))
        .collect()
}

/// Routes one submitted `/`-line. Returns `false` when the command requests
/// shutdown. Unknown commands report and continue.
pub fn route(app: &mut App, input: &str) -> bool {
    match Command::parse(input) {
        Ok(cmd) => apply(app, cmd),
        Err(unknown) => {
            app.outbox.emit(format!("Unknown command: {unknown}"));
            app.outbox.emit("Type /help for the list of commands.");
            true
        }
    }
}

fn apply(app: &mut App, cmd: Command) -> bool {
    match cmd {
        Command::Help => {
            app.outbox.emit(help_text());
            true
        }
        Command::Exit | Command::Quit => {
            app.outbox.emit("Bye!");
            false
        }
        Command::Clear => {
            app.conversation.clear();
            app.outbox.emit("Conversation history cleared.");
            true
        }
        Command::Model => {
            let from = app.model;
            app.model = from.toggle();
            app.outbox
                .emit(format!("Model switched: {} -> {}", from.id(), app.model.id()));
            true
        }
        Command::History => {
            app.outbox.emit(format!(
                "Conversation history: {} turns",
                app.conversation.len()
            ));
            true
        }
    }
}

fn help_text() -> String {
    let mut text = String::from("Available commands:\n");
    for (cmd, desc) in COMMANDS {
        text.push_str(&format!("  {cmd:<10} - {desc}\n"));
    }
    text.push_str(
        "\nType a message to chat. Enter sends, Ctrl+J inserts a newline\n\
         (up to 10 rows), Tab completes commands, F2 toggles the panel,\n\
         Ctrl+C interrupts the current request.",
    );
    text
}
