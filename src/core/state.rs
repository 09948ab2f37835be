//! # Application State
//!
//! Scheduler state for Tern. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ChatBackend>  // network collaborator
//! ├── conversation: Conversation     // turn history
//! ├── model: Model                   // active model selector
//! ├── busy: bool                     // request in flight for current epoch
//! ├── epoch: u64                     // request generation counter
//! ├── pending: VecDeque<String>      // submitted, not yet dispatched lines
//! ├── panel_visible: bool            // overlay toggle (F2)
//! ├── streaming: bool                // config: use the streaming endpoint
//! ├── shutting_down: bool            // loop exit latch
//! └── outbox: Outbox                 // queued terminal output
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! Background tasks get clones of whatever they need and report back through
//! the action channel; they never hold a reference to `App`.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::api::client::ChatBackend;
use crate::core::config::ResolvedConfig;
use crate::core::conversation::Conversation;
use crate::core::outbox::Outbox;

/// The closed set of selectable models. `/model` toggles between them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Model {
    #[default]
    Chat,
    Coder,
}

impl Model {
    pub fn id(self) -> &'static str {
        match self {
            Model::Chat => "deepseek-chat",
            Model::Coder => "deepseek-coder",
        }
    }

    /// The other model of the pair.
    pub fn toggle(self) -> Model {
        match self {
            Model::Chat => Model::Coder,
            Model::Coder => Model::Chat,
        }
    }

    /// Parses a configured model id. Unknown ids are rejected rather than
    /// passed through so `/model` keeps cycling a closed set.
    pub fn parse(id: &str) -> Option<Model> {
        match id {
            "deepseek-chat" => Some(Model::Chat),
            "deepseek-coder" => Some(Model::Coder),
            _ => None,
        }
    }
}

pub struct App {
    pub backend: Arc<dyn ChatBackend>,
    pub conversation: Conversation,
    pub model: Model,
    pub busy: bool,
    pub epoch: u64,
    pub pending: VecDeque<String>,
    pub panel_visible: bool,
    pub streaming: bool,
    pub shutting_down: bool,
    pub outbox: Outbox,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, model: Model) -> Self {
        Self {
            backend,
            conversation: Conversation::new(),
            model,
            busy: false,
            epoch: 0,
            pending: VecDeque::new(),
            panel_visible: true,
            streaming: false,
            shutting_down: false,
            outbox: Outbox::new(),
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &ResolvedConfig) -> Self {
        let mut app = Self::new(backend, config.model);
        app.streaming = config.streaming;
        app.panel_visible = config.panel_visible;
        app
    }
}
