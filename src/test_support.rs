//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::api::client::{BackendError, ChatBackend};
use crate::core::conversation::Turn;
use crate::core::state::{App, Model};

/// A no-op backend for tests that don't need real API calls.
pub struct NoopBackend;

#[async_trait]
impl ChatBackend for NoopBackend {
    fn name(&self) -> &str {
        "noop"
    }

    async fn send(&self, _turns: &[Turn], _model: &str) -> Result<String, BackendError> {
        Ok(String::new())
    }

    async fn send_stream(
        &self,
        _turns: &[Turn],
        _model: &str,
        _sender: Sender<String>,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Creates a test App with a NoopBackend.
pub fn test_app() -> App {
    App::new(Arc::new(NoopBackend), Model::Chat)
}
