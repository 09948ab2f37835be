//! DeepSeek backend client.
//!
//! `ChatBackend` is the seam the scheduler talks through; `DeepSeekClient`
//! is the one real implementation. Both calls take the full conversation —
//! the API is stateless across requests.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::mpsc::Sender;

use crate::api::types::{turns_to_wire, ChatRequest, ChatResponse, StreamEvent};
use crate::core::conversation::Turn;

/// Errors that can occur during backend operations.
#[derive(Debug)]
pub enum BackendError {
    /// API returned a non-success status.
    Api { status: u16, message: String },
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The response body did not have the expected shape.
    Parse(String),
    /// The fragment channel was closed (scheduler dropped the receiver).
    ChannelClosed,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
            BackendError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for BackendError {}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Sends the conversation and returns the complete reply text.
    async fn send(&self, turns: &[Turn], model: &str) -> Result<String, BackendError>;

    /// Streams the reply as text fragments over `sender`. Returns once the
    /// stream reaches its end marker; malformed fragments are skipped.
    async fn send_stream(
        &self,
        turns: &[Turn],
        model: &str,
        sender: Sender<String>,
    ) -> Result<(), BackendError>;
}

pub struct DeepSeekClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl DeepSeekClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("HTTP client construction failed");
        Self {
            api_key,
            base_url,
            client,
        }
    }

    /// Posts a request to the chat-completions endpoint, mapping non-success
    /// statuses to `BackendError::Api`.
    async fn send_request(
        &self,
        request: &ChatRequest<'_>,
    ) -> Result<reqwest::Response, BackendError> {
        info!(
            "DeepSeek request: model={}, messages={}, stream={}",
            request.model,
            request.messages.len(),
            request.stream
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        debug!("DeepSeek response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("DeepSeek API error: {} - {}", status, err_body);
            return Err(BackendError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatBackend for DeepSeekClient {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn send(&self, turns: &[Turn], model: &str) -> Result<String, BackendError> {
        let request = ChatRequest {
            model,
            messages: turns_to_wire(turns),
            stream: false,
        };

        let response = self.send_request(&request).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BackendError::Parse("response contained no choices".to_string()))
    }

    async fn send_stream(
        &self,
        turns: &[Turn],
        model: &str,
        sender: Sender<String>,
    ) -> Result<(), BackendError> {
        let request = ChatRequest {
            model,
            messages: turns_to_wire(turns),
            stream: true,
        };

        let mut response = self.send_request(&request).await?;

        let mut buffer = String::new();
        let mut fragment_count = 0usize;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?
        {
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // Process complete lines from buffer
            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].trim().to_string();
                buffer.drain(..pos + 1);

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };

                if data == "[DONE]" {
                    info!("Stream complete: {fragment_count} fragments");
                    return Ok(());
                }

                match serde_json::from_str::<StreamEvent>(data) {
                    Ok(event) => {
                        let content = event
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.delta.content);
                        if let Some(fragment) = content
                            && !fragment.is_empty()
                        {
                            fragment_count += 1;
                            if sender.send(fragment).await.is_err() {
                                warn!("Fragment send failed: receiver dropped");
                                return Err(BackendError::ChannelClosed);
                            }
                        }
                    }
                    Err(e) => {
                        // Malformed fragments are skipped, not fatal.
                        debug!("Skipping malformed stream fragment: {e}");
                    }
                }
            }
        }

        info!("Stream ended without [DONE]: {fragment_count} fragments");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let err = BackendError::Api {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 429): rate limited");
        assert_eq!(
            BackendError::Network("refused".to_string()).to_string(),
            "network error: refused"
        );
        assert_eq!(BackendError::ChannelClosed.to_string(), "channel closed");
    }
}
