//! AI study assistant: a completion-service client and the chat panel state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use studyhub_shared::api::chat::{CompletionRequest, CompletionResponse};
use studyhub_shared::constants::CHAT_ERROR_REPLY;
use studyhub_shared::error::PortalError;
use tracing::{debug, error};

use crate::config::PortalConfig;
use crate::error::AppError;

/// Anything that can answer a single user prompt.
#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AppError>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct CompletionClient {
    api_url: String,
    api_key: String,
    model: String,
    http_client: Client,
}

impl CompletionClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| PortalError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            http_client,
        })
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, AppError> {
        Self::new(
            config.chat.api_url.clone(),
            config.chat.api_key.clone(),
            config.chat.model.clone(),
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

/// OpenAI-style error envelope: `{"error": {"message": "..."}}`.
async fn completion_error(resp: reqwest::Response) -> AppError {
    #[derive(Deserialize)]
    struct Inner {
        message: String,
    }
    #[derive(Deserialize)]
    struct Envelope {
        error: Inner,
    }
    let status = resp.status();
    let message = match resp.json::<Envelope>().await {
        Ok(body) => body.error.message,
        Err(_) => format!("chat request failed (HTTP {status})"),
    };
    PortalError::Upstream(message).into()
}

#[async_trait]
impl ChatAssistant for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let mut request = self
            .http_client
            .post(self.completions_url())
            .json(&CompletionRequest::single_turn(&self.model, prompt));
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(completion_error(resp).await);
        }
        let body: CompletionResponse = resp.json().await?;
        body.into_first_content()
            .ok_or_else(|| PortalError::Upstream("chat service returned no choices".into()).into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
}

impl ChatEntry {
    fn now(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            sent_at: Utc::now(),
        }
    }
}

/// Decrements the in-flight count even if the send future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Conversation shown in the assistant view.
///
/// Failures never escape `send`; they become a fixed assistant reply.
pub struct ChatPanel {
    assistant: Arc<dyn ChatAssistant>,
    entries: Mutex<Vec<ChatEntry>>,
    in_flight: AtomicUsize,
}

impl ChatPanel {
    pub fn new(assistant: Arc<dyn ChatAssistant>) -> Self {
        Self {
            assistant,
            entries: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChatEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Send one prompt. Blank input is ignored and returns `false`.
    pub async fn send(&self, input: &str) -> bool {
        if input.trim().is_empty() {
            return false;
        }
        self.lock().push(ChatEntry::now(input, Sender::User));

        let reply = {
            let _in_flight = InFlight::enter(&self.in_flight);
            match self.assistant.complete(input).await {
                Ok(reply) => {
                    debug!(chars = reply.len(), "assistant replied");
                    reply
                }
                Err(e) => {
                    error!(error = %e, "assistant request failed");
                    CHAT_ERROR_REPLY.to_string()
                }
            }
        };
        self.lock().push(ChatEntry::now(reply, Sender::Assistant));
        true
    }

    /// Drop the visible history. Replies still in flight land afterwards.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn entries(&self) -> Vec<ChatEntry> {
        self.lock().clone()
    }

    pub fn is_awaiting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Notify;

    struct Echo;

    #[async_trait]
    impl ChatAssistant for Echo {
        async fn complete(&self, prompt: &str) -> Result<String, AppError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    struct Broken;

    #[async_trait]
    impl ChatAssistant for Broken {
        async fn complete(&self, _prompt: &str) -> Result<String, AppError> {
            Err(AppError::new("could not connect to server"))
        }
    }

    /// Holds every request until released.
    struct Gated(Arc<Notify>);

    #[async_trait]
    impl ChatAssistant for Gated {
        async fn complete(&self, prompt: &str) -> Result<String, AppError> {
            self.0.notified().await;
            Ok(prompt.to_uppercase())
        }
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let panel = ChatPanel::new(Arc::new(Echo));
        assert!(!panel.send("").await);
        assert!(!panel.send("   \n\t").await);
        assert!(panel.entries().is_empty());
    }

    #[tokio::test]
    async fn reply_follows_prompt() {
        let panel = ChatPanel::new(Arc::new(Echo));
        assert!(panel.send("what is recursion?").await);
        let entries = panel.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sender, Sender::User);
        assert_eq!(entries[0].text, "what is recursion?");
        assert_eq!(entries[1].sender, Sender::Assistant);
        assert_eq!(entries[1].text, "echo: what is recursion?");
        assert!(!panel.is_awaiting());
    }

    #[tokio::test]
    async fn failure_becomes_fixed_reply() {
        let panel = ChatPanel::new(Arc::new(Broken));
        assert!(panel.send("hello").await);
        let entries = panel.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].sender, Sender::Assistant);
        assert_eq!(entries[1].text, CHAT_ERROR_REPLY);
        assert!(!panel.is_awaiting());
    }

    #[tokio::test]
    async fn awaiting_while_any_request_is_in_flight() {
        let gate = Arc::new(Notify::new());
        let panel = Arc::new(ChatPanel::new(Arc::new(Gated(gate.clone()))));

        let first = tokio::spawn({
            let panel = panel.clone();
            async move { panel.send("one").await }
        });
        let second = tokio::spawn({
            let panel = panel.clone();
            async move { panel.send("two").await }
        });

        while panel.entries().len() < 2 {
            tokio::task::yield_now().await;
        }
        assert!(panel.is_awaiting());

        gate.notify_waiters();
        // A waiter registered after the first notify needs another one.
        while !(first.is_finished() && second.is_finished()) {
            gate.notify_waiters();
            tokio::task::yield_now().await;
        }
        assert!(first.await.unwrap());
        assert!(second.await.unwrap());
        assert!(!panel.is_awaiting());
        assert_eq!(panel.entries().len(), 4);
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let panel = ChatPanel::new(Arc::new(Echo));
        panel.send("hi").await;
        panel.clear();
        assert!(panel.entries().is_empty());
    }

    #[test]
    fn entry_serializes_lowercase_sender() {
        let entry = ChatEntry::now("hi", Sender::Assistant);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["sender"], "assistant");
        assert!(json["sentAt"].is_string());
    }
}
