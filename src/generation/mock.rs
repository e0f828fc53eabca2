//! Deterministic text generator for tests and offline runs
//!
//! Returns a canned reply (or a canned failure) for every call and records
//! what it was asked, so callers can assert on prompts and budgets.

use super::{ChatMessage, Completion, TextGenerator};
use crate::error::{ReelError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// One recorded `complete` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Failure(String),
}

/// Canned-reply generator
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    reply: Reply,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StaticGenerator {
    /// Reply with this raw text on every call
    pub fn with_reply(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(text.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with these items encoded as a JSON array
    pub fn with_items<S: AsRef<str>>(items: &[S]) -> Self {
        let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
        let text = serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string());
        Self::with_reply(text)
    }

    /// Fail every call with a generation-service error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Reply::Failure(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<Completion> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                messages: messages.to_vec(),
                max_output_tokens,
                temperature,
            });

        match &self.reply {
            Reply::Text(text) => Ok(Completion::text(text.clone())),
            Reply::Failure(message) => Err(ReelError::Api(message.clone())),
        }
    }
}
