//! Synthetic content generation
//!
//! This module turns an entity name into a batch of short texts:
//! - `TextGenerator`: the external chat-completion capability
//! - `LlmClient`: HTTP implementation (Azure OpenAI, OpenAI, Anthropic, compatible APIs)
//! - `ContentGenerator`: prompt construction per content kind
//! - `normalize`: recovery of a string list from the raw model reply

mod client;
mod content;
pub mod mock;
pub mod normalize;
#[cfg(test)]
mod tests;

pub use client::{LlmClient, LlmProvider};
pub use content::{ContentGenerator, ContentKind, GenerationRequest};
pub use mock::StaticGenerator;
pub use normalize::normalize;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Reply from a text service: one or more text segments, in service order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub segments: Vec<String>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            segments: vec![text.into()],
        }
    }

    pub fn first_text(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }
}

/// Chat-completion capability, supplied once at startup and shared by all requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<Completion>;
}
