//! Prompt construction and generation per content kind

use super::{normalize, ChatMessage, TextGenerator};
use crate::error::{ReelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Sampling temperature for every generation call (variety over determinism)
pub const GENERATION_TEMPERATURE: f32 = 0.8;

/// Per-tweet character ceiling requested in the prompt
pub const TWEET_CHAR_LIMIT: usize = 280;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Critic-style reviews of a movie
    Review,
    /// Social media posts about an actor
    Tweet,
}

impl ContentKind {
    pub fn max_output_tokens(&self) -> u32 {
        match self {
            ContentKind::Review => 1500,
            ContentKind::Tweet => 2000,
        }
    }

    /// Items requested when the caller does not say
    pub fn default_count(&self) -> usize {
        match self {
            ContentKind::Review => 10,
            ContentKind::Tweet => 20,
        }
    }

    pub fn char_limit(&self) -> Option<usize> {
        match self {
            ContentKind::Review => None,
            ContentKind::Tweet => Some(TWEET_CHAR_LIMIT),
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            ContentKind::Review => {
                "You are a helpful assistant that generates movie reviews. Always respond with valid JSON arrays only."
            }
            ContentKind::Tweet => {
                "You are a helpful assistant that generates social media content. Always respond with valid JSON arrays only."
            }
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            ContentKind::Review => "review",
            ContentKind::Tweet => "tweet",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.noun())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "review" | "reviews" | "movie" => Ok(ContentKind::Review),
            "tweet" | "tweets" | "actor" => Ok(ContentKind::Tweet),
            other => Err(ReelError::InvalidRequest(format!("unknown content kind: {}", other))),
        }
    }
}

/// One generation call's parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    subject_name: String,
    desired_count: usize,
    kind: ContentKind,
}

impl GenerationRequest {
    /// Validates that the subject is not blank and the count is positive
    pub fn new(subject_name: &str, desired_count: usize, kind: ContentKind) -> Result<Self> {
        let subject_name = subject_name.trim();
        if subject_name.is_empty() {
            return Err(ReelError::InvalidRequest("subject name is empty".into()));
        }
        if desired_count == 0 {
            return Err(ReelError::InvalidRequest("desired count must be positive".into()));
        }

        Ok(Self {
            subject_name: subject_name.to_string(),
            desired_count,
            kind,
        })
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn desired_count(&self) -> usize {
        self.desired_count
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// System message fixing the format, then the user instruction
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.kind.system_prompt()),
            ChatMessage::user(self.build_prompt()),
        ]
    }

    fn build_prompt(&self) -> String {
        let n = self.desired_count;
        let name = &self.subject_name;

        let body = match self.kind {
            ContentKind::Review => format!(
                r#"Generate exactly {n} diverse movie reviews for the movie "{name}".
Each review should be 2-3 sentences long and represent different perspectives (positive, negative, mixed)."#
            ),
            ContentKind::Tweet => format!(
                r#"Generate exactly {n} diverse tweets about the actor "{name}".
Each tweet should be 1-2 sentences and represent different perspectives and topics (career highlights, recent news, fan reactions, critical acclaim, etc.)."#
            ),
        };

        let noun = self.kind.noun();
        let limit = self
            .kind
            .char_limit()
            .map(|limit| format!("\nKeep {noun}s under {limit} characters each."))
            .unwrap_or_default();
        format!(
            r#"{body}{limit}
Return ONLY a valid JSON array of strings, with no additional text or formatting.
Example format: ["{noun}1", "{noun}2", "{noun}3"]"#
        )
    }
}

/// Builds prompts, calls the text service and normalizes the reply
#[derive(Clone)]
pub struct ContentGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl ContentGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate up to `desired_count` texts about `subject_name`.
    ///
    /// Service failures propagate; a malformed reply degrades to whatever the
    /// normalizer recovers, possibly nothing.
    pub async fn generate(
        &self,
        subject_name: &str,
        desired_count: usize,
        kind: ContentKind,
    ) -> Result<Vec<String>> {
        let request = GenerationRequest::new(subject_name, desired_count, kind)?;
        self.generate_for(&request).await
    }

    pub async fn generate_for(&self, request: &GenerationRequest) -> Result<Vec<String>> {
        tracing::debug!(
            "Requesting {} {}s for {:?}",
            request.desired_count(),
            request.kind(),
            request.subject_name()
        );

        let completion = self
            .generator
            .complete(
                &request.messages(),
                request.kind().max_output_tokens(),
                GENERATION_TEMPERATURE,
            )
            .await?;

        let raw = completion.first_text().ok_or(ReelError::EmptyResponse)?;
        tracing::debug!("Generation reply: {} chars", raw.len());

        let items = normalize(raw, request.desired_count());
        if items.len() != request.desired_count() {
            tracing::warn!(
                "Asked for {} {}s about {:?}, recovered {}",
                request.desired_count(),
                request.kind(),
                request.subject_name(),
                items.len()
            );
        }

        Ok(items)
    }
}
