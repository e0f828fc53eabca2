//! Chat-completion client
//!
//! Supports Azure OpenAI deployments, OpenAI, Anthropic, and OpenAI-compatible APIs.

use super::{ChatMessage, ChatRole, Completion, TextGenerator};
use crate::config::GeneratorConfig;
use crate::error::{ReelError, Result};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_AZURE_DEPLOYMENT: &str = "gpt-4.1-nano";
const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// HTTP text generator
pub struct LlmClient {
    http: Client,
    provider: LlmProvider,
}

#[derive(Debug, Clone)]
pub enum LlmProvider {
    AzureOpenAI {
        endpoint: String,
        api_key: String,
        deployment: String,
        api_version: String,
    },
    OpenAI {
        api_key: String,
        model: String,
        base_url: String,
    },
    Anthropic {
        api_key: String,
        model: String,
        base_url: String,
    },
    /// OpenAI-compatible API (Ollama, vLLM, etc.)
    Compatible {
        api_key: Option<String>,
        model: String,
        base_url: String,
    },
}

// ============ Request/Response types ============

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    /// Azure routes by deployment in the URL instead
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

impl LlmClient {
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            http: Client::new(),
            provider,
        }
    }

    /// Use a preconfigured HTTP client (proxy, TLS, timeout settings)
    pub fn with_http(provider: LlmProvider, http: Client) -> Self {
        Self { http, provider }
    }

    /// Create from config; missing credentials fail here rather than per call
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let api_key = || -> Result<String> {
            if config.api_key.is_empty() {
                Err(ReelError::Config(format!("api_key required for {} provider", config.provider)))
            } else {
                Ok(config.api_key.clone())
            }
        };

        let provider = match config.provider.to_lowercase().as_str() {
            "azure" | "azure_openai" => LlmProvider::AzureOpenAI {
                endpoint: config
                    .endpoint
                    .clone()
                    .ok_or_else(|| ReelError::Config("endpoint required for azure provider".into()))?,
                api_key: api_key()?,
                deployment: config.model.clone().unwrap_or_else(|| DEFAULT_AZURE_DEPLOYMENT.to_string()),
                api_version: config
                    .api_version
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            },
            "openai" | "gpt" => LlmProvider::OpenAI {
                api_key: api_key()?,
                model: config.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string()),
                base_url: config.endpoint.clone().unwrap_or_else(|| "https://api.openai.com".to_string()),
            },
            "anthropic" | "claude" => LlmProvider::Anthropic {
                api_key: api_key()?,
                model: config.model.clone().unwrap_or_else(|| "claude-sonnet-4-20250514".to_string()),
                base_url: config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            },
            "ollama" => LlmProvider::Compatible {
                api_key: None,
                model: config.model.clone().unwrap_or_else(|| "qwen2.5:14b".to_string()),
                base_url: config.endpoint.clone().unwrap_or_else(|| "http://localhost:11434".to_string()),
            },
            "compatible" | "custom" => LlmProvider::Compatible {
                api_key: if config.api_key.is_empty() { None } else { Some(config.api_key.clone()) },
                model: config.model.clone().ok_or_else(|| ReelError::Config("model required for compatible provider".into()))?,
                base_url: config.endpoint.clone().ok_or_else(|| ReelError::Config("endpoint required for compatible provider".into()))?,
            },
            _ => return Err(ReelError::Config(format!("Unknown generator provider: {}", config.provider))),
        };

        let http = http_builder(config)
            .build()
            .map_err(|e| ReelError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, provider })
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn name(&self) -> &str {
        match &self.provider {
            LlmProvider::AzureOpenAI { deployment, .. } => deployment,
            LlmProvider::OpenAI { model, .. } => model,
            LlmProvider::Anthropic { model, .. } => model,
            LlmProvider::Compatible { model, .. } => model,
        }
    }

    async fn call_azure(
        &self,
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        api_version: &str,
        request: &OpenAIRequest<'_>,
    ) -> Result<Completion> {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            deployment,
            api_version
        );

        let resp = self
            .http
            .post(url)
            .header("api-key", api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        parse_openai(&read_body(resp).await?)
    }

    async fn call_openai_compatible(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        request: &OpenAIRequest<'_>,
    ) -> Result<Completion> {
        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url.trim_end_matches('/')))
            .header("content-type", "application/json");

        if let Some(key) = api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.json(request).send().await?;
        parse_openai(&read_body(resp).await?)
    }

    async fn call_anthropic(
        &self,
        base_url: &str,
        api_key: &str,
        model: &str,
        messages: &[ChatMessage],
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<Completion> {
        // Anthropic takes the system prompt out of band
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let request = AnthropicRequest {
            model,
            max_tokens: max_output_tokens,
            temperature,
            system: if system.is_empty() { None } else { Some(system.join("\n\n")) },
            messages: messages
                .iter()
                .filter(|m| m.role == ChatRole::User)
                .map(|m| AnthropicMessage {
                    role: "user",
                    content: &m.content,
                })
                .collect(),
        };

        let resp = self
            .http
            .post(format!("{}/v1/messages", base_url.trim_end_matches('/')))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let response: AnthropicResponse = serde_json::from_str(&read_body(resp).await?)?;
        let segments: Vec<String> = response.content.into_iter().filter_map(|c| c.text).collect();

        if segments.is_empty() {
            return Err(ReelError::EmptyResponse);
        }
        Ok(Completion { segments })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<Completion> {
        tracing::debug!(
            "Calling {} with {} messages (max_tokens={}, temperature={})",
            self.name(),
            messages.len(),
            max_output_tokens,
            temperature
        );

        match &self.provider {
            LlmProvider::AzureOpenAI {
                endpoint,
                api_key,
                deployment,
                api_version,
            } => {
                let request = OpenAIRequest {
                    model: None,
                    messages,
                    max_tokens: max_output_tokens,
                    temperature,
                };
                self.call_azure(endpoint, api_key, deployment, api_version, &request)
                    .await
            }
            LlmProvider::OpenAI { api_key, model, base_url } => {
                let request = OpenAIRequest {
                    model: Some(model.as_str()),
                    messages,
                    max_tokens: max_output_tokens,
                    temperature,
                };
                self.call_openai_compatible(base_url, Some(api_key), &request)
                    .await
            }
            LlmProvider::Anthropic { api_key, model, base_url } => {
                self.call_anthropic(base_url, api_key, model, messages, max_output_tokens, temperature)
                    .await
            }
            LlmProvider::Compatible { api_key, model, base_url } => {
                let request = OpenAIRequest {
                    model: Some(model.as_str()),
                    messages,
                    max_tokens: max_output_tokens,
                    temperature,
                };
                self.call_openai_compatible(base_url, api_key.as_deref(), &request)
                    .await
            }
        }
    }
}

/// HTTP client settings taken from the generator config
pub(crate) fn http_builder(config: &GeneratorConfig) -> reqwest::ClientBuilder {
    Client::builder().timeout(Duration::from_secs(config.timeout_secs))
}

/// Map HTTP status to the error taxonomy and return the body of a successful reply
async fn read_body(resp: reqwest::Response) -> Result<String> {
    let status = resp.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(ReelError::RateLimited { retry_after_secs });
    }

    let text = resp.text().await?;
    tracing::debug!("Generation raw response: {}", truncate(&text, 500));

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ReelError::Auth(format!("{} - {}", status, truncate(&text, 200))));
    }
    if !status.is_success() {
        return Err(ReelError::Api(format!("{} - {}", status, truncate(&text, 200))));
    }

    Ok(text)
}

fn parse_openai(text: &str) -> Result<Completion> {
    let response: OpenAIResponse = serde_json::from_str(text)?;
    let segments: Vec<String> = response
        .choices
        .into_iter()
        .filter_map(|c| c.message.content)
        .collect();

    if segments.is_empty() {
        return Err(ReelError::EmptyResponse);
    }
    Ok(Completion { segments })
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
