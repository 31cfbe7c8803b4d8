//! Completion Service Client
//!
//! Information Hiding:
//! - Wire request/response shapes are internal; callers see prompt in,
//!   reply text out
//! - Credential handling internalized
//!
//! A failed call is reported to the caller, never retried.

use crate::config::Settings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("completion response missing choices[0].message.content")]
    MalformedResponse,
}

pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl CompletionClient {
    pub fn new(api_key: String, settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: settings.llm.base_url.clone(),
            model: settings.llm.model.clone(),
        }
    }

    /// One completion round trip.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CompletionError::Api { status, body });
        }

        let completion = response
            .json::<CompletionResponse>()
            .await
            .map_err(|_| CompletionError::MalformedResponse)?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::MalformedResponse)
    }
}
