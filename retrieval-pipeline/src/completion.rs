use common::{error::AppError, utils::config::AppConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use crate::answer_retrieval::ChatPrompt;

pub const CONNECTIVITY_FAILURE_REPLY: &str =
    "Sorry, there was a problem reaching the language model API.";
pub const NO_ANSWER_REPLY: &str = "Sorry, I couldn't generate a response at this time.";
const HTTP_ERROR_REPLY_PREFIX: &str = "Sorry, there was an error connecting to the language model API:";

/// Fixed model id and sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            top_p: 1.0,
        }
    }
}

impl GenerationParams {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.completion_model.clone(),
            max_tokens: config.completion_max_tokens,
            temperature: config.completion_temperature,
            top_p: config.completion_top_p,
        }
    }
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion endpoint responded with status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("completion endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion response carried no answer: {0}")]
    Malformed(String),
}

impl CompletionError {
    /// The bot reply shown for this failure. Server error bodies are passed through verbatim.
    pub fn into_reply(self) -> String {
        match self {
            CompletionError::Http { body, .. } => format!("{HTTP_ERROR_REPLY_PREFIX} {body}"),
            CompletionError::Transport(_) => CONNECTIVITY_FAILURE_REPLY.to_string(),
            CompletionError::Malformed(_) => NO_ANSWER_REPLY.to_string(),
        }
    }
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

fn extract_answer(body: &str) -> Result<String, CompletionError> {
    let response: CompletionResponse = serde_json::from_str(body).map_err(|e| {
        CompletionError::Malformed(format!("Failed to parse completion response: {e}"))
    })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_owned())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| CompletionError::Malformed("No content found in completion response".into()))
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    params: GenerationParams,
}

impl CompletionClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        api_key: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key: api_key.into(),
            params,
        }
    }

    pub fn from_config(http: reqwest::Client, config: &AppConfig) -> Result<Self, AppError> {
        if config.completion_api_key.is_empty() {
            warn!("No completion API key configured; requests will likely be rejected");
        }

        Ok(Self::new(
            http,
            Url::parse(&config.completion_endpoint)?,
            config.completion_api_key.clone(),
            GenerationParams::from_config(config),
        ))
    }

    /// Sends the prompt and returns the trimmed answer, or why there is none.
    pub async fn request_completion(&self, prompt: &ChatPrompt) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: &self.params.model,
            messages: [
                RequestMessage {
                    role: "system",
                    content: &prompt.system,
                },
                RequestMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Completion received");
        extract_answer(&body)
    }

    /// Every outcome resolves to a displayable string.
    pub async fn send_completion(&self, system: &str, user: &str) -> String {
        let prompt = ChatPrompt {
            system: system.to_owned(),
            user: user.to_owned(),
        };
        self.complete(&prompt).await
    }

    pub async fn complete(&self, prompt: &ChatPrompt) -> String {
        match self.request_completion(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(endpoint = %self.endpoint, "Completion failed: {e}");
                e.into_reply()
            }
        }
    }
}
