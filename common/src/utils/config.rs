use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default)]
    pub completion_api_key: String,
    #[serde(default = "default_completion_endpoint")]
    pub completion_endpoint: String,
    #[serde(default = "default_completion_model")]
    pub completion_model: String,
    #[serde(default = "default_completion_max_tokens")]
    pub completion_max_tokens: u32,
    #[serde(default = "default_completion_temperature")]
    pub completion_temperature: f32,
    #[serde(default = "default_completion_top_p")]
    pub completion_top_p: f32,
    /// Relative path of the reference text, resolved against `corpus_base_url` when set.
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,
    #[serde(default)]
    pub corpus_base_url: Option<String>,
    /// Retry the corpus load on the next question while it is unavailable.
    #[serde(default = "default_reload_corpus_when_empty")]
    pub reload_corpus_when_empty: bool,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

fn default_completion_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_completion_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

const fn default_completion_max_tokens() -> u32 {
    512
}

const fn default_completion_temperature() -> f32 {
    0.7
}

const fn default_completion_top_p() -> f32 {
    1.0
}

fn default_corpus_path() -> String {
    "data/context.txt".to_string()
}

const fn default_reload_corpus_when_empty() -> bool {
    true
}

const fn default_http_port() -> u16 {
    3000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            completion_api_key: String::new(),
            completion_endpoint: default_completion_endpoint(),
            completion_model: default_completion_model(),
            completion_max_tokens: default_completion_max_tokens(),
            completion_temperature: default_completion_temperature(),
            completion_top_p: default_completion_top_p(),
            corpus_path: default_corpus_path(),
            corpus_base_url: None,
            reload_corpus_when_empty: default_reload_corpus_when_empty(),
            system_prompt: None,
            http_port: default_http_port(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, AppError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    Ok(config.try_deserialize()?)
}
