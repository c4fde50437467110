use std::sync::Arc;

use common::{error::AppError, utils::config::AppConfig};
use retrieval_pipeline::ChatAssistant;

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<ChatAssistant>,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self::with_assistant(Arc::new(ChatAssistant::from_config(
            config,
        )?)))
    }

    pub fn with_assistant(assistant: Arc<ChatAssistant>) -> Self {
        Self { assistant }
    }
}
