use async_trait::async_trait;
use thiserror::Error;

use crate::modules::chat::model::{ConversationTurn, GenerationConfig, SafetySetting};

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Response blocked: {0}")]
    Blocked(String),
}

/// A remote text generator that continues a conversation by one model turn.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        generation_config: &GenerationConfig,
        safety_settings: &[SafetySetting],
        history: &[ConversationTurn],
        user_text: &str,
    ) -> Result<String, LlmError>;
}

/// One ephemeral conversation. History is never appended to; every message
/// is sent on top of the same turns.
#[derive(Debug, Clone)]
pub struct ChatSession {
    model: String,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
    history: Vec<ConversationTurn>,
}

impl ChatSession {
    pub fn start(
        model: impl Into<String>,
        generation_config: GenerationConfig,
        safety_settings: Vec<SafetySetting>,
        history: Vec<ConversationTurn>,
    ) -> Self {
        Self {
            model: model.into(),
            generation_config,
            safety_settings,
            history,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation_config
    }

    pub fn safety_settings(&self) -> &[SafetySetting] {
        &self.safety_settings
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub async fn send_message(
        &self,
        client: &dyn GenerativeClient,
        text: &str,
    ) -> Result<String, LlmError> {
        client
            .generate(
                &self.model,
                &self.generation_config,
                &self.safety_settings,
                &self.history,
                text,
            )
            .await
    }
}
