use serde::{Deserialize, Serialize};

use crate::services::llm::ChatSession;

pub const MODEL_NAME: &str = "gemini-pro";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

pub const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    top_k: 1,
    top_p: 1.0,
    max_output_tokens: 1000,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

pub const SAFETY_SETTINGS: [SafetySetting; 1] = [SafetySetting {
    category: HarmCategory::HarmCategoryHarassment,
    threshold: HarmBlockThreshold::BlockMediumAndAbove,
}];

const SEED_TURNS: [(Role, &str); 6] = [
    (Role::User, ""),
    (
        Role::Model,
        "Hi there! Welcome to WaterWise, your platform for exploring water-saving techniques. How can I assist you today?",
    ),
    (Role::User, "Tell me about irrigation efficiency."),
    (
        Role::Model,
        "Irrigation efficiency involves using water more effectively in agriculture. Techniques like drip irrigation can reduce water waste by delivering water directly to plant roots. Would you like to know more about specific methods?",
    ),
    (Role::User, "What about water reuse?"),
    (
        Role::Model,
        "Water reuse refers to recycling water for multiple purposes. Greywater, for example, can be reused for irrigation in both urban and agricultural settings. Would you like to know about domestic conservation techniques?",
    ),
];

/// The WaterWise seed conversation, prepended to every chat.
pub fn seed_history() -> Vec<ConversationTurn> {
    SEED_TURNS
        .iter()
        .map(|(role, text)| ConversationTurn {
            role: *role,
            text: text.to_string(),
        })
        .collect()
}

/// Starts a fresh WaterWise chat: fixed model, generation and safety settings, seeded history.
pub fn start_chat() -> ChatSession {
    ChatSession::start(
        MODEL_NAME,
        GENERATION_CONFIG,
        SAFETY_SETTINGS.to_vec(),
        seed_history(),
    )
}
