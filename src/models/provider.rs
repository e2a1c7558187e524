//! Provider inference from model ids.

use serde::{Deserialize, Serialize};

/// LLM provider, inferred from a model id when the caller does not say
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI (GPT, o-series)
    OpenAI,
    /// Anthropic (Claude)
    Anthropic,
    /// Google (Gemini, Gemma)
    Google,
    /// xAI (Grok)
    XAI,
    /// Meta (Llama)
    Meta,
    /// Mistral AI
    Mistral,
    /// DeepSeek
    DeepSeek,
    /// Qwen
    Qwen,
    /// Unknown provider
    #[default]
    Unknown,
}

impl Provider {
    /// Infer provider from a model id
    ///
    /// Accepts both routed ids (`openai/gpt-4o`) and bare ids (`gpt-4o`).
    ///
    /// # Examples
    /// ```
    /// use crux::models::Provider;
    ///
    /// assert_eq!(Provider::from_model_id("openai/gpt-4o"), Provider::OpenAI);
    /// assert_eq!(Provider::from_model_id("gpt-3.5-turbo"), Provider::OpenAI);
    /// assert_eq!(Provider::from_model_id("grok-2"), Provider::XAI);
    /// assert_eq!(Provider::from_model_id("my-special"), Provider::Unknown);
    /// ```
    pub fn from_model_id(id: &str) -> Self {
        let lower = id.to_lowercase();
        let (prefix, name) = match lower.split_once('/') {
            Some((prefix, name)) => (prefix, name),
            None => ("", lower.as_str()),
        };

        match prefix {
            "openai" => return Provider::OpenAI,
            "anthropic" => return Provider::Anthropic,
            "google" => return Provider::Google,
            "x-ai" | "xai" => return Provider::XAI,
            "meta-llama" | "meta" => return Provider::Meta,
            "mistralai" => return Provider::Mistral,
            "deepseek" => return Provider::DeepSeek,
            "qwen" => return Provider::Qwen,
            _ => {},
        }

        if name.starts_with("gpt-") || name.starts_with("o1") || name.starts_with("o3") {
            Provider::OpenAI
        } else if name.starts_with("claude") {
            Provider::Anthropic
        } else if name.starts_with("gemini") || name.starts_with("gemma") {
            Provider::Google
        } else if name.starts_with("grok") {
            Provider::XAI
        } else if name.starts_with("llama") {
            Provider::Meta
        } else if name.starts_with("mistral") || name.starts_with("codestral") {
            Provider::Mistral
        } else if name.starts_with("deepseek") {
            Provider::DeepSeek
        } else if name.starts_with("qwen") {
            Provider::Qwen
        } else {
            Provider::Unknown
        }
    }

    /// Telemetry identifier
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::XAI => "x-ai",
            Provider::Meta => "meta",
            Provider::Mistral => "mistral",
            Provider::DeepSeek => "deepseek",
            Provider::Qwen => "qwen",
            Provider::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
