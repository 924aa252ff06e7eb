use crate::error::{Error, Result};

/// Generation service behind an OpenAI-compatible chat-completions API.
#[derive(Clone, Debug, Default)]
pub enum Provider {
    #[default]
    Groq,
    Openai,
    Gemini,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Groq => ProviderConfig {
                api_url: "https://api.groq.com/openai/v1/chat/completions",
                model: "llama-3.3-70b-versatile",
                env_var: "GROQ_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-4o-mini",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                model: "gemini-2.0-flash",
                env_var: "GEMINI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::Openai => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    /// Validate that the API key is set for this provider.
    pub fn validate_api_key(&self) -> Result<String> {
        let config = self.config();
        std::env::var(config.env_var).map_err(|_| Error::MissingApiKey {
            env_var: config.env_var.to_string(),
        })
    }
}
