// src/config.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{AnalyzeError, Result};

/// Instruction sent alongside every image unless the config file overrides it.
pub const DEFAULT_PROMPT: &str = r#"Analyze this food image and provide a JSON response with:
{
  "foodName": "name of the food",
  "isSafe": true or false,
  "explanation": "detailed explanation",
  "warnings": ["any warnings as array"]
}"#;

pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024; // 10MB
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Which hosted vision model backend the relay talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Gemini,
}

impl ProviderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }

    pub fn key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }

    fn base_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_BASE",
            ProviderKind::Gemini => "GEMINI_API_BASE",
        }
    }

    fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "https://api.openai.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-4o",
            ProviderKind::Gemini => "gemini-1.5-flash",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(AnalyzeError::Config(format!(
                "Unknown provider '{}'. Expected 'openai' or 'gemini'.",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

/// Settings for the outbound model call.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub provider: ProviderKind,
    pub api_base: String,
    /// Absent when the credential is not set; requests then fail with a configuration error.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// High-level application configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub prompt: String,
}

/// Optional TOML file pointed to by `ANALYZER_CONFIG`.
/// Credentials are deliberately not read from here.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_body_bytes: Option<usize>,
    pub provider: Option<ProviderKind>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub prompt: Option<String>,
    pub prompt_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and environment variables
    pub fn from_env() -> Result<Self> {
        let file = match std::env::var("ANALYZER_CONFIG") {
            Ok(path) if !path.trim().is_empty() => {
                log::info!("📄 Loading config file {}", path);
                FileConfig::load(path.trim())?
            }
            _ => FileConfig::default(),
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Layers environment values (looked up through `env`) over the file config and defaults.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = match env("ANALYZER_PROVIDER") {
            Some(name) => name.parse()?,
            None => file.provider.unwrap_or(ProviderKind::OpenAI),
        };

        let api_base = env(provider.base_env())
            .or(file.api_base)
            .unwrap_or_else(|| provider.default_api_base().to_string());

        let model = env("ANALYZER_MODEL")
            .or(file.model)
            .unwrap_or_else(|| provider.default_model().to_string());

        let upstream = UpstreamConfig {
            provider,
            api_base,
            api_key: env(provider.key_env()),
            model,
            max_tokens: parse_var(&env, "ANALYZER_MAX_TOKENS")?
                .or(file.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: parse_var(&env, "ANALYZER_TEMPERATURE")?
                .or(file.temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
        };

        let server = ServerConfig {
            host: env("ANALYZER_HOST")
                .or(file.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&env, "ANALYZER_PORT")?.or(file.port).unwrap_or(8080),
            max_body_bytes: parse_var(&env, "ANALYZER_MAX_BODY_BYTES")?
                .or(file.max_body_bytes)
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        };

        let prompt = match (file.prompt, file.prompt_file) {
            (Some(prompt), _) => prompt,
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => DEFAULT_PROMPT.to_string(),
        };

        if prompt.trim().is_empty() {
            return Err(AnalyzeError::Config("Prompt template must not be empty".to_string()));
        }

        Ok(AppConfig { server, upstream, prompt })
    }
}

fn parse_var<T: FromStr>(env: impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match env(key) {
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            AnalyzeError::Config(format!("{} has an invalid value: '{}'", key, raw))
        }),
        None => Ok(None),
    }
}
