//! Model providers.
//!
//! Each provider implements [`ModelClient`] over HTTP with `reqwest`.
//! The provider is chosen once at startup from [`ProviderKind`]:
//!
//! | Kind        | Client              | Endpoint                  |
//! |-------------|---------------------|---------------------------|
//! | `openai`    | [`OpenAiClient`]    | `/v1/chat/completions`    |
//! | `anthropic` | [`AnthropicClient`] | `/v1/messages`            |

pub mod anthropic;
pub mod error;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use error::ProviderError;
pub use openai::OpenAiClient;

use std::time::Duration;
use taskloop_application::ModelClient;
use taskloop_domain::{ProviderKind, ToolCall};

/// Per-request timeout for model calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Output token cap sent to providers that require one.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Everything a provider client needs to make requests.
#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    /// Overrides the provider's public endpoint (proxies, compatible servers)
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    pub max_tokens: u32,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Look up the API key for `kind`, preferring `env_override` when given.
pub fn resolve_api_key(
    kind: ProviderKind,
    env_override: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ProviderError> {
    let env = env_override.unwrap_or(kind.api_key_env());
    lookup(env)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ProviderError::MissingApiKey {
            env: env.to_string(),
        })
}

/// Build the client for `kind`.
pub fn create_model_client(
    kind: ProviderKind,
    settings: ProviderSettings,
) -> Result<Box<dyn ModelClient>, ProviderError> {
    tracing::info!("Using {} provider with model {}", kind, settings.model);
    Ok(match kind {
        ProviderKind::OpenAi => Box::new(OpenAiClient::new(settings)?),
        ProviderKind::Anthropic => Box::new(AnthropicClient::new(settings)?),
    })
}

pub(crate) fn http_client(settings: &ProviderSettings) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| ProviderError::Connection(e.to_string()))
}

/// Provider call id for a tool exchange; turns without one get `call_<index>`.
pub(crate) fn call_id_for(call: &ToolCall, turn_index: usize) -> String {
    call.call_id
        .clone()
        .unwrap_or_else(|| format!("call_{}", turn_index))
}

/// Build a [`ToolCall`] from a provider's JSON arguments (non-objects become no arguments).
pub(crate) fn tool_call_from_json(
    name: String,
    call_id: Option<String>,
    arguments: serde_json::Value,
) -> ToolCall {
    let mut call = ToolCall::new(name);
    if let serde_json::Value::Object(map) = arguments {
        call.arguments = map.into_iter().collect();
    }
    call.call_id = call_id;
    call
}
