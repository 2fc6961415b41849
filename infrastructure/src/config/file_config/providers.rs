//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};

/// Settings shared by every provider.
///
/// ```toml
/// [providers.openai]
/// api_key_env = "OPENAI_API_KEY"
/// base_url = "http://localhost:11434"   # OpenAI-compatible server
///
/// [providers.anthropic]
/// max_tokens = 8192
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Environment variable holding the API key (default depends on the provider)
    pub api_key_env: Option<String>,
    /// Direct API key (not recommended; use the env var instead)
    pub api_key: Option<String>,
    /// Alternative endpoint base
    pub base_url: Option<String>,
    /// Max tokens per response
    pub max_tokens: u32,
    /// HTTP request timeout in seconds
    pub request_timeout: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: None,
            api_key: None,
            base_url: None,
            max_tokens: 4096,
            request_timeout: 120,
        }
    }
}

/// `[providers]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub openai: FileProviderConfig,
    pub anthropic: FileProviderConfig,
}

impl FileProvidersConfig {
    pub fn for_kind(&self, kind: taskloop_domain::ProviderKind) -> &FileProviderConfig {
        match kind {
            taskloop_domain::ProviderKind::OpenAi => &self.openai,
            taskloop_domain::ProviderKind::Anthropic => &self.anthropic,
        }
    }
}
