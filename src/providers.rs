use crate::config::Config;
use crate::exceptions::ParleyError;
use crate::llm::api_models::{AnthropicModelsResponse, OpenAiModelsResponse};
use crate::llm::client::{ANTHROPIC_VERSION, Dialect, ModelHandle};
use crate::models::ModelEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Perplexity,
    OpenAi,
    Anthropic,
    Xai,
}

pub const FALLBACK_PROVIDER: Provider = Provider::Perplexity;

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Perplexity,
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Xai,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Provider::Perplexity => "perplexity",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Xai => "xai",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.name().eq_ignore_ascii_case(name))
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Perplexity => "sonar",
            Provider::OpenAi => "gpt-4o",
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::Xai => "grok-4",
        }
    }

    fn api_key_setting(self) -> &'static str {
        match self {
            Provider::Perplexity => "PERPLEXITY_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Xai => "XAI_API_KEY",
        }
    }

    fn model_setting(self) -> &'static str {
        match self {
            Provider::Perplexity => "PERPLEXITY_MODEL",
            Provider::OpenAi => "OPENAI_MODEL",
            Provider::Anthropic => "ANTHROPIC_MODEL",
            Provider::Xai => "XAI_MODEL",
        }
    }

    pub fn base_url_env(self) -> &'static str {
        match self {
            Provider::Perplexity => "PERPLEXITY_BASE_URL",
            Provider::OpenAi => "OPENAI_BASE_URL",
            Provider::Anthropic => "ANTHROPIC_BASE_URL",
            Provider::Xai => "XAI_BASE_URL",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Perplexity => "https://api.perplexity.ai",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Xai => "https://api.x.ai/v1",
        }
    }

    pub fn dialect(self) -> Dialect {
        match self {
            Provider::Anthropic => Dialect::AnthropicMessages,
            _ => Dialect::ChatCompletions,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutually exclusive provider selection flags, shared by `ask`, `chat`,
/// and `models`.
#[derive(Debug, Default, Clone, Copy, clap::Args)]
pub struct ProviderFlags {
    /// Use Perplexity AI (default)
    #[arg(short = 'p', long)]
    pub perplexity: bool,
    /// Use OpenAI
    #[arg(short = 'o', long)]
    pub openai: bool,
    /// Use Anthropic Claude
    #[arg(short = 'a', long)]
    pub anthropic: bool,
    /// Use xAI Grok
    #[arg(short = 'x', long)]
    pub xai: bool,
}

/// Explicit flag (fixed priority order) beats the configured default beats
/// the hardcoded fallback. An unrecognized `DEFAULT_PROVIDER` value falls
/// through silently.
pub fn determine_provider(flags: &ProviderFlags, config: &Config) -> Provider {
    if flags.openai {
        return Provider::OpenAi;
    }
    if flags.anthropic {
        return Provider::Anthropic;
    }
    if flags.perplexity {
        return Provider::Perplexity;
    }
    if flags.xai {
        return Provider::Xai;
    }

    if let Some(configured) = config.get("DEFAULT_PROVIDER")
        && let Some(provider) = Provider::from_name(configured)
    {
        return provider;
    }

    FALLBACK_PROVIDER
}

/// Providers selected by filter flags for the `models` listing; no flags
/// means all of them.
pub fn selected_providers(flags: &ProviderFlags) -> Vec<Provider> {
    let mut providers = Vec::new();
    if flags.perplexity {
        providers.push(Provider::Perplexity);
    }
    if flags.openai {
        providers.push(Provider::OpenAi);
    }
    if flags.anthropic {
        providers.push(Provider::Anthropic);
    }
    if flags.xai {
        providers.push(Provider::Xai);
    }

    if providers.is_empty() {
        Provider::ALL.to_vec()
    } else {
        providers
    }
}

/// A provider made callable: credential checked, model name resolved.
#[derive(Debug)]
pub struct ResolvedModel {
    pub handle: ModelHandle,
    pub provider: Provider,
    pub model_name: String,
}

pub fn resolve_model(provider: Provider, config: &Config) -> Result<ResolvedModel, ParleyError> {
    let api_key = require_api_key(provider, config)?;
    let model_name = config
        .get(provider.model_setting())
        .cloned()
        .unwrap_or_else(|| provider.default_model().to_string());

    Ok(ResolvedModel {
        handle: ModelHandle::new(provider, &model_name, api_key),
        provider,
        model_name,
    })
}

fn require_api_key(provider: Provider, config: &Config) -> Result<&str, ParleyError> {
    let setting = provider.api_key_setting();
    config
        .get(setting)
        .map(String::as_str)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ParleyError::Configuration(format!("{} not found in config", setting)))
}

// --- Model listings ---

// Perplexity has no models list API
const PERPLEXITY_MODELS: &[(&str, &str)] = &[
    ("sonar", "Lightweight, cost-effective search model"),
    ("sonar-pro", "Advanced search for complex queries"),
    ("sonar-reasoning", "Chain-of-thought problem solving"),
    ("sonar-reasoning-pro", "Advanced reasoning (DeepSeek-R1)"),
    ("sonar-deep-research", "Deep research sessions"),
];

// xAI has no public models list API either
const XAI_MODELS: &[(&str, &str)] = &[
    ("grok-4-1-fast-reasoning", "Grok 4.1 fast with reasoning"),
    ("grok-4-1-fast-non-reasoning", "Grok 4.1 fast without reasoning"),
    ("grok-code-fast-1", "Grok optimized for code"),
    ("grok-4-fast-reasoning", "Grok 4 fast with reasoning"),
    ("grok-4-fast-non-reasoning", "Grok 4 fast without reasoning"),
    ("grok-4-0709", "Grok 4 flagship model"),
    ("grok-3-mini", "Lightweight Grok 3 model"),
    ("grok-3", "Grok 3 base model"),
    ("grok-2-vision-1212", "Grok 2 with vision capabilities"),
    ("grok-2-image-1212", "Image generation model"),
];

fn static_catalogue(models: &[(&str, &str)]) -> Vec<ModelEntry> {
    models
        .iter()
        .map(|(id, description)| ModelEntry {
            id: (*id).to_string(),
            description: Some((*description).to_string()),
            display_name: None,
        })
        .collect()
}

pub async fn list_models(
    provider: Provider,
    config: &Config,
) -> Result<Vec<ModelEntry>, ParleyError> {
    match provider {
        Provider::Perplexity => Ok(static_catalogue(PERPLEXITY_MODELS)),
        Provider::Xai => Ok(static_catalogue(XAI_MODELS)),
        Provider::OpenAi => fetch_openai_models(require_api_key(provider, config)?).await,
        Provider::Anthropic => fetch_anthropic_models(require_api_key(provider, config)?).await,
    }
}

async fn fetch_openai_models(api_key: &str) -> Result<Vec<ModelEntry>, ParleyError> {
    let base_url = std::env::var(Provider::OpenAi.base_url_env())
        .unwrap_or_else(|_| Provider::OpenAi.default_base_url().to_string());

    let response = crate::utils::setup_http_client()
        .get(format!("{}/models", base_url))
        .header("Authorization", format!("Bearer {}", api_key))
        .send()
        .await
        .map_err(|e| ParleyError::Provider(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ParleyError::Provider(format!(
            "OpenAI API error: {}",
            response.status()
        )));
    }

    let body: OpenAiModelsResponse = response
        .json()
        .await
        .map_err(|e| ParleyError::Provider(e.to_string()))?;

    let mut items = body.data;
    items.sort_unstable_by(|a, b| b.created.cmp(&a.created));

    Ok(items
        .into_iter()
        .map(|item| ModelEntry {
            id: item.id,
            description: None,
            display_name: None,
        })
        .collect())
}

async fn fetch_anthropic_models(api_key: &str) -> Result<Vec<ModelEntry>, ParleyError> {
    let base_url = std::env::var(Provider::Anthropic.base_url_env())
        .unwrap_or_else(|_| Provider::Anthropic.default_base_url().to_string());

    let response = crate::utils::setup_http_client()
        .get(format!("{}/v1/models", base_url))
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .send()
        .await
        .map_err(|e| ParleyError::Provider(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ParleyError::Provider(format!(
            "Anthropic API error: {}",
            response.status()
        )));
    }

    let body: AnthropicModelsResponse = response
        .json()
        .await
        .map_err(|e| ParleyError::Provider(e.to_string()))?;

    Ok(body
        .data
        .into_iter()
        .map(|item| ModelEntry {
            id: item.id,
            description: None,
            display_name: item.display_name,
        })
        .collect())
}
