use crate::exceptions::ParleyError;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Provider credentials and overrides, loaded from `~/.parley/config`.
pub type Config = HashMap<String, String>;

/// Application root (`~/.parley`). `PARLEY_HOME` relocates it, which is how
/// the integration tests point the binary at a scratch directory.
pub fn app_dir() -> PathBuf {
    if let Ok(dir) = env::var("PARLEY_HOME")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }

    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".parley"))
        .unwrap_or_else(|| PathBuf::from(".parley"))
}

pub fn config_path() -> PathBuf {
    app_dir().join("config")
}

pub fn conversations_dir() -> PathBuf {
    app_dir().join("conversations")
}

/// Line-oriented `key=value` parsing: `#` comments and blank lines are
/// skipped, the first `=` splits key from value, both sides are trimmed.
/// A value may itself contain `=` and is preserved verbatim.
pub fn parse_config(content: &str) -> Config {
    let mut config = Config::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = trimmed.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    config
}

pub fn load_config() -> Result<Config, ParleyError> {
    let path = config_path();
    match fs::read_to_string(&path) {
        Ok(content) => Ok(parse_config(&content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(ParleyError::Configuration(format!(
                "Config file not found: {}\n\
                 Create the file with your API keys:\n\
                 \x20 PERPLEXITY_API_KEY=your-key\n\
                 \x20 OPENAI_API_KEY=your-key\n\
                 \x20 ANTHROPIC_API_KEY=your-key\n\
                 \x20 XAI_API_KEY=your-key\n\
                 \n\
                 Optional settings:\n\
                 \x20 DEFAULT_PROVIDER=perplexity  # perplexity, openai, anthropic, or xai\n\
                 \x20 PERPLEXITY_MODEL=sonar       # default model for Perplexity\n\
                 \x20 OPENAI_MODEL=gpt-4o          # default model for OpenAI\n\
                 \x20 ANTHROPIC_MODEL=claude-sonnet-4-20250514  # default model for Anthropic\n\
                 \x20 XAI_MODEL=grok-4             # default model for xAI",
                path.display()
            )))
        }
        Err(err) => Err(err.into()),
    }
}

/// Idempotent; safe to call before any read or write.
pub fn ensure_directories() -> Result<(), ParleyError> {
    fs::create_dir_all(conversations_dir())?;
    Ok(())
}
