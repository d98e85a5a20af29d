// config.rs - Bot Configuration
// Reads botconfig.txt (KEY=VALUE) with multi-path fallback and lets the
// process environment override anything found in the file.
//
// Used by: main.rs (startup), pong_bot.rs (client + API wiring)

use std::collections::HashMap;
use std::env;
use std::fs;
use thiserror::Error;

const CONFIG_PATHS: [&str; 4] = [
    "botconfig.txt",
    "../botconfig.txt",
    "../../botconfig.txt",
    "src/botconfig.txt",
];

const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";

pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_JOKE_URL: &str = "https://official-joke-api.appspot.com/random_joke";
pub const DEFAULT_QUOTE_URL: &str = "https://api.quotable.io/random";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN not found in environment or botconfig.txt")]
    MissingToken,
    #[error("DISCORD_TOKEN is empty or still set to the placeholder value")]
    PlaceholderToken,
}

/// Endpoints and credentials for the third-party JSON APIs.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub weather_url: String,
    pub weather_api_key: Option<String>,
    pub joke_url: String,
    pub quote_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            weather_api_key: None,
            joke_url: DEFAULT_JOKE_URL.to_string(),
            quote_url: DEFAULT_QUOTE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub apis: ApiConfig,
    /// Where the file values came from, if a file was found at all
    pub source: Option<&'static str>,
}

/// Raw KEY=VALUE pairs from the first botconfig.txt found, if any.
#[derive(Debug, Default)]
pub struct ConfigSources {
    pub file_values: HashMap<String, String>,
    pub path: Option<&'static str>,
}

impl ConfigSources {
    pub fn discover() -> Self {
        match read_config_file() {
            Some((path, content)) => Self {
                file_values: parse_config(&content),
                path: Some(path),
            },
            None => Self::default(),
        }
    }

    /// Logger filter: `RUST_LOG` from the environment, else from the file.
    pub fn log_filter(&self) -> Option<String> {
        log_filter_from(&self.file_values, |key| env::var(key).ok())
    }
}

impl BotConfig {
    /// Resolve against the process environment, falling back to `sources`.
    pub fn load(sources: &ConfigSources) -> Result<Self, ConfigError> {
        let mut config = Self::from_sources(&sources.file_values, |key| env::var(key).ok())?;
        config.source = sources.path;
        Ok(config)
    }

    /// Resolve every key, preferring `lookup` (the environment) over file values.
    pub fn from_sources<F>(
        file_values: &HashMap<String, String>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| resolve(file_values, &lookup, key);
        let non_empty = |key: &str| get(key).filter(|v| !v.is_empty());

        let discord_token = match get("DISCORD_TOKEN") {
            Some(token) if token.is_empty() || token == TOKEN_PLACEHOLDER => {
                return Err(ConfigError::PlaceholderToken)
            }
            Some(token) => token,
            None => return Err(ConfigError::MissingToken),
        };

        let defaults = ApiConfig::default();
        let apis = ApiConfig {
            weather_url: non_empty("WEATHER_API_URL").unwrap_or(defaults.weather_url),
            weather_api_key: non_empty("WEATHER_API_KEY"),
            joke_url: non_empty("JOKE_API_URL").unwrap_or(defaults.joke_url),
            quote_url: non_empty("QUOTE_API_URL").unwrap_or(defaults.quote_url),
        };

        Ok(Self {
            discord_token,
            apis,
            source: None,
        })
    }
}

/// Environment value unless it is blank, otherwise the file value.
fn resolve<F>(file_values: &HashMap<String, String>, lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| file_values.get(key).map(|v| v.trim().to_string()))
}

pub fn log_filter_from<F>(file_values: &HashMap<String, String>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    resolve(file_values, &lookup, "RUST_LOG").filter(|v| !v.is_empty())
}

fn read_config_file() -> Option<(&'static str, String)> {
    for config_path in CONFIG_PATHS {
        match fs::read_to_string(config_path) {
            Ok(content) => return Some((config_path, content)),
            // Try next path
            Err(_) => continue,
        }
    }
    None
}

/// Parse KEY=VALUE lines, skipping blanks and `#` comments.
pub fn parse_config(content: &str) -> HashMap<String, String> {
    // Remove BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    config
}
