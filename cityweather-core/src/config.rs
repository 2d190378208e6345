use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, path::PathBuf, time::Duration};

/// Timeout applied when neither the environment nor the config file set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeather current-weather endpoint: place name first, API key second.
pub const OPENWEATHER_TEMPLATE: &str =
    "https://api.openweathermap.org/data/2.5/weather?q={}&appid={}";

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_URL: &str = "URL";
pub const ENV_TIMEOUT_SECS: &str = "LOOKUP_TIMEOUT_SECS";

/// Provider URL with exactly two `{}` slots: place name, then API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    raw: String,
    head: String,
    middle: String,
    tail: String,
}

impl EndpointTemplate {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let slots = raw.matches("{}").count();
        if slots != 2 {
            bail!(
                "Endpoint template must contain exactly two `{{}}` slots (place, API key), found {slots}: {raw}"
            );
        }

        let (head, rest) = raw
            .split_once("{}")
            .ok_or_else(|| anyhow!("Endpoint template is missing its place slot: {raw}"))?;
        let (middle, tail) = rest
            .split_once("{}")
            .ok_or_else(|| anyhow!("Endpoint template is missing its API key slot: {raw}"))?;

        let template = Self {
            raw: raw.to_string(),
            head: head.to_string(),
            middle: middle.to_string(),
            tail: tail.to_string(),
        };

        let probe = template.render("place", "key");
        let url = reqwest::Url::parse(&probe)
            .with_context(|| format!("Endpoint template does not form a valid URL: {raw}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Endpoint template must use http or https, got `{}`", url.scheme());
        }

        Ok(template)
    }

    /// Substitute both slots, percent-encoding each value.
    pub fn render(&self, place: &str, api_key: &str) -> String {
        format!(
            "{}{}{}{}{}",
            self.head,
            urlencoding::encode(place),
            self.middle,
            urlencoding::encode(api_key),
            self.tail
        )
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for EndpointTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Everything a [`crate::WeatherLookup`] needs, resolved and validated.
#[derive(Clone)]
pub struct LookupConfig {
    pub api_key: String,
    pub endpoint: EndpointTemplate,
    pub timeout: Duration,
}

impl LookupConfig {
    pub fn new(api_key: impl Into<String>, endpoint: EndpointTemplate) -> Self {
        Self { api_key: api_key.into(), endpoint, timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for LookupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Settings stored on disk, overridable from the environment.
///
/// Example TOML:
/// api_key = "..."
/// endpoint_template = "https://api.openweathermap.org/data/2.5/weather?q={}&appid={}"
/// timeout_secs = 10
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub endpoint_template: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint_template", &self.endpoint_template)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Load settings from the platform config file, or empty defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save to the platform config file and return its path.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the process environment.
    pub fn with_process_env(self) -> Result<Self> {
        self.with_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; blank values count as unset.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = get(ENV_URL) {
            self.endpoint_template = Some(url);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs = secs.trim().parse::<u64>().with_context(|| {
                format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got `{secs}`")
            })?;
            self.timeout_secs = Some(secs);
        }

        Ok(self)
    }

    /// Validate and turn into a [`LookupConfig`].
    pub fn resolve(&self) -> Result<LookupConfig> {
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()).ok_or_else(
            || {
                anyhow!(
                    "No API key configured.\n\
                     Hint: set {ENV_API_KEY} or run `cityweather configure`."
                )
            },
        )?;

        let raw = self.endpoint_template.as_deref().ok_or_else(|| {
            anyhow!(
                "No endpoint template configured.\n\
                 Hint: set {ENV_URL} (e.g. {OPENWEATHER_TEMPLATE}) or run `cityweather configure`."
            )
        })?;
        let endpoint = EndpointTemplate::parse(raw)?;

        let timeout = match self.timeout_secs {
            Some(0) => bail!("Timeout must be at least 1 second"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        Ok(LookupConfig::new(api_key, endpoint).with_timeout(timeout))
    }
}
