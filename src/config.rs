use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::Mode;
use crate::signals::DEFAULT_SCAN_CHARS;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "algonote.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub notion: NotionConfig,
    /// Secrets and overrides from the environment; never read from the file.
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Heuristic,
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Characters of source inspected by the signal probes.
    #[serde(default = "default_chars")]
    pub scan_chars: usize,
    /// Characters of source stored in the note's `code` field.
    #[serde(default = "default_chars")]
    pub max_code_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            scan_chars: default_chars(),
            max_code_chars: default_chars(),
        }
    }
}

fn default_chars() -> usize {
    DEFAULT_SCAN_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            save: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub parent_page_id: Option<String>,
    #[serde(default = "default_notion_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            parent_page_id: None,
            api_version: default_notion_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

/// Values taken from the process environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub notion_token: Option<String>,
    pub notion_parent_page_id: Option<String>,
    pub mode: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            notion_token: get("NOTION_TOKEN").or_else(|| get("NOTION_API_KEY")),
            notion_parent_page_id: get("NOTION_PARENT_PAGE_ID"),
            mode: get("ALGONOTE_MODE"),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("notion_token", &redact(&self.notion_token))
            .field("notion_parent_page_id", &self.notion_parent_page_id)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Config {
    /// Built-in defaults with no environment applied.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Fold environment values into the file configuration.
    pub fn with_credentials(mut self, credentials: Credentials) -> Result<Self> {
        if let Some(mode) = &credentials.mode {
            self.generation.mode = mode
                .parse()
                .with_context(|| "Invalid ALGONOTE_MODE environment variable")?;
        }
        if let Some(parent) = &credentials.notion_parent_page_id {
            self.notion.parent_page_id = Some(parent.clone());
        }
        self.credentials = credentials;
        Ok(self)
    }

    /// Parent page to publish under, if any.
    pub fn notion_parent(&self) -> Option<&str> {
        self.notion
            .parent_page_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.scan_chars == 0 {
            anyhow::bail!("limits.scan_chars must be > 0");
        }
        if self.limits.max_code_chars == 0 {
            anyhow::bail!("limits.max_code_chars must be > 0");
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            anyhow::bail!("generation.temperature must be in [0.0, 2.0]");
        }
        if self.generation.timeout_secs == 0 {
            anyhow::bail!("generation.timeout_secs must be > 0");
        }
        if self.generation.is_enabled() && self.generation.model.trim().is_empty() {
            anyhow::bail!(
                "generation.model must be specified when provider is '{}'",
                self.generation.provider
            );
        }
        match self.generation.provider.as_str() {
            "disabled" | "openai" => {}
            other => anyhow::bail!(
                "Unknown generation provider: '{}'. Must be disabled or openai.",
                other
            ),
        }

        if self.notion.timeout_secs == 0 {
            anyhow::bail!("notion.timeout_secs must be > 0");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Load the explicit config file, or `./algonote.toml` when present, or the
/// defaults. An explicitly named file that does not exist is an error.
pub fn resolve(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                load_config(default)
            } else {
                Ok(Config::minimal())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(toml_text: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_text)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.generation.mode, Mode::Heuristic);
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.limits.scan_chars, 20_000);
        assert_eq!(config.limits.max_code_chars, 20_000);
        assert!(config.output.save);
        assert!(config.notion.enabled);
        assert_eq!(config.notion.api_version, "2022-06-28");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [generation]
            mode = "hybrid"
            temperature = 0.7

            [output]
            dir = "notes"
            "#,
        )
        .unwrap();
        assert_eq!(config.generation.mode, Mode::Hybrid);
        assert_eq!(config.generation.max_retries, 3);
        assert_eq!(config.output.dir, PathBuf::from("notes"));
        assert!(config.output.save);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse("[limits]\nscan_chars = 0").is_err());
        assert!(parse("[limits]\nmax_code_chars = 0").is_err());
        assert!(parse("[generation]\ntemperature = 3.5").is_err());
        assert!(parse("[generation]\nprovider = \"anthropic\"").is_err());
        assert!(parse("[generation]\nmode = \"magic\"").is_err());
    }

    #[test]
    fn disabled_provider_needs_no_model() {
        let config = parse("[generation]\nprovider = \"disabled\"\nmodel = \"\"").unwrap();
        assert!(!config.generation.is_enabled());
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("NOTION_API_KEY", "secret"),
            ("NOTION_PARENT_PAGE_ID", " page-123 "),
            ("ALGONOTE_MODE", "llm"),
        ]
        .into_iter()
        .collect();
        let creds = Credentials::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(creds.notion_token.as_deref(), Some("secret"));

        let config = parse("[notion]\nparent_page_id = \"from-file\"")
            .unwrap()
            .with_credentials(creds)
            .unwrap();
        assert_eq!(config.generation.mode, Mode::Llm);
        assert_eq!(config.notion_parent(), Some("page-123"));
        assert_eq!(config.credentials.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn invalid_env_mode_is_an_error() {
        let creds = Credentials::from_lookup(|k| (k == "ALGONOTE_MODE").then(|| "fast".to_string()));
        assert!(Config::minimal().with_credentials(creds).is_err());
    }

    #[test]
    fn blank_env_values_are_unset() {
        let creds = Credentials::from_lookup(|_| Some("   ".to_string()));
        assert!(creds.openai_api_key.is_none());
        assert!(creds.mode.is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials {
            openai_api_key: Some("sk-live".to_string()),
            ..Credentials::default()
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("sk-live"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(resolve(Some(&missing)).is_err());
    }

    #[test]
    fn load_config_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("algonote.toml");
        std::fs::write(&path, "[output]\nsave = false\n").unwrap();
        let config = resolve(Some(&path)).unwrap();
        assert!(!config.output.save);
    }
}
