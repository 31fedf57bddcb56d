//! Client configuration read from `coderev.toml`.
//!
//! Settings are layered file → environment → CLI, later layers winning.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! environment = "production"
//! base_url = "https://code-rev-back.vercel.app/api/v1"
//! timeout_secs = 10
//!
//! [display]
//! page_size = 6
//! expand_categories = false
//! show_refactored = false
//! wrap_width = 0
//! ```
//!
//! Environment overrides: `CODEREV_BASE_URL`, `CODEREV_ENV`,
//! `CODEREV_TIMEOUT_SECS`. The directory holding the file (and the session)
//! is `--config-dir`, else `CODEREV_CONFIG_DIR`, else the platform config
//! directory joined with `coderev`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::client::{ApiClientConfig, DEFAULT_TIMEOUT_SECS, Environment};
use crate::api::endpoints::PAGE_LIMIT;
use crate::errors::ConfigError;

pub const CONFIG_FILE: &str = "coderev.toml";
pub const ENV_CONFIG_DIR: &str = "CODEREV_CONFIG_DIR";
pub const ENV_BASE_URL: &str = "CODEREV_BASE_URL";
pub const ENV_ENVIRONMENT: &str = "CODEREV_ENV";
pub const ENV_TIMEOUT_SECS: &str = "CODEREV_TIMEOUT_SECS";

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default)]
    pub environment: Environment,
    /// Explicit base URL; overrides `environment` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[display]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySection {
    /// Submissions per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Show every category's issues instead of only the counts
    #[serde(default)]
    pub expand_categories: bool,
    /// Print the refactored code panel by default
    #[serde(default)]
    pub show_refactored: bool,
    /// Wrap width for prose; 0 means the terminal width
    #[serde(default)]
    pub wrap_width: usize,
}

fn default_page_size() -> u32 {
    PAGE_LIMIT
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            expand_categories: false,
            show_refactored: false,
            wrap_width: 0,
        }
    }
}

/// Parsed `coderev.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoderevToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub display: DisplaySection,
}

impl CoderevToml {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `coderev.toml` from `config_dir`, or defaults if it does not exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize coderev.toml")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(url) = &self.api.base_url
            && !is_http_url(url)
        {
            warnings.push(format!(
                "Invalid base_url '{}': should start with http:// or https://",
                url
            ));
        }
        if self.api.timeout_secs == 0 {
            warnings.push("timeout_secs is 0; requests would time out immediately".to_string());
        }
        if self.display.page_size == 0 {
            warnings.push(format!(
                "page_size is 0; listings will use {} per page",
                PAGE_LIMIT
            ));
        }

        warnings
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub environment: Option<Environment>,
    pub verbose: bool,
}

/// Effective configuration: file, environment and CLI combined.
#[derive(Debug, Clone)]
pub struct CoderevConfig {
    pub config_dir: PathBuf,
    pub toml: CoderevToml,
    pub cli: CliOverrides,
}

impl CoderevConfig {
    /// Load from `config_dir` and apply CLI overrides.
    pub fn load(config_dir: PathBuf, cli: CliOverrides) -> Result<Self, ConfigError> {
        let toml = CoderevToml::load_or_default(&config_dir)?;
        Ok(Self {
            config_dir,
            toml,
            cli,
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn session_file(&self) -> PathBuf {
        crate::auth::session_path(&self.config_dir)
    }

    /// Environment (CLI → env → file).
    pub fn environment(&self) -> Result<Environment, ConfigError> {
        self.environment_with(|k| std::env::var(k).ok())
    }

    /// Base URL (CLI → env → file → the environment's default).
    pub fn base_url(&self) -> Result<String, ConfigError> {
        self.base_url_with(|k| std::env::var(k).ok())
    }

    /// Request timeout (env → file).
    pub fn timeout(&self) -> Duration {
        self.timeout_with(|k| std::env::var(k).ok())
    }

    pub fn page_size(&self) -> u32 {
        match self.toml.display.page_size {
            0 => PAGE_LIMIT,
            n => n,
        }
    }

    /// Wrap width, or `None` to follow the terminal.
    pub fn wrap_width(&self) -> Option<usize> {
        match self.toml.display.wrap_width {
            0 => None,
            n => Some(n),
        }
    }

    pub fn client_config(&self) -> Result<ApiClientConfig, ConfigError> {
        Ok(ApiClientConfig::for_environment(self.environment()?)
            .with_base_url(self.base_url()?)
            .with_timeout(self.timeout()))
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        if let Ok(url) = self.base_url()
            && !is_http_url(&url)
            && self.toml.api.base_url.as_deref() != Some(url.as_str())
        {
            warnings.push(format!(
                "Effective base URL '{}' should start with http:// or https://",
                url
            ));
        }
        warnings
    }

    fn environment_with<F>(&self, env: F) -> Result<Environment, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(e) = self.cli.environment {
            return Ok(e);
        }
        match env(ENV_ENVIRONMENT).filter(|v| !v.trim().is_empty()) {
            Some(v) => v.parse(),
            None => Ok(self.toml.api.environment),
        }
    }

    fn base_url_with<F>(&self, env: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = self
            .cli
            .base_url
            .clone()
            .or_else(|| env(ENV_BASE_URL))
            .or_else(|| self.toml.api.base_url.clone())
            .filter(|u| !u.trim().is_empty());
        match explicit {
            Some(url) => Ok(url.trim_end_matches('/').to_string()),
            None => Ok(self.environment_with(&env)?.base_url().to_string()),
        }
    }

    fn timeout_with<F>(&self, env: F) -> Duration
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = env(ENV_TIMEOUT_SECS)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(self.toml.api.timeout_secs);
        Duration::from_secs(secs.max(1))
    }
}

/// Resolve the configuration directory (flag → env → platform default).
pub fn resolve_config_dir(flag: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|d| d.join("coderev"))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn config(toml: CoderevToml, cli: CliOverrides) -> CoderevConfig {
        CoderevConfig {
            config_dir: PathBuf::from("/tmp/coderev-test"),
            toml,
            cli,
        }
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_parse_empty() {
        let toml = CoderevToml::parse("").unwrap();
        assert_eq!(toml.api.environment, Environment::Production);
        assert_eq!(toml.api.timeout_secs, 10);
        assert_eq!(toml.display.page_size, 6);
        assert!(!toml.display.expand_categories);
    }

    #[test]
    fn test_parse_full() {
        let content = r#"
[api]
environment = "development"
base_url = "http://localhost:9000/api/v1"
timeout_secs = 30

[display]
page_size = 12
expand_categories = true
show_refactored = true
wrap_width = 72
"#;
        let toml = CoderevToml::parse(content).unwrap();
        assert_eq!(toml.api.environment, Environment::Development);
        assert_eq!(toml.api.base_url.as_deref(), Some("http://localhost:9000/api/v1"));
        assert_eq!(toml.api.timeout_secs, 30);
        assert_eq!(toml.display.page_size, 12);
        assert!(toml.display.show_refactored);
        assert_eq!(toml.display.wrap_width, 72);
    }

    #[test]
    fn test_parse_rejects_unknown_environment() {
        assert!(CoderevToml::parse("[api]\nenvironment = \"staging\"").is_err());
    }

    #[test]
    fn test_validate_clean_default() {
        assert!(CoderevToml::default().validate().is_empty());
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[api]
base_url = "ftp://example.com"

[display]
page_size = 0
"#;
        let warnings = CoderevToml::parse(content).unwrap().validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Invalid base_url"));
        assert!(warnings[1].contains("page_size is 0"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut toml = CoderevToml::default();
        toml.display.page_size = 9;
        toml.api.environment = Environment::Development;
        toml.save(&path).unwrap();

        let loaded = CoderevToml::load(&path).unwrap();
        assert_eq!(loaded.display.page_size, 9);
        assert_eq!(loaded.api.environment, Environment::Development);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let toml = CoderevToml::load_or_default(dir.path()).unwrap();
        assert_eq!(toml.display.page_size, PAGE_LIMIT);
    }

    #[test]
    fn test_load_reports_parse_error_with_path() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[api\n").unwrap();
        let err = CoderevToml::load_or_default(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_base_url_defaults_to_environment() {
        let cfg = config(CoderevToml::default(), CliOverrides::default());
        assert_eq!(
            cfg.base_url_with(env_of(&[])).unwrap(),
            Environment::Production.base_url()
        );

        let env = env_of(&[(ENV_ENVIRONMENT, "development")]);
        assert_eq!(
            cfg.base_url_with(env).unwrap(),
            Environment::Development.base_url()
        );
    }

    #[test]
    fn test_base_url_layering() {
        let mut toml = CoderevToml::default();
        toml.api.base_url = Some("http://file/api/v1".into());

        let cfg = config(toml.clone(), CliOverrides::default());
        assert_eq!(cfg.base_url_with(env_of(&[])).unwrap(), "http://file/api/v1");

        let env = env_of(&[(ENV_BASE_URL, "http://env/api/v1/")]);
        assert_eq!(cfg.base_url_with(&env).unwrap(), "http://env/api/v1");

        let cli = CliOverrides {
            base_url: Some("http://cli/api/v1".into()),
            ..Default::default()
        };
        let cfg = config(toml, cli);
        assert_eq!(cfg.base_url_with(env).unwrap(), "http://cli/api/v1");
    }

    #[test]
    fn test_environment_cli_beats_env() {
        let cli = CliOverrides {
            environment: Some(Environment::Production),
            ..Default::default()
        };
        let cfg = config(CoderevToml::default(), cli);
        let env = env_of(&[(ENV_ENVIRONMENT, "development")]);
        assert_eq!(cfg.environment_with(env).unwrap(), Environment::Production);
    }

    #[test]
    fn test_invalid_environment_variable() {
        let cfg = config(CoderevToml::default(), CliOverrides::default());
        let env = env_of(&[(ENV_ENVIRONMENT, "staging")]);
        assert!(matches!(
            cfg.environment_with(env),
            Err(ConfigError::InvalidEnvironment(_))
        ));
    }

    #[test]
    fn test_timeout_layering() {
        let cfg = config(CoderevToml::default(), CliOverrides::default());
        assert_eq!(cfg.timeout_with(env_of(&[])), Duration::from_secs(10));
        let env = env_of(&[(ENV_TIMEOUT_SECS, "25")]);
        assert_eq!(cfg.timeout_with(env), Duration::from_secs(25));
        let env = env_of(&[(ENV_TIMEOUT_SECS, "soon")]);
        assert_eq!(cfg.timeout_with(env), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        let mut toml = CoderevToml::default();
        toml.display.page_size = 0;
        assert_eq!(config(toml, CliOverrides::default()).page_size(), PAGE_LIMIT);
    }

    #[test]
    fn test_resolve_config_dir_prefers_flag() {
        let dir = resolve_config_dir(Some(PathBuf::from("/x/y"))).unwrap();
        assert_eq!(dir, PathBuf::from("/x/y"));
    }
}
