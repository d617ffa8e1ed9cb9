//! Configuration file management for skillplan.
//!
//! Provides a TOML-based config file at `~/.config/skillplan/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use skillplan_core::provider::ProviderConfig;
use skillplan_db::config::DbConfig;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV: &str = "SKILLPLAN_MODEL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub provider: ProviderSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the skillplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/skillplan` or
/// `~/.config/skillplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("skillplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("skillplan")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// The file holds an API key, so it is made owner-only on Unix.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Provider settings after resolution. The API key may still be missing;
/// only commands that call the provider require it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub referer: Option<String>,
}

impl ProviderSettings {
    pub fn to_provider_config(&self) -> Result<ProviderConfig> {
        let Some(api_key) = self.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            bail!(
                "API key not found; set {API_KEY_ENV} or run `skillplan init --api-key <key>`"
            );
        };
        Ok(ProviderConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: self.timeout,
            referer: self.referer.clone(),
            ..ProviderConfig::new(api_key)
        })
    }
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct SkillplanConfig {
    pub db_config: DbConfig,
    pub provider: ProviderSettings,
}

impl SkillplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `SKILLPLAN_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - API key: `OPENROUTER_API_KEY` > `provider.api_key`
    /// - Model: `cli_model` > `SKILLPLAN_MODEL` > `provider.model` > `ProviderConfig::DEFAULT_MODEL`
    pub fn resolve(cli_db_url: Option<&str>, cli_model: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();
        Ok(Self::resolve_with(cli_db_url, cli_model, file_config.as_ref()))
    }

    fn resolve_with(
        cli_db_url: Option<&str>,
        cli_model: Option<&str>,
        file_config: Option<&ConfigFile>,
    ) -> Self {
        let file_provider = file_config.map(|c| &c.provider);

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| file_provider.and_then(|p| p.api_key.clone()));

        let model = cli_model
            .map(str::to_string)
            .or_else(|| std::env::var(MODEL_ENV).ok())
            .or_else(|| file_provider.and_then(|p| p.model.clone()))
            .unwrap_or_else(|| ProviderConfig::DEFAULT_MODEL.to_string());

        let base_url = file_provider
            .and_then(|p| p.base_url.clone())
            .unwrap_or_else(|| ProviderConfig::DEFAULT_BASE_URL.to_string());

        let timeout = file_provider
            .and_then(|p| p.timeout_secs)
            .map_or(ProviderConfig::DEFAULT_TIMEOUT, Duration::from_secs);

        Self {
            db_config: DbConfig::new(db_url),
            provider: ProviderSettings {
                api_key,
                model,
                base_url,
                timeout,
                referer: file_provider.and_then(|p| p.referer.clone()),
            },
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
        unsafe { std::env::remove_var(API_KEY_ENV) };
        unsafe { std::env::remove_var(MODEL_ENV) };
    }

    fn sample() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://file:5432/filedb".to_string(),
            },
            provider: ProviderSection {
                api_key: Some("sk-file".to_string()),
                model: Some("file/model".to_string()),
                base_url: Some("http://localhost:9999/v1".to_string()),
                timeout_secs: Some(30),
                referer: None,
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("skillplan").join("config.toml");

        save_config_to(&path, &sample()).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), sample());
    }

    #[test]
    fn provider_section_is_optional() {
        let parsed: ConfigFile =
            toml::from_str("[database]\nurl = \"postgresql://h:5432/db\"\n").unwrap();
        assert_eq!(parsed.provider, ProviderSection::default());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&path, &sample()).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn cli_flags_override_everything() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var(MODEL_ENV, "env/model") };

        let config = SkillplanConfig::resolve_with(
            Some("postgresql://cli:5432/clidb"),
            Some("cli/model"),
            Some(&sample()),
        );
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");
        assert_eq!(config.provider.model, "cli/model");

        clear_env();
    }

    #[test]
    fn env_vars_override_config_file() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var(API_KEY_ENV, "sk-env") };
        unsafe { std::env::set_var(MODEL_ENV, "env/model") };

        let config = SkillplanConfig::resolve_with(None, None, Some(&sample()));
        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.provider.model, "env/model");

        clear_env();
    }

    #[test]
    fn config_file_overrides_defaults() {
        let _lock = lock_env();
        clear_env();

        let config = SkillplanConfig::resolve_with(None, None, Some(&sample()));
        assert_eq!(config.db_config.database_url, "postgresql://file:5432/filedb");
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.provider.base_url, "http://localhost:9999/v1");
        assert_eq!(config.provider.timeout, Duration::from_secs(30));
    }

    #[test]
    fn defaults_when_nothing_set() {
        let _lock = lock_env();
        clear_env();

        let config = SkillplanConfig::resolve_with(None, None, None);
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert_eq!(config.provider.model, ProviderConfig::DEFAULT_MODEL);
        assert_eq!(config.provider.base_url, ProviderConfig::DEFAULT_BASE_URL);
        assert_eq!(config.provider.timeout, ProviderConfig::DEFAULT_TIMEOUT);
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn missing_api_key_is_an_error_only_when_needed() {
        let _lock = lock_env();
        clear_env();

        let config = SkillplanConfig::resolve_with(None, None, None);
        let err = config.provider.to_provider_config().unwrap_err();
        assert!(err.to_string().contains("API key not found"), "{err}");
    }

    #[test]
    fn provider_config_carries_resolved_settings() {
        let _lock = lock_env();
        clear_env();

        let config = SkillplanConfig::resolve_with(None, None, Some(&sample()));
        let provider = config.provider.to_provider_config().unwrap();
        assert_eq!(provider.api_key, "sk-file");
        assert_eq!(provider.model, "file/model");
        assert_eq!(provider.timeout, Duration::from_secs(30));
        assert_eq!(provider.temperature, ProviderConfig::DEFAULT_TEMPERATURE);
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("skillplan/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
