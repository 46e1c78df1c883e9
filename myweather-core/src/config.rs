use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const API_KEY_ENV: &str = "MYWEATHER_API_KEY";

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FORECAST_DAYS: u8 = 3;

/// Configuration stored on disk.
///
/// Example TOML:
/// api_key = "..."
/// city = "Moscow"
/// language = "ru"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    /// City shown when none is given on the command line.
    pub city: Option<String>,
    pub language: String,
    /// Connect and overall request timeout.
    pub timeout_secs: u64,
    pub forecast_days: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            city: None,
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            forecast_days: DEFAULT_FORECAST_DAYS,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    ///
    /// `MYWEATHER_API_KEY` takes precedence over the stored key.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            cfg.apply_api_key_override(key);
        }

        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file yet.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if cfg.timeout_secs == 0 {
            tracing::warn!(path = %path.display(), "timeout_secs = 0 is not usable, using 1");
            cfg.timeout_secs = 1;
        }

        Ok(cfg)
    }

    /// Like [`load_from`](Self::load_from), but an unreadable or malformed
    /// file yields defaults so it can be rewritten.
    pub fn load_from_or_default(path: &std::path::Path) -> Self {
        Self::load_from(path).unwrap_or_else(|err| {
            tracing::warn!(error = %format!("{err:#}"), "ignoring existing config file");
            Self::default()
        })
    }

    /// Config to start `configure` from.
    pub fn load_for_edit() -> Result<Self> {
        Ok(Self::load_from_or_default(&Self::config_file_path()?))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("space", "serphantom", "myweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `myweather configure` or set {API_KEY_ENV}."
            )
        })
    }

    /// City to use: the explicit one if given, otherwise the configured default.
    pub fn resolve_city(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.city.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No city given and no default city configured.\n\
                     Hint: pass a city or run `myweather configure`."
                )
            })
    }

    /// Request timeout, never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    fn apply_api_key_override(&mut self, key: String) {
        if !key.trim().is_empty() {
            self.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_client_expectations() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.forecast_days, 3);
    }

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("myweather configure"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config { api_key: Some("  ".into()), ..Config::default() };
        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn env_override_replaces_stored_key() {
        let mut cfg = Config { api_key: Some("STORED".into()), ..Config::default() };
        cfg.apply_api_key_override("".into());
        assert_eq!(cfg.require_api_key().unwrap(), "STORED");

        cfg.apply_api_key_override("FROM_ENV".into());
        assert_eq!(cfg.require_api_key().unwrap(), "FROM_ENV");
    }

    #[test]
    fn explicit_city_wins_over_default() {
        let cfg = Config { city: Some("Kazan".into()), ..Config::default() };
        assert_eq!(cfg.resolve_city(Some("Omsk".into())).unwrap(), "Omsk");
        assert_eq!(cfg.resolve_city(None).unwrap(), "Kazan");
        assert!(Config::default().resolve_city(None).is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: Config = toml::from_str("api_key = \"K\"\ncity = \"Paris\"\n").unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("K"));
        assert_eq!(cfg.city.as_deref(), Some("Paris"));
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn save_and_load_roundtrip_on_disk() {
        let dir = std::env::temp_dir().join(format!("myweather-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            city: Some("Sochi".into()),
            language: "ru".into(),
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("myweather-definitely-missing").join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let cfg = Config { timeout_secs: 0, ..Config::default() };
        assert_eq!(cfg.timeout(), Duration::from_secs(1));

        let dir = std::env::temp_dir().join(format!("myweather-zero-timeout-{}", std::process::id()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "timeout_secs = 0\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timeout_secs, 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults_for_editing() {
        let dir = std::env::temp_dir().join(format!("myweather-malformed-{}", std::process::id()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "api_key = [unterminated").unwrap();

        assert!(Config::load_from(&path).is_err());
        assert_eq!(Config::load_from_or_default(&path), Config::default());

        let _ = fs::remove_dir_all(&dir);
    }
}
