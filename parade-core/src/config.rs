use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{api::SourceId, model::EventType, risk::Thresholds};

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeaheadConfig {
    pub debounce_ms: u64,
    pub min_chars: usize,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self { debounce_ms: 300, min_chars: 3 }
    }
}

impl TypeaheadConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Optional data source id, "backend" (default) or "open-meteo".
    pub source: Option<String>,

    /// Example TOML:
    /// [backend]
    /// base_url = "http://localhost:5000"
    pub backend: BackendConfig,

    /// Page that shared links point at; falls back to the backend URL.
    pub share_base_url: Option<String>,

    pub default_event: Option<String>,

    pub typeahead: TypeaheadConfig,

    /// Used when a source delivers records without an assessment.
    pub thresholds: Thresholds,
}

impl Config {
    /// Return the data source as a strongly-typed SourceId.
    pub fn source_id(&self) -> Result<SourceId> {
        match self.source.as_deref() {
            None => Ok(SourceId::Backend),
            Some(s) => SourceId::try_from(s).map_err(|err| {
                anyhow!("{err}\nHint: run `parade configure` to pick a valid source.")
            }),
        }
    }

    pub fn set_source(&mut self, id: SourceId) {
        self.source = Some(id.as_str().to_string());
    }

    pub fn share_base(&self) -> &str {
        self.share_base_url.as_deref().unwrap_or(&self.backend.base_url)
    }

    pub fn default_event_type(&self) -> Option<EventType> {
        self.default_event
            .as_deref()
            .filter(|tag| !tag.trim().is_empty())
            .map(EventType::parse)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
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

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "parade", "parade-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("parade-config-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = Config::default();

        assert_eq!(cfg.source_id().unwrap(), SourceId::Backend);
        assert_eq!(cfg.share_base(), DEFAULT_API_BASE);
        assert_eq!(cfg.typeahead.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.typeahead.min_chars, 3);
        assert_eq!(cfg.default_event_type(), None);
    }

    #[test]
    fn set_source_overrides_default() {
        let mut cfg = Config::default();
        cfg.set_source(SourceId::OpenMeteo);
        assert_eq!(cfg.source_id().unwrap(), SourceId::OpenMeteo);
    }

    #[test]
    fn invalid_source_has_hint() {
        let cfg = Config { source: Some("satellite".into()), ..Config::default() };
        let msg = cfg.source_id().unwrap_err().to_string();

        assert!(msg.contains("Unknown source"));
        assert!(msg.contains("Hint: run `parade configure`"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            default_event = "picnic"

            [thresholds.wind]
            strong = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.default_event_type(), Some(EventType::Picnic));
        assert_eq!(cfg.thresholds.wind.strong, 12.0);
        assert_eq!(cfg.thresholds.wind.moderate, 8.0);
        assert_eq!(cfg.backend, BackendConfig::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let path = scratch_path("roundtrip");
        let mut cfg = Config::default();
        cfg.set_source(SourceId::OpenMeteo);
        cfg.share_base_url = Some("https://parade.example/".into());

        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let cfg = Config::load_from(&scratch_path("missing")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
