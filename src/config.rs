use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub folder: FolderConfig,
    #[serde(default)]
    pub menu: MenuConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FolderConfig {
    /// Absolute path of the folder shown in the tray menu.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_watch")]
    pub watch: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MenuConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_strip_file_extensions")]
    pub strip_file_extensions: bool,
    #[serde(default)]
    pub metrics: MenuMetrics,
}

/// Approximate row sizes of the native menu, in physical pixels. Used to
/// place the popup above the tray icon before it is shown.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct MenuMetrics {
    #[serde(default = "default_item_height")]
    pub item_height: u32,
    #[serde(default = "default_separator_height")]
    pub separator_height: u32,
    #[serde(default = "default_padding")]
    pub padding: u32,
}

fn default_watch() -> bool {
    true
}

fn default_title() -> String {
    "Tray-Folder".to_string()
}

fn default_strip_file_extensions() -> bool {
    true
}

fn default_item_height() -> u32 {
    30
}

fn default_separator_height() -> u32 {
    9
}

fn default_padding() -> u32 {
    10
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            path: None,
            watch: default_watch(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            strip_file_extensions: default_strip_file_extensions(),
            metrics: MenuMetrics::default(),
        }
    }
}

impl Default for MenuMetrics {
    fn default() -> Self {
        Self {
            item_height: default_item_height(),
            separator_height: default_separator_height(),
            padding: default_padding(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.folder.path
            && !path.is_absolute()
        {
            bail!("folder.path must be absolute, got {}", path.display());
        }
        if self.menu.title.trim().is_empty() {
            bail!("menu.title must not be empty");
        }
        if self.menu.metrics.item_height == 0 {
            bail!("menu.metrics.item_height must be greater than zero");
        }
        Ok(())
    }

    /// Folder to show: the command-line override wins over `folder.path`.
    pub fn resolve_folder(&self, folder_override: Option<&Path>) -> Result<PathBuf> {
        match folder_override {
            Some(path) => std::path::absolute(path)
                .with_context(|| format!("invalid folder {}", path.display())),
            None => self
                .folder
                .path
                .clone()
                .context("no folder configured"),
        }
    }
}

pub fn get_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tray-folder.json")
}

pub fn load_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        load_and_validate_config(path)
    } else {
        let config = Config::default();
        save_config(path, &config)?;
        log::info!("Created default config at {}", path.display());
        Ok(config)
    }
}

/// Load the config and reject values the tray cannot work with.
pub fn load_and_validate_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).context("failed to read config file")?;
    let config: Config = serde_json::from_str(&content).context("failed to parse config file")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let content = serde_json::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, content).context("failed to write config file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.menu.title, "Tray-Folder");
        assert!(config.folder.watch);
        assert!(config.folder.path.is_none());
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"menu": {"metrics": {"item_height": 24}}}"#).unwrap();
        assert_eq!(config.menu.metrics.item_height, 24);
        assert_eq!(config.menu.metrics.separator_height, 9);
        assert!(config.menu.strip_file_extensions);
    }

    #[test]
    fn creates_default_file_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = load_or_create_config(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, Config::default());
        assert_eq!(load_or_create_config(&path).unwrap(), config);
    }

    #[test]
    fn rejects_relative_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"folder": {"path": "relative/shortcuts"}}"#).unwrap();
        let err = load_and_validate_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("absolute"));
    }

    #[test]
    fn rejects_blank_title_and_zero_rows() {
        let mut config = Config::default();
        config.menu.title = "  ".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.menu.metrics.item_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn override_wins_over_config() {
        let mut config = Config::default();
        config.folder.path = Some(PathBuf::from("/from/config"));
        assert_eq!(
            config.resolve_folder(None).unwrap(),
            PathBuf::from("/from/config")
        );

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            config.resolve_folder(Some(dir.path())).unwrap(),
            dir.path().to_path_buf()
        );
    }

    #[test]
    fn relative_override_becomes_absolute() {
        let resolved = Config::default()
            .resolve_folder(Some(Path::new("shortcuts")))
            .unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("shortcuts"));
    }

    #[test]
    fn missing_folder_is_an_error() {
        assert!(Config::default().resolve_folder(None).is_err());
    }

    #[test]
    fn save_then_load_keeps_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.folder.path = Some(dir.path().to_path_buf());
        save_config(&path, &config).unwrap();
        assert_eq!(load_and_validate_config(&path).unwrap(), config);
    }
}
