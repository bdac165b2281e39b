use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Empty means the profile's data directory
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database_path: String,
    /// Owner of new cards and whose deck is reviewed
    #[serde(default = "default_current_user")]
    pub current_user: String,
    /// Filter directive for the log file, e.g. "info" or "recall=debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_reveal")]
    pub reveal: String,
    #[serde(default = "default_recalled")]
    pub recalled: String,
    #[serde(default = "default_forgot")]
    pub forgot: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_tab_left")]
    pub tab_left: String,
    #[serde(default = "default_tab_right")]
    pub tab_right: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    /// Derived from `highlight_bg` when left empty
    #[serde(default)]
    pub highlight_fg: String,
    #[serde(default = "default_tab_bg")]
    pub tab_bg: String,
    /// Colour of the answer side of a card
    #[serde(default = "default_answer_fg")]
    pub answer_fg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: String::new(),
            current_user: default_current_user(),
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes: HashMap::new(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            reveal: default_reveal(),
            recalled: default_recalled(),
            forgot: default_forgot(),
            new: default_new(),
            delete: default_delete(),
            save: default_save(),
            help: default_help(),
            tab_left: default_tab_left(),
            tab_right: default_tab_right(),
            list_up: default_list_up(),
            list_down: default_list_down(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: String::new(),
            tab_bg: default_tab_bg(),
            answer_fg: default_answer_fg(),
        }
    }
}

impl Theme {
    fn preset(fg: &str, bg: &str, highlight_bg: &str, answer_fg: &str) -> Self {
        Self {
            fg: fg.to_string(),
            bg: bg.to_string(),
            highlight_bg: highlight_bg.to_string(),
            highlight_fg: String::new(),
            tab_bg: default_tab_bg(),
            answer_fg: answer_fg.to_string(),
        }
    }

    /// Themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();
        themes.insert("default".to_string(), Theme::default());
        themes.insert("light".to_string(), Theme::preset("black", "white", "blue", "magenta"));
        themes.insert("indigo".to_string(), Theme::preset("white", "black", "#4F46E5", "lightcyan"));
        themes.insert("monochrome".to_string(), Theme::preset("white", "black", "white", "white"));
        themes
    }
}

fn default_current_user() -> String {
    "default".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_reveal() -> String {
    "Space".to_string()
}

fn default_recalled() -> String {
    "y".to_string()
}

fn default_forgot() -> String {
    "n".to_string()
}

fn default_new() -> String {
    "a".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_tab_left() -> String {
    "Left".to_string()
}

fn default_tab_right() -> String {
    "Right".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_tab_bg() -> String {
    "gray".to_string()
}

fn default_answer_fg() -> String {
    "lightgreen".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid key binding for '{action}': {reason}")]
    KeyBindingError { action: String, reason: String },
}

impl Config {
    /// Load the profile's config file, creating it with defaults when missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Ok(Self::load_from_path(&config_path)?.with_profile_defaults(profile))
    }

    /// Fill in settings whose default depends on the profile
    pub fn with_profile_defaults(mut self, profile: utils::Profile) -> Self {
        if self.database_path.trim().is_empty() {
            self.database_path = Self::default_database_path_for_profile(profile);
        }
        self
    }

    /// Load from an explicit file, creating it with defaults when missing
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to_path(config_path)?;
            tracing::info!(path = %config_path.display(), "created default config");
            Ok(config)
        }
    }

    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            return data_dir.join("cards.db").to_string_lossy().to_string();
        }
        match profile {
            utils::Profile::Dev => "~/.local/share/recall-dev/cards.db".to_string(),
            utils::Profile::Prod => "~/.local/share/recall/cards.db".to_string(),
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Log file sits next to the database
    pub fn get_log_path(&self) -> PathBuf {
        let db_path = self.get_database_path();
        db_path
            .parent()
            .map(|dir| dir.join("recall.log"))
            .unwrap_or_else(|| PathBuf::from("recall.log"))
    }

    /// Every configured key binding must parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (action, binding) in self.key_bindings.entries() {
            utils::parse_key_binding(binding).map_err(|reason| ConfigError::KeyBindingError {
                action: action.to_string(),
                reason,
            })?;
        }
        Ok(())
    }

    /// Resolve the active theme: user themes first, then presets, then the default
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = self
            .themes
            .get(&self.current_theme)
            .cloned()
            .or_else(|| Theme::get_preset_themes().remove(&self.current_theme))
            .unwrap_or_default();

        if theme.highlight_fg.is_empty() {
            let contrast = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&contrast);
        }

        theme
    }
}

impl KeyBindings {
    pub fn entries(&self) -> [(&'static str, &str); 12] {
        [
            ("quit", self.quit.as_str()),
            ("reveal", self.reveal.as_str()),
            ("recalled", self.recalled.as_str()),
            ("forgot", self.forgot.as_str()),
            ("new", self.new.as_str()),
            ("delete", self.delete.as_str()),
            ("save", self.save.as_str()),
            ("help", self.help.as_str()),
            ("tab_left", self.tab_left.as_str()),
            ("tab_right", self.tab_right.as_str()),
            ("list_up", self.list_up.as_str()),
            ("list_down", self.list_down.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            current_user = "ada"

            [key_bindings]
            recalled = "r"
            "#,
        )
        .unwrap();

        assert_eq!(config.current_user, "ada");
        assert_eq!(config.key_bindings.recalled, "r");
        assert_eq!(config.key_bindings.forgot, "n");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.config_version, Some(CURRENT_CONFIG_VERSION));
    }

    #[test]
    fn default_bindings_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn bad_binding_is_reported_with_its_action() {
        let mut config = Config::default();
        config.key_bindings.reveal = "Hyper+x".to_string();
        match config.validate() {
            Err(ConfigError::KeyBindingError { action, .. }) => assert_eq!(action, "reveal"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_created_then_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let mut created = Config::load_from_path(&path).unwrap();
        assert!(path.exists());

        created.current_user = "bo".to_string();
        created.save_to_path(&path).unwrap();

        let reloaded = Config::load_from_path(&path).unwrap();
        assert_eq!(reloaded.current_user, "bo");
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let mut config = Config::default();
        config.current_theme = "nope".to_string();
        let theme = config.get_active_theme();
        assert_eq!(theme.fg, "white");
        assert_eq!(theme.highlight_fg, "white");
    }

    #[test]
    fn user_theme_wins_over_preset() {
        let mut config = Config::default();
        config.current_theme = "light".to_string();
        config.themes.insert("light".to_string(), Theme::preset("red", "black", "yellow", "green"));
        let theme = config.get_active_theme();
        assert_eq!(theme.fg, "red");
        assert_eq!(theme.highlight_fg, "black");
    }

    #[test]
    fn log_file_lives_beside_database() {
        let mut config = Config::default();
        config.database_path = "/tmp/recall/cards.db".to_string();
        assert_eq!(config.get_log_path(), PathBuf::from("/tmp/recall/recall.log"));
    }

    #[test]
    fn configured_database_path_is_kept() {
        let config: Config = toml::from_str(r#"database_path = "/srv/decks/ada.db""#).unwrap();
        let config = config.with_profile_defaults(utils::Profile::Dev);
        assert_eq!(config.get_database_path(), PathBuf::from("/srv/decks/ada.db"));
    }

    #[test]
    fn missing_database_path_follows_the_profile() {
        let config: Config = toml::from_str("current_user = \"ada\"").unwrap();
        assert!(config.database_path.is_empty());

        let dev = config.clone().with_profile_defaults(utils::Profile::Dev);
        let prod = config.with_profile_defaults(utils::Profile::Prod);
        assert!(dev.database_path.ends_with("cards.db"));
        assert!(dev.database_path.contains("recall-dev"));
        assert_ne!(dev.database_path, prod.database_path);
    }

    #[test]
    fn default_file_leaves_database_path_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::load_from_path(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("database_path"));
    }
}
