use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "PKGMENU_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub manager: ManagerConfig,
    pub commands: CommandsConfig,
    pub colors: ColorsConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 0 disables the timeout.
    pub command_timeout_secs: u64,
    pub status_message_secs: u64,
    pub tick_rate_ms: u64,
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            command_timeout_secs: 600,
            status_message_secs: 3,
            tick_rate_ms: 250,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub program: String,
    pub base_args: Vec<String>,
    pub version_args: Vec<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            program: "python3".to_string(),
            base_args: strings(&["-m", "pip"]),
            version_args: strings(&["--version"]),
        }
    }
}

/// Argv templates appended after `manager.base_args`.
///
/// Tokens may contain `{package}`, `{version}` or `{query}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub list: Vec<String>,
    /// Installed packages with a newer release. Only feeds the package picker.
    pub outdated: Vec<String>,
    pub upgrade: Vec<String>,
    pub downgrade: Vec<String>,
    pub uninstall: Vec<String>,
    pub search: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        CommandsConfig {
            list: strings(&["list"]),
            outdated: strings(&["list", "--outdated"]),
            upgrade: strings(&["install", "--upgrade", "{package}"]),
            downgrade: strings(&["install", "{package}=={version}"]),
            uninstall: strings(&["uninstall", "-y", "{package}"]),
            search: strings(&["index", "versions", "{query}"]),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub theme: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub help: String,
    pub cycle_theme: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            help: "?".to_string(),
            cycle_theme: "t".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Parses a keybind string such as `"q"`, `"Enter"` or `"F1"`.
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        other => other
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=12).contains(n))
            .map(KeyCode::F),
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|p| p.join("pkgmenu").join("config.toml"))
}

/// Loads the user config, or defaults when no file exists.
pub fn load_config() -> Result<Config, ConfigError> {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Ok(Config::default()),
    }
}

pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
