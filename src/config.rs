/// Application configuration.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

impl Credentials {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory holding the task files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Login credentials gating mutating actions.
    #[serde(default)]
    pub auth: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            data_dir: default_data_dir(),
            auth: Credentials::default(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_data_dir() -> PathBuf {
    home_dir().join(".taskdeck").join("tasks")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Config file location.
/// Override with TASKDECK_CONFIG; default is ~/.config/taskdeck/config.toml
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("TASKDECK_CONFIG") {
        return PathBuf::from(path);
    }
    home_dir().join(".config").join("taskdeck").join("config.toml")
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;

    Ok(())
}

/// Update the bind address.
pub fn set_bind(bind: String) -> Result<()> {
    let mut config = load_config()?;
    config.bind = bind;
    save_config(&config)?;
    println!("✓ bind address set to: {}", config.bind);
    Ok(())
}

/// Update the data directory.
pub fn set_data_dir(data_dir: String) -> Result<()> {
    let mut config = load_config()?;
    config.data_dir = PathBuf::from(data_dir);
    save_config(&config)?;
    println!("✓ data directory set to: {}", config.data_dir.display());
    Ok(())
}

/// Print the current configuration.
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    println!("Current configuration:");
    println!("  bind:      {}", config.bind);
    println!("  data dir:  {}", config.data_dir.display());
    println!("  username:  {}", config.auth.username);
    println!();
    println!("Config file: {}", config_path().display());
    Ok(())
}
