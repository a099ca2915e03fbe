use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::types::AppConfig;
use crate::util::is_valid_date_format;

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$BUS_NOTIFY_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/bus-notify/config.toml`
/// 4. `~/.config/bus-notify/config.toml`
///
/// When nothing is found the built-in defaults are used.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    let config = match explicit_path.map(Path::to_path_buf).or_else(find_global_config) {
        Some(path) => read_config(&path)?,
        None => AppConfig::default(),
    };
    validate(&config)?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing TOML from {}", path.display()))
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.server.base_url.trim().is_empty() {
        bail!("server.base_url must not be empty");
    }
    if config.sync.poll_interval_secs == 0 {
        bail!("sync.poll_interval_secs must be at least 1");
    }
    if !is_valid_date_format(&config.defaults.date_format) {
        bail!(
            "defaults.date_format {:?} is not a valid strftime pattern",
            config.defaults.date_format
        );
    }
    Ok(())
}

fn find_global_config() -> Option<PathBuf> {
    // $BUS_NOTIFY_CONFIG
    if let Ok(path) = std::env::var("BUS_NOTIFY_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/bus-notify/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("bus-notify/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/bus-notify/config.toml
    if let Some(home) = dirs_fallback() {
        let p = home.join(".config/bus-notify/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

fn dirs_fallback() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
