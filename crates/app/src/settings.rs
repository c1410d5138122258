use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tally_core::{CategoryRule, Config};

pub const CONFIG_FILE: &str = "tally.toml";

/// Per-user config location, e.g. `~/.config/tally/tally.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "tally", "tally").map(|d| d.config_dir().join(CONFIG_FILE))
}

/// Load the configuration.
///
/// An explicit path must exist. Otherwise `./tally.toml` is tried, then the
/// per-user file, then built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read(path);
    }
    let candidates = std::iter::once(PathBuf::from(CONFIG_FILE)).chain(user_config_path());
    for path in candidates {
        if path.is_file() {
            return read(&path);
        }
    }
    tracing::debug!("no config file found, using defaults");
    Ok(Config::default())
}

fn read(path: &Path) -> Result<Config> {
    let config = Config::load(path).with_context(|| format!("loading config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Default configuration plus a few example category rules.
pub fn starter_config() -> Config {
    let mut config = Config::default();
    config.categories = vec![
        CategoryRule::new("PAYROLL", "Income"),
        CategoryRule::new("AMAZON", "Shopping"),
        CategoryRule::new("SERVICE FEE", "Bank Fees"),
    ];
    config
}

/// Write the starter configuration to `path`. Never overwrites.
pub fn write_starter_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let text = starter_config().to_toml_string()?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
