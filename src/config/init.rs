use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};

const HEADER: &str = "\
# oppscore configuration
#
# default_symbol / default_period: used when `oppscore analyze` gets no arguments
# request_timeout: upper bound for one analysis (humantime, e.g. 20s)
# cache_ttl: how long fetched market data is reused (humantime, 0s disables reuse)
# scoring.sectors: growth multipliers, merged over the built-in table
";

/// Write the default configuration to `path` (default ~/.config/oppscore/config.yaml).
///
/// Refuses to replace an existing file unless `force` is set. Returns the
/// path that was written.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let yaml = serde_saphyr::to_string(&Config::template())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    write_atomically(&config_path, &format!("{}\n{}", HEADER, yaml))?;
    Ok(config_path)
}

fn write_atomically(config_path: &Path, contents: &str) -> Result<()> {
    // Create parent directories
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(config_path)
        .with_context(|| format!("Failed to open atomic write file at {}", config_path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    file.commit().context("Failed to save config")?;

    Ok(())
}
