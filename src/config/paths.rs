//! Default path helpers and symlink checks.

use anyhow::{Result, anyhow};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "KEYMOVE_CONFIG";

/// Config file path: `KEYMOVE_CONFIG` if set (relative values resolve against
/// the current directory), else `<config dir>/keymove/config.xml`.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        let p = PathBuf::from(p);
        if p.is_absolute() {
            return Ok(p);
        }
        return Ok(env::current_dir()?.join(p));
    }
    if let Some(mut base) = config_dir() {
        base.push("keymove");
        base.push("config.xml");
        return Ok(base);
    }
    env::var("HOME")
        .map(|h| PathBuf::from(h).join(".config").join("keymove").join("config.xml"))
        .map_err(|_| anyhow!("cannot determine a config directory (no config dir and no HOME)"))
}

/// Default log file under the OS data directory.
pub fn default_log_path() -> Result<PathBuf> {
    let base = data_dir()
        .map(|d| d.join("keymove"))
        .or_else(|| {
            env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local").join("share").join("keymove"))
        })
        .ok_or_else(|| anyhow!("cannot determine a data directory for the log file"))?;
    Ok(base.join("keymove.log"))
}

/// Default bucket directory for the local store.
pub fn default_store_root() -> PathBuf {
    data_dir()
        .map(|d| d.join("keymove").join("store"))
        .unwrap_or_else(|| PathBuf::from("keymove-store"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
