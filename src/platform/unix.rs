//! Unix file helpers: private log files, private config templates, POSIX modes.

use anyhow::{Context, Result, bail};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use super::temp::tmp_sibling_name;

const PRIVATE_FILE: u32 = 0o600;
const PRIVATE_DIR: u32 = 0o700;

/// Append handle for the log file. Only a file created here is forced to 0600;
/// an existing file keeps the mode an administrator chose for it.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let created = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(PRIVATE_FILE)
        .open(path)?;
    if created {
        // Pin the mode regardless of umask.
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(PRIVATE_FILE));
    }
    Ok(file)
}

/// Write a config file that must not exist yet. The bytes go to a 0600 temp
/// sibling first, which is synced and renamed into place; the parent directory
/// is synced afterwards so the new entry survives a crash.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    let Some(parent) = path.parent() else {
        bail!("config path has no parent: {}", path.display());
    };
    fs::create_dir_all(parent).with_context(|| format!("create '{}'", parent.display()))?;

    let tmp = tmp_sibling_name(path, "config");
    let written = write_synced(&tmp, contents).and_then(|()| {
        fs::rename(&tmp, path)
            .with_context(|| format!("move '{}' into place", tmp.display()))
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    File::open(parent)
        .and_then(|dir| dir.sync_all())
        .with_context(|| format!("sync directory '{}'", parent.display()))
}

fn write_synced(path: &Path, contents: &[u8]) -> Result<()> {
    let mut f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(PRIVATE_FILE)
        .open(path)
        .with_context(|| format!("create '{}'", path.display()))?;
    f.write_all(contents).context("write config")?;
    f.sync_all().context("sync config")?;
    Ok(())
}

pub fn set_dir_mode_0700(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(PRIVATE_DIR))
}

pub fn set_file_mode_0600(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(PRIVATE_FILE))
}
