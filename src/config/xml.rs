//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Creates a secure template at the default location when none exists.
//!
//! Unknown XML fields are rejected so typos surface instead of being ignored.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{
    CONFIG_ENV, default_config_path, default_log_path, default_store_root,
    path_has_symlink_ancestor,
};
use super::types::{Config, LogLevel};
use crate::engine::DEFAULT_CONCURRENCY;
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};
use crate::store::MAX_PAGE_SIZE;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    store_root: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_usize_trimmed_opt")]
    concurrency: Option<usize>,
    #[serde(default, deserialize_with = "de_usize_trimmed_opt")]
    page_size: Option<usize>,
}

// Numbers in hand-edited XML often carry surrounding whitespace.
fn de_usize_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<usize>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number '{s}': {e}"))),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();
    if let Some(root) = non_empty(parsed.store_root.as_deref()) {
        cfg.store_root = PathBuf::from(root);
    }
    if let Some(lvl) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = lvl
            .parse::<LogLevel>()
            .map_err(anyhow::Error::msg)?;
    }
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);
    if let Some(n) = parsed.concurrency {
        cfg.concurrency = n;
    }
    if let Some(n) = parsed.page_size {
        cfg.page_size = n;
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in '{}'", path.display()))
}

/// Outcome of locating and loading the config file.
#[derive(Debug)]
pub enum LoadResult {
    /// Config parsed from the file at this path.
    Loaded(Config, PathBuf),
    /// No file existed at the default location; a template was written there.
    CreatedTemplate(PathBuf),
}

/// Load config from `explicit` (the `--config` flag), `KEYMOVE_CONFIG`, or the
/// default path. A missing explicit/env file is an error; a missing default file
/// gets a template.
pub fn load_or_init(explicit: Option<&Path>) -> Result<LoadResult> {
    let user_chosen = explicit.is_some() || env::var_os(CONFIG_ENV).is_some();
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if path.exists() {
        let cfg = load_config_from_xml_path(&path)?;
        return Ok(LoadResult::Loaded(cfg, path));
    }
    if user_chosen {
        bail!("config file not found: {}", path.display());
    }
    create_template_config(&path)?;
    Ok(LoadResult::CreatedTemplate(path))
}

/// Write the default template config file (0600, parent 0700, atomic).
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/keymove.log".into());

    let content = format!(
        "<!--\n  keymove configuration (XML)\n\n    store_root   -> directory served as the bucket\n    log_level    -> quiet | normal | info | debug\n    log_file     -> path to log file (optional; leave empty for stdout only)\n    concurrency  -> parallel copies/deletes per phase\n    page_size    -> keys per listing page (1-{max})\n\n  CLI flags override XML values.\n-->\n<config>\n  <store_root>{root}</store_root>\n  <log_level>normal</log_level>\n  <log_file>{log}</log_file>\n  <concurrency>{conc}</concurrency>\n  <page_size>{max}</page_size>\n</config>\n",
        root = default_store_root().display(),
        log = suggested_log,
        conc = DEFAULT_CONCURRENCY,
        max = MAX_PAGE_SIZE,
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!("Created template config at {}", path.display());
    Ok(())
}
