//! Config validation: store root usability and engine tunables.

use anyhow::{Context, Result, bail};
use std::fs;
use tracing::{debug, error, info};

use super::types::Config;
use crate::store::MAX_PAGE_SIZE;

impl Config {
    /// Create the store root if missing and check it is a readable directory;
    /// check `concurrency >= 1` and `1 <= page_size <= 1000`.
    pub fn validate(&self) -> Result<()> {
        let root = &self.store_root;
        if root.exists() {
            if !root.is_dir() {
                error!("store_root exists but isn't a directory: {}", root.display());
                bail!("store_root exists but isn't a directory: {}", root.display());
            }
        } else {
            fs::create_dir_all(root).with_context(|| {
                format!("Failed to create store_root directory '{}'", root.display())
            })?;
            info!("Created store_root directory: {}", root.display());
        }
        fs::read_dir(root).with_context(|| {
            format!("Cannot read store_root '{}'; check permissions", root.display())
        })?;
        debug!("store_root readable: {}", root.display());

        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            bail!(
                "page_size must be between 1 and {MAX_PAGE_SIZE} (got {})",
                self.page_size
            );
        }

        info!(
            "Config validated: store_root='{}' concurrency={} page_size={} log_file='{}'",
            root.display(),
            self.concurrency,
            self.page_size,
            self.log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into())
        );
        Ok(())
    }
}
