//! CLI definition and parsing.
//!
//! Notes:
//! - Global flags override values from the XML config.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::engine::TypeHint;

/// Rename files and folders in an object store without losing data on failure.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Rename files and folders in a flat object store")]
pub struct Args {
    /// Config file (overrides KEYMOVE_CONFIG and the default location).
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override the directory served as the bucket.
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub store_root: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the config file location keymove will use, then exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rename a file or a folder (every key under a prefix).
    Rename {
        /// Existing key or folder prefix.
        old: String,
        /// New key or folder prefix.
        new: String,
        /// Skip detection and treat OLD as a `file` or a `folder`.
        #[arg(long = "type", value_name = "file|folder")]
        type_hint: Option<TypeHint>,
        /// Show the migration plan without copying or deleting anything.
        #[arg(long)]
        dry_run: bool,
        /// Parallel store calls per phase.
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// List objects grouped by folder.
    Ls {
        /// Only keys starting with this prefix.
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Finish an interrupted folder or file rename by deleting sources already copied.
    Cleanup {
        old: String,
        new: String,
    },
    /// Delete a single object.
    Rm {
        /// Exact key of the object to delete.
        key: String,
    },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(root) = &self.store_root {
            cfg.store_root = root.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(Command::Rename {
            dry_run,
            concurrency,
            ..
        }) = &self.command
        {
            if *dry_run {
                cfg.dry_run = true;
            }
            if let Some(n) = concurrency {
                cfg.concurrency = *n;
            }
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
