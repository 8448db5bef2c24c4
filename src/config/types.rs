//! Runtime settings and the user-facing log level.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

use super::paths;
use crate::engine::DEFAULT_CONCURRENCY;
use crate::store::MAX_PAGE_SIZE;

/// Console verbosity as users spell it in config and flags.
/// Each level is one step noisier than the tracing level of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only.
    Quiet,
    /// Phase starts, summaries, failures.
    #[default]
    Normal,
    /// Adds classification, plan and paging detail.
    Info,
    /// Adds one line per store call.
    Debug,
}

impl LogLevel {
    const NAMES: [(&'static str, LogLevel); 9] = [
        ("quiet", LogLevel::Quiet),
        ("error", LogLevel::Quiet),
        ("none", LogLevel::Quiet),
        ("normal", LogLevel::Normal),
        ("info", LogLevel::Info),
        ("verbose", LogLevel::Info),
        ("detailed", LogLevel::Info),
        ("debug", LogLevel::Debug),
        ("trace", LogLevel::Debug),
    ];

    /// Case-insensitive lookup, surrounding whitespace ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, lvl)| *lvl)
    }

    /// Tracing filter that realizes this level.
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::ERROR,
            LogLevel::Normal => LevelFilter::INFO,
            LogLevel::Info => LevelFilter::DEBUG,
            LogLevel::Debug => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("invalid log level: '{s}' (expected quiet, normal, info or debug)")
        })
    }
}

/// Runtime configuration for the CLI and the engine it builds.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory served as the bucket by the local store
    pub store_root: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Parallel store calls per migration phase
    pub concurrency: usize,
    /// Keys requested per listing page
    pub page_size: usize,
    /// Print the migration plan without executing it
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_root: paths::default_store_root(),
            log_level: LogLevel::Normal,
            log_file: None,
            concurrency: DEFAULT_CONCURRENCY,
            page_size: MAX_PAGE_SIZE,
            dry_run: false,
        }
    }
}

impl Config {
    /// Config rooted at `store_root`; other fields use defaults.
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
            ..Default::default()
        }
    }
}
