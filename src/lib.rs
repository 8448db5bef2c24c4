//! Core library for `keymove`.
//!
//! Presents a flat object store as folders and renames keys or whole folder
//! prefixes with a copy-then-delete migration that never deletes a source
//! before every copy of the same rename has succeeded.
//!
//! Layout:
//! - `store`: the `ObjectStore` capability plus in-memory and directory-backed stores.
//! - `engine`: classification, paged listing, plan building and the two-phase executor.
//! - `browse` / `content_type`: listing-view helpers.
//! - `config`, `cli`, `output`, `platform`, `shutdown`: the command-line shell around it.

pub mod browse;
pub mod cli;
pub mod config;
pub mod content_type;
pub mod engine;
pub mod errors;
pub mod output;
pub mod platform;
pub mod shutdown;
pub mod store;

pub use config::{
    Config, LoadResult, LogLevel, default_config_path, default_log_path,
    load_config_from_xml_path, load_or_init, path_has_symlink_ancestor,
};
pub use engine::{
    EngineOptions, MigrationPair, MigrationPlan, MigrationResult, ReconcileReport, RenameEngine,
    RenameTarget, TargetKind, TypeHint,
};
pub use errors::{PairFailure, RenameError};
pub use shutdown::CancelToken;
pub use store::{ListPage, LocalStore, MemoryStore, ObjectEntry, ObjectStore, StoreError};
