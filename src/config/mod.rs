//! Configuration: types, default paths, XML loading and validation.
//!
//! Path precedence for the XML file: `--config` flag, then `KEYMOVE_CONFIG`,
//! then the OS config directory. CLI flags override whatever the file sets.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{
    CONFIG_ENV, default_config_path, default_log_path, default_store_root,
    path_has_symlink_ancestor,
};
pub use types::{Config, LogLevel};
pub use xml::{LoadResult, create_template_config, load_config_from_xml_path, load_or_init};
