use serial_test::serial;
use std::fs;
use tempfile::tempdir;

use keymove::config::CONFIG_ENV;
use keymove::{LoadResult, default_config_path, load_or_init};

#[test]
#[serial]
fn env_var_selects_the_config_file() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg = base.join("custom_config.xml");
    fs::write(
        &cfg,
        format!("<config><store_root>{}</store_root></config>", base.display()),
    )
    .unwrap();

    // Process-wide env; serialized against other env tests.
    unsafe {
        std::env::set_var(CONFIG_ENV, &cfg);
    }

    let resolved = default_config_path().expect("default_config_path");
    let loaded = load_or_init(None);

    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }

    assert_eq!(resolved, cfg);
    match loaded.unwrap() {
        LoadResult::Loaded(c, path) => {
            assert_eq!(path, cfg);
            assert_eq!(c.store_root, base);
        }
        other => panic!("expected Loaded, got {other:?}"),
    }
}

#[test]
#[serial]
fn env_var_pointing_at_missing_file_is_an_error() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("missing.xml");
    unsafe {
        std::env::set_var(CONFIG_ENV, &cfg);
    }
    let res = load_or_init(None);
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }
    assert!(res.is_err());
    assert!(!cfg.exists(), "no template should be written for an env-chosen path");
}
