use clap::Parser;
use std::path::PathBuf;

use keymove::TypeHint;
use keymove::cli::{Args, Command};
use keymove::config::types::{Config, LogLevel};

#[test]
fn rename_with_type_hint_and_flags() {
    let args = Args::parse_from([
        "keymove",
        "rename",
        "photos/2023",
        "archive/photos/2023",
        "--type",
        "folder",
        "--dry-run",
        "--concurrency",
        "4",
    ]);
    assert_eq!(
        args.command,
        Some(Command::Rename {
            old: "photos/2023".into(),
            new: "archive/photos/2023".into(),
            type_hint: Some(TypeHint::Folder),
            dry_run: true,
            concurrency: Some(4),
        })
    );
}

#[test]
fn invalid_type_hint_is_rejected() {
    let res = Args::try_parse_from(["keymove", "rename", "a", "b", "--type", "bucket"]);
    assert!(res.is_err());
}

#[test]
fn type_hint_parsing_is_case_insensitive() {
    assert_eq!("File".parse::<TypeHint>().unwrap(), TypeHint::File);
    assert_eq!(" FOLDER ".parse::<TypeHint>().unwrap(), TypeHint::Folder);
    assert!("dir".parse::<TypeHint>().is_err());
}

#[test]
fn ls_prefix_defaults_to_everything() {
    let args = Args::parse_from(["keymove", "ls"]);
    assert_eq!(
        args.command,
        Some(Command::Ls {
            prefix: String::new()
        })
    );
}

#[test]
fn rm_takes_one_key() {
    let args = Args::parse_from(["keymove", "rm", "docs/old.pdf"]);
    assert_eq!(
        args.command,
        Some(Command::Rm {
            key: "docs/old.pdf".into()
        })
    );
    assert!(Args::try_parse_from(["keymove", "rm"]).is_err());
}

#[test]
fn effective_log_level_precedence() {
    let args = Args::parse_from(["keymove", "--debug", "--log-level", "quiet", "ls"]);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));

    let args = Args::parse_from(["keymove", "ls", "--log-level", "info"]);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Info));

    let args = Args::parse_from(["keymove", "ls"]);
    assert_eq!(args.effective_log_level(), None);
}

#[test]
fn apply_overrides_sets_flags() {
    let args = Args::parse_from([
        "keymove",
        "--store-root",
        "/bucket",
        "--log-level",
        "quiet",
        "rename",
        "a",
        "b",
        "--dry-run",
        "--concurrency",
        "2",
    ]);
    let mut cfg = Config::default();
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.store_root, PathBuf::from("/bucket"));
    assert_eq!(cfg.log_level, LogLevel::Quiet);
    assert!(cfg.dry_run);
    assert_eq!(cfg.concurrency, 2);
}

#[test]
fn apply_overrides_leaves_unset_values_alone() {
    let args = Args::parse_from(["keymove", "cleanup", "a", "b"]);
    let mut cfg = Config::new("/from/xml");
    cfg.concurrency = 7;
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.store_root, PathBuf::from("/from/xml"));
    assert_eq!(cfg.concurrency, 7);
    assert!(!cfg.dry_run);
}
