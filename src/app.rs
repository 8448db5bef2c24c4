//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the Ctrl-C handler,
//! opens the store, and dispatches the requested command to the engine.

use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use keymove::browse::FolderView;
use keymove::cli::{Args, Command};
use keymove::config::CONFIG_ENV;
use keymove::engine::list_all;
use keymove::output as out;
use keymove::{
    CancelToken, Config, EngineOptions, LoadResult, LocalStore, ObjectStore, RenameEngine,
    RenameError, default_config_path, load_or_init, shutdown,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    if args.print_config {
        return print_config_location(&args);
    }

    // Config before logging: a freshly written template ends the run.
    let mut cfg = match load_or_init(args.config.as_deref())? {
        LoadResult::Loaded(cfg, _) => cfg,
        LoadResult::CreatedTemplate(path) if args.store_root.is_none() => {
            out::print_success(&format!(
                "A template keymove config was written to: {}",
                path.display()
            ));
            out::print_info(
                "Edit `store_root` (and optionally `log_level`, `log_file`, `concurrency`, `page_size`), then re-run. \
                 To use a different file pass --config or set KEYMOVE_CONFIG.",
            );
            return Ok(());
        }
        LoadResult::CreatedTemplate(_) => Config::default(),
    };
    args.apply_overrides(&mut cfg);

    let Some(command) = args.command.clone() else {
        return Err(anyhow!("no command given; run `keymove --help`"));
    };

    // Held until the command returns so buffered file logs are flushed on exit.
    let guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)
        .context("initialize logging")?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || on_interrupt(&cancel)).context("install Ctrl-C handler")?;
    }

    debug!(?args, "starting keymove");

    let result = execute_command(&cfg, command, cancel);
    drop(guard);
    result
}

/// Ctrl-C: stop scheduling copies. The log writer stays alive so the
/// resulting `Cancelled` report still reaches the log file.
fn on_interrupt(cancel: &CancelToken) {
    shutdown::request();
    cancel.cancel();
    out::print_warn("Received interrupt; finishing in-flight copies, no deletes will start...");
}

fn execute_command(cfg: &Config, command: Command, cancel: CancelToken) -> Result<()> {
    if shutdown::is_requested() {
        return Ok(());
    }
    cfg.validate()?;
    let store: Arc<dyn ObjectStore> = Arc::new(
        LocalStore::open(&cfg.store_root)
            .with_context(|| format!("open store at '{}'", cfg.store_root.display()))?,
    );

    match command {
        Command::Ls { prefix } => {
            let entries = list_all(store.as_ref(), &prefix, cfg.page_size)
                .with_context(|| format!("list '{prefix}'"))?;
            out::print_folder_view(&FolderView::from_entries(entries));
            Ok(())
        }
        Command::Rename {
            old, new, type_hint, ..
        } => {
            let engine = build_engine(cfg, store, cancel)?;
            if cfg.dry_run {
                let plan = engine.plan(&old, &new, type_hint).map_err(log_failure)?;
                out::print_plan(&plan);
                return Ok(());
            }
            let result = engine.rename(&old, &new, type_hint).map_err(log_failure)?;
            info!(kind = %result.kind, from = %result.from, to = %result.to, moved = result.moved_count, "Rename completed");
            out::print_result(&result);
            Ok(())
        }
        Command::Cleanup { old, new } => {
            let engine = build_engine(cfg, store, cancel)?;
            let report = engine.reconcile(&old, &new).map_err(log_failure)?;
            out::print_reconcile(&report);
            Ok(())
        }
        Command::Rm { key } => {
            let engine = build_engine(cfg, store, cancel)?;
            engine.remove(&key).map_err(log_failure)?;
            out::print_success(&format!("Deleted: {key}"));
            Ok(())
        }
    }
}

fn build_engine(cfg: &Config, store: Arc<dyn ObjectStore>, cancel: CancelToken) -> Result<RenameEngine> {
    let engine = RenameEngine::new(store, EngineOptions::from(cfg))
        .context("start worker pool")?
        .with_cancel_token(cancel);
    Ok(engine)
}

/// Structured error log plus the user-facing failure report; passes the error through.
fn log_failure(e: RenameError) -> anyhow::Error {
    let code = e.code();
    let kind = e.kind();
    let pending = e.pending_count();
    let retryable = e.is_retryable();
    match &e {
        RenameError::CopyFailed { copied, total, failures } => {
            error!(code, kind, copied, total, failed = failures.len(), pending, retryable, "Rename failed; sources untouched")
        }
        RenameError::PartialMigration { moved, total, .. } => {
            error!(code, kind, moved, total, pending, retryable, "Rename left duplicates; cleanup required")
        }
        RenameError::Cancelled { copied, total } => {
            error!(code, kind, copied, total, pending, retryable, "Rename cancelled before deletes")
        }
        other => error!(code, kind, error = %other, "Rename failed"),
    }
    out::print_rename_failure(&e);
    e.into()
}

fn print_config_location(args: &Args) -> Result<()> {
    let (path, source): (PathBuf, &str) = match &args.config {
        Some(p) => (p.clone(), "--config"),
        None if std::env::var_os(CONFIG_ENV).is_some() => (default_config_path()?, CONFIG_ENV),
        None => (default_config_path()?, "default location"),
    };
    out::print_info(&format!("keymove config ({source}):\n  {}\n", path.display()));
    if path.exists() {
        out::print_info("A config file exists at that location.");
    } else {
        out::print_info("No config file exists there yet. Run any command to create a template.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_cancels_token_and_requests_shutdown() {
        let cancel = CancelToken::new();
        let engine_side = cancel.clone();

        on_interrupt(&cancel);

        assert!(engine_side.is_cancelled());
        assert!(shutdown::is_requested());
    }
}
