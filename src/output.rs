//! User-facing terminal output: colored status prefixes (TTY only) and the
//! reports printed for plans, renames, failures and folder listings.

use owo_colors::OwoColorize;

use crate::browse::{FolderView, file_label, human_size};
use crate::content_type;
use crate::engine::{MigrationPlan, MigrationResult, ReconcileReport};
use crate::errors::RenameError;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// Plain line with no prefix, for output users may script against.
pub fn print_user(msg: &str) {
    println!("{msg}");
}

/// Dry-run report: every pair the rename would move.
pub fn print_plan(plan: &MigrationPlan) {
    print_info(&format!(
        "Dry-run: would rename {} '{}' -> '{}' ({} objects)",
        plan.kind(),
        plan.from(),
        plan.to(),
        plan.len()
    ));
    for pair in plan.pairs() {
        print_user(&format!("  {pair}"));
    }
}

pub fn print_result(result: &MigrationResult) {
    print_success(&result.summary());
}

/// Moved/pending counts and every failed pair, plus what to do next.
pub fn print_rename_failure(err: &RenameError) {
    match err {
        RenameError::CopyFailed { copied, total, .. } => {
            print_warn(&format!(
                "{copied} of {total} copies succeeded; no source was deleted. Re-run the rename."
            ));
        }
        RenameError::PartialMigration { moved, total, .. } => {
            print_warn(&format!(
                "{moved} of {total} objects moved; the pairs below exist at both keys. \
                 Run `keymove cleanup OLD NEW` instead of repeating the rename."
            ));
        }
        RenameError::Cancelled { copied, total } => {
            print_warn(&format!(
                "cancelled after {copied} of {total} copies; no source was deleted."
            ));
        }
        _ => return,
    }
    for failure in err.failures() {
        print_user(&format!("  {failure}"));
    }
}

pub fn print_reconcile(report: &ReconcileReport) {
    print_success(&format!("cleaned up {} source objects", report.cleaned));
    if !report.pending.is_empty() {
        print_warn(&format!(
            "{} sources have no copy at the new key and were kept:",
            report.pending.len()
        ));
        for pair in &report.pending {
            print_user(&format!("  {pair}"));
        }
    }
    if !report.diverged.is_empty() {
        print_warn(&format!(
            "{} destinations differ from their source; both copies were kept:",
            report.diverged.len()
        ));
        for pair in &report.diverged {
            print_user(&format!("  {pair}"));
        }
    }
}

/// Folder-grouped listing with size and content type per file.
pub fn print_folder_view(view: &FolderView) {
    if view.is_empty() {
        print_info("no objects");
        return;
    }
    let line = |e: &crate::store::ObjectEntry| {
        format!(
            "  {:<40} {:>10}  {}",
            file_label(&e.key),
            e.size.map(human_size).unwrap_or_else(|| "-".into()),
            content_type::resolve(e.content_type.as_deref(), &e.key)
        )
    };
    if !view.root_files.is_empty() {
        print_user(&format!("/ ({} files)", view.root_files.len()));
        for e in &view.root_files {
            print_user(&line(e));
        }
    }
    for (folder, files) in &view.folders {
        print_user(&format!("{folder}/ ({} files)", files.len()));
        for e in files {
            print_user(&line(e));
        }
    }
    print_user(&format!(
        "{} files, {} folders, {}",
        view.total_files(),
        view.folders.len(),
        human_size(view.total_bytes())
    ));
}
