//! Tracing initialization.
//! Builds a subscriber with EnvFilter, supports compact or JSON formats, and optional file logging.
//!
//! Behavior:
//! - Log level is driven by LogLevel (no RUST_LOG override here).
//! - If `log_file` is provided and passes safety checks, a non-blocking file layer is added.
//! - File logging is refused if any ancestor of the file path is a symlink.

use anyhow::Result;
use chrono::Local;
use keymove::output as out;
use keymove::platform::open_log_file_secure_append;
use keymove::{LogLevel, path_has_symlink_ancestor};
use std::fmt as stdfmt;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::{Json, JsonFields};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

fn env_filter_for(lvl: LogLevel) -> EnvFilter {
    EnvFilter::default().add_directive(lvl.filter().into())
}

/// Open a non-blocking writer for `path`, or explain on stderr why not.
fn maybe_open_non_blocking_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(true) => {
            eprintln!(
                "Refusing to enable file logging: ancestor of {} is a symlink; proceeding without file logging.",
                path.display()
            );
            return None;
        }
        Err(e) => {
            eprintln!(
                "Error checking log path {} for symlinks: {}; proceeding without file logging.",
                path.display(),
                e
            );
            return None;
        }
        Ok(false) => {}
    }

    match open_log_file_secure_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            None
        }
    }
}

type JsonLayer<S, W> = tsfmt::Layer<S, JsonFields, tsfmt::format::Format<Json, LocalHumanTime>, W>;

/// JSON event layer. Span fields must be recorded by `JsonFields` too, or the
/// formatter cannot embed them (`#[instrument]` spans would be unreadable).
fn json_layer<S, W>(writer: W) -> JsonLayer<S, W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    tsfmt::layer()
        .json()
        .with_timer(LocalHumanTime)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(writer)
}

/// Initialize tracing. Returns the file appender's guard when one was created;
/// it must be held until shutdown so buffered lines are flushed.
pub fn init_tracing(
    lvl: &LogLevel,
    log_file: Option<&Path>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    let env_filter = env_filter_for(*lvl);

    let file = match log_file {
        Some(path) => {
            let opened = maybe_open_non_blocking_writer(path);
            if opened.is_none() {
                out::print_warn(&format!(
                    "Requested file logging to '{}' was not enabled. Check that the parent directory is writable and that no ancestor is a symlink. Logs will continue to stdout.",
                    path.display()
                ));
            }
            opened
        }
        None => None,
    };
    let (file_writer, guard) = match file {
        Some((w, g)) => (Some(w), Some(g)),
        None => (None, None),
    };

    // Option<Layer> is itself a layer, so both branches share one registry shape.
    if json {
        let stdout_layer = json_layer(std::io::stdout);
        let file_layer = file_writer.map(json_layer);
        registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()?;
    } else {
        let stdout_layer = tsfmt::layer()
            .with_timer(LocalHumanTime)
            .with_target(true)
            .with_thread_ids(true)
            .compact();
        let file_layer = file_writer.map(|w| {
            tsfmt::layer()
                .with_timer(LocalHumanTime)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .compact()
                .with_writer(w)
        });
        registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()?;
    }
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keymove::{EngineOptions, MemoryStore, RenameEngine};
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_lines_carry_rename_span_fields() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = {
            let buf = buf.clone();
            move || Buffer(buf.clone())
        };
        let subscriber = registry()
            .with(env_filter_for(LogLevel::Normal))
            .with(json_layer(writer));

        let store = Arc::new(MemoryStore::new());
        store.put("in/a", "1");
        let engine = RenameEngine::new(store, EngineOptions::default()).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            engine.rename("in", "out", None).unwrap();
        });

        let out = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        let events: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).expect("every line is JSON"))
            .collect();
        let started = events
            .iter()
            .find(|e| e["fields"]["message"] == "copy phase started")
            .expect("copy phase event");
        assert_eq!(started["span"]["name"], "rename");
        assert!(
            started["span"]["old_key"].as_str().unwrap().contains("in"),
            "{started}"
        );
        assert_eq!(started["span"]["concurrency"], 16);
    }
}
