// src/logging.rs
// =============================================================================
// Logging setup.
//
// Two destinations:
// - The error log: an append-only file that receives ERROR events only, one
//   line each, formatted as "<timestamp> [ERROR] <message>"
// - The console (stderr): off unless --verbose or RUST_LOG asks for it, so
//   errors stay out of the terminal by default
//
// Crawl progress and the final summary are not log events; main.rs and the
// engine print those to stdout directly.
// =============================================================================

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Formats events as "<timestamp> [<LEVEL>] <message>".
pub struct ErrorLineFormat;

impl<S, N> FormatEvent<S, N> for ErrorLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} [{}] ",
            Local::now().format(TIMESTAMP_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Installs the global subscriber.
///
/// If the error log cannot be opened the crawl still runs; the problem is
/// reported on stderr and only the console layer is installed.
pub fn init(error_log: &Path, verbose: bool) {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("off")
        }
    });
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let error_file = match open_append(error_log) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .event_format(ErrorLineFormat)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::ERROR),
        ),
        Err(e) => {
            eprintln!("Warning: {:#}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console)
        .with(error_file)
        .init();
}

/// Collects formatted error-log lines in memory.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct Capture(std::sync::Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Capture {
    /// Routes this thread's ERROR events here, formatted like the error log.
    pub fn error_log(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(ErrorLineFormat)
                .with_ansi(false)
                .with_writer(self.clone())
                .with_filter(LevelFilter::ERROR),
        );
        tracing::subscriber::set_default(subscriber)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// The captured messages with timestamp and level stripped.
    pub fn error_messages(&self) -> Vec<String> {
        self.text()
            .lines()
            .filter_map(|line| line.split_once(" [ERROR] "))
            .map(|(_, message)| message.to_string())
            .collect()
    }
}

#[cfg(test)]
impl std::io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_error_line_format() {
        let capture = Capture::default();

        {
            let _guard = capture.error_log();
            tracing::warn!("not an error");
            tracing::error!("Failed to fetch {}: {}", "https://example.com/", "HTTP 500");
        }

        let output = capture.text();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);

        // "2026-01-02 03:04:05,678 [ERROR] message"
        let (timestamp, rest) = lines[0].split_at(23);
        let (seconds, millis) = timestamp.split_at(19);
        assert!(chrono::NaiveDateTime::parse_from_str(seconds, "%Y-%m-%d %H:%M:%S").is_ok());
        assert!(millis.starts_with(','));
        assert!(millis[1..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest, " [ERROR] Failed to fetch https://example.com/: HTTP 500");
        assert_eq!(
            capture.error_messages(),
            vec!["Failed to fetch https://example.com/: HTTP 500".to_string()]
        );
    }

    #[test]
    fn test_open_append_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        std::fs::write(&path, "old line\n").unwrap();

        let mut file = open_append(&path).unwrap();
        writeln!(file, "new line").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old line\nnew line\n");
    }
}
