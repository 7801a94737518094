//! Logging setup for hosts embedding the library.
//!
//! The library only emits `tracing` events. Hosts that want the plain
//! single-line output (`WARNING: ...` for warnings) install one of these
//! subscribers.

use crate::Result;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const WARNING_PREFIX: &str = "WARNING: ";

/// One human-readable line per event, warnings and errors prefixed
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFormat;

impl<S, N> FormatEvent<S, N> for HostFormat
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
        if *event.metadata().level() <= Level::WARN {
            writer.write_str(WARNING_PREFIX)?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("simple_backup=debug")
        } else {
            EnvFilter::new("simple_backup=info")
        }
    })
}

/// Log to stderr
pub fn init_logging(verbose: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .event_format(HostFormat)
        .init();

    Ok(())
}

/// Append log lines to `log_file`
pub fn init_file_logging(log_file: &Path, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .event_format(HostFormat)
        .init();

    Ok(())
}
