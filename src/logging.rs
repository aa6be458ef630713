use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*, Layer};

use crate::config::Config;

/// Install file logging when `debug` is set.
///
/// The terminal belongs to the UI, so logs go to
/// `$XDG_DATA_HOME/u9s/u9s.log`. Without `debug` no subscriber is installed
/// and every `tracing` macro is a no-op. Keep the returned guard alive until
/// exit so buffered lines are flushed.
pub fn init(config: &Config) -> Result<Option<WorkerGuard>> {
  if !config.debug {
    return Ok(None);
  }

  let dir = log_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
    &dir, "u9s.log",
  ));

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("u9s=debug"));

  tracing_subscriber::registry()
    .with(event_layer(writer))
    .with(filter)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(Some(guard))
}

/// Plain text events tagged with the source file and line that logged them.
fn event_layer<S, W>(writer: W) -> impl Layer<S>
where
  S: Subscriber + for<'a> LookupSpan<'a>,
  W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
  fmt::layer()
    .with_writer(writer)
    .with_ansi(false)
    .with_file(true)
    .with_line_number(true)
}

fn log_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("u9s"))
}
