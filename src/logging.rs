/// File logging.
///
/// The terminal belongs to the games, so events go to a plain-text file
/// (`[general] log_path`). `RUST_LOG` overrides `[general] log_level`.
/// Any setup failure leaves logging off; the games run either way.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::GameConfig;

/// Keep the returned guard alive for the life of the process; dropping it
/// flushes pending lines.
pub fn init(config: &GameConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (dir, file) = split_log_path(&config.log_path)?;
    if fs::create_dir_all(&dir).is_err() {
        return None;
    }
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file)
        .build(&dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .with(filter)
        .try_init()
        .ok()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "termarcade starting");
    Some(guard)
}

fn split_log_path(path: &Path) -> Option<(std::path::PathBuf, String)> {
    let file = path.file_name()?.to_string_lossy().into_owned();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    Some((dir, file))
}
