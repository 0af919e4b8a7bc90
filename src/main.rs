use clap::Parser;
use kinotake::cli::{self, Cli, Commands};
use kinotake::config::{AppConfig, LoggingConfig};
use std::path::Path;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = AppConfig::load_validated(&cli.config)?;
    let _guard = init_logging(&cfg.logging);
    debug!(config_dir = %cli.config.display(), "configuration loaded");

    match &cli.command {
        Commands::Classify {
            values,
            scores,
            json,
        } => cli::classify_frame(&cfg, values, *scores, *json)?,
        Commands::Stream { scores, json } => cli::stream_stdin(&cfg, *scores, *json).await?,
        Commands::Evaluate { path, json } => cli::evaluate_capture(&cfg, path, *json)?,
        Commands::Params { json } => cli::show_params(&cfg, *json)?,
    }

    Ok(())
}

/// Console logging on stderr (stdout carries results), plus a daily-rotated
/// file when `logging.dir` is set. `RUST_LOG` overrides the configured level.
fn init_logging(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.level.to_ascii_lowercase()));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);
    if cfg.json {
        layers.push(console.json().boxed());
    } else {
        layers.push(console.boxed());
    }

    let mut guard = None;
    if let Some(log_dir) = &cfg.dir {
        if let Some(file_appender) = open_log_file(log_dir) {
            let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
            guard = Some(file_guard);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .boxed(),
            );
        }
    }

    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();

    guard
}

/// Daily-rotated `kinotake.log` under `log_dir`, or `None` (console only) when
/// the directory cannot be created or written.
fn open_log_file(log_dir: &Path) -> Option<RollingFileAppender> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!(
            "Warning: Could not create log directory {} ({}), file logging disabled",
            log_dir.display(),
            e
        );
        return None;
    }

    match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("kinotake.log")
        .build(log_dir)
    {
        Ok(appender) => Some(appender),
        Err(e) => {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                log_dir.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_opens_in_writable_directory() {
        let dir = std::env::temp_dir().join(format!("kinotake_logs_{}", std::process::id()));
        assert!(open_log_file(&dir).is_some());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn log_dir_blocked_by_file_disables_file_logging() {
        let blocker =
            std::env::temp_dir().join(format!("kinotake_blocker_{}", std::process::id()));
        std::fs::write(&blocker, b"not a directory").unwrap();
        assert!(open_log_file(&blocker.join("logs")).is_none());
        std::fs::remove_file(&blocker).ok();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unwritable_existing_directory_disables_file_logging() {
        // Exists, so create_dir_all succeeds, but no file can be created in it.
        assert!(open_log_file(Path::new("/proc/self")).is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn init_logging_survives_unwritable_directory() {
        let cfg = LoggingConfig {
            dir: Some("/proc/self".into()),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&cfg).is_none());
    }
}
