//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to this
//! crate, tower-http and the `http_access` / `security` targets.

use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional JSON formatting and daily file output
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "billing_server={level},tower_http={level},http_access={level},security={level}"
        ))
    });

    let writer = match log_dir {
        Some(dir) if std::fs::create_dir_all(Path::new(dir)).is_ok() => {
            BoxMakeWriter::new(tracing_appender::rolling::daily(dir, "billing-server"))
        }
        _ => BoxMakeWriter::new(std::io::stdout),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .with_writer(writer);

    if json.unwrap_or(false) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
