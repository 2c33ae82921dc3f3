//! Logging Infrastructure
//!
//! Console logging by default; daily rolling files when a log directory is
//! configured.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_logger_with_file(log_level: &str, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bon_server={level},bon_printer={level},tower_http=info", level = log_level).into()
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // File output if the directory exists
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "bon-server");
            let subscriber = subscriber.with_writer(file_appender).with_ansi(false);
            if json {
                subscriber.json().init();
            } else {
                subscriber.init();
            }
            return;
        }
        eprintln!("Log directory {dir} does not exist, logging to stdout");
    }

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
