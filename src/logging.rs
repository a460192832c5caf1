use anyhow::Result;
use camino::Utf8Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(anyhow::anyhow!(
                "Invalid log level '{}'. Valid options are: error, warn, info, debug, trace",
                s
            )),
        }
    }
}

/// Initialize the process-wide tracing subscriber: human-readable lines on
/// stderr, plus JSON lines appended to `log_file` when one is given.
pub fn init(level: LogLevel, log_file: Option<&Utf8Path>) -> Result<()> {
    let filter = EnvFilter::new(level.as_str());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_level(true)
        .boxed();

    match log_file {
        None => {
            tracing_subscriber::registry().with(filter).with(stderr_layer).init();
        }
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Utf8Path::new("."));
            let name = path.file_name().unwrap_or("dupescan.log");
            let file_appender = tracing_appender::rolling::never(dir.as_std_path(), name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = tracing_subscriber::fmt::layer().json().with_writer(non_blocking).boxed();

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();

            // Keep the appender guard alive for the lifetime of the process.
            std::mem::forget(guard);
        }
    }

    Ok(())
}
