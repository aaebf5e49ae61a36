use std::result::Result;

use snafu::ResultExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{registry, EnvFilter};

use crate::config::Config;
use crate::error::{ApplicationError, InitializeLoggerSnafu, LogFilterSnafu};

/// Installs the global subscriber: pretty output on stdout and JSON lines in a daily rolling file.
///
/// The returned guard flushes the file writer when dropped and must outlive the application.
pub fn init(config: &Config) -> Result<WorkerGuard, ApplicationError> {
    let filter = EnvFilter::try_new(&config.log_filter).context(LogFilterSnafu {
        filter: config.log_filter.clone(),
    })?;

    let (file_layer, guard) = {
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "video-voter.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = layer().with_ansi(false).json().with_writer(non_blocking);

        (layer, guard)
    };

    let console_layer = layer().pretty().with_writer(std::io::stdout);

    let subscriber = registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber).context(InitializeLoggerSnafu)?;

    Ok(guard)
}
