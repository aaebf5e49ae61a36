use std::net::SocketAddr;

use snafu::{Location, Snafu};

use crate::Located;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApplicationError {
    /// could not parse the configuration from the environment
    ConfigLoad {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// The log filter directive is malformed
    LogFilter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not configure the metrics recorder
    Metrics {
        source: metrics_exporter_prometheus::BuildError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not compile the page templates
    LoadTemplates {
        source: tera::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not bind to the given address, check if it's already in use
    BindAddress {
        address: SocketAddr,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not serve the application
    WebServer {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for ApplicationError {
    fn location(&self) -> Location {
        match self {
            ApplicationError::ConfigLoad { location, .. }
            | ApplicationError::LogFilter { location, .. }
            | ApplicationError::InitializeLogger { location, .. }
            | ApplicationError::Metrics { location, .. }
            | ApplicationError::LoadTemplates { location, .. }
            | ApplicationError::BindAddress { location, .. }
            | ApplicationError::WebServer { location, .. } => *location,
        }
    }
}
