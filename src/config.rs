use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_with::{serde_as, DurationMilliSeconds};
use snafu::ResultExt as _;

use crate::error::{ApplicationError, ConfigLoadSnafu};

pub const ENV_PREFIX: &str = "VOTER_";

#[serde_as]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_host_address")]
    pub host_address: SocketAddr,

    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Write through a temporary file and rename it over the store.
    #[serde(default)]
    pub atomic_writes: bool,
    /// Hold a process-wide lock for the whole read-modify-write of a vote.
    #[serde(default)]
    pub serialize_votes: bool,
    #[serde(default = "default_true")]
    pub like_delay: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub metrics_exporter: MetricsExporter,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_export_interval")]
    pub metrics_export_interval: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_export_timeout")]
    pub metrics_export_timeout: Duration,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricsExporter {
    /// Periodically log the snapshot.
    #[default]
    Console,
    /// Serve the snapshot on `/metrics`.
    Prometheus,
    None,
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<Config>()
            .context(ConfigLoadSnafu)
    }

    pub fn from_vars<I>(vars: I) -> Result<Config, ApplicationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Config>(vars)
            .context(ConfigLoadSnafu)
    }
}

fn default_host_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_database_path() -> PathBuf {
    PathBuf::from("db.json")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "video-voter".to_string()
}

fn default_export_interval() -> Duration {
    Duration::from_millis(15_000)
}

fn default_export_timeout() -> Duration {
    Duration::from_millis(5_000)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.host_address, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.database_path, PathBuf::from("db.json"));
        assert!(!config.atomic_writes);
        assert!(!config.serialize_votes);
        assert!(config.like_delay);
        assert_eq!(config.metrics_exporter, MetricsExporter::Console);
        assert_eq!(config.metrics_export_interval, Duration::from_secs(15));
        assert_eq!(config.metrics_export_timeout, Duration::from_secs(5));
        assert_eq!(config.service_name, "video-voter");
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = Config::from_vars(vars(&[
            ("VOTER_HOST_ADDRESS", "127.0.0.1:8080"),
            ("VOTER_DATABASE_PATH", "/srv/videos.json"),
            ("VOTER_SERIALIZE_VOTES", "true"),
            ("VOTER_LIKE_DELAY", "false"),
            ("VOTER_METRICS_EXPORTER", "prometheus"),
            ("VOTER_METRICS_EXPORT_INTERVAL", "250"),
            ("HOST_ADDRESS", "10.0.0.1:1"),
        ]))
        .unwrap();

        assert_eq!(config.host_address, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.database_path, PathBuf::from("/srv/videos.json"));
        assert!(config.serialize_votes);
        assert!(!config.like_delay);
        assert_eq!(config.metrics_exporter, MetricsExporter::Prometheus);
        assert_eq!(config.metrics_export_interval, Duration::from_millis(250));
    }

    #[test]
    fn rejects_unknown_exporter() {
        let result = Config::from_vars(vars(&[("VOTER_METRICS_EXPORTER", "statsd")]));
        assert!(matches!(result, Err(ApplicationError::ConfigLoad { .. })));
    }
}
