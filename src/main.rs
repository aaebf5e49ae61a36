use std::sync::Arc;

use dotenvy::dotenv;
use snafu::ResultExt as _;

use video_voter::api::{self, App};
use video_voter::config::{Config, MetricsExporter};
use video_voter::database::JsonFileStore;
use video_voter::error::{
    ApplicationError, BindAddressSnafu, LoadTemplatesSnafu, MetricsSnafu, WebServerSnafu,
};
use video_voter::logger;
use video_voter::service::instrumentation::{self, Metrics};
use video_voter::service::videos::{LikeDelay, Videos};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let _guard = logger::init(&config)?;

    let store = JsonFileStore::new(config.database_path.clone()).atomic(config.atomic_writes);
    let videos = Videos::new(Arc::new(store))
        .serialize_votes(config.serialize_votes)
        .with_like_delay(config.like_delay.then(LikeDelay::default));

    let metrics = match config.metrics_exporter {
        MetricsExporter::None => Metrics::disabled(),
        MetricsExporter::Console | MetricsExporter::Prometheus => {
            Metrics::prometheus(&config.service_name).context(MetricsSnafu)?
        }
    };

    if config.metrics_exporter == MetricsExporter::Console {
        instrumentation::spawn_console_exporter(
            metrics.clone(),
            config.metrics_export_interval,
            config.metrics_export_timeout,
        );
    }

    let templates = api::templates().context(LoadTemplatesSnafu)?;
    let app = App::new(videos, metrics, templates);
    let router = api::create_router(app, config.metrics_exporter == MetricsExporter::Prometheus);

    let address = config.host_address;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .context(BindAddressSnafu { address })?;

    tracing::info!(
        %address,
        store = %config.database_path.display(),
        exporter = ?config.metrics_exporter,
        "serving video voter"
    );

    axum::serve(listener, router).await.context(WebServerSnafu)
}
