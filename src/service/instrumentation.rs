use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, with_local_recorder, Unit};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::instrument;

use super::videos::Vote;
use crate::model::VideoId;

pub const VIDEO_LIKES: &str = "video_likes";
pub const VIDEO_DISLIKES: &str = "video_dislikes";
pub const GET_VIDEO_LATENCY: &str = "get_video_video_latency_milliseconds";

/// Upper bounds, in milliseconds, of the lookup latency buckets.
pub const LATENCY_BUCKETS: &[f64] = &[
    1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0,
];

/// Metrics provider shared by every handler.
///
/// The recorder is owned by this value instead of being installed globally, so each [Metrics]
/// keeps its own series. A disabled provider accepts every call and records nothing.
#[derive(Clone, Default)]
pub struct Metrics {
    exporter: Option<Arc<Exporter>>,
}

struct Exporter {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Metrics {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Creates a provider that aggregates in the Prometheus format. `service_name` is attached to
    /// every series and the lookup latency is exported as a bucketed histogram.
    pub fn prometheus(service_name: &str) -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .add_global_label("service_name", service_name)
            .set_buckets_for_metric(Matcher::Full(GET_VIDEO_LATENCY.to_string()), LATENCY_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        with_local_recorder(&recorder, || {
            describe_counter!(VIDEO_LIKES, "Calls to the Like Endpoint");
            describe_counter!(VIDEO_DISLIKES, "Calls to the Dislike Endpoint");
            describe_histogram!(
                GET_VIDEO_LATENCY,
                Unit::Milliseconds,
                "Latency of Video information retrieval"
            );
        });

        Ok(Self {
            exporter: Some(Arc::new(Exporter { recorder, handle })),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.exporter.is_some()
    }

    pub fn record_vote(&self, vote: Vote, id: &VideoId) {
        let name = match vote {
            Vote::Like => VIDEO_LIKES,
            Vote::Dislike => VIDEO_DISLIKES,
        };

        self.record(|| counter!(name, "id" => id.to_string()).increment(1));
    }

    pub fn record_get_latency(&self, id: &VideoId, elapsed: Duration) {
        let millis = elapsed.as_secs_f64() * 1000.0;
        self.record(|| histogram!(GET_VIDEO_LATENCY, "id" => id.to_string()).record(millis));
    }

    /// Current snapshot in the Prometheus text format, `None` when disabled.
    pub fn render(&self) -> Option<String> {
        self.exporter.as_ref().map(|exporter| {
            exporter.handle.run_upkeep();
            exporter.handle.render()
        })
    }

    fn record(&self, f: impl FnOnce()) {
        if let Some(exporter) = &self.exporter {
            with_local_recorder(&exporter.recorder, f);
        }
    }
}

/// Periodically writes the metrics snapshot to the log.
///
/// A snapshot that takes longer than `timeout` to produce is dropped for that round.
pub fn spawn_console_exporter(metrics: Metrics, interval: Duration, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        tracing::info!(?interval, ?timeout, "console metrics exporter started");

        loop {
            ticker.tick().await;
            export(&metrics, timeout).await;
        }
    })
}

#[instrument(skip(metrics))]
async fn export(metrics: &Metrics, timeout: Duration) {
    let snapshot = tokio::task::spawn_blocking({
        let metrics = metrics.clone();
        move || metrics.render()
    });

    match tokio::time::timeout(timeout, snapshot).await {
        Ok(Ok(Some(snapshot))) => tracing::info!(target: "video_voter::metrics", "{}", snapshot),
        Ok(Ok(None)) => {}
        Ok(Err(error)) => tracing::error!(%error, "metrics export task failed"),
        Err(_) => tracing::warn!("metrics export timed out after {:?}", timeout),
    }
}
