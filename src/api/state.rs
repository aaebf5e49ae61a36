use std::time::Instant;

use axum_template::engine::Engine;
use derive_new::new;
use snafu::ResultExt as _;
use tera::Tera;

use super::error::{ApiError, BlockingSnafu};
use crate::model::{Video, VideoId};
use crate::service::instrumentation::Metrics;
use crate::service::videos::{VideoError, Videos, Vote};

pub type Templates = Engine<Tera>;

/// Shared state handed to every handler.
#[derive(Clone, new)]
pub struct App {
    pub videos: Videos,
    pub metrics: Metrics,
    pub templates: Templates,
}

impl App {
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Runs a store operation on the blocking thread pool.
    pub async fn blocking<T, F>(&self, task: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Videos) -> Result<T, VideoError> + Send + 'static,
        T: Send + 'static,
    {
        let videos = self.videos.clone();
        let result = tokio::task::spawn_blocking(move || task(&videos))
            .await
            .context(BlockingSnafu)?;

        Ok(result?)
    }

    /// Fetches one video and records how long the lookup took.
    pub async fn video_details(&self, id: VideoId) -> Result<Video, ApiError> {
        let start = Instant::now();

        let lookup = id.clone();
        let video = self.blocking(move |videos| videos.get(&lookup)).await?;

        self.metrics.record_get_latency(&id, start.elapsed());

        Ok(video)
    }

    /// Counts the vote, then applies it to the store.
    pub async fn vote(&self, id: VideoId, vote: Vote) -> Result<(), ApiError> {
        self.metrics.record_vote(vote, &id);
        self.blocking(move |videos| videos.vote(&id, vote)).await
    }
}
