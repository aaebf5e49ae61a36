use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use derive_new::new;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use snafu::{Location, ResultExt as _, Snafu};
use tracing::instrument;

use crate::database::{Store, StoreError};
use crate::model::{Video, VideoId};
use crate::Located;

pub type Result<T, E = VideoError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VideoError {
    #[snafu(display("video `{id}` does not exist"))]
    NotFound {
        id: VideoId,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("video store is unavailable: {source}"))]
    Storage {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for VideoError {
    fn location(&self) -> Location {
        match self {
            VideoError::NotFound { location, .. } | VideoError::Storage { location, .. } => {
                *location
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    /// Counters saturate at `u64::MAX` so a vote never lowers them.
    fn apply(self, video: &mut Video) {
        match self {
            Vote::Like => video.likes = video.likes.saturating_add(1),
            Vote::Dislike => video.dislikes = video.dislikes.saturating_add(1),
        }
    }
}

/// Artificial latency injected between reading and writing the store on a like.
///
/// The pause is the absolute value of a normal sample, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct LikeDelay {
    pub mean: f64,
    pub sigma: f64,
}

impl Default for LikeDelay {
    fn default() -> Self {
        Self {
            mean: 1.0,
            sigma: 0.5,
        }
    }
}

impl LikeDelay {
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let z: f64 = rng.sample(StandardNormal);
        Duration::from_secs_f64((self.mean + self.sigma * z).abs())
    }
}

/// Read-modify-write operations over a [Store].
///
/// Every call loads the full collection and a vote writes the full collection back. Unless
/// [Videos::serialize_votes] is enabled nothing coordinates concurrent votes, so two votes that
/// load the same state will lose one of the increments when the second one saves.
///
/// All methods block on the store.
#[derive(Debug, Clone)]
pub struct Videos {
    store: Arc<dyn Store>,
    vote_lock: Option<Arc<Mutex<()>>>,
    like_delay: Option<LikeDelay>,
}

impl Videos {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            vote_lock: None,
            like_delay: None,
        }
    }

    /// Serializes every vote in this process behind one mutex.
    pub fn serialize_votes(mut self, enabled: bool) -> Self {
        self.vote_lock = enabled.then(|| Arc::new(Mutex::new(())));
        self
    }

    pub fn with_like_delay(mut self, delay: Option<LikeDelay>) -> Self {
        self.like_delay = delay;
        self
    }

    /// Ids of every video whose title contains `title_filter`, ignoring case, in stored order.
    #[instrument(skip(self))]
    pub fn list(&self, title_filter: &str) -> Result<Vec<VideoId>> {
        let videos = self.store.load().context(StorageSnafu)?;

        let ids = videos
            .into_iter()
            .filter(|video| video.title_contains(title_filter))
            .map(|video| video.id)
            .collect();

        Ok(ids)
    }

    /// The first video stored under `id`.
    #[instrument(skip(self))]
    pub fn get(&self, id: &VideoId) -> Result<Video> {
        let videos = self.store.load().context(StorageSnafu)?;

        videos
            .into_iter()
            .find(|video| video.id == *id)
            .ok_or_else(|| NotFoundSnafu { id: id.clone() }.build())
    }

    #[instrument(skip(self))]
    pub fn like(&self, id: &VideoId) -> Result<()> {
        self.vote(id, Vote::Like)
    }

    #[instrument(skip(self))]
    pub fn dislike(&self, id: &VideoId) -> Result<()> {
        self.vote(id, Vote::Dislike)
    }

    /// Applies `vote` to every record stored under `id`, then rewrites the collection even when
    /// nothing matched.
    pub fn vote(&self, id: &VideoId, vote: Vote) -> Result<()> {
        let _guard = self
            .vote_lock
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner));

        let mut videos = self.store.load().context(StorageSnafu)?;

        let mut matched = 0;
        for video in videos.iter_mut().filter(|video| video.id == *id) {
            vote.apply(video);
            matched += 1;
        }

        match matched {
            0 => tracing::debug!(video_id = %id, ?vote, "no video matched, vote ignored"),
            1 => tracing::info!(video_id = %id, ?vote, "recorded vote for `{}`", id),
            n => tracing::warn!(video_id = %id, ?vote, matched = n, "vote applied to {} duplicate records", n),
        }

        if let (Vote::Like, Some(delay)) = (vote, self.like_delay) {
            let pause = delay.sample(&mut rand::thread_rng());
            tracing::debug!(?pause, "delaying the write");
            std::thread::sleep(pause);
        }

        self.store.save(&videos).context(StorageSnafu)
    }
}
