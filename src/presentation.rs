use std::cmp::Reverse;

use serde::Serialize;

use crate::model::Video;

/// A video together with the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedVideo {
    pub video: Video,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub videos: Vec<RankedVideo>,
}

/// Orders videos by net score, highest first. Videos with the same score keep their input order.
pub fn rank(videos: Vec<Video>) -> Vec<RankedVideo> {
    let mut ranked: Vec<RankedVideo> = videos
        .into_iter()
        .map(|video| RankedVideo {
            score: video.net_score(),
            video,
        })
        .collect();

    ranked.sort_by_key(|entry| Reverse(entry.score));
    ranked
}
