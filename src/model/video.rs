use serde_json::{Map, Value};

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    #[new(default)]
    #[serde(default)]
    pub likes: u64,
    #[new(default)]
    #[serde(default)]
    pub dislikes: u64,

    /// Fields this service does not know about, written back untouched.
    #[new(default)]
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Video {
    /// Likes minus dislikes, clamped to the `i64` range.
    pub fn net_score(&self) -> i64 {
        let score = i128::from(self.likes) - i128::from(self.dislikes);
        score.clamp(i64::MIN.into(), i64::MAX.into()) as i64
    }

    /// Case-insensitive substring match on the title. An empty filter matches every video.
    pub fn title_contains(&self, filter: &str) -> bool {
        self.title.to_lowercase().contains(&filter.to_lowercase())
    }

    pub fn with_votes(mut self, likes: u64, dislikes: u64) -> Self {
        self.likes = likes;
        self.dislikes = dislikes;
        self
    }
}
