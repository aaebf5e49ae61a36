use std::convert::Infallible;

use super::*;

/// Identifier of a video record. Ids are assigned externally and never generated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, new)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::str::FromStr for VideoId {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(VideoId(input.to_string()))
    }
}

impl From<&str> for VideoId {
    fn from(input: &str) -> Self {
        VideoId(input.to_string())
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::convert::AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for VideoId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
