use std::path::PathBuf;

use snafu::{Location, Snafu};

use crate::model::Video;
use crate::Located;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

/// Video collection persisted as a single JSON file.
mod json;

/// Video collection kept in process memory.
mod memory;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("failed to read the store `{}` at {location}: {source}", path.display()))]
    ReadStore {
        path: PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("store `{}` is not a valid video collection at {location}: {source}", path.display()))]
    ParseStore {
        path: PathBuf,
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to serialize the video collection at {location}: {source}"))]
    SerializeStore {
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to write the store `{}` at {location}: {source}", path.display()))]
    WriteStore {
        path: PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to replace the store `{}` at {location}: {source}", path.display()))]
    PersistStore {
        path: PathBuf,
        source: tempfile::PersistError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for StoreError {
    fn location(&self) -> Location {
        match self {
            StoreError::ReadStore { location, .. }
            | StoreError::ParseStore { location, .. }
            | StoreError::SerializeStore { location, .. }
            | StoreError::WriteStore { location, .. }
            | StoreError::PersistStore { location, .. } => *location,
        }
    }
}

/// Persistence for the whole video collection.
///
/// Every call goes to the backing storage: implementations must not cache the collection
/// between calls, so a read-modify-write done by a caller sees exactly what the last writer left.
/// Both methods block and should be run off the async executor.
pub trait Store: std::fmt::Debug + Send + Sync {
    /// Loads every video, in stored order.
    fn load(&self) -> Result<Vec<Video>>;

    /// Replaces the stored collection with `videos`.
    fn save(&self, videos: &[Video]) -> Result<()>;
}

impl<T: Store + ?Sized> Store for std::sync::Arc<T> {
    fn load(&self) -> Result<Vec<Video>> {
        (**self).load()
    }

    fn save(&self, videos: &[Video]) -> Result<()> {
        (**self).save(videos)
    }
}
