use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Write as _};
use std::path::{Path, PathBuf};

use derive_new::new;
use snafu::ResultExt as _;
use tempfile::NamedTempFile;
use tracing::instrument;

use super::*;

/// Stores the collection as a pretty-printed JSON array.
///
/// By default the file is truncated and rewritten in place, so a reader racing a writer can see
/// a partial file. With [`JsonFileStore::atomic`] the new content goes to a temporary file in the
/// same directory which is then renamed over the store.
#[derive(Debug, Clone, new)]
pub struct JsonFileStore {
    path: PathBuf,
    #[new(default)]
    atomic: bool,
}

impl JsonFileStore {
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_in_place(&self, content: &[u8]) -> Result<()> {
        std::fs::write(&self.path, content).context(WriteStoreSnafu {
            path: self.path.clone(),
        })
    }

    fn write_atomic(&self, content: &[u8]) -> Result<()> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(directory).context(WriteStoreSnafu {
            path: directory.to_path_buf(),
        })?;
        file.write_all(content)
            .and_then(|_| file.as_file().sync_all())
            .context(WriteStoreSnafu {
                path: file.path().to_path_buf(),
            })?;

        file.persist(&self.path).context(PersistStoreSnafu {
            path: self.path.clone(),
        })?;

        Ok(())
    }
}

impl Store for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<Video>> {
        let file = File::open(&self.path).context(ReadStoreSnafu {
            path: self.path.clone(),
        })?;

        let videos: Vec<Video> =
            serde_json::from_reader(BufReader::new(file)).context(ParseStoreSnafu {
                path: self.path.clone(),
            })?;

        warn_duplicates(&videos);
        tracing::debug!(count = videos.len(), "loaded videos from the store");

        Ok(videos)
    }

    #[instrument(skip(self, videos), fields(path = %self.path.display(), count = videos.len()))]
    fn save(&self, videos: &[Video]) -> Result<()> {
        let content = serde_json::to_vec_pretty(videos).context(SerializeStoreSnafu)?;

        if self.atomic {
            self.write_atomic(&content)
        } else {
            self.write_in_place(&content)
        }
    }
}

/// Duplicate ids are kept as-is, but they make votes land on more than one record.
fn warn_duplicates(videos: &[Video]) {
    let mut seen = HashSet::with_capacity(videos.len());

    for video in videos {
        if !seen.insert(&video.id) {
            tracing::warn!(video_id = %video.id, "video `{}` appears more than once in the store", video.id);
        }
    }
}
