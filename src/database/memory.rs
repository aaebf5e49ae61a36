use std::sync::{Mutex, PoisonError};

use super::*;

/// Keeps the collection in memory. Each call copies the whole collection in or out, the same
/// way the file store re-reads and rewrites its file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    videos: Mutex<Vec<Video>>,
}

impl MemoryStore {
    pub fn new(videos: Vec<Video>) -> Self {
        Self {
            videos: Mutex::new(videos),
        }
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Vec<Video>> {
        let videos = self.videos.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(videos.clone())
    }

    fn save(&self, videos: &[Video]) -> Result<()> {
        let mut stored = self.videos.lock().unwrap_or_else(PoisonError::into_inner);
        *stored = videos.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_returns_a_copy() {
        let store = MemoryStore::new(vec![Video::new("a".into(), "A".to_string())]);

        let mut videos = store.load().unwrap();
        videos[0].likes += 1;

        assert_eq!(store.load().unwrap()[0].likes, 0);
        store.save(&videos).unwrap();
        assert_eq!(store.load().unwrap()[0].likes, 1);
    }
}
