use derive_new::new;
use serde::{Deserialize, Serialize};

pub use video::*;
pub use video_id::*;

mod video;
mod video_id;
