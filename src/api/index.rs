use axum::extract::State;
use axum::response::IntoResponse;
use axum_template::RenderHtml;
use tracing::instrument;

use super::{App, Result};
use crate::presentation::{self, HomePage};

pub const HOME_TEMPLATE: &str = "home.html";

/// Every video, best net score first. Each video is fetched through the same path as the
/// details endpoint, so every row also records a lookup latency.
#[instrument(skip(app))]
pub async fn home(State(app): State<App>) -> Result<impl IntoResponse> {
    let ids = app.blocking(|videos| videos.list("")).await?;

    let mut all_videos = Vec::with_capacity(ids.len());
    for id in ids {
        all_videos.push(app.video_details(id).await?);
    }

    let page = HomePage {
        videos: presentation::rank(all_videos),
    };

    Ok(RenderHtml(HOME_TEMPLATE, app.templates.clone(), page))
}
