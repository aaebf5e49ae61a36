use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use super::{App, Result};
use crate::model::{Video, VideoId};
use crate::service::videos::Vote;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: String,
}

#[instrument(skip(app))]
pub async fn list(State(app): State<App>, Query(query): Query<ListQuery>) -> Result<Json<Vec<VideoId>>> {
    let ids = app
        .blocking(move |videos| videos.list(&query.filter))
        .await?;

    Ok(Json(ids))
}

#[instrument(skip(app))]
pub async fn details(State(app): State<App>, Path(id): Path<VideoId>) -> Result<Json<Video>> {
    app.video_details(id).await.map(Json)
}

#[instrument(skip(app))]
pub async fn like(State(app): State<App>, Path(id): Path<VideoId>) -> Result<&'static str> {
    app.vote(id, Vote::Like).await?;
    Ok("OK")
}

#[instrument(skip(app))]
pub async fn dislike(State(app): State<App>, Path(id): Path<VideoId>) -> Result<&'static str> {
    app.vote(id, Vote::Dislike).await?;
    Ok("OK")
}
