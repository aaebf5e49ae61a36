use axum::routing::get;
use axum::Router;
use axum_template::engine::Engine;
use tera::Tera;
use tower_http::trace::TraceLayer;

mod error;
mod state;

pub mod index;
pub mod metrics;
pub mod video;

pub use error::*;
pub use state::*;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Compiles the page templates bundled into the binary.
pub fn templates() -> Result<Templates, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(index::HOME_TEMPLATE, include_str!("../../templates/home.html"))?;

    Ok(Engine::from(tera))
}

/// Builds the router. `/metrics` is only routed when `expose_metrics` is set.
pub fn create_router(app: App, expose_metrics: bool) -> Router {
    let mut router = Router::new()
        .route("/", get(index::home))
        .route("/api/v1/video", get(video::list))
        .route("/api/v1/video/:id", get(video::details))
        .route("/api/v1/video/:id/like", get(video::like))
        .route("/api/v1/video/:id/dislike", get(video::dislike));

    if expose_metrics {
        router = router.route("/metrics", get(metrics::render));
    }

    router.layer(TraceLayer::new_for_http()).with_state(app)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::database::{JsonFileStore, MemoryStore, Store};
    use crate::model::{Video, VideoId};
    use crate::service::instrumentation::Metrics;
    use crate::service::videos::Videos;

    fn catalog() -> Vec<Video> {
        vec![
            Video::new("c".into(), "Cooking with cats".to_string()).with_votes(5, 5),
            Video::new("b".into(), "Building a shed".to_string()).with_votes(3, 0),
            Video::new("a".into(), "A day at the CAT show".to_string()).with_votes(5, 1),
        ]
    }

    fn server_with(store: Arc<dyn Store>, metrics: Metrics) -> TestServer {
        let app = App::new(Videos::new(store), metrics, templates().unwrap());
        TestServer::new(create_router(app, true)).unwrap()
    }

    fn server(store: Arc<MemoryStore>) -> TestServer {
        server_with(store, Metrics::prometheus("video-voter").unwrap())
    }

    fn stored(store: &MemoryStore, id: &str) -> Video {
        store
            .load()
            .unwrap()
            .into_iter()
            .find(|video| video.id == *id)
            .unwrap()
    }

    #[tokio::test]
    async fn lists_every_id_without_filter() {
        let server = server(Arc::new(MemoryStore::new(catalog())));

        let response = server.get("/api/v1/video").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<String>>(), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn filters_titles_ignoring_case() {
        let server = server(Arc::new(MemoryStore::new(catalog())));

        let response = server
            .get("/api/v1/video")
            .add_query_param("filter", "cat")
            .await;

        assert_eq!(response.json::<Vec<String>>(), vec!["c", "a"]);
    }

    #[tokio::test]
    async fn returns_the_full_record() {
        let server = server(Arc::new(MemoryStore::new(catalog())));

        let response = server.get("/api/v1/video/a").await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"id": "a", "title": "A day at the CAT show", "likes": 5, "dislikes": 1})
        );
    }

    #[tokio::test]
    async fn unknown_video_is_a_structured_404() {
        let server = server(Arc::new(MemoryStore::new(catalog())));

        let response = server.get("/api/v1/video/nope").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "not_found");
        assert!(body["message"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn broken_store_is_a_500() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("missing.json")));
        let server = server_with(store, Metrics::disabled());

        let response = server.get("/api/v1/video").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json::<Value>()["error"], "internal");
    }

    #[tokio::test]
    async fn like_and_dislike_answer_ok_and_persist() {
        let store = Arc::new(MemoryStore::new(catalog()));
        let server = server(store.clone());

        let response = server.get("/api/v1/video/b/like").await;
        response.assert_status_ok();
        response.assert_text("OK");

        server.get("/api/v1/video/b/like").await.assert_status_ok();
        server.get("/api/v1/video/b/dislike").await.assert_text("OK");

        let video = stored(&store, "b");
        assert_eq!((video.likes, video.dislikes), (5, 1));
    }

    #[tokio::test]
    async fn voting_for_unknown_video_is_ok() {
        let store = Arc::new(MemoryStore::new(catalog()));
        let server = server(store.clone());

        server.get("/api/v1/video/nope/like").await.assert_text("OK");

        assert_eq!(store.load().unwrap(), catalog());
    }

    #[tokio::test]
    async fn home_page_is_ranked_by_net_score() {
        let server = server(Arc::new(MemoryStore::new(catalog())));

        let response = server.get("/").await;

        response.assert_status_ok();
        let page = response.text();
        let position = |id: &str| page.find(&format!("id=\"video-{id}\"")).unwrap();
        assert!(position("a") < position("b"), "{page}");
        assert!(position("b") < position("c"), "{page}");
    }

    #[tokio::test]
    async fn handlers_record_metrics() {
        let server = server(Arc::new(MemoryStore::new(catalog())));

        server.get("/api/v1/video/a/like").await.assert_status_ok();
        server.get("/").await.assert_status_ok();

        let rendered = server.get("/metrics").await.text();
        let like_line = rendered
            .lines()
            .find(|line| line.starts_with("video_likes{") && line.contains("id=\"a\""))
            .unwrap_or_else(|| panic!("{rendered}"));
        assert!(like_line.ends_with(" 1"), "{rendered}");

        for id in ["a", "b", "c"] {
            let label = format!("id=\"{id}\"");
            assert!(
                rendered.lines().any(|line| line
                    .starts_with("get_video_video_latency_milliseconds_count")
                    && line.contains(&label)),
                "{rendered}"
            );
        }
    }

    #[tokio::test]
    async fn metrics_route_is_only_mounted_when_requested() {
        let app = App::new(
            Videos::new(Arc::new(MemoryStore::new(catalog()))),
            Metrics::prometheus("video-voter").unwrap(),
            templates().unwrap(),
        );
        let server = TestServer::new(create_router(app, false)).unwrap();

        server.get("/metrics").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn file_store_round_trips_through_the_api() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        store.save(&catalog()).unwrap();
        let server = server_with(Arc::new(store.clone()), Metrics::disabled());

        server.get("/api/v1/video/c/dislike").await.assert_status_ok();

        let video = server.get("/api/v1/video/c").await.json::<Video>();
        assert_eq!(video.dislikes, 6);
        let ids: Vec<VideoId> = store.load().unwrap().into_iter().map(|video| video.id).collect();
        assert_eq!(ids, vec!["c".into(), "b".into(), VideoId::from("a")]);
    }
}
