use axum::extract::State;

use super::App;

/// Prometheus text exposition of the current metrics. Empty when metrics are disabled.
pub async fn render(State(app): State<App>) -> String {
    app.metrics().render().unwrap_or_default()
}
