use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use snafu::{Location, Snafu};

use crate::service::videos::VideoError;
use crate::Located;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(context(false), display("{source}"))]
    Video {
        source: VideoError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("background task did not complete: {source}"))]
    Blocking {
        source: tokio::task::JoinError,
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Video {
                source: VideoError::NotFound { .. },
                ..
            } => StatusCode::NOT_FOUND,
            ApiError::Video { .. } | ApiError::Blocking { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::NOT_FOUND => "not_found",
            _ => "internal",
        }
    }
}

impl Located for ApiError {
    fn location(&self) -> Location {
        match self {
            ApiError::Video { source, .. } => source.location(),
            ApiError::Blocking { location, .. } => *location,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, location = %self.location(), "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
