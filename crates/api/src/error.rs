use atlas_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failures an endpoint can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A malformed path segment: a non-numeric limit or height, or an
    /// unparseable hash or address.
    #[error("{0}")]
    BadRequest(String),
    /// The query matched no document.
    #[error("not found")]
    NotFound,
    /// The store failed.
    #[error("{0}")]
    Store(StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Store(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
