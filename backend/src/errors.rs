//! Maps engine errors onto HTTP responses with a `{"error": "..."}` body.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use newswire_search::Error;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] Error),

    #[error("query must contain at least one word")]
    EmptyQuery,

    #[error("document store is unavailable")]
    StoreUnavailable,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Engine(Error::Parse { .. }) | ApiError::EmptyQuery => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) | ApiError::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
