use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{locate::FormError, matcher::MatchError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("No position could be estimated: {0}")]
    Match(#[from] MatchError),
    #[error("Failed to read from the measurement store")]
    Store(#[from] sqlx::Error),
    #[error("Failed to encode the plot")]
    Encode(#[from] serde_json::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Form(_) => StatusCode::BAD_REQUEST,
            ApiError::Match(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) | ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Store(err) => error!("store query failed: {err}"),
            ApiError::Encode(err) => error!("encoding failed: {err}"),
            _ => (),
        }

        let status = self.status_code();
        HttpResponse::build(status).json(json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        }))
    }
}
