use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mindquest_core::errors::Error as CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::InvalidAction(_)
                | CoreError::Validation(_)
                | CoreError::InsufficientCoins { .. } => StatusCode::BAD_REQUEST,
                CoreError::ConcurrentModification(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mindquest_core::errors::{DatabaseError, ValidationError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CoreError::NotFound("p1".into()), StatusCode::NOT_FOUND),
            (CoreError::InvalidAction("x".into()), StatusCode::BAD_REQUEST),
            (
                CoreError::Validation(ValidationError::MissingField("title".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::InsufficientCoins {
                    requested: 5,
                    available: 1,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::ConcurrentModification("p1".into()),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::Database(DatabaseError::QueryFailed("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
