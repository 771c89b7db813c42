use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::registrations::{repo::StoreError, validation::FieldViolation};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid registration ID")]
    InvalidId,

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}")]
    Persistence {
        message: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl ApiError {
    /// Map a store failure onto the response for one endpoint.
    pub fn from_store(err: StoreError, message: &'static str) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Registration not found"),
            StoreError::Persistence(source) => ApiError::Persistence { message, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId | ApiError::InvalidBody(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::InvalidBody(reason) => Some(serde_json::Value::String(reason.clone())),
            ApiError::Validation(violations) => serde_json::to_value(violations).ok(),
            ApiError::Persistence { message, source } => {
                tracing::error!(error = %source, "{}", message);
                None
            }
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

/// Router fallback for paths that match no route.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found")
}

/// Give bodiless error responses produced by the framework or middleware
/// (405, 408, ...) the same JSON shape as handler errors. `Allow` is kept.
pub async fn ensure_json_error(res: Response) -> Response {
    let status = res.status();
    let is_error = status.is_client_error() || status.is_server_error();
    if !is_error || res.headers().contains_key(header::CONTENT_TYPE) {
        return res;
    }

    let body = ErrorBody {
        error: status.canonical_reason().unwrap_or("Request failed").to_string(),
        details: None,
    };
    let mut json = (status, Json(body)).into_response();
    if let Some(allow) = res.headers().get(header::ALLOW) {
        json.headers_mut().insert(header::ALLOW, allow.clone());
    }
    json
}
