use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use burrow_core::RegistryError;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

pub enum AppError {
    BadRequest(&'static str),
    Registry(RegistryError),
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

/// Status code for each registry error kind.
pub fn status_for(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RegistryError::AlreadyExists(_) => StatusCode::CONFLICT,
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::Unauthorized(_) => StatusCode::FORBIDDEN,
        RegistryError::RetriesExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        RegistryError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            AppError::Registry(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    error!(kind = err.kind(), error = %err, "registry operation failed");
                    // Storage details stay in the log.
                    return (status, format!("{}\n", err.kind())).into_response();
                }
                (status, format!("{err}\n")).into_response()
            }
        }
    }
}
