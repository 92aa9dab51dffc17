use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::forms::FieldErrors;
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("missing or invalid admin token")]
    Unauthorized,

    #[error("admin API is disabled")]
    AdminDisabled,

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),

    #[error("media storage failed: {0}")]
    Media(#[from] std::io::Error),
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Store(StoreError::NotFound))
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ServiceError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::AdminDisabled => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Store(_) | ServiceError::Render(_) | ServiceError::Media(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            ServiceError::Validation(errors) => json!({ "errors": errors }),
            ServiceError::Store(StoreError::Conflict(message)) => {
                json!({ "error": "conflict", "detail": message })
            }
            _ if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE => {
                error!("{}", self);
                json!({ "error": "internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        let mut response = HttpResponse::build(status);
        if let ServiceError::Unauthorized = self {
            response.insert_header(("WWW-Authenticate", "Bearer"));
        }
        response.json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        let mut errors = FieldErrors::new();
        errors.add("name", "This field is required.");
        assert_eq!(
            ServiceError::from(errors).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::from(StoreError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::from(StoreError::Conflict("slug".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::AdminDisabled.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::from(StoreError::Poisoned).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
