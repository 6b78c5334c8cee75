use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Typed failures for the mutating operations. Reporting endpoints never
/// return these for individual bad records; they skip and log instead.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "User with this email already exists")]
    DuplicateEmail,

    #[display(fmt = "Email must end with {}", _0)]
    InvalidEmail(String),

    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    #[display(fmt = "Leave request already processed")]
    InvalidTransition,

    #[display(fmt = "You cannot delete your own account")]
    SelfDeletion,

    #[display(fmt = "Storage failure: {}", _0)]
    Storage(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Storage(format!("{e:#}"))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidEmail(_) | ApiError::InvalidTransition => {
                StatusCode::BAD_REQUEST
            }
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SelfDeletion => StatusCode::FORBIDDEN,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(detail) = self {
            tracing::error!(error = %detail, "storage failure");
            // Internal detail stays in the log, not the response body.
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}
