use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest {
        message: String,
        invalid: Option<String>,
    },
    Conflict(String),
    UnsupportedMediaType(String),
    /// A response could not be encoded in the negotiated format.
    Encoding(String),
    /// `message` is shown to the client; `source` is only logged.
    Internal {
        message: &'static str,
        source: store::Error,
    },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    invalid: Option<&'a str>,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            invalid: None,
        }
    }

    /// A rejected visit, with the reason attached as `invalid`.
    pub fn invalid_visit(reason: impl ToString) -> Self {
        AppError::BadRequest {
            message: "invalid visit".to_string(),
            invalid: Some(reason.to_string()),
        }
    }

    pub fn internal(message: &'static str) -> impl FnOnce(store::Error) -> Self {
        move |source| {
            if source.is_client_error() {
                AppError::from(source)
            } else {
                AppError::Internal { message, source }
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Encoding(_) | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::NotFound(message)
            | AppError::Conflict(message)
            | AppError::UnsupportedMediaType(message) => ErrorBody {
                error: message,
                invalid: None,
            },
            AppError::BadRequest { message, invalid } => ErrorBody {
                error: message,
                invalid: invalid.as_deref(),
            },
            AppError::Encoding(cause) => {
                tracing::error!("unable to encode response: {cause}");
                ErrorBody {
                    error: "unable to encode response",
                    invalid: None,
                }
            }
            AppError::Internal { message, source } => {
                tracing::error!("{message}: {source}");
                ErrorBody {
                    error: message,
                    invalid: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<store::Error> for AppError {
    fn from(e: store::Error) -> Self {
        match e {
            store::Error::MissingField(_) | store::Error::NoSuchState => AppError::invalid_visit(e),
            store::Error::AlreadyExists => AppError::Conflict(e.to_string()),
            source @ store::Error::Store { .. } => AppError::Internal {
                message: "internal server error",
                source,
            },
        }
    }
}
