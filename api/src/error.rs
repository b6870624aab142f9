use std::collections::HashMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;

use crate::blog::thread::ThreadError;

/// Maps a domain error onto the status code it should surface as.
pub trait ApiRequestError {
    fn status_code(&self) -> StatusCode;
}

#[derive(Debug)]
pub enum AppError {
    /// Request input failed shape or constraint checks.
    Validation(String),

    /// A referenced entity does not exist.
    NotFound(String),

    /// The actor does not own the entity it is trying to mutate.
    Forbidden(String),

    /// Assembling a comment thread failed. Fatal to the whole request; a
    /// partial tree is never returned.
    Render {
        error: ThreadError,

        #[cfg(debug_assertions)]
        backtrace: Box<backtrace::Backtrace>,
    },

    /// Checking out a pooled connection or running a query failed.
    Database {
        message: String,

        #[cfg(debug_assertions)]
        backtrace: Box<backtrace::Backtrace>,
    },

    /// Anything a handler wants to surface with an explicit status code.
    Message(String, StatusCode),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,

    #[cfg(debug_assertions)]
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_info: Option<HashMap<&'static str, Value>>,
}

#[derive(Serialize)]
struct ErrorResponse {
    errors: ErrorBody,
}

impl ErrorBody {
    fn new(code: &'static str, message: Option<String>) -> Self {
        ErrorBody {
            code,
            message,
            #[cfg(debug_assertions)]
            debug_info: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, body) = match self {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("VALIDATION_ERR", Some(message)),
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("NOT_FOUND", Some(message)),
            ),
            AppError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                ErrorBody::new("FORBIDDEN", Some(message)),
            ),
            AppError::Render {
                error,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                tracing::error!(%error, "failed to assemble a comment thread");

                #[allow(unused_mut)]
                let mut body = ErrorBody::new(
                    "RENDER_ERR",
                    Some("Failed to render the comment thread".into()),
                );
                #[cfg(debug_assertions)]
                {
                    body.debug_info = Some(HashMap::from([
                        ("error", Value::String(error.to_string())),
                        (
                            "backtrace",
                            serde_json::to_value(filter_backtrace(&backtrace)).unwrap_or_default(),
                        ),
                    ]));
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            AppError::Database {
                message,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                tracing::error!(error = %message, "database error");

                #[allow(unused_mut)]
                let mut body =
                    ErrorBody::new("SERVER_ERR", Some("Internal server error".into()));
                #[cfg(debug_assertions)]
                {
                    body.debug_info = Some(HashMap::from([
                        ("error", Value::String(message)),
                        (
                            "backtrace",
                            serde_json::to_value(filter_backtrace(&backtrace)).unwrap_or_default(),
                        ),
                    ]));
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            AppError::Message(message, status_code) => {
                (status_code, ErrorBody::new("ERR", Some(message)))
            }
        };

        (status_code, Json(ErrorResponse { errors: body })).into_response()
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        AppError::Database {
            message: e.to_string(),

            #[cfg(debug_assertions)]
            backtrace: Box::new(backtrace::Backtrace::new()),
        }
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for AppError {
    fn from(e: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        AppError::Database {
            message: e.to_string(),

            #[cfg(debug_assertions)]
            backtrace: Box::new(backtrace::Backtrace::new()),
        }
    }
}

impl From<ThreadError> for AppError {
    fn from(error: ThreadError) -> Self {
        AppError::Render {
            error,

            #[cfg(debug_assertions)]
            backtrace: Box::new(backtrace::Backtrace::new()),
        }
    }
}

// Lets handlers bail with `Err(("No such post", StatusCode::NOT_FOUND))?`.
// 400/404/403 route into the corresponding taxonomy variant so the response
// carries the right error code.
impl From<(String, StatusCode)> for AppError {
    fn from((message, status_code): (String, StatusCode)) -> Self {
        if status_code == StatusCode::BAD_REQUEST {
            AppError::Validation(message)
        } else if status_code == StatusCode::NOT_FOUND {
            AppError::NotFound(message)
        } else if status_code == StatusCode::FORBIDDEN {
            AppError::Forbidden(message)
        } else {
            AppError::Message(message, status_code)
        }
    }
}

impl From<(&'static str, StatusCode)> for AppError {
    fn from((message, status_code): (&'static str, StatusCode)) -> Self {
        AppError::from((message.to_owned(), status_code))
    }
}

#[cfg(debug_assertions)]
#[derive(Serialize, Debug)]
struct FrameInfo {
    name: String,
    loc: String,
}

#[cfg(debug_assertions)]
fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
    let mut frames_info: Vec<FrameInfo> = Vec::new();

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            if let (Some(name), Some(filename), Some(lineno)) = (
                symbol.name().map(|n| n.to_string()),
                symbol.filename().map(|f| f.to_owned()),
                symbol.lineno(),
            ) {
                if name.contains(MODULE_PREFIX) {
                    frames_info.push(FrameInfo {
                        name,
                        loc: format!("{}:{}", filename.display(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}
