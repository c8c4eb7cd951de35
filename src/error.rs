use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

// ── Fetch / aggregation errors ─────────────────────────────────────────────

/// Everything that can go wrong between asking the upstream API for rows and
/// holding a fully aggregated chart series.
///
/// There is no partial result: any of these aborts the whole request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection refused, DNS failure, timeout, broken body stream.
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload was not the expected shape (not an array, missing or
    /// mistyped fields, unparseable dates).
    #[error("malformed payload from {context}: {message}")]
    Malformed { context: String, message: String },

    /// A request URL could not be built from the configured base URL.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ── Handler errors ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

/// Error returned by HTTP handlers. Always rendered as a JSON body so the UI
/// can tell a failed fetch (retry) apart from an empty chart (`no_data`).
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Upstream(Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::Upstream(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            AppError::Upstream(e) => {
                if is_caller_problem(&e) {
                    tracing::warn!("upstream rejected request: {}", e);
                } else {
                    tracing::error!("upstream request failed: {}", e);
                }
                match e {
                    Error::Transport(_) | Error::InvalidUrl(_) => (
                        StatusCode::BAD_GATEWAY,
                        "upstream_unreachable",
                        "The link service could not be reached.".to_owned(),
                    ),
                    Error::Status { status, body } => {
                        (passthrough_status(status), "upstream_error", body)
                    }
                    Error::Malformed { context, message } => (
                        StatusCode::BAD_GATEWAY,
                        "malformed_payload",
                        format!("{context}: {message}"),
                    ),
                }
            }
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorInfo { code, message },
            }),
        )
            .into_response()
    }
}

/// Client-caused upstream statuses are forwarded as-is; anything else is the
/// gateway's problem.
fn passthrough_status(status: u16) -> StatusCode {
    match status {
        401 | 403 | 404 | 409 => {
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Upstream answers that are the caller's doing (no session, unknown link)
/// rather than a fault in the dashboard or the upstream.
fn is_caller_problem(e: &Error) -> bool {
    matches!(e, Error::Status { status, .. } if passthrough_status(*status) != StatusCode::BAD_GATEWAY)
}
