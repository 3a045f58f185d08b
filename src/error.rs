//! Error types for the registry, the snapshot codec and the HTTP layer.
//!
//! [`ScheduleError`] is the closed set of outcomes a registry operation
//! can fail with. [`SnapshotError`] covers dump/restore. [`GatewayError`]
//! is the central service error; each variant maps to a specific HTTP
//! status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2103,
///     "message": "time conflict for 'alice': ...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`GatewayError::error_code`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Reason a meeting registry operation was rejected.
///
/// Success is `Ok(())`; every failure leaves the registry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The end instant is not strictly after the start instant.
    #[error("meeting must end after it starts")]
    InvalidTime,

    /// A meeting with this title already exists.
    #[error("meeting '{0}' already exists")]
    DuplicateMeeting(String),

    /// The proposed range overlaps a meeting the user is already in.
    #[error("time conflict for '{username}': '{title}' runs from {start} to {end}")]
    TimeConflict {
        /// User who would be double-booked.
        username: String,
        /// Title of the existing meeting that conflicts.
        title: String,
        /// Start of the existing meeting.
        start: DateTime<Utc>,
        /// End of the existing meeting.
        end: DateTime<Utc>,
    },

    /// No meeting with this title exists.
    #[error("no such meeting: '{0}'")]
    NoSuchMeeting(String),

    /// The user is not a participant of the meeting.
    #[error("user '{0}' is not a participant")]
    NoSuchUser(String),

    /// The user already participates in the meeting.
    #[error("user '{0}' already participates")]
    DuplicateUser(String),
}

/// Failure while dumping or restoring a snapshot.
///
/// `record` positions are 1-based indices in the record stream.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Reading or writing the underlying stream failed.
    #[error("snapshot i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be decoded.
    #[error("malformed snapshot record at line {line}: {source}")]
    Json {
        /// Line reported by the decoder.
        line: usize,
        /// Underlying codec error.
        source: serde_json::Error,
    },

    /// An in-memory record could not be encoded.
    #[error("cannot encode snapshot record {record}: {source}")]
    Encode {
        /// Offending record.
        record: usize,
        /// Underlying codec error.
        source: serde_json::Error,
    },

    /// A date field was not `YYYY-MM-DD`.
    #[error("invalid date '{value}' in record {record}")]
    InvalidDate {
        /// Offending record.
        record: usize,
        /// Raw field value.
        value: String,
    },

    /// A record names a user missing from the directory.
    #[error("unknown user '{username}' in record {record}")]
    UnknownUser {
        /// Offending record.
        record: usize,
        /// Username that failed to resolve.
        username: String,
    },
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2099 | Not Found         | 404 Not Found                |
/// | 2100–2199 | Scheduling clash  | 409 Conflict                 |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Registry rejected the operation.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Username is not registered.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Username is already registered.
    #[error("user already exists: {0}")]
    UserExists(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Snapshot dump or restore failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] SnapshotError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Schedule(ScheduleError::InvalidTime) => 1002,
            Self::Schedule(ScheduleError::NoSuchMeeting(_)) => 2001,
            Self::UserNotFound(_) => 2002,
            Self::Schedule(ScheduleError::NoSuchUser(_)) => 2003,
            Self::Schedule(ScheduleError::DuplicateMeeting(_)) => 2101,
            Self::Schedule(ScheduleError::DuplicateUser(_)) => 2102,
            Self::Schedule(ScheduleError::TimeConflict { .. }) => 2103,
            Self::UserExists(_) => 2104,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Schedule(ScheduleError::InvalidTime) => {
                StatusCode::BAD_REQUEST
            }
            Self::UserNotFound(_)
            | Self::Schedule(ScheduleError::NoSuchMeeting(_) | ScheduleError::NoSuchUser(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::UserExists(_)
            | Self::Schedule(
                ScheduleError::DuplicateMeeting(_)
                | ScheduleError::DuplicateUser(_)
                | ScheduleError::TimeConflict { .. },
            ) => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Extra context for clients, currently the clashing range on conflicts.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Schedule(ScheduleError::TimeConflict {
                username,
                title,
                start,
                end,
            }) => Some(format!(
                "{username} is busy with '{title}' from {} to {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
