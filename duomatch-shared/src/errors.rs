use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Match errors (decisions, reveals)
/// - E2xxx: Game errors (sessions, scoring)
/// - E3xxx: Moderation errors
/// - E4xxx: Notification errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    ServiceUnavailable,
    BadRequest,

    // Match (E1xxx)
    MatchNotFound,
    NotMatchParticipant,
    MatchAlreadyDecided,
    NoQualifyingMatch,
    CannotRevealSelf,
    RevealAlreadyGranted,
    RevealOutOfOrder,

    // Game (E2xxx)
    GameNotFound,
    GameInactive,
    SessionNotFound,
    NotSessionParticipant,
    MatchNotAccepted,
    ActiveSessionExists,
    SessionAlreadyEnded,
    StatsNotFound,

    // Moderation (E3xxx)
    ReportNotFound,
    CannotReportSelf,
    DuplicateReport,
    ReportAlreadyResolved,
    SuspensionNotFound,
    SuspensionNotActive,
    AppealNotFound,
    AppealAlreadyDecided,
    DuplicateAppeal,

    // Notification (E4xxx)
    NotificationNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::RateLimited => "E0006",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",

            // Match
            Self::MatchNotFound => "E1001",
            Self::NotMatchParticipant => "E1002",
            Self::MatchAlreadyDecided => "E1003",
            Self::NoQualifyingMatch => "E1004",
            Self::CannotRevealSelf => "E1005",
            Self::RevealAlreadyGranted => "E1006",
            Self::RevealOutOfOrder => "E1007",

            // Game
            Self::GameNotFound => "E2001",
            Self::GameInactive => "E2002",
            Self::SessionNotFound => "E2003",
            Self::NotSessionParticipant => "E2004",
            Self::MatchNotAccepted => "E2005",
            Self::ActiveSessionExists => "E2006",
            Self::SessionAlreadyEnded => "E2007",
            Self::StatsNotFound => "E2008",

            // Moderation
            Self::ReportNotFound => "E3001",
            Self::CannotReportSelf => "E3002",
            Self::DuplicateReport => "E3003",
            Self::ReportAlreadyResolved => "E3004",
            Self::SuspensionNotFound => "E3005",
            Self::SuspensionNotActive => "E3006",
            Self::AppealNotFound => "E3007",
            Self::AppealAlreadyDecided => "E3008",
            Self::DuplicateAppeal => "E3009",

            // Notification
            Self::NotificationNotFound => "E4001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::MatchNotFound | Self::NoQualifyingMatch
            | Self::GameNotFound | Self::SessionNotFound | Self::StatsNotFound
            | Self::ReportNotFound | Self::SuspensionNotFound | Self::AppealNotFound
            | Self::NotificationNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotMatchParticipant | Self::NotSessionParticipant
            | Self::CannotRevealSelf | Self::CannotReportSelf => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::MatchAlreadyDecided | Self::RevealAlreadyGranted | Self::RevealOutOfOrder
            | Self::GameInactive | Self::MatchNotAccepted | Self::ActiveSessionExists
            | Self::SessionAlreadyEnded | Self::DuplicateReport | Self::ReportAlreadyResolved
            | Self::SuspensionNotActive | Self::AppealAlreadyDecided
            | Self::DuplicateAppeal => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_violations_map_to_conflict() {
        for code in [
            ErrorCode::MatchAlreadyDecided,
            ErrorCode::SessionAlreadyEnded,
            ErrorCode::RevealOutOfOrder,
            ErrorCode::RevealAlreadyGranted,
            ErrorCode::ActiveSessionExists,
            ErrorCode::AppealAlreadyDecided,
        ] {
            assert_eq!(code.status_code(), StatusCode::CONFLICT, "{:?}", code);
        }
    }

    #[test]
    fn relation_violations_map_to_forbidden() {
        for code in [
            ErrorCode::NotMatchParticipant,
            ErrorCode::NotSessionParticipant,
            ErrorCode::CannotRevealSelf,
            ErrorCode::CannotReportSelf,
        ] {
            assert_eq!(code.status_code(), StatusCode::FORBIDDEN, "{:?}", code);
        }
    }

    #[test]
    fn codes_are_unique() {
        let codes = [
            ErrorCode::InternalError,
            ErrorCode::MatchNotFound,
            ErrorCode::MatchAlreadyDecided,
            ErrorCode::GameNotFound,
            ErrorCode::SessionAlreadyEnded,
            ErrorCode::ReportNotFound,
            ErrorCode::AppealAlreadyDecided,
            ErrorCode::NotificationNotFound,
        ];
        let mut seen = std::collections::HashSet::new();
        for c in codes {
            assert!(seen.insert(c.code()), "duplicate code {}", c.code());
        }
    }

    #[test]
    fn not_found_database_error_maps_to_404() {
        let err = AppError::Database(diesel::result::Error::NotFound);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
