//! Error type shared by handlers and middleware, rendered as `{"error", "status"}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use folio_core::error::{DomainError, RepoError};
use folio_core::ports::AuthError;
use folio_shared::ErrorResponse;
use std::fmt;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// No valid session.
    AuthenticationRequired,
    /// Signed in, but the route needs the reviewer role.
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    InvalidState(String),
    BadRequest(String),
    Conflict(String),
    /// Retry after this many seconds.
    TooManyRequests(u64),
    Internal(String),
}

impl AppError {
    /// 401-class failures send page requests to the plain access-denied page;
    /// everything else is treated as a permission problem.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AppError::AuthenticationRequired)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::AuthenticationRequired => write!(f, "Authentication required"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::TooManyRequests(secs) => write!(f, "Too many requests, retry in {}s", secs),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired | AppError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::AuthenticationRequired => ErrorResponse::unauthorized(),
            AppError::Unauthorized(detail) => ErrorResponse::new(401, detail),
            AppError::Forbidden(detail) => ErrorResponse::new(403, detail),
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::InvalidState(detail) | AppError::BadRequest(detail) => {
                ErrorResponse::bad_request(detail)
            }
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::TooManyRequests(secs) => {
                return HttpResponse::TooManyRequests()
                    .insert_header(("Retry-After", secs.to_string()))
                    .json(ErrorResponse::too_many_requests(*secs));
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Unauthorized(msg) => AppError::Unauthorized(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{} '{}' not found", entity_type, key))
            }
            DomainError::InvalidState(msg) => AppError::InvalidState(msg),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired | AuthError::InvalidToken(_) => AppError::AuthenticationRequired,
            AuthError::Provider(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
