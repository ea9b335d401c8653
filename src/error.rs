use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error body sent to clients.
///
/// Every failing endpoint answers with the same envelope:
/// ```json
/// { "success": false, "message": "Review not found" }
/// ```
/// Internal details (database errors, upstream failures) are logged and
/// never copied into `message`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Fixed user-facing error messages.
///
/// PartialEq lets tests compare against a variant instead of a string literal.
#[derive(Debug, PartialEq)]
pub enum ErrorMessage {
    // Password validation errors
    EmptyPassword,
    ExceededMaxPasswordLength(usize),
    InvalidHashFormat,
    HashingError,

    // Authentication errors
    InvalidToken,
    TokenNotProvided,
    UserNotAuthenticated,
    WrongCredentials,
    UserBlocked(String),

    // Authorization errors
    PermissionDenied,
    NotReviewOwner,

    // Lookup errors
    UserNoLongerExist,
    UserNotFound,
    StyleNotFound,
    ReviewNotFound,
    MyReviewNotFound,

    // Conflicts
    DuplicateReview,
    DuplicateValue,
    EmailExist,

    // Admin panel
    BlockReasonRequired,
    CannotBlockSelf,

    //Else
    ServerError,
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorMessage::EmptyPassword => "Password cannot be empty".to_string(),
            ErrorMessage::HashingError => "Error while hashing password".to_string(),
            ErrorMessage::InvalidHashFormat => "Invalid password hash format".to_string(),
            ErrorMessage::ExceededMaxPasswordLength(max_length) => {
                format!("Password must not be more than {} characters", max_length)
            }
            ErrorMessage::InvalidToken => "Token is invalid or expired".to_string(),
            ErrorMessage::TokenNotProvided => {
                "You are not logged in, please provide a token".to_string()
            }
            ErrorMessage::UserNotAuthenticated => {
                "Authentication required. Please log in.".to_string()
            }
            ErrorMessage::WrongCredentials => "Invalid email or password".to_string(),
            ErrorMessage::UserBlocked(reason) if reason.is_empty() => {
                "Your account has been blocked".to_string()
            }
            ErrorMessage::UserBlocked(reason) => {
                format!("Your account has been blocked: {}", reason)
            }
            ErrorMessage::PermissionDenied => {
                "You are not allowed to perform this action".to_string()
            }
            ErrorMessage::NotReviewOwner => "Not authorized to modify this review".to_string(),
            ErrorMessage::UserNoLongerExist => {
                "User belonging to this token no longer exists".to_string()
            }
            ErrorMessage::UserNotFound => "User not found".to_string(),
            ErrorMessage::StyleNotFound => "Hijab style not found".to_string(),
            ErrorMessage::ReviewNotFound => "Review not found".to_string(),
            ErrorMessage::MyReviewNotFound => "No review found for this user".to_string(),
            ErrorMessage::DuplicateReview => {
                "You have already submitted a review for this hijab style".to_string()
            }
            ErrorMessage::DuplicateValue => "Duplicate field value entered".to_string(),
            ErrorMessage::EmailExist => "An account with this email already exists".to_string(),
            ErrorMessage::BlockReasonRequired => {
                "Please provide a reason for blocking".to_string()
            }
            ErrorMessage::CannotBlockSelf => "You cannot block your own account".to_string(),
            ErrorMessage::ServerError => "Server Error. Please try again later".to_string(),
        };
        write!(f, "{}", message)
    }
}

/// Error type returned by handlers, middleware and the service layer.
///
/// The status code travels with the message so a handler can bubble it up
/// with `?` and axum renders it through `IntoResponse`.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
}

impl HttpError {
    /// 500. Unexpected failures: database, image store, hashing.
    pub fn server_error(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 400. Invalid input, including a second review on the same style.
    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    /// 409. Unique constraint violations outside the review flow (email).
    pub fn unique_constraint_violation(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::CONFLICT,
        }
    }

    /// 401. The caller is not (or no longer) authenticated.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    /// 403. Authenticated, but the role or ownership check failed.
    pub fn forbidden(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::FORBIDDEN,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::NOT_FOUND,
        }
    }

    pub fn into_http_response(self) -> Response {
        let json_response = Json(ErrorResponse {
            success: false,
            message: self.message.clone(),
        });

        (self.status, json_response).into_response()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpError: message: {}, status: {}",
            self.message, self.status
        )
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Builds a `map_err` adapter that logs a store failure and hides it behind
/// the generic server error message.
///
/// ```ignore
/// let style = db.get_style(id).await.map_err(db_failure("getting style"))?;
/// ```
pub fn db_failure(action: &'static str) -> impl FnOnce(sqlx::Error) -> HttpError {
    move |e| {
        tracing::error!("DB error, {}: {}", action, e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    }
}
