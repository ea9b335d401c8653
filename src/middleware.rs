use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::IntoResponse,
};

use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    db::UserExt,
    error::{ErrorMessage, HttpError, db_failure},
    models::{User, UserRole},
    utils::token,
};

/// Authenticated user, inserted into request extensions by [`auth`].
///
/// ```ignore
/// async fn my_handler(Extension(jwt): Extension<JWTAuthMiddleware>) {
///     let requester = &jwt.user;
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddleware {
    pub user: User,
}

/// Pull the token from the `access_token` cookie, falling back to
/// `Authorization: Bearer <token>`.
fn extract_token(cookie_jar: &CookieJar, req: &Request) -> Option<String> {
    cookie_jar
        .get("access_token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
                .map(str::to_owned)
        })
}

/// Authentication middleware.
///
/// # Errors
/// - 401 if no token is provided, the token is invalid or expired, or the
///   user no longer exists
/// - 403 if the user has been blocked by an admin
/// - 500 if the user could not be loaded
pub async fn auth(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, &req)
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let user_id = token::decode_token(token, app_state.env.jwt_secret.as_bytes())?;

    let user = app_state
        .db_client
        .get_user_by_id(user_id)
        .await
        .map_err(db_failure("getting user for token"))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    if user.is_blocked {
        tracing::warn!(user_id = %user.id, "blocked user rejected");
        return Err(HttpError::forbidden(
            ErrorMessage::UserBlocked(user.blocked_reason).to_string(),
        ));
    }

    req.extensions_mut().insert(JWTAuthMiddleware { user });

    Ok(next.run(req).await)
}

/// Role-based access control; must run after [`auth`].
///
/// # Errors
/// - 401 if the request was not authenticated
/// - 403 if the user's role is not in `required_roles`
pub async fn role_check(
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let user = req
        .extensions()
        .get::<JWTAuthMiddleware>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&user.user.role) {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    Ok(next.run(req).await)
}
