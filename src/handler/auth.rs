use crate::{
    AppState,
    db::UserExt,
    dtos::{
        ApiResponse, BlockUserDto, FilterUserDto, LoginUserDto, MessageResponse, RegisterUserDto,
        UserLoginResponseDto,
    },
    error::{ErrorMessage, HttpError, db_failure},
    extractors::{AppJson, AppPath},
    middleware::{JWTAuthMiddleware, auth, role_check},
    models::UserRole,
    service,
    utils::{password, token},
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Router for authentication and user administration endpoints
pub fn auth_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/logout",
            post(logout).route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/me",
            get(get_me).route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        // admin panel
        .route(
            "/users",
            get(get_users)
                .route_layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Admin])
                }))
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/users/{user_id}/block",
            put(toggle_block)
                .route_layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Admin])
                }))
                .route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// Register a new account with the `user` role.
#[instrument(skip(app_state, body), fields(email = %body.email))]
pub async fn register(
    State(app_state): State<AppState>,
    AppJson(body): AppJson<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    let body = body.normalized();
    body.validate().map_err(|e| {
        tracing::error!("Invalid register input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let hash_password = password::hash(&body.password).map_err(|e| {
        tracing::error!("Password hashing error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let result = app_state
        .db_client
        .save_user(&body.name, &body.email, &hash_password, UserRole::User)
        .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Register Successful");
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::new(FilterUserDto::filter_user(&user))),
            ))
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::error!("DB error, saving user, unique_violation: {}", db_err);
            Err(HttpError::unique_constraint_violation(
                ErrorMessage::EmailExist.to_string(),
            ))
        }
        Err(e) => Err(db_failure("saving user")(e)),
    }
}

/// Check credentials, then hand out a token both in the body and as an
/// http-only `access_token` cookie.
#[instrument(skip(app_state, jar, body), fields(email = %body.email))]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    AppJson(body): AppJson<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    let body = body.normalized();
    body.validate().map_err(|e| {
        tracing::error!("Invalid login input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let user = app_state
        .db_client
        .get_user_by_email(&body.email)
        .await
        .map_err(db_failure("getting user"))?
        .ok_or_else(|| {
            tracing::warn!("login for unknown email");
            HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string())
        })?;

    // oversized or malformed input is just a failed login
    let password_matched = password::compare(&body.password, &user.password).map_err(|e| {
        tracing::warn!("Password error: {}", e);
        HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string())
    })?;

    if !password_matched {
        tracing::warn!(user_id = %user.id, "password mismatch");
        return Err(HttpError::unauthorized(
            ErrorMessage::WrongCredentials.to_string(),
        ));
    }

    if user.is_blocked {
        tracing::warn!(user_id = %user.id, "blocked user tried to log in");
        return Err(HttpError::forbidden(
            ErrorMessage::UserBlocked(user.blocked_reason).to_string(),
        ));
    }

    let access_token = token::create_token(
        user.id,
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| {
        tracing::error!("Access token creation error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let access_cookie = Cookie::build(("access_token", access_token.clone()))
        .path("/")
        .max_age(time::Duration::seconds(app_state.env.jwt_maxage))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!(user_id = %user.id, "Login Successful");
    Ok((
        jar.add(access_cookie),
        Json(UserLoginResponseDto {
            success: true,
            token: access_token,
            user: FilterUserDto::filter_user(&user),
        }),
    ))
}

/// Clear the access token cookie.
#[instrument(skip(jar, jwt), fields(user_id = %jwt.user.id))]
pub async fn logout(
    jar: CookieJar,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let removal = Cookie::build(("access_token", "")).path("/").build();

    tracing::info!("logout successful");
    Ok((
        jar.remove(removal),
        Json(MessageResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    ))
}

#[instrument(skip(jwt), fields(user_id = %jwt.user.id))]
pub async fn get_me(
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(ApiResponse::new(FilterUserDto::filter_user(&jwt.user))))
}

/// All users, newest first (admin only).
#[instrument(skip(app_state))]
pub async fn get_users(State(app_state): State<AppState>) -> Result<impl IntoResponse, HttpError> {
    let users = app_state
        .db_client
        .get_users()
        .await
        .map_err(db_failure("getting users"))?;

    tracing::info!(count = users.len(), "get_users successful");
    Ok(Json(ApiResponse::list(FilterUserDto::filter_users(&users))))
}

/// Block or unblock a user (admin only).
#[instrument(skip(app_state, jwt, body), fields(admin = %jwt.user.id))]
pub async fn toggle_block(
    AppPath(user_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    AppJson(body): AppJson<BlockUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    let user =
        service::user::toggle_block(&app_state.db_client, user_id, &jwt.user, &body.reason)
            .await?;

    tracing::info!(%user_id, is_blocked = user.is_blocked, "toggle_block successful");
    Ok(Json(ApiResponse::new(FilterUserDto::filter_user(&user))))
}
