use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post, put};
use axum::{Extension, Router, middleware};
use tracing::instrument;
use uuid::Uuid;

use crate::AppState;
use crate::dtos::{ApiResponse, CreateStyleDto, EmptyData, UpdateStyleDto};
use crate::error::HttpError;
use crate::extractors::{AppJson, AppPath};
use crate::handler::review::style_review_handler;
use crate::middleware::{JWTAuthMiddleware, auth, role_check};
use crate::models::UserRole;
use crate::service;

/// Router for /styles. Reads are public, writes are admin-only.
pub fn style_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get_styles))
        .route(
            "/",
            post(create_style)
                .route_layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Admin])
                }))
                // added last, so it runs first
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route("/{style_id}", get(get_style))
        .route(
            "/{style_id}",
            put(update_style)
                .delete(delete_style)
                .route_layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Admin])
                }))
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .nest("/{style_id}/reviews", style_review_handler(app_state))
}

#[instrument(skip(app_state))]
pub async fn get_styles(State(app_state): State<AppState>) -> Result<impl IntoResponse, HttpError> {
    let styles = service::style::list_styles(&app_state.db_client).await?;

    tracing::info!(count = styles.len(), "get_styles successful");
    Ok(Json(ApiResponse::list(styles)))
}

#[instrument(skip(app_state))]
pub async fn get_style(
    AppPath(style_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let style = service::style::get_style(&app_state.db_client, style_id).await?;

    tracing::info!("get_style successful");
    Ok(Json(ApiResponse::new(style)))
}

/// Request body: { name, description, image }. Image is a URL or data URI.
#[instrument(skip(app_state, jwt, body), fields(admin = %jwt.user.email))]
pub async fn create_style(
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    AppJson(body): AppJson<CreateStyleDto>,
) -> Result<impl IntoResponse, HttpError> {
    let style =
        service::style::create_style(&app_state.db_client, &app_state.media_client, body).await?;

    tracing::info!(style_id = %style.id, "create_style successful");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(style))))
}

#[instrument(skip(app_state, jwt, body), fields(admin = %jwt.user.email))]
pub async fn update_style(
    AppPath(style_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    AppJson(body): AppJson<UpdateStyleDto>,
) -> Result<impl IntoResponse, HttpError> {
    let style = service::style::update_style(
        &app_state.db_client,
        &app_state.media_client,
        style_id,
        body,
    )
    .await?;

    tracing::info!("update_style successful");
    Ok(Json(ApiResponse::new(style)))
}

/// Deletes the style, its stored image and all of its reviews.
#[instrument(skip(app_state, jwt), fields(admin = %jwt.user.email))]
pub async fn delete_style(
    AppPath(style_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    service::style::delete_style(&app_state.db_client, &app_state.media_client, style_id).await?;

    tracing::info!("delete_style successful");
    Ok(Json(ApiResponse::new(EmptyData {})))
}
