use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post, put};
use axum::{Extension, Router, middleware};
use tracing::instrument;
use uuid::Uuid;

use crate::AppState;
use crate::dtos::{ApiResponse, EmptyData, InputReviewDto};
use crate::error::HttpError;
use crate::extractors::{AppJson, AppPath};
use crate::middleware::{JWTAuthMiddleware, auth};
use crate::service;

/// Router nested under /styles/{style_id}/reviews
pub fn style_review_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        // GET / - reviews of the style, newest first (public)
        .route("/", get(get_style_reviews))
        // POST / - add the requester's review (requires auth)
        .route(
            "/",
            post(create_review)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        // GET /check/mine and /my-review - the requester's own review
        .route(
            "/check/mine",
            get(get_my_review).route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/my-review",
            get(get_my_review).route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// Router for /reviews/{review_id}; author or admin only.
pub fn review_handler(app_state: AppState) -> Router<AppState> {
    Router::new().route(
        "/{review_id}",
        put(edit_review)
            .delete(delete_review)
            .route_layer(middleware::from_fn_with_state(app_state, auth)),
    )
}

#[instrument(skip(app_state))]
pub async fn get_style_reviews(
    AppPath(style_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = service::review::list_style_reviews(&app_state.db_client, style_id).await?;

    tracing::info!("get_style_reviews successful");
    Ok(Json(ApiResponse::list(reviews)))
}

/// Request body: { rating, comment }
#[instrument(skip(app_state, jwt, body), fields(user = %jwt.user.email))]
pub async fn create_review(
    AppPath(style_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    AppJson(body): AppJson<InputReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    let review =
        service::review::add_review(&app_state.db_client, style_id, &jwt.user, body).await?;

    tracing::info!(review_id = %review.id, "create_review successful");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(review))))
}

#[instrument(skip(app_state, jwt), fields(user = %jwt.user.email))]
pub async fn get_my_review(
    AppPath(style_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let review = service::review::get_my_review(&app_state.db_client, style_id, &jwt.user).await?;

    Ok(Json(ApiResponse::new(review)))
}

/// Request body: { rating, comment }
#[instrument(skip(app_state, jwt, body), fields(user = %jwt.user.email))]
pub async fn edit_review(
    AppPath(review_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    AppJson(body): AppJson<InputReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    let review =
        service::review::update_review(&app_state.db_client, review_id, &jwt.user, body).await?;

    tracing::info!("edit_review successful");
    Ok(Json(ApiResponse::new(review)))
}

#[instrument(skip(app_state, jwt), fields(user = %jwt.user.email))]
pub async fn delete_review(
    AppPath(review_id): AppPath<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    service::review::delete_review(&app_state.db_client, review_id, &jwt.user).await?;

    tracing::info!("delete_review successful");
    Ok(Json(ApiResponse::new(EmptyData {})))
}
