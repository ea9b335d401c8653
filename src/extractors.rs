use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// `Json<T>` that turns body rejections (bad syntax, wrong types, unknown
/// fields, missing content type) into a 400 with the standard error body.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::error!("Rejected JSON body: {}", e.body_text());
            HttpError::bad_request(e.body_text())
        })?;
        Ok(AppJson(value))
    }
}

/// `Path<T>` whose rejection (e.g. a malformed uuid) is a 400 with the
/// standard error body.
pub struct AppPath<T>(pub T);

impl<S, T> FromRequestParts<S> for AppPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::warn!("Rejected path parameter: {}", e.body_text());
                HttpError::bad_request(e.body_text())
            })?;
        Ok(AppPath(value))
    }
}
