use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::db::{ReviewExt, StyleChanges, StyleExt};
use crate::dtos::{CreateStyleDto, ReviewDto, StyleDto, UpdateStyleDto};
use crate::error::{ErrorMessage, HttpError, db_failure};
use crate::media::ImageStore;
use crate::models::Style;

async fn find_style<D>(db: &D, style_id: Uuid) -> Result<Style, HttpError>
where
    D: StyleExt,
{
    db.get_style(style_id)
        .await
        .map_err(db_failure("getting style"))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::StyleNotFound.to_string()))
}

/// Every style with its reviews nested, newest first.
pub async fn list_styles<D>(db: &D) -> Result<Vec<StyleDto>, HttpError>
where
    D: StyleExt + ReviewExt,
{
    let styles = db.get_styles().await.map_err(db_failure("getting styles"))?;
    let style_ids: Vec<Uuid> = styles.iter().map(|style| style.id).collect();

    let reviews = db
        .get_reviews_for_styles(&style_ids)
        .await
        .map_err(db_failure("getting reviews for styles"))?;

    // reviews arrive newest first; grouping keeps that order per style
    let mut by_style: HashMap<Uuid, Vec<ReviewDto>> = HashMap::new();
    for review in reviews {
        by_style.entry(review.style_id).or_default().push(review);
    }

    Ok(styles
        .into_iter()
        .map(|style| {
            let reviews = by_style.remove(&style.id).unwrap_or_default();
            StyleDto::from_parts(style, reviews)
        })
        .collect())
}

pub async fn get_style<D>(db: &D, style_id: Uuid) -> Result<StyleDto, HttpError>
where
    D: StyleExt + ReviewExt,
{
    let style = find_style(db, style_id).await?;
    let reviews = db
        .get_style_reviews(style_id)
        .await
        .map_err(db_failure("getting style reviews"))?;

    Ok(StyleDto::from_parts(style, reviews))
}

/// Upload the image, then insert the style.
pub async fn create_style<D, S>(db: &D, images: &S, body: CreateStyleDto) -> Result<StyleDto, HttpError>
where
    D: StyleExt,
    S: ImageStore,
{
    let body = body.normalized();
    body.validate().map_err(|e| {
        tracing::error!("Invalid create_style input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let image = images.upload(&body.image).await?;

    let style = db
        .create_style(&body.name, &body.description, &image)
        .await
        .map_err(db_failure("creating style"))?;

    Ok(StyleDto::from_parts(style, Vec::new()))
}

/// Apply a partial update.
///
/// A new image replaces the old one by destroying it first and uploading
/// second. The two calls are not atomic: if the upload fails the style row
/// keeps pointing at the destroyed image.
pub async fn update_style<D, S>(
    db: &D,
    images: &S,
    style_id: Uuid,
    body: UpdateStyleDto,
) -> Result<StyleDto, HttpError>
where
    D: StyleExt + ReviewExt,
    S: ImageStore,
{
    let body = body.normalized();
    body.validate().map_err(|e| {
        tracing::error!("Invalid update_style input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let existing = find_style(db, style_id).await?;

    let image = match &body.image {
        Some(source) => {
            if !existing.image_public_id.is_empty() {
                images.destroy(&existing.image_public_id).await?;
            }
            Some(images.upload(source).await?)
        }
        None => None,
    };

    let changes = StyleChanges {
        name: body.name,
        description: body.description,
        image,
    };

    let style = db
        .update_style(style_id, &changes)
        .await
        .map_err(db_failure("updating style"))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::StyleNotFound.to_string()))?;

    let reviews = db
        .get_style_reviews(style_id)
        .await
        .map_err(db_failure("getting style reviews"))?;

    Ok(StyleDto::from_parts(style, reviews))
}

/// Destroy the stored image, then delete the style and its reviews.
pub async fn delete_style<D, S>(db: &D, images: &S, style_id: Uuid) -> Result<(), HttpError>
where
    D: StyleExt,
    S: ImageStore,
{
    let existing = find_style(db, style_id).await?;

    // styles seeded from a remote URL have no stored image
    if !existing.image_public_id.is_empty() {
        images.destroy(&existing.image_public_id).await?;
    }

    let deleted = db
        .delete_style(style_id)
        .await
        .map_err(db_failure("deleting style"))?;
    if !deleted {
        return Err(HttpError::not_found(ErrorMessage::StyleNotFound.to_string()));
    }

    tracing::info!(%style_id, "style deleted with its reviews");
    Ok(())
}
