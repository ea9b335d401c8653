use uuid::Uuid;
use validator::Validate;

use crate::db::{ReviewExt, StyleExt};
use crate::dtos::{InputReviewDto, ReviewDto};
use crate::error::{ErrorMessage, HttpError, db_failure};
use crate::models::{Review, User};
use crate::rating::recompute_aggregate;
use crate::utils::access::can_mutate_review;

fn validated(body: InputReviewDto) -> Result<InputReviewDto, HttpError> {
    let body = body.normalized();
    body.validate().map_err(|e| {
        tracing::error!("Invalid review input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;
    Ok(body)
}

/// Reviews of a style, newest first. An unknown style simply has none.
pub async fn list_style_reviews<D>(db: &D, style_id: Uuid) -> Result<Vec<ReviewDto>, HttpError>
where
    D: ReviewExt,
{
    db.get_style_reviews(style_id)
        .await
        .map_err(db_failure("getting style reviews"))
}

/// The requester's own review of a style.
pub async fn get_my_review<D>(db: &D, style_id: Uuid, requester: &User) -> Result<ReviewDto, HttpError>
where
    D: ReviewExt,
{
    db.get_user_review(style_id, requester.id)
        .await
        .map_err(db_failure("getting user review"))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::MyReviewNotFound.to_string()))
}

/// Create the requester's review of a style and refresh the style rating.
///
/// The duplicate check runs before the insert to give a clear message; the
/// (style_id, user_id) unique constraint still catches concurrent inserts.
pub async fn add_review<D>(
    db: &D,
    style_id: Uuid,
    requester: &User,
    body: InputReviewDto,
) -> Result<ReviewDto, HttpError>
where
    D: StyleExt + ReviewExt,
{
    if requester.is_blocked {
        return Err(HttpError::forbidden(
            ErrorMessage::UserBlocked(requester.blocked_reason.clone()).to_string(),
        ));
    }

    let body = validated(body)?;

    db.get_style(style_id)
        .await
        .map_err(db_failure("getting style"))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::StyleNotFound.to_string()))?;

    let existing = db
        .get_user_review(style_id, requester.id)
        .await
        .map_err(db_failure("checking existing review"))?;
    if existing.is_some() {
        return Err(HttpError::bad_request(
            ErrorMessage::DuplicateReview.to_string(),
        ));
    }

    let review = match db
        .create_review(style_id, requester.id, body.rating, &body.comment)
        .await
    {
        Ok(review) => review,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::error!("DB error, creating review, unique_violation: {}", db_err);
            return Err(HttpError::bad_request(
                ErrorMessage::DuplicateValue.to_string(),
            ));
        }
        Err(e) => return Err(db_failure("creating review")(e)),
    };

    recompute_aggregate(db, style_id).await;
    Ok(review)
}

/// Load a review and check that the requester may change it.
/// A missing review is 404; someone else's review is 403.
async fn authorized_review<D>(db: &D, review_id: Uuid, requester: &User) -> Result<Review, HttpError>
where
    D: ReviewExt,
{
    let review = db
        .get_review(review_id)
        .await
        .map_err(db_failure("getting review"))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ReviewNotFound.to_string()))?;

    if !can_mutate_review(&review, requester) {
        tracing::error!(%review_id, requester = %requester.id, "review mutation denied");
        return Err(HttpError::forbidden(
            ErrorMessage::NotReviewOwner.to_string(),
        ));
    }

    Ok(review)
}

pub async fn update_review<D>(
    db: &D,
    review_id: Uuid,
    requester: &User,
    body: InputReviewDto,
) -> Result<ReviewDto, HttpError>
where
    D: StyleExt + ReviewExt,
{
    let body = validated(body)?;
    let review = authorized_review(db, review_id, requester).await?;

    let updated = db
        .update_review(review_id, body.rating, &body.comment)
        .await
        .map_err(db_failure("updating review"))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ReviewNotFound.to_string()))?;

    recompute_aggregate(db, review.style_id).await;
    Ok(updated)
}

pub async fn delete_review<D>(db: &D, review_id: Uuid, requester: &User) -> Result<(), HttpError>
where
    D: StyleExt + ReviewExt,
{
    let review = authorized_review(db, review_id, requester).await?;

    let deleted = db
        .delete_review(review_id)
        .await
        .map_err(db_failure("deleting review"))?;
    if !deleted {
        return Err(HttpError::not_found(ErrorMessage::ReviewNotFound.to_string()));
    }

    recompute_aggregate(db, review.style_id).await;
    Ok(())
}
