use super::DBClient;
use crate::dtos::ReviewDto;
use crate::models::{Review, ReviewWithAuthor};
use uuid::Uuid;

const REVIEW_WITH_AUTHOR: &str = r#"
    SELECT r.id, r.style_id, r.user_id, u.name AS "user_name", r.rating, r.comment, r.created_at
    FROM reviews r
    INNER JOIN users u ON r.user_id = u.id
"#;

/// Raw count and mean of a style's ratings, as returned by the database.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct RatingStats {
    pub count: i64,
    pub mean: Option<f64>,
}

/// Review database operations trait
pub trait ReviewExt {
    /// Reviews of one style with author names, newest first.
    async fn get_style_reviews(&self, style_id: Uuid) -> Result<Vec<ReviewDto>, sqlx::Error>;

    /// Reviews of several styles at once, newest first.
    async fn get_reviews_for_styles(
        &self,
        style_ids: &[Uuid],
    ) -> Result<Vec<ReviewDto>, sqlx::Error>;

    async fn get_review(&self, review_id: Uuid) -> Result<Option<Review>, sqlx::Error>;

    /// The review a user left on a style, if any.
    async fn get_user_review(
        &self,
        style_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReviewDto>, sqlx::Error>;

    /// Fails with a unique violation if the user already reviewed the style.
    async fn create_review(
        &self,
        style_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comment: &str,
    ) -> Result<ReviewDto, sqlx::Error>;

    /// Returns None if the review no longer exists.
    async fn update_review(
        &self,
        review_id: Uuid,
        rating: i32,
        comment: &str,
    ) -> Result<Option<ReviewDto>, sqlx::Error>;

    /// Returns false if the review no longer exists.
    async fn delete_review(&self, review_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn get_rating_stats(&self, style_id: Uuid) -> Result<RatingStats, sqlx::Error>;
}

impl ReviewExt for DBClient {
    async fn get_style_reviews(&self, style_id: Uuid) -> Result<Vec<ReviewDto>, sqlx::Error> {
        let query = format!(
            "{} WHERE r.style_id = $1 ORDER BY r.created_at DESC",
            REVIEW_WITH_AUTHOR
        );

        let rows = sqlx::query_as::<_, ReviewWithAuthor>(&query)
            .bind(style_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ReviewDto::from).collect())
    }

    async fn get_reviews_for_styles(
        &self,
        style_ids: &[Uuid],
    ) -> Result<Vec<ReviewDto>, sqlx::Error> {
        let query = format!(
            "{} WHERE r.style_id = ANY($1) ORDER BY r.created_at DESC",
            REVIEW_WITH_AUTHOR
        );

        let rows = sqlx::query_as::<_, ReviewWithAuthor>(&query)
            .bind(style_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ReviewDto::from).collect())
    }

    async fn get_review(&self, review_id: Uuid) -> Result<Option<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, style_id, user_id, rating, comment, created_at, updated_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_review(
        &self,
        style_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReviewDto>, sqlx::Error> {
        let query = format!(
            "{} WHERE r.style_id = $1 AND r.user_id = $2",
            REVIEW_WITH_AUTHOR
        );

        let row = sqlx::query_as::<_, ReviewWithAuthor>(&query)
            .bind(style_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ReviewDto::from))
    }

    async fn create_review(
        &self,
        style_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comment: &str,
    ) -> Result<ReviewDto, sqlx::Error> {
        // CTE returns the new row joined with the author's name
        let row = sqlx::query_as::<_, ReviewWithAuthor>(
            r#"
            WITH new_review AS (
                INSERT INTO reviews (style_id, user_id, rating, comment)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT nr.id, nr.style_id, nr.user_id, u.name AS "user_name", nr.rating, nr.comment, nr.created_at
            FROM new_review nr
            JOIN users u ON nr.user_id = u.id
            "#,
        )
        .bind(style_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        rating: i32,
        comment: &str,
    ) -> Result<Option<ReviewDto>, sqlx::Error> {
        let row = sqlx::query_as::<_, ReviewWithAuthor>(
            r#"
            WITH updated_review AS (
                UPDATE reviews
                SET rating = $1, comment = $2, updated_at = NOW()
                WHERE id = $3
                RETURNING *
            )
            SELECT ur.id, ur.style_id, ur.user_id, u.name AS "user_name", ur.rating, ur.comment, ur.created_at
            FROM updated_review ur
            JOIN users u ON ur.user_id = u.id
            "#,
        )
        .bind(rating)
        .bind(comment)
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReviewDto::from))
    }

    async fn delete_review(&self, review_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_rating_stats(&self, style_id: Uuid) -> Result<RatingStats, sqlx::Error> {
        // AVG over INTEGER yields NUMERIC; cast so it decodes as f64
        sqlx::query_as::<_, RatingStats>(
            r#"
            SELECT COUNT(*) AS "count", AVG(rating)::DOUBLE PRECISION AS "mean"
            FROM reviews
            WHERE style_id = $1
            "#,
        )
        .bind(style_id)
        .fetch_one(&self.pool)
        .await
    }
}
