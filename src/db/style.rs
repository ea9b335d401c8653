use super::DBClient;
use crate::media::StoredImage;
use crate::models::Style;
use crate::rating::RatingSummary;
use uuid::Uuid;

const STYLE_COLUMNS: &str = "id, name, description, image_public_id, image_url, \
     average_rating, review_count, created_at, updated_at";

/// Fields of a partial style update. `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct StyleChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<StoredImage>,
}

/// Style database operations trait
pub trait StyleExt {
    /// All styles, newest first.
    async fn get_styles(&self) -> Result<Vec<Style>, sqlx::Error>;

    async fn get_style(&self, style_id: Uuid) -> Result<Option<Style>, sqlx::Error>;

    /// Insert a style with zeroed rating fields.
    async fn create_style(
        &self,
        name: &str,
        description: &str,
        image: &StoredImage,
    ) -> Result<Style, sqlx::Error>;

    /// Returns None if the style vanished before the update.
    async fn update_style(
        &self,
        style_id: Uuid,
        changes: &StyleChanges,
    ) -> Result<Option<Style>, sqlx::Error>;

    /// Delete the style and every review that references it.
    /// Returns false when no style had this id.
    async fn delete_style(&self, style_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Delete every review and style. Returns the number of styles removed.
    async fn delete_all_styles(&self) -> Result<u64, sqlx::Error>;

    /// Overwrite the derived rating fields.
    async fn update_style_rating(
        &self,
        style_id: Uuid,
        summary: RatingSummary,
    ) -> Result<(), sqlx::Error>;
}

impl StyleExt for DBClient {
    async fn get_styles(&self) -> Result<Vec<Style>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM styles ORDER BY created_at DESC",
            STYLE_COLUMNS
        );

        sqlx::query_as::<_, Style>(&query)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_style(&self, style_id: Uuid) -> Result<Option<Style>, sqlx::Error> {
        let query = format!("SELECT {} FROM styles WHERE id = $1", STYLE_COLUMNS);

        sqlx::query_as::<_, Style>(&query)
            .bind(style_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_style(
        &self,
        name: &str,
        description: &str,
        image: &StoredImage,
    ) -> Result<Style, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO styles (name, description, image_public_id, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            STYLE_COLUMNS
        );

        sqlx::query_as::<_, Style>(&query)
            .bind(name)
            .bind(description)
            .bind(&image.public_id)
            .bind(&image.url)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_style(
        &self,
        style_id: Uuid,
        changes: &StyleChanges,
    ) -> Result<Option<Style>, sqlx::Error> {
        // COALESCE keeps the column when the bound value is NULL
        let query = format!(
            r#"
            UPDATE styles
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                image_public_id = COALESCE($3, image_public_id),
                image_url = COALESCE($4, image_url),
                updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            STYLE_COLUMNS
        );

        sqlx::query_as::<_, Style>(&query)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.image.as_ref().map(|image| image.public_id.as_str()))
            .bind(changes.image.as_ref().map(|image| image.url.as_str()))
            .bind(style_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_style(&self, style_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reviews WHERE style_id = $1")
            .bind(style_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM styles WHERE id = $1")
            .bind(style_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_styles(&self) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reviews").execute(&mut *tx).await?;
        let result = sqlx::query("DELETE FROM styles").execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn update_style_rating(
        &self,
        style_id: Uuid,
        summary: RatingSummary,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE styles
            SET average_rating = $1, review_count = $2
            WHERE id = $3
            "#,
        )
        .bind(summary.average)
        .bind(summary.count)
        .bind(style_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
