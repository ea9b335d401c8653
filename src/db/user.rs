use super::DBClient;
use crate::models::{User, UserRole};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, name, email, password, role, is_blocked, blocked_reason, created_at, updated_at";

/// User database operations trait
pub trait UserExt {
    /// Returns None when no user has this id.
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;

    /// All users, newest first (admin panel).
    async fn get_users(&self) -> Result<Vec<User>, sqlx::Error>;

    /// Fails with a unique violation if the email is taken.
    async fn save_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, sqlx::Error>;

    /// Set the block flag and reason in one write.
    /// Returns None if the user no longer exists.
    async fn set_user_block(
        &self,
        user_id: Uuid,
        is_blocked: bool,
        reason: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    /// Remove every user; their reviews go with them (ON DELETE CASCADE).
    async fn delete_all_users(&self) -> Result<u64, sqlx::Error>;
}

impl UserExt for DBClient {
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_users(&self) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await
    }

    async fn save_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(name)
            .bind(email)
            .bind(password)
            .bind(role)
            .fetch_one(&self.pool)
            .await
    }

    async fn set_user_block(
        &self,
        user_id: Uuid,
        is_blocked: bool,
        reason: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET is_blocked = $1, blocked_reason = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(is_blocked)
            .bind(reason)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_all_users(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
