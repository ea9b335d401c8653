use sqlx::{Pool, Postgres};

mod user;
pub use user::UserExt;

mod style;
pub use style::{StyleChanges, StyleExt};

mod review;
pub use review::{RatingStats, ReviewExt};

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}
impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}
