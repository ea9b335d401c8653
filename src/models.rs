use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role stored in the `user_role` PostgreSQL enum.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

/// Row of the `users` table.
///
/// `password` holds the argon2 PHC string, never the plain text.
/// `blocked_reason` is empty whenever `is_blocked` is false.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub is_blocked: bool,
    pub blocked_reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `styles` table.
///
/// `average_rating` and `review_count` are derived from `reviews` and only
/// ever written by the rating aggregation.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Style {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_public_id: String,
    pub image_url: String,
    pub average_rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `reviews` table. One per (style_id, user_id).
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Review {
    pub id: Uuid,
    pub style_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review joined with its author's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewWithAuthor {
    pub id: Uuid,
    pub style_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
