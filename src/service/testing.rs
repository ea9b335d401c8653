//! In-memory store and image store used by the service tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use chrono::Utc;
use sqlx::error::{DatabaseError, ErrorKind};
use uuid::Uuid;

use crate::db::{RatingStats, ReviewExt, StyleChanges, StyleExt, UserExt};
use crate::dtos::{InputReviewDto, ReviewDto};
use crate::error::{ErrorMessage, HttpError};
use crate::media::{ImageStore, StoredImage};
use crate::models::{Review, ReviewWithAuthor, Style, User, UserRole};
use crate::rating::RatingSummary;

pub fn review_body(rating: i32, comment: &str) -> InputReviewDto {
    InputReviewDto {
        rating,
        comment: comment.to_string(),
    }
}

/// What PostgreSQL reports when a unique constraint rejects a row.
#[derive(Debug)]
struct UniqueViolation {
    constraint: &'static str,
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate key value violates unique constraint \"{}\"",
            self.constraint
        )
    }
}

impl std::error::Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

fn unique_violation(constraint: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(UniqueViolation { constraint }))
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    // insertion order; newest last
    styles: Vec<Style>,
    reviews: Vec<(u64, Review)>,
    seq: u64,
    fail_rating_writes: bool,
    // simulate concurrent writers that the read-side checks cannot see
    hide_existing_reviews: bool,
    drop_users_before_block: bool,
}

impl State {
    fn with_author(&self, review: &Review) -> ReviewDto {
        let user_name = self
            .users
            .get(&review.user_id)
            .map(|user| user.name.clone())
            .unwrap_or_default();

        ReviewDto::from(ReviewWithAuthor {
            id: review.id,
            style_id: review.style_id,
            user_id: review.user_id,
            user_name,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: review.created_at,
        })
    }

    fn newest_first<'a>(&'a self, keep: impl Fn(&Review) -> bool) -> Vec<&'a (u64, Review)> {
        let mut reviews: Vec<&(u64, Review)> =
            self.reviews.iter().filter(|(_, r)| keep(r)).collect();
        reviews.sort_by(|a, b| b.0.cmp(&a.0));
        reviews
    }
}

#[derive(Default)]
pub struct MemoryDb {
    state: Mutex<State>,
}

impl MemoryDb {
    pub fn insert_user(&self, name: &str, role: UserRole) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            password: String::new(),
            role,
            is_blocked: false,
            blocked_reason: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
        user
    }

    pub fn insert_style(&self, name: &str) -> Uuid {
        let style = Style {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{} description", name),
            image_public_id: format!("hijab-styles/{}", Uuid::new_v4()),
            image_url: "https://res.cloudinary.com/demo/image/upload/sample.jpg".to_string(),
            average_rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = style.id;
        self.state.lock().unwrap().styles.push(style);
        id
    }

    pub fn style(&self, style_id: Uuid) -> Option<Style> {
        self.state
            .lock()
            .unwrap()
            .styles
            .iter()
            .find(|s| s.id == style_id)
            .cloned()
    }

    /// (average_rating, review_count) as stored on the style.
    pub fn rating_of(&self, style_id: Uuid) -> (f64, i32) {
        let style = self.style(style_id).expect("style exists");
        (style.average_rating, style.review_count)
    }

    pub fn review(&self, review_id: Uuid) -> Option<Review> {
        self.state
            .lock()
            .unwrap()
            .reviews
            .iter()
            .find(|(_, r)| r.id == review_id)
            .map(|(_, r)| r.clone())
    }

    pub fn review_count(&self) -> usize {
        self.state.lock().unwrap().reviews.len()
    }

    pub fn fail_rating_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_rating_writes = fail;
    }

    /// `get_user_review` misses, as when a racing insert has not committed.
    pub fn hide_existing_reviews(&self, hide: bool) {
        self.state.lock().unwrap().hide_existing_reviews = hide;
    }

    /// `set_user_block` finds no row, as when the user was deleted meanwhile.
    pub fn drop_users_before_block(&self, drop: bool) {
        self.state.lock().unwrap().drop_users_before_block = drop;
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn style_count(&self) -> usize {
        self.state.lock().unwrap().styles.len()
    }
}

impl UserExt for MemoryDb {
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.state.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_users(&self) -> Result<Vec<User>, sqlx::Error> {
        let mut users: Vec<User> = self.state.lock().unwrap().users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn save_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.email == email) {
            return Err(unique_violation("users_email_key"));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
            is_blocked: false,
            blocked_reason: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_user_block(
        &self,
        user_id: Uuid,
        is_blocked: bool,
        reason: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.drop_users_before_block {
            state.users.remove(&user_id);
        }
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.is_blocked = is_blocked;
        user.blocked_reason = reason.to_string();
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_all_users(&self) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let removed = state.users.len() as u64;
        state.users.clear();
        state.reviews.clear();
        Ok(removed)
    }
}

impl StyleExt for MemoryDb {
    async fn get_styles(&self) -> Result<Vec<Style>, sqlx::Error> {
        Ok(self.state.lock().unwrap().styles.iter().rev().cloned().collect())
    }

    async fn get_style(&self, style_id: Uuid) -> Result<Option<Style>, sqlx::Error> {
        Ok(self.style(style_id))
    }

    async fn create_style(
        &self,
        name: &str,
        description: &str,
        image: &StoredImage,
    ) -> Result<Style, sqlx::Error> {
        let style = Style {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            image_public_id: image.public_id.clone(),
            image_url: image.url.clone(),
            average_rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state.lock().unwrap().styles.push(style.clone());
        Ok(style)
    }

    async fn update_style(
        &self,
        style_id: Uuid,
        changes: &StyleChanges,
    ) -> Result<Option<Style>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let Some(style) = state.styles.iter_mut().find(|s| s.id == style_id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            style.name = name.clone();
        }
        if let Some(description) = &changes.description {
            style.description = description.clone();
        }
        if let Some(image) = &changes.image {
            style.image_public_id = image.public_id.clone();
            style.image_url = image.url.clone();
        }
        style.updated_at = Utc::now();
        Ok(Some(style.clone()))
    }

    async fn delete_style(&self, style_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        state.reviews.retain(|(_, r)| r.style_id != style_id);
        let before = state.styles.len();
        state.styles.retain(|s| s.id != style_id);
        Ok(state.styles.len() < before)
    }

    async fn delete_all_styles(&self) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let removed = state.styles.len() as u64;
        state.reviews.clear();
        state.styles.clear();
        Ok(removed)
    }

    async fn update_style_rating(
        &self,
        style_id: Uuid,
        summary: RatingSummary,
    ) -> Result<(), sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_rating_writes {
            return Err(sqlx::Error::Protocol("rating write refused".to_string()));
        }
        if let Some(style) = state.styles.iter_mut().find(|s| s.id == style_id) {
            style.average_rating = summary.average;
            style.review_count = summary.count;
        }
        Ok(())
    }
}

impl ReviewExt for MemoryDb {
    async fn get_style_reviews(&self, style_id: Uuid) -> Result<Vec<ReviewDto>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .newest_first(|r| r.style_id == style_id)
            .into_iter()
            .map(|(_, r)| state.with_author(r))
            .collect())
    }

    async fn get_reviews_for_styles(
        &self,
        style_ids: &[Uuid],
    ) -> Result<Vec<ReviewDto>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .newest_first(|r| style_ids.contains(&r.style_id))
            .into_iter()
            .map(|(_, r)| state.with_author(r))
            .collect())
    }

    async fn get_review(&self, review_id: Uuid) -> Result<Option<Review>, sqlx::Error> {
        Ok(self.review(review_id))
    }

    async fn get_user_review(
        &self,
        style_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReviewDto>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        if state.hide_existing_reviews {
            return Ok(None);
        }
        Ok(state
            .reviews
            .iter()
            .find(|(_, r)| r.style_id == style_id && r.user_id == user_id)
            .map(|(_, r)| state.with_author(r)))
    }

    async fn create_review(
        &self,
        style_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comment: &str,
    ) -> Result<ReviewDto, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state
            .reviews
            .iter()
            .any(|(_, r)| r.style_id == style_id && r.user_id == user_id)
        {
            return Err(unique_violation("reviews_style_user_key"));
        }

        let review = Review {
            id: Uuid::new_v4(),
            style_id,
            user_id,
            rating,
            comment: comment.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.seq += 1;
        let seq = state.seq;
        state.reviews.push((seq, review.clone()));
        Ok(state.with_author(&review))
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        rating: i32,
        comment: &str,
    ) -> Result<Option<ReviewDto>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let Some((_, review)) = state.reviews.iter_mut().find(|(_, r)| r.id == review_id) else {
            return Ok(None);
        };
        review.rating = rating;
        review.comment = comment.to_string();
        review.updated_at = Utc::now();
        let review = review.clone();
        Ok(Some(state.with_author(&review)))
    }

    async fn delete_review(&self, review_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let before = state.reviews.len();
        state.reviews.retain(|(_, r)| r.id != review_id);
        Ok(state.reviews.len() < before)
    }

    async fn get_rating_stats(&self, style_id: Uuid) -> Result<RatingStats, sqlx::Error> {
        let state = self.state.lock().unwrap();
        let ratings: Vec<i32> = state
            .reviews
            .iter()
            .filter(|(_, r)| r.style_id == style_id)
            .map(|(_, r)| r.rating)
            .collect();

        let count = ratings.len() as i64;
        let mean = (count > 0).then(|| ratings.iter().sum::<i32>() as f64 / count as f64);
        Ok(RatingStats { count, mean })
    }
}

/// Records every call; uploads can be made to fail.
#[derive(Default)]
pub struct FakeImageStore {
    pub calls: Mutex<Vec<String>>,
    pub fail_uploads: bool,
}

impl FakeImageStore {
    pub fn failing_uploads() -> Self {
        FakeImageStore {
            calls: Mutex::new(Vec::new()),
            fail_uploads: true,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageStore for FakeImageStore {
    async fn upload(&self, source: &str) -> Result<StoredImage, HttpError> {
        self.calls.lock().unwrap().push(format!("upload {}", source));
        if self.fail_uploads {
            return Err(HttpError::server_error(
                ErrorMessage::ServerError.to_string(),
            ));
        }
        Ok(StoredImage {
            public_id: format!("hijab-styles/{}", Uuid::new_v4()),
            url: format!("https://res.cloudinary.com/demo/{}", source),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), HttpError> {
        self.calls.lock().unwrap().push(format!("destroy {}", public_id));
        Ok(())
    }
}
