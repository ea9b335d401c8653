use crate::models::{ReviewWithAuthor, Style, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;
use validator::Validate;

// DTOs define what crosses the HTTP boundary. Request DTOs reject unknown
// fields so malformed shapes never reach the service layer.

// ============================================================================
// Response envelopes
// ============================================================================

/// `{ "success": true, "count"?: n, "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        ApiResponse {
            success: true,
            count: None,
            data,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        ApiResponse {
            success: true,
            count: Some(data.len()),
            data,
        }
    }
}

/// Serializes as `{}`; returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct EmptyData {}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Authentication DTOs
// ============================================================================

#[derive(Validate, Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(
        min = 6,
        max = 64,
        message = "Password must be between 6 and 64 characters"
    ))]
    pub password: String,
}

impl RegisterUserDto {
    /// Trim the name; emails are matched case-insensitively.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self
    }
}

#[derive(Validate, Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginUserDto {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self
    }
}

/// Body of the admin block toggle. An empty reason is only accepted when
/// the target is already blocked (the call then unblocks).
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockUserDto {
    #[serde(default)]
    pub reason: String,
}

/// User data safe to send to clients (no password hash).
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "isBlocked")]
    pub is_blocked: bool,
    #[serde(rename = "blockedReason")]
    pub blocked_reason: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            role: user.role.to_str().to_string(),
            is_blocked: user.is_blocked,
            blocked_reason: user.blocked_reason.to_owned(),
            created_at: user.created_at,
        }
    }

    pub fn filter_users(users: &[User]) -> Vec<FilterUserDto> {
        users.iter().map(FilterUserDto::filter_user).collect()
    }
}

/// Login success: the token is also set as an http-only cookie.
#[derive(Debug, Serialize)]
pub struct UserLoginResponseDto {
    pub success: bool,
    pub token: String,
    pub user: FilterUserDto,
}

// ============================================================================
// Style DTOs
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateStyleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name is required and cannot exceed 100 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 500,
        message = "Description is required and cannot exceed 500 characters"
    ))]
    pub description: String,

    /// Remote URL or base64 data URI handed to the image store.
    #[validate(length(min = 1, message = "Please add an image"))]
    pub image: String,
}

impl CreateStyleDto {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self
    }
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateStyleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name cannot be empty or exceed 100 characters"
    ))]
    pub name: Option<String>,

    #[validate(length(
        min = 1,
        max = 500,
        message = "Description cannot be empty or exceed 500 characters"
    ))]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "Image cannot be empty"))]
    pub image: Option<String>,
}

impl UpdateStyleDto {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self.description = self.description.map(|d| d.trim().to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageDto {
    #[serde(rename = "publicId")]
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct StyleDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: ImageDto,
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub reviews: Vec<ReviewDto>,
}

impl StyleDto {
    pub fn from_parts(style: Style, reviews: Vec<ReviewDto>) -> Self {
        StyleDto {
            id: style.id,
            name: style.name,
            description: style.description,
            image: ImageDto {
                public_id: style.image_public_id,
                url: style.image_url,
            },
            average_rating: style.average_rating,
            review_count: style.review_count,
            created_at: style.created_at,
            reviews,
        }
    }
}

// ============================================================================
// Review DTOs
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InputReviewDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[serde(deserialize_with = "deserialize_rating")]
    pub rating: i32,

    #[validate(length(
        min = 10,
        max = 500,
        message = "Comment must be between 10 and 500 characters"
    ))]
    pub comment: String,
}

impl InputReviewDto {
    pub fn normalized(mut self) -> Self {
        self.comment = self.comment.trim().to_string();
        self
    }
}

/// Accepts `4`, `4.0` or `"4"`. Fractional values fail to deserialize.
fn deserialize_rating<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRating {
        Number(f64),
        Text(String),
    }

    let not_an_integer = || <D::Error as de::Error>::custom("Rating must be an integer");

    match RawRating::deserialize(deserializer) {
        Ok(RawRating::Number(rating))
            if rating.fract() == 0.0
                && rating >= f64::from(i32::MIN)
                && rating <= f64::from(i32::MAX) =>
        {
            Ok(rating as i32)
        }
        Ok(RawRating::Number(_)) => Err(not_an_integer()),
        Ok(RawRating::Text(text)) => text.trim().parse::<i32>().map_err(|_| not_an_integer()),
        Err(_) => Err(not_an_integer()),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewAuthorDto {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewDto {
    pub id: Uuid,
    #[serde(rename = "styleId")]
    pub style_id: Uuid,
    pub user: ReviewAuthorDto,
    pub rating: i32,
    pub comment: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<ReviewWithAuthor> for ReviewDto {
    fn from(row: ReviewWithAuthor) -> Self {
        ReviewDto {
            id: row.id,
            style_id: row.style_id,
            user: ReviewAuthorDto {
                id: row.user_id,
                name: row.user_name,
            },
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_accepts_integer_and_numeric_string() {
        let body: InputReviewDto =
            serde_json::from_str(r#"{"rating": 4, "comment": "Lovely drape all day"}"#).unwrap();
        assert_eq!(body.rating, 4);

        let body: InputReviewDto =
            serde_json::from_str(r#"{"rating": "5", "comment": "Lovely drape all day"}"#)
                .unwrap();
        assert_eq!(body.rating, 5);
    }

    #[test]
    fn rating_accepts_whole_float() {
        let body: InputReviewDto =
            serde_json::from_str(r#"{"rating": 4.0, "comment": "Lovely drape all day"}"#)
                .unwrap();
        assert_eq!(body.rating, 4);
    }

    #[test]
    fn rating_rejects_fractions_and_words() {
        assert!(
            serde_json::from_str::<InputReviewDto>(
                r#"{"rating": 4.5, "comment": "Lovely drape all day"}"#
            )
            .is_err()
        );
        assert!(
            serde_json::from_str::<InputReviewDto>(
                r#"{"rating": "five", "comment": "Lovely drape all day"}"#
            )
            .is_err()
        );
    }

    #[test]
    fn review_body_rejects_unknown_fields() {
        let result = serde_json::from_str::<InputReviewDto>(
            r#"{"rating": 4, "comment": "Lovely drape all day", "userId": "x"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn comment_length_is_checked_after_trimming() {
        let body = InputReviewDto {
            rating: 3,
            comment: "   short     ".to_string(),
        }
        .normalized();
        assert!(body.validate().is_err());

        let body = InputReviewDto {
            rating: 3,
            comment: "  exactly ten  ".to_string(),
        }
        .normalized();
        assert_eq!(body.comment, "exactly ten");
        assert!(body.validate().is_ok());
    }

    #[test]
    fn comment_over_500_characters_is_rejected() {
        let body = InputReviewDto {
            rating: 3,
            comment: "a".repeat(501),
        };
        assert!(body.validate().is_err());

        let body = InputReviewDto {
            rating: 3,
            comment: "a".repeat(500),
        };
        assert!(body.validate().is_ok());
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        for rating in [0, 6, -1] {
            let body = InputReviewDto {
                rating,
                comment: "Perfectly fine comment".to_string(),
            };
            assert!(body.validate().is_err(), "rating {} accepted", rating);
        }
    }

    #[test]
    fn style_update_validates_only_present_fields() {
        let body: UpdateStyleDto = serde_json::from_str(r#"{"name": "Modern Wrap"}"#).unwrap();
        assert!(body.validate().is_ok());
        assert!(body.image.is_none());

        let body: UpdateStyleDto = serde_json::from_str(r#"{"name": "   "}"#).unwrap();
        assert!(body.normalized().validate().is_err());
    }

    #[test]
    fn list_envelope_carries_count() {
        let json = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 3);

        let json = serde_json::to_value(ApiResponse::new(EmptyData {})).unwrap();
        assert!(json.get("count").is_none());
        assert_eq!(json["data"], serde_json::json!({}));
    }
}
