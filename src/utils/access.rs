use crate::models::{Review, User, UserRole};

/// Whether `requester` may update or delete `review`: its author or an admin.
pub fn can_mutate_review(review: &Review, requester: &User) -> bool {
    review.user_id == requester.id || requester.role == UserRole::Admin
}
