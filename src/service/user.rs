use uuid::Uuid;

use crate::db::UserExt;
use crate::error::{ErrorMessage, HttpError, db_failure};
use crate::models::User;

/// Decide the new `(is_blocked, blocked_reason)` for a block toggle.
///
/// A blocked target is unblocked and its reason cleared. An unblocked
/// target is blocked, which needs a non-empty reason.
pub fn next_block_state(
    target: &User,
    requester: &User,
    reason: &str,
) -> Result<(bool, String), HttpError> {
    if target.id == requester.id {
        return Err(HttpError::bad_request(
            ErrorMessage::CannotBlockSelf.to_string(),
        ));
    }

    if target.is_blocked {
        return Ok((false, String::new()));
    }

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(HttpError::bad_request(
            ErrorMessage::BlockReasonRequired.to_string(),
        ));
    }

    Ok((true, reason.to_string()))
}

/// Block or unblock `user_id` on behalf of an admin.
pub async fn toggle_block<D>(
    db: &D,
    user_id: Uuid,
    requester: &User,
    reason: &str,
) -> Result<User, HttpError>
where
    D: UserExt,
{
    let target = db
        .get_user_by_id(user_id)
        .await
        .map_err(db_failure("getting user"))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    let (is_blocked, reason) = next_block_state(&target, requester, reason)?;

    // the user may have been deleted since the lookup
    db.set_user_block(user_id, is_blocked, &reason)
        .await
        .map_err(db_failure("updating user block"))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::service::testing::MemoryDb;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn blocking_requires_a_reason() {
        let db = MemoryDb::default();
        let admin = db.insert_user("Admin User", UserRole::Admin);
        let target = db.insert_user("Ayesha Khan", UserRole::User);

        let err = toggle_block(&db, target.id, &admin, "   ").await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, ErrorMessage::BlockReasonRequired.to_string());

        let user = toggle_block(&db, target.id, &admin, " Spam reviews ")
            .await
            .unwrap();
        assert!(user.is_blocked);
        assert_eq!(user.blocked_reason, "Spam reviews");
    }

    #[tokio::test]
    async fn blocked_user_is_unblocked_and_reason_cleared() {
        let db = MemoryDb::default();
        let admin = db.insert_user("Admin User", UserRole::Admin);
        let target = db.insert_user("Ayesha Khan", UserRole::User);

        toggle_block(&db, target.id, &admin, "Spam reviews")
            .await
            .unwrap();
        let user = toggle_block(&db, target.id, &admin, "").await.unwrap();

        assert!(!user.is_blocked);
        assert!(user.blocked_reason.is_empty());
    }

    #[tokio::test]
    async fn admin_cannot_block_self() {
        let db = MemoryDb::default();
        let admin = db.insert_user("Admin User", UserRole::Admin);

        let err = toggle_block(&db, admin.id, &admin, "testing")
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, ErrorMessage::CannotBlockSelf.to_string());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let db = MemoryDb::default();
        let admin = db.insert_user("Admin User", UserRole::Admin);

        let err = toggle_block(&db, Uuid::new_v4(), &admin, "Spam reviews")
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn user_deleted_before_the_write_is_not_found() {
        let db = MemoryDb::default();
        let admin = db.insert_user("Admin User", UserRole::Admin);
        let target = db.insert_user("Ayesha Khan", UserRole::User);
        db.drop_users_before_block(true);

        let err = toggle_block(&db, target.id, &admin, "Spam reviews")
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, ErrorMessage::UserNotFound.to_string());
    }
}
