use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::ErrorMessage;

/// Upper bound in bytes; argon2 is deliberately slow, long inputs are a DoS vector.
pub const MAX_PASSWORD_LENGTH: usize = 64;

/// Hash with Argon2id and a fresh random salt.
///
/// The PHC string (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`) embeds
/// the salt and parameters, so it is the only thing stored.
pub fn hash(password: impl Into<String>) -> Result<String, ErrorMessage> {
    let password = password.into();
    check_length(&password)?;

    let salt = SaltString::generate(&mut OsRng);

    let hashed_password = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| ErrorMessage::HashingError)?
        .to_string();

    Ok(hashed_password)
}

/// Constant-time check of `password` against a stored PHC string.
pub fn compare(password: &str, hashed_password: &str) -> Result<bool, ErrorMessage> {
    check_length(password)?;

    let parsed_hash =
        PasswordHash::new(hashed_password).map_err(|_| ErrorMessage::InvalidHashFormat)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn check_length(password: &str) -> Result<(), ErrorMessage> {
    if password.is_empty() {
        return Err(ErrorMessage::EmptyPassword);
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ErrorMessage::ExceededMaxPasswordLength(MAX_PASSWORD_LENGTH));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_compare() {
        let hashed = hash("Password123!").unwrap();
        assert!(hashed.starts_with("$argon2id$"));
        assert!(compare("Password123!", &hashed).unwrap());
        assert!(!compare("Password124!", &hashed).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash("Password123!").unwrap(), hash("Password123!").unwrap());
    }

    #[test]
    fn empty_and_oversized_passwords_are_rejected() {
        assert_eq!(hash(""), Err(ErrorMessage::EmptyPassword));
        assert_eq!(
            hash("a".repeat(MAX_PASSWORD_LENGTH + 1)),
            Err(ErrorMessage::ExceededMaxPasswordLength(MAX_PASSWORD_LENGTH))
        );
    }

    #[test]
    fn malformed_hash_is_reported() {
        assert_eq!(
            compare("Password123!", "not-a-phc-string"),
            Err(ErrorMessage::InvalidHashFormat)
        );
    }
}
