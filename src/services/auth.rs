//! Authentication service
//!
//! Credentials are checked against both directories: an email can belong
//! to an administrator or a student, and the matching variant decides the
//! role carried in the session token. Passwords are stored as Argon2
//! hashes, never as plain text.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
    repository::Repository,
};

/// Hash a password with Argon2id and a fresh random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password, returning a signed session
    /// token and the matched account. Admin accounts are checked first;
    /// a failed lookup and a failed password check are indistinguishable
    /// to the caller.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self.find_by_email(email).await?;

        let user = match user {
            Some(u) if verify_password(password, u.password_hash()) => u,
            _ => {
                tracing::info!(email = %email, "rejected login attempt");
                return Err(AppError::Authentication(
                    "Invalid email or password".to_string(),
                ));
            }
        };

        let claims = UserClaims::new(
            user.school_id().to_string(),
            user.name().to_string(),
            user.role(),
            self.config.jwt_expiration_hours,
        );
        let token = claims.create_token(&self.config.jwt_secret)?;

        tracing::info!(school_id = %user.school_id(), role = %user.role(), "login");
        Ok((token, user))
    }

    /// Fetch the account behind a set of session claims
    pub async fn current_user(&self, claims: &UserClaims) -> AppResult<User> {
        if claims.is_admin() {
            Ok(User::Admin(self.repository.users.get_admin(&claims.sub).await?))
        } else {
            Ok(User::Student(self.repository.users.get_student(&claims.sub).await?))
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        if let Some(admin) = self.repository.users.find_admin_by_email(email).await? {
            return Ok(Some(User::Admin(admin)));
        }
        if let Some(student) = self.repository.users.find_student_by_email(email).await? {
            return Ok(Some(User::Student(student)));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("libra-pass").unwrap();
        assert_ne!(hash, "libra-pass");
        assert!(verify_password("libra-pass", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }
}
