//! User model and related types
//!
//! The directory holds two disjoint account kinds keyed by school id:
//! administrators and students. They share the identity and contact payload
//! but live in separate tables; a school id is only unique within its own
//! variant. The variants are modeled as a tagged enum rather than a class
//! hierarchy.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Account role (tag of the user variant)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Student => "student",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "student" => Ok(UserRole::Student),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// Administrator account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AdminUser {
    pub school_id: String,
    pub name: String,
    pub email: String,
    pub contact_no: Option<String>,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
}

/// Student account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentUser {
    pub school_id: String,
    pub grade_section: Option<String>,
    pub name: String,
    pub email: String,
    pub contact_no: Option<String>,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
}

/// A directory account of either variant
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum User {
    Admin(AdminUser),
    Student(StudentUser),
}

impl User {
    pub fn school_id(&self) -> &str {
        match self {
            User::Admin(a) => &a.school_id,
            User::Student(s) => &s.school_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            User::Admin(a) => &a.name,
            User::Student(s) => &s.name,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            User::Admin(a) => &a.password,
            User::Student(s) => &s.password,
        }
    }

    pub fn role(&self) -> UserRole {
        match self {
            User::Admin(_) => UserRole::Admin,
            User::Student(_) => UserRole::Student,
        }
    }
}

/// Create admin request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdmin {
    #[validate(length(min = 1, message = "School id must not be empty"))]
    pub school_id: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub contact_no: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// Create student request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudent {
    #[validate(length(min = 1, message = "School id must not be empty"))]
    pub school_id: String,
    pub grade_section: Option<String>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub contact_no: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// Update request for either variant. All fields except the school id are
/// mutable; omitted fields keep their stored value. `grade_section` is
/// ignored for administrators.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub grade_section: Option<String>,
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub contact_no: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// School id of the authenticated account
    pub sub: String,
    pub name: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Build claims for a fresh session expiring after `expiration_hours`
    pub fn new(school_id: String, name: String, role: UserRole, expiration_hours: i64) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: school_id,
            name,
            role,
            exp: (now + chrono::Duration::hours(expiration_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Require librarian (admin) privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Require a student account
    pub fn require_student(&self) -> Result<(), AppError> {
        if self.role == UserRole::Student {
            Ok(())
        } else {
            Err(AppError::Authorization("Student account required".to_string()))
        }
    }
}
