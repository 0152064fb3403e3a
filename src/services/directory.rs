//! User directory service
//!
//! CRUD over the two account variants. Passwords arriving in create and
//! update requests are hashed here before they reach the repository.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{AdminUser, CreateAdmin, CreateStudent, StudentUser, UpdateUser},
    repository::Repository,
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct DirectoryService {
    repository: Repository,
}

impl DirectoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_admin(&self, school_id: &str) -> AppResult<AdminUser> {
        self.repository.users.get_admin(school_id).await
    }

    pub async fn get_student(&self, school_id: &str) -> AppResult<StudentUser> {
        self.repository.users.get_student(school_id).await
    }

    pub async fn list_admins(&self) -> AppResult<Vec<AdminUser>> {
        self.repository.users.list_admins().await
    }

    pub async fn list_students(&self) -> AppResult<Vec<StudentUser>> {
        self.repository.users.list_students().await
    }

    /// Register an administrator account
    pub async fn create_admin(&self, user: CreateAdmin) -> AppResult<AdminUser> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let hash = hash_password(&user.password)?;
        self.repository.users.create_admin(&user, &hash).await
    }

    /// Register a student account
    pub async fn create_student(&self, user: CreateStudent) -> AppResult<StudentUser> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let hash = hash_password(&user.password)?;
        self.repository.users.create_student(&user, &hash).await
    }

    /// Partial update of an administrator. The school id is immutable.
    pub async fn update_admin(&self, school_id: &str, update: UpdateUser) -> AppResult<AdminUser> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let hash = match &update.password {
            Some(p) => Some(hash_password(p)?),
            None => None,
        };
        self.repository
            .users
            .update_admin(school_id, &update, hash.as_deref())
            .await
    }

    /// Partial update of a student. The school id is immutable.
    pub async fn update_student(
        &self,
        school_id: &str,
        update: UpdateUser,
    ) -> AppResult<StudentUser> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let hash = match &update.password {
            Some(p) => Some(hash_password(p)?),
            None => None,
        };
        self.repository
            .users
            .update_student(school_id, &update, hash.as_deref())
            .await
    }

    /// Remove an administrator account
    pub async fn delete_admin(&self, school_id: &str) -> AppResult<()> {
        self.repository.users.delete_admin(school_id).await
    }

    /// Remove a student account. Ledger records that reference the student
    /// keep their school id as a dangling back-reference.
    pub async fn delete_student(&self, school_id: &str) -> AppResult<()> {
        self.repository.users.delete_student(school_id).await
    }
}
