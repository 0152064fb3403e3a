//! User directory repository for database operations
//!
//! Administrators and students live in separate tables; every operation is
//! explicit about which variant it touches. A school id is only checked for
//! uniqueness within its own table.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{AdminUser, CreateAdmin, CreateStudent, StudentUser, UpdateUser},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get admin by school id
    pub async fn get_admin(&self, school_id: &str) -> AppResult<AdminUser> {
        sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE school_id = $1")
            .bind(school_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Admin {} not found", school_id)))
    }

    /// Get student by school id
    pub async fn get_student(&self, school_id: &str) -> AppResult<StudentUser> {
        sqlx::query_as::<_, StudentUser>("SELECT * FROM student_users WHERE school_id = $1")
            .bind(school_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", school_id)))
    }

    /// Look up an admin by email for authentication
    pub async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<AdminUser>> {
        let user = sqlx::query_as::<_, AdminUser>(
            "SELECT * FROM admin_users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Look up a student by email for authentication
    pub async fn find_student_by_email(&self, email: &str) -> AppResult<Option<StudentUser>> {
        let user = sqlx::query_as::<_, StudentUser>(
            "SELECT * FROM student_users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List all admins
    pub async fn list_admins(&self) -> AppResult<Vec<AdminUser>> {
        let users = sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// List all students
    pub async fn list_students(&self) -> AppResult<Vec<StudentUser>> {
        let users = sqlx::query_as::<_, StudentUser>("SELECT * FROM student_users ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Count registered students
    pub async fn count_students(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM student_users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Create a new admin. `password_hash` must already be hashed.
    pub async fn create_admin(&self, user: &CreateAdmin, password_hash: &str) -> AppResult<AdminUser> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM admin_users WHERE school_id = $1)",
        )
        .bind(&user.school_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(AppError::Duplicate(format!(
                "Admin with school id {} already exists",
                user.school_id
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO admin_users (school_id, name, email, contact_no, password)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.school_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.contact_no)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        self.get_admin(&user.school_id).await
    }

    /// Create a new student. `password_hash` must already be hashed.
    pub async fn create_student(
        &self,
        user: &CreateStudent,
        password_hash: &str,
    ) -> AppResult<StudentUser> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM student_users WHERE school_id = $1)",
        )
        .bind(&user.school_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(AppError::Duplicate(format!(
                "Student with school id {} already exists",
                user.school_id
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO student_users (school_id, grade_section, name, email, contact_no, password)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&user.school_id)
        .bind(&user.grade_section)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.contact_no)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        self.get_student(&user.school_id).await
    }

    /// Partial update of an admin by school id
    pub async fn update_admin(
        &self,
        school_id: &str,
        update: &UpdateUser,
        password_hash: Option<&str>,
    ) -> AppResult<AdminUser> {
        let current = self.get_admin(school_id).await?;

        sqlx::query(
            r#"
            UPDATE admin_users
            SET name = $1, email = $2, contact_no = $3, password = $4
            WHERE school_id = $5
            "#,
        )
        .bind(update.name.as_deref().unwrap_or(&current.name))
        .bind(update.email.as_deref().unwrap_or(&current.email))
        .bind(update.contact_no.as_deref().or(current.contact_no.as_deref()))
        .bind(password_hash.unwrap_or(&current.password))
        .bind(school_id)
        .execute(&self.pool)
        .await?;

        self.get_admin(school_id).await
    }

    /// Partial update of a student by school id
    pub async fn update_student(
        &self,
        school_id: &str,
        update: &UpdateUser,
        password_hash: Option<&str>,
    ) -> AppResult<StudentUser> {
        let current = self.get_student(school_id).await?;

        sqlx::query(
            r#"
            UPDATE student_users
            SET grade_section = $1, name = $2, email = $3, contact_no = $4, password = $5
            WHERE school_id = $6
            "#,
        )
        .bind(update.grade_section.as_deref().or(current.grade_section.as_deref()))
        .bind(update.name.as_deref().unwrap_or(&current.name))
        .bind(update.email.as_deref().unwrap_or(&current.email))
        .bind(update.contact_no.as_deref().or(current.contact_no.as_deref()))
        .bind(password_hash.unwrap_or(&current.password))
        .bind(school_id)
        .execute(&self.pool)
        .await?;

        self.get_student(school_id).await
    }

    /// Delete an admin. Idempotent: deleting an absent id is not an error.
    pub async fn delete_admin(&self, school_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM admin_users WHERE school_id = $1")
            .bind(school_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a student. Idempotent: deleting an absent id is not an error.
    pub async fn delete_student(&self, school_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM student_users WHERE school_id = $1")
            .bind(school_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
