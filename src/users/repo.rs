use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::repo_types::{NewUser, ProfileChanges, User};

const USER_COLUMNS: &str = "id, name, username, email, password_hash, token, created_at";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique column (`"Username"` or `"Email"`) already holds the value.
    #[error("{0} already registered")]
    Duplicate(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistent system of record for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError>;
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    /// Applies the provided subset of changes and returns the updated row.
    async fn update_profile(&self, username: &str, changes: ProfileChanges)
        -> Result<User, StoreError>;
    /// Sets or clears (`None`) the session token.
    async fn set_token(&self, username: &str, token: Option<&str>) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // PostgreSQL unique_violation
        if db_err.code().as_deref() == Some("23505") {
            let field = match db_err.constraint() {
                Some(c) if c.contains("email") => "Email",
                _ => "Username",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one("email", email).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.find_one("token", token).await
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (name, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(map_unique_violation)
    }

    async fn update_profile(
        &self,
        username: &str,
        changes: ProfileChanges,
    ) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash)
            WHERE username = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(map_unique_violation)
    }

    async fn set_token(&self, username: &str, token: Option<&str>) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET token = $2 WHERE username = $1")
            .bind(username)
            .bind(token)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
