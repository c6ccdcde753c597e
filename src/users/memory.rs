//! In-memory `UserStore` used by service and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, ProfileChanges, User},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    fn find<F>(&self, pred: F) -> Result<Option<User>, StoreError>
    where
        F: Fn(&User) -> bool,
    {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| pred(u)).cloned())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find(|u| u.username == username)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find(|u| u.email == email)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.find(|u| u.token.as_deref() == Some(token))
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("Username"));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("Email"));
        }
        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            token: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn update_profile(
        &self,
        username: &str,
        changes: ProfileChanges,
    ) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &changes.email {
            if users.iter().any(|u| &u.email == email && u.username != username) {
                return Err(StoreError::Duplicate("Email"));
            }
        }
        let user = users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        Ok(user.clone())
    }

    async fn set_token(&self, username: &str, token: Option<&str>) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.username == username) {
            user.token = token.map(str::to_owned);
        }
        Ok(())
    }
}
