use gigfind_db::models::{UserCredentials, UserRow};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::Marketplace;

impl Marketplace {
    /// Register a new account. The password must already be hashed.
    pub fn register_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> DomainResult<UserRow> {
        match self.db.create_user(email, password_hash, name)? {
            Some(user) => {
                debug!("Registered user {}", user.id);
                Ok(user)
            }
            None => Err(DomainError::conflict("Email already registered")),
        }
    }

    pub fn user(&self, id: Uuid) -> DomainResult<UserRow> {
        self.db
            .get_user_by_id(id)?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    pub fn find_user_by_email(&self, email: &str) -> DomainResult<Option<UserRow>> {
        Ok(self.db.find_user_by_email(email)?)
    }

    /// Credential lookup for login; the only path that exposes the hash.
    pub fn user_credentials_by_email(&self, email: &str) -> DomainResult<Option<UserCredentials>> {
        Ok(self.db.find_user_credentials_by_email(email)?)
    }
}
