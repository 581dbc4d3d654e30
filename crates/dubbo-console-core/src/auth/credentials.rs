use tracing::warn;

use crate::storage::{KeyValueStorage, StorageError};

/// Storage key holding the session token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the logged-in username
pub const USERNAME_KEY: &str = "usernameKey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
}

/// Durable home of the session token and username.
///
/// Build one per application and share it (`Arc<CredentialStore>`) with the
/// API client and the navigation guard. The two keys are independent:
/// either may be present without the other.
pub struct CredentialStore {
    storage: Box<dyn KeyValueStorage>,
}

impl CredentialStore {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Store the session token. No validation is performed.
    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, token)
    }

    /// The stored session token, or an empty string if there is none
    pub fn get_token(&self) -> String {
        self.read(TOKEN_KEY)
    }

    /// Delete the session token. Removing an absent token is a no-op.
    pub fn remove_token(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY)
    }

    pub fn set_username(&self, username: &str) -> Result<(), StorageError> {
        self.storage.set_item(USERNAME_KEY, username)
    }

    /// The stored username, or an empty string if there is none
    pub fn get_username(&self) -> String {
        self.read(USERNAME_KEY)
    }

    pub fn remove_username(&self) -> Result<(), StorageError> {
        self.storage.remove_item(USERNAME_KEY)
    }

    pub fn has_token(&self) -> bool {
        !self.get_token().is_empty()
    }

    pub fn auth_state(&self) -> AuthState {
        if self.has_token() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Forget both the token and the username.
    /// Both removals are attempted even if the first fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let token = self.remove_token();
        let username = self.remove_username();
        token.and(username)
    }

    /// Reads never fail: an unreadable backend counts as "nothing stored"
    fn read(&self, key: &str) -> String {
        match self.storage.get_item(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read credential storage");
                String::new()
            }
        }
    }
}
