use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::ConversationHistory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("username '{username}' already exists")]
    UsernameTaken { username: String },
    #[error("Incorrect password or User not found.")]
    InvalidCredentials,
    #[error("user '{username}' does not exist")]
    UnknownUser { username: String },
    #[error("user store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("user store at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyUsername => "Enter a username.".to_string(),
            Self::EmptyPassword => "Enter a password.".to_string(),
            Self::UsernameTaken { .. } => "Username already exists.".to_string(),
            Self::InvalidCredentials => "Incorrect password or User not found.".to_string(),
            Self::UnknownUser { username } => {
                format!("The account '{username}' no longer exists. Log in again.")
            }
            Self::Io { .. } => {
                "Could not read or write the user file. Check its path and permissions."
                    .to_string()
            }
            Self::Corrupt { .. } => {
                "The user file is damaged and could not be read.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub password: String,
    #[serde(default)]
    pub history: ConversationHistory,
}

/// Accounts keep their file order across rewrites.
type UserTable = IndexMap<String, UserRecord>;

/// Flat JSON file mapping each username to its password hash and chat history.
/// The whole table is read and rewritten on every operation.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn register(&self, username: &str, password: &str) -> Result<(), StoreError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(StoreError::EmptyUsername);
        }
        if password.trim().is_empty() {
            return Err(StoreError::EmptyPassword);
        }

        let mut users = self.load()?;
        if users.contains_key(username) {
            return Err(StoreError::UsernameTaken {
                username: username.to_string(),
            });
        }

        users.insert(
            username.to_string(),
            UserRecord {
                password: hash_password(password),
                history: ConversationHistory::new(),
            },
        );
        self.save(&users)?;
        info!(username, "registered user");
        Ok(())
    }

    /// Verifies credentials and returns the stored conversation history.
    pub fn login(&self, username: &str, password: &str) -> Result<ConversationHistory, StoreError> {
        let mut users = self.load()?;
        let record = users
            .swap_remove(username.trim())
            .filter(|record| record.password == hash_password(password))
            .ok_or(StoreError::InvalidCredentials)?;

        info!(username = username.trim(), messages = record.history.len(), "user logged in");
        Ok(record.history)
    }

    pub fn save_history(
        &self,
        username: &str,
        history: &ConversationHistory,
    ) -> Result<(), StoreError> {
        let mut users = self.load()?;
        let record = users
            .get_mut(username)
            .ok_or_else(|| StoreError::UnknownUser {
                username: username.to_string(),
            })?;
        record.history = history.clone();

        self.save(&users)?;
        debug!(username, messages = history.len(), "saved conversation history");
        Ok(())
    }

    fn load(&self) -> Result<UserTable, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(UserTable::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, users: &UserTable) -> Result<(), StoreError> {
        // serde_json's pretty printer indents with two spaces.
        let encoded = serde_json::to_string_pretty(users).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        fs::write(&self.path, encoded).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Lowercase hex SHA-256 digest of the password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
