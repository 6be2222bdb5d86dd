//! Environment configuration module
//!
//! Settings for the external collaborators, loaded from the environment
//! (optionally seeded from a `.env` file by `main`). The two FileMaker
//! session tokens are runtime state owned by the directory implementation
//! and are intentionally not read here.

use std::env;

/// Connection settings read from the environment
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Document store connection string (`MONGODB_URI`)
    pub mongodb_uri: Option<String>,
    /// Data API username (`ML_USER_FILEMAKER_USERNAME`)
    pub filemaker_username: Option<String>,
    /// Data API password (`ML_USER_FILEMAKER_PASSWORD`)
    pub filemaker_password: Option<String>,
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Self {
        Self {
            mongodb_uri: env::var("MONGODB_URI").ok(),
            filemaker_username: env::var("ML_USER_FILEMAKER_USERNAME").ok(),
            filemaker_password: env::var("ML_USER_FILEMAKER_PASSWORD").ok(),
        }
    }

    /// Whether a document store connection is configured.
    pub fn has_store_connection(&self) -> bool {
        self.mongodb_uri.as_deref().map(|uri| !uri.is_empty()).unwrap_or(false)
    }
}
