//! Compiled-in server configuration
//!
//! Nothing here is read from the environment or from files.

/// Address the HTTP listener binds to
pub const BIND_ADDRESS: &str = "127.0.0.1:5050";

/// SQLite database file, relative to the working directory
pub const DATABASE_PATH: &str = "tickets.db";

/// The only origin allowed to make cross-origin requests
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub database_path: String,
    pub allowed_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: BIND_ADDRESS.to_string(),
            database_path: DATABASE_PATH.to_string(),
            allowed_origin: ALLOWED_ORIGIN.to_string(),
        }
    }
}
