// Account Service - Core Library
// Exposes all modules for use in the API server, the admin CLI, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod routes;

// Re-export commonly used types
pub use config::{AppConfig, LogFormat};
pub use db::{
    all_accounts, count_accounts, create_account, delete_account, find_account, open_database,
    reset_database, setup_database, update_account,
};
pub use entities::{Account, AccountPatch, NewAccount};
pub use error::{Error, Result};
pub use routes::{check_content_type, create_router, AppState};

/// Name reported by the index endpoint
pub const SERVICE_NAME: &str = "Account REST API Service";

/// API version reported by the index endpoint
pub const API_VERSION: &str = "1.0";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
