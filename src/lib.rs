//! Training event core: events, modules, sessions and participants with
//! schedule validation, event cloning and xlsx reporting over SQLite.

// Public modules
pub mod auth;
pub mod config;
pub mod database;
pub mod domains;
pub mod errors;
pub mod ffi;
pub mod globals;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

pub use config::Settings;
pub use globals::Services;

/// Initialize the library: open and migrate the database, then wire the services.
/// This function must be called before any other function in the library.
pub async fn initialize(settings: Settings) -> ffi::FFIResult<()> {
    globals::initialize(&settings).await
}

/// Install `env_logger`. `RUST_LOG` wins over `default_level` when set.
/// Repeated calls are ignored.
pub fn init_logging(default_level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}

/// Get a reference to the SQLite connection pool
/// This is primarily for internal use
pub fn get_db_pool() -> ffi::FFIResult<sqlx::SqlitePool> {
    globals::get_db_pool()
}
