pub mod types;
pub mod service;
pub mod repository;

// Re-export main items for other domains to use
pub use types::{NewUser, User};
pub use service::{UserService, UserServiceImpl};
pub use repository::{SqliteUserRepository, UserRepository};
