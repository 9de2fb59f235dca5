pub mod types;
pub mod repository;
pub mod service;

pub use types::{NewSession, Session, SessionState, UpdateSession};
pub use repository::{SessionRepository, SqliteSessionRepository};
pub use service::{SessionService, SessionServiceImpl};
