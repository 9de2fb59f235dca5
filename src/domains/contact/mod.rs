pub mod types;
pub mod service;
pub mod repository;

pub use types::{Contact, NewContact, UpdateContact};
pub use service::{ContactService, ContactServiceImpl};
pub use repository::{ContactRepository, SqliteContactRepository};
