pub mod types;
pub mod service;
pub mod repository;

pub use types::{Attachment, NewAttachment};
pub use service::{AttachmentService, AttachmentServiceImpl};
pub use repository::{AttachmentRepository, SqliteAttachmentRepository};
