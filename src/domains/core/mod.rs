pub mod repository;

// Re-export the core traits
pub use repository::{FindById, HardDeletable};
