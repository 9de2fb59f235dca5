pub mod types;
pub mod repository;
pub mod service;

pub use types::{Module, ModuleResponse, NewModule, UpdateModule};
pub use repository::{ModuleRepository, SqliteModuleRepository};
pub use service::{ModuleService, ModuleServiceImpl};
