pub mod attachment;
pub mod contact;
pub mod core;
pub mod event;
pub mod export;
pub mod module;
pub mod participant;
pub mod permission;
pub mod schedule;
pub mod session;
pub mod user;

pub use event::{EventService, EventServiceImpl};
pub use session::{SessionService, SessionServiceImpl};
