pub mod types;
pub mod sequence;
pub mod repository;
pub mod service;

pub use types::{CloneEventRequest, Event, EventResponse, EventState, EventType, NewEvent, UpdateEvent};
pub use sequence::{CodeSequence, SqliteCodeSequence};
pub use repository::{EventRepository, SqliteEventRepository};
pub use service::{EventService, EventServiceImpl};
