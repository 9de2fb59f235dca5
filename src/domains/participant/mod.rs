pub mod types;
pub mod repository;
pub mod service;

pub use types::{NewParticipant, Participant, ParticipantRole, UpdateParticipant};
pub use repository::{ParticipantRepository, SqliteParticipantRepository};
pub use service::{ParticipantService, ParticipantServiceImpl};
