#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use training_event_core::auth::AuthContext;
use training_event_core::config::Settings;
use training_event_core::domains::contact::NewContact;
use training_event_core::domains::event::{EventResponse, NewEvent};
use training_event_core::domains::module::{ModuleResponse, NewModule};
use training_event_core::domains::session::{NewSession, Session};
use training_event_core::domains::user::NewUser;
use training_event_core::types::UserRole;
use training_event_core::Services;
use uuid::Uuid;

/// Services over a fresh in-memory database.
pub async fn setup() -> Services {
    Services::connect(&Settings::in_memory())
        .await
        .expect("in-memory database")
}

pub fn admin() -> AuthContext {
    AuthContext::internal_system_context()
}

pub fn manager() -> AuthContext {
    AuthContext::new(Uuid::new_v4(), UserRole::Manager)
}

/// Register a user with `role` and return an auth context acting as them.
pub async fn user_with_role(services: &Services, name: &str, role: UserRole) -> AuthContext {
    let user = services
        .users
        .create_user(
            NewUser {
                name: name.to_string(),
                email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
                role,
            },
            &admin(),
        )
        .await
        .expect("user");
    AuthContext::new(user.id, role)
}

pub async fn trainer(services: &Services, name: &str) -> AuthContext {
    user_with_role(services, name, UserRole::Trainer).await
}

pub async fn contact(services: &Services, name: &str) -> Uuid {
    services
        .contacts
        .create_contact(
            NewContact {
                name: name.to_string(),
                email: Some(format!("{}@example.org", name.to_lowercase().replace(' ', "."))),
                phone: None,
                birthdate: None,
            },
            &admin(),
        )
        .await
        .expect("contact")
        .id
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

/// June 2025 at the given day and time.
pub fn at(d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, minute, 0).unwrap()
}

pub async fn event(services: &Services, name: &str, start: u32, end: u32) -> EventResponse {
    services
        .events
        .create_event(
            NewEvent {
                name: name.to_string(),
                event_type: Default::default(),
                date_start: day(start),
                date_end: day(end),
                state: Default::default(),
                notes: None,
            },
            &admin(),
        )
        .await
        .expect("event")
}

pub async fn module(services: &Services, event_id: Uuid, name: &str, sequence: i64) -> ModuleResponse {
    services
        .modules
        .create_module(
            NewModule {
                event_id,
                name: name.to_string(),
                description: Some(format!("{} description", name)),
                notes: None,
                sequence,
            },
            &admin(),
        )
        .await
        .expect("module")
}

pub fn new_session(module_id: Uuid, name: &str, start: NaiveDateTime, end: NaiveDateTime) -> NewSession {
    NewSession {
        module_id,
        name: name.to_string(),
        date_start: start,
        date_end: end,
        description: None,
        materials: None,
        notes: None,
        state: Default::default(),
        sequence: 10,
        trainer_ids: Vec::new(),
        attachment_ids: Vec::new(),
    }
}

pub async fn session(
    services: &Services,
    module_id: Uuid,
    name: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Session {
    services
        .sessions
        .create_session(new_session(module_id, name, start, end), &admin())
        .await
        .expect("session")
}
