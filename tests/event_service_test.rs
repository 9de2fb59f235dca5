mod common;

use common::*;
use training_event_core::domains::event::{EventState, NewEvent, UpdateEvent};
use training_event_core::domains::module::UpdateModule;
use training_event_core::domains::participant::{NewParticipant, ParticipantRole};
use training_event_core::domains::session::UpdateSession;
use training_event_core::errors::{ServiceError, ValidationError};
use training_event_core::types::PaginationParams;

#[tokio::test]
async fn test_codes_are_sequential_and_state_defaults_to_draft() {
    let services = setup().await;

    let first = event(&services, "First aid", 2, 4).await;
    let second = event(&services, "Fire safety", 9, 9).await;

    assert_eq!(first.code, "EVT/00001");
    assert_eq!(second.code, "EVT/00002");
    assert_eq!(first.state, EventState::Draft);
    assert_eq!(first.calendar_color, "gray");
    assert_eq!(first.duration_days, 3);
    assert_eq!(second.duration_days, 1);
}

#[tokio::test]
async fn test_inverted_dates_are_rejected() {
    let services = setup().await;

    let err = services
        .events
        .create_event(
            NewEvent {
                name: "Backwards".to_string(),
                event_type: Default::default(),
                date_start: day(10),
                date_end: day(9),
                state: Default::default(),
                notes: None,
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Interval { .. })));

    let created = event(&services, "Forwards", 2, 3).await;
    let err = services
        .events
        .update_event(
            created.id,
            UpdateEvent {
                date_end: Some(day(1)),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Interval { .. })));
}

#[tokio::test]
async fn test_update_recomputes_duration_and_keeps_code() {
    let services = setup().await;
    let created = event(&services, "Leadership", 2, 3).await;

    let updated = services
        .events
        .update_event(
            created.id,
            UpdateEvent {
                date_end: Some(day(6)),
                state: Some(EventState::Closed),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();

    assert_eq!(updated.code, created.code);
    assert_eq!(updated.duration_days, 5);
    assert_eq!(updated.state, EventState::Closed);
    assert_eq!(updated.calendar_color, "dark-gray");
}

#[tokio::test]
async fn test_counts_ignore_archived_records() {
    let services = setup().await;
    let created = event(&services, "Counting", 2, 3).await;
    let kept = module(&services, created.id, "Kept", 10).await;
    let archived = module(&services, created.id, "Archived", 20).await;

    session(&services, kept.id, "One", at(2, 9, 0), at(2, 10, 0)).await;
    let two = session(&services, kept.id, "Two", at(2, 10, 0), at(2, 11, 0)).await;
    session(&services, archived.id, "Hidden", at(3, 9, 0), at(3, 10, 0)).await;

    let contact_id = contact(&services, "Ana Silva").await;
    let participant = services
        .participants
        .create_participant(
            NewParticipant {
                contact_id,
                role: ParticipantRole::Student,
                user_id: None,
                notes: None,
            },
            &admin(),
        )
        .await
        .unwrap();
    services
        .events
        .add_participant(created.id, participant.id, &admin())
        .await
        .unwrap();

    let response = services.events.get_event(created.id, &admin()).await.unwrap();
    assert_eq!(response.module_count, 2);
    assert_eq!(response.session_count, 3);
    assert_eq!(response.participant_count, 1);

    services
        .modules
        .update_module(
            archived.id,
            UpdateModule {
                active: Some(false),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();
    services
        .sessions
        .update_session(
            two.id,
            UpdateSession {
                active: Some(false),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();

    let response = services.events.get_event(created.id, &admin()).await.unwrap();
    assert_eq!(response.module_count, 1);
    assert_eq!(response.session_count, 1);
}

#[tokio::test]
async fn test_delete_cascades_to_modules_and_sessions() {
    let services = setup().await;
    let created = event(&services, "Short lived", 2, 2).await;
    let kept_module = module(&services, created.id, "Only", 10).await;
    let only = session(&services, kept_module.id, "Only", at(2, 9, 0), at(2, 10, 0)).await;

    services.events.delete_event(created.id, &admin()).await.unwrap();

    assert!(services.modules.get_module(kept_module.id, &admin()).await.is_err());
    assert!(services.sessions.get_session(only.id, &admin()).await.is_err());
}

#[tokio::test]
async fn test_listing_orders_by_start_descending() {
    let services = setup().await;
    event(&services, "Early", 2, 2).await;
    event(&services, "Late", 20, 21).await;
    event(&services, "Middle", 10, 10).await;

    let page = services
        .events
        .list_events(PaginationParams::default(), false, &admin())
        .await
        .unwrap();
    let names: Vec<&str> = page.items.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Late", "Middle", "Early"]);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn test_trainer_only_sees_events_with_assigned_sessions() {
    let services = setup().await;
    let coach = trainer(&services, "Teo Trainer").await;

    let taught = event(&services, "Taught", 2, 2).await;
    let other = event(&services, "Other", 3, 3).await;
    let taught_module = module(&services, taught.id, "M", 10).await;
    let other_module = module(&services, other.id, "M", 10).await;

    let mut assigned = new_session(taught_module.id, "Assigned", at(2, 9, 0), at(2, 10, 0));
    assigned.trainer_ids = vec![coach.user_id];
    services.sessions.create_session(assigned, &admin()).await.unwrap();
    session(&services, other_module.id, "Unassigned", at(3, 9, 0), at(3, 10, 0)).await;

    let page = services
        .events
        .list_events(PaginationParams::default(), false, &coach)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, taught.id);

    assert!(services.events.get_event(taught.id, &coach).await.is_ok());
    let err = services.events.get_event(other.id, &coach).await.unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_deleting_a_session_updates_counts() {
    let services = setup().await;
    let created = event(&services, "Shrinking", 2, 3).await;
    let m = module(&services, created.id, "M", 10).await;
    session(&services, m.id, "One", at(2, 9, 0), at(2, 10, 0)).await;
    let two = session(&services, m.id, "Two", at(2, 10, 0), at(2, 11, 0)).await;
    session(&services, m.id, "Three", at(3, 9, 0), at(3, 10, 0)).await;

    assert_eq!(services.events.get_event(created.id, &admin()).await.unwrap().session_count, 3);
    assert_eq!(services.modules.get_module(m.id, &admin()).await.unwrap().session_count, 3);

    services.sessions.delete_session(two.id, &admin()).await.unwrap();

    let response = services.events.get_event(created.id, &admin()).await.unwrap();
    assert_eq!(response.session_count, 2);
    assert_eq!(response.module_count, 1);
    let module_view = services.modules.get_module(m.id, &admin()).await.unwrap();
    assert_eq!(module_view.session_count, 2);
    assert!(services.sessions.get_session(two.id, &admin()).await.is_err());
}

#[tokio::test]
async fn test_trainer_loses_access_when_their_module_is_archived() {
    let services = setup().await;
    let coach = trainer(&services, "Teo Trainer").await;
    let created = event(&services, "Taught", 2, 2).await;
    let m = module(&services, created.id, "M", 10).await;

    let mut assigned = new_session(m.id, "Assigned", at(2, 9, 0), at(2, 10, 0));
    assigned.trainer_ids = vec![coach.user_id];
    services.sessions.create_session(assigned, &admin()).await.unwrap();
    assert!(services.events.get_event(created.id, &coach).await.is_ok());

    services
        .modules
        .update_module(
            m.id,
            UpdateModule {
                active: Some(false),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();

    let page = services
        .events
        .list_events(PaginationParams::default(), false, &coach)
        .await
        .unwrap();
    assert!(page.items.is_empty());
    let err = services.events.get_event(created.id, &coach).await.unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
    let err = services
        .events
        .sessions_grouped_by_day(created.id, &coach)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}
