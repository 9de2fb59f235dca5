mod common;

use chrono::Duration;
use common::*;
use training_event_core::domains::attachment::NewAttachment;
use training_event_core::domains::module::UpdateModule;
use training_event_core::domains::session::{SessionState, UpdateSession};
use training_event_core::errors::{ServiceError, ValidationError};

#[tokio::test]
async fn test_overlap_is_detected_across_modules_of_one_event() {
    let services = setup().await;
    let created = event(&services, "Week", 2, 6).await;
    let first = module(&services, created.id, "First", 10).await;
    let second = module(&services, created.id, "Second", 20).await;

    session(&services, first.id, "Opening", at(2, 9, 0), at(2, 11, 0)).await;

    let err = services
        .sessions
        .create_session(new_session(second.id, "Clash", at(2, 10, 0), at(2, 12, 0)), &admin())
        .await
        .unwrap_err();
    match err.validation() {
        Some(ValidationError::Overlap { session, .. }) => assert_eq!(session, "Opening"),
        other => panic!("expected overlap, got {:?}", other),
    }

    let sessions = services
        .sessions
        .list_sessions_for_event(created.id, false, &admin())
        .await
        .unwrap();
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_touching_sessions_and_other_events_do_not_overlap() {
    let services = setup().await;
    let week = event(&services, "Week", 2, 6).await;
    let other = event(&services, "Parallel", 2, 2).await;
    let week_module = module(&services, week.id, "M", 10).await;
    let other_module = module(&services, other.id, "M", 10).await;

    session(&services, week_module.id, "Morning", at(2, 9, 0), at(2, 12, 0)).await;
    let afternoon = session(&services, week_module.id, "Afternoon", at(2, 12, 0), at(2, 13, 0)).await;
    assert_eq!(afternoon.duration_hours, 1.0);

    // same hours in a different event
    session(&services, other_module.id, "Elsewhere", at(2, 9, 0), at(2, 12, 0)).await;
}

#[tokio::test]
async fn test_end_must_follow_start() {
    let services = setup().await;
    let created = event(&services, "Week", 2, 6).await;
    let m = module(&services, created.id, "M", 10).await;

    for (start, end) in [(at(2, 10, 0), at(2, 10, 0)), (at(2, 11, 0), at(2, 10, 0))] {
        let err = services
            .sessions
            .create_session(new_session(m.id, "Bad", start, end), &admin())
            .await
            .unwrap_err();
        assert!(matches!(err.validation(), Some(ValidationError::Interval { .. })));
    }
}

#[tokio::test]
async fn test_times_are_checked_at_stored_precision() {
    let services = setup().await;
    let created = event(&services, "Week", 2, 6).await;
    let m = module(&services, created.id, "M", 10).await;
    let ms = Duration::milliseconds;

    let first = session(&services, m.id, "First", at(2, 9, 0), at(2, 10, 0) + ms(600)).await;
    assert_eq!(first.date_end, at(2, 10, 0));
    assert_eq!(first.duration_hours, 1.0);
    let stored = services.sessions.get_session(first.id, &admin()).await.unwrap();
    assert_eq!(stored.date_end, first.date_end);

    // starts where the stored end is, so the two only touch
    let second = session(&services, m.id, "Second", at(2, 10, 0) + ms(300), at(2, 11, 0)).await;
    assert_eq!(second.date_start, at(2, 10, 0));

    let err = services
        .sessions
        .create_session(
            new_session(m.id, "Early", at(2, 10, 59) + ms(999), at(2, 12, 0)),
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Overlap { .. })));

    // both ends fall inside the same second
    let err = services
        .sessions
        .create_session(
            new_session(m.id, "Blink", at(2, 12, 0) + ms(100), at(2, 12, 0) + ms(900)),
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Interval { .. })));

    let err = services
        .sessions
        .update_session(
            second.id,
            UpdateSession {
                date_end: Some(at(2, 10, 0) + ms(400)),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Interval { .. })));
}

#[tokio::test]
async fn test_sessions_of_archived_modules_free_their_slots() {
    let services = setup().await;
    let created = event(&services, "Week", 2, 6).await;
    let shelved = module(&services, created.id, "Shelved", 10).await;
    let live = module(&services, created.id, "Live", 20).await;
    session(&services, shelved.id, "Ghost", at(2, 9, 0), at(2, 11, 0)).await;

    let archive = UpdateModule {
        active: Some(false),
        ..Default::default()
    };
    services.modules.update_module(shelved.id, archive, &admin()).await.unwrap();
    let view = services.events.get_event(created.id, &admin()).await.unwrap();
    assert_eq!(view.session_count, 0);

    session(&services, live.id, "Takes the slot", at(2, 10, 0), at(2, 12, 0)).await;

    // bringing the module back would double-book the slot
    let restore = UpdateModule {
        active: Some(true),
        ..Default::default()
    };
    let err = services
        .modules
        .update_module(shelved.id, restore, &admin())
        .await
        .unwrap_err();
    match err.validation() {
        Some(ValidationError::Overlap { session, .. }) => assert_eq!(session, "Takes the slot"),
        other => panic!("expected overlap, got {:?}", other),
    }
    let still_archived = services.modules.get_module(shelved.id, &admin()).await.unwrap();
    assert!(!still_archived.active);
}

#[tokio::test]
async fn test_update_rechecks_overlap_only_when_schedule_changes() {
    let services = setup().await;
    let created = event(&services, "Week", 2, 6).await;
    let m = module(&services, created.id, "M", 10).await;

    session(&services, m.id, "Fixed", at(3, 9, 0), at(3, 10, 0)).await;
    let movable = session(&services, m.id, "Movable", at(3, 10, 0), at(3, 11, 0)).await;

    let renamed = services
        .sessions
        .update_session(
            movable.id,
            UpdateSession {
                name: Some("Renamed".to_string()),
                state: Some(SessionState::Designed),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.event_id, created.id);

    let err = services
        .sessions
        .update_session(
            movable.id,
            UpdateSession {
                date_start: Some(at(3, 9, 30)),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Overlap { .. })));

    let unchanged = services.sessions.get_session(movable.id, &admin()).await.unwrap();
    assert_eq!(unchanged.date_start, at(3, 10, 0));

    let moved = services
        .sessions
        .update_session(
            movable.id,
            UpdateSession {
                date_start: Some(at(3, 14, 0)),
                date_end: Some(at(3, 15, 30)),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();
    assert_eq!(moved.duration_hours, 1.5);
}

#[tokio::test]
async fn test_archived_sessions_are_ignored_by_the_scan() {
    let services = setup().await;
    let created = event(&services, "Week", 2, 6).await;
    let m = module(&services, created.id, "M", 10).await;

    let old = session(&services, m.id, "Old", at(4, 9, 0), at(4, 12, 0)).await;
    services
        .sessions
        .update_session(
            old.id,
            UpdateSession {
                active: Some(false),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();

    session(&services, m.id, "New", at(4, 10, 0), at(4, 11, 0)).await;

    let listed = services
        .sessions
        .list_sessions_for_event(created.id, false, &admin())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    let with_archived = services
        .sessions
        .list_sessions_for_event(created.id, true, &admin())
        .await
        .unwrap();
    assert_eq!(with_archived.len(), 2);

    // reactivating would now collide
    let err = services
        .sessions
        .update_session(
            old.id,
            UpdateSession {
                active: Some(true),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Overlap { .. })));
}

#[tokio::test]
async fn test_moving_a_module_revalidates_against_the_target_event() {
    let services = setup().await;
    let source = event(&services, "Source", 2, 3).await;
    let target = event(&services, "Target", 2, 3).await;
    let moving = module(&services, source.id, "Moving", 10).await;
    let resident = module(&services, target.id, "Resident", 10).await;

    let travelling = session(&services, moving.id, "Travelling", at(2, 9, 0), at(2, 10, 0)).await;
    session(&services, resident.id, "Resident", at(2, 9, 30), at(2, 10, 30)).await;

    let err = services
        .modules
        .update_module(
            moving.id,
            UpdateModule {
                event_id: Some(target.id),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Overlap { .. })));

    // the rejected move left everything in place
    let still_there = services.sessions.get_session(travelling.id, &admin()).await.unwrap();
    assert_eq!(still_there.event_id, source.id);

    services
        .sessions
        .update_session(
            travelling.id,
            UpdateSession {
                date_start: Some(at(3, 9, 0)),
                date_end: Some(at(3, 10, 0)),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();

    let moved = services
        .modules
        .update_module(
            moving.id,
            UpdateModule {
                event_id: Some(target.id),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();
    assert_eq!(moved.event_id, target.id);

    let relocated = services.sessions.get_session(travelling.id, &admin()).await.unwrap();
    assert_eq!(relocated.event_id, target.id);
    let source_view = services.events.get_event(source.id, &admin()).await.unwrap();
    assert_eq!(source_view.session_count, 0);
}

#[tokio::test]
async fn test_links_must_reference_existing_records() {
    let services = setup().await;
    let created = event(&services, "Week", 2, 6).await;
    let m = module(&services, created.id, "M", 10).await;
    let coach = trainer(&services, "Rita Trainer").await;
    let handout = services
        .attachments
        .create_attachment(
            NewAttachment {
                name: "Handout".to_string(),
                mime_type: Some("application/pdf".to_string()),
                uri: None,
            },
            &admin(),
        )
        .await
        .unwrap();

    let mut linked = new_session(m.id, "Linked", at(2, 9, 0), at(2, 10, 0));
    linked.trainer_ids = vec![coach.user_id, coach.user_id];
    linked.attachment_ids = vec![handout.id];
    let created_session = services.sessions.create_session(linked, &admin()).await.unwrap();
    assert_eq!(created_session.trainer_ids, vec![coach.user_id]);
    assert_eq!(created_session.attachment_ids, vec![handout.id]);

    let mut dangling = new_session(m.id, "Dangling", at(2, 10, 0), at(2, 11, 0));
    dangling.trainer_ids = vec![uuid::Uuid::new_v4()];
    let err = services.sessions.create_session(dangling, &admin()).await.unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Relationship(_))));
}

#[tokio::test]
async fn test_trainer_scoping_on_sessions() {
    let services = setup().await;
    let created = event(&services, "Week", 2, 6).await;
    let m = module(&services, created.id, "M", 10).await;
    let coach = trainer(&services, "Tom Trainer").await;
    let colleague = trainer(&services, "Cleo Trainer").await;

    let mut mine = new_session(m.id, "Mine", at(2, 9, 0), at(2, 10, 0));
    mine.trainer_ids = vec![coach.user_id];
    let mine = services.sessions.create_session(mine, &admin()).await.unwrap();
    let theirs = session(&services, m.id, "Theirs", at(2, 10, 0), at(2, 11, 0)).await;

    // trainers cannot create sessions
    let err = services
        .sessions
        .create_session(new_session(m.id, "Sneaky", at(5, 9, 0), at(5, 10, 0)), &coach)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let listed = services
        .sessions
        .list_sessions_for_event(created.id, false, &coach)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.id);

    assert!(matches!(
        services.sessions.get_session(theirs.id, &coach).await,
        Err(ServiceError::PermissionDenied(_))
    ));

    let edited = services
        .sessions
        .update_session(
            mine.id,
            UpdateSession {
                materials: Some(Some("Slides".to_string())),
                trainer_ids: Some(vec![coach.user_id, colleague.user_id]),
                ..Default::default()
            },
            &coach,
        )
        .await
        .unwrap();
    assert_eq!(edited.materials.as_deref(), Some("Slides"));

    let err = services
        .sessions
        .update_session(
            mine.id,
            UpdateSession {
                trainer_ids: Some(vec![colleague.user_id]),
                ..Default::default()
            },
            &coach,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    assert!(matches!(
        services.sessions.delete_session(mine.id, &coach).await,
        Err(ServiceError::PermissionDenied(_))
    ));
}
