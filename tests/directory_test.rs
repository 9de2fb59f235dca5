mod common;

use common::*;
use training_event_core::domains::attachment::NewAttachment;
use training_event_core::domains::contact::NewContact;
use training_event_core::domains::participant::{NewParticipant, ParticipantRole};
use training_event_core::domains::user::NewUser;
use training_event_core::errors::{DomainError, ServiceError, ValidationError};
use training_event_core::types::UserRole;
use uuid::Uuid;

#[tokio::test]
async fn test_only_admins_manage_users() {
    let services = setup().await;
    let err = services
        .users
        .create_user(
            NewUser {
                name: "Nope".to_string(),
                email: "nope@example.org".to_string(),
                role: UserRole::Trainer,
            },
            &manager(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let coach = trainer(&services, "Vera Trainer").await;
    user_with_role(&services, "Ana Admin", UserRole::Admin).await;

    let all = services.users.get_all_users(&admin()).await.unwrap();
    let names: Vec<&str> = all.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Ana Admin", "Vera Trainer"]);

    // a user may read their own record but nobody else's
    let me = services.users.get_user(coach.user_id, &coach).await.unwrap();
    assert_eq!(me.email, "vera.trainer@example.org");
    assert_eq!(me.role, UserRole::Trainer);
    assert!(matches!(
        services.users.get_all_users(&coach).await,
        Err(ServiceError::PermissionDenied(_))
    ));
}

#[tokio::test]
async fn test_contact_fields_are_validated() {
    let services = setup().await;

    let err = services
        .contacts
        .create_contact(
            NewContact {
                name: "Bad Mail".to_string(),
                email: Some("not-an-email".to_string()),
                phone: None,
                birthdate: None,
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationError::Format { .. })));

    let id = contact(&services, "Carla Reis").await;
    let stored = services.contacts.get_contact(id, &admin()).await.unwrap();
    assert_eq!(stored.name, "Carla Reis");
    assert_eq!(stored.email.as_deref(), Some("carla.reis@example.org"));

    let missing = Uuid::new_v4();
    let err = services.contacts.get_contact(missing, &admin()).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::EntityNotFound(ref entity, id)) if entity == "Contact" && id == missing
    ));
}

#[tokio::test]
async fn test_attachments_are_shared_by_reference() {
    let services = setup().await;
    let created = event(&services, "Docs", 2, 2).await;
    let m = module(&services, created.id, "M", 10).await;

    let slides = services
        .attachments
        .create_attachment(
            NewAttachment {
                name: "Slides".to_string(),
                mime_type: Some("application/pdf".to_string()),
                uri: Some("file:///slides.pdf".to_string()),
            },
            &manager(),
        )
        .await
        .unwrap();

    for (name, hour) in [("First", 9), ("Second", 11)] {
        let mut new = new_session(m.id, name, at(2, hour, 0), at(2, hour + 1, 0));
        new.attachment_ids = vec![slides.id];
        services.sessions.create_session(new, &admin()).await.unwrap();
    }

    // deleting the sessions leaves the attachment in place
    services.modules.delete_module(m.id, &admin()).await.unwrap();
    let still_there = services.attachments.get_attachment(slides.id, &admin()).await.unwrap();
    assert_eq!(still_there.name, "Slides");
}

#[tokio::test]
async fn test_deleting_a_module_removes_its_sessions() {
    let services = setup().await;
    let created = event(&services, "Pruned", 2, 2).await;
    let kept = module(&services, created.id, "Kept", 10).await;
    let dropped = module(&services, created.id, "Dropped", 20).await;
    session(&services, kept.id, "Stays", at(2, 9, 0), at(2, 10, 0)).await;
    let gone = session(&services, dropped.id, "Goes", at(2, 10, 0), at(2, 11, 0)).await;

    let coach = trainer(&services, "Nuno Trainer").await;
    assert!(matches!(
        services.modules.delete_module(dropped.id, &coach).await,
        Err(ServiceError::PermissionDenied(_))
    ));

    services.modules.delete_module(dropped.id, &admin()).await.unwrap();

    assert!(services.sessions.get_session(gone.id, &admin()).await.is_err());
    let response = services.events.get_event(created.id, &admin()).await.unwrap();
    assert_eq!(response.module_count, 1);
    assert_eq!(response.session_count, 1);

    // the freed slot can be booked again
    session(&services, kept.id, "Reuses slot", at(2, 10, 0), at(2, 11, 0)).await;
}

#[tokio::test]
async fn test_deleting_a_participant_drops_its_enrolments() {
    let services = setup().await;
    let created = event(&services, "Roster", 2, 2).await;
    let contact_id = contact(&services, "Filipa Gomes").await;
    let participant = services
        .participants
        .create_participant(
            NewParticipant {
                contact_id,
                role: ParticipantRole::Student,
                user_id: None,
                notes: Some("Vegetarian".to_string()),
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

    services
        .participants
        .delete_participant(participant.id, &admin())
        .await
        .unwrap();

    assert!(services
        .participants
        .get_participant(participant.id, &admin())
        .await
        .is_err());
    let response = services.events.get_event(created.id, &admin()).await.unwrap();
    assert_eq!(response.participant_count, 0);

    // the contact itself survives and can be enrolled again
    services
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
}
