mod common;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use common::*;
use std::io::Write;
use training_event_core::domains::export::types::XLSX_MIME_TYPE;
use training_event_core::domains::participant::{NewParticipant, ParticipantRole};
use training_event_core::errors::ServiceError;

fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        other => panic!("expected text at ({}, {}), got {:?}", row, col, other),
    }
}

fn number(range: &Range<Data>, row: u32, col: u32) -> f64 {
    match range.get_value((row, col)) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        other => panic!("expected number at ({}, {}), got {:?}", row, col, other),
    }
}

/// Persist the bytes and reopen them as a workbook.
fn reopen(bytes: &[u8]) -> (tempfile::NamedTempFile, Xlsx<std::io::BufReader<std::fs::File>>) {
    let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    let workbook: Xlsx<_> = open_workbook(file.path()).unwrap();
    (file, workbook)
}

#[tokio::test]
async fn test_report_has_the_four_sheets_with_event_data() {
    let services = setup().await;
    let created = event(&services, "Train the trainers", 2, 3).await;
    let intro = module(&services, created.id, "Introduction", 10).await;
    let practice = module(&services, created.id, "Practice", 20).await;
    let bruno = trainer(&services, "Bruno Trainer").await;
    let alice = trainer(&services, "Alice Trainer").await;

    let mut opening = new_session(intro.id, "Opening", at(2, 9, 0), at(2, 10, 30));
    opening.trainer_ids = vec![bruno.user_id, alice.user_id];
    opening.materials = Some("Flip chart".to_string());
    services.sessions.create_session(opening, &admin()).await.unwrap();
    session(&services, practice.id, "Drills", at(3, 9, 0), at(3, 12, 0)).await;

    let contact_id = contact(&services, "Marta Sousa").await;
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

    let file = services
        .export
        .export_event_report(created.id, &admin())
        .await
        .unwrap();
    assert!(file.filename.starts_with("event_EVT_00001_activities_"));
    assert!(file.filename.ends_with(".xlsx"));
    assert_eq!(file.mime_type, XLSX_MIME_TYPE);

    let (_guard, mut workbook) = reopen(&file.bytes);
    assert_eq!(
        workbook.sheet_names(),
        vec!["Info", "Modules", "Sessions", "Participants"]
    );

    let info = workbook.worksheet_range("Info").unwrap();
    assert_eq!(text(&info, 0, 0), "Code");
    assert_eq!(text(&info, 0, 1), "EVT/00001");
    assert_eq!(text(&info, 1, 1), "Train the trainers");
    assert_eq!(text(&info, 2, 1), "Course");
    assert_eq!(number(&info, 5, 1), 2.0);
    assert_eq!(text(&info, 6, 1), "Draft");
    assert_eq!(number(&info, 7, 1), 2.0);
    assert_eq!(number(&info, 8, 1), 2.0);
    assert_eq!(number(&info, 9, 1), 1.0);

    let modules = workbook.worksheet_range("Modules").unwrap();
    assert_eq!(text(&modules, 0, 2), "Module Title");
    assert_eq!(text(&modules, 1, 0), "EVT/00001");
    assert_eq!(text(&modules, 1, 2), "Introduction");
    assert_eq!(text(&modules, 2, 2), "Practice");
    assert_eq!(number(&modules, 1, 4), 1.0);

    let sessions = workbook.worksheet_range("Sessions").unwrap();
    assert_eq!(text(&sessions, 0, 6), "Trainers");
    assert_eq!(text(&sessions, 1, 1), "Introduction");
    assert_eq!(text(&sessions, 1, 2), "Opening");
    assert_eq!(number(&sessions, 1, 5), 1.5);
    assert_eq!(text(&sessions, 1, 6), "Alice Trainer, Bruno Trainer");
    assert_eq!(text(&sessions, 1, 8), "Flip chart");
    assert_eq!(text(&sessions, 2, 2), "Drills");

    let participants = workbook.worksheet_range("Participants").unwrap();
    assert_eq!(text(&participants, 0, 1), "Name");
    assert_eq!(text(&participants, 1, 1), "Marta Sousa");
    assert_eq!(text(&participants, 1, 2), "marta.sousa@example.org");
    assert_eq!(text(&participants, 1, 4), "Student");
}

#[tokio::test]
async fn test_data_url_carries_the_workbook() {
    let services = setup().await;
    let created = event(&services, "Empty", 2, 2).await;

    let file = services
        .export
        .export_event_report(created.id, &admin())
        .await
        .unwrap();
    let url = file.data_url();
    assert!(url.starts_with(&format!("data:{};base64,UEsD", XLSX_MIME_TYPE)));
}

#[tokio::test]
async fn test_trainer_exports_only_their_events_and_sessions() {
    let services = setup().await;
    let created = event(&services, "Shared", 2, 2).await;
    let other = event(&services, "Other", 3, 3).await;
    let m = module(&services, created.id, "M", 10).await;
    let coach = trainer(&services, "Ivo Trainer").await;

    let mut mine = new_session(m.id, "Mine", at(2, 9, 0), at(2, 10, 0));
    mine.trainer_ids = vec![coach.user_id];
    services.sessions.create_session(mine, &admin()).await.unwrap();
    session(&services, m.id, "Someone else's", at(2, 10, 0), at(2, 11, 0)).await;

    let file = services
        .export
        .export_event_report(created.id, &coach)
        .await
        .unwrap();
    let (_guard, mut workbook) = reopen(&file.bytes);
    let sessions = workbook.worksheet_range("Sessions").unwrap();
    assert_eq!(text(&sessions, 1, 2), "Mine");
    assert!(sessions.get_value((2, 2)).is_none());

    let err = services
        .export
        .export_event_report(other.id, &coach)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_missing_event_is_not_found() {
    let services = setup().await;
    let err = services
        .export
        .export_event_report(uuid::Uuid::new_v4(), &admin())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(_)));
}
