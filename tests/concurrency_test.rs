mod common;

use common::*;
use training_event_core::config::Settings;
use training_event_core::errors::ValidationError;
use training_event_core::Services;

/// Services over a WAL database file so several connections write at once.
async fn file_backed(dir: &tempfile::TempDir) -> Services {
    let path = dir.path().join("training.db");
    let settings = Settings {
        database_url: format!("sqlite://{}", path.display()),
        max_connections: 5,
        ..Settings::default()
    };
    Services::connect(&settings).await.expect("file database")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overlapping_creates_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let services = file_backed(&dir).await;
    let created = event(&services, "Busy day", 2, 2).await;
    let first = module(&services, created.id, "First", 10).await;
    let second = module(&services, created.id, "Second", 20).await;

    let left = {
        let services = services.clone();
        tokio::spawn(async move {
            services
                .sessions
                .create_session(new_session(first.id, "Left", at(2, 9, 0), at(2, 11, 0)), &admin())
                .await
        })
    };
    let right = {
        let services = services.clone();
        tokio::spawn(async move {
            services
                .sessions
                .create_session(new_session(second.id, "Right", at(2, 10, 0), at(2, 12, 0)), &admin())
                .await
        })
    };

    let (left, right) = tokio::join!(left, right);
    let results = [left.unwrap(), right.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let rejected = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(rejected.validation(), Some(ValidationError::Overlap { .. })));

    let stored = services
        .sessions
        .list_sessions_for_event(created.id, true, &admin())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_event_creates_get_distinct_codes() {
    let dir = tempfile::tempdir().unwrap();
    let services = file_backed(&dir).await;

    let mut handles = Vec::new();
    for idx in 0..6u32 {
        let services = services.clone();
        handles.push(tokio::spawn(async move {
            event(&services, &format!("Event {}", idx), 2, 3).await.code
        }));
    }

    let mut codes = Vec::new();
    for handle in handles {
        codes.push(handle.await.unwrap());
    }
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 6);
    assert_eq!(codes.first().map(String::as_str), Some("EVT/00001"));
    assert_eq!(codes.last().map(String::as_str), Some("EVT/00006"));
}
