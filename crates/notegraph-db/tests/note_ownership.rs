//! Integration tests for note CRUD and per-user scoping.
//!
//! All tests require a reachable Postgres (DATABASE_URL) and are `#[ignore]`d
//! by default. Run with `cargo test -- --ignored`.

use notegraph_core::{CreateNoteRequest, Error, ListNotesRequest, NoteRepository, UpdateNoteRequest};
use notegraph_db::test_fixtures::{TestDataBuilder, TestDatabase};

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_create_and_fetch_note() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .build();
    let owner = data.users[0];

    let note = test_db
        .db
        .notes
        .insert(
            owner,
            CreateNoteRequest {
                title: "Borrow checker".to_string(),
                content: Some("Aliasing XOR mutation.".to_string()),
                project_id: None,
                tags: Some(vec!["Rust".to_string(), "#rust".to_string()]),
            },
        )
        .await
        .expect("insert failed");

    assert_eq!(note.title, "Borrow checker");
    assert_eq!(note.tags, vec!["rust"]);

    let fetched = test_db.db.notes.fetch(owner, note.id).await.expect("fetch failed");
    assert_eq!(fetched.id, note.id);
    assert_eq!(fetched.content.as_deref(), Some("Aliasing XOR mutation."));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_empty_title_rejected() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .build();

    let result = test_db
        .db
        .notes
        .insert(
            data.users[0],
            CreateNoteRequest {
                title: "   ".to_string(),
                content: None,
                project_id: None,
                tags: None,
            },
        )
        .await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_cross_user_fetch_is_not_found() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("alice@example.com")
        .await
        .with_user("bob@example.com")
        .await
        .with_note(0, "Alice's note", None)
        .await
        .build();

    let bob = data.users[1];
    let result = test_db.db.notes.fetch(bob, data.notes[0]).await;
    assert!(matches!(result, Err(Error::NoteNotFound(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_list_notes_newest_first_and_project_filtered() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_project(0, "Research")
        .await
        .with_note(0, "Older", Some(0))
        .await
        .with_note(0, "Newer", Some(0))
        .await
        .with_note(0, "Unfiled", None)
        .await
        .build();
    let owner = data.users[0];

    let all = test_db
        .db
        .notes
        .list(owner, ListNotesRequest::default())
        .await
        .expect("list failed");
    assert_eq!(all.len(), 3);
    // UUIDv7 ids are time-ordered, so insertion order is deterministic
    assert_eq!(all[0].title, "Unfiled");
    assert_eq!(all[2].title, "Older");

    let filtered = test_db
        .db
        .notes
        .list(
            owner,
            ListNotesRequest {
                project_id: Some(data.projects[0]),
                ..Default::default()
            },
        )
        .await
        .expect("filtered list failed");
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered[0].title, "Newer");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_update_preserves_omitted_fields() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_note(0, "Original title", None)
        .await
        .build();
    let owner = data.users[0];

    let updated = test_db
        .db
        .notes
        .update(
            owner,
            data.notes[0],
            UpdateNoteRequest {
                title: Some("Renamed".to_string()),
                content: None,
                tags: None,
            },
        )
        .await
        .expect("update failed");

    assert_eq!(updated.title, "Renamed");
    assert_eq!(
        updated.content.as_deref(),
        Some("Content for Original title")
    );
    assert!(updated.updated_at_utc >= updated.created_at_utc);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_update_with_empty_title_rejected() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_note(0, "Keep me", None)
        .await
        .build();

    let result = test_db
        .db
        .notes
        .update(
            data.users[0],
            data.notes[0],
            UpdateNoteRequest {
                title: Some("".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    // Original row untouched
    let note = test_db
        .db
        .notes
        .fetch(data.users[0], data.notes[0])
        .await
        .expect("fetch failed");
    assert_eq!(note.title, "Keep me");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_position_update_is_ownership_scoped() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("alice@example.com")
        .await
        .with_user("bob@example.com")
        .await
        .with_note(0, "Alice's note", None)
        .await
        .build();
    let (alice, bob) = (data.users[0], data.users[1]);
    let note_id = data.notes[0];

    // Non-owner update fails and leaves coordinates unchanged
    let result = test_db.db.notes.update_position(bob, note_id, 10.0, 20.0).await;
    assert!(matches!(result, Err(Error::NoteNotFound(_))));

    let note = test_db.db.notes.fetch(alice, note_id).await.expect("fetch failed");
    assert_eq!(note.x, None);
    assert_eq!(note.y, None);

    // Owner update succeeds
    test_db
        .db
        .notes
        .update_position(alice, note_id, 12.5, -3.0)
        .await
        .expect("position update failed");
    let note = test_db.db.notes.fetch(alice, note_id).await.expect("fetch failed");
    assert_eq!(note.x, Some(12.5));
    assert_eq!(note.y, Some(-3.0));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_position_update_rejects_non_finite() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_note(0, "Canvas note", None)
        .await
        .build();

    let result = test_db
        .db
        .notes
        .update_position(data.users[0], data.notes[0], f64::NAN, 0.0)
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let result = test_db
        .db
        .notes
        .update_position(data.users[0], data.notes[0], 0.0, f64::INFINITY)
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_cross_user_delete_is_not_found() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("alice@example.com")
        .await
        .with_user("bob@example.com")
        .await
        .with_note(0, "Alice's note", None)
        .await
        .build();

    let result = test_db.db.notes.delete(data.users[1], data.notes[0]).await;
    assert!(matches!(result, Err(Error::NoteNotFound(_))));

    // Still fetchable by the owner
    assert!(test_db.db.notes.fetch(data.users[0], data.notes[0]).await.is_ok());

    test_db.cleanup().await;
}
