//! Integration tests for directed note links and graph assembly.

use notegraph_core::{EdgeScope, Error, LinkRepository, NoteRepository};
use notegraph_db::test_fixtures::{TestDataBuilder, TestDatabase};

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_link_and_unlink_roundtrip() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_note(0, "From", None)
        .await
        .with_note(0, "To", None)
        .await
        .build();
    let owner = data.users[0];
    let (from, to) = (data.notes[0], data.notes[1]);

    test_db.db.links.link(owner, from, to).await.expect("link failed");

    let graph = test_db
        .db
        .links
        .graph(owner, None, EdgeScope::Either)
        .await
        .expect("graph failed");
    assert_eq!(graph.links.len(), 1);
    assert_eq!(graph.links[0].from_note_id, from);
    assert_eq!(graph.links[0].to_note_id, to);

    test_db.db.links.unlink(owner, from, to).await.expect("unlink failed");

    let graph = test_db
        .db
        .links
        .graph(owner, None, EdgeScope::Either)
        .await
        .expect("graph failed");
    assert!(graph.links.is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_self_link_rejected() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_note(0, "Lonely", None)
        .await
        .build();

    let result = test_db
        .db
        .links
        .link(data.users[0], data.notes[0], data.notes[0])
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_duplicate_link_is_conflict_inverse_is_not() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_note(0, "A", None)
        .await
        .with_note(0, "B", None)
        .await
        .build();
    let owner = data.users[0];
    let (a, b) = (data.notes[0], data.notes[1]);

    test_db.db.links.link(owner, a, b).await.expect("link failed");

    let duplicate = test_db.db.links.link(owner, a, b).await;
    assert!(matches!(duplicate, Err(Error::Conflict(_))));

    // The inverse ordered pair is a distinct edge
    test_db.db.links.link(owner, b, a).await.expect("inverse link failed");

    let graph = test_db
        .db
        .links
        .graph(owner, None, EdgeScope::Either)
        .await
        .expect("graph failed");
    assert_eq!(graph.links.len(), 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_link_to_foreign_note_is_not_found() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("alice@example.com")
        .await
        .with_user("bob@example.com")
        .await
        .with_note(0, "Alice's", None)
        .await
        .with_note(1, "Bob's", None)
        .await
        .build();

    let alice = data.users[0];
    let result = test_db.db.links.link(alice, data.notes[0], data.notes[1]).await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_unlink_missing_edge_is_not_found() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_note(0, "A", None)
        .await
        .with_note(0, "B", None)
        .await
        .build();

    let result = test_db
        .db
        .links
        .unlink(data.users[0], data.notes[0], data.notes[1])
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_delete_note_removes_touching_links() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_note(0, "Hub", None)
        .await
        .with_note(0, "In", None)
        .await
        .with_note(0, "Out", None)
        .await
        .build();
    let owner = data.users[0];
    let (hub, inbound, outbound) = (data.notes[0], data.notes[1], data.notes[2]);

    test_db.db.links.link(owner, inbound, hub).await.expect("link failed");
    test_db.db.links.link(owner, hub, outbound).await.expect("link failed");
    test_db.db.links.link(owner, inbound, outbound).await.expect("link failed");

    test_db.db.notes.delete(owner, hub).await.expect("delete failed");

    let graph = test_db
        .db
        .links
        .graph(owner, None, EdgeScope::Either)
        .await
        .expect("graph failed");
    // Only the edge not touching the deleted hub survives
    assert_eq!(graph.links.len(), 1);
    assert_eq!(graph.links[0].from_note_id, inbound);
    assert_eq!(graph.links[0].to_note_id, outbound);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_graph_edge_scope_either_vs_both() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("owner@example.com")
        .await
        .with_project(0, "Research")
        .await
        .with_note(0, "Inside A", Some(0))
        .await
        .with_note(0, "Inside B", Some(0))
        .await
        .with_note(0, "Outside", None)
        .await
        .build();
    let owner = data.users[0];
    let (inside_a, inside_b, outside) = (data.notes[0], data.notes[1], data.notes[2]);
    let project = data.projects[0];

    test_db.db.links.link(owner, inside_a, inside_b).await.expect("link failed");
    test_db.db.links.link(owner, inside_a, outside).await.expect("link failed");

    let either = test_db
        .db
        .links
        .graph(owner, Some(project), EdgeScope::Either)
        .await
        .expect("graph failed");
    assert_eq!(either.nodes.len(), 2);
    // Cross-project edge stays visible under `either`
    assert_eq!(either.links.len(), 2);

    let both = test_db
        .db
        .links
        .graph(owner, Some(project), EdgeScope::Both)
        .await
        .expect("graph failed");
    assert_eq!(both.nodes.len(), 2);
    assert_eq!(both.links.len(), 1);
    assert_eq!(both.links[0].to_note_id, inside_b);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable Postgres
async fn test_graph_excludes_other_users() {
    let test_db = TestDatabase::new().await;
    let data = TestDataBuilder::new(&test_db.db)
        .with_user("alice@example.com")
        .await
        .with_user("bob@example.com")
        .await
        .with_note(0, "Alice 1", None)
        .await
        .with_note(0, "Alice 2", None)
        .await
        .with_note(1, "Bob 1", None)
        .await
        .build();
    let alice = data.users[0];

    test_db
        .db
        .links
        .link(alice, data.notes[0], data.notes[1])
        .await
        .expect("link failed");

    let graph = test_db
        .db
        .links
        .graph(alice, None, EdgeScope::Either)
        .await
        .expect("graph failed");
    assert_eq!(graph.nodes.len(), 2);
    assert!(graph.nodes.iter().all(|n| n.title.starts_with("Alice")));
    assert_eq!(graph.links.len(), 1);

    test_db.cleanup().await;
}
