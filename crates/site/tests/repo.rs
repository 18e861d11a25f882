//! Integration tests for the content repository over the in-memory store
//! backend and a temporary upload directory.

use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;

use maplewood_core::{
    NewAnnouncement, NewCamp, NewClassSession, NewMaterial, SettingsUpdate,
};
use maplewood_site::repo::ContentRepository;
use maplewood_site::store::{DocumentStore, Fields, MemoryStore};
use maplewood_site::uploads::BlobStash;

const BASE_URL: &str = "http://localhost:3000";

/// Repository over a fresh in-memory store and a temp upload directory.
/// The raw store handle is returned too, for seeding and inspection.
async fn test_repo() -> (ContentRepository, MemoryStore, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let stash = BlobStash::new(dir.path(), BASE_URL).await.expect("stash");
    let memory = MemoryStore::new();
    let repo = ContentRepository::new(DocumentStore::Memory(memory.clone()), stash);
    (repo, memory, dir)
}

fn string_fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
        .collect()
}

#[tokio::test]
async fn added_class_is_listed_with_its_new_id() {
    let (repo, _, _dir) = test_repo().await;

    let id = repo
        .add_class(NewClassSession {
            title: Some("Algebra".to_owned()),
            description: None,
            date: Some("2026-09-01".to_owned()),
            time: Some("16:00".to_owned()),
            duration: Some("1h".to_owned()),
            kind: "regular".to_owned(),
        })
        .await
        .expect("add class");

    let classes = repo.classes().await.expect("list classes");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, id);
    assert_eq!(classes[0].title.as_deref(), Some("Algebra"));
    assert_eq!(classes[0].kind.as_deref(), Some("regular"));
}

#[tokio::test]
async fn deleting_a_class_twice_is_a_noop() {
    let (repo, _, _dir) = test_repo().await;

    let id = repo
        .add_class(NewClassSession {
            title: Some("Chemistry".to_owned()),
            description: None,
            date: None,
            time: None,
            duration: None,
            kind: "workshop".to_owned(),
        })
        .await
        .expect("add class");

    repo.delete_class(&id).await.expect("first delete");
    repo.delete_class(&id).await.expect("second delete");
    assert!(repo.classes().await.expect("list").is_empty());
}

#[tokio::test]
async fn camps_round_trip() {
    let (repo, _, _dir) = test_repo().await;

    let id = repo
        .add_camp(NewCamp {
            title: Some("Summer Science Camp".to_owned()),
            description: Some("One week of experiments".to_owned()),
            start_date: Some("2026-07-06".to_owned()),
            end_date: Some("2026-07-10".to_owned()),
            location: Some("Main campus".to_owned()),
            price: Some("120".to_owned()),
        })
        .await
        .expect("add camp");

    let camps = repo.camps().await.expect("list camps");
    assert_eq!(camps.len(), 1);
    assert_eq!(camps[0].id, id);
    assert_eq!(camps[0].location.as_deref(), Some("Main campus"));

    repo.delete_camp(&id).await.expect("delete");
    assert!(repo.camps().await.expect("list").is_empty());
}

#[tokio::test]
async fn settings_updates_merge_instead_of_replacing() {
    let (repo, _, _dir) = test_repo().await;

    repo.update_settings(SettingsUpdate {
        class_price: Some("15".to_owned()),
        ..Default::default()
    })
    .await
    .expect("first update");

    repo.update_settings(SettingsUpdate {
        email: Some("info@maplewood.example".to_owned()),
        ..Default::default()
    })
    .await
    .expect("second update");

    let settings = repo.settings().await.expect("settings");
    assert_eq!(settings.class_price.as_deref(), Some("15"));
    assert_eq!(settings.email.as_deref(), Some("info@maplewood.example"));
}

#[tokio::test]
async fn settings_default_when_document_absent() {
    let (repo, _, _dir) = test_repo().await;
    let settings = repo.settings().await.expect("settings");
    assert!(settings.class_price.is_none());
    assert!(settings.email.is_none());
}

#[tokio::test]
async fn announcements_list_newest_first_with_limit() {
    let (repo, _, _dir) = test_repo().await;

    for i in 1..=3 {
        repo.add_announcement(NewAnnouncement {
            title: Some(format!("Announcement {i}")),
            content: Some("Details".to_owned()),
            priority: "normal".to_owned(),
        })
        .await
        .expect("add announcement");
    }

    let feed = repo.list_announcements(2).await.expect("list");
    assert!(feed.is_ordered());
    let items = feed.into_items();
    assert_eq!(items.len(), 2);
    // Same-second inserts may tie on the sort key; every returned item
    // must still carry a timestamp.
    assert!(items.iter().all(|a| a.timestamp.is_some()));
    assert!(items.iter().all(|a| a.created_at.is_some()));
}

#[tokio::test]
async fn new_announcement_appears_in_recent_feed_with_fresh_timestamp() {
    let (repo, _, _dir) = test_repo().await;

    let before = Utc::now();
    let id = repo
        .add_announcement(NewAnnouncement {
            title: Some("Hi".to_owned()),
            content: Some("Welcome".to_owned()),
            priority: "normal".to_owned(),
        })
        .await
        .expect("add announcement");

    let feed = repo.list_announcements(5).await.expect("list");
    let item = feed
        .items()
        .iter()
        .find(|a| a.id == id)
        .expect("announcement present");
    assert_eq!(item.title.as_deref(), Some("Hi"));
    assert_eq!(item.content.as_deref(), Some("Welcome"));
    assert_eq!(item.priority.as_deref(), Some("normal"));

    let stamp = item.timestamp.expect("timestamp stamped");
    assert!(stamp >= before && stamp <= Utc::now());
}

#[tokio::test]
async fn legacy_announcements_without_timestamp_fall_back_unordered() {
    let (repo, memory, _dir) = test_repo().await;

    // Seed a document shaped like pre-migration data: no timestamp field.
    memory.insert(
        "announcements",
        string_fields(&[("title", "Old news"), ("content", "From before")]),
    );

    let feed = repo.list_announcements(5).await.expect("list");
    assert!(!feed.is_ordered());
    let items = feed.into_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title.as_deref(), Some("Old news"));
    assert!(items[0].timestamp.is_none());
}

#[tokio::test]
async fn ordered_feed_drops_documents_without_timestamp() {
    let (repo, memory, _dir) = test_repo().await;

    memory.insert("announcements", string_fields(&[("title", "Old news")]));
    repo.add_announcement(NewAnnouncement {
        title: Some("Fresh".to_owned()),
        content: None,
        priority: "high".to_owned(),
    })
    .await
    .expect("add announcement");

    let feed = repo.list_announcements(5).await.expect("list");
    assert!(feed.is_ordered());
    let items = feed.into_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title.as_deref(), Some("Fresh"));
}

#[tokio::test]
async fn uploaded_material_gets_file_fields_and_a_blob() {
    let (repo, _, dir) = test_repo().await;

    let id = repo
        .add_material(
            NewMaterial {
                title: Some("Fractions worksheet".to_owned()),
                description: None,
                category: "math".to_owned(),
                grade: Some("5".to_owned()),
            },
            "fractions.pdf",
            b"%PDF-1.4 fake",
        )
        .await
        .expect("add material");

    let materials = repo.materials().await.expect("list materials");
    assert_eq!(materials.len(), 1);
    let material = &materials[0];
    assert_eq!(material.id, id);
    assert_eq!(material.category.as_deref(), Some("math"));
    assert!(material.uploaded_at.is_some());

    let file_name = material.file_name.as_deref().expect("file name");
    assert!(file_name.ends_with("_fractions.pdf"));
    assert!(dir.path().join(file_name).exists());

    let url = material.file_url.as_deref().expect("file url");
    assert_eq!(url, &format!("{BASE_URL}/static/uploads/{file_name}"));
}

#[tokio::test]
async fn deleting_a_material_removes_document_and_blob() {
    let (repo, _, dir) = test_repo().await;

    let id = repo
        .add_material(
            NewMaterial {
                title: Some("Reading list".to_owned()),
                description: None,
                category: "general".to_owned(),
                grade: None,
            },
            "list.txt",
            b"1. A book",
        )
        .await
        .expect("add material");

    let materials = repo.materials().await.expect("list");
    let file_name = materials[0].file_name.clone().expect("file name");
    assert!(dir.path().join(&file_name).exists());

    repo.delete_material(&id).await.expect("delete");
    assert!(repo.materials().await.expect("list").is_empty());
    assert!(!dir.path().join(&file_name).exists());

    // Second deletion: the document is gone, the call still succeeds.
    repo.delete_material(&id).await.expect("delete again");
}

#[tokio::test]
async fn deleting_a_material_with_missing_blob_still_deletes_document() {
    let (repo, memory, _dir) = test_repo().await;

    // Document that claims a blob that was never written.
    let id = memory.insert(
        "materials",
        string_fields(&[("title", "Ghost"), ("file_name", "ghost.pdf")]),
    );

    repo.delete_material(&id).await.expect("delete");
    assert!(repo.materials().await.expect("list").is_empty());
}
