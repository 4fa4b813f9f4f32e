//! Integration tests for export/import across the stateful tools.
//!
//! These tests verify the complete workflow of saving state, exporting it
//! to a file, and importing it into another store in merge or replace mode.

use chrono::NaiveDate;
use indoc::indoc;
use tempfile::TempDir;
use toolbench_core::calendar::{ContentCalendar, NewPost, Platform};
use toolbench_core::error::{CoreError, ImportError};
use toolbench_core::health::HealthInput;
use toolbench_core::housing::HousingInput;
use toolbench_core::qr::{QrPayload, QrState};
use toolbench_core::storage::transfer::{apply_import, export_to_file, import_from_file};
use toolbench_core::storage::{ImportMode, JsonStore};
use toolbench_core::todo::{NewTask, TodoList};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
}

fn planned_calendar() -> ContentCalendar {
    let mut calendar = ContentCalendar::new();
    for (title, d, platform) in [
        ("Launch teaser", 1, Platform::Instagram),
        ("Launch post", 3, Platform::LinkedIn),
        ("Recap", 9, Platform::Blog),
    ] {
        calendar
            .add(NewPost {
                title: title.into(),
                content: format!("{title} body"),
                platform: Some(platform),
                date: Some(day(d)),
                tags: vec!["launch".into()],
                ..NewPost::default()
            })
            .unwrap();
    }
    calendar
}

#[test]
fn test_calendar_export_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    let export_path = dir.path().join("calendar-export.json");
    let calendar = planned_calendar();
    export_to_file(&calendar, &export_path).unwrap();

    let mut restored = ContentCalendar::new();
    let summary = import_from_file(&mut restored, &export_path, ImportMode::Replace).unwrap();
    assert_eq!(summary.added, 3);
    assert_eq!(restored, calendar);

    // Persist and reload through the store
    let store = JsonStore::with_path(dir.path().join("calendar.json"));
    store.save(&restored).unwrap();
    let reloaded: ContentCalendar = store.load().unwrap();
    assert_eq!(reloaded.posts_on(day(3))[0].title, "Launch post");
}

#[test]
fn test_merge_is_idempotent_for_disjoint_ids() {
    let dir = TempDir::new().unwrap();
    let export_path = dir.path().join("todo-export.json");

    let mut remote = TodoList::new();
    remote
        .add(NewTask {
            title: "Remote task".into(),
            ..NewTask::default()
        })
        .unwrap();
    export_to_file(&remote, &export_path).unwrap();

    let mut local = TodoList::new();
    local
        .add(NewTask {
            title: "Local task".into(),
            ..NewTask::default()
        })
        .unwrap();

    let first = import_from_file(&mut local, &export_path, ImportMode::Merge).unwrap();
    assert_eq!(first.added, 1);
    let after_first = local.clone();

    let second = import_from_file(&mut local, &export_path, ImportMode::Merge).unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 1);
    assert_eq!(local, after_first);
    assert_eq!(local.tasks.len(), 2);
}

#[test]
fn test_bare_blob_import() {
    let blob = indoc! {r#"
        {
          "posts": [
            {
              "id": "7f1c2a9e-0000-4000-8000-000000000001",
              "title": "Hand-written",
              "platform": "twitter",
              "date": "2024-07-04",
              "time": "12:30:00",
              "status": "scheduled",
              "created_at": "2024-06-01T10:00:00Z",
              "updated_at": "2024-06-01T10:00:00Z"
            }
          ]
        }
    "#};
    let mut calendar = planned_calendar();
    let summary = apply_import(&mut calendar, blob, ImportMode::Merge).unwrap();
    assert_eq!(summary.added, 1);
    assert_eq!(calendar.posts.len(), 4);
    let post = calendar.get("7f1c2a9e-0000-4000-8000-000000000001").unwrap();
    assert_eq!(post.platform, Platform::Twitter);
    assert!(post.content.is_empty());
    assert!(post.tags.is_empty());
}

#[test]
fn test_import_rejects_other_tool_and_keeps_state() {
    let envelope = indoc! {r#"
        {
          "tool": "calendar",
          "version": 1,
          "exported_at": "2024-06-01T10:00:00Z",
          "data": { "posts": [] }
        }
    "#};
    let mut list = TodoList::new();
    list.add(NewTask {
        title: "Keep me".into(),
        ..NewTask::default()
    })
    .unwrap();
    let before = list.clone();

    let err = apply_import(&mut list, envelope, ImportMode::Replace).unwrap_err();
    assert!(matches!(err, ImportError::WrongTool { .. }));
    assert_eq!(list, before);
}

#[test]
fn test_foreign_bare_blob_keeps_tasks() {
    let calendar_blob = indoc! {r#"
        {
          "posts": [],
          "settings": { "week_start": "sunday", "default_platform": "blog" }
        }
    "#};
    let mut list = TodoList::new();
    list.add(NewTask {
        title: "Keep me".into(),
        ..NewTask::default()
    })
    .unwrap();
    let before = list.clone();

    let err = apply_import(&mut list, calendar_blob, ImportMode::Replace).unwrap_err();
    assert!(matches!(err, ImportError::Malformed(_)));
    let err = apply_import(&mut list, "{}", ImportMode::Replace).unwrap_err();
    assert!(matches!(err, ImportError::Malformed(_)));
    assert_eq!(list, before);
}

#[test]
fn test_foreign_bare_blob_keeps_housing_input() {
    let mut saved = HousingInput {
        current_rent: 30_000.0,
        property_price: 500_000.0,
        ..HousingInput::default()
    };
    let before = saved.clone();

    for content in [r#"{"tasks": []}"#, "{}", r#"{"current_rent": 1, "posts": []}"#] {
        let err = apply_import(&mut saved, content, ImportMode::Replace).unwrap_err();
        assert!(matches!(err, ImportError::Malformed(_)), "{content}");
    }
    assert_eq!(saved, before);

    // A partial blob of its own fields is still accepted
    apply_import(&mut saved, r#"{"current_rent": 32000}"#, ImportMode::Replace).unwrap();
    assert_eq!(saved.current_rent, 32_000.0);
}

#[test]
fn test_truncated_file_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"tool\": \"qr\", \"data\": {").unwrap();

    let mut state = QrState::default();
    let payload = QrPayload::Text { text: "hi".into() };
    let encoded = payload.encode();
    state.record(payload, encoded);
    let before = state.clone();

    let err = import_from_file(&mut state, &path, ImportMode::Replace).unwrap_err();
    assert!(matches!(err, CoreError::Import(ImportError::Malformed(_))));
    assert_eq!(state, before);
}

#[test]
fn test_form_tool_import_replaces_saved_input() {
    let mut saved = HealthInput {
        weight_kg: 70.0,
        height_cm: 175.0,
        age: 30,
        ..HealthInput::default()
    };
    let incoming = indoc! {r#"
        {
          "tool": "health",
          "version": 1,
          "exported_at": "2024-06-01T10:00:00Z",
          "data": { "weight_kg": 82.5, "height_cm": 180, "age": 41 }
        }
    "#};
    apply_import(&mut saved, incoming, ImportMode::Merge).unwrap();
    assert_eq!(saved.weight_kg, 82.5);
    assert_eq!(saved.age, 41);
}
