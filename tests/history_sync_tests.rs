// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Save-flow and reconciliation tests across the local cache and the
//! remote story store.

use chrono::Utc;

use plumette_core::models::{Profile, Story};
use plumette_core::services::EntitlementStatus;
use plumette_core::session::Session;

mod common;
use common::test_app;

fn story(id: &str, title: &str, words: &[&str]) -> Story {
    Story {
        id: id.to_string(),
        title: title.to_string(),
        content: "Once upon a time...".to_string(),
        image_url: format!("https://img.example.test/generated/{id}.png"),
        words: words.iter().map(|w| w.to_string()).collect(),
        created_at: Utc::now(),
        is_last_generated: false,
    }
}

const WORDS: &[&str] = &["dragon", "moon", "cat", "boat", "star"];

async fn sign_in_subscriber(app: &common::TestApp, user_id: &str) {
    app.sessions
        .set_session(Some(Session {
            user_id: user_id.to_string(),
            access_token: "test-token".to_string(),
        }))
        .await;
    let mut profile = Profile::new(user_id, Utc::now());
    profile.subscription_ends_at = Some(Utc::now() + chrono::Duration::days(30));
    app.backend.insert_profile(profile).await;
}

#[tokio::test]
async fn test_non_subscriber_save_stays_local() {
    let app = test_app();
    app.sessions
        .set_session(Some(Session {
            user_id: "user-1".to_string(),
            access_token: "test-token".to_string(),
        }))
        .await;
    app.backend.insert_profile(Profile::new("user-1", Utc::now())).await;

    app.core
        .history
        .save_story(&story("local-1", "A Local Tale", WORDS), EntitlementStatus::Connected)
        .await
        .unwrap();

    assert!(app.backend.stories_for("user-1").await.is_empty());
    assert!(app.objects.uploads.lock().await.is_empty());

    let history = app
        .core
        .history
        .history(EntitlementStatus::Connected)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].is_last_generated);
}

#[tokio::test]
async fn test_subscriber_save_mirrors_story_and_image() {
    let app = test_app();
    sign_in_subscriber(&app, "sub-1").await;

    app.core
        .history
        .save_story(&story("local-1", "A Mirrored Tale", WORDS), EntitlementStatus::Subscriber)
        .await
        .unwrap();

    let remote = app.backend.stories_for("sub-1").await;
    assert_eq!(remote.len(), 1);

    // Illustration went through the two-phase mirror: uploaded under
    // a user/story scoped key and recorded.
    let uploads = app.objects.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].starts_with("sub-1/"));
    let records = app.backend.image_records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].image_path, uploads[0]);
}

#[tokio::test]
async fn test_reconcile_prefers_remote_copy_for_shared_stories() {
    let app = test_app();
    sign_in_subscriber(&app, "sub-2").await;

    // The save flow wrote locally with a time-derived id and remotely
    // with a server-assigned id; the merged view keeps one entry, the
    // remote one.
    app.core
        .history
        .save_story(&story("local-1", "One Story", WORDS), EntitlementStatus::Subscriber)
        .await
        .unwrap();

    let history = app
        .core
        .history
        .history(EntitlementStatus::Subscriber)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].id.starts_with("srv-"));
    assert!(history[0].is_last_generated);
}

#[tokio::test]
async fn test_mirror_failure_never_rolls_back_local_write() {
    let app = test_app();
    sign_in_subscriber(&app, "sub-3").await;
    app.backend.set_offline(true);

    // The remote mirror fails; the local write is the durability
    // guarantee and must survive.
    app.core
        .history
        .save_story(&story("local-1", "Offline Tale", WORDS), EntitlementStatus::Subscriber)
        .await
        .unwrap();

    app.backend.set_offline(false);
    assert!(app.backend.stories_for("sub-3").await.is_empty());

    let history = app
        .core
        .history
        .history(EntitlementStatus::Subscriber)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "local-1");
}

#[tokio::test]
async fn test_history_degrades_to_local_when_remote_down() {
    let app = test_app();
    sign_in_subscriber(&app, "sub-4").await;

    app.core
        .history
        .save_story(&story("local-1", "Cached Tale", WORDS), EntitlementStatus::Connected)
        .await
        .unwrap();

    app.backend.set_offline(true);
    let history = app
        .core
        .history
        .history(EntitlementStatus::Subscriber)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "local-1");
}

#[tokio::test]
async fn test_sync_to_remote_backfills_local_only_stories() {
    let app = test_app();
    sign_in_subscriber(&app, "sub-5").await;

    // Two stories saved while not subscribed stay local-only.
    let other_words = &["owl", "pebble", "meadow", "kite", "dawn"];
    app.core
        .history
        .save_story(&story("local-1", "First", WORDS), EntitlementStatus::Connected)
        .await
        .unwrap();
    app.core
        .history
        .save_story(&story("local-2", "Second", other_words), EntitlementStatus::Connected)
        .await
        .unwrap();

    // After the subscription purchase, the backfill mirrors both.
    let mirrored = app.core.history.sync_to_remote().await.unwrap();
    assert_eq!(mirrored, 2);
    assert_eq!(app.backend.stories_for("sub-5").await.len(), 2);

    // Running it again finds nothing left to mirror.
    let mirrored = app.core.history.sync_to_remote().await.unwrap();
    assert_eq!(mirrored, 0);
}

#[tokio::test]
async fn test_offline_read_of_cached_story() {
    let app = test_app();
    app.sessions
        .set_session(Some(Session {
            user_id: "user-2".to_string(),
            access_token: "test-token".to_string(),
        }))
        .await;
    app.backend.insert_profile(Profile::new("user-2", Utc::now())).await;

    app.core
        .history
        .save_story(&story("local-1", "Readable Offline", WORDS), EntitlementStatus::Connected)
        .await
        .unwrap();

    app.backend.set_offline(true);
    let loaded = app.core.history.load_story("local-1").await.unwrap();
    assert_eq!(loaded.title, "Readable Offline");
}
