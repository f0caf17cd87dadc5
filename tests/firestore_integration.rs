// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! FIRESTORE_EMULATOR_HOST to point at it; otherwise they are skipped.
//!
//! Tests share one emulator project, so every test works on its own names.

use diet_gateway::db::ProfileStore;
use diet_gateway::models::PlanRecord;

mod common;
use common::{sample_profile, test_db};

/// Generate a unique profile name for test isolation.
fn unique_name(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_profile_upsert_and_find() {
    require_emulator!();

    let db = test_db().await;
    let name = unique_name("alice");

    let before = db.find_by_name(&name).await.unwrap();
    assert!(before.is_none(), "Profile should not exist before creation");

    let stored = db.upsert(&sample_profile(&name)).await.unwrap();
    assert!(stored.updated_at.is_some(), "upsert should stamp updated_at");

    let fetched = db.find_by_name(&name).await.unwrap().unwrap();
    assert_eq!(fetched.name, name);
    assert_eq!(fetched.age, 34);
    assert_eq!(fetched.diet_type, "vegetarian");
    assert!(fetched.plan_text.is_none());

    println!("✓ Profile created and verified: {}", name);
}

#[tokio::test]
async fn test_upsert_replaces_by_name() {
    require_emulator!();

    let db = test_db().await;
    let name = unique_name("bob");

    db.upsert(&sample_profile(&name)).await.unwrap();
    let mut updated = sample_profile(&name);
    updated.age = 35;
    updated.goal = "maintenance".to_string();
    db.upsert(&updated).await.unwrap();

    let fetched = db.find_by_name(&name).await.unwrap().unwrap();
    assert_eq!(fetched.age, 35);
    assert_eq!(fetched.goal, "maintenance");

    let matching = db
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.name == name)
        .count();
    assert_eq!(matching, 1, "Name must stay unique");
}

#[tokio::test]
async fn test_names_with_slashes() {
    require_emulator!();

    let db = test_db().await;
    let name = format!("{}/o'brien", unique_name("team"));

    db.upsert(&sample_profile(&name)).await.unwrap();

    let fetched = db.find_by_name(&name).await.unwrap().unwrap();
    assert_eq!(fetched.name, name);
}

#[tokio::test]
async fn test_find_by_phone() {
    require_emulator!();

    let db = test_db().await;
    let name = unique_name("carol");
    let phone = unique_name("555");
    let mut profile = sample_profile(&name);
    profile.phone = Some(phone.clone());
    db.upsert(&profile).await.unwrap();

    let fetched = db.find_by_phone(&phone).await.unwrap().unwrap();
    assert_eq!(fetched.name, name);

    let missing = db.find_by_phone(&unique_name("000")).await.unwrap();
    assert!(missing.is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// PLAN TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_plan_and_last_error() {
    require_emulator!();

    let db = test_db().await;
    let name = unique_name("dave");
    db.upsert(&sample_profile(&name)).await.unwrap();

    let with_plan = db.set_plan(&name, "Day 1: lentil soup").await.unwrap();
    assert_eq!(with_plan.plan_text.as_deref(), Some("Day 1: lentil soup"));

    // A failure is recorded beside the plan, never in place of it
    db.set_last_error(&name, "upstream timed out").await.unwrap();
    let fetched = db.find_by_name(&name).await.unwrap().unwrap();
    assert_eq!(fetched.plan_text.as_deref(), Some("Day 1: lentil soup"));
    assert_eq!(fetched.last_error.as_deref(), Some("upstream timed out"));

    // The next success clears the error
    db.set_plan(&name, "Day 1: chickpea salad").await.unwrap();
    let fetched = db.find_by_name(&name).await.unwrap().unwrap();
    assert_eq!(fetched.plan_text.as_deref(), Some("Day 1: chickpea salad"));
    assert!(fetched.last_error.is_none());
}

#[tokio::test]
async fn test_failure_write_never_restores_older_plan() {
    require_emulator!();

    let db = test_db().await;
    let name = unique_name("frank");
    db.upsert(&sample_profile(&name)).await.unwrap();
    db.set_plan(&name, "Plan v0").await.unwrap();

    // Failure writes overlap a successful one; none of them may carry the
    // plan they read back over the newer plan.
    let failures: Vec<_> = (0..8)
        .map(|i| {
            let db = db.clone();
            let name = name.clone();
            tokio::spawn(async move { db.set_last_error(&name, &format!("timeout {}", i)).await })
        })
        .collect();
    db.set_plan(&name, "Plan v1").await.unwrap();
    for handle in failures {
        handle.await.unwrap().unwrap();
    }

    let fetched = db.find_by_name(&name).await.unwrap().unwrap();
    assert_eq!(fetched.plan_text.as_deref(), Some("Plan v1"));
}

#[tokio::test]
async fn test_set_plan_unknown_profile() {
    require_emulator!();

    let db = test_db().await;

    let result = db.set_plan(&unique_name("ghost"), "plan").await;
    assert!(matches!(
        result,
        Err(diet_gateway::error::AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_record_plan() {
    require_emulator!();

    let db = test_db().await;
    let record = PlanRecord {
        created_by: "trainer".to_string(),
        created_for: unique_name("erin"),
        plan_body: "Day 1: oats".to_string(),
        plan_type: "7 days".to_string(),
        created_at: "2026-01-15T10:00:00Z".to_string(),
    };

    db.record_plan(&record).await.unwrap();
    // Records are append-only; writing the same content twice is allowed
    db.record_plan(&record).await.unwrap();
}
