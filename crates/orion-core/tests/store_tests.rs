mod common;

use common::{create_test_store, sample_plan};
use jiff::{Timestamp, ToSpan};
use orion_core::{MemoryPlanStore, OrionError, PlanStore, SqlitePlanStore};
use serde_json::json;

#[tokio::test]
async fn test_open_creates_parent_directories() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("deeper").join("orion.db");

    let store = SqlitePlanStore::open(&path).await.unwrap();
    assert!(path.exists());
    assert_eq!(store.path(), path);
}

#[tokio::test]
async fn test_put_and_get_round_trip() {
    let (_dir, store) = create_test_store().await;
    let mut plan = sample_plan("plan_a");
    let mut params = serde_json::Map::new();
    params.insert("limit".into(), json!(25));
    plan.steps[1].params = Some(params);

    store.put(plan.clone()).await.unwrap();
    let loaded = store.get("plan_a").await.unwrap().expect("plan should exist");

    assert_eq!(loaded, plan);
    assert_eq!(loaded.steps[0].tool_refs, vec!["inbox.triage"]);
    assert_eq!(loaded.steps[1].params.as_ref().unwrap()["limit"], 25);
}

#[tokio::test]
async fn test_get_unknown_plan() {
    let (_dir, store) = create_test_store().await;
    assert!(store.get("plan_missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_plan_is_rejected_and_original_kept() {
    let (_dir, store) = create_test_store().await;
    store.put(sample_plan("plan_a")).await.unwrap();

    let mut other = sample_plan("plan_a");
    other.metadata.goal = "Something else".into();
    let err = store.put(other).await.unwrap_err();

    assert!(matches!(err, OrionError::DuplicatePlan { ref id } if id == "plan_a"));
    let kept = store.get("plan_a").await.unwrap().unwrap();
    assert_eq!(kept.metadata.goal, "Morning routine");
}

#[tokio::test]
async fn test_plan_without_steps_is_rejected() {
    let (_dir, store) = create_test_store().await;
    let mut plan = sample_plan("plan_a");
    plan.steps.clear();

    assert!(matches!(
        store.put(plan).await,
        Err(OrionError::InvalidInput { ref field, .. }) if field == "steps"
    ));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_deletes_plan_and_steps() {
    let (_dir, store) = create_test_store().await;
    store.put(sample_plan("plan_a")).await.unwrap();

    assert!(store.remove("plan_a").await.unwrap());
    assert!(!store.remove("plan_a").await.unwrap());
    assert!(store.get("plan_a").await.unwrap().is_none());

    // The id is free again, so no orphaned steps collide.
    store.put(sample_plan("plan_a")).await.unwrap();
}

#[tokio::test]
async fn test_list_is_newest_first_with_step_counts() {
    let (_dir, store) = create_test_store().await;
    let now = Timestamp::now();

    let mut older = sample_plan("plan_old");
    older.metadata.created_at = now - 2.hours();
    let mut newer = sample_plan("plan_new");
    newer.metadata.created_at = now;
    newer.steps.truncate(1);

    store.put(older).await.unwrap();
    store.put(newer).await.unwrap();

    let summaries = store.list().await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["plan_new", "plan_old"]);
    assert_eq!(summaries[0].total_steps, 1);
    assert_eq!(summaries[1].total_steps, 2);
    assert_eq!(summaries[1].goal, "Morning routine");
}

#[tokio::test]
async fn test_plans_survive_reopen() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("orion.db");

    SqlitePlanStore::open(&path)
        .await
        .unwrap()
        .put(sample_plan("plan_a"))
        .await
        .unwrap();

    let reopened = SqlitePlanStore::open(&path).await.unwrap();
    assert_eq!(reopened.get("plan_a").await.unwrap().unwrap().steps.len(), 2);
}

#[tokio::test]
async fn test_duplicate_step_ids_rejected_by_every_backend() {
    let (_dir, sqlite) = create_test_store().await;
    let stores: Vec<(&str, Box<dyn PlanStore>)> = vec![
        ("memory", Box::new(MemoryPlanStore::new())),
        ("sqlite", Box::new(sqlite)),
    ];

    for (backend, store) in stores {
        let mut plan = sample_plan("plan_dup");
        plan.steps[1].step_id = plan.steps[0].step_id.clone();

        let err = store.put(plan).await.unwrap_err();
        assert!(
            matches!(err, OrionError::InvalidInput { ref field, .. } if field == "steps"),
            "{backend} returned {err}"
        );
        assert!(store.get("plan_dup").await.unwrap().is_none(), "{backend} kept the plan");
    }
}

#[tokio::test]
async fn test_estimate_survives_round_trip() {
    let (_dir, store) = create_test_store().await;
    store.put(sample_plan("plan_a")).await.unwrap();

    let loaded = store.get("plan_a").await.unwrap().unwrap();
    assert_eq!(loaded.steps[0].estimated_duration.as_deref(), Some("5m"));
    assert_eq!(loaded.steps[1].estimated_duration, None);
}
