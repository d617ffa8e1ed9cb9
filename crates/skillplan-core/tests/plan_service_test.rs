//! Integration tests for the plan service layer.
//!
//! Each test creates an isolated temporary database on the shared
//! PostgreSQL instance from `skillplan-test-utils`.

use skillplan_core::plan::{
    Difficulty, GenerationRequest, PlanKind, SchemaVariant, complete_day, delete_plan, load_plan,
    save_generated_plan, validate, validate_with,
};
use skillplan_db::queries::plans;
use skillplan_test_utils::fixtures::{flat_plan, nested_plan};
use skillplan_test_utils::{create_test_db, drop_test_db};
use uuid::Uuid;

#[tokio::test]
async fn save_and_load_round_trip() {
    let (pool, db_name) = create_test_db().await;

    let request = GenerationRequest::new("guitar", PlanKind::Skill).unwrap();
    let plan = validate(&flat_plan().to_string()).unwrap();
    let record = save_generated_plan(&pool, &request, &plan, None)
        .await
        .unwrap();

    assert_eq!(record.topic, "guitar");
    assert_eq!(record.kind, PlanKind::Skill);
    assert_eq!(record.difficulty, None);
    assert!(record.completed_days.is_empty());

    let (loaded, loaded_plan) = load_plan(&pool, record.id).await.unwrap();
    assert_eq!(loaded.id, record.id);
    assert_eq!(loaded_plan, plan);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn requested_difficulty_is_persisted() {
    let (pool, db_name) = create_test_db().await;

    let request = GenerationRequest::new("guitar", PlanKind::Skill)
        .unwrap()
        .with_difficulty(Difficulty::Intermediate);
    let plan = validate(&flat_plan().to_string()).unwrap();
    let record = save_generated_plan(&pool, &request, &plan, None)
        .await
        .unwrap();
    assert_eq!(record.difficulty, Some(Difficulty::Intermediate));

    let (loaded, _) = load_plan(&pool, record.id).await.unwrap();
    assert_eq!(loaded.difficulty, Some(Difficulty::Intermediate));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn nested_plan_keeps_its_variant() {
    let (pool, db_name) = create_test_db().await;

    let request = GenerationRequest::new("chess", PlanKind::Skill)
        .unwrap()
        .with_variant(SchemaVariant::NestedResources);
    let plan = validate_with(&nested_plan().to_string(), SchemaVariant::NestedResources).unwrap();
    let record = save_generated_plan(&pool, &request, &plan, None)
        .await
        .unwrap();
    assert_eq!(record.schema_variant, SchemaVariant::NestedResources);

    let (_, loaded) = load_plan(&pool, record.id).await.unwrap();
    assert_eq!(loaded.day(1).unwrap().tasks[0].resources.len(), 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn habit_plan_stores_target_streak() {
    let (pool, db_name) = create_test_db().await;

    let request = GenerationRequest::new("meditation", PlanKind::Habit).unwrap();
    let plan = validate(&flat_plan().to_string()).unwrap();
    let record = save_generated_plan(&pool, &request, &plan, Some(45))
        .await
        .unwrap();
    assert_eq!(record.target_streak, Some(45));

    let err = save_generated_plan(&pool, &request, &plan, Some(0))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("target streak"));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn complete_day_is_idempotent_and_tracks_progress() {
    let (pool, db_name) = create_test_db().await;

    let request = GenerationRequest::new("guitar", PlanKind::Skill).unwrap();
    let plan = validate(&flat_plan().to_string()).unwrap();
    let record = save_generated_plan(&pool, &request, &plan, None)
        .await
        .unwrap();

    let first = complete_day(&pool, record.id, 1).await.unwrap();
    assert_eq!(first.completed_days, vec![1]);
    assert_eq!(first.current_day, 2);

    let again = complete_day(&pool, record.id, 1).await.unwrap();
    assert_eq!(again, first);

    for day in 2..=30 {
        complete_day(&pool, record.id, day).await.unwrap();
    }
    let done = complete_day(&pool, record.id, 30).await.unwrap();
    assert!(done.completed);
    assert_eq!(done.current_day, 30);

    let stored = plans::get_plan(&pool, record.id).await.unwrap().unwrap();
    assert_eq!(stored.completed_days.len(), 30);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn complete_day_rejects_out_of_range_and_unknown_plan() {
    let (pool, db_name) = create_test_db().await;

    let request = GenerationRequest::new("guitar", PlanKind::Skill).unwrap();
    let plan = validate(&flat_plan().to_string()).unwrap();
    let record = save_generated_plan(&pool, &request, &plan, None)
        .await
        .unwrap();

    for day in [0, 31] {
        let err = complete_day(&pool, record.id, day).await.unwrap_err();
        assert!(err.to_string().contains("day must be between"));
    }

    let err = complete_day(&pool, Uuid::new_v4(), 1).await.unwrap_err();
    assert!(err.to_string().contains("not found"));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_removes_plan() {
    let (pool, db_name) = create_test_db().await;

    let request = GenerationRequest::new("guitar", PlanKind::Skill).unwrap();
    let plan = validate(&flat_plan().to_string()).unwrap();
    let record = save_generated_plan(&pool, &request, &plan, None)
        .await
        .unwrap();

    delete_plan(&pool, record.id).await.unwrap();
    assert!(plans::get_plan(&pool, record.id).await.unwrap().is_none());
    assert!(delete_plan(&pool, record.id).await.is_err());

    pool.close().await;
    drop_test_db(&db_name).await;
}
