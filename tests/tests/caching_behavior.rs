//! Cache behavior across the whole engine: embeddings are generated
//! once per content version, match results are reused within their
//! hour bucket, and regenerating an embedding invalidates everything
//! derived from the old one.

use pretty_assertions::{assert_eq, assert_ne};
use teammatch_core::{score_compatibility, UserId};
use teammatch_engine::test_utils::{sample_profile, sample_project};
use teammatch_tests::stack;

#[tokio::test]
async fn embedding_generated_once_per_content_version() {
    let stack = stack();
    let profile = sample_profile(UserId::new_v4());
    stack.profiles.save(&profile).await.unwrap();

    assert!(stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap());
    assert!(stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap());
    assert_eq!(stack.provider.call_count(), 1);

    // New content means a new cache key, so the provider runs again.
    let mut changed = stack.profiles.find_by_id(&profile.id).await.unwrap().unwrap();
    changed.bio = "Completely new direction: embedded firmware".to_string();
    stack.profiles.save(&changed).await.unwrap();
    assert!(stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap());
    assert_eq!(stack.provider.call_count(), 2);
}

#[tokio::test]
async fn match_results_are_reused_within_the_hour_bucket() {
    let stack = stack();
    let profile = sample_profile(UserId::new_v4());
    stack.profiles.save(&profile).await.unwrap();
    stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap();

    let project = sample_project(UserId::new_v4());
    stack.projects.save(&project).await.unwrap();
    stack
        .matching
        .update_project_embedding(project.id)
        .await
        .unwrap();

    let first = stack
        .matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert_eq!(first.len(), 1);

    // Soft-delete the project; the cached result list keeps serving it
    // until the bucket rolls over or an invalidation fires.
    let mut gone = stack.projects.find_by_id(&project.id).await.unwrap().unwrap();
    gone.is_deleted = true;
    stack.projects.save(&gone).await.unwrap();

    let second = stack
        .matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn profile_regeneration_invalidates_its_match_results() {
    let stack = stack();
    let profile = sample_profile(UserId::new_v4());
    stack.profiles.save(&profile).await.unwrap();
    stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap();

    let mut project = sample_project(UserId::new_v4());
    project.required_skills = vec![
        "rust".to_string(),
        "python".to_string(),
        "django".to_string(),
    ];
    stack.projects.save(&project).await.unwrap();
    stack
        .matching
        .update_project_embedding(project.id)
        .await
        .unwrap();

    let before = stack
        .matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert_eq!(before.len(), 1);

    // The profile picks up the missing required skill: compatibility
    // must move.
    let mut grown = stack.profiles.find_by_id(&profile.id).await.unwrap().unwrap();
    grown.skills = vec![
        "rust".to_string(),
        "python".to_string(),
        "django".to_string(),
    ];
    stack.profiles.save(&grown).await.unwrap();
    stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap();

    let after = stack
        .matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_ne!(before[0].compatibility, after[0].compatibility);
    assert_eq!(
        after[0].compatibility,
        score_compatibility(&grown, &project).total
    );
}

#[tokio::test]
async fn project_regeneration_invalidates_teammate_results() {
    let stack = stack();
    let project = sample_project(UserId::new_v4());
    stack.projects.save(&project).await.unwrap();
    stack
        .matching
        .update_project_embedding(project.id)
        .await
        .unwrap();

    let candidate = sample_profile(UserId::new_v4());
    stack.profiles.save(&candidate).await.unwrap();
    stack
        .matching
        .update_profile_embedding(candidate.id)
        .await
        .unwrap();

    let before = stack
        .matching
        .find_teammate_matches(project.id, 5)
        .await
        .unwrap();
    assert_eq!(before.len(), 1);

    // The project now wants skills the candidate does not have.
    let mut pivoted = stack.projects.find_by_id(&project.id).await.unwrap().unwrap();
    pivoted.required_skills = vec!["haskell".to_string(), "nix".to_string()];
    stack.projects.save(&pivoted).await.unwrap();
    stack
        .matching
        .update_project_embedding(project.id)
        .await
        .unwrap();

    let after = stack
        .matching
        .find_teammate_matches(project.id, 5)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_ne!(before[0].compatibility, after[0].compatibility);
    assert_eq!(
        after[0].compatibility,
        score_compatibility(&candidate, &pivoted).total
    );
}
