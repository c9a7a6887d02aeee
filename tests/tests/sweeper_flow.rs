//! The sweeper turns entities that were saved without an embedding
//! into matchable ones, and leaves nothing behind for a second pass.

use pretty_assertions::assert_eq;
use teammatch_core::{ProfileRepository, ProjectRepository, UserId};
use teammatch_engine::test_utils::{sample_profile, sample_project};
use teammatch_engine::SweepTarget;
use teammatch_tests::stack;

#[tokio::test]
async fn sweep_makes_raw_entities_matchable() {
    let stack = stack();

    // Saved directly, as an API would on signup; no embeddings yet.
    let profile = sample_profile(UserId::new_v4());
    stack.profiles.save(&profile).await.unwrap();
    let project = sample_project(UserId::new_v4());
    stack.projects.save(&project).await.unwrap();

    let before = stack
        .matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert!(before.is_empty());

    let stats = stack.sweeper.run_once(SweepTarget::All).await;
    assert_eq!(stats.profiles_fixed, 1);
    assert_eq!(stats.projects_fixed, 1);
    assert_eq!(stats.errors, 0);

    let after = stack
        .matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].project.id, project.id);
}

#[tokio::test]
async fn second_sweep_has_nothing_to_repair() {
    let stack = stack();
    stack
        .profiles
        .save(&sample_profile(UserId::new_v4()))
        .await
        .unwrap();
    stack
        .projects
        .save(&sample_project(UserId::new_v4()))
        .await
        .unwrap();

    stack.sweeper.run_once(SweepTarget::All).await;
    let again = stack.sweeper.run_once(SweepTarget::All).await;

    assert_eq!(again.profiles_processed, 0);
    assert_eq!(again.projects_processed, 0);
    assert_eq!(stack.sweeper.totals().await.runs, 2);
}

#[tokio::test]
async fn incomplete_profiles_stay_unmatchable_across_sweeps() {
    let stack = stack();
    let project = sample_project(UserId::new_v4());
    stack.projects.save(&project).await.unwrap();

    let mut unfinished = sample_profile(UserId::new_v4());
    unfinished.experience_level = None;
    stack.profiles.save(&unfinished).await.unwrap();

    let stats = stack.sweeper.run_once(SweepTarget::All).await;
    assert_eq!(stats.profiles_processed, 1);
    assert_eq!(stats.profiles_fixed, 0);
    assert_eq!(stats.projects_fixed, 1);

    let matches = stack
        .matching
        .find_teammate_matches(project.id, 5)
        .await
        .unwrap();
    assert!(matches.is_empty());
}
