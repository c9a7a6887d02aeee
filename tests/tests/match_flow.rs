//! Full matching flow over the in-memory stack: entities are saved,
//! embedded through the service, indexed, and then matched.

use pretty_assertions::assert_eq;
use teammatch_core::{
    score_compatibility, ExperienceLevel, Profile, ProfileRepository, Project, ProjectRepository,
    ProjectStatus, UserId,
};
use teammatch_tests::{stack, TestStack};

fn seeded_profile(bio: &str, skills: &[&str]) -> Profile {
    let mut profile = Profile::new(UserId::new_v4(), bio);
    profile.skills = skills.iter().map(|s| s.to_string()).collect();
    profile.interests = vec!["realtime systems".to_string()];
    profile.preferred_roles = vec!["backend developer".to_string()];
    profile.experience_level = Some(ExperienceLevel::Intermediate);
    profile
}

fn seeded_project(title: &str, description: &str, required: &[&str]) -> Project {
    let mut project = Project::new(UserId::new_v4(), title, description);
    project.required_skills = required.iter().map(|s| s.to_string()).collect();
    project.looking_for = vec!["backend developer".to_string()];
    project
}

async fn embed_profile(stack: &TestStack, profile: &Profile) {
    stack.profiles.save(profile).await.unwrap();
    assert!(stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap());
}

async fn embed_project(stack: &TestStack, project: &Project) {
    stack.projects.save(project).await.unwrap();
    assert!(stack
        .matching
        .update_project_embedding(project.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn matches_rank_by_combined_score_and_respect_limit() {
    let stack = stack();
    let profile = seeded_profile("Backend developer into distributed systems", &["rust"]);
    embed_profile(&stack, &profile).await;

    let projects = [
        seeded_project("Chat server", "Realtime chat backend in Rust", &["rust"]),
        seeded_project("Recipe site", "A web app for sharing recipes", &["javascript"]),
        seeded_project("Trading bot", "Market data ingestion and analysis", &["python"]),
        seeded_project("Game engine", "A 2D game engine for jams", &["rust", "opengl"]),
    ];
    for project in &projects {
        embed_project(&stack, project).await;
    }

    let matches = stack
        .matching
        .find_project_matches(profile.user_id, 3)
        .await
        .unwrap();

    assert_eq!(matches.len(), 3);
    for pair in matches.windows(2) {
        assert!(pair[0].combined >= pair[1].combined);
    }
    for m in &matches {
        assert_eq!(m.combined, (m.similarity + m.compatibility) / 2.0);
        let expected = score_compatibility(&profile, &m.project);
        assert_eq!(m.compatibility, expected.total);
        assert_eq!(m.reasons, expected.reasons);
    }
}

#[tokio::test]
async fn own_and_closed_projects_never_surface() {
    let stack = stack();
    let profile = seeded_profile("Rust developer looking for a team", &["rust"]);
    embed_profile(&stack, &profile).await;

    let mut own = seeded_project("My project", "A project I already run", &["rust"]);
    own.owner_id = profile.user_id;
    embed_project(&stack, &own).await;

    let mut finished = seeded_project("Done project", "Shipped last year, in Rust", &["rust"]);
    finished.status = ProjectStatus::Completed;
    embed_project(&stack, &finished).await;

    let open = seeded_project("Open project", "Rust backend, recruiting now", &["rust"]);
    embed_project(&stack, &open).await;

    let matches = stack
        .matching
        .find_project_matches(profile.user_id, 10)
        .await
        .unwrap();

    let ids: Vec<_> = matches.iter().map(|m| m.project.id).collect();
    assert_eq!(ids, vec![open.id]);
}

#[tokio::test]
async fn teammate_search_mirrors_project_search() {
    let stack = stack();
    let project = seeded_project("Chat server", "Realtime chat backend in Rust", &["rust"]);
    embed_project(&stack, &project).await;

    let mut owners_own = seeded_profile("I own the project myself", &["rust"]);
    owners_own.user_id = project.owner_id;
    embed_profile(&stack, &owners_own).await;

    // Indexed like anyone else; the active check happens at query time.
    let mut inactive = seeded_profile("Rust developer, currently away", &["rust"]);
    inactive.is_active = false;
    embed_profile(&stack, &inactive).await;

    let candidate = seeded_profile("Rust developer who loves chat systems", &["rust"]);
    embed_profile(&stack, &candidate).await;

    let matches = stack
        .matching
        .find_teammate_matches(project.id, 10)
        .await
        .unwrap();

    let ids: Vec<_> = matches.iter().map(|m| m.profile.id).collect();
    assert_eq!(ids, vec![candidate.id]);
    let m = &matches[0];
    assert_eq!(m.combined, (m.similarity + m.compatibility) / 2.0);
    let expected = score_compatibility(&candidate, &project);
    assert_eq!(m.compatibility, expected.total);
}
