//! Rule-based compatibility scoring between a profile and a project.
//!
//! Pure and deterministic: no IO, no clock, no randomness. The component
//! weights and thresholds are product-tuned heuristics; tests pin them, so
//! changing any constant here is a product decision, not a refactor.

use crate::profile::Profile;
use crate::project::Project;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const SKILLS_WEIGHT: f64 = 0.30;
const EXPERIENCE_WEIGHT: f64 = 0.15;
const ROLES_WEIGHT: f64 = 0.25;
const AVAILABILITY_WEIGHT: f64 = 0.15;
const INTERESTS_WEIGHT: f64 = 0.15;

const MAX_REASONS: usize = 5;

/// Weighted compatibility between one profile and one project.
///
/// Every component and the total are in `[0.0, 1.0]`. `reasons` holds up
/// to five human-readable strings in fixed component order (skills,
/// experience, roles, availability, interests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    /// Weighted sum of the five components
    pub total: f64,

    /// Skill tag overlap, required skills weighted over preferred
    pub skills: f64,

    /// Experience level vs project difficulty
    pub experience: f64,

    /// Preferred role coverage of the project's open roles
    pub roles: f64,

    /// Fixed availability baseline
    pub availability: f64,

    /// Interest tags found in the project text
    pub interests: f64,

    /// Up to five match explanations, component order
    pub reasons: Vec<String>,
}

/// Score `profile` against `project`.
pub fn score_compatibility(profile: &Profile, project: &Project) -> CompatibilityScore {
    let mut reasons = Vec::new();

    let (skills, mut skill_reasons) = skills_component(profile, project);
    reasons.append(&mut skill_reasons);

    let (experience, experience_reason) = experience_component(profile, project);
    reasons.extend(experience_reason);

    let (roles, role_reason) = roles_component(profile, project);
    reasons.extend(role_reason);

    let (availability, availability_reason) = availability_component(profile);
    reasons.extend(availability_reason);

    let (interests, interest_reason) = interests_component(profile, project);
    reasons.extend(interest_reason);

    reasons.truncate(MAX_REASONS);

    let total = (skills * SKILLS_WEIGHT
        + experience * EXPERIENCE_WEIGHT
        + roles * ROLES_WEIGHT
        + availability * AVAILABILITY_WEIGHT
        + interests * INTERESTS_WEIGHT)
        .clamp(0.0, 1.0);

    CompatibilityScore {
        total,
        skills,
        experience,
        roles,
        availability,
        interests,
        reasons,
    }
}

/// Lowercased, trimmed, deduplicated tags in first-seen order. Scan order
/// determines reason wording, so it must stay deterministic.
fn normalized(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

fn skills_component(profile: &Profile, project: &Project) -> (f64, Vec<String>) {
    let user_skills = normalized(&profile.skills);
    let required = normalized(&project.required_skills);
    if user_skills.is_empty() || required.is_empty() {
        return (0.3, Vec::new());
    }
    let preferred = normalized(&project.preferred_skills);
    let user_set: HashSet<&str> = user_skills.iter().map(String::as_str).collect();

    let required_matches: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|s| user_set.contains(*s))
        .collect();
    let preferred_matches: Vec<&str> = preferred
        .iter()
        .map(String::as_str)
        .filter(|s| user_set.contains(*s))
        .collect();

    let required_score = required_matches.len() as f64 / required.len() as f64;
    let preferred_score = if preferred.is_empty() {
        0.0
    } else {
        preferred_matches.len() as f64 / preferred.len() as f64
    };

    // Required skills dominate the component.
    let score = required_score * 0.8 + preferred_score * 0.2;

    let mut reasons = Vec::new();
    if !required_matches.is_empty() {
        let shown = required_matches.len().min(3);
        reasons.push(format!(
            "Has required skills: {}",
            required_matches[..shown].join(", ")
        ));
    }
    if !preferred_matches.is_empty() {
        let shown = preferred_matches.len().min(2);
        reasons.push(format!(
            "Has preferred skills: {}",
            preferred_matches[..shown].join(", ")
        ));
    }

    (score, reasons)
}

fn experience_component(profile: &Profile, project: &Project) -> (f64, Option<String>) {
    let (level, difficulty) = match (profile.experience_level, project.difficulty) {
        (Some(level), Some(difficulty)) => (level, difficulty),
        _ => return (0.5, None),
    };

    let diff = (i16::from(level.rank()) - i16::from(difficulty.rank())).abs();
    let above = level.rank() > difficulty.rank();

    let (score, reason) = if diff == 0 {
        (
            1.0,
            format!("Perfect experience match for {} project", difficulty),
        )
    } else if diff == 1 && above {
        (
            0.8,
            format!("Good experience level for {} project", difficulty),
        )
    } else if diff == 1 {
        (
            0.6,
            "Slightly challenging but manageable project".to_string(),
        )
    } else {
        (0.3, "Experience level mismatch".to_string())
    };

    // Reasons surface only above the neutral score.
    if score > 0.5 {
        (score, Some(reason))
    } else {
        (score, None)
    }
}

fn roles_component(profile: &Profile, project: &Project) -> (f64, Option<String>) {
    let user_roles = normalized(&profile.preferred_roles);
    let needed = normalized(&project.looking_for);
    if user_roles.is_empty() || needed.is_empty() {
        return (0.5, None);
    }

    let needed_set: HashSet<&str> = needed.iter().map(String::as_str).collect();
    let matches: Vec<&str> = user_roles
        .iter()
        .map(String::as_str)
        .filter(|r| needed_set.contains(*r))
        .collect();

    let score = matches.len() as f64 / needed.len() as f64;
    let reason = if matches.is_empty() {
        None
    } else {
        let shown = matches.len().min(2);
        Some(format!("Wants to work as: {}", matches[..shown].join(", ")))
    };

    (score, reason)
}

fn availability_component(profile: &Profile) -> (f64, Option<String>) {
    // Availability text does not discriminate yet; fixed baseline.
    let reason = profile
        .availability
        .as_ref()
        .filter(|a| !a.trim().is_empty())
        .map(|a| format!("Available: {}", a));
    (0.7, reason)
}

fn interests_component(profile: &Profile, project: &Project) -> (f64, Option<String>) {
    let interests = normalized(&profile.interests);
    if interests.is_empty() {
        return (0.5, None);
    }

    let project_text = format!(
        "{} {} {}",
        project.title,
        project.description,
        project.project_type.as_deref().unwrap_or("")
    )
    .to_lowercase();

    let matches: Vec<&str> = interests
        .iter()
        .map(String::as_str)
        .filter(|i| project_text.contains(*i))
        .collect();

    let score = (0.4 + 0.3 * matches.len() as f64).min(1.0);
    let reason = if matches.is_empty() {
        None
    } else {
        let shown = matches.len().min(2);
        Some(format!("Matches interests: {}", matches[..shown].join(", ")))
    };

    (score, reason)
}
