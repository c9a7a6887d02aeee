//! Cache key families and TTL policy.
//!
//! Three namespaces with independent TTLs: embeddings (`embed:`),
//! compatibility scores (`compat:`), and assembled match results
//! (`matches:`). Invalidating one family never requires scanning another.
//! Builders cap oversized keys so backends with key-length limits stay
//! usable.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;
use teammatch_core::{ProfileId, ProjectId};

/// Embedding entries survive a week: the input text is part of the key,
/// so stale vectors can only be returned for identical content.
pub const EMBEDDING_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Compatibility scores are cheap to recompute; six hours bounds drift
/// between entity edits that slip past invalidation.
pub const COMPATIBILITY_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Match results are bucketed per hour; the TTL is a safety net on top of
/// the bucket key rolling over.
pub const MATCH_RESULTS_TTL: Duration = Duration::from_secs(60 * 60);

/// Longest key accepted verbatim; longer keys collapse to a digest form.
pub const MAX_KEY_LEN: usize = 200;

/// Which side of the marketplace a match-result entry serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Projects recommended to a user
    Projects,
    /// Candidate teammates recommended to a project
    Teammates,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchKind::Projects => "projects",
            MatchKind::Teammates => "teammates",
        };
        write!(f, "{}", s)
    }
}

/// Hex digest identifying an embedding input: text, use case, and model
/// all participate, so a model change never serves old vectors.
pub fn content_hash(text: &str, use_case: &str, model: &str) -> String {
    let digest = Sha256::digest(format!("{}:{}:{}", text, use_case, model).as_bytes());
    hex::encode(digest)
}

/// `embed:{use_case}:{content_hash}`
pub fn embedding_key(use_case: &str, content_hash: &str) -> String {
    cap_key("embed", format!("embed:{}:{}", use_case, content_hash))
}

/// `compat:{profile_id}:{project_id}`
pub fn compatibility_key(profile_id: &ProfileId, project_id: &ProjectId) -> String {
    cap_key("compat", format!("compat:{}:{}", profile_id, project_id))
}

/// Pattern matching every compatibility entry for one profile.
pub fn compatibility_pattern_for_profile(profile_id: &ProfileId) -> String {
    format!("compat:{}:*", profile_id)
}

/// Pattern matching every compatibility entry for one project.
pub fn compatibility_pattern_for_project(project_id: &ProjectId) -> String {
    format!("compat:*:{}", project_id)
}

/// `matches:{kind}:{requester_id}:{limit}:{hour_bucket}`
pub fn match_results_key(
    kind: MatchKind,
    requester_id: impl fmt::Display,
    limit: usize,
    bucket: &str,
) -> String {
    cap_key(
        "matches",
        format!("matches:{}:{}:{}:{}", kind, requester_id, limit, bucket),
    )
}

/// Pattern matching every match-result entry for one requester.
pub fn match_results_pattern(kind: MatchKind, requester_id: impl fmt::Display) -> String {
    format!("matches:{}:{}:*", kind, requester_id)
}

/// UTC hour bucket, `YYYYMMDDHH`. All hosts agree on bucket boundaries.
pub fn hour_bucket(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H").to_string()
}

fn cap_key(family: &str, key: String) -> String {
    if key.len() <= MAX_KEY_LEN {
        return key;
    }
    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    format!("{}:hash:{}", family, &digest[..16])
}
