//! Mapping of free-text survey answers onto the canonical answer tokens.

use serde::{Deserialize, Serialize};

/// Canonical answer to a yes/no accessibility question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedAnswer {
    Yes,
    No,
    Unsure,
    Na,
}

impl NormalizedAnswer {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NormalizedAnswer::Yes => "yes",
            NormalizedAnswer::No => "no",
            NormalizedAnswer::Unsure => "unsure",
            NormalizedAnswer::Na => "na",
        }
    }
}

impl std::fmt::Display for NormalizedAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a survey answer to a [`NormalizedAnswer`].
///
/// Matching is exact and case-sensitive. Anything outside the survey's four
/// options, including an absent answer, is `Unsure`.
#[must_use]
pub fn normalize_answer(answer: Option<&str>) -> NormalizedAnswer {
    match answer {
        Some("Yes") => NormalizedAnswer::Yes,
        Some("No") => NormalizedAnswer::No,
        Some("N/A no steps on entry") => NormalizedAnswer::Na,
        _ => NormalizedAnswer::Unsure,
    }
}
