//! Case difficulty tiers and label normalisation.
//!
//! Case content carries free-text difficulty labels ("Easy", "Medium - ED",
//! "Advanced Cardiology", ...). Progress is bucketed into exactly three tiers,
//! so labels are normalised at the boundary by case-insensitive substring
//! matching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty bucket used for segmented progress averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
}

/// Keywords checked in order; the first tier with a matching keyword wins.
const TIER_KEYWORDS: [(DifficultyTier, &[&str]); 3] = [
    (DifficultyTier::Beginner, &["easy", "beginner"]),
    (DifficultyTier::Intermediate, &["intermediate", "medium"]),
    (DifficultyTier::Advanced, &["hard", "advanced", "expert"]),
];

impl DifficultyTier {
    /// All tiers in ascending difficulty.
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Beginner,
        DifficultyTier::Intermediate,
        DifficultyTier::Advanced,
    ];

    /// Tier assigned to labels that match no keyword when running leniently.
    pub const FALLBACK: DifficultyTier = DifficultyTier::Beginner;

    /// Normalises a free-text difficulty label.
    ///
    /// Returns `None` when the label matches none of the known keywords.
    pub fn normalize(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        TIER_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| label.contains(k)))
            .map(|(tier, _)| *tier)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "beginner",
            DifficultyTier::Intermediate => "intermediate",
            DifficultyTier::Advanced => "advanced",
        }
    }

    /// Parses the storage representation produced by [`as_str`](Self::as_str).
    pub fn from_storage(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(DifficultyTier::Beginner),
            "intermediate" => Some(DifficultyTier::Intermediate),
            "advanced" => Some(DifficultyTier::Advanced),
            _ => None,
        }
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "Beginner",
            DifficultyTier::Intermediate => "Intermediate",
            DifficultyTier::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_beginner_labels() {
        assert_eq!(DifficultyTier::normalize("Easy"), Some(DifficultyTier::Beginner));
        assert_eq!(
            DifficultyTier::normalize("BEGINNER friendly"),
            Some(DifficultyTier::Beginner)
        );
    }

    #[test]
    fn normalizes_intermediate_labels() {
        assert_eq!(
            DifficultyTier::normalize("Intermediate"),
            Some(DifficultyTier::Intermediate)
        );
        assert_eq!(
            DifficultyTier::normalize("medium - emergency"),
            Some(DifficultyTier::Intermediate)
        );
    }

    #[test]
    fn normalizes_advanced_labels() {
        for label in ["Hard", "advanced cardiology", "Expert", "EXPERT ONLY"] {
            assert_eq!(
                DifficultyTier::normalize(label),
                Some(DifficultyTier::Advanced),
                "label {:?}",
                label
            );
        }
    }

    #[test]
    fn unrecognized_label_is_none() {
        assert_eq!(DifficultyTier::normalize("Level 3"), None);
        assert_eq!(DifficultyTier::normalize(""), None);
    }

    #[test]
    fn earlier_keywords_take_precedence() {
        // "easy" is checked before "hard"
        assert_eq!(
            DifficultyTier::normalize("hard but easy to start"),
            Some(DifficultyTier::Beginner)
        );
    }

    #[test]
    fn storage_representation_roundtrips() {
        for tier in DifficultyTier::ALL {
            assert_eq!(DifficultyTier::from_storage(tier.as_str()), Some(tier));
        }
        assert_eq!(DifficultyTier::from_storage("Beginner"), None);
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&DifficultyTier::Intermediate).unwrap();
        assert_eq!(json, "\"intermediate\"");
    }
}
