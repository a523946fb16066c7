//! Force vocabulary - the five JTBD forces and their static properties.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Lowest valid force strength.
pub const MIN_FORCE_STRENGTH: f64 = 1.0;

/// Highest valid force strength.
pub const MAX_FORCE_STRENGTH: f64 = 5.0;

/// Midpoint of the strength scale.
pub const NEUTRAL_FORCE_STRENGTH: f64 = 3.0;

/// One of the five psychological forces acting on a switching decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Force {
    Demographic,
    PainOfOld,
    PullOfNew,
    AnchorsToOld,
    AnxietyOfNew,
}

/// Semantic grouping of a force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceKind {
    /// Motivates leaving the current solution.
    Push,
    /// Attracts toward the new solution.
    Pull,
    /// Resists change.
    Barrier,
}

impl Force {
    /// All forces in declaration order.
    pub const ALL: [Force; 5] = [
        Force::Demographic,
        Force::PainOfOld,
        Force::PullOfNew,
        Force::AnchorsToOld,
        Force::AnxietyOfNew,
    ];

    /// All forces in tie-break priority order, highest priority first.
    pub const BY_PRIORITY: [Force; 5] = [
        Force::PainOfOld,
        Force::PullOfNew,
        Force::AnchorsToOld,
        Force::AnxietyOfNew,
        Force::Demographic,
    ];

    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Force::Demographic => "demographic",
            Force::PainOfOld => "pain_of_old",
            Force::PullOfNew => "pull_of_new",
            Force::AnchorsToOld => "anchors_to_old",
            Force::AnxietyOfNew => "anxiety_of_new",
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Force::Demographic => "Demographic",
            Force::PainOfOld => "Pain of the Old",
            Force::PullOfNew => "Pull of the New",
            Force::AnchorsToOld => "Anchors to the Old",
            Force::AnxietyOfNew => "Anxiety of the New",
        }
    }

    /// Returns the semantic grouping of this force.
    pub fn kind(&self) -> ForceKind {
        match self {
            Force::PainOfOld | Force::Demographic => ForceKind::Push,
            Force::PullOfNew => ForceKind::Pull,
            Force::AnchorsToOld | Force::AnxietyOfNew => ForceKind::Barrier,
        }
    }

    /// Tie-break rank; lower wins.
    pub fn priority_rank(&self) -> u8 {
        match self {
            Force::PainOfOld => 0,
            Force::PullOfNew => 1,
            Force::AnchorsToOld => 2,
            Force::AnxietyOfNew => 3,
            Force::Demographic => 4,
        }
    }

    /// Returns true for push and pull forces.
    pub fn is_driver(&self) -> bool {
        !self.is_barrier()
    }

    /// Returns true for barrier-type forces.
    pub fn is_barrier(&self) -> bool {
        self.kind() == ForceKind::Barrier
    }
}

impl fmt::Display for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Force {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Force::ALL
            .iter()
            .copied()
            .find(|force| force.as_str() == s.trim())
            .ok_or_else(|| ValidationError::invalid_format("force", format!("unknown force '{}'", s)))
    }
}

/// Orders forces by strength descending, then by priority rank.
pub fn rank_by_strength(entries: &mut [(Force, f64)]) {
    entries.sort_by(|(fa, sa), (fb, sb)| {
        sb.total_cmp(sa)
            .then_with(|| fa.priority_rank().cmp(&fb.priority_rank()))
    });
}

/// Method used to aggregate response intensities into a force strength.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    #[default]
    WeightedAverage,
    Median,
    Mode,
    TrimmedMean,
}

impl AggregationMethod {
    /// All supported methods.
    pub const ALL: [AggregationMethod; 4] = [
        AggregationMethod::WeightedAverage,
        AggregationMethod::Median,
        AggregationMethod::Mode,
        AggregationMethod::TrimmedMean,
    ];

    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::WeightedAverage => "weighted_average",
            AggregationMethod::Median => "median",
            AggregationMethod::Mode => "mode",
            AggregationMethod::TrimmedMean => "trimmed_mean",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregationMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationMethod::ALL
            .iter()
            .copied()
            .find(|method| method.as_str() == s.trim())
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "aggregation_method",
                    format!("unknown aggregation method '{}'", s),
                )
            })
    }
}

/// Returns true if a strength value lies on the valid scale.
pub fn is_valid_strength(value: f64) -> bool {
    (MIN_FORCE_STRENGTH..=MAX_FORCE_STRENGTH).contains(&value)
}
