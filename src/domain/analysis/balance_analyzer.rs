//! Force Balance Analyzer - Push/pull/barrier grouping and switch likelihood.
//!
//! Push forces (`pain_of_old`, `demographic`) and the pull force
//! (`pull_of_new`) drive a switch; `anchors_to_old` and `anxiety_of_new`
//! resist it. The likelihood maps their difference linearly onto `[0, 1]`
//! so that a perfectly balanced distribution scores exactly 0.5.

use serde::{Deserialize, Serialize};

use crate::domain::forces::{
    rank_by_strength, Force, ForceDistribution, ForceKind, MAX_FORCE_STRENGTH, MIN_FORCE_STRENGTH,
    NEUTRAL_FORCE_STRENGTH,
};

/// Default strength above which a barrier force is reported.
pub const DEFAULT_BARRIER_THRESHOLD: f64 = 2.0;

/// Default strength above which a driver is primary.
pub const DEFAULT_PRIMARY_DRIVER_THRESHOLD: f64 = 3.0;

/// Strength spread at which the separation factor saturates.
const FULL_SEPARATION_SPREAD: f64 = 2.0;

/// Tunable thresholds for balance analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceThresholds {
    pub barrier: f64,
    pub primary_driver: f64,
}

impl Default for BalanceThresholds {
    fn default() -> Self {
        Self {
            barrier: DEFAULT_BARRIER_THRESHOLD,
            primary_driver: DEFAULT_PRIMARY_DRIVER_THRESHOLD,
        }
    }
}

/// How the five forces net out for a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceBalance {
    pub push_forces: Vec<Force>,
    pub pull_forces: Vec<Force>,
    /// Barrier forces with evidence above the barrier threshold, strongest first.
    pub barriers: Vec<Force>,
    /// Probability-like score in `[0, 1]`.
    pub switch_likelihood: f64,
    pub primary_drivers: Vec<Force>,
    pub secondary_drivers: Vec<Force>,
    pub confidence: f64,
    /// Mean strength of push forces with evidence.
    pub push_strength: f64,
    pub pull_strength: f64,
    /// Combined strength of both barrier forces.
    pub barrier_strength: f64,
}

/// Analyzer for force balance.
#[derive(Debug, Clone, Default)]
pub struct ForceBalanceAnalyzer {
    thresholds: BalanceThresholds,
}

impl ForceBalanceAnalyzer {
    pub fn new(thresholds: BalanceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &BalanceThresholds {
        &self.thresholds
    }

    /// Analyzes a complete distribution.
    pub fn analyze(&self, distribution: &ForceDistribution) -> ForceBalance {
        let push_forces = forces_of_kind(ForceKind::Push);
        let pull_forces = forces_of_kind(ForceKind::Pull);

        let push_strength = {
            let with_evidence: Vec<f64> = push_forces
                .iter()
                .map(|f| distribution.get(*f))
                .filter(|s| s.has_evidence())
                .map(|s| s.strength)
                .collect();
            if with_evidence.is_empty() {
                NEUTRAL_FORCE_STRENGTH
            } else {
                with_evidence.iter().sum::<f64>() / with_evidence.len() as f64
            }
        };
        let pull_strength = distribution.strength_of(Force::PullOfNew);
        let barrier_strength =
            distribution.strength_of(Force::AnchorsToOld) + distribution.strength_of(Force::AnxietyOfNew);

        let switch_likelihood = Self::switch_likelihood(push_strength, pull_strength, barrier_strength);

        let mut barriers: Vec<(Force, f64)> = distribution
            .iter()
            .filter(|s| s.force.is_barrier() && s.has_evidence() && s.strength > self.thresholds.barrier)
            .map(|s| (s.force, s.strength))
            .collect();
        rank_by_strength(&mut barriers);

        let mut drivers: Vec<(Force, f64)> = distribution
            .iter()
            .filter(|s| s.force.is_driver())
            .map(|s| (s.force, s.strength))
            .collect();
        rank_by_strength(&mut drivers);

        let (primary, secondary): (Vec<(Force, f64)>, Vec<(Force, f64)>) =
            drivers.into_iter().partition(|(force, strength)| {
                distribution.get(*force).has_evidence() && *strength > self.thresholds.primary_driver
            });

        let confidence = Self::balance_confidence(distribution);

        tracing::debug!(
            survey_id = %distribution.survey_id,
            switch_likelihood,
            confidence,
            barriers = barriers.len(),
            "Analyzed force balance"
        );

        ForceBalance {
            push_forces,
            pull_forces,
            barriers: barriers.into_iter().map(|(f, _)| f).collect(),
            switch_likelihood,
            primary_drivers: primary.into_iter().map(|(f, _)| f).collect(),
            secondary_drivers: secondary.into_iter().map(|(f, _)| f).collect(),
            confidence,
            push_strength,
            pull_strength,
            barrier_strength,
        }
    }

    /// Normalizes `(push + pull) - barriers` from `[-8, 8]` onto `[0, 1]`.
    pub fn switch_likelihood(push_strength: f64, pull_strength: f64, barrier_strength: f64) -> f64 {
        let span = 2.0 * (MAX_FORCE_STRENGTH - MIN_FORCE_STRENGTH);
        let net = (push_strength + pull_strength) - barrier_strength;
        (0.5 + net / (2.0 * span)).clamp(0.0, 1.0)
    }

    /// Mean force confidence, halved when all strengths coincide.
    fn balance_confidence(distribution: &ForceDistribution) -> f64 {
        let strengths: Vec<f64> = distribution.iter().map(|s| s.strength).collect();
        let confidences: Vec<f64> = distribution.iter().map(|s| s.confidence).collect();

        let max = strengths.iter().copied().fold(f64::MIN, f64::max);
        let min = strengths.iter().copied().fold(f64::MAX, f64::min);
        let separation = ((max - min) / FULL_SEPARATION_SPREAD).min(1.0);
        let mean_confidence = confidences.iter().sum::<f64>() / confidences.len() as f64;

        (mean_confidence * (0.5 + 0.5 * separation)).clamp(0.0, 1.0)
    }
}

fn forces_of_kind(kind: ForceKind) -> Vec<Force> {
    Force::BY_PRIORITY
        .iter()
        .copied()
        .filter(|f| f.kind() == kind)
        .collect()
}
