//! Balance and recommendation threshold configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::analysis::{BalanceThresholds, PrioritizationWeights, RecommendationThresholds};

/// Tunable thresholds for balance analysis and recommendation rules
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdsConfig {
    #[serde(default)]
    pub balance: BalanceThresholds,

    #[serde(default)]
    pub recommendation: RecommendationThresholds,

    #[serde(default)]
    pub prioritization: PrioritizationWeights,
}

impl ThresholdsConfig {
    /// Validate threshold configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        on_scale("balance.barrier", self.balance.barrier)?;
        on_scale("balance.primary_driver", self.balance.primary_driver)?;
        on_scale("recommendation.high_force", self.recommendation.high_force)?;
        on_scale("recommendation.low_force", self.recommendation.low_force)?;
        fraction("recommendation.low_confidence", self.recommendation.low_confidence)?;
        fraction(
            "prioritization.low_confidence_threshold",
            self.prioritization.low_confidence_threshold,
        )?;

        if self.recommendation.low_force >= self.recommendation.high_force {
            return Err(ValidationError::InvertedForceThresholds);
        }

        let weights = [
            self.prioritization.impact,
            self.prioritization.effort,
            self.prioritization.confidence,
            self.prioritization.priority,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
            return Err(ValidationError::InvalidPrioritizationWeights);
        }
        Ok(())
    }
}

fn on_scale(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if (1.0..=5.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ThresholdOutOfRange(name))
    }
}

fn fraction(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::FractionOutOfRange(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_valid() {
        assert!(ThresholdsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_barrier_off_scale_rejected() {
        let mut config = ThresholdsConfig::default();
        config.balance.barrier = 6.0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ThresholdOutOfRange("balance.barrier"))
        ));
    }

    #[test]
    fn test_inverted_force_thresholds_rejected() {
        let mut config = ThresholdsConfig::default();
        config.recommendation.low_force = 4.5;
        assert!(matches!(config.validate(), Err(ValidationError::InvertedForceThresholds)));
    }

    #[test]
    fn test_low_confidence_must_be_fraction() {
        let mut config = ThresholdsConfig::default();
        config.recommendation.low_confidence = 1.5;
        assert!(matches!(config.validate(), Err(ValidationError::FractionOutOfRange(_))));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let mut config = ThresholdsConfig::default();
        config.prioritization = PrioritizationWeights {
            impact: 0.0,
            effort: 0.0,
            confidence: 0.0,
            priority: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPrioritizationWeights)
        ));
    }
}
