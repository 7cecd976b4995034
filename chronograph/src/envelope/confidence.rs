//! `ConfidenceBreakdown`: five-factor decomposition from which overall confidence
//! is computed as a weighted mean over *present* factors (spec §3, §8 invariant 1).

use serde::{Deserialize, Serialize};

/// Per-factor weights. Defaults match §4.1 phase 2: 0.25/0.25/0.1/0.2/0.2 for
/// dataCompleteness/semanticCoherence/externalValidation/upstreamInfluence/processingQuality.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub data_completeness: f64,
    pub semantic_coherence: f64,
    pub external_validation: f64,
    pub upstream_influence: f64,
    pub processing_quality: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            data_completeness: 0.25,
            semantic_coherence: 0.25,
            external_validation: 0.1,
            upstream_influence: 0.2,
            processing_quality: 0.2,
        }
    }
}

/// Five-factor confidence decomposition. `external_validation` is the only optional
/// factor; when absent the remaining weights are sum-normalized.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub data_completeness: f64,
    pub semantic_coherence: f64,
    pub external_validation: Option<f64>,
    pub upstream_influence: f64,
    pub processing_quality: f64,
    pub weights: ConfidenceWeightsOverride,
}

/// Explicit per-factor weight map attached to a breakdown (spec §3: "explicit
/// per-factor weight map"). Wraps [`ConfidenceWeights`] so it round-trips with the breakdown.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ConfidenceWeightsOverride(pub ConfidenceWeights);

impl ConfidenceBreakdown {
    pub fn new(
        data_completeness: f64,
        semantic_coherence: f64,
        upstream_influence: f64,
        processing_quality: f64,
    ) -> Self {
        Self {
            data_completeness,
            semantic_coherence,
            external_validation: None,
            upstream_influence,
            processing_quality,
            weights: ConfidenceWeightsOverride::default(),
        }
    }

    pub fn with_external_validation(mut self, value: f64) -> Self {
        self.external_validation = Some(value);
        self
    }

    pub fn with_weights(mut self, weights: ConfidenceWeights) -> Self {
        self.weights = ConfidenceWeightsOverride(weights);
        self
    }

    /// Weighted mean over present factors, sum-normalized (§8 invariant 1).
    pub fn overall_confidence(&self) -> f64 {
        let w = self.weights.0;
        let mut weighted_sum = w.data_completeness * self.data_completeness
            + w.semantic_coherence * self.semantic_coherence
            + w.upstream_influence * self.upstream_influence
            + w.processing_quality * self.processing_quality;
        let mut weight_total =
            w.data_completeness + w.semantic_coherence + w.upstream_influence + w.processing_quality;
        if let Some(ev) = self.external_validation {
            weighted_sum += w.external_validation * ev;
            weight_total += w.external_validation;
        }
        if weight_total == 0.0 {
            return 0.0;
        }
        weighted_sum / weight_total
    }

    /// `qualityScore = round(confidence * 100)` (§3 invariant).
    pub fn quality_score(&self) -> u8 {
        (self.overall_confidence() * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Upstream-influence attenuation per predecessor issue (§8 invariant 6): a critical
/// predecessor issue halves the weight applied to that predecessor's confidence, a
/// warning scales it by 0.8; both together compound to 0.4x.
pub fn attenuated_weight(has_critical: bool, has_warning: bool) -> f64 {
    let mut weight = 1.0;
    if has_critical {
        weight *= 0.5;
    }
    if has_warning {
        weight *= 0.8;
    }
    weight
}

/// Arithmetic mean of predecessor confidences, each scaled by [`attenuated_weight`],
/// normalized by the sum of weights. Returns 1.0 with no predecessors (§4.4 rule 3,
/// §8 boundary: "all predecessors skipped -> upstream influence = 1.0").
pub fn weighted_upstream_influence(predecessors: &[(f64, bool, bool)]) -> f64 {
    if predecessors.is_empty() {
        return 1.0;
    }
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for &(confidence, has_critical, has_warning) in predecessors {
        let weight = attenuated_weight(has_critical, has_warning);
        weighted_sum += weight * confidence;
        weight_total += weight;
    }
    if weight_total == 0.0 {
        return 1.0;
    }
    weighted_sum / weight_total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_matches_rounded_confidence() {
        let breakdown = ConfidenceBreakdown::new(0.8, 0.8, 1.0, 0.8);
        let confidence = breakdown.overall_confidence();
        assert_eq!(breakdown.quality_score(), (confidence * 100.0).round() as u8);
    }

    #[test]
    fn external_validation_absent_normalizes_remaining_weights() {
        let with_ev = ConfidenceBreakdown::new(1.0, 1.0, 1.0, 1.0).with_external_validation(1.0);
        let without_ev = ConfidenceBreakdown::new(1.0, 1.0, 1.0, 1.0);
        assert!((with_ev.overall_confidence() - 1.0).abs() < 1e-9);
        assert!((without_ev.overall_confidence() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn attenuation_matches_spec_constants() {
        assert_eq!(attenuated_weight(false, false), 1.0);
        assert_eq!(attenuated_weight(true, false), 0.5);
        assert_eq!(attenuated_weight(false, true), 0.8);
        assert!((attenuated_weight(true, true) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn no_predecessors_yields_full_upstream_confidence() {
        assert_eq!(weighted_upstream_influence(&[]), 1.0);
    }
}
