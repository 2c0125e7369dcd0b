use crate::constants::ranges;
use crate::error::define_error_enum;
use serde::{Deserialize, Serialize};

/// Terrain efficiency multipliers applied to speed and energy cost.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainFactors {
    pub flat: f64,
    pub rocky: f64,
    pub soft: f64,
    pub loose: f64,
    pub aquatic: f64,
}

impl Default for TerrainFactors {
    fn default() -> Self {
        Self {
            flat: 1.0,
            rocky: 0.85,
            soft: 0.7,
            loose: 0.75,
            aquatic: 0.5,
        }
    }
}

/// Weights and label thresholds of the survival score.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurvivalScoring {
    /// Weight of the capped force ratio.
    pub force_weight: f64,
    /// Weight of the capped speed ratio.
    pub speed_weight: f64,
    /// Weight of the capped oxygen ratio.
    pub oxygen_weight: f64,
    /// Inclusive lower bound of the `high` label.
    pub high_threshold: f64,
    /// Inclusive lower bound of the `medium` label.
    pub medium_threshold: f64,
}

impl Default for SurvivalScoring {
    fn default() -> Self {
        Self {
            force_weight: 0.5,
            speed_weight: 0.3,
            oxygen_weight: 0.2,
            high_threshold: 0.75,
            medium_threshold: 0.45,
        }
    }
}

/// Trigger levels of the recommendation rules. A rule fires when its
/// input falls strictly below the threshold.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub oxygen: f64,
    pub temperature: f64,
    pub gravity: f64,
    pub speed_ratio: f64,
    pub terrain: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            oxygen: 0.9,
            temperature: 0.9,
            gravity: 0.95,
            speed_ratio: 0.85,
            terrain: 0.9,
        }
    }
}

/// Random-walk parameters for a single environment field.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DriftBounds {
    /// Largest absolute change per step. Zero freezes the field.
    pub max_step: f64,
    pub min: f64,
    pub max: f64,
}

impl DriftBounds {
    pub const fn new(max_step: f64, range: (f64, f64)) -> Self {
        Self {
            max_step,
            min: range.0,
            max: range.1,
        }
    }

    fn is_valid(&self) -> bool {
        self.max_step.is_finite()
            && self.max_step >= 0.0
            && self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
    }
}

/// Per-field drift of the animated timeline. Terrain and biome never drift.
///
/// Deserialization fills every missing bound from that field's own default,
/// so `{"altitude_m": {"max_step": 5.0}}` keeps the altitude range.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(from = "DriftConfigPatch")]
pub struct DriftConfig {
    pub pressure_kpa: DriftBounds,
    pub temperature_c: DriftBounds,
    pub altitude_m: DriftBounds,
    pub gravity_m_s2: DriftBounds,
    pub humidity_pct: DriftBounds,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            pressure_kpa: DriftBounds::new(2.0, ranges::PRESSURE_KPA),
            temperature_c: DriftBounds::new(1.0, ranges::TEMPERATURE_C),
            altitude_m: DriftBounds::new(50.0, ranges::ALTITUDE_M),
            gravity_m_s2: DriftBounds::new(0.05, ranges::GRAVITY_M_S2),
            humidity_pct: DriftBounds::new(2.0, ranges::HUMIDITY_PCT),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct DriftBoundsPatch {
    max_step: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

impl DriftBoundsPatch {
    fn apply(self, base: DriftBounds) -> DriftBounds {
        DriftBounds {
            max_step: self.max_step.unwrap_or(base.max_step),
            min: self.min.unwrap_or(base.min),
            max: self.max.unwrap_or(base.max),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct DriftConfigPatch {
    pressure_kpa: DriftBoundsPatch,
    temperature_c: DriftBoundsPatch,
    altitude_m: DriftBoundsPatch,
    gravity_m_s2: DriftBoundsPatch,
    humidity_pct: DriftBoundsPatch,
}

impl From<DriftConfigPatch> for DriftConfig {
    fn from(patch: DriftConfigPatch) -> Self {
        let base = DriftConfig::default();
        Self {
            pressure_kpa: patch.pressure_kpa.apply(base.pressure_kpa),
            temperature_c: patch.temperature_c.apply(base.temperature_c),
            altitude_m: patch.altitude_m.apply(base.altitude_m),
            gravity_m_s2: patch.gravity_m_s2.apply(base.gravity_m_s2),
            humidity_pct: patch.humidity_pct.apply(base.humidity_pct),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Use each organism's own temperature and oxygen optima instead of the
    /// fixed 25 °C optimum and the raw oxygen factor.
    pub use_organism_optima: bool,
    /// Terrain multiplier table.
    pub terrain: TerrainFactors,
    /// Survival score weights and label thresholds.
    pub survival: SurvivalScoring,
    /// Recommendation rule trigger levels.
    pub recommendations: RecommendationThresholds,
    /// Environment random walk used by timelines.
    pub drift: DriftConfig,
}

define_error_enum! {
    ModelConfigError {
        InvalidTerrainFactor { terrain: &'static str } => "terrain factor for {terrain} must be finite and positive";
        InvalidSurvivalWeight { weight: &'static str } => "survival {weight} must be finite and within [0,1]";
        SurvivalWeightsDoNotSumToOne { sum: f64 } => "survival weights must sum to 1.0 (got {sum})";
        InvalidSurvivalThresholds => "survival thresholds must be finite and satisfy 0 <= medium <= high <= 1";
        InvalidRecommendationThreshold { rule: &'static str } => "recommendation threshold for {rule} must be finite and non-negative";
        InvalidDriftBounds { field: &'static str } => "drift bounds for {field} must be finite with max_step >= 0 and min <= max";
    }
}

impl ModelConfig {
    const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

    pub fn validate(&self) -> Result<(), ModelConfigError> {
        self.validate_terrain()?;
        self.validate_survival()?;
        self.validate_recommendations()?;
        self.validate_drift()?;
        Ok(())
    }

    fn validate_terrain(&self) -> Result<(), ModelConfigError> {
        let t = &self.terrain;
        for (terrain, value) in [
            ("flat", t.flat),
            ("rocky", t.rocky),
            ("soft", t.soft),
            ("loose", t.loose),
            ("aquatic", t.aquatic),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ModelConfigError::InvalidTerrainFactor { terrain });
            }
        }
        Ok(())
    }

    fn validate_survival(&self) -> Result<(), ModelConfigError> {
        let s = &self.survival;
        for (weight, value) in [
            ("force_weight", s.force_weight),
            ("speed_weight", s.speed_weight),
            ("oxygen_weight", s.oxygen_weight),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(ModelConfigError::InvalidSurvivalWeight { weight });
            }
        }
        let sum = s.force_weight + s.speed_weight + s.oxygen_weight;
        if (sum - 1.0).abs() > Self::WEIGHT_SUM_TOLERANCE {
            return Err(ModelConfigError::SurvivalWeightsDoNotSumToOne { sum });
        }
        let ordered = s.medium_threshold.is_finite()
            && s.high_threshold.is_finite()
            && 0.0 <= s.medium_threshold
            && s.medium_threshold <= s.high_threshold
            && s.high_threshold <= 1.0;
        if !ordered {
            return Err(ModelConfigError::InvalidSurvivalThresholds);
        }
        Ok(())
    }

    fn validate_recommendations(&self) -> Result<(), ModelConfigError> {
        let r = &self.recommendations;
        for (rule, value) in [
            ("oxygen", r.oxygen),
            ("temperature", r.temperature),
            ("gravity", r.gravity),
            ("speed_ratio", r.speed_ratio),
            ("terrain", r.terrain),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ModelConfigError::InvalidRecommendationThreshold { rule });
            }
        }
        Ok(())
    }

    fn validate_drift(&self) -> Result<(), ModelConfigError> {
        let d = &self.drift;
        for (field, bounds) in [
            ("pressure_kpa", d.pressure_kpa),
            ("temperature_c", d.temperature_c),
            ("altitude_m", d.altitude_m),
            ("gravity_m_s2", d.gravity_m_s2),
            ("humidity_pct", d.humidity_pct),
        ] {
            if !bounds.is_valid() {
                return Err(ModelConfigError::InvalidDriftBounds { field });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ModelConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_config_json_deserializes_with_defaults() {
        let partial_json = r#"{
            "use_organism_optima": true,
            "terrain": { "rocky": 0.9 },
            "survival": { "high_threshold": 0.8 }
        }"#;
        let cfg: ModelConfig =
            serde_json::from_str(partial_json).expect("partial config should parse");
        assert!(cfg.use_organism_optima);
        assert_eq!(cfg.terrain.rocky, 0.9);
        assert_eq!(cfg.terrain.soft, 0.7);
        assert_eq!(cfg.survival.high_threshold, 0.8);
        assert_eq!(cfg.survival.medium_threshold, 0.45);
        assert_eq!(cfg.drift, DriftConfig::default());
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn partial_drift_entry_keeps_field_defaults() {
        let cfg: ModelConfig =
            serde_json::from_str(r#"{"drift":{"altitude_m":{"max_step":5.0}}}"#)
                .expect("partial drift should parse");
        let defaults = DriftConfig::default();
        assert_eq!(cfg.drift.altitude_m.max_step, 5.0);
        assert_eq!(cfg.drift.altitude_m.min, defaults.altitude_m.min);
        assert_eq!(cfg.drift.altitude_m.max, defaults.altitude_m.max);
        assert_eq!(cfg.drift.pressure_kpa, defaults.pressure_kpa);
        assert_eq!(cfg.drift.humidity_pct, defaults.humidity_pct);
        assert_eq!(cfg.validate(), Ok(()));

        let cfg: ModelConfig =
            serde_json::from_str(r#"{"drift":{"gravity_m_s2":{"min":2.0},"temperature_c":{}}}"#)
                .expect("partial drift should parse");
        assert_eq!(cfg.drift.gravity_m_s2.min, 2.0);
        assert_eq!(cfg.drift.gravity_m_s2.max, defaults.gravity_m_s2.max);
        assert_eq!(cfg.drift.gravity_m_s2.max_step, defaults.gravity_m_s2.max_step);
        assert_eq!(cfg.drift.temperature_c, defaults.temperature_c);
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = ModelConfig {
            use_organism_optima: true,
            ..ModelConfig::default()
        };
        let json = serde_json::to_string(&cfg).expect("config should serialize");
        let back: ModelConfig = serde_json::from_str(&json).expect("config should parse");
        assert_eq!(back, cfg);
    }

    #[test]
    fn rejects_non_positive_terrain_factor() {
        let mut cfg = ModelConfig::default();
        cfg.terrain.aquatic = 0.0;
        assert_eq!(
            cfg.validate(),
            Err(ModelConfigError::InvalidTerrainFactor { terrain: "aquatic" })
        );
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let mut cfg = ModelConfig::default();
        cfg.survival.force_weight = 0.6;
        assert!(matches!(
            cfg.validate(),
            Err(ModelConfigError::SurvivalWeightsDoNotSumToOne { .. })
        ));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut cfg = ModelConfig::default();
        cfg.survival.medium_threshold = 0.9;
        assert_eq!(
            cfg.validate(),
            Err(ModelConfigError::InvalidSurvivalThresholds)
        );
    }

    #[test]
    fn rejects_nan_recommendation_threshold() {
        let mut cfg = ModelConfig::default();
        cfg.recommendations.gravity = f64::NAN;
        assert_eq!(
            cfg.validate(),
            Err(ModelConfigError::InvalidRecommendationThreshold { rule: "gravity" })
        );
    }

    #[test]
    fn rejects_inverted_drift_range() {
        let mut cfg = ModelConfig::default();
        cfg.drift.altitude_m = DriftBounds {
            max_step: 10.0,
            min: 100.0,
            max: 0.0,
        };
        assert_eq!(
            cfg.validate(),
            Err(ModelConfigError::InvalidDriftBounds { field: "altitude_m" })
        );
    }

    #[test]
    fn rejects_negative_drift_step() {
        let mut cfg = ModelConfig::default();
        cfg.drift.humidity_pct.max_step = -1.0;
        assert!(cfg.validate().is_err());
    }
}
