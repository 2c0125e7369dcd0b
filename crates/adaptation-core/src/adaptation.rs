//! Environmental adaptation model: environment factors, the modified
//! force/speed/energy triple, survival scoring, and recommendation rules.

use crate::config::{ModelConfig, ModelConfigError, RecommendationThresholds, SurvivalScoring};
use crate::constants::{
    ATMOSPHERIC_OXYGEN_PCT, DEFAULT_OPTIMAL_TEMP_C, EARTH_GRAVITY_M_S2, RATIO_EPSILON,
};
use crate::environment::{
    factor_gravity, factor_oxygen, factor_temperature, pressure_drag, Environment,
};
use crate::organism::Organism;
use serde::{Deserialize, Serialize};

/// Dimensionless efficiency multipliers for one environment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentFactors {
    pub oxygen: f64,
    pub temperature: f64,
    pub gravity: f64,
    pub terrain: f64,
    /// Pressure drag multiplier. Applies to speed only.
    pub drag: f64,
}

impl EnvironmentFactors {
    /// Factors under the default terrain table and a 25 °C optimum.
    pub fn from_environment(env: &Environment) -> Self {
        Self::compute(env, DEFAULT_OPTIMAL_TEMP_C, &ModelConfig::default())
    }

    pub fn compute(env: &Environment, optimal_temp_c: f64, config: &ModelConfig) -> Self {
        Self {
            oxygen: factor_oxygen(env.pressure_kpa, env.altitude_m),
            temperature: factor_temperature(env.temperature_c, optimal_temp_c),
            gravity: factor_gravity(env.gravity_m_s2),
            terrain: config.terrain.factor(env.terrain),
            drag: pressure_drag(env.pressure_kpa),
        }
    }
}

/// Force, speed and energy after the environment is applied.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentEffect {
    pub force_n: f64,
    pub speed_m_s: f64,
    /// Relative energy cost; 0.981 at reference conditions.
    pub energy_expenditure: f64,
}

/// Scale base force and speed by precomputed factors.
pub fn apply_factors(force_base: f64, speed_base: f64, f: &EnvironmentFactors) -> EnvironmentEffect {
    EnvironmentEffect {
        force_n: force_base * f.oxygen * f.temperature * f.gravity,
        speed_m_s: speed_base * f.temperature * f.gravity * f.drag * f.terrain,
        energy_expenditure: 0.1
            * (1.0 / f.oxygen)
            * (1.0 / f.temperature)
            * (EARTH_GRAVITY_M_S2 / f.gravity)
            * (1.0 / f.terrain),
    }
}

/// Apply an environment with the default terrain table and a 25 °C optimum.
pub fn apply_environment(
    force_base: f64,
    speed_base: f64,
    env: &Environment,
) -> (EnvironmentEffect, EnvironmentFactors) {
    let factors = EnvironmentFactors::from_environment(env);
    (apply_factors(force_base, speed_base, &factors), factors)
}

/// Modified value over the organism's own unmodified baseline.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRatios {
    pub force: f64,
    pub speed: f64,
    pub oxygen: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SurvivalLabel {
    High,
    Medium,
    Low,
}

impl SurvivalLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SurvivalLabel::High => "high",
            SurvivalLabel::Medium => "medium",
            SurvivalLabel::Low => "low",
        }
    }
}

impl std::fmt::Display for SurvivalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SurvivalScoring {
    /// Weighted sum of the ratios, each capped at 1.0 (improvement over the
    /// baseline earns nothing extra). NaN ratios earn nothing. Result is
    /// clamped to [0, 1].
    pub fn score(&self, force_ratio: f64, speed_ratio: f64, oxygen_ratio: f64) -> f64 {
        let capped = |ratio: f64| {
            if ratio.is_nan() {
                0.0
            } else {
                ratio.clamp(0.0, 1.0)
            }
        };
        let score = self.force_weight * capped(force_ratio)
            + self.speed_weight * capped(speed_ratio)
            + self.oxygen_weight * capped(oxygen_ratio);
        score.clamp(0.0, 1.0)
    }

    /// Thresholds are inclusive lower bounds.
    pub fn label(&self, score: f64) -> SurvivalLabel {
        if score >= self.high_threshold {
            SurvivalLabel::High
        } else if score >= self.medium_threshold {
            SurvivalLabel::Medium
        } else {
            SurvivalLabel::Low
        }
    }

    pub fn evaluate(
        &self,
        force_ratio: f64,
        speed_ratio: f64,
        oxygen_ratio: f64,
    ) -> (SurvivalLabel, f64) {
        let score = self.score(force_ratio, speed_ratio, oxygen_ratio);
        (self.label(score), score)
    }
}

/// Survival label and score under the default weights (0.5/0.3/0.2) and
/// thresholds (0.75 high, 0.45 medium).
pub fn evaluate_survival(
    force_ratio: f64,
    speed_ratio: f64,
    oxygen_ratio: f64,
) -> (SurvivalLabel, f64) {
    SurvivalScoring::default().evaluate(force_ratio, speed_ratio, oxygen_ratio)
}

/// Narrative adaptation advice. Variant order is display order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    RespiratoryEfficiency,
    OxygenTransport,
    ThermalInsulation,
    SkeletalRobustness,
    LocomotorLevers,
    TerrainAdaptation,
    WellAdapted,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::RespiratoryEfficiency => {
                "Increase pulmonary efficiency: larger lungs, air sacs or greater blood flow."
            }
            Recommendation::OxygenTransport => {
                "Raise hematocrit or improve O\u{2082} transport (more efficient hemoglobins)."
            }
            Recommendation::ThermalInsulation => {
                "Thermal insulation (feathers/fat) or thermoregulatory behaviour."
            }
            Recommendation::SkeletalRobustness => {
                "Increase bone robustness and relative muscle mass; shorter, sturdier legs."
            }
            Recommendation::LocomotorLevers => {
                "Modify locomotor levers (longer legs or different proportions) or reduce body mass."
            }
            Recommendation::TerrainAdaptation => {
                "Soft-ground adaptations: limbs with a larger contact surface (wider feet) or claws/hooves."
            }
            Recommendation::WellAdapted => {
                "No major adaptations required; organism reasonably well adapted."
            }
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl RecommendationThresholds {
    /// Rules run in fixed order and fire independently.
    pub fn recommend(
        &self,
        factors: &EnvironmentFactors,
        ratios: &PerformanceRatios,
    ) -> Vec<Recommendation> {
        let mut recs = Vec::new();
        if factors.oxygen < self.oxygen || ratios.oxygen < self.oxygen {
            recs.push(Recommendation::RespiratoryEfficiency);
            recs.push(Recommendation::OxygenTransport);
        }
        if factors.temperature < self.temperature {
            recs.push(Recommendation::ThermalInsulation);
        }
        if factors.gravity < self.gravity {
            recs.push(Recommendation::SkeletalRobustness);
        }
        if ratios.speed < self.speed_ratio {
            recs.push(Recommendation::LocomotorLevers);
        }
        if factors.terrain < self.terrain {
            recs.push(Recommendation::TerrainAdaptation);
        }
        if recs.is_empty() {
            recs.push(Recommendation::WellAdapted);
        }
        recs
    }
}

/// Recommendations under the default trigger levels.
pub fn generate_recommendations(
    factors: &EnvironmentFactors,
    ratios: &PerformanceRatios,
) -> Vec<Recommendation> {
    RecommendationThresholds::default().recommend(factors, ratios)
}

/// Everything derived from one (organism, environment) evaluation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdaptationResult {
    pub organism: String,
    pub mass_kg: f64,
    pub leg_length_m: f64,
    pub base_force_n: f64,
    pub base_speed_m_s: f64,
    pub modified_force_n: f64,
    pub modified_speed_m_s: f64,
    pub energy_expenditure: f64,
    pub oxygen_factor: f64,
    pub temperature_factor: f64,
    pub gravity_factor: f64,
    pub terrain_factor: f64,
    pub drag_factor: f64,
    pub ratios: PerformanceRatios,
    pub survival_label: SurvivalLabel,
    pub survival_score: f64,
    pub habitat_mismatch: bool,
    pub recommendations: Vec<Recommendation>,
}

impl AdaptationResult {
    /// Recommendation messages joined by `delimiter`, for tabular export.
    pub fn recommendation_text(&self, delimiter: &str) -> String {
        self.recommendations
            .iter()
            .map(|r| r.message())
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    pub fn factors(&self) -> EnvironmentFactors {
        EnvironmentFactors {
            oxygen: self.oxygen_factor,
            temperature: self.temperature_factor,
            gravity: self.gravity_factor,
            terrain: self.terrain_factor,
            drag: self.drag_factor,
        }
    }
}

/// Configured evaluator. Pure: every call recomputes from its inputs.
#[derive(Clone, Debug, Default)]
pub struct AdaptationModel {
    config: ModelConfig,
}

impl AdaptationModel {
    pub fn new(config: ModelConfig) -> Result<Self, ModelConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn evaluate(&self, organism: &Organism, env: &Environment) -> AdaptationResult {
        let optimal_temp_c = if self.config.use_organism_optima {
            organism.optimal_temp_c()
        } else {
            DEFAULT_OPTIMAL_TEMP_C
        };
        let factors = EnvironmentFactors::compute(env, optimal_temp_c, &self.config);

        let base_force = organism.base_force();
        let base_speed = organism.base_speed();
        let effect = apply_factors(base_force, base_speed, &factors);

        let oxygen_ratio = if self.config.use_organism_optima {
            factors.oxygen * ATMOSPHERIC_OXYGEN_PCT / organism.optimal_oxygen_pct().max(RATIO_EPSILON)
        } else {
            factors.oxygen
        };
        let ratios = PerformanceRatios {
            force: effect.force_n / base_force.max(RATIO_EPSILON),
            speed: effect.speed_m_s / base_speed.max(RATIO_EPSILON),
            oxygen: oxygen_ratio,
        };
        let (survival_label, survival_score) =
            self.config
                .survival
                .evaluate(ratios.force, ratios.speed, ratios.oxygen);
        let recommendations = self.config.recommendations.recommend(&factors, &ratios);

        tracing::debug!(
            organism = organism.name(),
            score = survival_score,
            label = survival_label.as_str(),
            force_ratio = ratios.force,
            speed_ratio = ratios.speed,
            "evaluated adaptation"
        );

        AdaptationResult {
            organism: organism.name().to_string(),
            mass_kg: organism.mass_kg(),
            leg_length_m: organism.leg_length_m(),
            base_force_n: base_force,
            base_speed_m_s: base_speed,
            modified_force_n: effect.force_n,
            modified_speed_m_s: effect.speed_m_s,
            energy_expenditure: effect.energy_expenditure,
            oxygen_factor: factors.oxygen,
            temperature_factor: factors.temperature,
            gravity_factor: factors.gravity,
            terrain_factor: factors.terrain,
            drag_factor: factors.drag,
            ratios,
            survival_label,
            survival_score,
            habitat_mismatch: env.habitat_mismatch(organism.habitat()),
            recommendations,
        }
    }

    /// Evaluate several organisms against one environment, in input order.
    pub fn evaluate_all(&self, organisms: &[Organism], env: &Environment) -> Vec<AdaptationResult> {
        organisms.iter().map(|o| self.evaluate(o, env)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{find_environment_preset, Biome, Terrain};
    use crate::organism::{find_organism_preset, Habitat};
    use proptest::prelude::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn reference_environment_is_well_adapted() {
        let model = AdaptationModel::default();
        let rex = find_organism_preset("Tyrannosaurus rex").expect("preset exists");
        let result = model.evaluate(&rex, &Environment::default());
        assert_eq!(result.recommendations, vec![Recommendation::WellAdapted]);
        assert_eq!(result.survival_label, SurvivalLabel::High);
        assert!(close(result.survival_score, 1.0, 1e-12));
        assert_eq!(result.modified_force_n, result.base_force_n);
        assert_eq!(result.modified_speed_m_s, result.base_speed_m_s);
        assert!(close(result.energy_expenditure, 0.981, 1e-12));
    }

    #[test]
    fn worked_example_standard_flat_preset() {
        let organism = Organism::new("Rex", 7000.0, 1.2);
        let env = Environment {
            altitude_m: 200.0,
            ..Environment::default()
        };
        let result = AdaptationModel::default().evaluate(&organism, &env);
        assert!(close(result.base_force_n, 2300.4347, 1e-3), "{}", result.base_force_n);
        assert!(close(result.oxygen_factor, 0.971833, 1e-6));
        assert_eq!(result.temperature_factor, 1.0);
        assert_eq!(result.gravity_factor, 1.0);
        assert_eq!(result.terrain_factor, 1.0);
        assert!(close(result.modified_force_n, 2235.6381, 1e-3), "{}", result.modified_force_n);
        // Only the oxygen term moved, so speed is untouched.
        assert_eq!(result.modified_speed_m_s, result.base_speed_m_s);
    }

    #[test]
    fn apply_environment_matches_closed_forms() {
        let env = Environment {
            pressure_kpa: 80.0,
            temperature_c: 5.0,
            altitude_m: 3500.0,
            gravity_m_s2: 9.81,
            terrain: Terrain::Rocky,
            ..Environment::default()
        };
        let (effect, f) = apply_environment(1000.0, 10.0, &env);
        let f_ox = (80.0 / 101.3) * (-0.5f64).exp();
        let drag = 1.0 + (101.3 - 80.0) * 0.002;
        assert!(close(f.oxygen, f_ox, 1e-12));
        assert!(close(f.temperature, 0.8, 1e-12));
        assert!(close(f.drag, drag, 1e-12));
        assert!(close(effect.force_n, 1000.0 * f_ox * 0.8, 1e-9));
        assert!(close(effect.speed_m_s, 10.0 * 0.8 * drag * 0.85, 1e-9));
        assert!(close(
            effect.energy_expenditure,
            0.1 / f_ox / 0.8 * 9.81 / 0.85,
            1e-9
        ));
    }

    #[test]
    fn energy_rises_as_any_factor_degrades() {
        let base = apply_environment(1.0, 1.0, &Environment::default()).0;
        for env in [
            Environment {
                altitude_m: 4000.0,
                ..Environment::default()
            },
            Environment {
                temperature_c: 0.0,
                ..Environment::default()
            },
            Environment {
                gravity_m_s2: 15.0,
                ..Environment::default()
            },
            Environment {
                terrain: Terrain::Aquatic,
                ..Environment::default()
            },
        ] {
            let effect = apply_environment(1.0, 1.0, &env).0;
            assert!(effect.energy_expenditure > base.energy_expenditure);
        }
    }

    #[test]
    fn survival_label_boundaries() {
        let s = SurvivalScoring::default();
        assert_eq!(s.label(0.75), SurvivalLabel::High);
        assert_eq!(s.label(0.7499), SurvivalLabel::Medium);
        assert_eq!(s.label(0.45), SurvivalLabel::Medium);
        assert_eq!(s.label(0.449999), SurvivalLabel::Low);
        assert_eq!(s.label(0.0), SurvivalLabel::Low);
    }

    #[test]
    fn survival_caps_ratios_at_parity() {
        let (label, score) = evaluate_survival(3.0, 2.0, 5.0);
        assert_eq!(label, SurvivalLabel::High);
        assert!(close(score, 1.0, 1e-12));
        let (label, score) = evaluate_survival(0.0, 0.0, 0.0);
        assert_eq!(label, SurvivalLabel::Low);
        assert_eq!(score, 0.0);
        let (_, score) = evaluate_survival(0.5, 1.0, 1.0);
        assert!(close(score, 0.75, 1e-12));
    }

    #[test]
    fn nan_ratios_earn_no_credit() {
        let (label, score) = evaluate_survival(f64::NAN, f64::NAN, 0.0);
        assert_eq!(label, SurvivalLabel::Low);
        assert_eq!(score, 0.0);
        let (label, score) = evaluate_survival(1.0, f64::NAN, 1.0);
        assert_eq!(label, SurvivalLabel::Medium);
        assert!(close(score, 0.7, 1e-12));
        let (_, score) = evaluate_survival(f64::INFINITY, f64::NEG_INFINITY, 1.0);
        assert!(close(score, 0.7, 1e-12));
    }

    #[test]
    fn oxygen_rule_emits_two_messages_first() {
        let factors = EnvironmentFactors {
            oxygen: 0.5,
            temperature: 0.5,
            gravity: 0.5,
            terrain: 0.5,
            drag: 1.0,
        };
        let ratios = PerformanceRatios {
            force: 0.1,
            speed: 0.1,
            oxygen: 0.5,
        };
        assert_eq!(
            generate_recommendations(&factors, &ratios),
            vec![
                Recommendation::RespiratoryEfficiency,
                Recommendation::OxygenTransport,
                Recommendation::ThermalInsulation,
                Recommendation::SkeletalRobustness,
                Recommendation::LocomotorLevers,
                Recommendation::TerrainAdaptation,
            ]
        );
    }

    #[test]
    fn rules_fire_independently() {
        let factors = EnvironmentFactors {
            oxygen: 1.0,
            temperature: 1.0,
            gravity: 0.5,
            terrain: 1.0,
            drag: 1.0,
        };
        let ratios = PerformanceRatios {
            force: 0.5,
            speed: 0.5,
            oxygen: 1.0,
        };
        assert_eq!(
            generate_recommendations(&factors, &ratios),
            vec![
                Recommendation::SkeletalRobustness,
                Recommendation::LocomotorLevers
            ]
        );
    }

    #[test]
    fn mountain_preset_is_not_high() {
        let model = AdaptationModel::default();
        let horse = find_organism_preset("Horse").expect("preset exists");
        let env = find_environment_preset("High mountains").expect("preset exists");
        let result = model.evaluate(&horse, &env);
        assert_ne!(result.survival_label, SurvivalLabel::High);
        assert!(result
            .recommendations
            .contains(&Recommendation::RespiratoryEfficiency));
        assert!(result
            .recommendations
            .contains(&Recommendation::TerrainAdaptation));
        assert!(!result.recommendations.contains(&Recommendation::WellAdapted));
    }

    #[test]
    fn organism_optima_shift_temperature_and_oxygen() {
        let config = ModelConfig {
            use_organism_optima: true,
            ..ModelConfig::default()
        };
        let model = AdaptationModel::new(config).expect("config is valid");
        let organism = Organism::new("Camel", 500.0, 1.1)
            .with_optima(40.0, 18.0)
            .expect("optima are valid");
        let env = Environment {
            temperature_c: 40.0,
            ..Environment::default()
        };
        let result = model.evaluate(&organism, &env);
        assert_eq!(result.temperature_factor, 1.0);
        assert!(close(result.ratios.oxygen, 20.9 / 18.0, 1e-12));

        let fixed = AdaptationModel::default().evaluate(&organism, &env);
        assert!(close(fixed.temperature_factor, 0.85, 1e-12));
        assert_eq!(fixed.ratios.oxygen, 1.0);
    }

    #[test]
    fn model_rejects_invalid_config() {
        let mut config = ModelConfig::default();
        config.survival.oxygen_weight = 0.9;
        assert!(AdaptationModel::new(config).is_err());
    }

    #[test]
    fn degenerate_organism_never_panics() {
        let organism = Organism::new("ghost", 0.0, 0.0);
        let result = AdaptationModel::default().evaluate(&organism, &Environment::default());
        assert!(result.survival_score.is_finite());
        assert_eq!(result.base_speed_m_s, 0.0);
        // Zero baseline speed gives a zero ratio through the epsilon floor.
        assert_eq!(result.ratios.speed, 0.0);
    }

    #[test]
    fn habitat_mismatch_flagged() {
        let eagle = find_organism_preset("golden eagle").expect("preset exists");
        assert_eq!(eagle.habitat(), Habitat::Aerial);
        let env = Environment {
            biome: Some(Biome::Ocean),
            terrain: Terrain::Aquatic,
            ..Environment::default()
        };
        let result = AdaptationModel::default().evaluate(&eagle, &env);
        assert!(result.habitat_mismatch);
    }

    #[test]
    fn evaluate_all_preserves_order() {
        let organisms = vec![
            find_organism_preset("Velociraptor").expect("preset exists"),
            find_organism_preset("Lion").expect("preset exists"),
        ];
        let env = find_environment_preset("Hot desert").expect("preset exists");
        let results = AdaptationModel::default().evaluate_all(&organisms, &env);
        let names: Vec<&str> = results.iter().map(|r| r.organism.as_str()).collect();
        assert_eq!(names, ["Velociraptor", "Lion"]);
    }

    #[test]
    fn recommendation_text_joins_messages() {
        let result = AdaptationModel::default().evaluate(
            &Organism::new("x", 50.0, 0.5),
            &Environment::default(),
        );
        assert_eq!(
            result.recommendation_text(" | "),
            Recommendation::WellAdapted.message()
        );
        assert_eq!(result.factors().drag, 1.0);
    }

    proptest! {
        #[test]
        fn proptest_score_bounded_and_monotone(
            fr in -1.0f64..3.0,
            sr in -1.0f64..3.0,
            or in -1.0f64..3.0,
            bump in 0.0f64..2.0,
        ) {
            let s = SurvivalScoring::default();
            let base = s.score(fr, sr, or);
            prop_assert!((0.0..=1.0).contains(&base));
            prop_assert!(s.score(fr + bump, sr, or) >= base);
            prop_assert!(s.score(fr, sr + bump, or) >= base);
            prop_assert!(s.score(fr, sr, or + bump) >= base);
        }
    }
}
