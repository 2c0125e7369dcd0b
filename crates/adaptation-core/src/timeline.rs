use crate::adaptation::{AdaptationModel, AdaptationResult, SurvivalLabel};
use crate::environment::{drift_step, Environment};
use crate::organism::Organism;
use crate::rng::create_rng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One evaluated step of a drifting environment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimelineFrame {
    pub step: usize,
    pub environment: Environment,
    pub result: AdaptationResult,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub organism: String,
    pub seed: u64,
    pub frames: Vec<TimelineFrame>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TimelineSummary {
    pub steps: usize,
    pub mean_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub final_label: Option<SurvivalLabel>,
}

impl Timeline {
    /// Per-step modified/base speed ratio. An animation layer advances its
    /// sprite proportionally to these values.
    pub fn speed_ratios(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.result.ratios.speed).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.result.survival_score).collect()
    }

    pub fn summary(&self) -> TimelineSummary {
        let steps = self.frames.len();
        if steps == 0 {
            return TimelineSummary::default();
        }
        let mut summary = TimelineSummary {
            steps,
            min_score: f64::INFINITY,
            max_score: f64::NEG_INFINITY,
            ..TimelineSummary::default()
        };
        let mut score_sum = 0.0;
        for frame in &self.frames {
            let score = frame.result.survival_score;
            score_sum += score;
            summary.min_score = summary.min_score.min(score);
            summary.max_score = summary.max_score.max(score);
            match frame.result.survival_label {
                SurvivalLabel::High => summary.high_count += 1,
                SurvivalLabel::Medium => summary.medium_count += 1,
                SurvivalLabel::Low => summary.low_count += 1,
            }
        }
        summary.mean_score = score_sum / steps as f64;
        summary.final_label = self.frames.last().map(|f| f.result.survival_label);
        summary
    }
}

impl AdaptationModel {
    /// Evaluate `steps` frames: frame 0 uses `initial`, every later frame
    /// uses the previous environment after one drift step. Runs are
    /// reproducible for a fixed seed.
    pub fn simulate_timeline(
        &self,
        organism: &Organism,
        initial: &Environment,
        steps: usize,
        seed: u64,
    ) -> Timeline {
        let mut rng = create_rng(seed);
        Timeline {
            schema_version: default_schema_version(),
            organism: organism.name().to_string(),
            seed,
            frames: self.simulate_frames(organism, initial, steps, &mut rng),
        }
    }

    /// Frame generation with a caller-owned RNG, so several organisms can
    /// share or split one stream.
    pub fn simulate_frames<R: Rng + ?Sized>(
        &self,
        organism: &Organism,
        initial: &Environment,
        steps: usize,
        rng: &mut R,
    ) -> Vec<TimelineFrame> {
        let mut frames = Vec::with_capacity(steps);
        let mut env = *initial;
        for step in 0..steps {
            if step > 0 {
                env = drift_step(&env, &self.config().drift, rng);
            }
            frames.push(TimelineFrame {
                step,
                environment: env,
                result: self.evaluate(organism, &env),
            });
        }
        tracing::debug!(
            organism = organism.name(),
            steps,
            "simulated adaptation timeline"
        );
        frames
    }
}
