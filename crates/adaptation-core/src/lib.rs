pub mod adaptation;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod organism;
pub mod rng;
pub mod timeline;

pub use adaptation::{
    apply_environment, evaluate_survival, generate_recommendations, AdaptationModel,
    AdaptationResult, EnvironmentFactors, PerformanceRatios, Recommendation, SurvivalLabel,
};
pub use config::{ModelConfig, ModelConfigError};
pub use environment::{
    factor_gravity, factor_oxygen, factor_temperature, factor_terrain, Biome, Environment, Terrain,
};
pub use error::{EnvironmentInputError, OrganismInputError, PresetError};
pub use organism::{base_muscle_force, base_theoretical_speed, Era, Habitat, Organism};
pub use timeline::{Timeline, TimelineFrame, TimelineSummary};
