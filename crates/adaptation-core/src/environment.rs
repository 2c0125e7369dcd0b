use crate::config::{DriftBounds, DriftConfig, TerrainFactors};
use crate::constants::{
    ranges, ATMOSPHERE_SCALE_HEIGHT_M, DEFAULT_OPTIMAL_TEMP_C, EARTH_GRAVITY_M_S2,
    SEA_LEVEL_PRESSURE_KPA,
};
use crate::error::{EnvironmentInputError, PresetError};
use crate::organism::Habitat;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Flat,
    Rocky,
    Soft,
    Loose,
    Aquatic,
}

impl Terrain {
    pub const ALL: [Terrain; 5] = [
        Terrain::Flat,
        Terrain::Rocky,
        Terrain::Soft,
        Terrain::Loose,
        Terrain::Aquatic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Terrain::Flat => "flat",
            Terrain::Rocky => "rocky",
            Terrain::Soft => "soft",
            Terrain::Loose => "loose",
            Terrain::Aquatic => "aquatic",
        }
    }

    /// Case-insensitive parse. `None` for unrecognized names.
    pub fn from_name(name: &str) -> Option<Terrain> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }

    /// Unrecognized names behave like flat ground (factor 1.0).
    pub fn from_name_or_flat(name: &str) -> Terrain {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(terrain = name, "unrecognized terrain, treating as flat");
            Terrain::Flat
        })
    }
}

impl TerrainFactors {
    pub fn factor(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Flat => self.flat,
            Terrain::Rocky => self.rocky,
            Terrain::Soft => self.soft,
            Terrain::Loose => self.loose,
            Terrain::Aquatic => self.aquatic,
        }
    }
}

/// Broad ecosystem type, used only to flag habitat mismatches.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    Grassland,
    Forest,
    Mountain,
    Desert,
    Wetland,
    Ocean,
}

impl Biome {
    pub const ALL: [Biome; 6] = [
        Biome::Grassland,
        Biome::Forest,
        Biome::Mountain,
        Biome::Desert,
        Biome::Wetland,
        Biome::Ocean,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Biome::Grassland => "grassland",
            Biome::Forest => "forest",
            Biome::Mountain => "mountain",
            Biome::Desert => "desert",
            Biome::Wetland => "wetland",
            Biome::Ocean => "ocean",
        }
    }

    /// Case-insensitive parse. `None` for unrecognized names.
    pub fn from_name(name: &str) -> Option<Biome> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(name))
    }

    pub fn supports(self, habitat: Habitat) -> bool {
        match self {
            Biome::Ocean => habitat == Habitat::Aquatic,
            Biome::Wetland => true,
            Biome::Grassland | Biome::Forest | Biome::Mountain | Biome::Desert => {
                habitat != Habitat::Aquatic
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Environment {
    pub pressure_kpa: f64,
    pub temperature_c: f64,
    pub altitude_m: f64,
    pub gravity_m_s2: f64,
    pub humidity_pct: f64,
    pub terrain: Terrain,
    pub biome: Option<Biome>,
}

impl Default for Environment {
    /// Reference conditions: every factor evaluates to exactly 1.0.
    fn default() -> Self {
        Self {
            pressure_kpa: SEA_LEVEL_PRESSURE_KPA,
            temperature_c: DEFAULT_OPTIMAL_TEMP_C,
            altitude_m: 0.0,
            gravity_m_s2: EARTH_GRAVITY_M_S2,
            humidity_pct: 50.0,
            terrain: Terrain::Flat,
            biome: None,
        }
    }
}

impl Environment {
    /// Whether an organism of `habitat` is out of place in this biome.
    /// Always false when no biome is set.
    pub fn habitat_mismatch(&self, habitat: Habitat) -> bool {
        self.biome.is_some_and(|biome| !biome.supports(habitat))
    }

    /// Check every numeric field against its input range. Zero gravity or
    /// vacuum would otherwise reach the model as infinite or NaN factors.
    pub fn validate(&self) -> Result<(), EnvironmentInputError> {
        for (field, value, range) in [
            ("pressure_kpa", self.pressure_kpa, ranges::PRESSURE_KPA),
            ("temperature_c", self.temperature_c, ranges::TEMPERATURE_C),
            ("altitude_m", self.altitude_m, ranges::ALTITUDE_M),
            ("gravity_m_s2", self.gravity_m_s2, ranges::GRAVITY_M_S2),
            ("humidity_pct", self.humidity_pct, ranges::HUMIDITY_PCT),
        ] {
            if !ranges::contains(range, value) {
                let (min, max) = range;
                return Err(EnvironmentInputError::OutOfRange {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Combined effect of ambient pressure and exponential thinning with altitude.
/// 1.0 at 101.3 kPa and sea level. Unbounded above; callers clamp if needed.
pub fn factor_oxygen(pressure_kpa: f64, altitude_m: f64) -> f64 {
    (pressure_kpa / SEA_LEVEL_PRESSURE_KPA) * (-altitude_m / ATMOSPHERE_SCALE_HEIGHT_M).exp()
}

/// Linear falloff of 1% per degree away from the optimum, floored at 0.1.
pub fn factor_temperature(temp_c: f64, optimum_c: f64) -> f64 {
    (1.0 - (temp_c - optimum_c).abs() * 0.01).max(0.1)
}

/// Inverse scaling with local gravity; 1.0 at 9.81 m/s².
pub fn factor_gravity(gravity_m_s2: f64) -> f64 {
    EARTH_GRAVITY_M_S2 / gravity_m_s2
}

/// Default terrain table lookup.
pub fn factor_terrain(terrain: Terrain) -> f64 {
    TerrainFactors::default().factor(terrain)
}

/// Speed multiplier from air density. Above sea-level pressure it decays
/// hyperbolically; below, it grows linearly.
pub fn pressure_drag(pressure_kpa: f64) -> f64 {
    if pressure_kpa >= SEA_LEVEL_PRESSURE_KPA {
        1.0 / (1.0 + (pressure_kpa - SEA_LEVEL_PRESSURE_KPA) * 0.005)
    } else {
        1.0 + (SEA_LEVEL_PRESSURE_KPA - pressure_kpa) * 0.002
    }
}

/// One step of the bounded random walk: every numeric field moves by an
/// independent uniform draw in `[-max_step, max_step]` and is clamped to its
/// range. Terrain and biome are carried over unchanged.
pub fn drift_step<R: Rng + ?Sized>(
    env: &Environment,
    drift: &DriftConfig,
    rng: &mut R,
) -> Environment {
    // Field order fixes the draw order, which keeps seeded runs reproducible.
    Environment {
        pressure_kpa: walk(env.pressure_kpa, drift.pressure_kpa, rng),
        temperature_c: walk(env.temperature_c, drift.temperature_c, rng),
        altitude_m: walk(env.altitude_m, drift.altitude_m, rng),
        gravity_m_s2: walk(env.gravity_m_s2, drift.gravity_m_s2, rng),
        humidity_pct: walk(env.humidity_pct, drift.humidity_pct, rng),
        ..*env
    }
}

fn walk<R: Rng + ?Sized>(value: f64, bounds: DriftBounds, rng: &mut R) -> f64 {
    let delta = if bounds.max_step.is_finite() && bounds.max_step > 0.0 {
        rng.random_range(-bounds.max_step..=bounds.max_step)
    } else {
        0.0
    };
    (value + delta).max(bounds.min).min(bounds.max)
}

/// One row of the built-in ecosystem table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvironmentPreset {
    pub name: &'static str,
    pub environment: Environment,
}

/// `climate` is (pressure kPa, temperature °C, altitude m, humidity %).
const fn preset(
    name: &'static str,
    climate: (f64, f64, f64, f64),
    terrain: Terrain,
    biome: Option<Biome>,
) -> EnvironmentPreset {
    EnvironmentPreset {
        name,
        environment: Environment {
            pressure_kpa: climate.0,
            temperature_c: climate.1,
            altitude_m: climate.2,
            gravity_m_s2: EARTH_GRAVITY_M_S2,
            humidity_pct: climate.3,
            terrain,
            biome,
        },
    }
}

pub const ENVIRONMENT_PRESETS: &[EnvironmentPreset] = &[
    preset(
        "Flat (standard)",
        (101.3, 25.0, 200.0, 50.0),
        Terrain::Flat,
        Some(Biome::Grassland),
    ),
    preset(
        "High mountains",
        (80.0, 5.0, 3500.0, 30.0),
        Terrain::Rocky,
        Some(Biome::Mountain),
    ),
    preset(
        "Swamp / tropical",
        (101.0, 30.0, 50.0, 85.0),
        Terrain::Soft,
        Some(Biome::Wetland),
    ),
    preset(
        "Hot desert",
        (100.0, 45.0, 400.0, 10.0),
        Terrain::Loose,
        Some(Biome::Desert),
    ),
    preset(
        "High pressure (dense)",
        (150.0, 20.0, 50.0, 60.0),
        Terrain::Flat,
        None,
    ),
];

/// Case-insensitive preset lookup by name.
pub fn find_environment_preset(name: &str) -> Result<Environment, PresetError> {
    let wanted = name.trim();
    ENVIRONMENT_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
        .map(|p| p.environment)
        .ok_or_else(|| PresetError::UnknownEnvironment {
            name: wanted.to_string(),
        })
}
