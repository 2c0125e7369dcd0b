use crate::constants::{ranges, ATMOSPHERIC_OXYGEN_PCT, DEFAULT_OPTIMAL_TEMP_C};
use crate::error::{OrganismInputError, PresetError};
use serde::{Deserialize, Serialize};

/// Where an organism lives. Used for biome mismatch checks.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Habitat {
    #[default]
    Terrestrial,
    Aquatic,
    Aerial,
}

/// Preset grouping, so consumers can offer extinct, living, or both.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    Extinct,
    Living,
}

/// Isometric muscle force estimate: proportional to mass and to the square
/// root of the leg lever. Leg length is floored at 0.01 m.
pub fn base_muscle_force(mass_kg: f64, leg_length_m: f64) -> f64 {
    0.3 * mass_kg * leg_length_m.max(0.01).sqrt()
}

/// Empirical top speed: proportional to leg length, inversely proportional to
/// the cube root of mass. Mass is floored at 0.1 kg.
pub fn base_theoretical_speed(mass_kg: f64, leg_length_m: f64) -> f64 {
    8.0 * leg_length_m / mass_kg.max(0.1).cbrt()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Organism {
    // Fields are private; `manual` enforces input ranges and presets are trusted.
    name: String,
    mass_kg: f64,
    leg_length_m: f64,
    #[serde(default)]
    base_speed_m_s: Option<f64>,
    #[serde(default = "default_optimal_temp_c")]
    optimal_temp_c: f64,
    #[serde(default = "default_optimal_oxygen_pct")]
    optimal_oxygen_pct: f64,
    #[serde(default)]
    habitat: Habitat,
}

fn default_optimal_temp_c() -> f64 {
    DEFAULT_OPTIMAL_TEMP_C
}

fn default_optimal_oxygen_pct() -> f64 {
    ATMOSPHERIC_OXYGEN_PCT
}

impl Organism {
    /// Build an organism without range checks. Degenerate mass or leg length
    /// is tolerated; the force and speed formulas floor them.
    pub fn new(name: impl Into<String>, mass_kg: f64, leg_length_m: f64) -> Self {
        Self {
            name: name.into(),
            mass_kg,
            leg_length_m,
            base_speed_m_s: None,
            optimal_temp_c: DEFAULT_OPTIMAL_TEMP_C,
            optimal_oxygen_pct: ATMOSPHERIC_OXYGEN_PCT,
            habitat: Habitat::Terrestrial,
        }
    }

    /// Build an organism from user-entered values, rejecting anything outside
    /// the accepted input ranges. A base speed of zero means "derive it".
    pub fn manual(
        name: &str,
        mass_kg: f64,
        leg_length_m: f64,
        base_speed_m_s: f64,
    ) -> Result<Self, OrganismInputError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(OrganismInputError::EmptyName);
        }
        let (min, max) = ranges::MASS_KG;
        if !ranges::contains(ranges::MASS_KG, mass_kg) {
            return Err(OrganismInputError::InvalidMass {
                value: mass_kg,
                min,
                max,
            });
        }
        let (min, max) = ranges::LEG_LENGTH_M;
        if !ranges::contains(ranges::LEG_LENGTH_M, leg_length_m) {
            return Err(OrganismInputError::InvalidLegLength {
                value: leg_length_m,
                min,
                max,
            });
        }
        let (min, max) = ranges::BASE_SPEED_M_S;
        if !ranges::contains(ranges::BASE_SPEED_M_S, base_speed_m_s) {
            return Err(OrganismInputError::InvalidBaseSpeed {
                value: base_speed_m_s,
                min,
                max,
            });
        }
        Ok(Self::new(name, mass_kg, leg_length_m).with_base_speed(base_speed_m_s))
    }

    /// Set a measured base speed. Non-positive values fall back to the
    /// derived theoretical speed.
    pub fn with_base_speed(mut self, base_speed_m_s: f64) -> Self {
        self.base_speed_m_s = (base_speed_m_s > 0.0).then_some(base_speed_m_s);
        self
    }

    pub fn with_habitat(mut self, habitat: Habitat) -> Self {
        self.habitat = habitat;
        self
    }

    pub fn with_optima(
        mut self,
        optimal_temp_c: f64,
        optimal_oxygen_pct: f64,
    ) -> Result<Self, OrganismInputError> {
        if !optimal_temp_c.is_finite() {
            return Err(OrganismInputError::InvalidOptimalTemperature {
                value: optimal_temp_c,
            });
        }
        if !(optimal_oxygen_pct.is_finite() && optimal_oxygen_pct > 0.0) {
            return Err(OrganismInputError::InvalidOptimalOxygen {
                value: optimal_oxygen_pct,
            });
        }
        self.optimal_temp_c = optimal_temp_c;
        self.optimal_oxygen_pct = optimal_oxygen_pct;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass_kg(&self) -> f64 {
        self.mass_kg
    }

    pub fn leg_length_m(&self) -> f64 {
        self.leg_length_m
    }

    pub fn measured_speed_m_s(&self) -> Option<f64> {
        self.base_speed_m_s
    }

    pub fn optimal_temp_c(&self) -> f64 {
        self.optimal_temp_c
    }

    pub fn optimal_oxygen_pct(&self) -> f64 {
        self.optimal_oxygen_pct
    }

    pub fn habitat(&self) -> Habitat {
        self.habitat
    }

    /// Unmodified muscle force (N).
    pub fn base_force(&self) -> f64 {
        base_muscle_force(self.mass_kg, self.leg_length_m)
    }

    /// Unmodified speed (m/s): the measured value when present, otherwise
    /// the theoretical estimate.
    pub fn base_speed(&self) -> f64 {
        self.base_speed_m_s
            .unwrap_or_else(|| base_theoretical_speed(self.mass_kg, self.leg_length_m))
    }
}

/// One row of the built-in organism table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrganismPreset {
    pub name: &'static str,
    pub era: Era,
    pub mass_kg: f64,
    pub leg_length_m: f64,
    pub base_speed_m_s: f64,
    pub habitat: Habitat,
}

impl OrganismPreset {
    const fn terrestrial(
        name: &'static str,
        era: Era,
        mass_kg: f64,
        leg_length_m: f64,
        base_speed_m_s: f64,
    ) -> Self {
        Self {
            name,
            era,
            mass_kg,
            leg_length_m,
            base_speed_m_s,
            habitat: Habitat::Terrestrial,
        }
    }

    pub fn to_organism(&self) -> Organism {
        Organism::new(self.name, self.mass_kg, self.leg_length_m)
            .with_base_speed(self.base_speed_m_s)
            .with_habitat(self.habitat)
    }
}

/// Estimated values; extinct masses are rough reconstructions.
pub const ORGANISM_PRESETS: &[OrganismPreset] = &[
    OrganismPreset::terrestrial("Tyrannosaurus rex", Era::Extinct, 8000.0, 1.2, 8.0),
    OrganismPreset::terrestrial("Velociraptor", Era::Extinct, 15.0, 0.8, 18.0),
    OrganismPreset::terrestrial("Triceratops", Era::Extinct, 6000.0, 1.0, 7.0),
    OrganismPreset::terrestrial("Brachiosaurus", Era::Extinct, 40000.0, 2.5, 5.0),
    OrganismPreset::terrestrial("Lion", Era::Living, 190.0, 0.6, 20.0),
    OrganismPreset::terrestrial("African elephant", Era::Living, 6000.0, 1.2, 7.0),
    OrganismPreset {
        name: "Golden eagle",
        era: Era::Living,
        mass_kg: 6.0,
        leg_length_m: 0.25,
        base_speed_m_s: 25.0,
        habitat: Habitat::Aerial,
    },
    OrganismPreset::terrestrial("Horse", Era::Living, 500.0, 1.0, 15.0),
];

/// Presets belonging to one era, in table order.
pub fn organism_presets(era: Era) -> impl Iterator<Item = &'static OrganismPreset> {
    ORGANISM_PRESETS.iter().filter(move |p| p.era == era)
}

/// Case-insensitive preset lookup by name.
pub fn find_organism_preset(name: &str) -> Result<Organism, PresetError> {
    let wanted = name.trim();
    ORGANISM_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
        .map(OrganismPreset::to_organism)
        .ok_or_else(|| PresetError::UnknownOrganism {
            name: wanted.to_string(),
        })
}
