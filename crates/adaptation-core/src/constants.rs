/// Sea-level reference pressure (kPa). Oxygen and drag terms are normalized to it.
pub const SEA_LEVEL_PRESSURE_KPA: f64 = 101.3;

/// Altitude decay constant (m) for the exponential oxygen falloff.
/// Troposphere approximation of the atmospheric scale height.
pub const ATMOSPHERE_SCALE_HEIGHT_M: f64 = 7000.0;

/// Earth-standard gravity (m/s²). Gravity factor is 1.0 here.
pub const EARTH_GRAVITY_M_S2: f64 = 9.81;

/// Metabolic temperature optimum (°C) when no organism-specific optimum is used.
pub const DEFAULT_OPTIMAL_TEMP_C: f64 = 25.0;

/// Atmospheric oxygen fraction at sea level (%).
pub const ATMOSPHERIC_OXYGEN_PCT: f64 = 20.9;

/// Lower bound on ratio denominators so zero baselines never divide by zero.
pub const RATIO_EPSILON: f64 = 1e-6;

/// Inclusive slider bounds of the interactive front end. Drift clamps to
/// these, and manual organism and environment input is validated against them.
pub mod ranges {
    pub const PRESSURE_KPA: (f64, f64) = (20.0, 200.0);
    pub const TEMPERATURE_C: (f64, f64) = (-50.0, 80.0);
    pub const ALTITUDE_M: (f64, f64) = (0.0, 10_000.0);
    pub const GRAVITY_M_S2: (f64, f64) = (1.0, 20.0);
    pub const HUMIDITY_PCT: (f64, f64) = (0.0, 100.0);
    pub const MASS_KG: (f64, f64) = (1.0, 100_000.0);
    pub const LEG_LENGTH_M: (f64, f64) = (0.01, 10.0);
    pub const BASE_SPEED_M_S: (f64, f64) = (0.0, 200.0);

    /// Finite and inside the inclusive `(min, max)` range.
    pub fn contains((min, max): (f64, f64), value: f64) -> bool {
        value.is_finite() && (min..=max).contains(&value)
    }
}
