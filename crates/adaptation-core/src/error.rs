/// Declares a flat error enum together with its `Display` and `Error` impls.
///
/// Each arm is `Variant { fields } => "format", args...;`. Format strings may
/// capture the variant's fields by name.
macro_rules! define_error_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
            );* $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }

        impl std::error::Error for $name {}
    };
}

pub(crate) use define_error_enum;

define_error_enum! {
    /// Lookup failure in the organism or environment preset tables.
    PresetError {
        UnknownOrganism { name: String } => "unknown organism preset: {name}";
        UnknownEnvironment { name: String } => "unknown environment preset: {name}";
    }
}

define_error_enum! {
    /// Manually entered organism values outside the accepted input ranges.
    OrganismInputError {
        EmptyName => "organism name must not be empty";
        InvalidMass { value: f64, min: f64, max: f64 } => "mass_kg ({value}) must be finite and within [{min}, {max}]";
        InvalidLegLength { value: f64, min: f64, max: f64 } => "leg_length_m ({value}) must be finite and within [{min}, {max}]";
        InvalidBaseSpeed { value: f64, min: f64, max: f64 } => "base_speed_m_s ({value}) must be finite and within [{min}, {max}]";
        InvalidOptimalOxygen { value: f64 } => "optimal_oxygen_pct ({value}) must be finite and positive";
        InvalidOptimalTemperature { value: f64 } => "optimal_temp_c ({value}) must be finite";
    }
}

define_error_enum! {
    /// Environment values outside the accepted input ranges.
    EnvironmentInputError {
        OutOfRange { field: &'static str, value: f64, min: f64, max: f64 } => "{field} ({value}) must be finite and within [{min}, {max}]";
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_interpolates_fields() {
        let err = OrganismInputError::InvalidMass {
            value: -3.0,
            min: 1.0,
            max: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "mass_kg (-3) must be finite and within [1, 10]"
        );
        let err = PresetError::UnknownOrganism {
            name: "Dodo".to_string(),
        };
        assert_eq!(err.to_string(), "unknown organism preset: Dodo");
    }

    #[test]
    fn environment_error_names_the_field() {
        let err = EnvironmentInputError::OutOfRange {
            field: "gravity_m_s2",
            value: 0.0,
            min: 1.0,
            max: 20.0,
        };
        assert_eq!(
            err.to_string(),
            "gravity_m_s2 (0) must be finite and within [1, 20]"
        );
    }

    #[test]
    fn unit_variants_display() {
        assert_eq!(
            OrganismInputError::EmptyName.to_string(),
            "organism name must not be empty"
        );
    }
}
