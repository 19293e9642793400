//! Library-wide defaults.
//!
//! Holder types keep their own [`Settings`] copy so that two meshes in the
//! same process may use different tolerances.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshCacheError;

/// Default radius used by [`close_rows`](crate::utils::arr::close_rows).
pub const TOLERANCE: f64 = 1e-10;

/// Tunable parameters of derived computations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Radius within which two float rows count as the same point.
    pub tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
        }
    }
}

impl Settings {
    /// Reject tolerances that are negative or not finite.
    pub fn validate(&self) -> Result<(), MeshCacheError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MeshCacheError::InvalidSettings(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_constant() {
        assert_eq!(Settings::default().tolerance, TOLERANCE);
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let s = Settings { tolerance: -1.0 };
        assert!(matches!(s.validate(), Err(MeshCacheError::InvalidSettings(_))));
        let s = Settings {
            tolerance: f64::NAN,
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Settings::default());
        let s: Settings = serde_json::from_str(r#"{"tolerance":0.5}"#).unwrap();
        assert_eq!(s.tolerance, 0.5);
    }
}
