use serde::{Deserialize, Serialize};

use crate::IkError;

/// ```rust
/// use arm_ik::SolverConfig;
///
/// // Host works in inches instead of millimeters
/// let config = SolverConfig {
///     length_to_meters: 0.0254,
///     ..SolverConfig::default()
/// };
///
/// if let Err(e) = config.validate() {
///     println!("Configuration error: {}", e);
///     return;
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Scale from the host's working length unit to meters (0.001 for millimeters).
    pub length_to_meters: f64,
    /// Jacobian conditioning threshold (smallest / largest singular value).
    pub singularity_tolerance: f64,
    /// Approach axes within this many degrees of vertical are tilted by the same amount.
    pub vertical_tolerance_deg: f64,
    /// Local Y coordinates closer than this to zero are pushed out to it (host units).
    pub coordinate_epsilon: f64,
}

impl SolverConfig {
    pub fn new(length_to_meters: f64, singularity_tolerance: f64) -> Self {
        Self {
            length_to_meters,
            singularity_tolerance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.length_to_meters.is_finite() && self.length_to_meters > 0.0) {
            return Err("Length scale must be a positive, finite number.".to_string());
        }
        if !(self.singularity_tolerance > 0.0 && self.singularity_tolerance < 1.0) {
            return Err("Singularity tolerance must lie strictly between 0 and 1.".to_string());
        }
        if !(self.vertical_tolerance_deg > 0.0 && self.vertical_tolerance_deg < 1.0) {
            return Err("Vertical tolerance must lie strictly between 0 and 1 degree.".to_string());
        }
        if !(self.coordinate_epsilon.is_finite() && self.coordinate_epsilon > 0.0) {
            return Err("Coordinate epsilon must be greater than 0.".to_string());
        }
        Ok(())
    }

    /// Validates and lifts the message into the crate error type.
    pub(crate) fn checked(&self) -> Result<&Self, IkError> {
        self.validate().map_err(IkError::InvalidConfig)?;
        Ok(self)
    }

    /// Scale from meters back to the host's working length unit.
    pub fn meters_to_length(&self) -> f64 {
        1.0 / self.length_to_meters
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            length_to_meters: 0.001,
            singularity_tolerance: 2e-4,
            vertical_tolerance_deg: 0.01,
            coordinate_epsilon: 0.001,
        }
    }
}
