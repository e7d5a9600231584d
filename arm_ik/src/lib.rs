use serde::{Deserialize, Serialize};

pub mod config;
pub mod errors;
pub mod geometry;
pub mod kinematics;
pub mod transforms;

pub use config::SolverConfig;
pub use errors::*;
pub use geometry::{LinkGeometry, RobotConfig, RobotModel};
pub use kinematics::{
    arrange, classify, forward_kinematics, AnalyticSolver, ArmKinematics, ArrangedSolutions,
    Cfx, IkReport, IkSolutions, OpwParameters, PosedFrames, SingularityKind, SingularityReport,
};

/// Joint angles in radians, joint 1 first.
pub type Joints = [f64; 6];

/// Number of configuration slots addressed by a Cfx index.
pub const CONFIGURATION_SLOTS: usize = 8;

/// Legacy marker for "no solution at this configuration".
///
/// Only [`ArrangedSolutions::to_sentinel_array`] and
/// [`ArrangedSolutions::from_sentinel_array`] ever see this value; inside the
/// crate a missing slot is `None`.
pub const MISSING_JOINT_VALUE: f64 = 9e9;

/// A CAD plane: origin plus two in-plane axes. The normal (Z) is `x × y`.
///
/// Host-side representation of every frame that crosses the crate boundary.
/// Axes do not need to be unit length or exactly perpendicular; the X axis
/// is kept and the Y axis is re-orthogonalised when converting.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: [f64; 3],
    pub x_axis: [f64; 3],
    pub y_axis: [f64; 3],
}

impl Plane {
    pub fn new(origin: [f64; 3], x_axis: [f64; 3], y_axis: [f64; 3]) -> Self {
        Self {
            origin,
            x_axis,
            y_axis,
        }
    }

    pub fn world_xy() -> Self {
        Self::new([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::world_xy()
    }
}

/// Host quaternion in `a + bi + cj + dk` form.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        }
    }
}

/// Joint angles in degrees, as shown to the host and written into robot programs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct JointAngles {
    pub j1: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j5: f64,
    pub j6: f64,
}
