mod arrange;
mod forward;
mod opw;
mod singularity;

pub use arrange::{arrange, configuration, ArrangedSolutions, Cfx};
pub use forward::{forward_kinematics, PosedFrames};
pub use opw::{AnalyticSolver, IkSolutions, OpwParameters};
pub use singularity::{
    classify, is_near_singular, jacobian, singular_value_range, SingularityKind, SingularityReport,
};

use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transforms::scale_translation;
use crate::{IkError, Joints, LinkGeometry, Plane, SolverConfig};

/// Everything one solve produces: the candidate count, the eight
/// configuration slots and their singularity flags.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct IkReport {
    pub count: usize,
    pub solutions: ArrangedSolutions,
    pub singularities: SingularityReport,
}

impl IkReport {
    /// Joints stored at configuration `cfx`, if any.
    pub fn slot(&self, cfx: Cfx) -> Option<&Joints> {
        self.solutions.get(cfx)
    }

    /// Populated slots in slot order.
    pub fn present(&self) -> impl Iterator<Item = (Cfx, &Joints)> + '_ {
        self.solutions.present()
    }

    pub fn kind(&self, cfx: Cfx) -> SingularityKind {
        self.singularities.kind(cfx)
    }
}

/// Inverse and forward kinematics of one arm.
///
/// Borrows the link geometry for its whole lifetime and derives the
/// closed-form parameters once, in [`ArmKinematics::new`].
///
/// ```rust
/// use arm_ik::{ArmKinematics, RobotConfig, SolverConfig};
///
/// let geometry = RobotConfig::irb2400_10().link_geometry();
/// let kinematics = ArmKinematics::new(&geometry, SolverConfig::default()).unwrap();
///
/// let target = kinematics.tcp_pose(&[0.1, 0.2, -0.3, 0.4, 0.5, 0.6]);
/// let report = kinematics.compute(&target).unwrap();
/// for (cfx, joints) in report.present() {
///     println!("Cfx {}: {:?}", cfx, joints);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ArmKinematics<'a> {
    geometry: &'a LinkGeometry,
    config: SolverConfig,
    parameters: OpwParameters,
}

impl<'a> ArmKinematics<'a> {
    /// Validate the configuration and recognise the arm geometry.
    pub fn new(geometry: &'a LinkGeometry, config: SolverConfig) -> Result<Self, IkError> {
        config.checked()?;
        let parameters = OpwParameters::from_geometry(geometry, config.length_to_meters)?;
        debug!(?parameters, "recognised closed-form geometry");
        Ok(Self {
            geometry,
            config,
            parameters,
        })
    }

    pub fn geometry(&self) -> &LinkGeometry {
        self.geometry
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn parameters(&self) -> &OpwParameters {
        &self.parameters
    }

    /// All posed frames, robot-local.
    pub fn forward_kinematics(&self, joints: &Joints) -> PosedFrames {
        forward_kinematics(self.geometry, joints)
    }

    /// World TCP pose for the given joints.
    pub fn tcp_pose(&self, joints: &Joints) -> Isometry3<f64> {
        self.geometry.base * forward_kinematics(self.geometry, joints).tcp
    }

    /// Nudge targets off the two degenerate cases the closed form cannot take
    /// exactly: approach parallel to the base Z axis, and local Y at zero.
    fn condition_target(&self, mut local: Isometry3<f64>) -> Isometry3<f64> {
        let tilt = self.config.vertical_tolerance_deg.to_radians();
        let approach = local.rotation * Vector3::z();
        let off_vertical = approach.angle(&Vector3::z()).min(approach.angle(&-Vector3::z()));
        if off_vertical <= tilt {
            local.rotation *= UnitQuaternion::from_axis_angle(&Vector3::x_axis(), tilt);
            debug!(tilt_deg = self.config.vertical_tolerance_deg, "vertical approach tilted");
        }

        let epsilon = self.config.coordinate_epsilon;
        let y = local.translation.vector.y;
        if y.abs() < epsilon {
            local.translation.vector.y = if y < 0.0 { -epsilon } else { epsilon };
            debug!(from = y, to = local.translation.vector.y, "local Y moved off zero");
        }
        local
    }

    /// Closed-form candidates for a world TCP target.
    pub fn solve(&self, target: &Isometry3<f64>) -> Result<IkSolutions, IkError> {
        let local = self.condition_target(self.geometry.base.inverse() * target);
        let flange = local * self.geometry.tool.inverse();
        let flange = scale_translation(&flange, self.config.length_to_meters);

        let solutions = self.parameters.solve(&self.parameters.to_engine_frame(&flange))?;
        debug!(count = solutions.count(), "closed-form solve");
        Ok(solutions)
    }

    /// Solve, arrange by configuration and classify singularities.
    pub fn compute(&self, target: &Isometry3<f64>) -> Result<IkReport, IkError> {
        let solutions = self.solve(target)?;
        let arranged = arrange(&solutions, self.geometry);
        let singularities = classify(&arranged, self.geometry, &self.config)?;
        Ok(IkReport {
            count: solutions.count(),
            solutions: arranged,
            singularities,
        })
    }

    /// [`ArmKinematics::compute`] for a host plane.
    pub fn compute_plane(&self, target: &Plane) -> Result<IkReport, IkError> {
        self.compute(&Isometry3::try_from(target)?)
    }
}
