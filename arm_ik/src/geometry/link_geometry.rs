use nalgebra::{Isometry3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{IkError, Plane};

/// Immutable link geometry of a 6-axis arm.
///
/// Joint frames describe the home configuration (all joints at zero) in the
/// robot's local coordinates; the rotation axis of joint `i` is the Z axis of
/// `joints[i]`. `base` places the robot in the world, `flange` is the
/// mounting plate at home and `tool` is the TCP offset relative to the flange.
///
/// All lengths are in the host's working unit (millimeters by default).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinkGeometry {
    pub joints: [Isometry3<f64>; 6],
    pub base: Isometry3<f64>,
    pub flange: Isometry3<f64>,
    pub tool: Isometry3<f64>,
}

impl LinkGeometry {
    /// Geometry with the robot at the world origin and no tool.
    pub fn new(joints: [Isometry3<f64>; 6], flange: Isometry3<f64>) -> Self {
        Self {
            joints,
            base: Isometry3::identity(),
            flange,
            tool: Isometry3::identity(),
        }
    }

    /// Build the geometry from host planes.
    pub fn from_planes(
        joints: &[Plane; 6],
        base: &Plane,
        flange: &Plane,
        tool: &Plane,
    ) -> Result<Self, IkError> {
        let mut frames = [Isometry3::identity(); 6];
        for (frame, plane) in frames.iter_mut().zip(joints.iter()) {
            *frame = Isometry3::try_from(plane)?;
        }
        Ok(Self {
            joints: frames,
            base: Isometry3::try_from(base)?,
            flange: Isometry3::try_from(flange)?,
            tool: Isometry3::try_from(tool)?,
        })
    }

    pub fn with_base(mut self, base: Isometry3<f64>) -> Self {
        self.base = base;
        self
    }

    pub fn with_tool(mut self, tool: Isometry3<f64>) -> Self {
        self.tool = tool;
        self
    }

    /// Rotation axis of joint `index` (0-based) at home.
    pub fn axis(&self, index: usize) -> Vector3<f64> {
        self.joints[index].rotation * Vector3::z()
    }

    /// Origin of joint `index` (0-based) at home.
    pub fn origin(&self, index: usize) -> Point3<f64> {
        Point3::from(self.joints[index].translation.vector)
    }

    /// Distance between the joint 2 and joint 3 origins at home.
    pub fn upper_arm_length(&self) -> f64 {
        (self.origin(2) - self.origin(1)).norm()
    }
}

/// Frame with the given origin, X axis and Z axis. Y completes a right-handed set.
///
/// The axes are expected to be orthonormal; geometry built from exact
/// dimensions always satisfies this.
pub fn frame_from_axes(origin: Vector3<f64>, x_axis: Vector3<f64>, z_axis: Vector3<f64>) -> Isometry3<f64> {
    let y_axis = z_axis.cross(&x_axis);
    let rotation = Rotation3::from_basis_unchecked(&[x_axis, y_axis, z_axis]);
    Isometry3::from_parts(
        Translation3::from(origin),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}
