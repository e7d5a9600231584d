use nalgebra::{Isometry3, Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{Joints, LinkGeometry};

/// Frames of the arm at one joint configuration.
///
/// Produced by [`forward_kinematics`] in robot-local coordinates; use
/// [`PosedFrames::to_world`] to place them with the base frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PosedFrames {
    pub joints: [Isometry3<f64>; 6],
    pub flange: Isometry3<f64>,
    pub tcp: Isometry3<f64>,
}

impl PosedFrames {
    /// Rotation axis of joint `index` (0-based).
    pub fn axis(&self, index: usize) -> Vector3<f64> {
        self.joints[index].rotation * Vector3::z()
    }

    /// Origin of joint `index` (0-based).
    pub fn origin(&self, index: usize) -> Point3<f64> {
        Point3::from(self.joints[index].translation.vector)
    }

    pub fn tcp_origin(&self) -> Point3<f64> {
        Point3::from(self.tcp.translation.vector)
    }

    /// The same frames expressed in world coordinates.
    pub fn to_world(&self, base: &Isometry3<f64>) -> PosedFrames {
        let mut joints = self.joints;
        for frame in joints.iter_mut() {
            *frame = base * *frame;
        }
        PosedFrames {
            joints,
            flange: base * self.flange,
            tcp: base * self.tcp,
        }
    }
}

/// Forward kinematics of the serial chain.
///
/// Each joint turns the rest of the chain about its home axis, so the motion
/// of link `i` is the product of the first `i` joint rotations:
///
/// ```text
/// M_i = R_1(q_1) * R_2(q_2) * ... * R_i(q_i)
/// posed_i = M_i * home_i
/// ```
///
/// Angles are in radians; all frames are robot-local in the geometry's length unit.
pub fn forward_kinematics(geometry: &LinkGeometry, joints: &Joints) -> PosedFrames {
    let mut motion = Isometry3::identity();
    let mut posed = geometry.joints;

    for (i, home) in geometry.joints.iter().enumerate() {
        let axis = Unit::new_normalize(home.rotation * Vector3::z());
        let pivot = Point3::from(home.translation.vector);
        let rotation = UnitQuaternion::from_axis_angle(&axis, joints[i]);
        motion *= Isometry3::rotation_wrt_point(rotation, pivot);
        posed[i] = motion * home;
    }

    let flange = motion * geometry.flange;
    PosedFrames {
        joints: posed,
        flange,
        tcp: flange * geometry.tool,
    }
}
