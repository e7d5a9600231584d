// Closed-form inverse kinematics for arms with an ortho-parallel base and a
// spherical wrist (the "OPW" family): M. Brandstötter, A. Angerer, M. Hofbaur,
// "An analytical solution of the inverse kinematics problem of industrial
// serial manipulators with an ortho-parallel basis and a spherical wrist",
// Austrian Robotics Workshop 2014.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::transforms::normalize_angle;
use crate::{IkError, Joints, LinkGeometry, CONFIGURATION_SLOTS};

/// Tolerance on unit-vector components when recognising axis directions.
const AXIS_TOLERANCE: f64 = 1e-6;

/// Relative tolerance on lengths, scaled by the size of the arm.
const LENGTH_TOLERANCE: f64 = 1e-6;

/// Seam to a closed-form solver.
///
/// `target` is the flange pose in robot-local coordinates and meters,
/// expressed in the end-effector convention where the approach direction is
/// the local Y axis (the flange frame rotated 90° about its own X axis).
///
/// Implementations must be reentrant: a solver may be called from several
/// threads at once, each call with its own target. A backend that cannot
/// guarantee this has to serialise calls itself.
pub trait AnalyticSolver {
    fn solve(&self, target: &Isometry3<f64>) -> Result<IkSolutions, IkError>;
}

/// Candidates returned by a closed-form solve, in no particular order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct IkSolutions {
    solutions: Vec<Joints>,
}

impl IkSolutions {
    pub fn new(solutions: Vec<Joints>) -> Self {
        Self { solutions }
    }

    /// Number of candidates found.
    pub fn count(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Joints> {
        self.solutions.iter()
    }

    pub fn as_slice(&self) -> &[Joints] {
        &self.solutions
    }
}

impl From<Vec<Joints>> for IkSolutions {
    fn from(solutions: Vec<Joints>) -> Self {
        Self::new(solutions)
    }
}

impl<'a> IntoIterator for &'a IkSolutions {
    type Item = &'a Joints;
    type IntoIter = std::slice::Iter<'a, Joints>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}

/// Fails unless `f64` is a 64-bit IEEE-754 double.
pub(crate) fn check_platform() -> Result<(), IkError> {
    let width = std::mem::size_of::<f64>() * 8;
    if width != 64 || f64::MANTISSA_DIGITS != 53 || f64::MAX_EXP != 1024 {
        return Err(IkError::UnsupportedPlatform(format!(
            "expected a 64-bit IEEE-754 double, found {} bits with a {}-bit mantissa",
            width,
            f64::MANTISSA_DIGITS
        )));
    }
    Ok(())
}

/// Dimensions of an OPW arm plus the mapping to the host's joint conventions.
///
/// Lengths are in meters. A host joint value `j` maps to the model angle
/// `q = sign * j + offset`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct OpwParameters {
    pub a1: f64,
    pub a2: f64,
    pub b: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub c4: f64,
    pub offsets: [f64; 6],
    pub sign_corrections: [f64; 6],
    /// Rotation from the model's flange frame to the host flange frame.
    pub flange_alignment: UnitQuaternion<f64>,
}

fn unsupported(message: impl Into<String>) -> IkError {
    IkError::UnsupportedGeometry(message.into())
}

fn sign_of(value: f64) -> f64 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

impl OpwParameters {
    /// Recognise the home geometry of an OPW arm and extract its dimensions.
    ///
    /// Expected at home: joint 1 turning about the vertical axis through the
    /// robot origin; joints 2, 3 and 5 turning about lateral (Y) axes; joints
    /// 4 and 6 on one line in the vertical XZ plane through the wrist centre
    /// (the joint 5 origin, where the joint 6 frame also sits); the flange on
    /// that line.
    pub fn from_geometry(geometry: &LinkGeometry, length_to_meters: f64) -> Result<Self, IkError> {
        let flange = geometry.flange.translation.vector;
        let size = (0..6)
            .map(|i| geometry.origin(i).coords.norm())
            .fold(flange.norm(), f64::max)
            .max(1.0);
        let length_tolerance = LENGTH_TOLERANCE * size;

        let z1 = geometry.axis(0);
        let o1 = geometry.origin(0).coords;
        if (z1.z.abs() - 1.0).abs() > AXIS_TOLERANCE {
            return Err(unsupported("joint 1 must turn about the vertical axis"));
        }
        if o1.x.hypot(o1.y) > length_tolerance {
            return Err(unsupported("joint 1 axis must pass through the robot origin"));
        }

        for i in [1, 2, 4] {
            if (geometry.axis(i).y.abs() - 1.0).abs() > AXIS_TOLERANCE {
                return Err(unsupported(format!(
                    "joint {} must turn about a lateral (Y) axis at home",
                    i + 1
                )));
            }
        }

        let shoulder = geometry.origin(1).coords;
        let elbow = geometry.origin(2).coords;
        let wrist = geometry.origin(4).coords;

        let upper_arm = elbow - shoulder;
        let c2 = upper_arm.x.hypot(upper_arm.z);
        if c2 <= length_tolerance {
            return Err(unsupported("joints 2 and 3 must not share an axis"));
        }
        let phi2 = upper_arm.x.atan2(upper_arm.z);

        if (geometry.origin(5).coords - wrist).norm() > length_tolerance {
            return Err(unsupported("joint 6 frame must sit on the wrist centre (joint 5 origin)"));
        }

        let z4 = geometry.axis(3);
        if z4.y.abs() > AXIS_TOLERANCE {
            return Err(unsupported("joint 4 axis must lie in the vertical XZ plane at home"));
        }
        let to_wrist = wrist - geometry.origin(3).coords;
        if to_wrist.cross(&z4).norm() > length_tolerance {
            return Err(unsupported("joint 4 axis must pass through the wrist centre"));
        }

        // Forearm direction, pointing from the elbow towards the wrist
        let forearm = wrist - elbow;
        let along = forearm.x * z4.x + forearm.z * z4.z;
        let sign4 = sign_of(along);
        let planar = Vector3::new(z4.x, 0.0, z4.z) * sign4;
        let direction = planar
            .try_normalize(AXIS_TOLERANCE)
            .ok_or_else(|| unsupported("joint 4 axis has no component in the XZ plane"))?;
        let phi4 = direction.x.atan2(direction.z);

        let c3 = forearm.x * direction.x + forearm.z * direction.z;
        let a2 = forearm.x * phi4.cos() - forearm.z * phi4.sin();
        if a2.hypot(c3) <= length_tolerance {
            return Err(unsupported("wrist centre must not lie on the joint 3 axis"));
        }

        let z6 = geometry.axis(5);
        let z6_along = z6.dot(&direction);
        if (z6_along.abs() - 1.0).abs() > AXIS_TOLERANCE {
            return Err(unsupported("joint 6 axis must be coincident with joint 4 at home"));
        }

        let to_flange = flange - wrist;
        if to_flange.cross(&direction).norm() > length_tolerance {
            return Err(unsupported("flange must lie on the joint 6 axis"));
        }
        let c4 = to_flange.dot(&direction);

        let model_flange = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), phi4);
        let flange_alignment = model_flange.inverse() * geometry.flange.rotation;

        let scale = length_to_meters;
        Ok(Self {
            a1: shoulder.x * scale,
            a2: a2 * scale,
            b: wrist.y * scale,
            c1: shoulder.z * scale,
            c2: c2 * scale,
            c3: c3 * scale,
            c4: c4 * scale,
            offsets: [0.0, phi2, phi4 - phi2, 0.0, 0.0, 0.0],
            sign_corrections: [
                sign_of(z1.z),
                sign_of(geometry.axis(1).y),
                sign_of(geometry.axis(2).y),
                sign4,
                sign_of(geometry.axis(4).y),
                sign_of(z6_along),
            ],
            flange_alignment,
        })
    }

    fn model_angles(&self, joints: &Joints) -> [f64; 6] {
        let mut q = [0.0; 6];
        for i in 0..6 {
            q[i] = self.sign_corrections[i] * joints[i] + self.offsets[i];
        }
        q
    }

    fn host_joints(&self, q: &[f64; 6]) -> Joints {
        let mut joints = [0.0; 6];
        for i in 0..6 {
            joints[i] = normalize_angle((q[i] - self.offsets[i]) * self.sign_corrections[i]);
        }
        joints
    }

    /// Host flange pose in meters for the given joints (radians), robot-local.
    pub fn forward(&self, joints: &Joints) -> Isometry3<f64> {
        let q = self.model_angles(joints);

        let psi3 = self.a2.atan2(self.c3);
        let k = self.a2.hypot(self.c3);

        let cx1 = self.c2 * q[1].sin() + k * (q[1] + q[2] + psi3).sin() + self.a1;
        let cy1 = self.b;
        let cz1 = self.c2 * q[1].cos() + k * (q[1] + q[2] + psi3).cos();

        let (s1, c1) = q[0].sin_cos();
        let (s23, c23) = (q[1] + q[2]).sin_cos();
        let (s4, c4) = q[3].sin_cos();
        let (s5, c5) = q[4].sin_cos();
        let (s6, c6) = q[5].sin_cos();

        let centre = Vector3::new(cx1 * c1 - cy1 * s1, cx1 * s1 + cy1 * c1, cz1 + self.c1);

        let r_0c = Matrix3::new(
            c1 * c23, -s1, c1 * s23,
            s1 * c23, c1, s1 * s23,
            -s23, 0.0, c23,
        );
        let r_ce = Matrix3::new(
            c4 * c5 * c6 - s4 * s6, -c4 * c5 * s6 - s4 * c6, c4 * s5,
            s4 * c5 * c6 + c4 * s6, -s4 * c5 * s6 + c4 * c6, s4 * s5,
            -s5 * c6, s5 * s6, c5,
        );
        let r_oe = r_0c * r_ce;

        let translation = centre + r_oe * Vector3::z() * self.c4;
        let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_oe));
        Isometry3::from_parts(Translation3::from(translation), rotation * self.flange_alignment)
    }

    /// Host flange pose (meters) to the solver's end-effector convention.
    pub fn to_engine_frame(&self, flange: &Isometry3<f64>) -> Isometry3<f64> {
        let quarter_turn = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
        Isometry3::from_parts(
            flange.translation,
            flange.rotation * self.flange_alignment.inverse() * quarter_turn,
        )
    }
}

impl AnalyticSolver for OpwParameters {
    fn solve(&self, target: &Isometry3<f64>) -> Result<IkSolutions, IkError> {
        check_platform()?;

        let m = target.rotation.to_rotation_matrix().into_inner();
        let normal = m.column(0).into_owned();
        let approach = m.column(1).into_owned();
        let side = -m.column(2).into_owned();
        let p = target.translation.vector;

        let (a1, a2, b, c1, c2, c3, c4) = (self.a1, self.a2, self.b, self.c1, self.c2, self.c3, self.c4);

        // Wrist centre
        let c = p - approach * c4;

        let nx1 = (c.x * c.x + c.y * c.y - b * b).sqrt() - a1;

        let tmp1 = c.y.atan2(c.x);
        let tmp2 = b.atan2(nx1 + a1);
        let theta1_i = tmp1 - tmp2;
        let theta1_ii = tmp1 + tmp2 - PI;

        let tmp3 = c.z - c1;
        let s1_2 = nx1 * nx1 + tmp3 * tmp3;
        let tmp4 = nx1 + 2.0 * a1;
        let s2_2 = tmp4 * tmp4 + tmp3 * tmp3;
        let kappa_2 = a2 * a2 + c3 * c3;
        let c2_2 = c2 * c2;

        let s1 = s1_2.sqrt();
        let s2 = s2_2.sqrt();

        let tmp13 = ((s1_2 + c2_2 - kappa_2) / (2.0 * s1 * c2)).acos();
        let tmp14 = nx1.atan2(tmp3);
        let theta2_i = -tmp13 + tmp14;
        let theta2_ii = tmp13 + tmp14;

        let tmp15 = ((s2_2 + c2_2 - kappa_2) / (2.0 * s2 * c2)).acos();
        let tmp16 = tmp4.atan2(tmp3);
        let theta2_iii = -tmp15 - tmp16;
        let theta2_iv = tmp15 - tmp16;

        let tmp9 = 2.0 * c2 * kappa_2.sqrt();
        let tmp10 = a2.atan2(c3);
        let tmp11 = ((s1_2 - c2_2 - kappa_2) / tmp9).acos();
        let tmp12 = ((s2_2 - c2_2 - kappa_2) / tmp9).acos();
        let theta3_i = tmp11 - tmp10;
        let theta3_ii = -tmp11 - tmp10;
        let theta3_iii = tmp12 - tmp10;
        let theta3_iv = -tmp12 - tmp10;

        let arms = [
            (theta1_i, theta2_i, theta3_i),
            (theta1_i, theta2_ii, theta3_ii),
            (theta1_ii, theta2_iii, theta3_iii),
            (theta1_ii, theta2_iv, theta3_iv),
        ];

        let mut candidates = Vec::with_capacity(CONFIGURATION_SLOTS);
        let mut flipped = Vec::with_capacity(CONFIGURATION_SLOTS / 2);
        for &(theta1, theta2, theta3) in arms.iter() {
            let (sin1, cos1) = theta1.sin_cos();
            let (s23, c23) = (theta2 + theta3).sin_cos();
            let forearm = Vector3::new(s23 * cos1, s23 * sin1, c23);

            let m = approach.dot(&forearm).clamp(-1.0, 1.0);
            let theta4 = (approach.y * cos1 - approach.x * sin1)
                .atan2(approach.x * c23 * cos1 + approach.y * c23 * sin1 - approach.z * s23);
            let theta5 = (1.0 - m * m).sqrt().atan2(m);
            let theta6 = side.dot(&forearm).atan2(-normal.dot(&forearm));

            candidates.push([theta1, theta2, theta3, theta4, theta5, theta6]);
            flipped.push([theta1, theta2, theta3, theta4 + PI, -theta5, theta6 - PI]);
        }
        candidates.extend(flipped);

        let solutions: Vec<Joints> = candidates
            .iter()
            .filter(|q| q.iter().all(|v| v.is_finite()))
            .map(|q| self.host_joints(q))
            .collect();

        trace!(
            wrist_centre = ?c,
            found = solutions.len(),
            "closed-form candidates"
        );
        Ok(IkSolutions::new(solutions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RobotConfig;

    fn irb2400() -> OpwParameters {
        let geometry = RobotConfig::irb2400_10().link_geometry();
        OpwParameters::from_geometry(&geometry, 0.001).unwrap()
    }

    #[test]
    fn test_platform_is_supported() {
        assert!(check_platform().is_ok());
    }

    #[test]
    fn test_parameters_from_irb2400_geometry() {
        let p = irb2400();
        println!("{:?}", p);

        assert!((p.a1 - 0.100).abs() < 1e-12);
        assert!((p.a2 + 0.135).abs() < 1e-12);
        assert!(p.b.abs() < 1e-12);
        assert!((p.c1 - 0.615).abs() < 1e-12);
        assert!((p.c2 - 0.705).abs() < 1e-12);
        assert!((p.c3 - 0.755).abs() < 1e-12);
        assert!((p.c4 - 0.085).abs() < 1e-12);
        assert!((p.offsets[2] - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(p.sign_corrections, [1.0; 6]);
        assert!(p.flange_alignment.angle() < 1e-9);
    }

    #[test]
    fn test_forward_at_home() {
        let pose = irb2400().forward(&[0.0; 6]);
        let expected = Vector3::new(0.940, 0.0, 1.455);
        assert!((pose.translation.vector - expected).norm() < 1e-12);
    }

    #[test]
    fn test_solve_recovers_joints() {
        let p = irb2400();
        let joints = [0.3, 0.2, -0.4, 0.5, 0.7, -0.6];
        let flange = p.forward(&joints);

        let solutions = p.solve(&p.to_engine_frame(&flange)).unwrap();
        println!("{} candidates", solutions.count());
        assert_eq!(solutions.count(), 8);

        let matched = solutions
            .iter()
            .any(|s| s.iter().zip(joints.iter()).all(|(a, b)| (a - b).abs() < 1e-9));
        assert!(matched, "original joints not among {:?}", solutions);

        for s in &solutions {
            let pose = p.forward(s);
            assert!((pose.translation.vector - flange.translation.vector).norm() < 1e-9);
            assert!(pose.rotation.angle_to(&flange.rotation) < 1e-9);
        }
    }

    #[test]
    fn test_unreachable_target_has_no_candidates() {
        let p = irb2400();
        let far = Isometry3::translation(5.0, 0.0, 1.0);
        let solutions = p.solve(&p.to_engine_frame(&far)).unwrap();
        assert_eq!(solutions.count(), 0);
        assert!(solutions.is_empty());
    }

    #[test]
    fn test_rejects_tilted_base_axis() {
        let mut geometry = RobotConfig::irb2400_10().link_geometry();
        geometry.joints[0] = crate::geometry::frame_from_axes(
            Vector3::zeros(),
            Vector3::z(),
            Vector3::x(),
        );
        let result = OpwParameters::from_geometry(&geometry, 0.001);
        assert!(matches!(result, Err(IkError::UnsupportedGeometry(_))));
    }

    #[test]
    fn test_rejects_wrist_offset_from_joint6() {
        let mut geometry = RobotConfig::irb2400_10().link_geometry();
        geometry.joints[5].translation.vector.x += 10.0;
        let err = OpwParameters::from_geometry(&geometry, 0.001).unwrap_err();
        println!("{}", err);
        assert!(matches!(err, IkError::UnsupportedGeometry(_)));
    }

    #[test]
    fn test_reversed_axes_become_sign_corrections() {
        let config = RobotConfig::irb2400_10();
        let mut geometry = config.link_geometry();
        for i in [1, 3] {
            let frame = geometry.joints[i];
            geometry.joints[i] = frame * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI);
        }
        let p = OpwParameters::from_geometry(&geometry, 0.001).unwrap();
        assert_eq!(p.sign_corrections, [1.0, -1.0, 1.0, -1.0, 1.0, 1.0]);
    }
}
