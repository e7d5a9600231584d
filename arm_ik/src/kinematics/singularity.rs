use int_enum::IntEnum;
use nalgebra::{Matrix6, Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{forward_kinematics, ArrangedSolutions, Cfx, PosedFrames};
use crate::{IkError, LinkGeometry, SolverConfig, CONFIGURATION_SLOTS};

/// Below this, the joint 4 axis counts as parallel to the joint 6 plane.
const PARALLEL_EPSILON: f64 = 1e-9;

/// Classification of one configuration slot, as sent to hosts.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntEnum)]
pub enum SingularityKind {
    Regular = 0,
    Wrist = 1,
    Elbow = 2,
    Shoulder = 3,
    NoResult = 4,
}

/// Per-slot singularity flags. For every slot at most one of `wrist`,
/// `elbow` and `shoulder` is set, and none of them when `no_result` is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SingularityReport {
    pub wrist: [bool; CONFIGURATION_SLOTS],
    pub elbow: [bool; CONFIGURATION_SLOTS],
    pub shoulder: [bool; CONFIGURATION_SLOTS],
    pub no_result: [bool; CONFIGURATION_SLOTS],
}

impl SingularityReport {
    pub fn kind(&self, cfx: Cfx) -> SingularityKind {
        let slot = cfx.index();
        if self.no_result[slot] {
            SingularityKind::NoResult
        } else if self.wrist[slot] {
            SingularityKind::Wrist
        } else if self.elbow[slot] {
            SingularityKind::Elbow
        } else if self.shoulder[slot] {
            SingularityKind::Shoulder
        } else {
            SingularityKind::Regular
        }
    }

    /// Int-coded kinds in slot order.
    pub fn codes(&self) -> [u8; CONFIGURATION_SLOTS] {
        let mut codes = [0; CONFIGURATION_SLOTS];
        for (cfx, code) in Cfx::all().zip(codes.iter_mut()) {
            *code = self.kind(cfx).into();
        }
        codes
    }
}

/// Geometric Jacobian at the TCP.
///
/// Column `i` is `[z_i x (p_tcp - o_i); z_i]`, robot-local. The linear rows
/// are scaled to meters so that conditioning does not depend on the host unit.
pub fn jacobian(posed: &PosedFrames, length_to_meters: f64) -> Matrix6<f64> {
    let tcp = posed.tcp_origin();
    let mut jac = Matrix6::zeros();
    for i in 0..6 {
        let axis = posed.axis(i);
        let linear = axis.cross(&(tcp - posed.origin(i))) * length_to_meters;
        for row in 0..3 {
            jac[(row, i)] = linear[row];
            jac[(row + 3, i)] = axis[row];
        }
    }
    jac
}

/// Smallest and largest singular value.
pub fn singular_value_range(jac: &Matrix6<f64>) -> (f64, f64) {
    let values = jac.svd(false, false).singular_values;
    (values.min(), values.max())
}

pub fn is_near_singular(sigma_min: f64, sigma_max: f64, tolerance: f64) -> bool {
    if sigma_max <= 0.0 {
        return true;
    }
    sigma_min / sigma_max <= tolerance || sigma_max / sigma_min > 1.0 / tolerance
}

fn acute_angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let angle = a.angle(b);
    if angle > std::f64::consts::FRAC_PI_2 {
        std::f64::consts::PI - angle
    } else {
        angle
    }
}

/// Intersection of the joint 4 axis with the plane of the joint 6 frame.
///
/// With joint 5 at ±90° the axis lies inside the plane; the joint 6 origin
/// is then taken as the centre.
fn wrist_centre(posed: &PosedFrames, slot: usize) -> Result<Point3<f64>, IkError> {
    let o4 = posed.origin(3);
    let z4 = posed.axis(3);
    let o6 = posed.origin(5);
    let z6 = posed.axis(5);

    let offset = (o6 - o4).dot(&z6);
    let denom = z4.dot(&z6);
    if denom.abs() < PARALLEL_EPSILON {
        if offset.abs() <= PARALLEL_EPSILON * (o6 - o4).norm().max(1.0) {
            return Ok(o6);
        }
        return Err(IkError::WristCenterNotFound { slot });
    }
    Ok(o4 + z4 * (offset / denom))
}

/// Which of the three singularity families a near-singular pose is closest to.
fn closest_family(posed: &PosedFrames, slot: usize) -> Result<SingularityKind, IkError> {
    let wrist = acute_angle(&posed.axis(3), &posed.axis(5));

    let shoulder_origin = posed.origin(1);
    let to_elbow = posed.origin(2) - shoulder_origin;
    let to_wrist = wrist_centre(posed, slot)? - shoulder_origin;
    let elbow = to_elbow.angle(&to_wrist);

    let shoulder = posed.axis(0).angle(&(posed.origin(5) - posed.origin(0)));

    trace!(
        slot,
        wrist = wrist.to_degrees(),
        elbow = elbow.to_degrees(),
        shoulder = shoulder.to_degrees(),
        "singularity angles"
    );

    let kind = if wrist <= elbow && wrist <= shoulder {
        SingularityKind::Wrist
    } else if elbow <= shoulder {
        SingularityKind::Elbow
    } else {
        SingularityKind::Shoulder
    };
    Ok(kind)
}

/// Flag missing and near-singular slots.
///
/// Every populated slot is re-posed with forward kinematics and its Jacobian
/// conditioning compared against `config.singularity_tolerance`.
pub fn classify(
    arranged: &ArrangedSolutions,
    geometry: &LinkGeometry,
    config: &SolverConfig,
) -> Result<SingularityReport, IkError> {
    config.checked()?;
    let mut report = SingularityReport::default();

    for cfx in Cfx::all() {
        let slot = cfx.index();
        let Some(joints) = arranged.get(cfx) else {
            report.no_result[slot] = true;
            continue;
        };

        let posed = forward_kinematics(geometry, joints);
        let (sigma_min, sigma_max) = singular_value_range(&jacobian(&posed, config.length_to_meters));
        trace!(slot, sigma_min, sigma_max, "jacobian conditioning");

        if !is_near_singular(sigma_min, sigma_max, config.singularity_tolerance) {
            continue;
        }

        match closest_family(&posed, slot)? {
            SingularityKind::Wrist => report.wrist[slot] = true,
            SingularityKind::Elbow => report.elbow[slot] = true,
            SingularityKind::Shoulder => report.shoulder[slot] = true,
            SingularityKind::Regular | SingularityKind::NoResult => {}
        }
        debug!(slot, kind = ?report.kind(cfx), "near-singular configuration");
    }

    Ok(report)
}
