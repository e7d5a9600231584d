//! Conversions between host value types and the solver's nalgebra types.
//!
//! Everything that enters or leaves the solver passes through here: CAD
//! planes and quaternions become `Isometry3<f64>` / `UnitQuaternion<f64>`,
//! joint angles switch between radians (inside) and degrees (host), and
//! lengths switch between the host's working unit and meters.
//!
//! # Examples
//!
//! ```rust
//! use arm_ik::Plane;
//! use nalgebra::Isometry3;
//!
//! let plane = Plane::new([100.0, 200.0, 300.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]);
//! let iso = Isometry3::try_from(&plane).unwrap();
//! assert!((iso.translation.x - 100.0).abs() < 1e-12);
//!
//! let back = Plane::from(&iso);
//! assert!((back.x_axis[1] - 1.0).abs() < 1e-12);
//! ```
//!
//! # Notes
//!
//! - A plane's X axis is kept; its Y axis is re-orthogonalised against X.
//! - Degrees use exactly 180/π (`f64::to_degrees`).

use nalgebra::{Isometry3, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::{IkError, JointAngles, Joints, Plane, Quaternion};

const AXIS_EPSILON: f64 = 1e-12;

fn vector(v: &[f64; 3]) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

fn array(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Convert a host plane to a rigid transform.
///
/// Fails when the axes are not finite, have zero length or are parallel.
impl TryFrom<&Plane> for Isometry3<f64> {
    type Error = IkError;

    fn try_from(plane: &Plane) -> Result<Self, Self::Error> {
        let origin = vector(&plane.origin);
        let x = vector(&plane.x_axis);
        let y = vector(&plane.y_axis);
        if !(origin.iter().chain(x.iter()).chain(y.iter()).all(|v| v.is_finite())) {
            return Err(IkError::InvalidPose("plane contains non-finite values".to_string()));
        }

        let x = x
            .try_normalize(AXIS_EPSILON)
            .ok_or_else(|| IkError::InvalidPose("plane X axis has zero length".to_string()))?;
        let y = (y - x * x.dot(&y))
            .try_normalize(AXIS_EPSILON)
            .ok_or_else(|| IkError::InvalidPose("plane axes are parallel".to_string()))?;
        let z = x.cross(&y);

        let rotation = Rotation3::from_basis_unchecked(&[x, y, z]);
        Ok(Isometry3::from_parts(
            Translation3::from(origin),
            UnitQuaternion::from_rotation_matrix(&rotation),
        ))
    }
}

impl TryFrom<Plane> for Isometry3<f64> {
    type Error = IkError;

    fn try_from(plane: Plane) -> Result<Self, Self::Error> {
        Isometry3::try_from(&plane)
    }
}

impl From<&Isometry3<f64>> for Plane {
    fn from(iso: &Isometry3<f64>) -> Self {
        let x = iso.rotation * Vector3::x();
        let y = iso.rotation * Vector3::y();
        Plane {
            origin: array(&iso.translation.vector),
            x_axis: array(&x),
            y_axis: array(&y),
        }
    }
}

impl From<Isometry3<f64>> for Plane {
    fn from(iso: Isometry3<f64>) -> Self {
        Plane::from(&iso)
    }
}

impl TryFrom<Quaternion> for UnitQuaternion<f64> {
    type Error = IkError;

    fn try_from(q: Quaternion) -> Result<Self, Self::Error> {
        let raw = nalgebra::Quaternion::new(q.a, q.b, q.c, q.d);
        UnitQuaternion::try_new(raw, AXIS_EPSILON)
            .ok_or_else(|| IkError::InvalidPose("quaternion has zero length".to_string()))
    }
}

impl From<UnitQuaternion<f64>> for Quaternion {
    fn from(q: UnitQuaternion<f64>) -> Self {
        Quaternion {
            a: q.w,
            b: q.i,
            c: q.j,
            d: q.k,
        }
    }
}

impl Plane {
    /// Build a plane from an origin and a host quaternion.
    pub fn from_quaternion(origin: [f64; 3], q: Quaternion) -> Result<Self, IkError> {
        let rotation = UnitQuaternion::try_from(q)?;
        Ok(Plane::from(Isometry3::from_parts(
            Translation3::from(vector(&origin)),
            rotation,
        )))
    }

    /// Orientation of this plane as a host quaternion.
    pub fn quaternion(&self) -> Result<Quaternion, IkError> {
        let iso = Isometry3::try_from(self)?;
        Ok(Quaternion::from(iso.rotation))
    }
}

impl From<Joints> for JointAngles {
    fn from(radians: Joints) -> Self {
        JointAngles {
            j1: radians[0].to_degrees(),
            j2: radians[1].to_degrees(),
            j3: radians[2].to_degrees(),
            j4: radians[3].to_degrees(),
            j5: radians[4].to_degrees(),
            j6: radians[5].to_degrees(),
        }
    }
}

impl From<JointAngles> for Joints {
    fn from(degrees: JointAngles) -> Self {
        [
            degrees.j1.to_radians(),
            degrees.j2.to_radians(),
            degrees.j3.to_radians(),
            degrees.j4.to_radians(),
            degrees.j5.to_radians(),
            degrees.j6.to_radians(),
        ]
    }
}

/// Rescale the translation of a transform; rotation is unit-free.
pub fn scale_translation(iso: &Isometry3<f64>, factor: f64) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::from(iso.translation.vector * factor),
        iso.rotation,
    )
}

/// Wrap an angle into (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let two_pi = 2.0 * std::f64::consts::PI;
    let mut normalized = angle % two_pi;
    if normalized > std::f64::consts::PI {
        normalized -= two_pi;
    } else if normalized <= -std::f64::consts::PI {
        normalized += two_pi;
    }
    normalized
}
