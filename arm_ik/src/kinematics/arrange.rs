use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{forward_kinematics, IkSolutions, PosedFrames};
use crate::{IkError, Joints, LinkGeometry, CONFIGURATION_SLOTS, MISSING_JOINT_VALUE};

/// Axis configuration index.
///
/// ```text
/// bit 2  Cf1  shoulder side (TCP left/right of the shoulder seen from the base)
/// bit 1  Cf4  elbow side (elbow above/below the shoulder -> TCP line)
/// bit 0  Cf6  wrist flip (joint 5 negative)
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Cfx(u8);

impl Cfx {
    pub fn new(index: u8) -> Option<Self> {
        if (index as usize) < CONFIGURATION_SLOTS {
            Some(Self(index))
        } else {
            None
        }
    }

    pub fn from_bits(cf1: bool, cf4: bool, cf6: bool) -> Self {
        Self(((cf1 as u8) << 2) | ((cf4 as u8) << 1) | cf6 as u8)
    }

    pub fn cf1(&self) -> bool {
        self.0 & 0b100 != 0
    }

    pub fn cf4(&self) -> bool {
        self.0 & 0b010 != 0
    }

    pub fn cf6(&self) -> bool {
        self.0 & 0b001 != 0
    }

    /// Slot position in an [`ArrangedSolutions`].
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// All eight configurations in slot order.
    pub fn all() -> impl Iterator<Item = Cfx> {
        (0..CONFIGURATION_SLOTS as u8).map(Cfx)
    }
}

impl TryFrom<u8> for Cfx {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Cfx::new(value).ok_or_else(|| format!("configuration index {} is out of range 0..=7", value))
    }
}

impl From<Cfx> for u8 {
    fn from(cfx: Cfx) -> Self {
        cfx.0
    }
}

impl std::fmt::Display for Cfx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Eight configuration slots, indexed by [`Cfx`]. A slot is `None` when no
/// candidate landed there.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ArrangedSolutions {
    slots: [Option<Joints>; CONFIGURATION_SLOTS],
}

impl ArrangedSolutions {
    pub fn get(&self, cfx: Cfx) -> Option<&Joints> {
        self.slots[cfx.index()].as_ref()
    }

    /// Slot by position; out-of-range positions are missing.
    pub fn slot(&self, index: usize) -> Option<&Joints> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn slots(&self) -> &[Option<Joints>; CONFIGURATION_SLOTS] {
        &self.slots
    }

    /// Store `joints` at `cfx`, returning whatever was there before.
    pub fn insert(&mut self, cfx: Cfx, joints: Joints) -> Option<Joints> {
        self.slots[cfx.index()].replace(joints)
    }

    /// Number of populated slots.
    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Populated slots in slot order.
    pub fn present(&self) -> impl Iterator<Item = (Cfx, &Joints)> + '_ {
        Cfx::all().filter_map(move |cfx| self.get(cfx).map(|j| (cfx, j)))
    }

    /// Legacy layout: missing slots hold [`MISSING_JOINT_VALUE`] in all six entries.
    pub fn to_sentinel_array(&self) -> [[f64; 6]; CONFIGURATION_SLOTS] {
        let mut out = [[MISSING_JOINT_VALUE; 6]; CONFIGURATION_SLOTS];
        for (row, slot) in out.iter_mut().zip(self.slots.iter()) {
            if let Some(joints) = slot {
                *row = *joints;
            }
        }
        out
    }

    /// Read the legacy layout back.
    ///
    /// A row is missing only if all six entries are the sentinel; a partial
    /// sentinel row or a non-finite value is rejected.
    pub fn from_sentinel_array(rows: &[[f64; 6]; CONFIGURATION_SLOTS]) -> Result<Self, IkError> {
        let mut arranged = ArrangedSolutions::default();
        for (slot, row) in rows.iter().enumerate() {
            let sentinels = row.iter().filter(|v| **v == MISSING_JOINT_VALUE).count();
            if sentinels == 6 {
                continue;
            }
            if sentinels != 0 || row.iter().any(|v| !v.is_finite()) {
                return Err(IkError::InvalidSentinel { slot });
            }
            arranged.slots[slot] = Some(*row);
        }
        Ok(arranged)
    }
}

/// Configuration of an already posed arm.
///
/// `posed` must come from [`forward_kinematics`] with the same joints; the
/// geometry supplies the home upper-arm length used to push the shoulder
/// point out along the joint 2 axis.
pub fn configuration(geometry: &LinkGeometry, posed: &PosedFrames, joints: &Joints) -> Cfx {
    let tcp = posed.tcp_origin().coords;
    let shoulder = posed.origin(1).coords;
    let elbow = posed.origin(2).coords;

    // Shoulder side: which side of the base -> TCP line the offset shoulder falls on
    let offset_shoulder = shoulder - posed.axis(1) * geometry.upper_arm_length();
    let side = tcp.x * offset_shoulder.y - tcp.y * offset_shoulder.x;
    let cf1 = side > 0.0;

    // Elbow side, in the vertical plane through the shoulder facing the TCP
    let reach = horizontal_direction(&tcp)
        .or_else(|| horizontal_direction(&shoulder))
        .unwrap_or_else(Vector2::x);
    let planar = |p: Vector3<f64>| {
        let d = p - shoulder;
        Vector2::new(d.z, d.x * reach.x + d.y * reach.y)
    };
    let to_elbow = planar(elbow);
    let to_tcp = planar(tcp);
    let turn = to_elbow.x * to_tcp.y - to_elbow.y * to_tcp.x;
    let cf4 = (turn < 0.0) != cf1;

    let cf6 = joints[4] < 0.0;

    trace!(side, turn, j5 = joints[4], "configuration bits");
    Cfx::from_bits(cf1, cf4, cf6)
}

fn horizontal_direction(p: &Vector3<f64>) -> Option<Vector2<f64>> {
    Vector2::new(p.x, p.y).try_normalize(f64::EPSILON)
}

/// Place every candidate at the slot of its configuration.
///
/// Two candidates with the same configuration should not happen for a
/// well-formed arm; if they do, the later one wins.
pub fn arrange(solutions: &IkSolutions, geometry: &LinkGeometry) -> ArrangedSolutions {
    let mut arranged = ArrangedSolutions::default();

    for joints in solutions {
        let posed = forward_kinematics(geometry, joints);
        let cfx = configuration(geometry, &posed, joints);
        if let Some(previous) = arranged.insert(cfx, *joints) {
            warn!(
                cfx = cfx.index(),
                ?previous,
                replacement = ?joints,
                "two candidates share a configuration, keeping the later one"
            );
        }
    }

    debug!(
        candidates = solutions.count(),
        arranged = arranged.present_count(),
        "arranged solutions"
    );
    arranged
}
