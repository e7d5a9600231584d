//! Robot presets for common spherical-wrist arms
//!
//! Dimensions follow the usual seven-parameter description of an arm with
//! an ortho-parallel base and a spherical wrist:
//!
//! ```text
//!          c4 (wrist centre -> flange)
//!        ___________o===|
//!   a2  |     c3
//!       o  elbow (joint 3)
//!       |
//!       | c2
//!       |
//!       o  shoulder (joint 2), a1 in front of joint 1, c1 above the floor
//!       |
//!  _____|_____
//! ```
//!
//! `b` is the lateral offset of the wrist centre out of the arm plane.
//! All lengths are in millimeters. At home the upper arm points straight up
//! and the forearm points forward along +X.
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{frame_from_axes, LinkGeometry};

/// Available robot presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RobotModel {
    /// IRB 2400/10: 10kg payload, 1550mm reach
    #[default]
    Irb2400_10,
    /// IRB 1660ID: 6kg payload, 1550mm reach
    Irb1660Id,
    /// IRB 6700-200/2.60: 200kg payload, 2600mm reach
    Irb6700_200_260,
    /// TX40: 2.3kg payload, 515mm reach, lateral wrist offset
    StaubliTx40,
}

impl RobotModel {
    /// Get all available robot models.
    pub fn all() -> Vec<RobotModel> {
        vec![
            RobotModel::Irb2400_10,
            RobotModel::Irb1660Id,
            RobotModel::Irb6700_200_260,
            RobotModel::StaubliTx40,
        ]
    }

    /// Get the display name for this robot model.
    pub fn display_name(&self) -> &'static str {
        match self {
            RobotModel::Irb2400_10 => "IRB 2400/10 (10kg, 1550mm)",
            RobotModel::Irb1660Id => "IRB 1660ID (6kg, 1550mm)",
            RobotModel::Irb6700_200_260 => "IRB 6700-200/2.60 (200kg, 2600mm)",
            RobotModel::StaubliTx40 => "TX40 (2.3kg, 515mm)",
        }
    }

    /// Get the short name for this robot model.
    pub fn short_name(&self) -> &'static str {
        match self {
            RobotModel::Irb2400_10 => "IRB2400",
            RobotModel::Irb1660Id => "IRB1660ID",
            RobotModel::Irb6700_200_260 => "IRB6700",
            RobotModel::StaubliTx40 => "TX40",
        }
    }
}

impl std::fmt::Display for RobotModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl std::str::FromStr for RobotModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace([' ', '-', '/'], "").as_str() {
            "IRB2400" | "IRB240010" | "2400" => Ok(RobotModel::Irb2400_10),
            "IRB1660ID" | "1660ID" | "1660" => Ok(RobotModel::Irb1660Id),
            "IRB6700" | "IRB67002002.60" | "6700" => Ok(RobotModel::Irb6700_200_260),
            "TX40" | "STAUBLITX40" => Ok(RobotModel::StaubliTx40),
            _ => Err(format!("Unknown robot model: {}", s)),
        }
    }
}

/// Robot dimensions in millimeters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Robot model
    pub model: RobotModel,

    /// Maximum payload in kg
    pub max_payload: f64,

    /// Maximum reach in mm
    pub max_reach: f64,

    pub a1: f64, // shoulder offset in front of joint 1
    pub a2: f64, // elbow offset (negative: forearm above the elbow)
    pub b: f64,  // lateral wrist offset
    pub c1: f64, // shoulder height
    pub c2: f64, // upper arm
    pub c3: f64, // forearm
    pub c4: f64, // wrist centre to flange
}

impl RobotConfig {
    pub fn irb2400_10() -> Self {
        Self {
            model: RobotModel::Irb2400_10,
            max_payload: 10.0,
            max_reach: 1550.0,
            a1: 100.0,
            a2: -135.0,
            b: 0.0,
            c1: 615.0,
            c2: 705.0,
            c3: 755.0,
            c4: 85.0,
        }
    }

    pub fn irb1660id() -> Self {
        Self {
            model: RobotModel::Irb1660Id,
            max_payload: 6.0,
            max_reach: 1550.0,
            a1: 150.0,
            a2: -110.0,
            b: 0.0,
            c1: 486.5,
            c2: 700.0,
            c3: 678.0,
            c4: 135.0,
        }
    }

    pub fn irb6700_200_260() -> Self {
        Self {
            model: RobotModel::Irb6700_200_260,
            max_payload: 200.0,
            max_reach: 2600.0,
            a1: 320.0,
            a2: -200.0,
            b: 0.0,
            c1: 780.0,
            c2: 1075.0,
            c3: 1142.5,
            c4: 200.0,
        }
    }

    pub fn staubli_tx40() -> Self {
        Self {
            model: RobotModel::StaubliTx40,
            max_payload: 2.3,
            max_reach: 515.0,
            a1: 0.0,
            a2: 0.0,
            b: 35.0,
            c1: 320.0,
            c2: 225.0,
            c3: 225.0,
            c4: 65.0,
        }
    }

    /// Create configuration for a specific robot model
    pub fn from_model(model: RobotModel) -> Self {
        match model {
            RobotModel::Irb2400_10 => Self::irb2400_10(),
            RobotModel::Irb1660Id => Self::irb1660id(),
            RobotModel::Irb6700_200_260 => Self::irb6700_200_260(),
            RobotModel::StaubliTx40 => Self::staubli_tx40(),
        }
    }

    /// Home-configuration link geometry for these dimensions.
    ///
    /// Joint 1 turns about +Z at the origin, joints 2, 3 and 5 about +Y,
    /// joints 4 and 6 about +X. The joint 6 frame sits on the wrist centre.
    pub fn link_geometry(&self) -> LinkGeometry {
        let up = Vector3::z();
        let down = -Vector3::z();
        let forward = Vector3::x();
        let lateral = Vector3::y();

        let shoulder = Vector3::new(self.a1, 0.0, self.c1);
        let elbow = shoulder + up * self.c2;
        let wrist_height = elbow.z - self.a2;
        let wrist = Vector3::new(self.a1 + self.c3, self.b, wrist_height);
        let forearm = Vector3::new(self.a1 + 0.5 * self.c3, self.b, wrist_height);
        let flange = wrist + forward * self.c4;

        let joints = [
            frame_from_axes(Vector3::zeros(), forward, up),
            frame_from_axes(shoulder, up, lateral),
            frame_from_axes(elbow, up, lateral),
            frame_from_axes(forearm, down, forward),
            frame_from_axes(wrist, down, lateral),
            frame_from_axes(wrist, down, forward),
        ];

        LinkGeometry::new(joints, frame_from_axes(flange, down, forward))
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::irb2400_10()
    }
}

impl From<RobotModel> for LinkGeometry {
    fn from(model: RobotModel) -> Self {
        RobotConfig::from_model(model).link_geometry()
    }
}
