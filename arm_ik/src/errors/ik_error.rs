use std::error::Error;
use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum IkError {
    /// 64-bit IEEE-754 arithmetic is not available on this target.
    UnsupportedPlatform(String),
    /// The link geometry cannot be solved by the closed-form engine.
    UnsupportedGeometry(String),
    /// The joint-4 axis never meets the joint-6 plane for this slot.
    WristCenterNotFound { slot: usize },
    InvalidConfig(String),
    InvalidPose(String),
    InvalidSentinel { slot: usize },
}

impl Error for IkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for IkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            IkError::UnsupportedPlatform(ref msg) => write!(f, "Unsupported platform: {}", msg),
            IkError::UnsupportedGeometry(ref msg) => {
                write!(f, "Link geometry is not closed-form solvable: {}", msg)
            }
            IkError::WristCenterNotFound { slot } => write!(
                f,
                "Wrist centre not found for configuration {}: joint 4 axis is parallel to the joint 6 plane",
                slot
            ),
            IkError::InvalidConfig(ref msg) => write!(f, "Invalid solver configuration: {}", msg),
            IkError::InvalidPose(ref msg) => write!(f, "Invalid pose: {}", msg),
            IkError::InvalidSentinel { slot } => write!(
                f,
                "Slot {} mixes missing-value markers with real joint angles",
                slot
            ),
        }
    }
}
