mod ik_error;
pub use ik_error::*;
