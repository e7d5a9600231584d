mod link_geometry;
mod robot_config;

pub use link_geometry::*;
pub use robot_config::*;
