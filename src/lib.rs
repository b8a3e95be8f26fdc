pub mod bridge_config;
pub mod error;
pub mod events;
pub mod geometry_utils;
pub mod session;
pub mod systems;
#[cfg(feature = "tether")]
pub mod tether_interface;
pub mod tracking;

pub use error::{BridgeError, BridgeResult};
pub use systems::pose_transform::{CameraTransform, transform_pose};
pub use systems::projection::Projection;
pub use tracking::Pose;
