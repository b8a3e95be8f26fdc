use thiserror::Error;

use crate::tracking::TrackerFailure;

/// Errors raised while turning tracker output into render state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// The 16-value pose could not be decomposed into rotation + translation.
    #[error("Invalid pose: {reason}")]
    InvalidPose { reason: String },

    /// Camera parameters that cannot produce a perspective projection.
    #[error("Invalid camera parameters: fov={fov} aspect={aspect}")]
    InvalidCameraParameters { fov: f32, aspect: f32 },

    /// Near/far planes that cannot bound a view frustum.
    #[error("Invalid clip planes: near={near} far={far}")]
    InvalidClipPlanes { near: f32, far: f32 },

    /// The tracker reported a fatal condition; no further poses will be applied.
    #[error("Tracker failed: {0}")]
    TrackerFailed(TrackerFailure),
}

impl BridgeError {
    pub fn invalid_pose(reason: impl Into<String>) -> Self {
        BridgeError::InvalidPose {
            reason: reason.into(),
        }
    }

    /// Whether a host loop can keep feeding events after this error.
    /// Rejected camera parameters leave the previous projection in place;
    /// everything else that reaches the caller ends the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BridgeError::InvalidCameraParameters { .. })
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_camera_parameters_are_recoverable() {
        assert!(BridgeError::InvalidCameraParameters { fov: 0., aspect: 1. }.is_recoverable());
        assert!(!BridgeError::invalid_pose("zero").is_recoverable());
        assert!(!BridgeError::InvalidClipPlanes { near: 1., far: 0. }.is_recoverable());
        assert!(!BridgeError::TrackerFailed(TrackerFailure::Camera).is_recoverable());
    }
}
