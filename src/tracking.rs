use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of values in a tracker pose.
pub const POSE_LEN: usize = 16;

/// A camera pose exactly as the tracker delivers it: a 4x4 homogeneous
/// transform as 16 floats, four groups of four. Group 3 (elements 12..14)
/// holds the translation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Pose(pub [f32; POSE_LEN]);

impl Pose {
    pub fn new(values: [f32; POSE_LEN]) -> Self {
        Pose(values)
    }

    /// Accepts a pose from any slice, as long as it holds exactly 16 values
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        let values: [f32; POSE_LEN] = values.try_into().ok()?;
        Some(Pose(values))
    }

    pub fn values(&self) -> &[f32; POSE_LEN] {
        &self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// Camera intrinsics the tracker reports for the current viewport.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CameraParameters {
    /// Vertical field of view, in degrees
    pub fov: f32,
    /// Viewport width / height
    pub aspect: f32,
}

impl CameraParameters {
    pub fn new(fov: f32, aspect: f32) -> Self {
        CameraParameters { fov, aspect }
    }

    pub fn is_valid(&self) -> bool {
        self.fov.is_finite()
            && self.aspect.is_finite()
            && self.fov > 0.
            && self.fov < 180.
            && self.aspect > 0.
    }
}

impl Default for CameraParameters {
    fn default() -> Self {
        CameraParameters {
            fov: 60.,
            aspect: 16. / 9.,
        }
    }
}

/// The tracking collaborator, as far as the bridge needs to query it.
pub trait Tracker {
    fn camera_parameters(&self) -> CameraParameters;
}

/// A tracker stand-in that answers with whatever camera parameters were
/// last observed, e.g. in a recorded event stream.
#[derive(Debug, Default, Clone)]
pub struct ReplayTracker {
    camera_parameters: CameraParameters,
}

impl ReplayTracker {
    pub fn new(camera_parameters: CameraParameters) -> Self {
        ReplayTracker { camera_parameters }
    }

    pub fn set_camera_parameters(&mut self, camera_parameters: CameraParameters) {
        self.camera_parameters = camera_parameters;
    }
}

impl Tracker for ReplayTracker {
    fn camera_parameters(&self) -> CameraParameters {
        self.camera_parameters
    }
}

/// Fatal conditions the tracker can report while starting up.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerFailure {
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
    #[serde(rename = "CAMERA_ERROR")]
    Camera,
    #[serde(rename = "SENSORS_ERROR")]
    Sensors,
    #[serde(rename = "LICENSE_ERROR")]
    License,
}

impl TrackerFailure {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "INTERNAL_ERROR" => Some(TrackerFailure::Internal),
            "CAMERA_ERROR" => Some(TrackerFailure::Camera),
            "SENSORS_ERROR" => Some(TrackerFailure::Sensors),
            "LICENSE_ERROR" => Some(TrackerFailure::License),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrackerFailure::Internal => "INTERNAL_ERROR",
            TrackerFailure::Camera => "CAMERA_ERROR",
            TrackerFailure::Sensors => "SENSORS_ERROR",
            TrackerFailure::License => "LICENSE_ERROR",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrackerFailure::Internal => "Internal Error",
            TrackerFailure::Camera => "Camera Error",
            TrackerFailure::Sensors => "Sensors Error",
            TrackerFailure::License => "License Error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TrackerFailure::Internal => {
                "An unspecified error has occurred. Your device might not be compatible with this experience."
            }
            TrackerFailure::Camera => {
                "Could not access your device's camera. Please ensure you have given the required permissions in your browser settings."
            }
            TrackerFailure::Sensors => {
                "Could not access your device's motion sensors. Please ensure you have given the required permissions in your browser settings."
            }
            TrackerFailure::License => "This experience does not exist or has been unpublished.",
        }
    }
}

impl fmt::Display for TrackerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_from_slice_requires_sixteen_values() {
        assert!(Pose::from_slice(&[0.; 15]).is_none());
        assert!(Pose::from_slice(&[0.; 17]).is_none());
        let pose = Pose::from_slice(&[1.; 16]).unwrap();
        assert_eq!(pose.values()[15], 1.);
    }

    #[test]
    fn test_pose_finite_check() {
        let mut values = [0.; 16];
        assert!(Pose::new(values).is_finite());
        values[7] = f32::NAN;
        assert!(!Pose::new(values).is_finite());
        values[7] = f32::INFINITY;
        assert!(!Pose::new(values).is_finite());
    }

    #[test]
    fn test_camera_parameters_validity() {
        assert!(CameraParameters::new(60., 16. / 9.).is_valid());
        assert!(!CameraParameters::new(0., 1.).is_valid());
        assert!(!CameraParameters::new(180., 1.).is_valid());
        assert!(!CameraParameters::new(60., 0.).is_valid());
        assert!(!CameraParameters::new(60., -1.).is_valid());
        assert!(!CameraParameters::new(f32::NAN, 1.).is_valid());
    }

    #[test]
    fn test_tracker_failure_names() {
        for failure in [
            TrackerFailure::Internal,
            TrackerFailure::Camera,
            TrackerFailure::Sensors,
            TrackerFailure::License,
        ] {
            assert_eq!(TrackerFailure::from_name(failure.name()), Some(failure));
        }
        assert_eq!(TrackerFailure::from_name("NETWORK_ERROR"), None);
        assert_eq!(TrackerFailure::Camera.title(), "Camera Error");
    }

    #[test]
    fn test_tracker_failure_deserializes_from_sdk_name() {
        let failure: TrackerFailure = serde_json::from_str("\"SENSORS_ERROR\"").unwrap();
        assert_eq!(failure, TrackerFailure::Sensors);
    }

    #[test]
    fn test_replay_tracker_reports_latest_parameters() {
        let mut tracker = ReplayTracker::default();
        assert_eq!(tracker.camera_parameters(), CameraParameters::default());
        tracker.set_camera_parameters(CameraParameters::new(45., 0.75));
        assert_eq!(tracker.camera_parameters().aspect, 0.75);
    }
}
