use anyhow::{Result, anyhow};
use log::warn;
use serde::Deserialize;

use ar_pose_bridge::{
    events::TrackerEvent,
    tracking::{CameraParameters, Pose, ReplayTracker, TrackerFailure},
};

/// One line of a recorded tracker session
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReplayRecord {
    Pose { pose: Vec<f32> },
    Resize { fov: f32, aspect: f32 },
    Detected { id: String },
    Lost { id: String },
    AssetLoaded,
    Frame,
    Error { name: String },
}

impl ReplayRecord {
    /// Resize records carry the camera parameters the tracker would report,
    /// so they update the replay tracker before becoming an event.
    pub fn into_event(self, tracker: &mut ReplayTracker) -> Result<TrackerEvent> {
        let event = match self {
            ReplayRecord::Pose { pose } => {
                let pose = Pose::from_slice(&pose)
                    .ok_or_else(|| anyhow!("pose must have 16 values, got {}", pose.len()))?;
                TrackerEvent::Pose(pose)
            }
            ReplayRecord::Resize { fov, aspect } => {
                tracker.set_camera_parameters(CameraParameters::new(fov, aspect));
                TrackerEvent::Resize
            }
            ReplayRecord::Detected { id } => TrackerEvent::Detected(id),
            ReplayRecord::Lost { id } => TrackerEvent::Lost(id),
            ReplayRecord::AssetLoaded => TrackerEvent::AssetLoaded,
            ReplayRecord::Frame => TrackerEvent::Frame,
            ReplayRecord::Error { name } => {
                TrackerEvent::Failed(TrackerFailure::from_name(&name).unwrap_or_else(|| {
                    warn!("Unknown tracker error \"{}\"; treating as internal", name);
                    TrackerFailure::Internal
                }))
            }
        };
        Ok(event)
    }
}

/// Parse one recording line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ReplayRecord>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let record = serde_json::from_str::<ReplayRecord>(line)
        .map_err(|e| anyhow!("Failed to parse event \"{}\": {}", line, e))?;
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use ar_pose_bridge::tracking::Tracker;

    use super::*;

    #[test]
    fn test_resize_updates_tracker() {
        let mut tracker = ReplayTracker::default();
        let record = parse_line(r#"{"type":"resize","fov":50,"aspect":0.5}"#)
            .unwrap()
            .unwrap();
        assert_eq!(record.into_event(&mut tracker).unwrap(), TrackerEvent::Resize);
        assert_eq!(tracker.camera_parameters(), CameraParameters::new(50., 0.5));
    }

    #[test]
    fn test_pose_needs_sixteen_values() {
        let mut tracker = ReplayTracker::default();
        let record = parse_line(r#"{"type":"pose","pose":[1,0,0]}"#)
            .unwrap()
            .unwrap();
        assert!(record.into_event(&mut tracker).is_err());
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("# recorded 2024-05-01").unwrap().is_none());
    }

    #[test]
    fn test_error_names_map_to_failures() {
        let mut tracker = ReplayTracker::default();
        let record = parse_line(r#"{"type":"error","name":"LICENSE_ERROR"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            record.into_event(&mut tracker).unwrap(),
            TrackerEvent::Failed(TrackerFailure::License)
        );
        let record = parse_line(r#"{"type":"error","name":"WAT"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            record.into_event(&mut tracker).unwrap(),
            TrackerEvent::Failed(TrackerFailure::Internal)
        );
    }

    #[test]
    fn test_target_events() {
        let mut tracker = ReplayTracker::default();
        let record = parse_line(r#"{"type":"detected","id":"poster"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            record.into_event(&mut tracker).unwrap(),
            TrackerEvent::Detected(String::from("poster"))
        );
        let record = parse_line(r#"{"type":"assetLoaded"}"#).unwrap().unwrap();
        assert_eq!(
            record.into_event(&mut tracker).unwrap(),
            TrackerEvent::AssetLoaded
        );
    }
}
