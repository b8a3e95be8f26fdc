use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    systems::{pose_transform::CameraTransform, projection::Projection},
    tracking::{Pose, TrackerFailure},
};

/// Everything the tracker can tell the bridge, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A new camera pose for the current tracked frame
    Pose(Pose),
    /// The viewport changed size or orientation
    Resize,
    /// An image target came into view
    Detected(String),
    /// An image target went out of view
    Lost(String),
    /// The scene asset finished loading
    AssetLoaded,
    /// Time to draw
    Frame,
    Failed(TrackerFailure),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Pose,
    Resize,
    Detected,
    Lost,
    AssetLoaded,
    Frame,
    Failed,
}

impl TrackerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TrackerEvent::Pose(_) => EventKind::Pose,
            TrackerEvent::Resize => EventKind::Resize,
            TrackerEvent::Detected(_) => EventKind::Detected,
            TrackerEvent::Lost(_) => EventKind::Lost,
            TrackerEvent::AssetLoaded => EventKind::AssetLoaded,
            TrackerEvent::Frame => EventKind::Frame,
            TrackerEvent::Failed(_) => EventKind::Failed,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Pose => "pose",
            EventKind::Resize => "resize",
            EventKind::Detected => "detected",
            EventKind::Lost => "lost",
            EventKind::AssetLoaded => "assetLoaded",
            EventKind::Frame => "frame",
            EventKind::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// FIFO of tracker events for a host loop to poll. Events come out in the
/// order they were pushed.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<TrackerEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            events: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: TrackerEvent) {
        self.events.push_back(event);
    }

    pub fn poll(&mut self) -> Option<TrackerEvent> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = TrackerEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// What the renderer has to do as a result of an event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SceneUpdate {
    /// Static scene settings, sent once before anything else.
    #[serde(rename_all = "camelCase")]
    SceneSetup {
        clear_colour: [f32; 4],
        right_handed: bool,
        debug_axes: bool,
    },
    CameraMoved(CameraTransform),
    ProjectionChanged(Projection),
    #[serde(rename_all = "camelCase")]
    ModelShown { asset_path: String },
    #[serde(rename_all = "camelCase")]
    ModelHidden { asset_path: String },
    BackgroundFeed { enabled: bool },
    RenderFrame,
    ErrorScreen { title: String, message: String },
}
