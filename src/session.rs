use indexmap::IndexMap;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::{
    bridge_config::{BridgeConfig, InvalidPosePolicy},
    error::{BridgeError, BridgeResult},
    events::{EventKind, EventQueue, SceneUpdate, TrackerEvent},
    systems::{
        model_visibility::{ModelVisibility, VisibilityChange},
        pose_transform::transform_pose,
        projection::Projection,
        RenderCamera, Systems,
    },
    tracking::{Pose, Tracker, TrackerFailure},
};

/// Counters reported when a session is torn down
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub poses_applied: u64,
    pub poses_dropped: u64,
    pub frames_rendered: u64,
    pub resizes: u64,
    pub events_handled: IndexMap<EventKind, u64>,
}

/// Owns the render camera and scene state for one tracking session. All
/// mutation goes through [`Session::handle_event`], one event at a time.
pub struct Session {
    config: BridgeConfig,
    systems: Systems,
    failure: Option<TrackerFailure>,
    summary: SessionSummary,
}

impl Session {
    pub fn init(config: BridgeConfig, tracker: &impl Tracker) -> BridgeResult<Session> {
        if !config.clip_planes_valid() {
            return Err(BridgeError::InvalidClipPlanes {
                near: config.near_plane,
                far: config.far_plane,
            });
        }
        let systems = Systems::new(&config, tracker.camera_parameters())?;
        info!(
            "Session started; tracking mode {:?}, invalid poses will be {:?}",
            config.tracking_mode, config.invalid_pose_policy
        );
        Ok(Session {
            config,
            systems,
            failure: None,
            summary: SessionSummary::default(),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn render_camera(&self) -> &RenderCamera {
        &self.systems.render_camera
    }

    pub fn model_visibility(&self) -> &ModelVisibility {
        &self.systems.model_visibility
    }

    pub fn failure(&self) -> Option<TrackerFailure> {
        self.failure
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// The static scene settings a renderer applies before the first frame.
    pub fn scene_setup(&self) -> SceneUpdate {
        SceneUpdate::SceneSetup {
            clear_colour: self.config.clear_colour,
            right_handed: self.config.right_handed_scene,
            debug_axes: self.config.show_debug_axes,
        }
    }

    pub fn handle_event(
        &mut self,
        event: TrackerEvent,
        tracker: &impl Tracker,
    ) -> BridgeResult<Vec<SceneUpdate>> {
        *self.summary.events_handled.entry(event.kind()).or_insert(0) += 1;

        match event {
            TrackerEvent::Pose(pose) => self.handle_pose(&pose),
            TrackerEvent::Resize => self.handle_resize(tracker),
            TrackerEvent::Detected(target_id) => Ok(self.handle_detected(&target_id)),
            TrackerEvent::Lost(target_id) => Ok(self.handle_lost(&target_id)),
            TrackerEvent::AssetLoaded => {
                info!("Asset \"{}\" loaded", self.config.asset_path);
                let change = self.systems.model_visibility.asset_loaded();
                Ok(self.visibility_updates(change))
            }
            TrackerEvent::Frame => {
                self.summary.frames_rendered += 1;
                Ok(vec![SceneUpdate::RenderFrame])
            }
            TrackerEvent::Failed(failure) => {
                error!("{}: {}", failure, failure.message());
                self.failure = Some(failure);
                Ok(vec![SceneUpdate::ErrorScreen {
                    title: String::from(failure.title()),
                    message: String::from(failure.message()),
                }])
            }
        }
    }

    /// Handle queued events in order until the queue is empty or an event
    /// fails; events after a failing one stay queued.
    pub fn handle_queued(
        &mut self,
        queue: &mut EventQueue,
        tracker: &impl Tracker,
    ) -> BridgeResult<Vec<SceneUpdate>> {
        let mut updates = Vec::new();
        while let Some(event) = queue.poll() {
            updates.extend(self.handle_event(event, tracker)?);
        }
        Ok(updates)
    }

    pub fn teardown(self) -> SessionSummary {
        info!(
            "Session ended; {} poses applied, {} dropped, {} frames, {} resizes",
            self.summary.poses_applied,
            self.summary.poses_dropped,
            self.summary.frames_rendered,
            self.summary.resizes
        );
        self.summary
    }

    fn handle_pose(&mut self, pose: &Pose) -> BridgeResult<Vec<SceneUpdate>> {
        if let Some(failure) = self.failure {
            self.summary.poses_dropped += 1;
            return match self.config.invalid_pose_policy {
                InvalidPosePolicy::Drop => {
                    debug!("Ignoring pose; tracker has failed ({})", failure);
                    Ok(Vec::new())
                }
                InvalidPosePolicy::Escalate => Err(BridgeError::TrackerFailed(failure)),
            };
        }

        match transform_pose(pose) {
            Ok(transform) => {
                self.systems.render_camera.apply_transform(transform);
                self.summary.poses_applied += 1;
                Ok(vec![SceneUpdate::CameraMoved(transform)])
            }
            Err(e) => {
                self.summary.poses_dropped += 1;
                match self.config.invalid_pose_policy {
                    InvalidPosePolicy::Drop => {
                        warn!("Dropping pose: {}", e);
                        Ok(Vec::new())
                    }
                    InvalidPosePolicy::Escalate => Err(e),
                }
            }
        }
    }

    fn handle_resize(&mut self, tracker: &impl Tracker) -> BridgeResult<Vec<SceneUpdate>> {
        let camera_parameters = tracker.camera_parameters();
        let projection = Projection::from_camera_parameters(
            camera_parameters,
            self.config.near_plane,
            self.config.far_plane,
        )?;
        self.systems.render_camera.freeze_projection(projection);
        self.summary.resizes += 1;
        debug!(
            "Resized; new projection for fov {} aspect {}",
            camera_parameters.fov, camera_parameters.aspect
        );
        Ok(vec![SceneUpdate::ProjectionChanged(projection)])
    }

    fn handle_detected(&mut self, target_id: &str) -> Vec<SceneUpdate> {
        info!("Detected image: {}", target_id);
        let had_targets = self.systems.model_visibility.any_target_detected();
        let change = self.systems.model_visibility.target_detected(target_id);

        let mut updates = self.visibility_updates(change);
        if self.config.sync_background_with_feed && !had_targets {
            updates.push(SceneUpdate::BackgroundFeed { enabled: true });
        }
        updates
    }

    fn handle_lost(&mut self, target_id: &str) -> Vec<SceneUpdate> {
        info!("Lost image: {}", target_id);
        let had_targets = self.systems.model_visibility.any_target_detected();
        let change = self.systems.model_visibility.target_lost(target_id);

        let mut updates = self.visibility_updates(change);
        if self.config.sync_background_with_feed
            && had_targets
            && !self.systems.model_visibility.any_target_detected()
        {
            updates.push(SceneUpdate::BackgroundFeed { enabled: false });
        }
        updates
    }

    fn visibility_updates(&self, change: Option<VisibilityChange>) -> Vec<SceneUpdate> {
        let asset_path = String::from(self.systems.model_visibility.asset_path());
        match change {
            Some(VisibilityChange::Shown) => vec![SceneUpdate::ModelShown { asset_path }],
            Some(VisibilityChange::Hidden) => vec![SceneUpdate::ModelHidden { asset_path }],
            None => Vec::new(),
        }
    }
}
