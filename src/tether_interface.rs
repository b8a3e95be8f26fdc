use anyhow::{Result, anyhow};
use log::{debug, warn};
use tether_agent::{PlugDefinition, PlugOptionsBuilder, TetherAgent};

use crate::{
    events::SceneUpdate,
    tracking::{CameraParameters, Pose, TrackerFailure},
};

pub struct Outputs {
    pub scene_setup_output: PlugDefinition,
    pub camera_output: PlugDefinition,
    pub projection_output: PlugDefinition,
    pub visibility_output: PlugDefinition,
    pub background_output: PlugDefinition,
    pub error_output: PlugDefinition,
}

impl Outputs {
    pub fn new(tether_agent: &TetherAgent) -> Result<Outputs> {
        let scene_setup_output = PlugOptionsBuilder::create_output("sceneSetup")
            .qos(Some(2))
            .retain(Some(true))
            .build(tether_agent)?;

        // Sent every tracked frame; a late one is useless
        let camera_output = PlugOptionsBuilder::create_output("cameraTransform")
            .qos(Some(0))
            .build(tether_agent)?;

        let projection_output = PlugOptionsBuilder::create_output("projection")
            .qos(Some(2))
            .retain(Some(true))
            .build(tether_agent)?;
        let visibility_output = PlugOptionsBuilder::create_output("modelVisibility")
            .qos(Some(2))
            .retain(Some(true))
            .build(tether_agent)?;
        let background_output = PlugOptionsBuilder::create_output("backgroundFeed")
            .qos(Some(2))
            .build(tether_agent)?;
        let error_output = PlugOptionsBuilder::create_output("errorScreen")
            .qos(Some(2))
            .retain(Some(true))
            .build(tether_agent)?;

        Ok(Outputs {
            scene_setup_output,
            camera_output,
            projection_output,
            visibility_output,
            background_output,
            error_output,
        })
    }
}

pub struct Inputs {
    pub pose_input: PlugDefinition,
    pub resize_input: PlugDefinition,
    pub detected_input: PlugDefinition,
    pub lost_input: PlugDefinition,
    pub asset_loaded_input: PlugDefinition,
    pub frame_input: PlugDefinition,
    pub error_input: PlugDefinition,
}

impl Inputs {
    pub fn new(tether_agent: &TetherAgent) -> Result<Inputs> {
        let pose_input = PlugOptionsBuilder::create_input("pose")
            .qos(Some(0))
            .build(tether_agent)?;
        let frame_input = PlugOptionsBuilder::create_input("frame")
            .qos(Some(0))
            .build(tether_agent)?;
        let resize_input = PlugOptionsBuilder::create_input("resize")
            .qos(Some(2))
            .build(tether_agent)?;
        let detected_input = PlugOptionsBuilder::create_input("detected")
            .qos(Some(2))
            .build(tether_agent)?;
        let lost_input = PlugOptionsBuilder::create_input("lost")
            .qos(Some(2))
            .build(tether_agent)?;
        let asset_loaded_input = PlugOptionsBuilder::create_input("assetLoaded")
            .qos(Some(2))
            .build(tether_agent)?;
        let error_input = PlugOptionsBuilder::create_input("trackerError")
            .qos(Some(2))
            .build(tether_agent)?;

        Ok(Inputs {
            pose_input,
            resize_input,
            detected_input,
            lost_input,
            asset_loaded_input,
            frame_input,
            error_input,
        })
    }
}

pub fn decode_pose(payload: &[u8]) -> Result<Pose> {
    let values: Vec<f32> = rmp_serde::from_slice(payload)?;
    Pose::from_slice(&values)
        .ok_or_else(|| anyhow!("pose must have 16 values, got {}", values.len()))
}

pub fn decode_camera_parameters(payload: &[u8]) -> Result<CameraParameters> {
    Ok(rmp_serde::from_slice::<CameraParameters>(payload)?)
}

pub fn decode_target_id(payload: &[u8]) -> Result<String> {
    Ok(rmp_serde::from_slice::<String>(payload)?)
}

pub fn decode_failure(payload: &[u8]) -> Result<TrackerFailure> {
    let name: String = rmp_serde::from_slice(payload)?;
    Ok(TrackerFailure::from_name(&name).unwrap_or_else(|| {
        warn!("Unknown tracker error \"{}\"; treating as internal", name);
        TrackerFailure::Internal
    }))
}

pub fn publish_update(
    tether_agent: &TetherAgent,
    outputs: &Outputs,
    update: &SceneUpdate,
) -> Result<()> {
    match update {
        SceneUpdate::SceneSetup { .. } => {
            tether_agent.encode_and_publish(&outputs.scene_setup_output, update)
        }
        SceneUpdate::CameraMoved(transform) => {
            tether_agent.encode_and_publish(&outputs.camera_output, transform)
        }
        SceneUpdate::ProjectionChanged(projection) => {
            tether_agent.encode_and_publish(&outputs.projection_output, projection)
        }
        SceneUpdate::ModelShown { .. } => {
            tether_agent.encode_and_publish(&outputs.visibility_output, true)
        }
        SceneUpdate::ModelHidden { .. } => {
            tether_agent.encode_and_publish(&outputs.visibility_output, false)
        }
        SceneUpdate::BackgroundFeed { enabled } => {
            tether_agent.encode_and_publish(&outputs.background_output, enabled)
        }
        SceneUpdate::ErrorScreen { .. } => {
            tether_agent.encode_and_publish(&outputs.error_output, update)
        }
        SceneUpdate::RenderFrame => {
            // The renderer keeps its own frame loop
            debug!("Frame");
            Ok(())
        }
    }
}
