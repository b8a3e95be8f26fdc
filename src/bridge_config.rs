use std::fs;

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::systems::projection::{DEFAULT_FAR_PLANE, DEFAULT_NEAR_PLANE};

/// What the tracker is asked to follow
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TrackingMode {
    Image,
}

/// What to do with a pose that cannot be decomposed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InvalidPosePolicy {
    /// Log, count, and keep the previous camera transform
    Drop,
    /// Hand the error back to the caller
    Escalate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    pub tracking_mode: TrackingMode,

    /// The single 3D asset shown while a target is detected
    pub asset_path: String,

    // -------- PROJECTION SETTINGS
    /// Near clip plane distance, in tracker units
    pub near_plane: f32,

    /// Far clip plane distance, in tracker units
    pub far_plane: f32,

    // -------- POSE SETTINGS
    pub invalid_pose_policy: InvalidPosePolicy,

    // -------- SCENE SETTINGS
    /// Show the camera feed behind the scene while a target is detected
    pub sync_background_with_feed: bool,

    /// RGBA; transparent by default so the camera feed shows through
    pub clear_colour: [f32; 4],

    /// The tracker is right-handed; the scene is told so
    pub right_handed_scene: bool,

    pub show_debug_axes: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            tracking_mode: TrackingMode::Image,
            asset_path: String::from("frame.glb"),
            near_plane: DEFAULT_NEAR_PLANE,
            far_plane: DEFAULT_FAR_PLANE,
            invalid_pose_policy: InvalidPosePolicy::Drop,
            sync_background_with_feed: true,
            clear_colour: [0., 0., 0., 0.],
            right_handed_scene: true,
            show_debug_axes: false,
        }
    }
}

impl BridgeConfig {
    pub fn clip_planes_valid(&self) -> bool {
        self.near_plane.is_finite()
            && self.far_plane.is_finite()
            && self.near_plane > 0.
            && self.far_plane > self.near_plane
    }

    pub fn validate(&self) -> Result<()> {
        if !self.clip_planes_valid() {
            return Err(anyhow!(
                "Clip planes must satisfy 0 < near < far; got near={} far={}",
                self.near_plane,
                self.far_plane
            ));
        }
        if self.asset_path.is_empty() {
            return Err(anyhow!("No asset path configured"));
        }
        Ok(())
    }

    pub fn write_config_to_file(&self, config_file_path: &str) -> Result<()> {
        debug!("Current state of config: {:?}", self);
        let text = serde_json::to_string_pretty(self)?;
        fs::write(config_file_path, text)
            .with_context(|| format!("Error writing config to file {}", config_file_path))?;
        info!("Wrote config to file: {:?}", config_file_path);
        Ok(())
    }
}

pub fn parse_config(text: &str) -> Result<BridgeConfig> {
    let config = serde_json::from_str::<BridgeConfig>(text)
        .map_err(|e| anyhow!("Failed to parse config data: {}", e))?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_from_file(config_file_path: &str) -> Result<BridgeConfig> {
    match fs::read_to_string(config_file_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Bridge config file not found at {}; using defaults",
                config_file_path
            );
            Ok(BridgeConfig::default())
        }
        Err(e) => Err(anyhow!(
            "Failed to load bridge config from {}: {}",
            config_file_path,
            e
        )),
        Ok(s) => {
            info!("Loaded bridge config OK from \"{}\"", config_file_path);
            let loaded_config = parse_config(&s)?;
            debug!("Config parsed data from file: {:?}", &loaded_config);
            Ok(loaded_config)
        }
    }
}
