pub mod model_visibility;
pub mod pose_transform;
pub mod projection;

use log::{debug, info};
use model_visibility::ModelVisibility;
use pose_transform::CameraTransform;
use projection::Projection;
use serde::Serialize;

use crate::{bridge_config::BridgeConfig, error::BridgeResult, tracking::CameraParameters};

/// The render camera's state. Position/orientation are overwritten on every
/// applied pose; the projection only on init and resize.
#[derive(Serialize, Debug, Clone)]
pub struct RenderCamera {
    transform: CameraTransform,
    projection: Projection,
}

impl RenderCamera {
    pub fn new(projection: Projection) -> Self {
        RenderCamera {
            transform: CameraTransform::identity(),
            projection,
        }
    }

    pub fn transform(&self) -> &CameraTransform {
        &self.transform
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn apply_transform(&mut self, transform: CameraTransform) {
        self.transform = transform;
    }

    pub fn freeze_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }
}

pub struct Systems {
    pub render_camera: RenderCamera,
    pub model_visibility: ModelVisibility,
}

impl Systems {
    pub fn new(config: &BridgeConfig, camera_parameters: CameraParameters) -> BridgeResult<Systems> {
        let projection = Projection::from_camera_parameters(
            camera_parameters,
            config.near_plane,
            config.far_plane,
        )?;
        info!(
            "Render camera at origin; fov {} aspect {}",
            camera_parameters.fov, camera_parameters.aspect
        );

        let model_visibility = ModelVisibility::new(&config.asset_path);
        debug!("Waiting for asset \"{}\"", model_visibility.asset_path());

        Ok(Systems {
            render_camera: RenderCamera::new(projection),
            model_visibility,
        })
    }
}
