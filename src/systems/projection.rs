use log::debug;
use nalgebra::{Matrix4, Perspective3};
use serde::{Deserialize, Serialize};

use crate::{
    error::{BridgeError, BridgeResult},
    tracking::CameraParameters,
};

pub const DEFAULT_NEAR_PLANE: f32 = 0.01;
pub const DEFAULT_FAR_PLANE: f32 = 1000.;

/// A frozen perspective projection and the inputs it was built from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub matrix: Matrix4<f32>,
    pub camera_parameters: CameraParameters,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    /// Right-handed perspective projection (clip-space z in [-1, 1]), with
    /// `fov` taken as the vertical field of view in degrees.
    pub fn from_camera_parameters(
        camera_parameters: CameraParameters,
        near: f32,
        far: f32,
    ) -> BridgeResult<Projection> {
        if !camera_parameters.is_valid() {
            let CameraParameters { fov, aspect } = camera_parameters;
            return Err(BridgeError::InvalidCameraParameters { fov, aspect });
        }
        if !(near.is_finite() && far.is_finite() && near > 0. && far > near) {
            return Err(BridgeError::InvalidClipPlanes { near, far });
        }
        let perspective = Perspective3::new(
            camera_parameters.aspect,
            camera_parameters.fov.to_radians(),
            near,
            far,
        );
        debug!(
            "Projection from fov={} aspect={} near={} far={}",
            camera_parameters.fov, camera_parameters.aspect, near, far
        );
        Ok(Projection {
            matrix: perspective.to_homogeneous(),
            camera_parameters,
            near,
            far,
        })
    }

    /// Vertical field of view in degrees, read back from the matrix
    pub fn vertical_fov(&self) -> f32 {
        (2. * (1. / self.matrix[(1, 1)]).atan()).to_degrees()
    }

    /// Horizontal field of view in degrees, read back from the matrix
    pub fn horizontal_fov(&self) -> f32 {
        (2. * (1. / self.matrix[(0, 0)]).atan()).to_degrees()
    }

    pub fn aspect(&self) -> f32 {
        self.matrix[(1, 1)] / self.matrix[(0, 0)]
    }

    /// Near and far clip distances, read back from the matrix
    pub fn clip_planes(&self) -> (f32, f32) {
        let a = self.matrix[(2, 2)];
        let b = self.matrix[(2, 3)];
        (b / (a - 1.), b / (a + 1.))
    }

    /// Column-major values, the layout renderers usually upload
    pub fn values(&self) -> &[f32] {
        self.matrix.as_slice()
    }
}
