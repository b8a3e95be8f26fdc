use nalgebra::{Isometry3, Matrix3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    error::{BridgeError, BridgeResult},
    geometry_utils::{
        basis_block, flip_handedness, matrix_from_values, values_from_matrix, MIN_AXIS_SCALE,
    },
    tracking::Pose,
};

/// Normalized determinants smaller than this mean the basis has collapsed
/// onto a plane
const MIN_BASIS_DETERMINANT: f32 = 1e-6;

/// Where the render camera sits and which way it faces, in the renderer's
/// own handedness.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl CameraTransform {
    pub fn new(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        CameraTransform {
            position,
            orientation,
        }
    }

    pub fn identity() -> Self {
        CameraTransform::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    pub fn to_homogeneous(&self) -> Matrix4<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation).to_homogeneous()
    }
}

impl Default for CameraTransform {
    fn default() -> Self {
        CameraTransform::identity()
    }
}

impl Pose {
    /// Encode a renderer camera transform in the tracker's 16-value layout.
    /// This is the inverse of [`transform_pose`] for rigid transforms.
    pub fn from_camera_transform(transform: &CameraTransform) -> Pose {
        let values = values_from_matrix(&transform.to_homogeneous());
        Pose(flip_handedness(&values))
    }
}

/// Convert a tracker pose into the renderer's camera position + orientation.
///
/// The X and Z basis vectors are negated (see
/// [`HANDEDNESS_FLIP`](crate::geometry_utils::HANDEDNESS_FLIP)), then the
/// matrix is decomposed into scale, rotation and translation. Scale is
/// discarded. Poses that cannot be decomposed fail with
/// [`BridgeError::InvalidPose`] instead of producing NaN.
pub fn transform_pose(pose: &Pose) -> BridgeResult<CameraTransform> {
    if !pose.is_finite() {
        return Err(BridgeError::invalid_pose("pose contains non-finite values"));
    }

    let matrix = matrix_from_values(&flip_handedness(pose.values()));
    let basis = basis_block(&matrix);

    let mut scale = Vector3::new(
        basis.column(0).norm(),
        basis.column(1).norm(),
        basis.column(2).norm(),
    );
    if scale.iter().any(|s| !s.is_finite() || *s < MIN_AXIS_SCALE) {
        return Err(BridgeError::invalid_pose(format!(
            "basis vector has collapsed (scale {:?})",
            scale.as_slice()
        )));
    }

    // Determinant of the unit-length basis, so scale alone never fails a pose
    let determinant = basis.determinant() / (scale.x * scale.y * scale.z);
    if !determinant.is_finite() || determinant.abs() < MIN_BASIS_DETERMINANT {
        return Err(BridgeError::invalid_pose(format!(
            "rotation block is degenerate (normalized determinant {})",
            determinant
        )));
    }

    // A mirrored basis is folded into the Y scale so the rotation stays proper
    if determinant < 0. {
        scale.y = -scale.y;
    }

    let rotation_block = Matrix3::from_columns(&[
        basis.column(0) / scale.x,
        basis.column(1) / scale.y,
        basis.column(2) / scale.z,
    ]);
    let rotation = Rotation3::from_matrix_unchecked(rotation_block);
    let orientation =
        UnitQuaternion::new_normalize(UnitQuaternion::from_rotation_matrix(&rotation).into_inner());

    let position = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);

    if !orientation.coords.iter().all(|v| v.is_finite()) {
        return Err(BridgeError::invalid_pose("orientation could not be extracted"));
    }

    Ok(CameraTransform::new(position, orientation))
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::geometry_utils::orientation_distance;

    const EPSILON: f32 = 1e-5;

    fn assert_orientation_eq(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>) {
        let distance = orientation_distance(a, b);
        assert!(
            distance < 1e-3,
            "orientations differ by {} rad: {:?} vs {:?}",
            distance,
            a,
            b
        );
    }

    fn is_unit(q: &UnitQuaternion<f32>) -> bool {
        (q.coords.norm() - 1.).abs() < EPSILON
    }

    #[test]
    fn test_identity_encoding_gives_origin_and_identity() {
        let pose = Pose::from_camera_transform(&CameraTransform::identity());
        let transform = transform_pose(&pose).unwrap();
        assert_eq!(transform.position, Vector3::zeros());
        assert_orientation_eq(&transform.orientation, &UnitQuaternion::identity());
        assert!(is_unit(&transform.orientation));
    }

    #[test]
    fn test_raw_identity_array_turns_half_way_around_y() {
        // The tracker camera looks down -Z; the renderer's looks down +Z
        let mut values = [0.; 16];
        values[0] = 1.;
        values[5] = 1.;
        values[10] = 1.;
        values[15] = 1.;
        let transform = transform_pose(&Pose::new(values)).unwrap();
        let half_turn = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI);
        assert_orientation_eq(&transform.orientation, &half_turn);
        assert_eq!(transform.position, Vector3::zeros());
    }

    #[test]
    fn test_pure_translation_is_passed_through() {
        let translation = Vector3::new(0.25, -1.5, 3.75);
        let pose = Pose::from_camera_transform(&CameraTransform::new(
            translation,
            UnitQuaternion::identity(),
        ));
        let transform = transform_pose(&pose).unwrap();
        assert_eq!(transform.position, translation);
        assert_orientation_eq(&transform.orientation, &UnitQuaternion::identity());
    }

    #[test]
    fn test_translation_is_never_flipped() {
        let mut values = [0.; 16];
        values[0] = 1.;
        values[5] = 1.;
        values[10] = 1.;
        values[12] = 4.;
        values[13] = -5.;
        values[14] = 6.;
        values[15] = 1.;
        let transform = transform_pose(&Pose::new(values)).unwrap();
        assert_eq!(transform.position, Vector3::new(4., -5., 6.));
    }

    #[test]
    fn test_half_turn_about_y_survives_the_flip() {
        let half_turn = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI);
        let pose =
            Pose::from_camera_transform(&CameraTransform::new(Vector3::zeros(), half_turn));
        let transform = transform_pose(&pose).unwrap();
        assert_orientation_eq(&transform.orientation, &half_turn);
        assert!(is_unit(&transform.orientation));
    }

    #[test]
    fn test_general_rotation_is_recovered() {
        let orientation = UnitQuaternion::from_euler_angles(0.3, -1.1, FRAC_PI_2 * 0.5);
        let position = Vector3::new(-0.2, 0.1, 2.);
        let pose = Pose::from_camera_transform(&CameraTransform::new(position, orientation));
        let transform = transform_pose(&pose).unwrap();
        assert_orientation_eq(&transform.orientation, &orientation);
        assert!((transform.position - position).norm() < EPSILON);
    }

    #[test]
    fn test_uniform_scale_is_discarded() {
        let orientation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.7);
        let mut values = Pose::from_camera_transform(&CameraTransform::new(
            Vector3::new(1., 2., 3.),
            orientation,
        ))
        .0;
        for v in values.iter_mut().take(11) {
            *v *= 2.5;
        }
        let transform = transform_pose(&Pose::new(values)).unwrap();
        assert_orientation_eq(&transform.orientation, &orientation);
        assert_eq!(transform.position, Vector3::new(1., 2., 3.));
    }

    #[test]
    fn test_small_uniform_scale_is_accepted() {
        let mut values = Pose::from_camera_transform(&CameraTransform::new(
            Vector3::new(1., 2., 3.),
            UnitQuaternion::identity(),
        ))
        .0;
        for v in values.iter_mut().take(11) {
            *v *= 5e-4;
        }
        let transform = transform_pose(&Pose::new(values)).unwrap();
        assert_orientation_eq(&transform.orientation, &UnitQuaternion::identity());
        assert_eq!(transform.position, Vector3::new(1., 2., 3.));
    }

    #[test]
    fn test_coplanar_basis_is_invalid() {
        let mut values = [0.; 16];
        values[0] = 1.;
        values[5] = 1.;
        // Z basis parallel to X
        values[8] = 1.;
        values[15] = 1.;
        let result = transform_pose(&Pose::new(values));
        assert!(matches!(result, Err(BridgeError::InvalidPose { .. })));
    }

    #[test]
    fn test_mirrored_basis_gives_proper_orientation() {
        let orientation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.4);
        let mut values = Pose::from_camera_transform(&CameraTransform::new(
            Vector3::new(-1., 0.5, 2.),
            orientation,
        ))
        .0;
        // Reflect the Y basis
        for v in values.iter_mut().skip(4).take(3) {
            *v = -*v;
        }
        let transform = transform_pose(&Pose::new(values)).unwrap();
        assert!(is_unit(&transform.orientation));
        assert!(transform.orientation.to_rotation_matrix().matrix().determinant() > 0.);
        assert_orientation_eq(&transform.orientation, &orientation);
        assert_eq!(transform.position, Vector3::new(-1., 0.5, 2.));
    }

    #[test]
    fn test_same_input_same_output() {
        let pose = Pose::new([
            0.8, 0.1, -0.5, 0., 0., 0.98, 0.2, 0., 0.6, -0.1, 0.8, 0., 0.3, 1.2, -2., 1.,
        ]);
        let first = transform_pose(&pose).unwrap();
        let second = transform_pose(&pose).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_zero_pose_is_invalid() {
        let result = transform_pose(&Pose::new([0.; 16]));
        assert!(matches!(result, Err(BridgeError::InvalidPose { .. })));
    }

    #[test]
    fn test_collapsed_basis_is_invalid() {
        let mut values = [0.; 16];
        values[0] = 1.;
        values[5] = 1.;
        // Z basis left at zero
        values[15] = 1.;
        let result = transform_pose(&Pose::new(values));
        assert!(matches!(result, Err(BridgeError::InvalidPose { .. })));
    }

    #[test]
    fn test_non_finite_pose_is_invalid() {
        let mut values = Pose::from_camera_transform(&CameraTransform::identity()).0;
        values[13] = f32::NAN;
        let result = transform_pose(&Pose::new(values));
        assert!(matches!(result, Err(BridgeError::InvalidPose { .. })));
    }
}
