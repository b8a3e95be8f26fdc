use nalgebra::{Matrix3, Matrix4, UnitQuaternion};

/// Per-element signs that reconcile the tracker's right-handed layout with
/// the renderer's: groups 0 (X basis) and 2 (Z basis) are negated, group 1
/// (Y basis) and group 3 (translation) are kept.
pub const HANDEDNESS_FLIP: [f32; 16] = [
    -1., -1., -1., -1., //
    1., 1., 1., 1., //
    -1., -1., -1., -1., //
    1., 1., 1., 1.,
];

/// Scales below this are treated as a collapsed basis vector
pub const MIN_AXIS_SCALE: f32 = 1e-6;

/// Apply [`HANDEDNESS_FLIP`]. Applying it twice returns the input.
pub fn flip_handedness(values: &[f32; 16]) -> [f32; 16] {
    let mut flipped = *values;
    for (v, sign) in flipped.iter_mut().zip(HANDEDNESS_FLIP.iter()) {
        *v *= sign;
    }
    flipped
}

/// Load 16 values in tracker order. Each group of four becomes one column,
/// so group 3 lands in the translation column.
pub fn matrix_from_values(values: &[f32; 16]) -> Matrix4<f32> {
    Matrix4::from_column_slice(values)
}

pub fn values_from_matrix(matrix: &Matrix4<f32>) -> [f32; 16] {
    let mut values = [0.; 16];
    values.copy_from_slice(matrix.as_slice());
    values
}

/// Angle (radians) between two orientations, ignoring quaternion sign
pub fn orientation_distance(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>) -> f32 {
    a.angle_to(b)
}

/// Upper-left 3x3 block of a homogeneous transform
pub fn basis_block(matrix: &Matrix4<f32>) -> Matrix3<f32> {
    matrix.fixed_slice::<3, 3>(0, 0).into_owned()
}
