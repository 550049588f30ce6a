//! Splitting a world transform into translation, rotation and scale.

use crate::error::DecompositionError;
use crate::matrix::Matrix4;
use glam::{DMat3, DQuat, DVec3};

/// Default tolerance for zero-length basis columns and the affine check.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Translation, rotation and scale extracted from a [`Matrix4`].
///
/// Recomposing with [`Decomposition::to_matrix`] applies scale first, then
/// rotation, then translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposition {
    /// The matrix's translation column.
    pub translation: DVec3,
    /// Unit rotation quaternion.
    pub rotation: DQuat,
    /// Per-axis scale. Mirrored matrices carry the sign on X.
    pub scale: DVec3,
}

impl Decomposition {
    /// Recomposes the matrix `T * R * S`.
    pub fn to_matrix(&self) -> Matrix4 {
        Matrix4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// The rotation as a 3x3 matrix.
    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.rotation)
    }

    /// The rotation as XYZ Euler angles in degrees (X applied first).
    pub fn euler_degrees(&self) -> DVec3 {
        // glam's ZYX is Rz * Ry * Rx, which applies X first.
        let (z, y, x) = self.rotation.to_euler(glam::EulerRot::ZYX);
        DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    /// Compares within `epsilon`, treating `q` and `-q` as the same rotation.
    pub fn abs_diff_eq(&self, other: &Decomposition, epsilon: f64) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
            && (self.rotation.dot(other.rotation).abs() - 1.0).abs() <= epsilon
    }
}

/// Decomposes `matrix` with [`DEFAULT_EPSILON`].
///
/// # Example
///
/// ```
/// use worldxform::{decompose, Matrix4, DQuat, DVec3};
///
/// let rotation = DQuat::from_rotation_z(0.5);
/// let m = Matrix4::from_scale_rotation_translation(
///     DVec3::new(1.0, 2.0, 3.0),
///     rotation,
///     DVec3::new(10.0, 0.0, -4.0),
/// );
///
/// let parts = decompose(&m).unwrap();
/// assert!(parts.translation.abs_diff_eq(DVec3::new(10.0, 0.0, -4.0), 1e-9));
/// assert!(parts.scale.abs_diff_eq(DVec3::new(1.0, 2.0, 3.0), 1e-9));
/// assert!(parts.rotation.abs_diff_eq(rotation, 1e-9));
/// ```
pub fn decompose(matrix: &Matrix4) -> Result<Decomposition, DecompositionError> {
    decompose_with_epsilon(matrix, DEFAULT_EPSILON)
}

/// Decomposes `matrix`, treating basis columns shorter than `epsilon` as
/// collapsed.
///
/// Fails instead of returning a made-up rotation when the linear block is
/// degenerate or singular. Sheared blocks are accepted: the rotation comes
/// from the orthonormalized basis, so recomposing drops the shear.
pub fn decompose_with_epsilon(
    matrix: &Matrix4,
    epsilon: f64,
) -> Result<Decomposition, DecompositionError> {
    if !matrix.is_finite() {
        return Err(DecompositionError::NonFinite);
    }
    if !matrix.is_affine(epsilon) {
        return Err(DecompositionError::NotAffine);
    }

    let linear = matrix.rotation_matrix();
    let columns = [linear.x_axis, linear.y_axis, linear.z_axis];
    let mut scale = DVec3::ZERO;
    for (axis, column) in columns.iter().enumerate() {
        let length = column.length();
        if length < epsilon {
            return Err(DecompositionError::DegenerateScale { axis });
        }
        scale[axis] = length;
    }

    // Columns of usable length can still be linearly dependent.
    let determinant = linear.determinant();
    if determinant.abs() < epsilon * scale.x * scale.y * scale.z {
        return Err(DecompositionError::Singular);
    }

    // Mirrored: flip X so the remaining basis is right-handed.
    if determinant < 0.0 {
        scale.x = -scale.x;
    }

    let rotation = DQuat::from_mat3(&orthonormal_basis(&columns, scale.x)?).normalize();

    Ok(Decomposition {
        translation: matrix.translation(),
        rotation,
        scale,
    })
}

/// Gram-Schmidt on the basis columns, keeping the X direction. Shear is
/// dropped from the rotation; the scale keeps the raw column lengths.
fn orthonormal_basis(columns: &[DVec3; 3], scale_x: f64) -> Result<DMat3, DecompositionError> {
    let x = columns[0] / scale_x;
    let y = (columns[1] - x * columns[1].dot(x))
        .try_normalize()
        .ok_or(DecompositionError::Singular)?;
    Ok(DMat3::from_cols(x, y, x.cross(y)))
}

impl Matrix4 {
    /// Decomposes this matrix. See [`decompose`].
    pub fn decompose(&self) -> Result<Decomposition, DecompositionError> {
        decompose(self)
    }
}
