//! 4x4 homogeneous transform matrices.
//!
//! [`Matrix4`] wraps glam's double-precision [`DMat4`] and fixes the
//! conventions used across the crate:
//!
//! - points are column vectors multiplied on the right (`p' = M * p`),
//! - `a * b` applies `b` first, then `a`,
//! - the translation lives in the fourth column.

use glam::{DMat3, DMat4, DQuat, DVec3, DVec4};
use std::ops::{Mul, MulAssign};

/// A 4x4 homogeneous transform.
///
/// # Example
///
/// ```
/// use worldxform::{Matrix4, DVec3};
///
/// let translate = Matrix4::from_translation(DVec3::new(1.0, 0.0, 0.0));
/// let scale = Matrix4::from_scale(DVec3::splat(2.0));
///
/// // Translate first, then scale.
/// let m = scale * translate;
/// assert_eq!(m.transform_point(DVec3::ZERO), DVec3::new(2.0, 0.0, 0.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Matrix4(pub DMat4);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// The identity transform.
    pub const IDENTITY: Self = Self(DMat4::IDENTITY);

    /// Creates a pure translation.
    pub fn from_translation(translation: DVec3) -> Self {
        Self(DMat4::from_translation(translation))
    }

    /// Creates a pure (non-uniform) scale.
    pub fn from_scale(scale: DVec3) -> Self {
        Self(DMat4::from_scale(scale))
    }

    /// Creates a pure rotation from a quaternion.
    pub fn from_rotation(rotation: DQuat) -> Self {
        Self(DMat4::from_quat(rotation.normalize()))
    }

    /// Creates a rotation of `degrees` about `axis`.
    ///
    /// A zero-length axis yields the identity.
    pub fn from_axis_angle_degrees(axis: DVec3, degrees: f64) -> Self {
        match axis.try_normalize() {
            Some(axis) => Self(DMat4::from_axis_angle(axis, degrees.to_radians())),
            None => Self::IDENTITY,
        }
    }

    /// Composes translation, rotation and scale, applied scale first.
    pub fn from_scale_rotation_translation(
        scale: DVec3,
        rotation: DQuat,
        translation: DVec3,
    ) -> Self {
        Self(DMat4::from_scale_rotation_translation(
            scale,
            rotation.normalize(),
            translation,
        ))
    }

    /// Creates a matrix from 16 column-major components.
    pub fn from_cols_array(components: &[f64; 16]) -> Self {
        Self(DMat4::from_cols_array(components))
    }

    /// Returns the 16 column-major components.
    pub fn to_cols_array(&self) -> [f64; 16] {
        self.0.to_cols_array()
    }

    /// Returns the wrapped glam matrix.
    pub fn as_dmat4(&self) -> &DMat4 {
        &self.0
    }

    /// Applies `self` first, then `other`.
    pub fn then(&self, other: &Matrix4) -> Matrix4 {
        *other * *self
    }

    /// Returns the translation column.
    pub fn translation(&self) -> DVec3 {
        self.0.w_axis.truncate()
    }

    /// Returns the upper-left 3x3 linear block (rotation and scale, plus any
    /// shear).
    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_mat4(self.0)
    }

    /// Returns the determinant of the full matrix.
    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    /// Returns the inverse, or `None` if the matrix is singular.
    pub fn try_inverse(&self) -> Option<Matrix4> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Self(self.0.inverse()))
    }

    /// Transforms a point (w = 1).
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.0.transform_point3(point)
    }

    /// Transforms a direction (w = 0), ignoring translation.
    pub fn transform_vector(&self, vector: DVec3) -> DVec3 {
        self.0.transform_vector3(vector)
    }

    /// Returns true if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Returns true if the bottom row is `0 0 0 1` within `epsilon`.
    pub fn is_affine(&self, epsilon: f64) -> bool {
        self.0.row(3).abs_diff_eq(DVec4::W, epsilon)
    }

    /// Component-wise comparison within `epsilon`.
    pub fn abs_diff_eq(&self, other: &Matrix4, epsilon: f64) -> bool {
        self.0.abs_diff_eq(other.0, epsilon)
    }
}

impl From<DMat4> for Matrix4 {
    fn from(m: DMat4) -> Self {
        Self(m)
    }
}

impl From<Matrix4> for DMat4 {
    fn from(m: Matrix4) -> Self {
        m.0
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        Matrix4(self.0 * rhs.0)
    }
}

impl MulAssign for Matrix4 {
    fn mul_assign(&mut self, rhs: Matrix4) {
        self.0 *= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_is_not_commutative() {
        let t = Matrix4::from_translation(DVec3::new(1.0, 0.0, 0.0));
        let s = Matrix4::from_scale(DVec3::splat(2.0));

        assert_eq!((s * t).translation(), DVec3::new(2.0, 0.0, 0.0));
        assert_eq!((t * s).translation(), DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(t.then(&s), s * t);
    }

    #[test]
    fn axis_angle_in_degrees() {
        let m = Matrix4::from_axis_angle_degrees(DVec3::Z, 90.0);
        let p = m.transform_point(DVec3::X);
        assert!(p.abs_diff_eq(DVec3::Y, 1e-12));
    }

    #[test]
    fn zero_axis_is_identity() {
        assert_eq!(
            Matrix4::from_axis_angle_degrees(DVec3::ZERO, 45.0),
            Matrix4::IDENTITY
        );
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Matrix4::from_scale(DVec3::new(1.0, 0.0, 1.0));
        assert!(m.try_inverse().is_none());

        let t = Matrix4::from_translation(DVec3::new(3.0, -2.0, 1.0));
        let inv = t.try_inverse().unwrap();
        assert!((t * inv).abs_diff_eq(&Matrix4::IDENTITY, 1e-12));
    }

    #[test]
    fn affine_check() {
        assert!(Matrix4::IDENTITY.is_affine(1e-12));
        let mut projective = DMat4::IDENTITY;
        projective.x_axis.w = 0.5;
        assert!(!Matrix4(projective).is_affine(1e-12));
    }

    #[test]
    fn vectors_ignore_translation() {
        let m = Matrix4::from_translation(DVec3::splat(5.0));
        assert_eq!(m.transform_vector(DVec3::X), DVec3::X);
    }
}
