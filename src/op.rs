//! Transform operations ("xform ops") and local transform composition.
//!
//! A node's local transform is an ordered list of [`TransformOp`]s. The
//! first op in the list is applied first to a point in local space, so a
//! node with ops `[op_1, op_2, …, op_n]` has the local matrix
//! `op_n * … * op_2 * op_1`.
//!
//! ```
//! use worldxform::{local_transform, TransformOp, TimeCode, DVec3};
//!
//! let ops = [
//!     TransformOp::translate(DVec3::new(1.0, 0.0, 0.0)),
//!     TransformOp::scale(DVec3::splat(2.0)),
//! ];
//! let local = local_transform(&ops, TimeCode::Default).unwrap();
//!
//! // Translated to (1, 0, 0), then scaled away from the origin.
//! assert_eq!(local.transform_point(DVec3::ZERO), DVec3::new(2.0, 0.0, 0.0));
//! ```
//!
//! Rotation angles are expressed in degrees.

use crate::matrix::Matrix4;
use crate::samples::Animated;
use crate::time::TimeCode;
use glam::{DMat4, DQuat, DVec3};

/// A principal axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along this axis.
    pub fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }
}

/// Order in which the three angles of an Euler rotation are applied.
///
/// `XYZ` rotates about X first, then Y, then Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RotationOrder {
    #[default]
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

impl RotationOrder {
    /// Axes in application order.
    pub fn axes(self) -> [Axis; 3] {
        use Axis::*;
        match self {
            RotationOrder::XYZ => [X, Y, Z],
            RotationOrder::XZY => [X, Z, Y],
            RotationOrder::YXZ => [Y, X, Z],
            RotationOrder::YZX => [Y, Z, X],
            RotationOrder::ZXY => [Z, X, Y],
            RotationOrder::ZYX => [Z, Y, X],
        }
    }
}

/// The kind of an op together with its (possibly animated) value.
#[derive(Clone, Debug, PartialEq)]
pub enum OpKind {
    /// Translation by a vector.
    Translate(Animated<DVec3>),
    /// Rotation about a principal axis, in degrees.
    Rotate(Axis, Animated<f64>),
    /// Rotation about an arbitrary fixed axis, in degrees.
    RotateAxis {
        axis: DVec3,
        angle: Animated<f64>,
    },
    /// Euler rotation; the vector holds the X, Y and Z angles in degrees.
    RotateEuler {
        order: RotationOrder,
        angles: Animated<DVec3>,
    },
    /// Non-uniform scale.
    Scale(Animated<DVec3>),
    /// Orientation quaternion.
    Orient(Animated<DQuat>),
    /// Arbitrary 4x4 matrix.
    Transform(Animated<DMat4>),
}

impl OpKind {
    /// Short name of the op kind, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Translate(_) => "translate",
            OpKind::Rotate(Axis::X, _) => "rotateX",
            OpKind::Rotate(Axis::Y, _) => "rotateY",
            OpKind::Rotate(Axis::Z, _) => "rotateZ",
            OpKind::RotateAxis { .. } => "rotateAxis",
            OpKind::RotateEuler { .. } => "rotateEuler",
            OpKind::Scale(_) => "scale",
            OpKind::Orient(_) => "orient",
            OpKind::Transform(_) => "transform",
        }
    }

    /// Returns true if any authored value has more than one time sample.
    pub fn is_animated(&self) -> bool {
        match self {
            OpKind::Translate(v) | OpKind::Scale(v) => v.is_animated(),
            OpKind::Rotate(_, a) => a.is_animated(),
            OpKind::RotateAxis { angle, .. } => angle.is_animated(),
            OpKind::RotateEuler { angles, .. } => angles.is_animated(),
            OpKind::Orient(q) => q.is_animated(),
            OpKind::Transform(m) => m.is_animated(),
        }
    }
}

/// A single local transform primitive.
///
/// # Example
///
/// ```
/// use worldxform::{TransformOp, TimeCode, DVec3};
///
/// let op = TransformOp::rotate_z(90.0);
/// let m = op.matrix(TimeCode::Default).unwrap();
/// assert!(m.transform_point(DVec3::X).abs_diff_eq(DVec3::Y, 1e-12));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransformOp {
    /// What the op does and its value.
    pub kind: OpKind,
    /// Apply the inverse of the op's matrix.
    pub inverse: bool,
}

impl TransformOp {
    /// Creates a non-inverted op.
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            inverse: false,
        }
    }

    /// Constant translation.
    pub fn translate(translation: DVec3) -> Self {
        Self::new(OpKind::Translate(translation.into()))
    }

    /// Constant rotation about X, in degrees.
    pub fn rotate_x(degrees: f64) -> Self {
        Self::new(OpKind::Rotate(Axis::X, degrees.into()))
    }

    /// Constant rotation about Y, in degrees.
    pub fn rotate_y(degrees: f64) -> Self {
        Self::new(OpKind::Rotate(Axis::Y, degrees.into()))
    }

    /// Constant rotation about Z, in degrees.
    pub fn rotate_z(degrees: f64) -> Self {
        Self::new(OpKind::Rotate(Axis::Z, degrees.into()))
    }

    /// Constant rotation about an arbitrary axis, in degrees.
    pub fn rotate_axis(axis: DVec3, degrees: f64) -> Self {
        Self::new(OpKind::RotateAxis {
            axis,
            angle: degrees.into(),
        })
    }

    /// Constant Euler rotation, angles in degrees.
    pub fn rotate_euler(order: RotationOrder, degrees: DVec3) -> Self {
        Self::new(OpKind::RotateEuler {
            order,
            angles: degrees.into(),
        })
    }

    /// Constant non-uniform scale.
    pub fn scale(scale: DVec3) -> Self {
        Self::new(OpKind::Scale(scale.into()))
    }

    /// Constant orientation.
    pub fn orient(rotation: DQuat) -> Self {
        Self::new(OpKind::Orient(rotation.into()))
    }

    /// Constant matrix.
    pub fn transform(matrix: DMat4) -> Self {
        Self::new(OpKind::Transform(matrix.into()))
    }

    /// Marks the op as inverted, builder style.
    pub fn inverted(mut self) -> Self {
        self.inverse = !self.inverse;
        self
    }

    /// Evaluates the op's matrix at `time`.
    ///
    /// An op with nothing authored evaluates to its identity value. Returns
    /// `None` only for an inverted op whose matrix is singular.
    pub fn matrix(&self, time: TimeCode) -> Option<Matrix4> {
        let m = self.forward_matrix(time);
        if self.inverse { m.try_inverse() } else { Some(m) }
    }

    fn forward_matrix(&self, time: TimeCode) -> Matrix4 {
        match &self.kind {
            OpKind::Translate(v) => {
                Matrix4::from_translation(self.value_or(v, time, DVec3::ZERO))
            }
            OpKind::Rotate(axis, angle) => {
                Matrix4::from_axis_angle_degrees(axis.unit(), self.value_or(angle, time, 0.0))
            }
            OpKind::RotateAxis { axis, angle } => {
                Matrix4::from_axis_angle_degrees(*axis, self.value_or(angle, time, 0.0))
            }
            OpKind::RotateEuler { order, angles } => {
                let degrees = self.value_or(angles, time, DVec3::ZERO);
                order.axes().iter().fold(Matrix4::IDENTITY, |m, axis| {
                    let angle = match axis {
                        Axis::X => degrees.x,
                        Axis::Y => degrees.y,
                        Axis::Z => degrees.z,
                    };
                    Matrix4::from_axis_angle_degrees(axis.unit(), angle) * m
                })
            }
            OpKind::Scale(v) => Matrix4::from_scale(self.value_or(v, time, DVec3::ONE)),
            OpKind::Orient(q) => Matrix4::from_rotation(self.value_or(q, time, DQuat::IDENTITY)),
            OpKind::Transform(m) => Matrix4(self.value_or(m, time, DMat4::IDENTITY)),
        }
    }

    fn value_or<T: crate::samples::Interpolate>(
        &self,
        value: &Animated<T>,
        time: TimeCode,
        identity: T,
    ) -> T {
        value.eval(time).unwrap_or_else(|| {
            log::debug!("{} op has no authored value, using identity", self.kind.name());
            identity
        })
    }
}

/// Composes `ops` into a local transform, first op applied first.
///
/// On failure returns the index of the inverted op whose matrix is
/// singular.
pub fn local_transform(ops: &[TransformOp], time: TimeCode) -> Result<Matrix4, usize> {
    ops.iter().enumerate().try_fold(Matrix4::IDENTITY, |local, (index, op)| {
        op.matrix(time).map(|m| m * local).ok_or(index)
    })
}
