use std::ops::Mul;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::{KINDA_SMALL_NUMBER, safe_divide};

/// Bone transform: translation, rotation and non-uniform scale (TRS).
///
/// Unlike an affine matrix, a `Transform` keeps its three components separate so
/// that scale can be carried through a hierarchy and recovered exactly. Composition
/// follows the glam convention: `parent * child` yields the child expressed in the
/// parent's space.
///
/// ```rust,ignore
/// use rerig_core::Transform;
///
/// let global = parent_global * local;
/// let local_again = global.relative_to(&parent_global);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Expresses `child` (given relative to `self`) in the space `self` lives in.
    #[inline]
    #[must_use]
    pub fn mul_transform(&self, child: &Self) -> Self {
        Self {
            translation: self.rotation * (self.scale * child.translation) + self.translation,
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    /// Returns `self` expressed relative to `parent`.
    ///
    /// This is the exact inverse of [`Transform::mul_transform`]:
    /// `parent * self.relative_to(parent) == self` for any parent whose scale has
    /// no near-zero component. Near-zero parent scale components yield zero.
    #[must_use]
    pub fn relative_to(&self, parent: &Self) -> Self {
        let inv_rotation = parent.rotation.inverse();
        let inv_scale = Vec3::new(
            safe_divide(1.0, parent.scale.x),
            safe_divide(1.0, parent.scale.y),
            safe_divide(1.0, parent.scale.z),
        );

        Self {
            translation: (inv_rotation * (self.translation - parent.translation)) * inv_scale,
            rotation: (inv_rotation * self.rotation).normalize(),
            scale: self.scale * inv_scale,
        }
    }

    /// Transforms a point from this transform's local space.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    // ========================================================================
    // Blending
    // ========================================================================

    /// Piecewise blend: lerp translation and scale, shortest-arc slerp rotation.
    #[must_use]
    pub fn blend(&self, other: &Self, alpha: f32) -> Self {
        Self {
            translation: self.translation.lerp(other.translation, alpha),
            rotation: self.rotation.slerp(other.rotation, alpha).normalize(),
            scale: self.scale.lerp(other.scale, alpha),
        }
    }

    /// Component-wise comparison within `tolerance`.
    ///
    /// Rotations are compared up to sign, since `q` and `-q` describe the same rotation.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, tolerance: f32) -> bool {
        let rotation_eq = self.rotation.abs_diff_eq(other.rotation, tolerance)
            || self.rotation.abs_diff_eq(-other.rotation, tolerance);

        self.translation.abs_diff_eq(other.translation, tolerance)
            && rotation_eq
            && self.scale.abs_diff_eq(other.scale, tolerance)
    }

    #[inline]
    #[must_use]
    pub fn is_nearly_identity(&self) -> bool {
        self.abs_diff_eq(&Self::IDENTITY, KINDA_SMALL_NUMBER)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Self;

    #[inline]
    fn mul(self, child: Self) -> Self {
        self.mul_transform(&child)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    #[inline]
    fn mul(self, child: &Transform) -> Transform {
        self.mul_transform(child)
    }
}
