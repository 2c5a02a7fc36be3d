use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Authored offsets applied on top of a skeleton's reference pose.
///
/// The retarget pose is the baseline both skeletons are compared in, so it is
/// usually authored to bring source and target into a matching stance (e.g. both
/// in a T-pose) before any animation is transferred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetPose {
    /// Label used in diagnostics.
    pub name: String,
    /// Added to the retarget root's global translation.
    pub root_translation_delta: Vec3,
    /// Per-bone rotation offsets, applied in the bone's local frame after its
    /// reference local rotation.
    pub bone_rotation_offsets: FxHashMap<String, Quat>,
}

impl RetargetPose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_root_translation_delta(mut self, delta: Vec3) -> Self {
        self.root_translation_delta = delta;
        self
    }

    #[must_use]
    pub fn with_bone_rotation_offset(mut self, bone: impl Into<String>, offset: Quat) -> Self {
        self.bone_rotation_offsets.insert(bone.into(), offset);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root_translation_delta == Vec3::ZERO && self.bone_rotation_offsets.is_empty()
    }
}
