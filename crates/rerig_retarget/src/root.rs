//! Root Retargeting
//!
//! The retarget root (usually the pelvis) is handled separately from the chains:
//! its position is normalized by the source's initial root height and rescaled to
//! the target's, so a short character walking with a tall one's animation covers
//! proportionally less ground instead of floating or sinking.
//!
//! Z is the vertical axis.

use glam::{Quat, Vec3};
use rerig_core::math::KINDA_SMALL_NUMBER;
use rerig_core::{LogCode, Result, RetargetError, RetargetLog, Transform};
use rerig_skeleton::RetargetSkeleton;

use crate::settings::RootSettings;

#[derive(Debug, Clone, Default)]
pub struct RootSource {
    pub bone_name: String,
    pub bone_index: Option<usize>,
    pub initial_height_inverse: f32,
    pub initial_rotation: Quat,
    pub current_position: Vec3,
    pub current_position_normalized: Vec3,
    pub current_rotation: Quat,
}

#[derive(Debug, Clone, Default)]
pub struct RootTarget {
    pub bone_name: String,
    pub bone_index: Option<usize>,
    pub initial_height: f32,
    pub initial_rotation: Quat,
    pub initial_position: Vec3,
    pub root_translation_delta: Vec3,
    pub root_rotation_delta: Quat,
}

#[derive(Debug, Clone)]
pub struct RootRetargeter {
    pub source: RootSource,
    pub target: RootTarget,
    pub settings: RootSettings,
    global_scale_factor: Vec3,
}

impl Default for RootRetargeter {
    fn default() -> Self {
        Self {
            source: RootSource::default(),
            target: RootTarget::default(),
            settings: RootSettings::default(),
            global_scale_factor: Vec3::ONE,
        }
    }
}

impl RootRetargeter {
    #[must_use]
    pub fn new(settings: RootSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Clears both sides, keeping the settings.
    pub fn reset(&mut self) {
        self.source = RootSource::default();
        self.target = RootTarget::default();
        self.global_scale_factor = Vec3::ONE;
    }

    pub fn initialize_source(
        &mut self,
        root_bone_name: Option<&str>,
        skeleton: &RetargetSkeleton,
        log: &mut RetargetLog,
    ) -> Result<()> {
        let bone_index = find_root(root_bone_name, skeleton)?;
        let initial_transform = skeleton.retarget_global_pose()[bone_index];

        let mut initial_height = initial_transform.translation.z;
        if initial_height < KINDA_SMALL_NUMBER {
            log.warning(
                LogCode::BadRootHeight,
                format!(
                    "Root bone '{}' of source skeleton '{}' is at or below the ground (height {initial_height}), using 1.0",
                    skeleton.bone_name(bone_index).unwrap_or_default(),
                    skeleton.name()
                ),
            );
            initial_height = 1.0;
        }

        self.source.bone_name = skeleton.bone_name(bone_index).unwrap_or_default().to_string();
        self.source.bone_index = Some(bone_index);
        self.source.initial_height_inverse = 1.0 / initial_height;
        self.source.initial_rotation = initial_transform.rotation;
        Ok(())
    }

    /// Must run after [`Self::initialize_source`]. The global scale factor is
    /// only updated when the source root resolved; otherwise it stays at one.
    pub fn initialize_target(&mut self, root_bone_name: Option<&str>, skeleton: &RetargetSkeleton) -> Result<()> {
        let bone_index = find_root(root_bone_name, skeleton)?;
        let initial_transform = skeleton.retarget_global_pose()[bone_index];

        self.target.bone_name = skeleton.bone_name(bone_index).unwrap_or_default().to_string();
        self.target.bone_index = Some(bone_index);
        self.target.initial_height = initial_transform.translation.z;
        self.target.initial_rotation = initial_transform.rotation;
        self.target.initial_position = initial_transform.translation;

        // Uniform: the vertical ratio drives all three axes
        if self.source.bone_index.is_some() {
            let height_ratio = self.source.initial_height_inverse * self.target.initial_height;
            self.global_scale_factor = Vec3::splat(height_ratio);
        }
        Ok(())
    }

    pub fn encode_pose(&mut self, source_global_pose: &[Transform]) {
        let Some(bone_index) = self.source.bone_index else {
            return;
        };
        let root = source_global_pose[bone_index];

        self.source.current_position = root.translation;
        self.source.current_position_normalized = root.translation * self.source.initial_height_inverse;
        self.source.current_rotation = root.rotation;
    }

    pub fn decode_pose(&mut self, target_global_pose: &mut [Transform]) {
        let Some(bone_index) = self.target.bone_index else {
            return;
        };
        let settings = &self.settings;
        let initial_position = self.target.initial_position;

        // Position
        let retargeted_position = self.source.current_position_normalized * self.target.initial_height;
        let blend_weights = settings.blend_to_source * settings.blend_to_source_weights;
        // Per-axis lerp toward the raw source position
        let mut position =
            retargeted_position + (self.source.current_position - retargeted_position) * blend_weights;

        position.z *= settings.scale_vertical;

        let horizontal_scale = Vec3::new(settings.scale_horizontal, settings.scale_horizontal, 1.0);
        position = initial_position + (position - initial_position) * horizontal_scale;

        position += settings.translation_offset;
        position = initial_position.lerp(position, settings.translation_alpha);

        self.target.root_translation_delta = position - retargeted_position;

        // Rotation
        let rotation_delta = self.source.current_rotation * self.source.initial_rotation.inverse();
        let retargeted_rotation = (rotation_delta * self.target.initial_rotation) * settings.rotation_offset;
        let rotation = self
            .target
            .initial_rotation
            .slerp(retargeted_rotation, settings.rotation_alpha)
            .normalize();

        self.target.root_rotation_delta = retargeted_rotation * self.target.initial_rotation.inverse();

        let root = &mut target_global_pose[bone_index];
        root.translation = position;
        root.rotation = rotation;
    }

    /// Both root bones resolved.
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.source.bone_index.is_some() && self.target.bone_index.is_some()
    }

    /// Uniform height ratio (target / source) used to scale chain translations.
    /// One until both roots are initialized.
    #[inline]
    #[must_use]
    pub fn global_scale_vector(&self) -> Vec3 {
        self.global_scale_factor
    }

    /// Offset between the final root position and the purely height-scaled one.
    #[inline]
    #[must_use]
    pub fn root_translation_delta(&self) -> Vec3 {
        self.target.root_translation_delta
    }

    /// Retargeted root rotation relative to the target's initial root rotation.
    #[inline]
    #[must_use]
    pub fn root_rotation_delta(&self) -> Quat {
        self.target.root_rotation_delta
    }
}

fn find_root(root_bone_name: Option<&str>, skeleton: &RetargetSkeleton) -> Result<usize> {
    let name = root_bone_name.ok_or_else(|| {
        RetargetError::MissingAsset(format!("retarget root of skeleton '{}'", skeleton.name()))
    })?;
    skeleton
        .find_bone_index(name)
        .ok_or_else(|| RetargetError::MissingBone {
            bone: name.to_string(),
            skeleton: skeleton.name().to_string(),
        })
}
