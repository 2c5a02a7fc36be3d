use rerig_core::math::KINDA_SMALL_NUMBER;
use rerig_core::{Result, RetargetLog, Transform};
use rerig_skeleton::{RetargetSkeleton, TargetSkeleton};

use super::{ChainEncoderFk, ChainFk};
use crate::root::RootRetargeter;
use crate::settings::{FkChainSettings, RotationMode, TranslationMode};

/// Target half of an FK chain pair.
#[derive(Debug, Clone, Default)]
pub struct ChainDecoderFk {
    pub(crate) chain: ChainFk,
    /// Non-retargeted ancestors between the chain and the nearest retargeted bone
    /// (or the retarget root), ordered parent first.
    intermediate_parent_indices: Vec<usize>,
    /// Local transforms used by the alpha blend; sized once at construction.
    blend_scratch: Vec<Transform>,
}

impl ChainDecoderFk {
    pub fn new(
        chain_name: &str,
        skeleton: &RetargetSkeleton,
        bone_indices: &[usize],
        log: &mut RetargetLog,
    ) -> Result<Self> {
        let chain = ChainFk::new(
            chain_name,
            skeleton,
            bone_indices,
            skeleton.retarget_global_pose(),
            log,
        )?;
        let blend_scratch = vec![Transform::IDENTITY; chain.bone_indices.len()];

        Ok(Self {
            chain,
            intermediate_parent_indices: Vec::new(),
            blend_scratch,
        })
    }

    /// Collects the ancestors of `chain_root` that nothing else updates.
    ///
    /// The walk stops at the skeleton root, the retarget root, or the first bone
    /// already flagged as retargeted, so it has to run after every chain's bones
    /// were flagged.
    pub fn initialize_intermediate_parent_indices(
        &mut self,
        retarget_root: Option<usize>,
        chain_root: usize,
        target: &TargetSkeleton,
    ) {
        self.intermediate_parent_indices.clear();

        let skeleton = target.skeleton();
        let mut parent = skeleton.parent_index(chain_root);
        while let Some(parent_index) = parent {
            if Some(parent_index) == retarget_root || target.is_bone_retargeted(parent_index) {
                break;
            }
            self.intermediate_parent_indices.push(parent_index);
            parent = skeleton.parent_index(parent_index);
        }

        self.intermediate_parent_indices.reverse();
    }

    #[inline]
    #[must_use]
    pub fn intermediate_parent_indices(&self) -> &[usize] {
        &self.intermediate_parent_indices
    }

    /// Poses the intermediate parents from the retarget local pose so the chain
    /// parent is current before the chain is decoded.
    pub fn update_intermediate_parents(&self, skeleton: &RetargetSkeleton, global_pose: &mut [Transform]) {
        let local_pose = skeleton.retarget_local_pose();
        for &parent_index in &self.intermediate_parent_indices {
            skeleton.update_global_transform_of_single_bone(parent_index, local_pose, global_pose);
        }
    }

    /// Writes the retargeted chain into `global_pose`.
    pub fn decode_pose(
        &mut self,
        root: &RootRetargeter,
        settings: &FkChainSettings,
        source: &mut ChainEncoderFk,
        skeleton: &RetargetSkeleton,
        global_pose: &mut [Transform],
    ) {
        self.update_intermediate_parents(skeleton, global_pose);

        // Re-hang the encoded source chain off the current target chain parent
        let source_parent_initial_delta = source
            .chain
            .chain_parent_initial_global_transform
            .relative_to(&self.chain.chain_parent_initial_global_transform);
        let target_parent_current = self
            .chain
            .chain_parent_bone_index
            .map_or(Transform::IDENTITY, |parent| global_pose[parent]);
        source.realign(&(target_parent_current * source_parent_initial_delta));

        if !settings.enable_fk {
            self.chain.put_current_transforms_in_ref_pose(skeleton, global_pose);
            return;
        }

        let source_chain = &source.chain;
        let num_source = source_chain.bone_indices.len();
        let num_target = self.chain.bone_indices.len();
        let target_start_index = num_target.saturating_sub(num_source);
        let source_start_index = num_source.saturating_sub(num_target);

        for chain_index in 0..num_target {
            let bone_index = self.chain.bone_indices[chain_index];
            let target_initial = self.chain.initial_global_transforms[chain_index];

            let (source_current, source_initial) = match settings.rotation_mode {
                RotationMode::Interpolated => {
                    let param = self.chain.params[chain_index];
                    (
                        transform_at_param(&source_chain.current_global_transforms, &source_chain.params, param),
                        transform_at_param(&source_chain.initial_global_transforms, &source_chain.params, param),
                    )
                }
                RotationMode::OneToOne => {
                    let source_index = chain_index.min(num_source - 1);
                    (
                        source_chain.current_global_transforms[source_index],
                        source_chain.initial_global_transforms[source_index],
                    )
                }
                RotationMode::OneToOneReversed => {
                    if chain_index < target_start_index {
                        let first = source_chain.initial_global_transforms[0];
                        (first, first)
                    } else {
                        let source_index = source_start_index + (chain_index - target_start_index);
                        (
                            source_chain.current_global_transforms[source_index],
                            source_chain.initial_global_transforms[source_index],
                        )
                    }
                }
                RotationMode::None => {
                    let last = source_chain.initial_global_transforms[num_source - 1];
                    (last, last)
                }
            };

            let rotation_delta = source_current.rotation * source_initial.rotation.inverse();
            let rotation = (rotation_delta * target_initial.rotation).normalize();

            let parent_global = skeleton
                .parent_index(bone_index)
                .map_or(Transform::IDENTITY, |parent| global_pose[parent]);
            let translation = match settings.translation_mode {
                TranslationMode::GloballyScaled if root.is_initialized() => {
                    source_current.translation * root.global_scale_vector()
                }
                TranslationMode::Absolute => source_current.translation,
                // Without a height ratio a scaled translation falls back to the retarget pose offset
                TranslationMode::None | TranslationMode::GloballyScaled => {
                    parent_global.transform_point(skeleton.retarget_local_pose()[bone_index].translation)
                }
            };

            let scale = source_current.scale + (target_initial.scale - source_initial.scale);

            let output = Transform::new(translation, rotation, scale);
            self.chain.current_global_transforms[chain_index] = output;
            global_pose[bone_index] = output;
        }

        if settings.needs_blend() {
            self.blend_toward_retarget_pose(settings, skeleton, global_pose);
        }
    }

    /// Blends every chain bone in local space between its retarget pose and the
    /// freshly decoded transform.
    fn blend_toward_retarget_pose(
        &mut self,
        settings: &FkChainSettings,
        skeleton: &RetargetSkeleton,
        global_pose: &mut [Transform],
    ) {
        ChainFk::fill_transforms_with_local_space_of_chain(
            skeleton,
            global_pose,
            &self.chain.bone_indices,
            &mut self.blend_scratch,
        );

        for (chain_index, &bone_index) in self.chain.bone_indices.iter().enumerate() {
            let reference = self.chain.initial_local_transforms[chain_index];
            let local = &mut self.blend_scratch[chain_index];
            local.translation = reference.translation.lerp(local.translation, settings.translation_alpha);
            local.rotation = reference
                .rotation
                .slerp(local.rotation, settings.rotation_alpha)
                .normalize();

            let parent_global = skeleton
                .parent_index(bone_index)
                .map_or(Transform::IDENTITY, |parent| global_pose[parent]);
            global_pose[bone_index] = parent_global * *local;
        }
    }

    #[inline]
    #[must_use]
    pub fn chain(&self) -> &ChainFk {
        &self.chain
    }
}

/// Samples a chain at normalized position `param`.
///
/// Positions within tolerance of either end snap to the first or last transform;
/// anything in between blends the two bones that bracket it.
#[must_use]
pub fn transform_at_param(transforms: &[Transform], params: &[f32], param: f32) -> Transform {
    if params.len() == 1 {
        return transforms[0];
    }

    if param < KINDA_SMALL_NUMBER {
        return transforms[0];
    }

    let last = transforms.len() - 1;
    if param > 1.0 - KINDA_SMALL_NUMBER {
        return transforms[last];
    }

    for (chain_index, &next_param) in params.iter().enumerate().skip(1) {
        if param > next_param {
            continue;
        }
        let prev_param = params[chain_index - 1];
        let alpha = (param - prev_param) / (next_param - prev_param);
        return transforms[chain_index - 1].blend(&transforms[chain_index], alpha);
    }

    transforms[last]
}
