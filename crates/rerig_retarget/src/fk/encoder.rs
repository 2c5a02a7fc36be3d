use rerig_core::{Result, RetargetLog, Transform};
use rerig_skeleton::RetargetSkeleton;

use super::ChainFk;

/// Source half of an FK chain pair.
#[derive(Debug, Clone, Default)]
pub struct ChainEncoderFk {
    pub(crate) chain: ChainFk,
    current_local_transforms: Vec<Transform>,
    chain_parent_current_global_transform: Transform,
}

impl ChainEncoderFk {
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
        let current_local_transforms = chain.initial_local_transforms.clone();
        let chain_parent_current_global_transform = chain.chain_parent_initial_global_transform;

        Ok(Self {
            chain,
            current_local_transforms,
            chain_parent_current_global_transform,
        })
    }

    /// Samples the source chain from the current source pose.
    pub fn encode_pose(&mut self, skeleton: &RetargetSkeleton, source_global_pose: &[Transform]) {
        let chain = &mut self.chain;
        for (current, &bone_index) in chain.current_global_transforms.iter_mut().zip(&chain.bone_indices) {
            *current = source_global_pose[bone_index];
        }

        ChainFk::fill_transforms_with_local_space_of_chain(
            skeleton,
            source_global_pose,
            &chain.bone_indices,
            &mut self.current_local_transforms,
        );

        if let Some(parent) = chain.chain_parent_bone_index {
            self.chain_parent_current_global_transform = source_global_pose[parent];
        }
    }

    /// Rebuilds the current globals of the chain under `new_parent`, keeping the
    /// encoded local transforms.
    pub fn realign(&mut self, new_parent: &Transform) {
        let mut parent = *new_parent;
        for (current, local) in self
            .chain
            .current_global_transforms
            .iter_mut()
            .zip(&self.current_local_transforms)
        {
            *current = parent * *local;
            parent = *current;
        }
    }

    #[inline]
    #[must_use]
    pub fn chain(&self) -> &ChainFk {
        &self.chain
    }

    #[inline]
    #[must_use]
    pub fn current_local_transforms(&self) -> &[Transform] {
        &self.current_local_transforms
    }

    #[inline]
    #[must_use]
    pub fn chain_parent_current_global_transform(&self) -> Transform {
        self.chain_parent_current_global_transform
    }
}
