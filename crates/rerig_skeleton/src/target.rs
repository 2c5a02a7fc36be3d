use rerig_core::Transform;

use crate::chain::BoneChain;
use crate::description::SkeletonDescription;
use crate::pose::RetargetPose;
use crate::skeleton::RetargetSkeleton;

/// Skeleton being written to: the model plus per-bone "retargeted" flags and the
/// live output pose.
#[derive(Debug, Clone, Default)]
pub struct TargetSkeleton {
    skeleton: RetargetSkeleton,
    /// Bones owned by a mapped chain or the root; everything else is filled in
    /// from the retarget pose after the chains ran.
    is_bone_retargeted: Vec<bool>,
    output_global_pose: Vec<Transform>,
}

impl TargetSkeleton {
    #[must_use]
    pub fn new(
        description: &SkeletonDescription,
        chains: &[BoneChain],
        retarget_pose_name: Option<&str>,
        retarget_pose: Option<&RetargetPose>,
        retarget_root: Option<&str>,
    ) -> Self {
        let skeleton = RetargetSkeleton::new(
            description,
            chains,
            retarget_pose_name,
            retarget_pose,
            retarget_root,
        );

        // Flags are set later, when chains get mapped onto source chains
        let is_bone_retargeted = vec![false; skeleton.bone_count()];
        let output_global_pose = skeleton.retarget_global_pose().to_vec();

        Self {
            skeleton,
            is_bone_retargeted,
            output_global_pose,
        }
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &RetargetSkeleton {
        &self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn output_global_pose(&self) -> &[Transform] {
        &self.output_global_pose
    }

    /// Borrows the model and the output pose at the same time, for stages that read
    /// the hierarchy while writing the pose.
    #[inline]
    pub fn split_mut(&mut self) -> (&RetargetSkeleton, &mut [Transform]) {
        (&self.skeleton, &mut self.output_global_pose)
    }

    pub fn set_bone_is_retargeted(&mut self, bone_index: usize, is_retargeted: bool) {
        self.is_bone_retargeted[bone_index] = is_retargeted;
    }

    #[inline]
    #[must_use]
    pub fn is_bone_retargeted(&self, bone_index: usize) -> bool {
        self.is_bone_retargeted.get(bone_index).copied().unwrap_or(false)
    }

    /// Copies the retarget pose into the output buffer without reallocating.
    pub fn reset_output_pose(&mut self) {
        self.output_global_pose
            .copy_from_slice(self.skeleton.retarget_global_pose());
    }

    /// Recomputes globals of every bone below `start` from the retarget local pose.
    pub fn update_output_below_bone(&mut self, start: Option<usize>) {
        self.skeleton.update_global_transforms_below_bone(
            start,
            self.skeleton.retarget_local_pose(),
            &mut self.output_global_pose,
        );
    }

    /// Re-attaches every non-retargeted bone under its (already current) parent,
    /// using the bone's retarget-pose local transform.
    pub fn update_global_transforms_all_non_retargeted_bones(&mut self) {
        let local_pose = self.skeleton.retarget_local_pose();
        for bone_index in 0..self.output_global_pose.len() {
            if !self.is_bone_retargeted[bone_index] {
                self.skeleton.update_global_transform_of_single_bone(
                    bone_index,
                    local_pose,
                    &mut self.output_global_pose,
                );
            }
        }
    }
}
