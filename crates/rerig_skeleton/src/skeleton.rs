//! Skeleton Model
//!
//! [`RetargetSkeleton`] is the retargeter's working copy of a skeleton: bone names,
//! parent links, and the retarget pose in both local and global space.
//!
//! Bones are stored in depth-first order (see [`SkeletonDescription`]), so:
//! - local → global is one forward pass (a parent is always updated before its children),
//! - global → local is one pass reading only globals,
//! - every subtree is the contiguous range `index..=branch_end(index)`.

use std::cell::Cell;
use std::ops::RangeInclusive;

use rerig_core::Transform;
use rustc_hash::FxHashMap;

use crate::chain::{BoneChain, ResolvedBoneChain};
use crate::description::SkeletonDescription;
use crate::pose::RetargetPose;

#[derive(Debug, Clone, Default)]
pub struct RetargetSkeleton {
    name: String,
    bone_names: Vec<String>,
    parent_indices: Vec<Option<usize>>,
    name_lookup: FxHashMap<String, usize>,

    /// Name of the first chain that contains each bone.
    chain_that_contains_bone: Vec<Option<String>>,

    retarget_pose_name: Option<String>,
    retarget_local_pose: Vec<Transform>,
    retarget_global_pose: Vec<Transform>,

    /// Lazily computed end of each bone's subtree; `None` means not computed yet.
    cached_branch_ends: Vec<Cell<Option<usize>>>,
}

impl RetargetSkeleton {
    /// Builds the skeleton model and its retarget pose.
    ///
    /// # Arguments
    /// * `description`: bones and reference pose
    /// * `chains`: chain definitions, used to tag bones with their owning chain
    /// * `retarget_pose_name`: label of the retarget pose, kept for diagnostics
    /// * `retarget_pose`: optional offsets applied on top of the reference pose
    /// * `retarget_root`: bone that receives the pose's root translation delta
    #[must_use]
    pub fn new(
        description: &SkeletonDescription,
        chains: &[BoneChain],
        retarget_pose_name: Option<&str>,
        retarget_pose: Option<&RetargetPose>,
        retarget_root: Option<&str>,
    ) -> Self {
        let bone_count = description.bone_count();
        let bone_names = description.bone_names().to_vec();

        let mut name_lookup = FxHashMap::default();
        for (index, bone_name) in bone_names.iter().enumerate() {
            name_lookup.entry(bone_name.clone()).or_insert(index);
        }

        let mut skeleton = Self {
            name: description.name().to_string(),
            bone_names,
            parent_indices: description.parent_indices().to_vec(),
            name_lookup,
            chain_that_contains_bone: vec![None; bone_count],
            retarget_pose_name: None,
            retarget_local_pose: Vec::new(),
            retarget_global_pose: Vec::new(),
            cached_branch_ends: vec![Cell::new(None); bone_count],
        };

        // Tag bones with the chain that contains them (first chain wins)
        for chain in chains {
            let resolved = ResolvedBoneChain::resolve(chain, &skeleton);
            if !resolved.is_valid() {
                continue;
            }
            for bone_index in resolved.bone_indices {
                let tag = &mut skeleton.chain_that_contains_bone[bone_index];
                if tag.is_none() {
                    *tag = Some(chain.name.clone());
                }
            }
        }

        skeleton.generate_retarget_pose(
            description.reference_local_pose(),
            retarget_pose_name,
            retarget_pose,
            retarget_root,
        );

        skeleton
    }

    fn generate_retarget_pose(
        &mut self,
        reference_local_pose: &[Transform],
        retarget_pose_name: Option<&str>,
        retarget_pose: Option<&RetargetPose>,
        retarget_root: Option<&str>,
    ) {
        self.retarget_pose_name = retarget_pose_name.map(str::to_string);

        let mut local_pose = reference_local_pose.to_vec();
        let mut global_pose = vec![Transform::IDENTITY; local_pose.len()];
        self.update_global_transforms_below_bone(None, &local_pose, &mut global_pose);

        if let (Some(pose), Some(root_name)) = (retarget_pose, retarget_root) {
            if let Some(root_index) = self.find_bone_index(root_name) {
                global_pose[root_index].translation += pose.root_translation_delta;
                self.update_local_transform_of_single_bone(root_index, &mut local_pose, &global_pose);
            }

            for (bone_name, offset) in &pose.bone_rotation_offsets {
                // Offsets may have been authored against a skeleton with extra bones
                let Some(bone_index) = self.find_bone_index(bone_name) else {
                    log::debug!(
                        "Retarget pose offset for '{bone_name}' ignored, bone not in skeleton '{}'",
                        self.name
                    );
                    continue;
                };
                local_pose[bone_index].rotation =
                    (reference_local_pose[bone_index].rotation * *offset).normalize();
            }

            self.update_global_transforms_below_bone(None, &local_pose, &mut global_pose);
        }

        self.retarget_local_pose = local_pose;
        self.retarget_global_pose = global_pose;
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bone_names.len()
    }

    #[inline]
    #[must_use]
    pub fn bone_name(&self, index: usize) -> Option<&str> {
        self.bone_names.get(index).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn bone_names(&self) -> &[String] {
        &self.bone_names
    }

    #[must_use]
    pub fn find_bone_index(&self, bone_name: &str) -> Option<usize> {
        self.name_lookup.get(bone_name).copied()
    }

    /// Parent of `index`; `None` for roots and out-of-range indices.
    #[inline]
    #[must_use]
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        self.parent_indices.get(index).copied().flatten()
    }

    #[inline]
    #[must_use]
    pub fn parent_indices(&self) -> &[Option<usize>] {
        &self.parent_indices
    }

    #[must_use]
    pub fn chain_that_contains_bone(&self, index: usize) -> Option<&str> {
        self.chain_that_contains_bone.get(index)?.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn retarget_pose_name(&self) -> Option<&str> {
        self.retarget_pose_name.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn retarget_local_pose(&self) -> &[Transform] {
        &self.retarget_local_pose
    }

    #[inline]
    #[must_use]
    pub fn retarget_global_pose(&self) -> &[Transform] {
        &self.retarget_global_pose
    }

    // ========================================================================
    // Pose propagation
    // ========================================================================

    /// Recomputes globals for every descendant of `start` (all bones when `start` is `None`).
    pub fn update_global_transforms_below_bone(
        &self,
        start: Option<usize>,
        local_pose: &[Transform],
        global_pose: &mut [Transform],
    ) {
        for bone_index in self.bones_below(start) {
            self.update_global_transform_of_single_bone(bone_index, local_pose, global_pose);
        }
    }

    /// Recomputes locals for every descendant of `start` (all bones when `start` is `None`).
    pub fn update_local_transforms_below_bone(
        &self,
        start: Option<usize>,
        local_pose: &mut [Transform],
        global_pose: &[Transform],
    ) {
        for bone_index in self.bones_below(start) {
            self.update_local_transform_of_single_bone(bone_index, local_pose, global_pose);
        }
    }

    fn bones_below(&self, start: Option<usize>) -> std::ops::Range<usize> {
        match start {
            Some(index) => index + 1..self.branch_end(index) + 1,
            None => 0..self.bone_count(),
        }
    }

    #[inline]
    pub fn update_global_transform_of_single_bone(
        &self,
        bone_index: usize,
        local_pose: &[Transform],
        global_pose: &mut [Transform],
    ) {
        global_pose[bone_index] = match self.parent_indices[bone_index] {
            // Roots are already in global space
            None => local_pose[bone_index],
            Some(parent) => global_pose[parent] * local_pose[bone_index],
        };
    }

    #[inline]
    pub fn update_local_transform_of_single_bone(
        &self,
        bone_index: usize,
        local_pose: &mut [Transform],
        global_pose: &[Transform],
    ) {
        local_pose[bone_index] = match self.parent_indices[bone_index] {
            None => global_pose[bone_index],
            Some(parent) => global_pose[bone_index].relative_to(&global_pose[parent]),
        };
    }

    /// Global transform the bone would have in the retarget pose under its parent's
    /// transform in `global_pose`.
    #[must_use]
    pub fn global_ref_pose_of_single_bone(&self, bone_index: usize, global_pose: &[Transform]) -> Transform {
        let local = self.retarget_local_pose[bone_index];
        match self.parent_indices[bone_index] {
            None => local,
            Some(parent) => global_pose[parent] * local,
        }
    }

    // ========================================================================
    // Hierarchy queries
    // ========================================================================

    /// Largest bone index inside the subtree rooted at `bone_index`.
    ///
    /// Leaves return their own index. Results are memoized per bone.
    #[must_use]
    pub fn branch_end(&self, bone_index: usize) -> usize {
        if let Some(end) = self.cached_branch_ends[bone_index].get() {
            return end;
        }

        // Past the end of the subtree the next bone hangs off an ancestor (or is a root)
        let end = (bone_index + 1..self.bone_count())
            .take_while(|&index| self.parent_indices[index].is_some_and(|p| p >= bone_index))
            .last()
            .unwrap_or(bone_index);

        self.cached_branch_ends[bone_index].set(Some(end));
        end
    }

    /// All descendants of `bone_index`, in storage order.
    #[must_use]
    pub fn descendants(&self, bone_index: usize) -> RangeInclusive<usize> {
        bone_index + 1..=self.branch_end(bone_index)
    }

    /// Direct children of `bone_index`, in storage order.
    pub fn children(&self, bone_index: usize) -> impl Iterator<Item = usize> + '_ {
        self.descendants(bone_index)
            .filter(move |&index| self.parent_indices[index] == Some(bone_index))
    }

    #[must_use]
    pub fn children_indices(&self, bone_index: usize) -> Vec<usize> {
        self.children(bone_index).collect()
    }

    #[must_use]
    pub fn children_indices_recursive(&self, bone_index: usize) -> Vec<usize> {
        self.descendants(bone_index).collect()
    }

    /// Returns `true` if `potential_parent` is a strict ancestor of `child`.
    #[must_use]
    pub fn is_parent_of_child(&self, potential_parent: usize, child: usize) -> bool {
        let mut parent = self.parent_index(child);
        while let Some(index) = parent {
            if index == potential_parent {
                return true;
            }
            parent = self.parent_index(index);
        }
        false
    }
}
