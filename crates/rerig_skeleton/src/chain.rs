use rerig_core::{Result, RetargetError};
use serde::{Deserialize, Serialize};

use crate::skeleton::RetargetSkeleton;

/// A named run of bones, from `start_bone` down to `end_bone` (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneChain {
    pub name: String,
    pub start_bone: String,
    pub end_bone: String,
}

impl BoneChain {
    #[must_use]
    pub fn new(name: impl Into<String>, start_bone: impl Into<String>, end_bone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_bone: start_bone.into(),
            end_bone: end_bone.into(),
        }
    }
}

/// A [`BoneChain`] resolved against one skeleton.
///
/// `bone_indices` is ordered root to tip and each entry is the parent of the next.
/// The flags are kept even when resolution fails so callers can report why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedBoneChain {
    pub found_start_bone: bool,
    pub found_end_bone: bool,
    pub end_is_start_or_child_of_start: bool,
    pub bone_indices: Vec<usize>,
}

impl ResolvedBoneChain {
    #[must_use]
    pub fn resolve(chain: &BoneChain, skeleton: &RetargetSkeleton) -> Self {
        let start_index = skeleton.find_bone_index(&chain.start_bone);
        let end_index = skeleton.find_bone_index(&chain.end_bone);

        let mut resolved = Self {
            found_start_bone: start_index.is_some(),
            found_end_bone: end_index.is_some(),
            ..Self::default()
        };

        let (Some(start_index), Some(end_index)) = (start_index, end_index) else {
            return resolved;
        };

        // Descendants always come after their ancestors
        if end_index < start_index {
            return resolved;
        }

        if end_index == start_index {
            resolved.end_is_start_or_child_of_start = true;
            resolved.bone_indices.push(end_index);
            return resolved;
        }

        // Walk up from the tip collecting bones until the start bone is reached
        let mut indices = vec![end_index];
        let mut parent = skeleton.parent_index(end_index);
        while let Some(parent_index) = parent {
            if parent_index < start_index {
                break;
            }
            indices.push(parent_index);
            if parent_index == start_index {
                break;
            }
            parent = skeleton.parent_index(parent_index);
        }

        if indices.last() == Some(&start_index) {
            indices.reverse();
            resolved.end_is_start_or_child_of_start = true;
            resolved.bone_indices = indices;
        }

        resolved
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.found_start_bone && self.found_end_bone && self.end_is_start_or_child_of_start
    }

    /// Converts the resolution into its bone list or the first failure.
    pub fn into_result(self, chain: &BoneChain, skeleton_name: &str) -> Result<Vec<usize>> {
        if !self.found_start_bone {
            return Err(RetargetError::MissingBone {
                bone: chain.start_bone.clone(),
                skeleton: skeleton_name.to_string(),
            });
        }
        if !self.found_end_bone {
            return Err(RetargetError::MissingBone {
                bone: chain.end_bone.clone(),
                skeleton: skeleton_name.to_string(),
            });
        }
        if !self.end_is_start_or_child_of_start {
            return Err(RetargetError::MalformedChain {
                chain: chain.name.clone(),
                start: chain.start_bone.clone(),
                end: chain.end_bone.clone(),
            });
        }
        Ok(self.bone_indices)
    }
}
