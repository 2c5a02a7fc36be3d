//! Skeleton Description
//!
//! The immutable input every retargeting skeleton is built from: bone names,
//! parent links and the reference (bind) pose in local space.
//!
//! # Ordering
//!
//! All hierarchy algorithms in this crate are single forward/backward passes over
//! the bone array, which requires that
//! - every parent is stored before its children, and
//! - every subtree occupies a contiguous index range (depth-first order).
//!
//! [`SkeletonDescription::new`] checks both properties and, when the input does not
//! satisfy them, reorders bones into depth-first pre-order. The input position of
//! each stored bone stays available through [`SkeletonDescription::input_index`]
//! so that callers can remap externally produced poses.

use rerig_core::{Result, RetargetError, Transform};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One bone of a skeleton description.
///
/// `parent` indexes into the bone list the description is constructed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneDesc {
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub reference_local: Transform,
}

impl BoneDesc {
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<usize>, reference_local: Transform) -> Self {
        Self {
            name: name.into(),
            parent,
            reference_local,
        }
    }
}

/// Serialized form of a [`SkeletonDescription`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonDescriptionData {
    pub name: String,
    pub bones: Vec<BoneDesc>,
}

/// Ordered bone hierarchy plus reference pose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SkeletonDescriptionData", into = "SkeletonDescriptionData")]
pub struct SkeletonDescription {
    name: String,
    bone_names: Vec<String>,
    parent_indices: Vec<Option<usize>>,
    reference_local_pose: Vec<Transform>,
    /// `input_indices[i]` is the position bone `i` had in the constructor input.
    input_indices: Vec<usize>,
    name_lookup: FxHashMap<String, usize>,
}

impl SkeletonDescription {
    /// Builds a description, reordering bones depth-first when necessary.
    pub fn new(name: impl Into<String>, bones: Vec<BoneDesc>) -> Result<Self> {
        let name = name.into();
        let parents: Vec<Option<usize>> = bones.iter().map(|b| b.parent).collect();

        validate_parent_links(&name, &parents)?;

        let order = if is_depth_first(&parents) {
            (0..bones.len()).collect()
        } else {
            log::debug!("Skeleton '{name}' is not in depth-first order, reordering bones");
            depth_first_order(&name, &parents)?
        };

        let mut new_index_of = vec![0; bones.len()];
        for (new_index, &old_index) in order.iter().enumerate() {
            new_index_of[old_index] = new_index;
        }

        let mut bone_names = Vec::with_capacity(bones.len());
        let mut parent_indices = Vec::with_capacity(bones.len());
        let mut reference_local_pose = Vec::with_capacity(bones.len());
        for &old_index in &order {
            let bone = &bones[old_index];
            bone_names.push(bone.name.clone());
            parent_indices.push(bone.parent.map(|p| new_index_of[p]));
            reference_local_pose.push(bone.reference_local);
        }

        let mut name_lookup = FxHashMap::default();
        for (index, bone_name) in bone_names.iter().enumerate() {
            // First occurrence wins for duplicated names
            name_lookup.entry(bone_name.clone()).or_insert(index);
        }

        Ok(Self {
            name,
            bone_names,
            parent_indices,
            reference_local_pose,
            input_indices: order,
            name_lookup,
        })
    }

    /// Builds a description from parallel arrays of names, parents and reference transforms.
    pub fn from_parts(
        name: impl Into<String>,
        bone_names: Vec<String>,
        parent_indices: Vec<Option<usize>>,
        reference_local_pose: Vec<Transform>,
    ) -> Result<Self> {
        let name = name.into();
        if bone_names.len() != parent_indices.len() {
            return Err(RetargetError::MalformedHierarchy {
                skeleton: name,
                reason: format!(
                    "{} bone names but {} parent indices",
                    bone_names.len(),
                    parent_indices.len()
                ),
            });
        }
        if bone_names.len() != reference_local_pose.len() {
            return Err(RetargetError::PoseLengthMismatch {
                skeleton: name,
                bones: bone_names.len(),
                poses: reference_local_pose.len(),
            });
        }

        let bones = bone_names
            .into_iter()
            .zip(parent_indices)
            .zip(reference_local_pose)
            .map(|((name, parent), local)| BoneDesc::new(name, parent, local))
            .collect();

        Self::new(name, bones)
    }

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
    pub fn bone_names(&self) -> &[String] {
        &self.bone_names
    }

    #[inline]
    #[must_use]
    pub fn parent_indices(&self) -> &[Option<usize>] {
        &self.parent_indices
    }

    #[inline]
    #[must_use]
    pub fn reference_local_pose(&self) -> &[Transform] {
        &self.reference_local_pose
    }

    #[must_use]
    pub fn find_bone_index(&self, bone_name: &str) -> Option<usize> {
        self.name_lookup.get(bone_name).copied()
    }

    /// Position the bone at `index` had in the constructor input.
    #[inline]
    #[must_use]
    pub fn input_index(&self, index: usize) -> usize {
        self.input_indices[index]
    }

    /// Returns `true` if construction did not need to reorder the input.
    #[must_use]
    pub fn kept_input_order(&self) -> bool {
        self.input_indices.iter().enumerate().all(|(i, &input)| i == input)
    }

    /// Reorders a pose given in constructor-input order into this description's order.
    #[must_use]
    pub fn reorder_input_pose(&self, input_pose: &[Transform]) -> Vec<Transform> {
        self.input_indices
            .iter()
            .map(|&input| input_pose.get(input).copied().unwrap_or_default())
            .collect()
    }
}

impl TryFrom<SkeletonDescriptionData> for SkeletonDescription {
    type Error = RetargetError;

    fn try_from(data: SkeletonDescriptionData) -> Result<Self> {
        Self::new(data.name, data.bones)
    }
}

impl From<SkeletonDescription> for SkeletonDescriptionData {
    fn from(description: SkeletonDescription) -> Self {
        let bones = description
            .bone_names
            .into_iter()
            .zip(description.parent_indices)
            .zip(description.reference_local_pose)
            .map(|((name, parent), local)| BoneDesc::new(name, parent, local))
            .collect();

        Self {
            name: description.name,
            bones,
        }
    }
}

// ============================================================================
// Ordering
// ============================================================================

fn validate_parent_links(skeleton: &str, parents: &[Option<usize>]) -> Result<()> {
    for (index, parent) in parents.iter().enumerate() {
        match *parent {
            Some(p) if p >= parents.len() => {
                return Err(RetargetError::MalformedHierarchy {
                    skeleton: skeleton.to_string(),
                    reason: format!("bone {index} references parent {p}, out of range"),
                });
            }
            Some(p) if p == index => {
                return Err(RetargetError::MalformedHierarchy {
                    skeleton: skeleton.to_string(),
                    reason: format!("bone {index} is its own parent"),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Checks that every parent precedes its children and subtrees are contiguous.
///
/// Walks the array keeping the current root-to-bone path on a stack: a bone's parent
/// must be on that path, otherwise a previously closed subtree would be reopened.
pub(crate) fn is_depth_first(parents: &[Option<usize>]) -> bool {
    let mut path: Vec<usize> = Vec::new();
    for (index, parent) in parents.iter().enumerate() {
        match *parent {
            None => path.clear(),
            Some(p) => {
                while path.last().is_some_and(|&top| top != p) {
                    path.pop();
                }
                if path.is_empty() {
                    return false;
                }
            }
        }
        path.push(index);
    }
    true
}

/// Depth-first pre-order of the forest, siblings kept in input order.
fn depth_first_order(skeleton: &str, parents: &[Option<usize>]) -> Result<Vec<usize>> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); parents.len()];
    let mut roots = Vec::new();
    for (index, parent) in parents.iter().enumerate() {
        match *parent {
            Some(p) => children[p].push(index),
            None => roots.push(index),
        }
    }

    let mut order = Vec::with_capacity(parents.len());
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(index) = stack.pop() {
        order.push(index);
        stack.extend(children[index].iter().rev());
    }

    // Bones unreachable from any root sit on a cycle
    if order.len() != parents.len() {
        return Err(RetargetError::MalformedHierarchy {
            skeleton: skeleton.to_string(),
            reason: format!(
                "{} bones are not reachable from a root (cyclic parent links)",
                parents.len() - order.len()
            ),
        });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_first_detection() {
        assert!(is_depth_first(&[None, Some(0), Some(1), Some(0)]));
        // Breadth-first order: bone 3 reopens the subtree of bone 1
        assert!(!is_depth_first(&[None, Some(0), Some(0), Some(1)]));
        // Forward reference
        assert!(!is_depth_first(&[Some(1), None]));
        // Multiple roots
        assert!(is_depth_first(&[None, Some(0), None, Some(2)]));
    }

    #[test]
    fn cycle_is_rejected() {
        let err = depth_first_order("cyclic", &[None, Some(2), Some(1)]).unwrap_err();
        assert!(matches!(err, RetargetError::MalformedHierarchy { .. }));
    }
}
