//! FK Chain Retargeting
//!
//! A chain pair runs in two halves:
//!
//! - [`ChainEncoderFk`] samples the source chain's current global transforms and
//!   re-expresses them relative to the *target* chain's parent.
//! - [`ChainDecoderFk`] maps each target bone onto the encoded source chain
//!   (according to [`RotationMode`](crate::settings::RotationMode)), carries over
//!   the rotation delta from the retarget pose, and writes the output pose.
//!
//! Both halves share [`ChainFk`]: the resolved bone indices, the retarget-pose
//! transforms and the normalized position of every bone along the chain.

mod decoder;
mod encoder;

pub use decoder::{ChainDecoderFk, transform_at_param};
pub use encoder::ChainEncoderFk;

use rerig_core::math::KINDA_SMALL_NUMBER;
use rerig_core::{LogCode, Result, RetargetError, RetargetLog, Transform};
use rerig_skeleton::RetargetSkeleton;

/// Retarget-pose data of one resolved chain.
#[derive(Debug, Clone, Default)]
pub struct ChainFk {
    pub(crate) bone_indices: Vec<usize>,

    pub(crate) initial_global_transforms: Vec<Transform>,
    pub(crate) initial_local_transforms: Vec<Transform>,
    pub(crate) current_global_transforms: Vec<Transform>,

    /// Normalized arc length of each bone along the chain, `0.0..=1.0`.
    pub(crate) params: Vec<f32>,

    pub(crate) chain_parent_bone_index: Option<usize>,
    pub(crate) chain_parent_initial_global_transform: Transform,
}

impl ChainFk {
    /// Captures the chain's retarget pose and measures it.
    ///
    /// # Errors
    /// [`RetargetError::DegenerateChain`] when the chain has more than one bone but
    /// (nearly) zero total length, since no parameterization exists for it.
    pub fn new(
        chain_name: &str,
        skeleton: &RetargetSkeleton,
        bone_indices: &[usize],
        initial_global_pose: &[Transform],
        log: &mut RetargetLog,
    ) -> Result<Self> {
        let Some(&first_bone) = bone_indices.first() else {
            return Err(RetargetError::DegenerateChain {
                chain: chain_name.to_string(),
                length: 0.0,
            });
        };

        let initial_global_transforms: Vec<Transform> =
            bone_indices.iter().map(|&index| initial_global_pose[index]).collect();

        let chain_parent_bone_index = skeleton.parent_index(first_bone);
        let chain_parent_initial_global_transform =
            chain_parent_bone_index.map_or(Transform::IDENTITY, |parent| initial_global_pose[parent]);

        let mut initial_local_transforms = vec![Transform::IDENTITY; bone_indices.len()];
        Self::fill_transforms_with_local_space_of_chain(
            skeleton,
            initial_global_pose,
            bone_indices,
            &mut initial_local_transforms,
        );

        let params = calculate_params(chain_name, &initial_global_transforms, log)?;

        Ok(Self {
            bone_indices: bone_indices.to_vec(),
            current_global_transforms: initial_global_transforms.clone(),
            initial_global_transforms,
            initial_local_transforms,
            params,
            chain_parent_bone_index,
            chain_parent_initial_global_transform,
        })
    }

    /// Writes each chain bone's transform relative to its parent in `global_pose`.
    ///
    /// Root bones (no parent) keep their global transform.
    pub fn fill_transforms_with_local_space_of_chain(
        skeleton: &RetargetSkeleton,
        global_pose: &[Transform],
        bone_indices: &[usize],
        out_local_transforms: &mut [Transform],
    ) {
        for (out, &bone_index) in out_local_transforms.iter_mut().zip(bone_indices) {
            *out = match skeleton.parent_index(bone_index) {
                None => global_pose[bone_index],
                Some(parent) => global_pose[bone_index].relative_to(&global_pose[parent]),
            };
        }
    }

    /// Poses the whole chain in its retarget pose, hung off the chain parent's
    /// current transform, and writes it to `global_pose`.
    pub fn put_current_transforms_in_ref_pose(&mut self, skeleton: &RetargetSkeleton, global_pose: &mut [Transform]) {
        let local_pose = skeleton.retarget_local_pose();
        let mut previous: Option<Transform> = None;

        for (current, &bone_index) in self.current_global_transforms.iter_mut().zip(&self.bone_indices) {
            *current = match previous {
                None => skeleton.global_ref_pose_of_single_bone(bone_index, global_pose),
                Some(parent) => parent * local_pose[bone_index],
            };
            global_pose[bone_index] = *current;
            previous = Some(*current);
        }
    }

    #[inline]
    #[must_use]
    pub fn bone_indices(&self) -> &[usize] {
        &self.bone_indices
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &[f32] {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn initial_global_transforms(&self) -> &[Transform] {
        &self.initial_global_transforms
    }

    #[inline]
    #[must_use]
    pub fn initial_local_transforms(&self) -> &[Transform] {
        &self.initial_local_transforms
    }

    #[inline]
    #[must_use]
    pub fn current_global_transforms(&self) -> &[Transform] {
        &self.current_global_transforms
    }

    #[inline]
    #[must_use]
    pub fn chain_parent_bone_index(&self) -> Option<usize> {
        self.chain_parent_bone_index
    }
}

fn calculate_params(chain_name: &str, initial_global_transforms: &[Transform], log: &mut RetargetLog) -> Result<Vec<f32>> {
    if initial_global_transforms.len() == 1 {
        return Ok(vec![1.0]);
    }

    let mut cumulative = Vec::with_capacity(initial_global_transforms.len());
    let mut total_length = 0.0;
    cumulative.push(0.0);
    for pair in initial_global_transforms.windows(2) {
        total_length += pair[1].translation.distance(pair[0].translation);
        cumulative.push(total_length);
    }

    if total_length <= KINDA_SMALL_NUMBER {
        log.warning(
            LogCode::TinyBoneChain,
            format!("Chain '{chain_name}' has bones with zero total length and cannot be retargeted"),
        );
        return Err(RetargetError::DegenerateChain {
            chain: chain_name.to_string(),
            length: total_length,
        });
    }

    Ok(cumulative.into_iter().map(|length| length / total_length).collect())
}
