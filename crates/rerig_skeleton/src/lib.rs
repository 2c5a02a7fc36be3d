//! Rerig Skeleton
//!
//! Skeleton-side building blocks of the retargeter:
//!
//! - [`SkeletonDescription`]: input bones, parents and reference pose, kept in depth-first order
//! - [`RetargetPose`]: authored offsets on top of the reference pose
//! - [`RetargetSkeleton`]: hierarchy model with local/global propagation and subtree queries
//! - [`TargetSkeleton`]: model plus per-bone retargeted flags and the live output pose
//! - [`BoneChain`] / [`ResolvedBoneChain`]: named chains and their resolution to bone indices

pub mod chain;
pub mod description;
pub mod pose;
pub mod skeleton;
pub mod target;

pub use chain::{BoneChain, ResolvedBoneChain};
pub use description::{BoneDesc, SkeletonDescription, SkeletonDescriptionData};
pub use pose::RetargetPose;
pub use skeleton::RetargetSkeleton;
pub use target::TargetSkeleton;
