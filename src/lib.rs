#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Rerig
//!
//! Runtime animation retargeting between skeletons with different proportions,
//! bone counts and naming. Re-exports the workspace crates:
//!
//! - [`core`]: transforms, math helpers, errors and the structured log
//! - [`skeleton`]: skeleton descriptions, retarget poses and bone chains
//! - [`retarget`]: root and FK stages plus the processor

pub use rerig_core as core;
pub use rerig_retarget as retarget;
pub use rerig_skeleton as skeleton;

pub use rerig_core::{LogCode, LogEntry, Quat, RetargetError, RetargetLog, Transform, Vec3};
pub use rerig_retarget::{
    ChainMapping, ChainSettings, FkChainSettings, GlobalSettings, InitReport, ProcessorState, RetargetConfig,
    RetargetProcessor, RetargeterAsset, RigDefinition, RootSettings, RotationMode, TranslationMode,
};
pub use rerig_skeleton::{BoneChain, BoneDesc, RetargetPose, SkeletonDescription};
