//! Error Types
//!
//! This module defines the error types used throughout the retargeting engine.
//!
//! # Overview
//!
//! [`RetargetError`] covers every configuration failure that can be detected at
//! initialization time:
//! - Missing top-level assets (skeletons, rig definitions)
//! - Named bones absent from a skeleton
//! - Malformed or degenerate bone chains
//! - Malformed skeleton hierarchies
//!
//! Per-frame execution never produces errors; anything that failed to resolve
//! during initialization is dropped and the output degrades toward the retarget pose.
//!
//! ```rust,ignore
//! use rerig_core::errors::{RetargetError, Result};
//!
//! fn resolve() -> Result<usize> {
//!     Err(RetargetError::MissingBone { bone: "Hips".into(), skeleton: "Mannequin".into() })
//! }
//! ```

use thiserror::Error;

/// The main error type for retargeting setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetargetError {
    // ========================================================================
    // Assets
    // ========================================================================
    /// A prerequisite asset (skeleton, rig definition) was not supplied.
    #[error("Missing asset: {0}")]
    MissingAsset(String),

    // ========================================================================
    // Bones & Chains
    // ========================================================================
    /// A named bone does not exist in the skeleton.
    #[error("Bone '{bone}' not found in skeleton '{skeleton}'")]
    MissingBone {
        /// Name of the bone that was looked up
        bone: String,
        /// Skeleton that was searched
        skeleton: String,
    },

    /// The chain's end bone is neither its start bone nor a descendant of it.
    #[error("Chain '{chain}': end bone '{end}' is not the start bone '{start}' or one of its descendants")]
    MalformedChain {
        chain: String,
        start: String,
        end: String,
    },

    /// The chain's bones sit (almost) on top of each other.
    #[error("Chain '{chain}' is too short to retarget (length {length})")]
    DegenerateChain { chain: String, length: f32 },

    // ========================================================================
    // Hierarchy
    // ========================================================================
    /// Parent indices do not describe a forest.
    #[error("Malformed hierarchy in skeleton '{skeleton}': {reason}")]
    MalformedHierarchy { skeleton: String, reason: String },

    /// The reference pose does not match the bone list.
    #[error("Skeleton '{skeleton}' has {bones} bones but {poses} reference transforms")]
    PoseLengthMismatch {
        skeleton: String,
        bones: usize,
        poses: usize,
    },
}

/// Alias for `Result<T, RetargetError>`.
pub type Result<T> = std::result::Result<T, RetargetError>;
