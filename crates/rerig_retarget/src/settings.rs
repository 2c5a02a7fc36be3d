//! Retarget Settings
//!
//! Tunables for the three stages of the retargeter. Every type here is a plain
//! serde value with sensible defaults, so a settings block can be omitted from a
//! JSON asset entirely or only partially specified.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rerig_retarget::settings::{ChainSettings, FkChainSettings, RotationMode, TranslationMode};
//!
//! // Copy the source chain bone by bone and carry over scaled translation
//! let settings = ChainSettings {
//!     fk: FkChainSettings {
//!         rotation_mode: RotationMode::OneToOne,
//!         translation_mode: TranslationMode::GloballyScaled,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Global
// ---------------------------------------------------------------------------

/// Whole-processor stage toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    /// Run the root stage (pelvis translation and rotation).
    pub enable_root: bool,
    /// Run the FK chain stage.
    pub enable_fk: bool,
    /// Run the IK stage. No IK solver ships with the engine, so this only gates
    /// the (empty) IK and pole-vector passes.
    pub enable_ik: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            enable_root: true,
            enable_fk: true,
            enable_ik: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// Controls how the source root motion is mapped onto the target root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSettings {
    /// Blend from the target's initial root rotation (0) to the retargeted one (1).
    pub rotation_alpha: f32,
    /// Blend from the target's initial root position (0) to the retargeted one (1).
    pub translation_alpha: f32,
    /// Blend the height-normalized position toward the raw source position.
    pub blend_to_source: f32,
    /// Per-axis weights applied to `blend_to_source`.
    pub blend_to_source_weights: Vec3,
    /// Scales horizontal (X/Y) motion relative to the initial position.
    pub scale_horizontal: f32,
    /// Scales vertical (Z) motion.
    pub scale_vertical: f32,
    /// Added to the root position after scaling.
    pub translation_offset: Vec3,
    /// Applied after the retargeted root rotation.
    pub rotation_offset: Quat,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            rotation_alpha: 1.0,
            translation_alpha: 1.0,
            blend_to_source: 0.0,
            blend_to_source_weights: Vec3::ONE,
            scale_horizontal: 1.0,
            scale_vertical: 1.0,
            translation_offset: Vec3::ZERO,
            rotation_offset: Quat::IDENTITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Chains
// ---------------------------------------------------------------------------

/// How a target chain picks the source rotation each of its bones follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationMode {
    /// Sample the source chain at each target bone's normalized position along
    /// the chain. Works for chains with different bone counts.
    #[default]
    Interpolated,
    /// Bone `i` follows source bone `i`; surplus target bones follow the last
    /// source bone.
    OneToOne,
    /// Chains are aligned at their tips; surplus target bones at the start stay
    /// in the retarget pose.
    OneToOneReversed,
    /// The chain keeps the retarget pose rotations.
    None,
}

/// Where the translation of each target chain bone comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranslationMode {
    /// Keep the retarget pose local offsets.
    #[default]
    None,
    /// Source global translation scaled by the root height ratio.
    GloballyScaled,
    /// Source global translation, unchanged.
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FkChainSettings {
    pub enable_fk: bool,
    pub rotation_mode: RotationMode,
    /// Blend from the retarget pose (0) to the retargeted local rotation (1).
    pub rotation_alpha: f32,
    pub translation_mode: TranslationMode,
    /// Blend from the retarget pose (0) to the retargeted local translation (1).
    pub translation_alpha: f32,
}

impl Default for FkChainSettings {
    fn default() -> Self {
        Self {
            enable_fk: true,
            rotation_mode: RotationMode::Interpolated,
            rotation_alpha: 1.0,
            translation_mode: TranslationMode::None,
            translation_alpha: 1.0,
        }
    }
}

impl FkChainSettings {
    /// `true` when either alpha asks for a partial blend toward the retarget pose.
    #[must_use]
    pub fn needs_blend(&self) -> bool {
        !rerig_core::math::is_nearly_equal(self.rotation_alpha, 1.0)
            || !rerig_core::math::is_nearly_equal(self.translation_alpha, 1.0)
    }
}

/// Per-chain IK options. Kept so assets round-trip; no solver consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IkChainSettings {
    pub enable_ik: bool,
}

/// Settings for one mapped chain pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub fk: FkChainSettings,
    pub ik: IkChainSettings,
}
