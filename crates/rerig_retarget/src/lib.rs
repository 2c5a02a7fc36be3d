//! Rerig Retarget
//!
//! The retargeting stages and the processor that drives them:
//!
//! - [`RootRetargeter`]: height-normalized root motion transfer
//! - [`fk`]: chain encoder / decoder pairs ([`ChainEncoderFk`], [`ChainDecoderFk`])
//! - [`ChainPairFk`]: a source chain mapped onto a target chain
//! - [`RetargetProcessor`]: initialization and the per-frame pipeline
//! - [`settings`] and [`asset`]: serde configuration

pub mod asset;
pub mod chain_pair;
pub mod fk;
pub mod processor;
pub mod root;
pub mod settings;

pub use asset::{ChainMapping, ChainMappingRow, RetargetConfig, RetargeterAsset, RigDefinition};
pub use chain_pair::ChainPairFk;
pub use fk::{ChainDecoderFk, ChainEncoderFk, ChainFk};
pub use processor::{InitReport, ProcessorState, RetargetProcessor};
pub use root::RootRetargeter;
pub use settings::{
    ChainSettings, FkChainSettings, GlobalSettings, IkChainSettings, RootSettings, RotationMode, TranslationMode,
};
