use rerig_core::{LogCode, Result, RetargetLog, Transform};
use rerig_skeleton::{BoneChain, ResolvedBoneChain, RetargetSkeleton};

use crate::fk::{ChainDecoderFk, ChainEncoderFk};
use crate::root::RootRetargeter;
use crate::settings::ChainSettings;

/// A source chain mapped onto a target chain, with its FK encoder and decoder.
#[derive(Debug, Clone)]
pub struct ChainPairFk {
    pub settings: ChainSettings,

    source_chain_name: String,
    target_chain_name: String,
    source_bone_indices: Vec<usize>,
    target_bone_indices: Vec<usize>,

    encoder: ChainEncoderFk,
    decoder: ChainDecoderFk,
}

impl ChainPairFk {
    /// Resolves both chains and captures their retarget poses.
    ///
    /// Every failure is also written to `log` with its cause code.
    pub fn new(
        source_chain: &BoneChain,
        target_chain: &BoneChain,
        settings: ChainSettings,
        source_skeleton: &RetargetSkeleton,
        target_skeleton: &RetargetSkeleton,
        log: &mut RetargetLog,
    ) -> Result<Self> {
        let source_bone_indices = validate_bone_chain(source_chain, source_skeleton, LogCode::IncompatibleSourceChain, log)?;
        let target_bone_indices = validate_bone_chain(target_chain, target_skeleton, LogCode::IncompatibleTargetChain, log)?;

        let encoder = ChainEncoderFk::new(&source_chain.name, source_skeleton, &source_bone_indices, log)
            .inspect_err(|err| {
                log.warning(
                    LogCode::BadFkEncoder,
                    format!("Could not initialize FK encoder for source chain '{}': {err}", source_chain.name),
                );
            })?;
        let decoder = ChainDecoderFk::new(&target_chain.name, target_skeleton, &target_bone_indices, log)
            .inspect_err(|err| {
                log.warning(
                    LogCode::BadFkDecoder,
                    format!("Could not initialize FK decoder for target chain '{}': {err}", target_chain.name),
                );
            })?;

        Ok(Self {
            settings,
            source_chain_name: source_chain.name.clone(),
            target_chain_name: target_chain.name.clone(),
            source_bone_indices,
            target_bone_indices,
            encoder,
            decoder,
        })
    }

    /// Encodes the source chain and decodes it onto the target pose.
    pub fn run(
        &mut self,
        root: &RootRetargeter,
        source_skeleton: &RetargetSkeleton,
        source_global_pose: &[Transform],
        target_skeleton: &RetargetSkeleton,
        target_global_pose: &mut [Transform],
    ) {
        self.encoder.encode_pose(source_skeleton, source_global_pose);
        self.decoder.decode_pose(
            root,
            &self.settings.fk,
            &mut self.encoder,
            target_skeleton,
            target_global_pose,
        );
    }

    #[inline]
    #[must_use]
    pub fn source_chain_name(&self) -> &str {
        &self.source_chain_name
    }

    #[inline]
    #[must_use]
    pub fn target_chain_name(&self) -> &str {
        &self.target_chain_name
    }

    #[inline]
    #[must_use]
    pub fn source_bone_indices(&self) -> &[usize] {
        &self.source_bone_indices
    }

    #[inline]
    #[must_use]
    pub fn target_bone_indices(&self) -> &[usize] {
        &self.target_bone_indices
    }

    #[inline]
    #[must_use]
    pub fn encoder(&self) -> &ChainEncoderFk {
        &self.encoder
    }

    #[inline]
    #[must_use]
    pub fn decoder(&self) -> &ChainDecoderFk {
        &self.decoder
    }

    pub(crate) fn decoder_mut(&mut self) -> &mut ChainDecoderFk {
        &mut self.decoder
    }
}

fn validate_bone_chain(
    chain: &BoneChain,
    skeleton: &RetargetSkeleton,
    incompatible: LogCode,
    log: &mut RetargetLog,
) -> Result<Vec<usize>> {
    let resolved = ResolvedBoneChain::resolve(chain, skeleton);

    if !resolved.found_start_bone {
        log.warning(
            LogCode::MissingStartBone,
            format!(
                "Start bone '{}' of chain '{}' not found in skeleton '{}'",
                chain.start_bone,
                chain.name,
                skeleton.name()
            ),
        );
    }
    if !resolved.found_end_bone {
        log.warning(
            LogCode::MissingEndBone,
            format!(
                "End bone '{}' of chain '{}' not found in skeleton '{}'",
                chain.end_bone,
                chain.name,
                skeleton.name()
            ),
        );
    }
    if resolved.found_start_bone && resolved.found_end_bone && !resolved.end_is_start_or_child_of_start {
        log.warning(
            LogCode::EndNotChildOfStart,
            format!(
                "End bone '{}' of chain '{}' is not a descendant of start bone '{}'",
                chain.end_bone, chain.name, chain.start_bone
            ),
        );
    }

    if !resolved.is_valid() {
        log.warning(
            incompatible,
            format!("Chain '{}' is not valid on skeleton '{}' and was skipped", chain.name, skeleton.name()),
        );
    }

    resolved.into_result(chain, skeleton.name())
}
