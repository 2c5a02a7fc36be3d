//! Retarget Processor
//!
//! [`RetargetProcessor`] owns both skeletons, the root retargeter and every FK
//! chain pair. It is set up once with [`RetargetProcessor::initialize`] and then
//! run every frame with [`RetargetProcessor::run_retargeter`].
//!
//! Initialization is tolerant: anything that fails to resolve (a missing root, a
//! chain whose bones do not exist) is logged and dropped, and the processor still
//! runs with whatever remains. Bones nothing drives stay in the target retarget
//! pose.
//!
//! # Frame Stages
//!
//! 1. Reset the output to the target retarget pose
//! 2. Root: encode the source root, decode onto the target root, re-pose the
//!    root's descendants
//! 3. FK: encode/decode every chain pair (ordered parent chains first), then
//!    re-pose every bone no chain owns
//! 4. IK and pole-vector matching: extension points, currently empty

use rerig_core::{LogCode, RetargetLog, Transform};
use rerig_skeleton::{RetargetSkeleton, SkeletonDescription, TargetSkeleton};
use rustc_hash::FxHashMap;

use crate::asset::{RetargeterAsset, RigDefinition};
use crate::chain_pair::ChainPairFk;
use crate::root::RootRetargeter;
use crate::settings::{ChainSettings, GlobalSettings, RootSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessorState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
}

/// Outcome of [`RetargetProcessor::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitReport {
    /// All prerequisite assets were present and the processor is ready to run.
    pub initialized: bool,
    /// Both retarget roots resolved.
    pub roots_initialized: bool,
    /// At least one chain pair resolved on both skeletons.
    pub at_least_one_valid_chain_pair: bool,
}

impl InitReport {
    /// `true` when running the processor will move at least some bones.
    #[must_use]
    pub fn is_functional(&self) -> bool {
        self.initialized && (self.roots_initialized || self.at_least_one_valid_chain_pair)
    }
}

#[derive(Debug, Default)]
pub struct RetargetProcessor {
    state: ProcessorState,
    report: InitReport,

    source_skeleton: RetargetSkeleton,
    target_skeleton: TargetSkeleton,

    root_retargeter: RootRetargeter,
    chain_pairs_fk: Vec<ChainPairFk>,
    global_settings: GlobalSettings,

    log: RetargetLog,
}

impl RetargetProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Builds the retargeter from two skeletons and an asset.
    ///
    /// Previous state and log entries are discarded. With `suppress_warnings` the
    /// log still records every entry but only errors reach the `log` facade.
    pub fn initialize(
        &mut self,
        source: Option<&SkeletonDescription>,
        target: Option<&SkeletonDescription>,
        asset: &RetargeterAsset,
        suppress_warnings: bool,
    ) -> InitReport {
        self.state = ProcessorState::Initializing;
        self.report = InitReport::default();
        self.log.clear();
        self.log.set_suppress_warnings(suppress_warnings);

        self.source_skeleton = RetargetSkeleton::default();
        self.target_skeleton = TargetSkeleton::default();
        self.chain_pairs_fk.clear();
        self.root_retargeter = RootRetargeter::new(asset.root_settings);
        self.global_settings = asset.global_settings;

        let Some((source, target, source_rig, target_rig)) = self.check_prerequisites(source, target, asset) else {
            self.state = ProcessorState::Uninitialized;
            return self.report;
        };

        self.source_skeleton = RetargetSkeleton::new(
            source,
            &source_rig.chains,
            asset.source_retarget_pose.as_ref().map(|pose| pose.name.as_str()),
            asset.source_retarget_pose.as_ref(),
            source_rig.retarget_root.as_deref(),
        );
        self.target_skeleton = TargetSkeleton::new(
            target,
            &target_rig.chains,
            asset.target_retarget_pose.as_ref().map(|pose| pose.name.as_str()),
            asset.target_retarget_pose.as_ref(),
            target_rig.retarget_root.as_deref(),
        );

        self.report.roots_initialized = self.initialize_roots(source_rig, target_rig);
        self.report.at_least_one_valid_chain_pair = self.initialize_bone_chain_pairs(asset, source_rig, target_rig);

        if !self.report.at_least_one_valid_chain_pair {
            self.log.warning(
                LogCode::NoMappedChains,
                format!(
                    "No chains of '{}' could be mapped onto '{}'; only the root will be retargeted",
                    self.source_skeleton.name(),
                    self.target_skeleton.skeleton().name()
                ),
            );
        }

        if self.report.roots_initialized && self.report.at_least_one_valid_chain_pair {
            self.log.info(
                LogCode::SuccessfulInit,
                format!(
                    "Retargeter ready: '{}' -> '{}' with {} chain(s)",
                    self.source_skeleton.name(),
                    self.target_skeleton.skeleton().name(),
                    self.chain_pairs_fk.len()
                ),
            );
        }

        self.report.initialized = true;
        self.state = ProcessorState::Ready;
        self.report
    }

    fn check_prerequisites<'a>(
        &mut self,
        source: Option<&'a SkeletonDescription>,
        target: Option<&'a SkeletonDescription>,
        asset: &'a RetargeterAsset,
    ) -> Option<(
        &'a SkeletonDescription,
        &'a SkeletonDescription,
        &'a RigDefinition,
        &'a RigDefinition,
    )> {
        if source.is_none() {
            self.log
                .error(LogCode::MissingSourceSkeleton, "No source skeleton supplied");
        }
        if target.is_none() {
            self.log
                .error(LogCode::MissingTargetSkeleton, "No target skeleton supplied");
        }
        if asset.source_rig.is_none() {
            self.log
                .error(LogCode::MissingSourceRig, "Retargeter asset has no source rig");
        }
        if asset.target_rig.is_none() {
            self.log
                .error(LogCode::MissingTargetRig, "Retargeter asset has no target rig");
        }

        Some((source?, target?, asset.source_rig.as_ref()?, asset.target_rig.as_ref()?))
    }

    fn initialize_roots(&mut self, source_rig: &RigDefinition, target_rig: &RigDefinition) -> bool {
        let source_root = source_rig.retarget_root.as_deref();
        let source_ok = match self
            .root_retargeter
            .initialize_source(source_root, &self.source_skeleton, &mut self.log)
        {
            Ok(()) => true,
            Err(err) => {
                self.log.warning(
                    LogCode::MissingSourceRoot,
                    format!("Source retarget root could not be initialized: {err}"),
                );
                false
            }
        };

        let target_root = target_rig.retarget_root.as_deref();
        let target_ok = match self
            .root_retargeter
            .initialize_target(target_root, self.target_skeleton.skeleton())
        {
            Ok(()) => true,
            Err(err) => {
                self.log.warning(
                    LogCode::MissingTargetRoot,
                    format!("Target retarget root could not be initialized: {err}"),
                );
                false
            }
        };

        source_ok && target_ok
    }

    fn initialize_bone_chain_pairs(
        &mut self,
        asset: &RetargeterAsset,
        source_rig: &RigDefinition,
        target_rig: &RigDefinition,
    ) -> bool {
        for mapping in &asset.chain_mapping {
            let Some(target_chain) = target_rig.chain_by_name(&mapping.target_chain) else {
                self.log.warning(
                    LogCode::MissingTargetChain,
                    format!("Mapped target chain '{}' is not defined in the target rig", mapping.target_chain),
                );
                continue;
            };

            // Unmapped rows are allowed
            let Some(source_chain_name) = mapping.source_chain.as_deref() else {
                continue;
            };

            let Some(source_chain) = source_rig.chain_by_name(source_chain_name) else {
                self.log.warning(
                    LogCode::MissingSourceChain,
                    format!(
                        "Source chain '{source_chain_name}' mapped onto '{}' is not defined in the source rig",
                        mapping.target_chain
                    ),
                );
                continue;
            };

            if let Ok(pair) = ChainPairFk::new(
                source_chain,
                target_chain,
                mapping.settings,
                &self.source_skeleton,
                self.target_skeleton.skeleton(),
                &mut self.log,
            ) {
                self.chain_pairs_fk.push(pair);
            }

            if mapping.settings.ik.enable_ik {
                log::debug!(
                    "IK requested on chain '{}' but no IK solver is available; FK only",
                    mapping.target_chain
                );
            }
        }

        // Parent chains must be decoded before their children
        self.chain_pairs_fk.sort_by(|a, b| {
            a.target_bone_indices()[0]
                .cmp(&b.target_bone_indices()[0])
                .then_with(|| a.target_chain_name().cmp(b.target_chain_name()))
        });

        for pair in &self.chain_pairs_fk {
            for &bone_index in pair.target_bone_indices() {
                self.target_skeleton.set_bone_is_retargeted(bone_index, true);
            }
        }

        // Needs every chain flagged so the walk stops at other chains
        let retarget_root = self.root_retargeter.target.bone_index;
        for pair in &mut self.chain_pairs_fk {
            let chain_root = pair.target_bone_indices()[0];
            pair.decoder_mut()
                .initialize_intermediate_parent_indices(retarget_root, chain_root, &self.target_skeleton);
        }

        if self.report.roots_initialized {
            if let Some(root_index) = retarget_root {
                self.target_skeleton.set_bone_is_retargeted(root_index, true);
            }
        }

        !self.chain_pairs_fk.is_empty()
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Retargets one frame of source global transforms onto the target.
    ///
    /// The returned pose is always complete: stages that are disabled or failed to
    /// initialize leave their bones in the target retarget pose.
    pub fn run_retargeter(
        &mut self,
        source_global_pose: &[Transform],
        curves: &FxHashMap<String, f32>,
        delta_time: f32,
    ) -> &[Transform] {
        self.target_skeleton.reset_output_pose();

        if self.state != ProcessorState::Ready {
            return self.target_skeleton.output_global_pose();
        }

        if source_global_pose.len() != self.source_skeleton.bone_count() {
            log::warn!(
                "Source pose has {} transforms but skeleton '{}' has {} bones; frame skipped",
                source_global_pose.len(),
                self.source_skeleton.name(),
                self.source_skeleton.bone_count()
            );
            return self.target_skeleton.output_global_pose();
        }

        let run_chains = self.report.at_least_one_valid_chain_pair;

        if self.global_settings.enable_root && self.report.roots_initialized {
            self.run_root_retarget(source_global_pose);
            self.target_skeleton
                .update_output_below_bone(self.root_retargeter.target.bone_index);
        }

        if self.global_settings.enable_fk && run_chains {
            self.run_fk_retarget(source_global_pose);
            self.target_skeleton
                .update_global_transforms_all_non_retargeted_bones();
        }

        if self.global_settings.enable_ik && run_chains {
            self.run_ik_retarget(curves, delta_time);
        }

        if self.global_settings.enable_fk && run_chains {
            self.run_pole_vector_matching();
        }

        self.target_skeleton.output_global_pose()
    }

    fn run_root_retarget(&mut self, source_global_pose: &[Transform]) {
        self.root_retargeter.encode_pose(source_global_pose);
        let (_, output) = self.target_skeleton.split_mut();
        self.root_retargeter.decode_pose(output);
    }

    fn run_fk_retarget(&mut self, source_global_pose: &[Transform]) {
        let (target_skeleton, output) = self.target_skeleton.split_mut();
        for pair in &mut self.chain_pairs_fk {
            pair.run(
                &self.root_retargeter,
                &self.source_skeleton,
                source_global_pose,
                target_skeleton,
                output,
            );
        }
    }

    /// Extension point for an IK solver; the engine ships without one.
    #[allow(clippy::unused_self)]
    fn run_ik_retarget(&mut self, _curves: &FxHashMap<String, f32>, _delta_time: f32) {}

    /// Extension point for pole-vector matching; the engine ships without it.
    #[allow(clippy::unused_self)]
    fn run_pole_vector_matching(&mut self) {}

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn state(&self) -> ProcessorState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state == ProcessorState::Ready
    }

    #[inline]
    #[must_use]
    pub fn report(&self) -> InitReport {
        self.report
    }

    #[inline]
    #[must_use]
    pub fn log(&self) -> &RetargetLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut RetargetLog {
        &mut self.log
    }

    #[inline]
    #[must_use]
    pub fn source_skeleton(&self) -> &RetargetSkeleton {
        &self.source_skeleton
    }

    #[inline]
    #[must_use]
    pub fn target_skeleton(&self) -> &TargetSkeleton {
        &self.target_skeleton
    }

    #[inline]
    #[must_use]
    pub fn root_retargeter(&self) -> &RootRetargeter {
        &self.root_retargeter
    }

    #[inline]
    #[must_use]
    pub fn chain_pairs(&self) -> &[ChainPairFk] {
        &self.chain_pairs_fk
    }

    /// Last output pose (the target retarget pose before the first run).
    #[inline]
    #[must_use]
    pub fn output_pose(&self) -> &[Transform] {
        self.target_skeleton.output_global_pose()
    }

    #[inline]
    #[must_use]
    pub fn global_settings(&self) -> &GlobalSettings {
        &self.global_settings
    }

    pub fn global_settings_mut(&mut self) -> &mut GlobalSettings {
        &mut self.global_settings
    }

    #[inline]
    #[must_use]
    pub fn root_settings(&self) -> &RootSettings {
        &self.root_retargeter.settings
    }

    pub fn root_settings_mut(&mut self) -> &mut RootSettings {
        &mut self.root_retargeter.settings
    }

    /// Settings of the chain pair driving `target_chain`, if it was mapped.
    pub fn chain_settings_mut(&mut self, target_chain: &str) -> Option<&mut ChainSettings> {
        self.chain_pairs_fk
            .iter_mut()
            .find(|pair| pair.target_chain_name() == target_chain)
            .map(|pair| &mut pair.settings)
    }
}
