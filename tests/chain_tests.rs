//! Bone Chain Tests
//!
//! Tests for:
//! - ResolvedBoneChain resolution and its failure flags
//! - ChainPairFk validation and the log codes it reports
//! - FK chain parameterization through a chain pair

mod common;

use glam::Vec3;

use rerig::retarget::{ChainPairFk, ChainSettings};
use rerig::skeleton::{BoneChain, BoneDesc, ResolvedBoneChain, RetargetSkeleton, SkeletonDescription};
use rerig::{LogCode, RetargetError, RetargetLog, Transform};

use common::{approx, bone, mannequin, mini};

fn skeleton(description: &SkeletonDescription) -> RetargetSkeleton {
    RetargetSkeleton::new(description, &[], None, None, None)
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn resolve_orders_bones_root_to_tip() {
    let description = mannequin();
    let skeleton = skeleton(&description);
    let chain = BoneChain::new("Leg", "thigh_l", "foot_l");

    let resolved = ResolvedBoneChain::resolve(&chain, &skeleton);
    assert!(resolved.is_valid());
    assert_eq!(
        resolved.bone_indices,
        vec![bone(&description, "thigh_l"), bone(&description, "calf_l"), bone(&description, "foot_l")]
    );
}

#[test]
fn resolve_single_bone_chain() {
    let description = mannequin();
    let resolved = ResolvedBoneChain::resolve(&BoneChain::new("Head", "head", "head"), &skeleton(&description));
    assert!(resolved.is_valid());
    assert_eq!(resolved.bone_indices, vec![bone(&description, "head")]);
}

#[test]
fn resolve_reports_missing_bones() {
    let skeleton = skeleton(&mannequin());
    let resolved = ResolvedBoneChain::resolve(&BoneChain::new("Arm", "upperarm_l", "hand_l"), &skeleton);
    assert!(!resolved.found_start_bone);
    assert!(!resolved.found_end_bone);
    assert!(!resolved.is_valid());

    let chain = BoneChain::new("Arm", "upperarm_l", "hand_l");
    let err = resolved.into_result(&chain, skeleton.name()).unwrap_err();
    assert_eq!(
        err,
        RetargetError::MissingBone {
            bone: "upperarm_l".into(),
            skeleton: "Mannequin".into()
        }
    );
}

#[test]
fn resolve_rejects_end_outside_start_subtree() {
    let skeleton = skeleton(&mannequin());

    // Sibling branches
    let across = ResolvedBoneChain::resolve(&BoneChain::new("Bad", "spine_01", "foot_l"), &skeleton);
    assert!(across.found_start_bone && across.found_end_bone);
    assert!(!across.end_is_start_or_child_of_start);
    assert!(across.bone_indices.is_empty());

    // Reversed
    let reversed = ResolvedBoneChain::resolve(&BoneChain::new("Bad", "foot_l", "thigh_l"), &skeleton);
    assert!(!reversed.is_valid());
}

// ============================================================================
// Chain Pair Validation
// ============================================================================

fn pair(
    source_chain: &BoneChain,
    target_chain: &BoneChain,
    log: &mut RetargetLog,
) -> Result<ChainPairFk, RetargetError> {
    let source = skeleton(&mannequin());
    let target = skeleton(&mini());
    ChainPairFk::new(source_chain, target_chain, ChainSettings::default(), &source, &target, log)
}

#[test]
fn chain_pair_resolves_both_sides() {
    let mut log = RetargetLog::new();
    let pair = pair(
        &BoneChain::new("LeftLeg", "thigh_l", "foot_l"),
        &BoneChain::new("LeftLeg", "UpLeg_L", "Foot_L"),
        &mut log,
    )
    .unwrap();

    assert_eq!(pair.source_bone_indices().len(), 3);
    assert_eq!(pair.target_bone_indices().len(), 3);
    assert_eq!(pair.target_chain_name(), "LeftLeg");
    assert!(log.entries().is_empty());

    // Equal thigh and calf lengths put the knee half way
    let params = pair.decoder().chain().params();
    assert!(approx(params[0], 0.0));
    assert!(approx(params[1], 0.5));
    assert!(approx(params[2], 1.0));
}

#[test]
fn chain_pair_logs_missing_start_bone() {
    let mut log = RetargetLog::new();
    let result = pair(
        &BoneChain::new("Arm", "clavicle_l", "foot_l"),
        &BoneChain::new("LeftLeg", "UpLeg_L", "Foot_L"),
        &mut log,
    );

    assert!(result.is_err());
    assert!(log.contains(LogCode::MissingStartBone));
    assert!(log.contains(LogCode::IncompatibleSourceChain));
    assert!(!log.contains(LogCode::MissingEndBone));
    assert!(!log.contains(LogCode::IncompatibleTargetChain));
}

#[test]
fn chain_pair_logs_end_not_child_of_start() {
    let mut log = RetargetLog::new();
    let result = pair(
        &BoneChain::new("LeftLeg", "thigh_l", "foot_l"),
        &BoneChain::new("Broken", "Spine", "Foot_L"),
        &mut log,
    );

    assert!(matches!(result, Err(RetargetError::MalformedChain { .. })));
    assert!(log.contains(LogCode::EndNotChildOfStart));
    assert!(log.contains(LogCode::IncompatibleTargetChain));
}

#[test]
fn chain_pair_rejects_zero_length_chain() {
    // Two bones stacked on the same point
    let stacked = SkeletonDescription::new(
        "Stacked",
        vec![
            BoneDesc::new("root", None, Transform::IDENTITY),
            BoneDesc::new("a", Some(0), Transform::from_translation(Vec3::Z)),
            BoneDesc::new("b", Some(1), Transform::IDENTITY),
        ],
    )
    .unwrap();

    let mut log = RetargetLog::new();
    let source = skeleton(&mannequin());
    let target = skeleton(&stacked);
    let result = ChainPairFk::new(
        &BoneChain::new("Spine", "spine_01", "spine_02"),
        &BoneChain::new("Spine", "a", "b"),
        ChainSettings::default(),
        &source,
        &target,
        &mut log,
    );

    assert!(matches!(result, Err(RetargetError::DegenerateChain { .. })));
    assert!(log.contains(LogCode::TinyBoneChain));
    assert!(log.contains(LogCode::BadFkDecoder));
    assert!(!log.contains(LogCode::BadFkEncoder));
}
