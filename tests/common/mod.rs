//! Shared fixtures: a biped source skeleton and a half-scale copy with
//! different bone names.
#![allow(dead_code)]

use glam::{Quat, Vec3};

use rerig::retarget::{ChainMapping, ChainSettings, RetargetProcessor, RetargeterAsset, RigDefinition};
use rerig::skeleton::{BoneChain, BoneDesc, SkeletonDescription};
use rerig::Transform;

pub const EPSILON: f32 = 1e-4;

/// Routes the `log` facade to the test output (`RUST_LOG=debug cargo test`).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

/// Rotations match up to sign.
pub fn quat_approx(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

pub fn transforms_approx(a: &[Transform], b: &[Transform]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.abs_diff_eq(y, EPSILON))
}

// ============================================================================
// Skeletons
// ============================================================================

fn biped(name: &str, names: [&str; 8], scale: f32) -> SkeletonDescription {
    let t = |x: f32, y: f32, z: f32| Transform::from_translation(Vec3::new(x, y, z) * scale);
    let [root, pelvis, spine_a, spine_b, head, thigh, calf, foot] = names;

    SkeletonDescription::new(
        name,
        vec![
            BoneDesc::new(root, None, Transform::IDENTITY),
            BoneDesc::new(pelvis, Some(0), t(0.0, 0.0, 100.0)),
            BoneDesc::new(spine_a, Some(1), t(0.0, 0.0, 10.0)),
            BoneDesc::new(spine_b, Some(2), t(0.0, 0.0, 10.0)),
            BoneDesc::new(head, Some(3), t(0.0, 0.0, 20.0)),
            BoneDesc::new(thigh, Some(1), t(10.0, 0.0, -5.0)),
            BoneDesc::new(calf, Some(5), t(0.0, 0.0, -45.0)),
            BoneDesc::new(foot, Some(6), t(0.0, 0.0, -45.0)),
        ],
    )
    .unwrap()
}

/// Source: pelvis at height 100.
pub fn mannequin() -> SkeletonDescription {
    biped(
        "Mannequin",
        ["root", "pelvis", "spine_01", "spine_02", "head", "thigh_l", "calf_l", "foot_l"],
        1.0,
    )
}

/// Target: same shape at half the size, pelvis at height 50.
pub fn mini() -> SkeletonDescription {
    biped(
        "Mini",
        ["Root", "Hips", "Spine", "Chest", "Head", "UpLeg_L", "Leg_L", "Foot_L"],
        0.5,
    )
}

/// [`mini`] with one bone's reference local scale replaced.
pub fn mini_with_scale(bone_name: &str, scale: Vec3) -> SkeletonDescription {
    let reference = mini();
    let bones = reference
        .bone_names()
        .iter()
        .zip(reference.parent_indices())
        .zip(reference.reference_local_pose())
        .map(|((name, parent), local)| {
            let mut local = *local;
            if name == bone_name {
                local.scale = scale;
            }
            BoneDesc::new(name.as_str(), *parent, local)
        })
        .collect();
    SkeletonDescription::new("MiniScaled", bones).unwrap()
}

/// Target with a three-bone spine (`Spine`, `Spine1`, `Chest`).
pub fn long_spine() -> SkeletonDescription {
    let t = |z: f32| Transform::from_translation(Vec3::new(0.0, 0.0, z));
    SkeletonDescription::new(
        "LongSpine",
        vec![
            BoneDesc::new("Root", None, Transform::IDENTITY),
            BoneDesc::new("Hips", Some(0), t(50.0)),
            BoneDesc::new("Spine", Some(1), t(5.0)),
            BoneDesc::new("Spine1", Some(2), t(5.0)),
            BoneDesc::new("Chest", Some(3), t(5.0)),
        ],
    )
    .unwrap()
}

// ============================================================================
// Rigs & Assets
// ============================================================================

pub fn mannequin_rig() -> RigDefinition {
    RigDefinition::new(
        Some("pelvis"),
        vec![
            BoneChain::new("Spine", "spine_01", "spine_02"),
            BoneChain::new("Head", "head", "head"),
            BoneChain::new("LeftLeg", "thigh_l", "foot_l"),
        ],
    )
}

pub fn mini_rig() -> RigDefinition {
    RigDefinition::new(
        Some("Hips"),
        vec![
            BoneChain::new("Spine", "Spine", "Chest"),
            BoneChain::new("Head", "Head", "Head"),
            BoneChain::new("LeftLeg", "UpLeg_L", "Foot_L"),
        ],
    )
}

pub fn biped_asset() -> RetargeterAsset {
    RetargeterAsset {
        source_rig: Some(mannequin_rig()),
        target_rig: Some(mini_rig()),
        chain_mapping: vec![
            ChainMapping::new(Some("Spine"), "Spine"),
            ChainMapping::new(Some("Head"), "Head"),
            ChainMapping::new(Some("LeftLeg"), "LeftLeg"),
        ],
        ..RetargeterAsset::default()
    }
}

/// Asset mapping the source spine onto [`long_spine`] with the given chain settings.
pub fn long_spine_asset(settings: ChainSettings) -> RetargeterAsset {
    RetargeterAsset {
        source_rig: Some(mannequin_rig()),
        target_rig: Some(RigDefinition::new(
            Some("Hips"),
            vec![BoneChain::new("Spine", "Spine", "Chest")],
        )),
        chain_mapping: vec![ChainMapping::new(Some("Spine"), "Spine").with_settings(settings)],
        ..RetargeterAsset::default()
    }
}

pub fn biped_processor() -> RetargetProcessor {
    init_logging();
    let mut processor = RetargetProcessor::new();
    let report = processor.initialize(Some(&mannequin()), Some(&mini()), &biped_asset(), true);
    assert!(report.is_functional());
    processor
}

// ============================================================================
// Poses
// ============================================================================

pub fn globals_from_locals(description: &SkeletonDescription, locals: &[Transform]) -> Vec<Transform> {
    let mut globals = locals.to_vec();
    for (index, parent) in description.parent_indices().iter().enumerate() {
        if let Some(parent) = *parent {
            globals[index] = globals[parent] * locals[index];
        }
    }
    globals
}

pub fn reference_globals(description: &SkeletonDescription) -> Vec<Transform> {
    globals_from_locals(description, description.reference_local_pose())
}

/// Reference pose with the named bones' local rotations replaced.
pub fn posed_globals(description: &SkeletonDescription, rotations: &[(&str, Quat)]) -> Vec<Transform> {
    let mut locals = description.reference_local_pose().to_vec();
    for (bone, rotation) in rotations {
        let index = description.find_bone_index(bone).unwrap();
        locals[index].rotation = *rotation;
    }
    globals_from_locals(description, &locals)
}

pub fn bone(description: &SkeletonDescription, name: &str) -> usize {
    description.find_bone_index(name).unwrap()
}
