//! Retarget CLI
//!
//! Retargets a procedural walk cycle from one biped onto a differently built one
//! (longer legs, an extra spine bone, different bone names) and prints the
//! target root and the tip of every mapped chain per frame as JSON lines.
//!
//! ```text
//! retarget_cli [--dump-config] [CONFIG.json] [FRAMES]
//! ```
//!
//! Without a config file the built-in mapping is used. `--dump-config` prints
//! that mapping as JSON, as a starting point for a custom one. Set
//! `RUST_LOG=info` to see the initialization log.

use std::f32::consts::TAU;

use anyhow::{Context, bail};
use glam::{Quat, Vec3};
use rerig::retarget::{ChainMappingRow, RetargetConfig, RetargetProcessor, RetargeterAsset};
use rerig::skeleton::{BoneChain, BoneDesc, SkeletonDescription};
use rerig::Transform;
use rustc_hash::FxHashMap;

const DEFAULT_FRAMES: usize = 30;
const FPS: f32 = 30.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--dump-config") {
        println!("{}", serde_json::to_string_pretty(&builtin_config())?);
        return Ok(());
    }

    let frames = match args.last().map(|arg| arg.parse::<usize>()) {
        Some(Ok(frames)) => {
            args.pop();
            frames
        }
        _ => DEFAULT_FRAMES,
    };

    let config = match args.first() {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading config '{path}'"))?;
            RetargetConfig::from_json_str(&json).with_context(|| format!("parsing config '{path}'"))?
        }
        None => builtin_config(),
    };
    let tips: Vec<(String, String)> = config
        .target_chains
        .iter()
        .map(|chain| (chain.name.clone(), chain.end_bone.clone()))
        .collect();
    let asset = RetargeterAsset::from(config);

    let source = source_biped()?;
    let target = target_biped()?;

    let mut processor = RetargetProcessor::new();
    let report = processor.initialize(Some(&source), Some(&target), &asset, false);
    if !report.is_functional() {
        bail!(
            "retargeter could not be initialized ({} log entries)",
            processor.log().entries().len()
        );
    }
    log::info!(
        "Retargeting {} frames, {} chain pair(s), root {}",
        frames,
        processor.chain_pairs().len(),
        if report.roots_initialized { "on" } else { "off" }
    );

    let hips = find(&target, "Hips")?;
    let tip_indices: Vec<(String, usize)> = tips
        .into_iter()
        .filter_map(|(chain, bone)| target.find_bone_index(&bone).map(|index| (chain, index)))
        .collect();

    let curves = FxHashMap::default();
    for frame in 0..frames {
        let time = frame as f32 / FPS;
        let source_pose = walk_pose(&source, time)?;
        let output = processor.run_retargeter(&source_pose, &curves, 1.0 / FPS);

        let chains: serde_json::Map<String, serde_json::Value> = tip_indices
            .iter()
            .map(|(chain, index)| (chain.clone(), serde_json::json!(output[*index].translation.to_array())))
            .collect();
        let line = serde_json::json!({
            "frame": frame,
            "root": output[hips].translation.to_array(),
            "chains": chains,
        });
        println!("{line}");
    }

    Ok(())
}

// ============================================================================
// Skeletons
// ============================================================================

/// Builds a description from `(name, parent name, local offset)` rows.
fn skeleton(name: &str, rows: &[(&str, Option<&str>, Vec3)]) -> anyhow::Result<SkeletonDescription> {
    let mut bones = Vec::with_capacity(rows.len());
    for (bone, parent, offset) in rows {
        let parent = match parent {
            Some(parent) => Some(
                rows.iter()
                    .position(|(candidate, _, _)| candidate == parent)
                    .with_context(|| format!("parent '{parent}' of '{bone}' not listed"))?,
            ),
            None => None,
        };
        bones.push(BoneDesc::new(*bone, parent, Transform::from_translation(*offset)));
    }
    Ok(SkeletonDescription::new(name, bones)?)
}

fn source_biped() -> anyhow::Result<SkeletonDescription> {
    skeleton(
        "Walker",
        &[
            ("root", None, Vec3::ZERO),
            ("pelvis", Some("root"), Vec3::new(0.0, 0.0, 100.0)),
            ("spine_01", Some("pelvis"), Vec3::new(0.0, 0.0, 12.0)),
            ("spine_02", Some("spine_01"), Vec3::new(0.0, 0.0, 18.0)),
            ("head", Some("spine_02"), Vec3::new(0.0, 0.0, 25.0)),
            ("thigh_l", Some("pelvis"), Vec3::new(10.0, 0.0, -5.0)),
            ("calf_l", Some("thigh_l"), Vec3::new(0.0, 0.0, -45.0)),
            ("foot_l", Some("calf_l"), Vec3::new(0.0, 0.0, -45.0)),
            ("thigh_r", Some("pelvis"), Vec3::new(-10.0, 0.0, -5.0)),
            ("calf_r", Some("thigh_r"), Vec3::new(0.0, 0.0, -45.0)),
            ("foot_r", Some("calf_r"), Vec3::new(0.0, 0.0, -45.0)),
        ],
    )
}

/// Smaller overall, with relatively longer legs and a three-bone spine.
fn target_biped() -> anyhow::Result<SkeletonDescription> {
    skeleton(
        "Strider",
        &[
            ("Root", None, Vec3::ZERO),
            ("Hips", Some("Root"), Vec3::new(0.0, 0.0, 70.0)),
            ("Spine", Some("Hips"), Vec3::new(0.0, 0.0, 6.0)),
            ("Spine1", Some("Spine"), Vec3::new(0.0, 0.0, 6.0)),
            ("Chest", Some("Spine1"), Vec3::new(0.0, 0.0, 8.0)),
            ("Head", Some("Chest"), Vec3::new(0.0, 0.0, 14.0)),
            ("LeftUpLeg", Some("Hips"), Vec3::new(7.0, 0.0, -4.0)),
            ("LeftLeg", Some("LeftUpLeg"), Vec3::new(0.0, 0.0, -33.0)),
            ("LeftFoot", Some("LeftLeg"), Vec3::new(0.0, 0.0, -33.0)),
            ("RightUpLeg", Some("Hips"), Vec3::new(-7.0, 0.0, -4.0)),
            ("RightLeg", Some("RightUpLeg"), Vec3::new(0.0, 0.0, -33.0)),
            ("RightFoot", Some("RightLeg"), Vec3::new(0.0, 0.0, -33.0)),
        ],
    )
}

fn builtin_config() -> RetargetConfig {
    let mapping = |chain: &str| ChainMappingRow {
        source_chain: chain.to_string(),
        target_chain: chain.to_string(),
        fk: true,
        ik: false,
    };

    RetargetConfig {
        source_root_bone: Some("pelvis".into()),
        target_root_bone: Some("Hips".into()),
        source_chains: vec![
            BoneChain::new("Spine", "spine_01", "spine_02"),
            BoneChain::new("Head", "head", "head"),
            BoneChain::new("LeftLeg", "thigh_l", "foot_l"),
            BoneChain::new("RightLeg", "thigh_r", "foot_r"),
        ],
        target_chains: vec![
            BoneChain::new("Spine", "Spine", "Chest"),
            BoneChain::new("Head", "Head", "Head"),
            BoneChain::new("LeftLeg", "LeftUpLeg", "LeftFoot"),
            BoneChain::new("RightLeg", "RightUpLeg", "RightFoot"),
        ],
        chain_mapping: ["Spine", "Head", "LeftLeg", "RightLeg"].into_iter().map(mapping).collect(),
    }
}

fn find(description: &SkeletonDescription, bone: &str) -> anyhow::Result<usize> {
    description
        .find_bone_index(bone)
        .with_context(|| format!("bone '{bone}' missing from '{}'", description.name()))
}

// ============================================================================
// Walk Cycle
// ============================================================================

/// One-second stride: pelvis travels forward (+Y) and bobs, legs swing in
/// opposite phase with the knee bending on the back swing.
fn walk_pose(description: &SkeletonDescription, time: f32) -> anyhow::Result<Vec<Transform>> {
    let phase = time * TAU;
    let mut locals = description.reference_local_pose().to_vec();

    let pelvis = find(description, "pelvis")?;
    locals[pelvis].translation += Vec3::new(0.0, 120.0 * time, 2.0 * (2.0 * phase).cos());
    locals[pelvis].rotation = Quat::from_rotation_z(0.05 * phase.sin());
    locals[find(description, "spine_02")?].rotation = Quat::from_rotation_y(0.04 * phase.sin());

    for (thigh, calf, offset) in [("thigh_l", "calf_l", 0.0), ("thigh_r", "calf_r", 0.5 * TAU)] {
        let swing = (phase + offset).sin();
        locals[find(description, thigh)?].rotation = Quat::from_rotation_x(-0.5 * swing);
        locals[find(description, calf)?].rotation = Quat::from_rotation_x(0.6 * swing.max(0.0));
    }

    let mut globals = locals.clone();
    for (index, parent) in description.parent_indices().iter().enumerate() {
        if let Some(parent) = *parent {
            globals[index] = globals[parent] * locals[index];
        }
    }
    Ok(globals)
}
