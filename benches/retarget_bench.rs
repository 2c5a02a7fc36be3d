use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Quat, Vec3};
use rerig::retarget::{ChainMapping, RetargetProcessor, RetargeterAsset, RigDefinition, RotationMode};
use rerig::skeleton::{BoneChain, BoneDesc, SkeletonDescription};
use rerig::Transform;
use rustc_hash::FxHashMap;

const LIMBS: usize = 6;

/// Root, hips and `LIMBS` limbs of `bones_per_limb` bones hanging off the hips.
fn creature(prefix: &str, bones_per_limb: usize, scale: f32) -> SkeletonDescription {
    let mut bones = vec![
        BoneDesc::new(format!("{prefix}root"), None, Transform::IDENTITY),
        BoneDesc::new(
            format!("{prefix}hips"),
            Some(0),
            Transform::from_translation(Vec3::new(0.0, 0.0, 100.0 * scale)),
        ),
    ];

    for limb in 0..LIMBS {
        let angle = limb as f32 / LIMBS as f32 * std::f32::consts::TAU;
        let direction = Vec3::new(angle.cos(), angle.sin(), -0.5).normalize();
        let bone_length = 60.0 * scale / bones_per_limb as f32;

        for segment in 0..bones_per_limb {
            let parent = if segment == 0 { 1 } else { bones.len() - 1 };
            bones.push(BoneDesc::new(
                format!("{prefix}limb{limb}_{segment}"),
                Some(parent),
                Transform::from_translation(direction * bone_length),
            ));
        }
    }

    SkeletonDescription::new(prefix.trim_end_matches('_'), bones).unwrap()
}

fn rig(prefix: &str, bones_per_limb: usize) -> RigDefinition {
    let chains = (0..LIMBS)
        .map(|limb| {
            BoneChain::new(
                format!("Limb{limb}"),
                format!("{prefix}limb{limb}_0"),
                format!("{prefix}limb{limb}_{}", bones_per_limb - 1),
            )
        })
        .collect();
    RigDefinition::new(Some(format!("{prefix}hips").as_str()), chains)
}

fn animated_pose(description: &SkeletonDescription, time: f32) -> Vec<Transform> {
    let mut globals = description.reference_local_pose().to_vec();
    for (index, parent) in description.parent_indices().iter().enumerate() {
        let mut local = globals[index];
        if index > 1 {
            local.rotation = Quat::from_rotation_x((time + index as f32).sin() * 0.3);
        }
        globals[index] = match parent {
            Some(parent) => globals[*parent] * local,
            None => local,
        };
    }
    globals
}

fn build_processor(rotation_mode: RotationMode) -> (RetargetProcessor, Vec<Transform>) {
    let source = creature("src_", 4, 1.0);
    let target = creature("tgt_", 7, 0.6);

    let mut asset = RetargeterAsset {
        source_rig: Some(rig("src_", 4)),
        target_rig: Some(rig("tgt_", 7)),
        chain_mapping: (0..LIMBS)
            .map(|limb| ChainMapping::new(Some(format!("Limb{limb}").as_str()), format!("Limb{limb}")))
            .collect(),
        ..RetargeterAsset::default()
    };
    for row in &mut asset.chain_mapping {
        row.settings.fk.rotation_mode = rotation_mode;
    }

    let mut processor = RetargetProcessor::new();
    processor.initialize(Some(&source), Some(&target), &asset, true);
    (processor, animated_pose(&source, 0.25))
}

fn bench_run_retargeter(c: &mut Criterion) {
    let curves = FxHashMap::default();

    let (mut interpolated, pose) = build_processor(RotationMode::Interpolated);
    c.bench_function("run_retargeter_interpolated", |b| {
        b.iter(|| black_box(interpolated.run_retargeter(black_box(&pose), &curves, 1.0 / 60.0).len()));
    });

    let (mut one_to_one, pose) = build_processor(RotationMode::OneToOne);
    c.bench_function("run_retargeter_one_to_one", |b| {
        b.iter(|| black_box(one_to_one.run_retargeter(black_box(&pose), &curves, 1.0 / 60.0).len()));
    });
}

fn bench_initialize(c: &mut Criterion) {
    let source = creature("src_", 4, 1.0);
    let target = creature("tgt_", 7, 0.6);
    let asset = RetargeterAsset {
        source_rig: Some(rig("src_", 4)),
        target_rig: Some(rig("tgt_", 7)),
        chain_mapping: (0..LIMBS)
            .map(|limb| ChainMapping::new(Some(format!("Limb{limb}").as_str()), format!("Limb{limb}")))
            .collect(),
        ..RetargeterAsset::default()
    };

    c.bench_function("initialize", |b| {
        b.iter(|| {
            let mut processor = RetargetProcessor::new();
            black_box(processor.initialize(Some(&source), Some(&target), &asset, true))
        });
    });
}

criterion_group!(benches, bench_run_retargeter, bench_initialize);
criterion_main!(benches);
