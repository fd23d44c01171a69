//! Placement rules applied to every transform of an incoming agent set.

use core::f32::consts::TAU;

use crowd_core::{rng, DeterministicRng, SplitMix64, Transform, Vec3};

/// Upper bound on the transforms one placement node may produce.
pub const MAX_PLACEMENTS: usize = 1 << 20;

/// `count` transforms uniformly distributed in a disc (XY plane) around `center`.
///
/// Orientation and scale are inherited from `center`.
pub fn random_in_disc(
    center: &Transform,
    count: usize,
    radius: f32,
    rng: &mut SplitMix64,
) -> Vec<Transform> {
    (0..count)
        .map(|_| {
            let r = radius * rng.next_f32_unit().sqrt();
            let theta = TAU * rng.next_f32_unit();
            Transform {
                position: center.position + Vec3::new(r * theta.cos(), r * theta.sin(), 0.0),
                ..*center
            }
        })
        .collect()
}

/// Row-major grid of `count` transforms, `columns` wide, laid out in `center`'s local frame.
pub fn grid(center: &Transform, count: usize, columns: usize, spacing: f32) -> Vec<Transform> {
    (0..count)
        .map(|i| {
            let local = Vec3::new(
                (i % columns) as f32 * spacing,
                (i / columns) as f32 * spacing,
                0.0,
            );
            Transform {
                position: center.position + local.rotated_z(center.rotation.z),
                ..*center
            }
        })
        .collect()
}

pub fn offset(transform: &Transform, translation: Vec3, yaw: f32) -> Transform {
    let mut out = *transform;
    out.position += translation;
    out.rotation.z += yaw;
    out
}

/// RNG for a RandomPosition node: independent per pipeline seed, node seed param and node.
pub fn placement_rng(pipeline_seed: u64, node_seed: i64, node: u32) -> SplitMix64 {
    SplitMix64::new(rng::derive_seed(
        pipeline_seed,
        &[node_seed as u64, u64::from(node)],
    ))
}
