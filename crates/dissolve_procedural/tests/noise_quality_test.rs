//! # Noise Quality Tests
//!
//! Verifies the fractal field is a usable dissolve source: it spans the
//! threshold range, it is stable, and it is coherent in space.

use dissolve_procedural::{FbmOptions, FractalNoise, NoiseSeed};

/// Samples a unit-ish sphere shell the way a mesh would expose it.
fn sphere_points(count: usize) -> Vec<[f32; 3]> {
    let golden = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - (i as f32 / (count - 1) as f32) * 2.0;
            let radius = (1.0 - y * y).sqrt();
            let theta = golden * i as f32;
            [theta.cos() * radius, y, theta.sin() * radius]
        })
        .collect()
}

/// Test: the normalized field covers enough of [0, 1] for a full sweep.
#[test]
fn test_field_spans_threshold_range() {
    let noise = FractalNoise::new(FbmOptions::default());
    let points = sphere_points(4000);

    let (mut lo, mut hi) = (f32::MAX, f32::MIN);
    for p in &points {
        let v = noise.sample_normalized(*p);
        lo = lo.min(v);
        hi = hi.max(v);
    }

    println!("Fractal range on sphere: [{lo:.3}, {hi:.3}]");
    assert!(lo < 0.35, "Field never gets low enough: {lo}");
    assert!(hi > 0.65, "Field never gets high enough: {hi}");
}

/// Test: roughly half the surface sits above the midpoint.
#[test]
fn test_field_is_balanced() {
    let noise = FractalNoise::new(FbmOptions::default());
    let points = sphere_points(4000);

    let above = points
        .iter()
        .filter(|p| noise.sample_normalized(**p) >= 0.5)
        .count();
    let share = above as f32 / points.len() as f32;

    println!("Share above midpoint: {:.1}%", share * 100.0);
    assert!(share > 0.25 && share < 0.75, "Field is lopsided: {share}");
}

/// Test: identical seeds give identical fields, in any sampling order.
#[test]
fn test_order_independent_determinism() {
    let a = FractalNoise::new(FbmOptions { seed: NoiseSeed::new(99), ..FbmOptions::default() });
    let b = FractalNoise::new(FbmOptions { seed: NoiseSeed::new(99), ..FbmOptions::default() });
    let points = sphere_points(256);

    let forward: Vec<u32> = points.iter().map(|p| a.sample_normalized(*p).to_bits()).collect();
    let backward: Vec<u32> = points
        .iter()
        .rev()
        .map(|p| b.sample_normalized(*p).to_bits())
        .collect();

    let backward: Vec<u32> = backward.into_iter().rev().collect();
    assert_eq!(forward, backward);
}

/// Test: nearby points have nearby values (no salt-and-pepper boundary).
#[test]
fn test_spatial_coherence() {
    let noise = FractalNoise::new(FbmOptions::default());
    let mut worst = 0.0f32;

    for p in sphere_points(1000) {
        let q = [p[0] + 1e-4, p[1], p[2]];
        worst = worst.max((noise.sample_normalized(p) - noise.sample_normalized(q)).abs());
    }

    assert!(worst < 0.05, "Adjacent samples differ too much: {worst}");
}
