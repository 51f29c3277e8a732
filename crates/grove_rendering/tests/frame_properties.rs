//! # Frame Property Tests
//!
//! Properties that must hold for every frame, whatever the time:
//! - opacity stays in [0, 1] and size never goes negative
//! - the draw order is monotonic in depth
//! - a frame is a pure function of time

use grove_procedural::{generate_brain, BrainSettings, Particle};
use grove_rendering::{depth_sort, transform_particles, CloudSettings, ProjectedPoint, Viewport};
use grove_shared::Vec3;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn cloud(seed: u64) -> Vec<Particle> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_brain(&BrainSettings::default(), &mut rng).unwrap()
}

fn frame(particles: &[Particle], t: f64, viewport: &Viewport) -> Vec<ProjectedPoint> {
    let mut out = Vec::new();
    transform_particles(particles, t, viewport, &CloudSettings::default(), &mut out);
    depth_sort(&mut out);
    out
}

proptest! {
    /// Test: Opacity and size stay clamped for any time and page width.
    #[test]
    fn prop_ranges_clamped(seed in 0u64..64, t in 0.0f64..1.0e9, width in 1.0f32..4000.0) {
        let particles = cloud(seed);
        let viewport = Viewport::new(width, width * 0.6, 1.0);
        for p in frame(&particles, t, &viewport) {
            prop_assert!((0.0..=1.0).contains(&p.alpha), "alpha {}", p.alpha);
            prop_assert!(p.size >= 0.0, "size {}", p.size);
            prop_assert!(p.size.is_finite());
        }
    }

    /// Test: Depth keys never decrease along the draw order.
    #[test]
    fn prop_sorted_back_to_front(seed in 0u64..64, t in 0.0f64..1.0e8) {
        let particles = cloud(seed);
        let pts = frame(&particles, t, &Viewport::default());
        prop_assert_eq!(pts.len(), particles.len());
        for w in pts.windows(2) {
            prop_assert!(w[0].depth <= w[1].depth);
        }
    }

    /// Test: Even points far outside the cloud stay within range.
    #[test]
    fn prop_extreme_points_clamped(
        x in -10.0f32..10.0,
        y in -10.0f32..10.0,
        z in -10.0f32..10.0,
        bright in any::<bool>(),
        t in 0.0f64..1.0e7,
    ) {
        let particles = [Particle {
            origin: Vec3::new(x, y, z),
            size: 2.2,
            phase: 1.0,
            speed: 0.8,
            bright,
            accent: false,
        }];
        for p in frame(&particles, t, &Viewport::default()) {
            prop_assert!((0.0..=1.0).contains(&p.alpha));
            prop_assert!(p.size >= 0.0);
        }
    }
}

/// Test: Same time, same frame; every particle shows up exactly once.
#[test]
fn test_frame_is_pure() {
    let particles = cloud(3);
    let viewport = Viewport::new(1280.0, 800.0, 2.0);
    let a = frame(&particles, 98_765.4, &viewport);
    let b = frame(&particles, 98_765.4, &viewport);
    assert_eq!(a, b);

    let mut seen: Vec<usize> = a.iter().map(|p| p.index).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..particles.len()).collect::<Vec<_>>());
}
