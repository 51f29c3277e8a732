//! Benchmark for the per-frame work.
//!
//! Target: transform + sort + links for 200 particles well under 1 ms, so
//! the browser keeps its 16.6 ms frame budget for compositing.
//!
//! Run with: cargo bench --package grove_rendering --bench frame_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grove_procedural::{generate_brain, generate_satellites, BrainSettings, SatelliteSettings};
use grove_rendering::{
    depth_sort, proximity_links, transform_particles, Canvas, CloudSettings, LinkStyle, PointCloud,
    Viewport,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn benchmark_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("cloud_transform");
    let settings = CloudSettings::default();
    let viewport = Viewport::new(1280.0, 800.0, 2.0);

    for count in [100usize, 200, 400] {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let particles = generate_brain(
            &BrainSettings {
                count,
                ..BrainSettings::default()
            },
            &mut rng,
        )
        .unwrap();
        let mut points = Vec::with_capacity(count);
        let mut links = Vec::new();
        let style = LinkStyle {
            threshold: viewport.width * settings.link_distance,
            strength: settings.link_strength,
            alpha_min: settings.link_alpha_min,
        };

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut t = 0.0;
            b.iter(|| {
                t += 16.6;
                transform_particles(&particles, t, &viewport, &settings, &mut points);
                depth_sort(&mut points);
                proximity_links(&points, &style, &mut links);
                black_box(links.len())
            });
        });
    }

    group.finish();
}

fn benchmark_raster_frame(c: &mut Criterion) {
    let viewport = Viewport::new(640.0, 400.0, 1.0);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let particles = generate_brain(&BrainSettings::default(), &mut rng).unwrap();
    let satellites = generate_satellites(&SatelliteSettings::default(), &mut rng);
    let mut cloud = PointCloud::new(particles, satellites, CloudSettings::default(), viewport);
    let mut canvas = Canvas::new(viewport);

    c.bench_function("raster_frame_640x400", |b| {
        let mut t = 0.0;
        b.iter(|| {
            t += 16.6;
            black_box(cloud.frame(t, &mut canvas))
        });
    });
}

criterion_group!(benches, benchmark_transform, benchmark_raster_frame);
criterion_main!(benches);
