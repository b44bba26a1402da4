use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jurisdiction_map::boundary::BoundaryCollection;
use jurisdiction_map::classifier::classify;
use jurisdiction_map::events::NoopSink;
use jurisdiction_map::join::JoinEngine;
use jurisdiction_map::models::{BoundaryFeature, Geometry, JurisdictionRecord};
use jurisdiction_map::normalizer::normalize;

const STATES: u32 = 50;
const COUNTIES_PER_STATE: u32 = 60;

fn boundaries() -> BoundaryCollection {
    let features = (1..=STATES).flat_map(|state| {
        (0..COUNTIES_PER_STATE).map(move |county| {
            let lon = -120.0 + state as f64;
            let lat = 30.0 + county as f64 * 0.1;
            BoundaryFeature {
                county_id: jurisdiction_map::boundary::pad_county_code(&format!(
                    "{}{:03}",
                    state,
                    county * 2 + 1
                ))
                .expect("generated county code"),
                name: None,
                geometry: Geometry::Polygon(vec![vec![
                    [lon, lat],
                    [lon + 0.1, lat],
                    [lon + 0.1, lat + 0.1],
                    [lon, lat + 0.1],
                    [lon, lat],
                ]]),
            }
        })
    });
    BoundaryCollection::from_features(features)
}

fn records(count: u32) -> Vec<JurisdictionRecord> {
    (0..count)
        .map(|i| {
            let state = i % STATES + 1;
            let (types, raw) = match i % 3 {
                0 => ("County", format!("{}{:03}", state, (i % COUNTIES_PER_STATE) * 2 + 1)),
                1 => ("City", format!("{}{:05}", state, (i * 10) % 100_000)),
                _ => ("City, County", format!("{}{:03}00", state, (i % COUNTIES_PER_STATE) * 2 + 1)),
            };
            let classification = classify(types, "");
            JurisdictionRecord {
                name: format!("Jurisdiction {}", i),
                identifier: normalize(&raw, &classification.entity_kinds).expect("valid id"),
                identifier_raw: raw,
                entity_kinds: classification.entity_kinds,
                is_unified: classification.is_unified,
                display_label: classification.display_label,
                population_bucket: "100K-500K".to_string(),
                notes: String::new(),
                portal_url: format!("https://portal{}.example.org", i),
                location: None,
            }
        })
        .collect()
}

fn bench_join(c: &mut Criterion) {
    let boundaries = boundaries();
    let engine = JoinEngine::default();
    let mut group = c.benchmark_group("join");

    for size in [100u32, 1_000, 10_000] {
        let input = records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| engine.join(black_box(input), &boundaries, &NoopSink))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_join);
criterion_main!(benches);
