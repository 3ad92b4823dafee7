//! Benchmarks for the hour loop and the pooled aggregation.
//!
//! Run with: cargo bench --package flh-engine --bench aggregation

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flh_engine::{AggregationEngine, AggregationJob, ModelInputs, RegionInputs};
use geo_common::{GeoWindow, Raster, Resolution, Technology, HOURS_PER_YEAR};
use grid_index::ResampleMap;
use resource_model::{PvParams, PowerCurve, SolarGeometryRequest, TurbineParams};
use test_utils::{constant_field, cycling_wind, diurnal_clearness};

const WEATHER_RES: Resolution = Resolution { lat: 0.5, lon: 0.625 };

/// A region of `n` x `n` weather pixels at 1/8 degree output resolution.
fn region(n: usize) -> (GeoWindow, ResampleMap, Resolution) {
    let window = GeoWindow::new(
        n as f64 * WEATHER_RES.lat,
        n as f64 * WEATHER_RES.lon,
        0.0,
        0.0,
    );
    let out_res = Resolution::square(0.125);
    let map = ResampleMap::nearest(&window, &WEATHER_RES, &window, &out_res).unwrap();
    (window, map, out_res)
}

fn wind_inputs(n: usize) -> Arc<RegionInputs> {
    let (_, map, _) = region(n);
    let (rows, cols) = map.fine_shape();
    let model = ModelInputs::Wind {
        technology: Technology::WindOn,
        wind_speed: cycling_wind(n, n, 30),
        correction: Raster::filled(rows, cols, 1.2),
        curve: PowerCurve::new(&TurbineParams::onshore()).unwrap(),
    };
    Arc::new(
        RegionInputs::new(
            Raster::filled(rows, cols, 1),
            RegionInputs::grid_weather_index(&map),
            model,
        )
        .unwrap(),
    )
}

fn pv_inputs(n: usize) -> Arc<RegionInputs> {
    let (window, map, res) = region(n);
    let (rows, cols) = map.fine_shape();
    let model = ModelInputs::Pv {
        geometry: SolarGeometryRequest::Window { window, res },
        clearness: diurnal_clearness(n, n, 0.6, 0.0),
        temperature: constant_field(n, n, 295.0),
        ross: Raster::filled(rows, cols, 0.0208),
        albedo: Raster::filled(rows, cols, 0.2),
        params: PvParams::default(),
    };
    Arc::new(
        RegionInputs::new(
            Raster::filled(rows, cols, 1),
            RegionInputs::grid_weather_index(&map),
            model,
        )
        .unwrap(),
    )
}

// =============================================================================
// SINGLE HOUR BENCHMARKS
// =============================================================================

fn bench_capacity_factors(c: &mut Criterion) {
    let mut group = c.benchmark_group("capacity_factors_one_hour");

    for n in [2usize, 8] {
        let wind = wind_inputs(n);
        let pv = pv_inputs(n);
        let mut out = vec![0.0; wind.len()];
        group.throughput(Throughput::Elements(wind.len() as u64));

        group.bench_with_input(BenchmarkId::new("wind", n), &n, |b, _| {
            b.iter(|| wind.capacity_factors(black_box(4000), &mut out).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("pv", n), &n, |b, _| {
            b.iter(|| pv.capacity_factors(black_box(4000 + 12), &mut out).unwrap())
        });
    }

    group.finish();
}

// =============================================================================
// FULL YEAR BENCHMARKS
// =============================================================================

fn bench_year(c: &mut Criterion) {
    let mut group = c.benchmark_group("wind_year");
    group.sample_size(10);

    let inputs = wind_inputs(4);
    let hours: Vec<usize> = (0..HOURS_PER_YEAR).collect();
    for workers in [1usize, 4] {
        let engine = AggregationEngine::new(workers).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                let mut job = AggregationJob::new("bench", Technology::WindOn);
                job.advance();
                engine.run(&mut job, Arc::clone(&inputs), &hours).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_capacity_factors, bench_year);
criterion_main!(benches);
