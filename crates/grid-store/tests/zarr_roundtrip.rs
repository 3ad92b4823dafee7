//! Integration test: write fields and rasters to a Zarr store and read them
//! back through the store traits.

use geo_common::{GeoWindow, HourlyField, Raster, Resolution, HOURS_PER_YEAR};
use grid_index::{index_in_grid, IndexQuad};
use grid_store::weather::{prepare_weather, SWGDN, SWTDN, T2M, U50M, V50M};
use grid_store::{
    GridSpec, RasterLayer, RasterStore, StoreConfig, WeatherField, WeatherStore, ZarrCompression,
    ZarrStore,
};

fn weather_grid() -> GridSpec {
    GridSpec::new(
        GeoWindow::new(1.75, 104.6875, 0.75, 103.4375),
        Resolution::new(0.5, 0.625),
    )
}

fn open(dir: &std::path::Path) -> ZarrStore {
    ZarrStore::open(StoreConfig {
        chunk_size: 1,
        hour_chunk: 1000,
        ..StoreConfig::at(dir)
    })
    .expect("Failed to open store")
}

#[test]
fn test_weather_field_round_trip_with_quad() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = open(temp_dir.path());
    let grid = weather_grid();

    // Value encodes (row, col, hour) for easy verification.
    let field = HourlyField::from_fn(2, 2, HOURS_PER_YEAR, |r, c, h| {
        (r * 100_000 + c * 10_000 + h) as f32
    });
    store
        .write_field(WeatherField::Temperature, &field, &grid)
        .expect("Failed to write");

    assert!(store.weather_grid().is_err(), "clearness not written yet");

    let full = store.read_field(WeatherField::Temperature, None).unwrap();
    assert_eq!(full, field);

    let quad = IndexQuad::new(2, 2, 2, 2).unwrap();
    let corner = store.read_field(WeatherField::Temperature, Some(&quad)).unwrap();
    assert_eq!((corner.rows(), corner.cols(), corner.hours()), (1, 1, HOURS_PER_YEAR));
    assert_eq!(corner.value(0, 0, 8759), Some(118_759.0));
}

#[test]
fn test_raster_round_trip_uncompressed() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = ZarrStore::open(StoreConfig {
        compression: ZarrCompression::None,
        ..StoreConfig::at(temp_dir.path())
    })
    .unwrap();

    let res = Resolution::square(1.0 / 240.0);
    let grid = GridSpec::new(weather_grid().window, res);
    let (rows, cols) = grid.shape();
    assert_eq!((rows, cols), (240, 300));

    let landuse = Raster::from_fn(rows, cols, |r, c| ((r + c) % 17) as f32);
    store.write_layer(RasterLayer::Landuse, &landuse, &grid).unwrap();
    assert_eq!(store.raster_grid().unwrap(), grid);

    let window = GeoWindow::new(1.3, 103.9, 1.25, 103.85);
    let quad = index_in_grid(&window, &grid.window, &res).unwrap();
    let sub = store.read_raster(RasterLayer::Landuse, Some(&quad)).unwrap();
    assert_eq!(sub.shape(), quad.shape());
    let expected = landuse.subset(quad.row_range(), quad.col_range()).unwrap();
    assert_eq!(sub, expected);
}

#[test]
fn test_prepare_weather_from_leap_year() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = open(temp_dir.path());
    let grid = weather_grid();
    let raw_hours = 8784;

    let constant = |v: f32| HourlyField::from_fn(2, 2, raw_hours, move |_, _, _| v);
    store.write_hourly("raw", SWGDN, &constant(400.0), &grid, "W m-2").unwrap();
    store
        .write_hourly(
            "raw",
            SWTDN,
            &HourlyField::from_fn(2, 2, raw_hours, |_, _, h| if h % 24 < 12 { 800.0 } else { 0.0 }),
            &grid,
            "W m-2",
        )
        .unwrap();
    store.write_hourly("raw", T2M, &constant(300.0), &grid, "K").unwrap();
    store.write_hourly("raw", U50M, &constant(6.0), &grid, "m s-1").unwrap();
    store.write_hourly("raw", V50M, &constant(8.0), &grid, "m s-1").unwrap();

    prepare_weather(&store, 2016).expect("Failed to prepare weather");

    assert_eq!(store.weather_grid().unwrap(), grid);
    let k = store.read_field(WeatherField::Clearness, None).unwrap();
    assert_eq!(k.hours(), HOURS_PER_YEAR);
    assert_eq!(k.value(1, 1, 0), Some(0.5));
    assert_eq!(k.value(1, 1, 12), Some(0.0));

    let w = store.read_field(WeatherField::WindSpeed, None).unwrap();
    assert_eq!(w.value(0, 1, 4000), Some(10.0));
    let t = store.read_field(WeatherField::Temperature, None).unwrap();
    assert_eq!(t.hours(), HOURS_PER_YEAR);
}
