//! Integration test: windows survive the trip through index space.
//!
//! A scope is snapped to the weather grid, then every sub-window is mapped
//! to an index quadruple at output resolution and back.

use geo_common::{GeoWindow, Resolution};
use grid_index::{bounds_to_weather_index, exact_window_from_index, index_in_grid};

/// Scope roughly covering Singapore and the Riau islands.
fn scope() -> GeoWindow {
    bounds_to_weather_index(
        &GeoWindow::new(1.6, 104.2, 0.9, 103.5),
        &Resolution::new(0.5, 0.625),
    )
}

#[test]
fn test_round_trip_within_one_pixel() {
    let res = Resolution::square(1.0 / 240.0);
    let parent = scope();

    let windows = [
        GeoWindow::new(1.47, 104.1, 1.16, 103.6),
        GeoWindow::new(1.3, 103.9, 1.25, 103.85),
        GeoWindow::new(parent.north, parent.east, parent.south, parent.west),
        GeoWindow::new(1.0001, 103.8, 1.0001, 103.8),
    ];

    for w in windows {
        let quad = index_in_grid(&w, &parent, &res).unwrap();
        let back = exact_window_from_index(&quad, &parent, &res);

        assert!(back.contains(&w), "{} does not enclose {}", back, w);
        assert!((back.north - w.north).abs() <= res.lat + 1e-9);
        assert!((back.south - w.south).abs() <= res.lat + 1e-9);
        assert!((back.east - w.east).abs() <= res.lon + 1e-9);
        assert!((back.west - w.west).abs() <= res.lon + 1e-9);

        // Mapping the exact window again is the identity on quadruples.
        assert_eq!(index_in_grid(&back, &parent, &res).unwrap(), quad);
    }
}

#[test]
fn test_weather_quad_covers_output_quad() {
    let res_weather = Resolution::new(0.5, 0.625);
    let res_desired = Resolution::square(1.0 / 240.0);
    let parent = scope();

    let region = GeoWindow::new(1.47, 104.1, 1.16, 103.6);
    let weather_window = bounds_to_weather_index(&region, &res_weather);
    let weather_quad = index_in_grid(&weather_window, &parent, &res_weather).unwrap();
    let output_quad = index_in_grid(&weather_window, &parent, &res_desired).unwrap();

    let (wr, wc) = weather_quad.shape();
    let (or, oc) = output_quad.shape();
    assert_eq!(or, wr * 120);
    assert_eq!(oc, wc * 150);
}
