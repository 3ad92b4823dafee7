//! Tests for GeoWindow operations.

use geo_common::{GeoPoint, GeoWindow, Resolution};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_window_new() {
    let w = GeoWindow::new(55.0, 15.0, 47.0, 5.0);
    assert_eq!(w.north, 55.0);
    assert_eq!(w.east, 15.0);
    assert_eq!(w.south, 47.0);
    assert_eq!(w.west, 5.0);
    assert!((w.height() - 8.0).abs() < 1e-12);
    assert!((w.width() - 10.0).abs() < 1e-12);
}

#[test]
fn test_global_window() {
    let g = GeoWindow::global();
    assert!(g.contains(&GeoWindow::new(1.5, 104.0, 1.0, 103.5)));
    assert!(g.validate().is_ok());
}

// ============================================================================
// Containment tests
// ============================================================================

#[test]
fn test_contains_is_edge_inclusive() {
    let outer = GeoWindow::new(10.0, 10.0, 0.0, 0.0);
    assert!(outer.contains(&outer));
    assert!(outer.contains(&GeoWindow::new(10.0 + 1e-12, 10.0, 0.0, 0.0)));
    assert!(!outer.contains(&GeoWindow::new(10.5, 10.0, 0.0, 0.0)));
}

#[test]
fn test_contains_point() {
    let w = GeoWindow::new(2.0, 105.0, 0.0, 103.0);
    assert!(w.contains_point(&GeoPoint::new(1.35, 103.8)));
    assert!(!w.contains_point(&GeoPoint::new(-1.0, 103.8)));
}

// ============================================================================
// Shape tests
// ============================================================================

#[test]
fn test_pixel_shape_at_weather_resolution() {
    let res = Resolution::new(0.5, 0.625);
    let w = GeoWindow::new(2.25, 104.6875, 0.25, 102.8125);
    assert_eq!(w.pixel_shape(&res), (4, 3));
}

#[test]
fn test_attribute_round_trip() {
    let w = GeoWindow::new(2.25, 104.6875, 0.25, 102.8125);
    let back = GeoWindow::from_attribute(&w.to_attribute()).unwrap();
    assert_eq!(back, w);
    assert!(GeoWindow::from_attribute(&[1.0, 2.0]).is_none());
}
