use proptest::prelude::*;
use sketchkit_core::{Point, Region, Size};

#[test]
fn test_region_contains_far_corner() {
    let r = Region::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains_point(Point::new(10.0, 10.0)));
}

#[test]
fn test_region_edge_touching_does_not_intersect() {
    let a = Region::new(0.0, 0.0, 10.0, 10.0);
    let b = Region::new(10.0, 0.0, 10.0, 10.0);
    assert!(!a.intersects_with(&b));
    assert!(!b.intersects_with(&a));
}

#[test]
fn test_region_string_round_trip() {
    let r: Region = "5,5,10,10".parse().expect("valid region");
    assert_eq!(r, Region::new(5.0, 5.0, 10.0, 10.0));
    assert_eq!(r.to_string(), "5,5,10,10");
    assert!("5,5,10".parse::<Region>().is_err());
}

#[test]
fn test_union_covers_both() {
    let a = Region::new(0.0, 0.0, 10.0, 10.0);
    let b = Region::new(20.0, -5.0, 5.0, 5.0);
    let u = a.union(&b);
    assert_eq!(u, Region::new(0.0, -5.0, 25.0, 15.0));
    assert!(u.contains_region(&a));
    assert!(u.contains_region(&b));
}

#[test]
fn test_size_aspect_ratio() {
    assert_eq!(Size::new(20.0, 10.0).aspect_ratio(), Some(2.0));
    assert_eq!(Size::new(20.0, 0.0).aspect_ratio(), None);
}

fn region_strategy() -> impl Strategy<Value = Region> {
    (
        -500.0f64..500.0,
        -500.0f64..500.0,
        0.5f64..200.0,
        0.5f64..200.0,
    )
        .prop_map(|(x, y, w, h)| Region::new(x, y, w, h))
}

proptest! {
    #[test]
    fn intersection_is_symmetric(a in region_strategy(), b in region_strategy()) {
        prop_assert_eq!(a.intersects_with(&b), b.intersects_with(&a));
    }

    #[test]
    fn region_contains_its_corners(r in region_strategy()) {
        prop_assert!(r.contains_point(r.location()));
        prop_assert!(r.contains_point(Point::new(r.right(), r.bottom())));
        prop_assert!(r.contains_point(r.center()));
    }

    #[test]
    fn translate_preserves_size(r in region_strategy(), dx in -100.0f64..100.0, dy in -100.0f64..100.0) {
        let moved = r.translate(dx, dy);
        prop_assert_eq!(moved.size(), r.size());
        prop_assert!((moved.x - (r.x + dx)).abs() < 1e-9);
    }
}
