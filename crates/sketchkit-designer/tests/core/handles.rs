use proptest::prelude::*;
use sketchkit_core::{Point, Region, Size};
use sketchkit_designer::element::RectangleShape;
use sketchkit_designer::grid::snap;
use sketchkit_designer::{Depth, Element, HandleFactory, ResizeConstraints, ResizeDirection, Shape};

fn free() -> ResizeConstraints {
    ResizeConstraints {
        min_size: 2.0,
        aspect: None,
        snap: None,
    }
}

proptest! {
    #[test]
    fn resize_and_back_restores_region(
        x in 0i32..100,
        y in 0i32..100,
        w in 20i32..200,
        h in 20i32..200,
        dx in -5i32..=5,
        dy in -5i32..=5,
        which in 0usize..8,
    ) {
        let dir = ResizeDirection::ALL[which];
        let original = Region::new(x as f64, y as f64, w as f64, h as f64);
        let grown = dir.apply(original, dx as f64, dy as f64, &free());
        let back = dir.apply(grown, -dx as f64, -dy as f64, &free());
        prop_assert_eq!(back, original);
    }

    #[test]
    fn opposite_handle_stays_put(
        w in 20i32..200,
        h in 20i32..200,
        dx in -50i32..=50,
        dy in -50i32..=50,
        which in 0usize..8,
    ) {
        let dir = ResizeDirection::ALL[which];
        let original = Region::new(10.0, 10.0, w as f64, h as f64);
        let resized = dir.apply(original, dx as f64, dy as f64, &free());
        prop_assert_eq!(dir.opposite().anchor(resized), dir.opposite().anchor(original));
        prop_assert!(resized.width >= 2.0 && resized.height >= 2.0);
    }

    #[test]
    fn snapped_values_land_on_grid(value in -1000.0f64..1000.0, spacing in 1u32..50) {
        let spacing = spacing as f64;
        let snapped = snap(value, spacing);
        prop_assert!((snapped / spacing - (snapped / spacing).round()).abs() < 1e-9);
        prop_assert!((snapped - value).abs() <= spacing / 2.0 + 1e-9);
    }
}

#[test]
fn test_snap_tie_rounds_up() {
    assert_eq!(snap(4.0, 8.0), 8.0);
    assert_eq!(snap(3.9, 8.0), 0.0);
    assert_eq!(snap(-4.0, 8.0), 0.0);
}

#[test]
fn test_aspect_edge_keeps_centre() {
    let original = Region::new(0.0, 0.0, 40.0, 20.0);
    let c = ResizeConstraints {
        aspect: Some(2.0),
        ..free()
    };
    let r = ResizeDirection::South.apply(original, 0.0, 10.0, &c);
    assert_eq!(r, Region::new(-10.0, 0.0, 60.0, 30.0));
}

#[test]
fn test_handle_order_and_hit() {
    let el = Element::new(Shape::Rectangle(RectangleShape::new(
        Point::new(0.0, 0.0),
        Size::new(100.0, 50.0),
    )));
    let set = HandleFactory::new(8.0).handles_for(&el, Depth::Simple);
    assert_eq!(set.len(), 8);
    assert_eq!(set.hit_test(Point::new(100.0, 50.0)), Some(4));
    assert_eq!(set.hit_test(Point::new(50.0, 0.0)), Some(1));
    assert_eq!(set.hit_test(Point::new(50.0, 25.0)), None);
}
