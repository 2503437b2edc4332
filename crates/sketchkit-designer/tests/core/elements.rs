use sketchkit_core::{Point, Region, Size};
use sketchkit_designer::element::{PolygonShape, RectangleShape};
use sketchkit_designer::{Depth, Element, ElementFactory, ElementRecord, Shape, TransformExpr};

fn square_polygon() -> Element {
    Element::new(Shape::Polygon(
        PolygonShape::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
        .expect("points"),
    ))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_polygon_bounds_follow_translation() {
    let mut el = square_polygon();
    assert_eq!(el.bounds(), Region::new(0.0, 0.0, 10.0, 10.0));
    el.translate(5.0, 5.0);
    assert_eq!(el.bounds(), Region::new(5.0, 5.0, 10.0, 10.0));
}

#[test]
fn test_point_edit_refreshes_cached_bounds() {
    let mut el = square_polygon();
    let _ = el.bounds();
    el.set_point_at(2, Point::new(30.0, 20.0), Depth::Simple)
        .expect("vertex");
    assert_eq!(el.bounds(), Region::new(0.0, 0.0, 30.0, 20.0));
}

#[test]
fn test_scale_applies_each_axis_factor() {
    let mut el = Element::new(Shape::Rectangle(RectangleShape::new(
        Point::new(10.0, 20.0),
        Size::new(10.0, 10.0),
    )));
    el.scale(2.0, 0.5, Point::new(10.0, 20.0));
    assert_eq!(el.bounds(), Region::new(10.0, 20.0, 20.0, 5.0));

    let mut polygon = square_polygon();
    polygon.scale(3.0, 1.0, Point::ORIGIN);
    assert_eq!(polygon.bounds(), Region::new(0.0, 0.0, 30.0, 10.0));
}

#[test]
fn test_rotated_bounds_and_hit_test() {
    let mut el = Element::new(Shape::Rectangle(RectangleShape::new(
        Point::ORIGIN,
        Size::new(20.0, 10.0),
    )))
    .with_fill("red");
    el.set_transform(Some("rotate(90)".parse::<TransformExpr>().expect("transform")));

    let visual = el.transformed_bounds();
    assert!(close(visual.x, 5.0) && close(visual.y, -5.0));
    assert!(close(visual.width, 10.0) && close(visual.height, 20.0));

    assert!(el.hit_test(Point::new(10.0, -3.0)));
    assert!(!el.hit_test(Point::new(1.0, 5.0)));
}

#[test]
fn test_factory_reads_hooks_and_flags() {
    let mut record = ElementRecord::new("rectangle");
    record.location = Some("1,2".into());
    record.size = Some("3,4".into());
    record.locked = Some(true);
    record.click = Some("setFill(red)".into());
    let el = ElementFactory::with_builtins().create(&record).expect("element");
    assert_eq!(el.bounds(), Region::new(1.0, 2.0, 3.0, 4.0));
    assert!(!el.can_move());
    assert_eq!(el.hooks.click.as_deref(), Some("setFill(red)"));
}
