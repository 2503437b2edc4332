use sketchkit_core::{
    shared, DesignerEvent, DiagnosticEvent, DragEvent, DragPayload, ElementEvent, ElementKey,
    EventBus, EventBusConfig, ModelEvent, Point, Region, SelectionEvent, Shared, Size,
};
use sketchkit_designer::element::{PolygonShape, RectangleShape};
use sketchkit_designer::{
    DesignController, Element, ElementRecord, Fill, GestureState, HostSurface, Key, KeyEvent,
    Model, Modifiers, PointerCapture, PointerEvent, Shape,
};
use sketchkit_settings::DesignerSettings;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CountingSurface(Rc<Cell<usize>>);

impl HostSurface for CountingSurface {
    fn invalidate(&self) {
        self.0.set(self.0.get() + 1);
    }
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(Shape::Rectangle(RectangleShape::new(
        Point::new(x, y),
        Size::new(w, h),
    )))
    .with_fill("gray")
}

fn recording_bus() -> Arc<EventBus> {
    Arc::new(EventBus::with_config(EventBusConfig {
        enable_history: true,
        ..Default::default()
    }))
}

/// A controller over a 200x200 model holding one 50x50 rectangle at (10,10).
fn setup() -> (DesignController, Shared<Model>, ElementKey) {
    let mut model = Model::new(Size::new(200.0, 200.0));
    let key = model.add(rect(10.0, 10.0, 50.0, 50.0));
    let model = shared(model);
    let mut controller = DesignController::new(DesignerSettings::default(), recording_bus());
    controller.set_model(Some(model.clone()));
    (controller, model, key)
}

fn bounds_of(model: &Shared<Model>, key: ElementKey) -> Region {
    model.borrow().get(key).expect("element").bounds()
}

#[test]
fn test_resize_then_nudge() {
    let (mut c, model, key) = setup();
    assert!(c.select_element(key, true).expect("select"));

    assert!(c.pointer_down(&PointerEvent::new(60.0, 60.0)));
    assert!(matches!(c.gesture(), GestureState::Resizing { .. }));
    c.pointer_move(&PointerEvent::new(80.0, 80.0));
    assert_eq!(
        c.tentative_bounds(key),
        Some(Region::new(10.0, 10.0, 70.0, 70.0))
    );
    assert_eq!(bounds_of(&model, key).width, 50.0);

    c.pointer_up(&PointerEvent::new(80.0, 80.0));
    assert_eq!(bounds_of(&model, key), Region::new(10.0, 10.0, 70.0, 70.0));
    assert!(c.gesture().is_idle());

    assert!(c.key_down(&KeyEvent::new(Key::Left)));
    assert_eq!(bounds_of(&model, key).location(), Point::new(9.0, 10.0));
    assert!(model.borrow().is_dirty());
}

#[test]
fn test_move_is_tentative_until_release() {
    let (mut c, model, key) = setup();
    c.pointer_down(&PointerEvent::new(30.0, 30.0));
    assert_eq!(c.selection(), &[key]);

    // Below the drag threshold nothing moves.
    c.pointer_move(&PointerEvent::new(31.0, 31.0));
    assert!(matches!(c.gesture(), GestureState::Selecting { .. }));

    c.pointer_move(&PointerEvent::new(40.0, 45.0));
    assert_eq!(c.tentative_location(key), Some(Point::new(20.0, 25.0)));
    assert_eq!(bounds_of(&model, key).location(), Point::new(10.0, 10.0));

    c.pointer_up(&PointerEvent::new(40.0, 45.0));
    assert_eq!(bounds_of(&model, key).location(), Point::new(20.0, 25.0));
    assert_eq!(c.tentative_location(key), None);

    let history = c.bus().history(None);
    let moving = history
        .iter()
        .position(|e| matches!(e, DesignerEvent::Element(ElementEvent::Moving { .. })));
    let moved = history
        .iter()
        .position(|e| matches!(e, DesignerEvent::Element(ElementEvent::Moved { .. })));
    assert!(moving.is_some() && moved > moving);
    assert!(history.contains(&DesignerEvent::Model(ModelEvent::Updated)));
}

#[test]
fn test_move_stays_inside_model() {
    let (mut c, model, key) = setup();
    c.pointer_down(&PointerEvent::new(30.0, 30.0));
    c.pointer_move(&PointerEvent::new(400.0, 400.0));
    c.pointer_up(&PointerEvent::new(400.0, 400.0));
    assert_eq!(bounds_of(&model, key).location(), Point::new(150.0, 150.0));
}

#[test]
fn test_escape_discards_gesture() {
    let (mut c, model, key) = setup();
    c.pointer_down(&PointerEvent::new(30.0, 30.0));
    c.pointer_move(&PointerEvent::new(90.0, 90.0));
    assert!(c.key_down(&KeyEvent::new(Key::Escape)));
    assert!(c.gesture().is_idle());
    assert_eq!(c.tentative_location(key), None);
    c.pointer_up(&PointerEvent::new(90.0, 90.0));
    assert_eq!(bounds_of(&model, key).location(), Point::new(10.0, 10.0));
    assert!(!model.borrow().is_dirty());
}

#[test]
fn test_group_move_clamps_once_for_the_whole_selection() {
    let (mut c, model, a) = setup();
    let b = c.add_element(rect(100.0, 10.0, 20.0, 20.0)).expect("add");
    c.select_element(a, true).expect("select");
    c.select_element(b, false).expect("select");
    model.borrow_mut().set_dirty(false);
    c.bus().clear_history();

    c.pointer_down(&PointerEvent::new(30.0, 30.0));
    c.pointer_move(&PointerEvent::new(-40.0, 30.0));
    c.pointer_up(&PointerEvent::new(-40.0, 30.0));

    // The group's left edge stops at the model edge and both keep their spacing.
    assert_eq!(bounds_of(&model, a).location(), Point::new(0.0, 10.0));
    assert_eq!(bounds_of(&model, b).location(), Point::new(90.0, 10.0));
    assert_eq!(c.selection(), &[a, b]);

    let committed: Vec<&str> = c
        .bus()
        .history(None)
        .iter()
        .filter_map(|e| match e {
            DesignerEvent::Element(ElementEvent::Moved { .. }) => Some("moved"),
            DesignerEvent::Model(ModelEvent::Updated) => Some("updated"),
            DesignerEvent::Model(ModelEvent::IsDirtyChanged { dirty: true }) => Some("dirty"),
            _ => None,
        })
        .collect();
    assert_eq!(committed, ["moved", "moved", "updated", "dirty"]);
}

#[test]
fn test_resize_commit_notifies_sized_before_update() {
    let (mut c, _model, key) = setup();
    c.select_element(key, true).expect("select");
    c.bus().clear_history();

    c.pointer_down(&PointerEvent::new(60.0, 60.0));
    c.pointer_move(&PointerEvent::new(70.0, 75.0));
    c.pointer_up(&PointerEvent::new(70.0, 75.0));

    let committed: Vec<&str> = c
        .bus()
        .history(None)
        .iter()
        .filter_map(|e| match e {
            DesignerEvent::Element(ElementEvent::Sized { .. }) => Some("sized"),
            DesignerEvent::Model(ModelEvent::Updated) => Some("updated"),
            DesignerEvent::Model(ModelEvent::IsDirtyChanged { dirty: true }) => Some("dirty"),
            _ => None,
        })
        .collect();
    assert_eq!(committed, ["sized", "updated", "dirty"]);
}

#[test]
fn test_point_edit_cancel_then_commit() {
    let square = PolygonShape::new(vec![
        Point::new(10.0, 10.0),
        Point::new(50.0, 10.0),
        Point::new(50.0, 50.0),
        Point::new(10.0, 50.0),
    ])
    .expect("points");
    let mut model = Model::new(Size::new(200.0, 200.0));
    let key = model.add(Element::new(Shape::Polygon(square)).with_fill("gray"));
    let model = shared(model);
    let mut c = DesignController::new(DesignerSettings::default(), recording_bus());
    c.set_model(Some(model.clone()));

    // Select, then click again to switch to point handles.
    c.pointer_down(&PointerEvent::new(30.0, 30.0));
    c.pointer_up(&PointerEvent::new(30.0, 30.0));
    c.pointer_down(&PointerEvent::new(30.0, 30.0));
    c.pointer_up(&PointerEvent::new(30.0, 30.0));
    assert!(model.borrow().get(key).expect("polygon").flags.edit_points);

    assert!(c.pointer_down(&PointerEvent::new(50.0, 50.0)));
    assert!(matches!(
        c.gesture(),
        GestureState::MovingPoint { index: 2, .. }
    ));
    c.pointer_move(&PointerEvent::new(80.0, 90.0));
    assert!(c.tentative_point().is_some());
    assert!(c.key_down(&KeyEvent::new(Key::Escape)));
    c.pointer_up(&PointerEvent::new(80.0, 90.0));
    assert!(c.tentative_point().is_none());
    assert_eq!(bounds_of(&model, key), Region::new(10.0, 10.0, 40.0, 40.0));
    assert!(!model.borrow().is_dirty());

    c.pointer_down(&PointerEvent::new(50.0, 50.0));
    c.pointer_move(&PointerEvent::new(80.0, 90.0));
    c.pointer_up(&PointerEvent::new(80.0, 90.0));
    assert_eq!(bounds_of(&model, key), Region::new(10.0, 10.0, 70.0, 80.0));
    assert!(model.borrow().is_dirty());
}

#[test]
fn test_nudge_rejected_at_edge() {
    let (mut c, model, key) = setup();
    c.select_element(key, true).expect("select");
    let big = KeyEvent::new(Key::Left).with_modifiers(Modifiers::shift());
    assert!(c.key_down(&big));
    assert_eq!(bounds_of(&model, key).location(), Point::new(0.0, 10.0));
    assert!(!c.key_down(&big));
    assert!(!c.key_down(&KeyEvent::new(Key::Left)));
    assert_eq!(bounds_of(&model, key).location(), Point::new(0.0, 10.0));
}

#[test]
fn test_rubber_band_selects_and_toggles() {
    let (mut c, model, key) = setup();
    let other = c.add_element(rect(120.0, 120.0, 20.0, 20.0)).expect("add");

    c.pointer_down(&PointerEvent::new(100.0, 100.0));
    c.pointer_move(&PointerEvent::new(5.0, 5.0));
    assert!(c.gesture().rubber_band().is_some());
    c.pointer_up(&PointerEvent::new(5.0, 5.0));
    assert_eq!(c.selection(), &[key]);

    let additive = PointerEvent::new(150.0, 150.0).with_modifiers(Modifiers::ctrl());
    c.pointer_down(&additive);
    c.pointer_move(&PointerEvent::new(110.0, 110.0).with_modifiers(Modifiers::ctrl()));
    c.pointer_up(&PointerEvent::new(110.0, 110.0).with_modifiers(Modifiers::ctrl()));
    assert_eq!(c.selection(), &[key, other]);
    assert_eq!(model.borrow().len(), 2);

    let changes = c
        .bus()
        .history(None)
        .into_iter()
        .filter(|e| matches!(e, DesignerEvent::Selection(SelectionEvent::Changed { .. })))
        .count();
    assert_eq!(changes, 2);
}

#[test]
fn test_creation_tool_adds_element() {
    let (mut c, model, _) = setup();
    c.set_creation_tool(Some(ElementRecord::new("rectangle")));
    c.pointer_down(&PointerEvent::new(100.0, 100.0));
    c.pointer_move(&PointerEvent::new(140.0, 130.0));
    c.pointer_up(&PointerEvent::new(140.0, 130.0));

    assert_eq!(model.borrow().len(), 2);
    let created = c.selection()[0];
    assert_eq!(bounds_of(&model, created), Region::new(100.0, 100.0, 40.0, 30.0));
}

#[test]
fn test_creation_tool_reports_unknown_type() {
    let (mut c, model, _) = setup();
    c.set_creation_tool(Some(ElementRecord::new("hexagon")));
    c.pointer_down(&PointerEvent::new(100.0, 100.0));
    c.pointer_up(&PointerEvent::new(140.0, 130.0));
    assert_eq!(model.borrow().len(), 1);
    assert!(c.bus().history(None).iter().any(|e| matches!(
        e,
        DesignerEvent::Diagnostic(DiagnosticEvent::CreationFailed { element_type, .. })
            if element_type == "hexagon"
    )));
}

#[test]
fn test_click_hook_fires_on_release() {
    let (mut c, model, key) = setup();
    if let Some(el) = model.borrow_mut().get_mut(key) {
        el.hooks.click = Some("setFill(green)".into());
        el.hooks.mouse_down = Some("pushFill(yellow)".into());
        el.hooks.mouse_up = Some("popFill".into());
    }
    c.pointer_down(&PointerEvent::new(30.0, 30.0));
    assert_eq!(
        model.borrow().get(key).and_then(|el| el.style.fill.clone()),
        Some(Fill::Solid("yellow".into()))
    );
    c.pointer_up(&PointerEvent::new(30.0, 30.0));
    assert_eq!(
        model.borrow().get(key).and_then(|el| el.style.fill.clone()),
        Some(Fill::Solid("green".into()))
    );
}

#[test]
fn test_capture_blocks_second_controller() {
    let (mut a, model, _) = setup();
    let capture = a.capture().clone();
    let mut b = DesignController::new(DesignerSettings::default(), Arc::new(EventBus::new()))
        .with_capture(capture.clone());
    b.set_model(Some(model.clone()));

    assert!(a.pointer_down(&PointerEvent::new(30.0, 30.0)));
    assert!(capture.is_held_by(a.id()));
    assert!(!b.pointer_down(&PointerEvent::new(100.0, 100.0)));
    assert!(!b.pointer_move(&PointerEvent::new(110.0, 110.0)));

    a.pointer_up(&PointerEvent::new(30.0, 30.0));
    assert_eq!(capture.holder(), None);
    assert!(b.pointer_down(&PointerEvent::new(100.0, 100.0)));
    b.pointer_up(&PointerEvent::new(100.0, 100.0));
    assert_eq!(PointerCapture::default().holder(), None);
}

#[test]
fn test_drag_and_drop_events() {
    let (mut c, _, key) = setup();
    let payload = DragPayload::Text("hello".into());
    assert!(c.drag_enter(payload.clone(), Point::new(150.0, 150.0)));
    assert!(c.drag_over(Point::new(30.0, 30.0)));
    assert_eq!(c.drag_target(), Some(key));
    assert!(c.drag_drop(Point::new(30.0, 30.0)));
    assert!(c.gesture().is_idle());

    let drags: Vec<DragEvent> = c
        .bus()
        .history(None)
        .into_iter()
        .filter_map(|e| match e {
            DesignerEvent::Drag(d) => Some(d),
            _ => None,
        })
        .collect();
    assert!(matches!(drags[0], DragEvent::ViewEnter { .. }));
    assert!(drags.contains(&DragEvent::ElementEnter { key }));
    assert_eq!(
        drags.last(),
        Some(&DragEvent::ElementDrop { key, payload })
    );
    assert!(!c.drag_over(Point::new(1.0, 1.0)));
}

#[test]
fn test_removal_forgets_interaction_state() {
    let (mut c, model, key) = setup();
    c.select_element(key, true).expect("select");
    c.pointer_move(&PointerEvent::new(30.0, 30.0));
    assert_eq!(c.mouse_over(), Some(key));

    c.remove_element(key).expect("remove");
    assert!(c.selection().is_empty());
    assert_eq!(c.mouse_over(), None);
    assert!(model.borrow().is_empty());
    assert!(c
        .bus()
        .history(None)
        .contains(&DesignerEvent::Model(ModelEvent::ElementRemoved { key })));
    assert!(c.remove_element(key).is_err());
}

#[test]
fn test_duplicate_and_select_all() {
    let (mut c, model, key) = setup();
    c.select_element(key, true).expect("select");
    let ctrl_d = KeyEvent::new(Key::Char('d')).with_modifiers(Modifiers::ctrl());
    assert!(c.key_down(&ctrl_d));
    let copy = c.selection()[0];
    assert_ne!(copy, key);
    assert_eq!(bounds_of(&model, copy).location(), Point::new(20.0, 20.0));

    let ctrl_a = KeyEvent::new(Key::Char('a')).with_modifiers(Modifiers::ctrl());
    assert!(c.key_down(&ctrl_a));
    assert_eq!(c.selection().len(), 2);
    assert!(c.key_down(&KeyEvent::new(Key::Delete)));
    assert!(model.borrow().is_empty());
}

#[test]
fn test_z_order() {
    let (mut c, model, key) = setup();
    let top = c.add_element(rect(0.0, 0.0, 5.0, 5.0)).expect("add");
    assert!(c.move_element_to_top(key).expect("reorder"));
    assert_eq!(model.borrow().keys(), vec![top, key]);
    assert!(!c.move_element_forward(key).expect("reorder"));
    assert!(c.move_element_to_bottom(key).expect("reorder"));
    assert_eq!(model.borrow().keys(), vec![key, top]);
}

#[test]
fn test_disabled_controller_ignores_input() {
    let (mut c, _, _) = setup();
    c.set_enabled(false, Some("rgba(0,0,0,0.3)".into()));
    assert!(!c.pointer_down(&PointerEvent::new(30.0, 30.0)));
    assert!(!c.key_down(&KeyEvent::new(Key::Escape)));
    assert!(c.selection().is_empty());
}

#[test]
fn test_hover_redraws_only_when_hooks_change_something() {
    let (mut c, model, key) = setup();
    let redraws = Rc::new(Cell::new(0));
    c.bind_target(Box::new(CountingSurface(redraws.clone())));
    redraws.set(0);

    c.pointer_move(&PointerEvent::new(30.0, 30.0));
    c.pointer_move(&PointerEvent::new(150.0, 150.0));
    assert_eq!(redraws.get(), 0);

    if let Some(el) = model.borrow_mut().get_mut(key) {
        el.hooks.mouse_enter = Some("pushFill(yellow)".into());
    }
    c.pointer_move(&PointerEvent::new(30.0, 30.0));
    assert_eq!(redraws.get(), 1);
    assert_eq!(c.mouse_over(), Some(key));
}

#[test]
fn test_animation_ticks_timer_hooks() {
    let (mut c, model, key) = setup();
    if let Some(el) = model.borrow_mut().get_mut(key) {
        el.hooks.timer = Some("setFill(blue)".into());
    }
    let t0 = Instant::now();
    assert!(c.start_animation(t0).is_err());

    let redraws = Rc::new(Cell::new(0));
    c.bind_target(Box::new(CountingSurface(redraws.clone())));
    c.start_animation(t0).expect("start");
    assert!(c.is_animating());
    assert!(c.tick(t0 + Duration::from_millis(10)).is_none());

    let tick = c.tick(t0 + Duration::from_millis(60)).expect("tick");
    assert_eq!(tick.count, 1);
    assert_eq!(
        model.borrow().get(key).and_then(|el| el.style.fill.clone()),
        Some(Fill::Solid("blue".into()))
    );
    assert!(redraws.get() > 0);

    c.unbind_target();
    assert!(!c.is_animating());
}

#[test]
fn test_render_draws_selection_overlay() {
    let (mut c, _, key) = setup();
    c.viewport_mut().set_canvas_size(200.0, 200.0);
    c.select_element(key, true).expect("select");
    let mut pixmap = tiny_skia::Pixmap::new(200, 200).expect("pixmap");
    c.render(&mut pixmap);
    // Interior of the rectangle carries its fill.
    let inside = pixmap.pixel(35, 35).expect("pixel");
    assert_eq!(inside.alpha(), 255);
    // The SE handle is filled white.
    let handle = pixmap.pixel(60, 60).expect("pixel").demultiply();
    assert_eq!((handle.red(), handle.green(), handle.blue()), (255, 255, 255));
}
