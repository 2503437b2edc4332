use sketchkit_core::{shared, DesignerEvent, EventBus, EventBusConfig, ModelEvent, Point, Size};
use sketchkit_designer::element::{RectangleShape, SpriteShape, SubModelShape};
use sketchkit_designer::resources::{Resource, ResourceContent};
use sketchkit_designer::{
    Command, CommandRouter, CommandScope, Element, Fill, Hook, Model, ParameterKind, ResourceKind,
    Shape, Trigger,
};

fn rect() -> Element {
    Element::new(Shape::Rectangle(RectangleShape::new(
        Point::new(0.0, 0.0),
        Size::new(10.0, 10.0),
    )))
}

#[test]
fn test_fill_push_pop_is_symmetric() {
    let router = CommandRouter::with_builtins();
    let mut el = rect().with_fill("Blue");

    assert!(router.dispatch_str(&mut el, "pushFill(Red)", Trigger::Direct));
    assert!(router.dispatch_str(&mut el, "pushFill(Green)", Trigger::Direct));
    assert_eq!(el.style.fill, Some(Fill::Solid("Green".into())));

    assert!(router.dispatch_str(&mut el, "popFill; popFill", Trigger::Direct));
    assert_eq!(el.style.fill, Some(Fill::Solid("Blue".into())));
    assert!(el.fill_stack.is_empty());

    // Popping past the bottom leaves the fill alone.
    assert!(router.dispatch_str(&mut el, "popFill", Trigger::Direct));
    assert_eq!(el.style.fill, Some(Fill::Solid("Blue".into())));
}

#[test]
fn test_hook_runs_command_list() {
    let router = CommandRouter::with_builtins();
    let mut el = rect().with_fill("white");
    el.hooks.mouse_enter = Some("pushFill(yellow); setStroke(black)".into());
    el.hooks.mouse_leave = Some("popFill".into());

    assert!(router.dispatch_hook(&mut el, Hook::MouseEnter));
    assert_eq!(el.style.fill, Some(Fill::Solid("yellow".into())));
    assert_eq!(el.style.stroke.as_deref(), Some("black"));

    assert!(router.dispatch_hook(&mut el, Hook::MouseLeave));
    assert_eq!(el.style.fill, Some(Fill::Solid("white".into())));
    assert!(!router.dispatch_hook(&mut el, Hook::Click));
}

#[test]
fn test_custom_command_receives_number() {
    let mut router = CommandRouter::new();
    router.register("grow", ParameterKind::Number, |ctx, param| {
        let Some(by) = param.as_number() else {
            return false;
        };
        let size = ctx.element.size();
        ctx.element.set_size(Size::new(size.width + by, size.height + by));
        true
    });
    let mut el = rect();
    assert!(router.dispatch_str(&mut el, "grow(5)", Trigger::Direct));
    assert_eq!(el.size(), Size::new(15.0, 15.0));
    assert!(!router.dispatch_str(&mut el, "grow(lots)", Trigger::Direct));
    assert!(!router.dispatch_str(&mut el, "shrink(5)", Trigger::Direct));
}

#[test]
fn test_timer_reaches_sub_models() {
    let router = CommandRouter::with_builtins();

    let mut inner = Model::new(Size::new(10.0, 10.0));
    let mut sprite = Element::new(Shape::Sprite(SpriteShape::new(
        Point::ORIGIN,
        Size::new(10.0, 10.0),
        "walk.png",
        4,
    )));
    sprite.hooks.timer = Some("nextFrame".into());
    let sprite_key = inner.add(sprite);
    let inner = shared(inner);

    let mut outer = Model::new(Size::new(50.0, 50.0));
    let mut blinker = rect().with_fill("red");
    blinker.hooks.timer = Some("setFill(blue)".into());
    let blinker_key = outer.add(blinker);
    outer.add(Element::new(Shape::SubModel(SubModelShape::new(
        Point::new(20.0, 20.0),
        Size::new(10.0, 10.0),
        "inner.json",
    ))));
    outer.resources_mut().register(
        Resource::from_key(ResourceKind::Model, "inner.json")
            .with_content(ResourceContent::Model(inner.clone())),
    );

    assert_eq!(router.dispatch_timer(&mut outer), 2);
    assert_eq!(
        outer.get(blinker_key).and_then(|el| el.style.fill.clone()),
        Some(Fill::Solid("blue".into()))
    );
    assert_eq!(
        inner.borrow().get(sprite_key).and_then(|el| el.sprite_frame()),
        Some(1)
    );
}

#[test]
fn test_timer_skips_sub_models_no_element_embeds() {
    let router = CommandRouter::with_builtins();

    let mut unused = Model::new(Size::new(10.0, 10.0));
    let mut ticker = rect().with_fill("red");
    ticker.hooks.timer = Some("setFill(blue)".into());
    let ticker_key = unused.add(ticker);
    let unused = shared(unused);

    let mut outer = Model::new(Size::new(50.0, 50.0));
    outer.resources_mut().register(
        Resource::from_key(ResourceKind::Model, "unused.json")
            .with_content(ResourceContent::Model(unused.clone())),
    );

    assert_eq!(router.dispatch_timer(&mut outer), 0);
    assert_eq!(
        unused.borrow().get(ticker_key).and_then(|el| el.style.fill.clone()),
        Some(Fill::Solid("red".into()))
    );
}

#[test]
fn test_handler_reaches_bus_and_requests_redraw() {
    let bus = EventBus::with_config(EventBusConfig {
        enable_history: true,
        ..Default::default()
    });
    let mut router = CommandRouter::new();
    router.register("announce", ParameterKind::None, |ctx, _| {
        if let Some(bus) = ctx.bus {
            bus.publish(DesignerEvent::Model(ModelEvent::Updated));
        }
        ctx.request_redraw();
        false
    });
    let mut el = rect();

    let mut scope = CommandScope::new(&bus);
    let command = Command::parse("announce()").expect("command");
    assert!(!router.dispatch_in(&mut el, &command, Trigger::Direct, &mut scope));
    assert!(scope.redraw);
    assert!(bus
        .history(None)
        .contains(&DesignerEvent::Model(ModelEvent::Updated)));

    let mut quiet = CommandScope::new(&bus);
    assert!(!router.dispatch_str_in(&mut el, "unknown(1)", Trigger::Direct, &mut quiet));
    assert!(!quiet.redraw);
}
