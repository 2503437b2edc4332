use sketchkit_designer::fill::fill_for_element;
use sketchkit_designer::{render_model, ElementFactory, Fill, Model};
use tiny_skia::Pixmap;

const FAMILY: &str = r#"{
    "size": "40,20",
    "background": "white",
    "elements": [
        { "type": "rectangle", "id": "parent", "location": "0,0", "size": "20,20", "fill": "Red" },
        { "type": "rectangle", "id": "child", "location": "20,0", "size": "10,20", "parent": "parent" },
        { "type": "rectangle", "id": "grandchild", "location": "30,0", "size": "10,20", "parent": "child" }
    ]
}"#;

fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
    let c = pixmap.pixel(x, y).expect("in range").demultiply();
    [c.red(), c.green(), c.blue(), c.alpha()]
}

#[test]
fn test_fill_inherited_through_parent_chain() {
    let model = Model::from_json(FAMILY, &ElementFactory::with_builtins()).expect("model");
    let grandchild = model.find_by_id("grandchild").expect("grandchild");
    assert_eq!(
        fill_for_element(grandchild, &model),
        Some(&Fill::Solid("Red".into()))
    );

    let pixmap = render_model(&model, None).expect("pixmap");
    assert_eq!(pixel(&pixmap, 25, 10), [255, 0, 0, 255]);
    assert_eq!(pixel(&pixmap, 35, 10), [255, 0, 0, 255]);
}

#[test]
fn test_own_fill_wins_over_parent() {
    let mut model = Model::from_json(FAMILY, &ElementFactory::with_builtins()).expect("model");
    let key = model.find_by_id("child").expect("child").key();
    if let Some(child) = model.get_mut(key) {
        child.style.fill = Some(Fill::parse("#00ff00"));
    }
    let pixmap = render_model(&model, None).expect("pixmap");
    assert_eq!(pixel(&pixmap, 25, 10), [0, 255, 0, 255]);
    assert_eq!(pixel(&pixmap, 35, 10), [0, 255, 0, 255]);
    assert_eq!(pixel(&pixmap, 5, 10), [255, 0, 0, 255]);
}

#[test]
fn test_unknown_parent_id_is_rejected() {
    let json = r#"{ "size": "10,10", "elements": [ { "type": "rectangle", "parent": "ghost" } ] }"#;
    assert!(Model::from_json(json, &ElementFactory::with_builtins()).is_err());
}
