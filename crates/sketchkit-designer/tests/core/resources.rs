use sketchkit_core::{
    shared, DesignerEvent, DiagnosticEvent, EventBus, EventBusConfig, ResourceError, Size,
};
use sketchkit_designer::{
    DesignController, ElementFactory, ElementRecord, FileLoader, MemoryLoader, Model,
    ResourceLoader, ResourceManager,
};
use sketchkit_settings::DesignerSettings;
use std::sync::Arc;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .expect("encode");
    bytes
}

fn image_record(source: &str) -> ElementRecord {
    ElementRecord {
        location: Some("0,0".into()),
        size: Some("16,16".into()),
        source: Some(source.into()),
        ..ElementRecord::new("image")
    }
}

fn controller_with_empty_model() -> (DesignController, sketchkit_core::Shared<Model>) {
    let bus = Arc::new(EventBus::with_config(EventBusConfig {
        enable_history: true,
        ..Default::default()
    }));
    let mut controller = DesignController::new(DesignerSettings::default(), bus);
    let model = shared(Model::new(Size::new(64.0, 64.0)));
    controller.set_model(Some(model.clone()));
    (controller, model)
}

#[tokio::test]
async fn test_model_resources_load_from_memory() {
    let json = r#"{
        "size": "32,32",
        "elements": [
            { "type": "image", "location": "0,0", "size": "8,8", "source": "tile.png" },
            { "type": "model", "location": "8,8", "size": "8,8", "source": "badge.json" }
        ]
    }"#;
    let badge = r#"{ "size": "4,4", "elements": [ { "type": "image", "size": "4,4", "source": "tile.png" } ] }"#;
    let loader = MemoryLoader::new()
        .with("tile.png", png(2, 2))
        .with("badge.json", badge);
    let factory = ElementFactory::with_builtins();

    let mut model = Model::from_json(json, &factory).expect("model");
    assert!(!model.resources().is_loaded());
    model
        .resources_mut()
        .try_load(&loader, &factory)
        .await
        .expect("load");

    assert!(model.resources().is_loaded());
    assert_eq!(model.resources().image("tile.png").map(|p| p.width()), Some(2));
    let badge = model.resources().model("badge.json").expect("sub-model");
    assert!(badge.borrow().resources().is_loaded());
}

#[tokio::test]
async fn test_missing_resource_fails_load() {
    let mut rm = ResourceManager::new();
    rm.register_key(sketchkit_designer::ResourceRef::new(
        sketchkit_designer::ResourceKind::Image,
        "absent.png",
    ));
    let result = rm
        .try_load(&MemoryLoader::new(), &ElementFactory::with_builtins())
        .await;
    assert!(matches!(result, Err(ResourceError::LoadFailed { .. })));
    assert!(!rm
        .load(&MemoryLoader::new(), &ElementFactory::with_builtins())
        .await);
}

#[tokio::test]
async fn test_file_loader_reads_relative_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("logo.png"), png(3, 1)).expect("write");
    let loader = FileLoader::new(dir.path());

    let bytes = loader.fetch("logo.png").await.expect("fetch");
    assert!(!bytes.is_empty());
    assert!(matches!(
        loader.fetch("nope.png").await,
        Err(ResourceError::LoadFailed { .. })
    ));
}

#[tokio::test]
async fn test_create_element_loads_then_adds() {
    let (mut c, model) = controller_with_empty_model();
    let loader = MemoryLoader::new().with("logo.png", png(4, 4));

    let key = c
        .create_element(&image_record("logo.png"), &loader)
        .await
        .expect("created");

    let model = model.borrow();
    assert!(model.contains(key));
    assert!(model.resources().image("logo.png").is_some());
}

#[tokio::test]
async fn test_create_element_failure_adds_nothing() {
    let (mut c, model) = controller_with_empty_model();

    let result = c
        .create_element(&image_record("missing.png"), &MemoryLoader::new())
        .await;

    assert!(result.is_err());
    assert!(model.borrow().is_empty());
    assert!(model.borrow().resources().is_empty());
    assert!(c.bus().history(None).iter().any(|e| matches!(
        e,
        DesignerEvent::Diagnostic(DiagnosticEvent::CreationFailed { element_type, .. })
            if element_type == "image"
    )));
}

#[tokio::test]
async fn test_self_referencing_sub_model_fails_load() {
    let doc = r#"{ "elements": [ { "type": "model", "size": "4,4", "source": "loop.json" } ] }"#;
    let loader = MemoryLoader::new().with("loop.json", doc);
    let factory = ElementFactory::with_builtins();

    let mut model = Model::from_json(doc, &factory).expect("model");
    assert!(!model.resources_mut().load(&loader, &factory).await);
    assert!(model.resources().model("loop.json").is_none());
}

#[tokio::test]
async fn test_sub_model_cycle_through_another_document_fails_load() {
    let a = r#"{ "elements": [ { "type": "model", "size": "4,4", "source": "b.json" } ] }"#;
    let b = r#"{ "elements": [ { "type": "model", "size": "4,4", "source": "a.json" } ] }"#;
    let loader = MemoryLoader::new().with("a.json", a).with("b.json", b);
    let factory = ElementFactory::with_builtins();

    let mut model = Model::from_json(a, &factory).expect("model");
    let result = model.resources_mut().try_load(&loader, &factory).await;
    assert!(matches!(
        result,
        Err(ResourceError::LoadFailed { ref reason, .. }) if reason.contains("cyclic")
    ));
}

#[tokio::test]
async fn test_shared_sub_model_is_not_a_cycle() {
    let leaf = r#"{ "size": "2,2", "elements": [] }"#;
    let left = r#"{ "elements": [ { "type": "model", "size": "2,2", "source": "leaf.json" } ] }"#;
    let root = r#"{
        "elements": [
            { "type": "model", "size": "4,4", "source": "left.json" },
            { "type": "model", "location": "4,0", "size": "4,4", "source": "leaf.json" }
        ]
    }"#;
    let loader = MemoryLoader::new()
        .with("leaf.json", leaf)
        .with("left.json", left);
    let factory = ElementFactory::with_builtins();

    let mut model = Model::from_json(root, &factory).expect("model");
    assert!(model.resources_mut().load(&loader, &factory).await);
    assert!(model.resources().is_loaded());
}
