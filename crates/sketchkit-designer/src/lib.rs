//! # SketchKit Designer
//!
//! A retained 2D vector scene with an interactive editing controller.
//!
//! ## Components
//!
//! - **Elements**: rectangles, lines, polylines, polygons, paths, text,
//!   images, sprites and nested sub-models behind one [`Element`] wrapper
//! - **Model**: the ordered element collection with its size, background
//!   and [`ResourceManager`]
//! - **Fills**: colours, gradients and resource references resolved through
//!   the parent chain by [`FillResolver`]
//! - **Commands**: named stack operations bound to element event hooks and
//!   run by the [`CommandRouter`]
//! - **Controller**: pointer, keyboard and drag handling with selection,
//!   moving, resizing, point editing and rubber-band selection
//! - **Rendering**: tiny-skia rasterisation of models and editing overlays
//!
//! ## Architecture
//!
//! ```text
//! DesignController
//!   ├── Viewport (pixel <-> model mapping)
//!   ├── HandleFactory (resize / point handles)
//!   ├── CommandRouter (hook dispatch, animation timer)
//!   └── Model
//!         ├── Elements (Shape variants)
//!         └── ResourceManager (images, sub-models)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sketchkit_core::{shared, EventBus, Size};
//! use sketchkit_designer::{DesignController, Model, PointerEvent};
//!
//! let mut controller = DesignController::new(settings, Arc::new(EventBus::default()));
//! controller.set_model(Some(shared(Model::new(Size::new(400.0, 300.0)))));
//! controller.pointer_down(PointerEvent::new(20.0, 20.0));
//! ```

pub mod color;
pub mod commands;
pub mod controller;
pub mod element;
pub mod factory;
pub mod fill;
pub mod font_manager;
pub mod grid;
pub mod handles;
pub mod model;
pub mod renderer;
pub mod resources;
pub mod serialization;
pub mod timer;
pub mod transform;
pub mod viewport;

pub use commands::{
    Command, CommandContext, CommandHandler, CommandRouter, CommandScope, Parameter, ParameterKind,
    Trigger,
};
pub use controller::{
    ClickAction, Cursor, DesignController, GestureState, HostSurface, Key, KeyEvent, Modifiers,
    MouseButton, PointerCapture, PointerEvent, TentativePoint,
};
pub use element::{
    Depth, Element, ElementShape, EventHooks, Hook, InteractionFlags, Shape, Style, WindingRule,
};
pub use factory::{ElementFactory, ShapeBuilder};
pub use fill::{Fill, FillReference, FillResolver, GradientStop, LinearGradient, RadialGradient};
pub use handles::{
    Handle, HandleFactory, HandleKind, HandleSet, HandleShape, ResizeConstraints, ResizeDirection,
};
pub use model::Model;
pub use renderer::{draw_element, draw_model, render_model, render_to_size, to_rgba_image};
pub use resources::{
    FileLoader, MemoryLoader, Resource, ResourceKind, ResourceLoader, ResourceManager, ResourceRef,
};
pub use serialization::{ElementRecord, ModelRecord};
pub use timer::{AnimationTimer, Tick, TimerState};
pub use transform::TransformExpr;
pub use viewport::Viewport;
