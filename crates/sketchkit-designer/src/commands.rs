//! String commands run by element hooks and the animation timer.
//!
//! A command is written `name(parameter)`; a hook may hold several separated
//! by `;`. Each registered name declares the kind of parameter it takes and
//! the raw text is converted before the handler runs. Unknown names, and
//! parameters that do not convert, are ignored and reported as not handled.

use sketchkit_core::{EventBus, ModelId, Shared};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, trace};

use crate::element::{Element, Hook, Shape};
use crate::fill::Fill;
use crate::model::Model;

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    /// Text between the parentheses, trimmed.
    pub argument: String,
}

impl Command {
    /// Parses `name(argument)` or a bare `name`.
    pub fn parse(input: &str) -> Option<Command> {
        let input = input.trim();
        let (name, argument) = match input.find('(') {
            Some(open) => {
                let inner = input[open + 1..].strip_suffix(')')?;
                (&input[..open], inner.trim())
            }
            None => (input, ""),
        };
        let name = name.trim();
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| Command {
            name: name.to_string(),
            argument: argument.to_string(),
        })
    }

    /// Splits a hook string on top-level `;` and parses each command.
    pub fn parse_list(input: &str) -> Vec<Command> {
        let mut commands = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (i, c) in input.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ';' if depth == 0 => {
                    commands.extend(Self::parse_logged(&input[start..i]));
                    start = i + 1;
                }
                _ => {}
            }
        }
        commands.extend(Self::parse_logged(&input[start..]));
        commands
    }

    fn parse_logged(part: &str) -> Option<Command> {
        if part.trim().is_empty() {
            return None;
        }
        let command = Self::parse(part);
        if command.is_none() {
            debug!("Ignoring malformed command '{}'", part.trim());
        }
        command
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    None,
    Number,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    None,
    Number(f64),
    Text(String),
}

impl Parameter {
    fn convert(argument: &str, kind: ParameterKind) -> Option<Parameter> {
        match kind {
            ParameterKind::None => Some(Parameter::None),
            ParameterKind::Number => argument.parse().ok().map(Parameter::Number),
            ParameterKind::Text => Some(Parameter::Text(argument.to_string())),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Parameter::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Parameter::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// What caused a command to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Hook(Hook),
    Direct,
}

/// What a handler can reach while it runs.
pub struct CommandContext<'a> {
    pub element: &'a mut Element,
    pub command: &'a Command,
    pub trigger: Trigger,
    /// Notification bus of the dispatching controller, if any.
    pub bus: Option<&'a EventBus>,
    redraw: bool,
}

impl CommandContext<'_> {
    /// Asks the host for a redraw even when the command reports not handled.
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }
}

/// Controller state shared by a run of dispatches.
///
/// `redraw` is set once any command was handled or a handler asked for it.
#[derive(Debug, Default)]
pub struct CommandScope<'a> {
    pub bus: Option<&'a EventBus>,
    pub redraw: bool,
}

impl<'a> CommandScope<'a> {
    pub fn new(bus: &'a EventBus) -> Self {
        Self {
            bus: Some(bus),
            redraw: false,
        }
    }
}

/// Returns whether the command did anything.
pub type CommandHandler = Rc<dyn Fn(&mut CommandContext<'_>, &Parameter) -> bool>;

#[derive(Clone, Default)]
pub struct CommandRouter {
    handlers: HashMap<String, (ParameterKind, CommandHandler)>,
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("CommandRouter")
            .field("commands", &names)
            .finish()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with the stack, frame and style commands registered.
    pub fn with_builtins() -> Self {
        let mut router = Self::new();

        router.register("pushFill", ParameterKind::Text, |ctx, param| {
            let el = &mut *ctx.element;
            el.fill_stack.push(el.style.fill.take());
            el.style.fill = param.as_text().map(Fill::parse);
            true
        });
        router.register("popFill", ParameterKind::None, |ctx, _| {
            let el = &mut *ctx.element;
            if let Some(previous) = el.fill_stack.pop() {
                el.style.fill = previous;
            }
            true
        });
        router.register("setFill", ParameterKind::Text, |ctx, param| {
            ctx.element.style.fill = param.as_text().map(Fill::parse);
            true
        });

        router.register("pushStroke", ParameterKind::Text, |ctx, param| {
            let el = &mut *ctx.element;
            el.stroke_stack.push(el.style.stroke.take());
            el.style.stroke = param.as_text().map(str::to_string);
            true
        });
        router.register("popStroke", ParameterKind::None, |ctx, _| {
            let el = &mut *ctx.element;
            if let Some(previous) = el.stroke_stack.pop() {
                el.style.stroke = previous;
            }
            true
        });
        router.register("setStroke", ParameterKind::Text, |ctx, param| {
            ctx.element.style.stroke = param.as_text().map(str::to_string);
            true
        });

        router.register("pushFrame", ParameterKind::Number, |ctx, param| {
            let el = &mut *ctx.element;
            let (Some(current), Some(frame)) = (el.sprite_frame(), param.as_number()) else {
                return false;
            };
            el.frame_stack.push(current);
            el.set_sprite_frame(frame.max(0.0) as u32)
        });
        router.register("popFrame", ParameterKind::None, |ctx, _| {
            let el = &mut *ctx.element;
            if el.sprite_frame().is_none() {
                return false;
            }
            if let Some(previous) = el.frame_stack.pop() {
                el.set_sprite_frame(previous);
            }
            true
        });
        router.register("setFrame", ParameterKind::Number, |ctx, param| {
            let frame = param.as_number().unwrap_or(0.0).max(0.0) as u32;
            ctx.element.set_sprite_frame(frame)
        });
        router.register("nextFrame", ParameterKind::None, |ctx, _| {
            match ctx.element.sprite_frame() {
                Some(frame) => ctx.element.set_sprite_frame(frame + 1),
                None => false,
            }
        });

        router
    }

    pub fn register<F>(&mut self, name: &str, kind: ParameterKind, handler: F)
    where
        F: Fn(&mut CommandContext<'_>, &Parameter) -> bool + 'static,
    {
        self.handlers
            .insert(name.to_string(), (kind, Rc::new(handler)));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Runs one command against an element.
    pub fn dispatch(&self, element: &mut Element, command: &Command, trigger: Trigger) -> bool {
        self.dispatch_in(element, command, trigger, &mut CommandScope::default())
    }

    /// Runs one command with access to the controller's `scope`.
    pub fn dispatch_in(
        &self,
        element: &mut Element,
        command: &Command,
        trigger: Trigger,
        scope: &mut CommandScope<'_>,
    ) -> bool {
        let Some((kind, handler)) = self.handlers.get(&command.name) else {
            debug!("No handler for command '{}'", command.name);
            return false;
        };
        let Some(parameter) = Parameter::convert(&command.argument, *kind) else {
            debug!(
                "Command '{}' ignored: bad parameter '{}'",
                command.name, command.argument
            );
            return false;
        };
        let mut ctx = CommandContext {
            element,
            command,
            trigger,
            bus: scope.bus,
            redraw: false,
        };
        let handled = handler(&mut ctx, &parameter);
        scope.redraw |= handled || ctx.redraw;
        trace!("{}({}) -> {}", command.name, command.argument, handled);
        handled
    }

    /// Runs every command in `text`; true if any was handled.
    pub fn dispatch_str(&self, element: &mut Element, text: &str, trigger: Trigger) -> bool {
        self.dispatch_str_in(element, text, trigger, &mut CommandScope::default())
    }

    pub fn dispatch_str_in(
        &self,
        element: &mut Element,
        text: &str,
        trigger: Trigger,
        scope: &mut CommandScope<'_>,
    ) -> bool {
        let mut handled = false;
        for command in Command::parse_list(text) {
            handled |= self.dispatch_in(element, &command, trigger, scope);
        }
        handled
    }

    /// Runs the element's hook for `hook`, if it has one.
    pub fn dispatch_hook(&self, element: &mut Element, hook: Hook) -> bool {
        self.dispatch_hook_in(element, hook, &mut CommandScope::default())
    }

    pub fn dispatch_hook_in(
        &self,
        element: &mut Element,
        hook: Hook,
        scope: &mut CommandScope<'_>,
    ) -> bool {
        let Some(text) = element.hooks.get(hook).map(str::to_string) else {
            return false;
        };
        self.dispatch_str_in(element, &text, Trigger::Hook(hook), scope)
    }

    /// Runs the timer hook of every element in the model and, once each, in
    /// every sub-model its `model` elements embed. Returns the number of
    /// elements changed.
    pub fn dispatch_timer(&self, model: &mut Model) -> usize {
        self.dispatch_timer_in(model, &mut CommandScope::default())
    }

    pub fn dispatch_timer_in(&self, model: &mut Model, scope: &mut CommandScope<'_>) -> usize {
        let mut visited = HashSet::new();
        self.tick_model(model, scope, &mut visited)
    }

    fn tick_model(
        &self,
        model: &mut Model,
        scope: &mut CommandScope<'_>,
        visited: &mut HashSet<ModelId>,
    ) -> usize {
        if !visited.insert(model.id()) {
            return 0;
        }
        let mut handled = 0;
        for element in model.elements_mut() {
            if self.dispatch_hook_in(element, Hook::Timer, scope) {
                handled += 1;
            }
        }
        let embedded: Vec<Shared<Model>> = model
            .elements()
            .iter()
            .filter_map(|el| match el.shape() {
                Shape::SubModel(s) => model.resources().model(&s.source),
                _ => None,
            })
            .collect();
        for sub in embedded {
            match sub.try_borrow_mut() {
                Ok(mut sub) => handled += self.tick_model(&mut sub, scope, visited),
                Err(_) => debug!("Sub-model already borrowed, skipping timer"),
            }
        }
        handled
    }
}
