//! Camera Manipulator Bindings
//!
//! Declarative mapping from pointer buttons and modifier keys to camera
//! actions on an interactor style. Settings are compared by value so a view
//! only rebuilds the engine-side manipulator list when the bindings really
//! change, not on every prop update.

use serde_json::json;

use crate::engine::{EngineHandle, PropBag, RenderingBackend};
use crate::errors::Result;
use crate::picking::{ModifierKeys, PointerButton};

/// Camera action a pointer binding drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulatorAction {
    Pan,
    Zoom,
    Roll,
    Rotate,
    MultiRotate,
    ZoomToMouse,
    Select,
}

impl ManipulatorAction {
    /// Engine class implementing the action.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Pan => "PanManipulator",
            Self::Zoom => "ZoomManipulator",
            Self::Roll => "RollManipulator",
            Self::Rotate => "RotateManipulator",
            Self::MultiRotate => "MultiRotateManipulator",
            Self::ZoomToMouse => "ZoomToMouseManipulator",
            Self::Select => "SelectManipulator",
        }
    }
}

/// One pointer-to-action binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulatorSettings {
    pub action: ManipulatorAction,
    pub button: PointerButton,
    pub modifiers: ModifierKeys,
    pub drag_enabled: bool,
    pub scroll_enabled: bool,
}

impl ManipulatorSettings {
    #[must_use]
    pub fn new(action: ManipulatorAction, button: PointerButton) -> Self {
        Self {
            action,
            button,
            modifiers: ModifierKeys::empty(),
            drag_enabled: true,
            scroll_enabled: false,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: ModifierKeys) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_scroll(mut self) -> Self {
        self.scroll_enabled = true;
        self
    }
}

/// Rotate on left, pan on middle, zoom on right drag or scroll, and
/// rubber-band select on shift-left.
#[must_use]
pub fn default_settings() -> Vec<ManipulatorSettings> {
    vec![
        ManipulatorSettings::new(ManipulatorAction::Rotate, PointerButton::Left),
        ManipulatorSettings::new(ManipulatorAction::Pan, PointerButton::Middle),
        ManipulatorSettings::new(ManipulatorAction::Zoom, PointerButton::Right).with_scroll(),
        ManipulatorSettings::new(ManipulatorAction::Select, PointerButton::Left)
            .with_modifiers(ModifierKeys::SHIFT),
    ]
}

/// Clears and repopulates `style`'s manipulator list from `settings`.
///
/// A gesture manipulator is always installed first so touch input works
/// regardless of the configured pointer bindings. Clearing destroys the
/// previous manipulator objects; the style owns them.
pub fn rebuild_manipulators(
    backend: &mut dyn RenderingBackend,
    style: EngineHandle,
    settings: &[ManipulatorSettings],
) -> Result<()> {
    backend.clear_manipulators(style);
    let gesture = backend.create("GestureManipulator", &PropBag::new())?;
    backend.add_manipulator(style, gesture);
    for entry in settings {
        let mut props = PropBag::new();
        props.insert("button".into(), json!(entry.button.number()));
        props.insert("shift".into(), json!(entry.modifiers.contains(ModifierKeys::SHIFT)));
        props.insert("control".into(), json!(entry.modifiers.contains(ModifierKeys::CONTROL)));
        props.insert("alt".into(), json!(entry.modifiers.contains(ModifierKeys::ALT)));
        props.insert("dragEnabled".into(), json!(entry.drag_enabled));
        props.insert("scrollEnabled".into(), json!(entry.scroll_enabled));
        let manipulator = backend.create(entry.action.class(), &props)?;
        backend.add_manipulator(style, manipulator);
    }
    Ok(())
}
