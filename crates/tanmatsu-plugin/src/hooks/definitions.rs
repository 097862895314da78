//! Input event definitions and hook dispatch outcomes.

use serde::{Deserialize, Serialize};

use crate::arena::define_handle;

define_handle!(
    /// Host-assigned handle of a registered input hook.
    HookId
);

/// Modifier keys held while an input event was generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub function: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
        function: false,
    };

    /// Returns whether any modifier is held.
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta || self.function
    }
}

/// Keys reported as navigation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKey {
    Up,
    Down,
    Left,
    Right,
    Return,
    Esc,
    Backspace,
    Tab,
    Home,
    Menu,
    VolumeUp,
    VolumeDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
}

/// Dedicated hardware actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PowerButton,
    SdCard,
    AudioJack,
}

/// An input event as delivered to input hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// A printable key was typed.
    Keyboard {
        /// The produced character.
        ascii: char,
        /// Modifiers held at the time.
        modifiers: Modifiers,
    },
    /// A navigation key changed state.
    Navigation {
        key: NavigationKey,
        pressed: bool,
        modifiers: Modifiers,
    },
    /// A hardware action changed state.
    Action { action: ActionKind, pressed: bool },
    /// Raw keyboard matrix scancode.
    Scancode { code: u16, pressed: bool },
}

impl InputEvent {
    /// Convenience constructor for a typed character without modifiers.
    pub fn key(ascii: char) -> Self {
        Self::Keyboard {
            ascii,
            modifiers: Modifiers::NONE,
        }
    }

    /// Convenience constructor for a navigation key press.
    pub fn nav_press(key: NavigationKey) -> Self {
        Self::Navigation {
            key,
            pressed: true,
            modifiers: Modifiers::NONE,
        }
    }

    /// Returns whether this event represents a key going down.
    ///
    /// Keyboard events are only generated on press.
    pub fn is_press(&self) -> bool {
        match self {
            Self::Keyboard { .. } => true,
            Self::Navigation { pressed, .. }
            | Self::Action { pressed, .. }
            | Self::Scancode { pressed, .. } => *pressed,
        }
    }

    /// Short name of the event type, used in log fields.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Keyboard { .. } => "keyboard",
            Self::Navigation { .. } => "navigation",
            Self::Action { .. } => "action",
            Self::Scancode { .. } => "scancode",
        }
    }
}

/// Action returned by an input hook telling the dispatcher what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookAction {
    /// Pass the event on to later hooks and the launcher.
    Continue,
    /// Stop propagation; later hooks and the launcher never see the event.
    Consume,
}

impl HookAction {
    /// Maps a "consumed" flag to an action.
    pub fn consumed(consumed: bool) -> Self {
        if consumed { Self::Consume } else { Self::Continue }
    }
}

/// Result of dispatching one input event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Whether a hook consumed the event.
    pub consumed: bool,
    /// Hook that consumed the event.
    pub consumed_by: Option<HookId>,
    /// Owner of the consuming hook.
    pub consumed_owner: Option<String>,
    /// Hooks invoked, in invocation order.
    pub invoked: Vec<HookId>,
}

impl DispatchResult {
    /// Returns whether the launcher should run its default handling.
    pub fn propagate(&self) -> bool {
        !self.consumed
    }
}
