use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Pressed,
    Released,
    Clicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input delivered to a menu owner, in owner-relative coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub button: PointerButton,
    pub ctrl: bool,
    pub x: i32,
    pub y: i32,
    consumed: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, button: PointerButton, x: i32, y: i32) -> Self {
        Self {
            kind,
            button,
            ctrl: false,
            x,
            y,
            consumed: false,
        }
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    /// Marks the event as handled so the owner does not process it further.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

pub trait TriggerClassifier {
    fn is_popup_trigger(&self, event: &PointerEvent) -> bool;
}

/// Which half of a click opens context menus on this platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPhase {
    Press,
    Release,
}

impl TriggerPhase {
    fn matches(self, kind: PointerEventKind) -> bool {
        matches!(
            (self, kind),
            (TriggerPhase::Press, PointerEventKind::Pressed)
                | (TriggerPhase::Release, PointerEventKind::Released)
        )
    }
}

/// Secondary-button classifier following desktop conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformClassifier {
    pub phase: TriggerPhase,
    /// Also treat ctrl + primary button as a trigger (macOS one-button mice).
    pub ctrl_click: bool,
}

impl PlatformClassifier {
    pub fn new(phase: TriggerPhase, ctrl_click: bool) -> Self {
        Self { phase, ctrl_click }
    }
}

impl Default for PlatformClassifier {
    fn default() -> Self {
        let phase = if cfg!(windows) {
            TriggerPhase::Release
        } else {
            TriggerPhase::Press
        };
        Self {
            phase,
            ctrl_click: cfg!(target_os = "macos"),
        }
    }
}

impl TriggerClassifier for PlatformClassifier {
    fn is_popup_trigger(&self, event: &PointerEvent) -> bool {
        if !self.phase.matches(event.kind) {
            return false;
        }
        match event.button {
            PointerButton::Secondary => true,
            PointerButton::Primary => self.ctrl_click && event.ctrl,
            PointerButton::Middle => false,
        }
    }
}
