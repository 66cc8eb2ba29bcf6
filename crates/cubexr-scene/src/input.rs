//! Input events delivered by the host to the scene component

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Screen-space rectangle of the element that receives pointer input
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Viewport anchored at the page origin
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Convert client coordinates to normalized device coordinates (y up)
    pub fn to_ndc(&self, client: Vec2) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        Some(Vec2::new(
            ((client.x - self.left) / self.width) * 2.0 - 1.0,
            -((client.y - self.top) / self.height) * 2.0 + 1.0,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Pointer position together with the receiving element's bounds at event time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub client: Vec2,
    pub bounds: Viewport,
}

impl PointerInput {
    pub fn new(client: Vec2, bounds: Viewport) -> Self {
        Self { client, bounds }
    }

    pub fn ndc(&self) -> Option<Vec2> {
        self.bounds.to_ndc(self.client)
    }
}

/// Everything the scene component reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        kind: PointerKind,
        pointer: PointerInput,
    },
    PointerMove {
        kind: PointerKind,
        pointer: PointerInput,
        /// Active touch points (1 for mouse)
        touches: usize,
    },
    PointerUp {
        kind: PointerKind,
    },
    Click {
        pointer: PointerInput,
    },
    Resize {
        width: f32,
        height: f32,
    },
    /// The session toggle button was pressed
    SessionToggle,
    SessionStarted,
    SessionEnded,
    /// The runtime rejected a session request
    SessionFailed {
        reason: String,
    },
}

/// Element a listener is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenTarget {
    Container,
    Window,
    SessionButton,
}

/// DOM-level event kinds the component subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    Click,
    Resize,
}

impl EventKind {
    /// DOM event type name
    pub fn dom_name(&self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::Click => "click",
            Self::Resize => "resize",
        }
    }
}
