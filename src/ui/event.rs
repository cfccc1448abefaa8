use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Input event record. The core only inspects these fields; producing them
/// from a windowing backend (and any serialization) lives outside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiEvent {
    PointerDown { position: Vec2, button: MouseButton },
    PointerUp { position: Vec2, button: MouseButton },
    PointerMoved { position: Vec2 },
    Wheel { position: Vec2, delta: f32 },
    KeyDown { key: u32 },
    KeyUp { key: u32 },
}

impl UiEvent {
    pub fn position(&self) -> Option<Vec2> {
        match *self {
            UiEvent::PointerDown { position, .. }
            | UiEvent::PointerUp { position, .. }
            | UiEvent::PointerMoved { position }
            | UiEvent::Wheel { position, .. } => Some(position),
            UiEvent::KeyDown { .. } | UiEvent::KeyUp { .. } => None,
        }
    }
}
