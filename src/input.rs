use crossterm::event::{Event, MouseButton, MouseEvent, MouseEventKind};

/// Pointer input as the simulator sees it. Coordinates are in the same
/// space as the viewport handed to the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Start { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    End,
    /// Pointer left the surface mid-drag; treated like a release
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

/// Reduces a multi-touch event to a pointer event using the first active
/// touch. Start and move without any touch point carry no position and are
/// dropped.
pub fn from_touches(phase: TouchPhase, touches: &[TouchPoint]) -> Option<PointerEvent> {
    match phase {
        TouchPhase::Start => touches
            .first()
            .map(|t| PointerEvent::Start { x: t.x, y: t.y }),
        TouchPhase::Move => touches
            .first()
            .map(|t| PointerEvent::Move { x: t.x, y: t.y }),
        TouchPhase::End => Some(PointerEvent::End),
        TouchPhase::Cancel => Some(PointerEvent::Leave),
    }
}

/// Maps a terminal event to a pointer event. Only the left button drags.
pub fn from_terminal(event: &Event) -> Option<PointerEvent> {
    match event {
        Event::Mouse(mouse) => from_mouse(mouse),
        Event::FocusLost => Some(PointerEvent::Leave),
        _ => None,
    }
}

fn from_mouse(mouse: &MouseEvent) -> Option<PointerEvent> {
    let x = f64::from(mouse.column);
    let y = f64::from(mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Start { x, y }),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Move { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::End),
        _ => None,
    }
}
