//! Host input events and listener bookkeeping.
//!
//! Events arrive in client coordinates (relative to the host window). An
//! [`InteractionSource`] subtracts the surface's client-rect origin so the
//! field sees surface-local pixels, and only delivers events while its
//! listeners are attached.

use glam::DVec2;

/// Raw input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { client_x: f64, client_y: f64 },
    PointerLeave,
    Resize { width: usize, height: usize },
}

/// Kind of host listener an [`InteractionSource`] registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    PointerMove,
    PointerLeave,
    Resize,
}

impl Listener {
    pub const ALL: [Listener; 3] = [Listener::PointerMove, Listener::PointerLeave, Listener::Resize];

    fn accepts(self, event: &InputEvent) -> bool {
        matches!(
            (self, event),
            (Listener::PointerMove, InputEvent::PointerMove { .. })
                | (Listener::PointerLeave, InputEvent::PointerLeave)
                | (Listener::Resize, InputEvent::Resize { .. })
        )
    }
}

/// Registered listeners plus lifetime counters.
///
/// `attached` and `detached` let tests prove every listener registered at
/// start is removed exactly once at teardown.
#[derive(Debug, Default, Clone)]
pub struct ListenerSet {
    active: Vec<Listener>,
    attached: usize,
    detached: usize,
}

impl ListenerSet {
    /// Registers `listener` unless it is already active.
    pub fn attach(&mut self, listener: Listener) {
        if !self.active.contains(&listener) {
            self.active.push(listener);
            self.attached += 1;
        }
    }

    /// Removes every active listener and returns how many were removed.
    pub fn detach_all(&mut self) -> usize {
        let removed = self.active.len();
        self.active.clear();
        self.detached += removed;
        removed
    }

    pub fn is_attached(&self, listener: Listener) -> bool {
        self.active.contains(&listener)
    }

    pub fn active(&self) -> usize {
        self.active.len()
    }

    pub fn attached(&self) -> usize {
        self.attached
    }

    pub fn detached(&self) -> usize {
        self.detached
    }
}

/// An input event translated into field terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldInput {
    /// New pointer position in surface pixels, `None` when the pointer left.
    Pointer(Option<DVec2>),
    Resize { width: usize, height: usize },
}

/// Converts host events into surface-local field input.
#[derive(Debug, Clone, Default)]
pub struct InteractionSource {
    rect_origin: DVec2,
    listeners: ListenerSet,
}

impl InteractionSource {
    /// `rect_origin` is the surface's top-left corner in client coordinates.
    pub fn new(rect_origin: DVec2) -> Self {
        Self {
            rect_origin,
            listeners: ListenerSet::default(),
        }
    }

    /// Updates the client-rect origin, e.g. after the host scrolled or laid out again.
    pub fn set_rect_origin(&mut self, rect_origin: DVec2) {
        self.rect_origin = rect_origin;
    }

    pub fn attach(&mut self) {
        for listener in Listener::ALL {
            self.listeners.attach(listener);
        }
    }

    pub fn detach(&mut self) -> usize {
        self.listeners.detach_all()
    }

    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    /// Translates `event`, or returns `None` when no listener for it is attached.
    pub fn translate(&self, event: InputEvent) -> Option<FieldInput> {
        if !Listener::ALL
            .iter()
            .any(|l| l.accepts(&event) && self.listeners.is_attached(*l))
        {
            return None;
        }
        Some(match event {
            InputEvent::PointerMove { client_x, client_y } => {
                FieldInput::Pointer(Some(DVec2::new(client_x, client_y) - self.rect_origin))
            }
            InputEvent::PointerLeave => FieldInput::Pointer(None),
            InputEvent::Resize { width, height } => FieldInput::Resize { width, height },
        })
    }
}
