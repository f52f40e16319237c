//! Interfaces to the parts of the window manager that talk to the server.
//!
//! The core never touches windows directly. It hands geometry to a
//! [`Frame`], window properties to [`Properties`] and iconify or urgency
//! changes to a [`Taskbar`].

use crate::{
    core::{decoration::Decoration, StateFlag, WinState, WindowType, Xid},
    geometry::{Extents, Rectangle},
};
use serde::Serialize;

/// Geometry and decoration of client windows
pub(crate) trait Frame {
    /// Space the decoration takes around a client's content
    fn extents(&self, id: Xid, window_type: WindowType) -> Extents;
    /// Move and resize the decoration frame of a client
    fn apply_rect(&mut self, id: Xid, frame: Rectangle);
    /// Map a client
    fn show(&mut self, id: Xid);
    /// Unmap a client
    fn hide(&mut self, id: Xid);
    /// Switch between the focused and unfocused look
    fn set_dimmed(&mut self, id: Xid, dimmed: bool);
    /// Apply a stacking order, top-most first
    fn restack(&mut self, order: &[Xid]);
}

/// Window-manager and EWMH properties
pub(crate) trait Properties {
    /// Publish the state of a client
    fn write_state(&mut self, id: Xid, state: WinState);
    /// Publish the desktops a client is on
    fn write_desktop(&mut self, id: Xid, mask: u32);
    /// Publish the active window
    fn set_active_window(&mut self, id: Option<Xid>);
    /// Publish the visible desktop
    fn set_current_desktop(&mut self, desktop: usize);
}

/// Taskbar notifications
pub(crate) trait Taskbar {
    /// Number of clients demanding attention on a desktop changed
    fn attention_changed(&mut self, desktop: usize, count: u32);
    /// A client was iconified
    fn iconified(&mut self, id: Xid);
    /// A client was restored from the taskbar
    fn deiconified(&mut self, id: Xid);
}

/// One call made to a collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "call")]
pub(crate) enum Call {
    ApplyRect { id: Xid, frame: Rectangle },
    Show { id: Xid },
    Hide { id: Xid },
    Dim { id: Xid, dimmed: bool },
    Restack { order: Vec<Xid> },
    State { id: Xid, atoms: Vec<&'static str> },
    Desktop { id: Xid, mask: u32 },
    Active { id: Option<Xid> },
    CurrentDesktop { desktop: usize },
    Attention { desktop: usize, count: u32 },
    Iconified { id: Xid },
    Deiconified { id: Xid },
}

/// Collaborator that remembers every call instead of talking to a server
#[derive(Debug, Default, Clone)]
pub(crate) struct Recorder {
    /// Decoration given to decorated windows
    decoration: Decoration,
    /// Calls in the order they were made
    pub(crate) calls: Vec<Call>,
}

impl Recorder {
    /// Create a new [`Recorder`]
    pub(crate) fn new(decoration: Decoration) -> Self {
        Self {
            decoration,
            calls: vec![],
        }
    }

    /// Forget the calls made so far, returning them
    pub(crate) fn drain(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Last rectangle applied to a client
    #[cfg(test)]
    pub(crate) fn last_rect(&self, id: Xid) -> Option<Rectangle> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::ApplyRect { id: target, frame } if *target == id => Some(*frame),
            _ => None,
        })
    }
}

impl Frame for Recorder {
    fn extents(&self, _id: Xid, window_type: WindowType) -> Extents {
        if window_type.is_undecorated() {
            Extents::EMPTY
        } else {
            self.decoration.extents()
        }
    }

    fn apply_rect(&mut self, id: Xid, frame: Rectangle) {
        self.calls.push(Call::ApplyRect { id, frame });
    }

    fn show(&mut self, id: Xid) {
        self.calls.push(Call::Show { id });
    }

    fn hide(&mut self, id: Xid) {
        self.calls.push(Call::Hide { id });
    }

    fn set_dimmed(&mut self, id: Xid, dimmed: bool) {
        self.calls.push(Call::Dim { id, dimmed });
    }

    fn restack(&mut self, order: &[Xid]) {
        self.calls.push(Call::Restack {
            order: order.to_vec(),
        });
    }
}

impl Properties for Recorder {
    fn write_state(&mut self, id: Xid, state: WinState) {
        let atoms = StateFlag::split(state)
            .into_iter()
            .flat_map(StateFlag::atom_names)
            .collect();

        self.calls.push(Call::State { id, atoms });
    }

    fn write_desktop(&mut self, id: Xid, mask: u32) {
        self.calls.push(Call::Desktop { id, mask });
    }

    fn set_active_window(&mut self, id: Option<Xid>) {
        self.calls.push(Call::Active { id });
    }

    fn set_current_desktop(&mut self, desktop: usize) {
        self.calls.push(Call::CurrentDesktop { desktop });
    }
}

impl Taskbar for Recorder {
    fn attention_changed(&mut self, desktop: usize, count: u32) {
        self.calls.push(Call::Attention { desktop, count });
    }

    fn iconified(&mut self, id: Xid) {
        self.calls.push(Call::Iconified { id });
    }

    fn deiconified(&mut self, id: Xid) {
        self.calls.push(Call::Deiconified { id });
    }
}

#[cfg(test)]
mod tests {
    use super::{Call, Frame, Recorder};
    use crate::{
        core::{
            decoration::{Border, Decoration},
            WindowType,
        },
        geometry::{Extents, Rectangle},
    };

    #[test]
    fn undecorated_types_have_no_extents() {
        let recorder = Recorder::new(Decoration {
            border: Some(Border { width: 3 }),
            title:  None,
        });

        assert_eq!(recorder.extents(1, WindowType::Normal), Extents::new(3, 3, 3, 3));
        assert_eq!(recorder.extents(1, WindowType::Dock), Extents::EMPTY);
    }

    #[test]
    fn remembers_last_rect() {
        let mut recorder = Recorder::default();
        recorder.apply_rect(1, Rectangle::new(0, 0, 1, 1));
        recorder.apply_rect(2, Rectangle::new(5, 5, 5, 5));
        recorder.apply_rect(1, Rectangle::new(2, 2, 2, 2));

        assert_eq!(recorder.last_rect(1), Some(Rectangle::new(2, 2, 2, 2)));
        assert_eq!(recorder.last_rect(3), None);
        assert_eq!(recorder.drain().len(), 3);
        assert!(recorder.calls.is_empty());
        assert!(!recorder.calls.contains(&Call::Show { id: 1 }));
    }
}
