//! Moving and resizing windows with the pointer

use crate::{
    client::Client,
    collab::{Frame, Properties, Taskbar},
    core::{Corner, Layer, WinState, Xid},
    geometry::{Dimension, Point, Rectangle},
    input::Button,
    manager::Manager,
};
use serde::Deserialize;
use std::convert::TryFrom;
use x11rb::protocol::xproto::Button as XButton;

/// Distance from a frame corner, in pixels, that starts a resize instead of
/// a move
const GRIP: i32 = 16;

/// State of a pointer drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Drag {
    /// No drag in progress
    Idle,
    /// A window follows the pointer
    Moving {
        /// Window being dragged
        id:     Xid,
        /// Button that started the drag
        button: Button,
        /// Pointer position at the press
        origin: Point,
        /// Content rectangle at the press
        start:  Rectangle,
    },
    /// A corner of a window follows the pointer
    Resizing {
        /// Window being resized
        id:     Xid,
        /// Button that started the drag
        button: Button,
        /// Corner that was grabbed
        corner: Corner,
        /// Pointer position at the press
        origin: Point,
        /// Content rectangle at the press
        start:  Rectangle,
    },
}

/// A pointer event in root coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub(crate) enum PointerEvent {
    /// A button went down over a window
    Press {
        window: Xid,
        button: XButton,
        x:      i32,
        y:      i32,
    },
    /// The pointer moved
    Motion { x: i32, y: i32 },
    /// A button went up
    Release { button: XButton, x: i32, y: i32 },
}

/// Corner of `frame` that `point` grabs, if it is close enough to one
fn grabbed_corner(frame: Rectangle, point: Point) -> Option<Corner> {
    let left = point.x - frame.point.x < GRIP;
    let right = frame.right() - point.x <= GRIP;
    let top = point.y - frame.point.y < GRIP;
    let bottom = frame.bottom() - point.y <= GRIP;

    match (left, right, top, bottom) {
        (true, _, true, _) => Some(Corner::TopLeft),
        (_, true, true, _) => Some(Corner::TopRight),
        (true, _, _, true) => Some(Corner::BottomLeft),
        (_, true, _, true) => Some(Corner::BottomRight),
        _ => None,
    }
}

/// Content rectangle after dragging `corner` of `start` by `delta`. The
/// opposite corner stays put
fn resized(
    start: Rectangle,
    corner: Corner,
    delta: Point,
    client: &Client,
    hints: bool,
) -> Rectangle {
    let grow = |size: u32, by: i32| (size as i32 + by).max(1) as u32;

    let width = grow(start.dimension.width, if corner.is_left() { -delta.x } else { delta.x });
    let height = grow(start.dimension.height, if corner.is_top() { -delta.y } else { delta.y });

    let mut dimension = Dimension::new(width, height);
    if hints {
        dimension = client.size_hints.apply(dimension);
    }

    let x = if corner.is_left() {
        start.right() - dimension.width as i32
    } else {
        start.point.x
    };
    let y = if corner.is_top() {
        start.bottom() - dimension.height as i32
    } else {
        start.point.y
    };

    Rectangle {
        point: Point::new(x, y),
        dimension,
    }
}

impl<B: Frame + Properties + Taskbar> Manager<B> {
    /// Feed a pointer event to the drag state machine. Returns whether the
    /// event was used
    pub(crate) fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match (self.drag, event) {
            (Drag::Idle, PointerEvent::Press { window, button, x, y }) =>
                self.begin_drag(window, button, Point::new(x, y)),
            (Drag::Idle, _) => false,
            (_, PointerEvent::Press { .. }) => false,
            (drag, PointerEvent::Motion { x, y }) => self.drag_to(drag, Point::new(x, y)),
            (drag, PointerEvent::Release { button, x, y }) =>
                self.end_drag(drag, button, Point::new(x, y)),
        }
    }

    /// Start moving or resizing a window
    fn begin_drag(&mut self, id: Xid, button: XButton, origin: Point) -> bool {
        let button = match Button::try_from(button) {
            Ok(b) if b == self.config.global.drag_button => b,
            _ => return false,
        };

        let client = match self.registry.get(id) {
            Some(c) if self.is_shown(id) => c,
            _ => return false,
        };

        if matches!(client.layer, Layer::Dock | Layer::Desktop | Layer::Fullscreen)
            || client.state.intersects(WinState::ANY_MAX)
        {
            log::debug!("declining to drag {}", client);
            return false;
        }

        let start = client.rect;
        let corner = if client.layer == Layer::Tile || client.size_hints.is_fixed() {
            None
        } else {
            grabbed_corner(client.frame_rect(), origin)
        };

        self.drag = match corner {
            Some(corner) => Drag::Resizing {
                id,
                button,
                corner,
                origin,
                start,
            },
            None => Drag::Moving {
                id,
                button,
                origin,
                start,
            },
        };

        log::debug!("{} starts {:?}", button, self.drag);
        true
    }

    /// Follow the pointer with the dragged window
    fn drag_to(&mut self, drag: Drag, point: Point) -> bool {
        let hints = self.config.global.honor_size_hints;
        let id = match drag {
            Drag::Moving { id, origin, start, .. } => {
                match self.registry.get_mut(id) {
                    // Tiled windows only trade places on release
                    Some(c) if c.layer == Layer::Tile => return true,
                    Some(c) => {
                        let delta = point.relative(origin);
                        c.rect.point = start.point + delta;
                        c.fresh = false;
                        c.follows_owner = false;
                    },
                    None => return false,
                }
                id
            },
            Drag::Resizing {
                id,
                corner,
                origin,
                start,
                ..
            } => {
                match self.registry.get_mut(id) {
                    Some(c) => {
                        let rect = resized(start, corner, point.relative(origin), c, hints);
                        c.rect = rect;
                        c.fresh = false;
                        c.follows_owner = false;
                    },
                    None => return false,
                }
                id
            },
            Drag::Idle => return false,
        };

        self.publish_rect(id);
        true
    }

    /// Finish a drag when the button that started it goes up
    fn end_drag(&mut self, drag: Drag, released: XButton, point: Point) -> bool {
        let (id, button) = match drag {
            Drag::Moving { id, button, .. } | Drag::Resizing { id, button, .. } => (id, button),
            Drag::Idle => return false,
        };

        if XButton::from(button) != released {
            return false;
        }

        self.drag = Drag::Idle;

        let (leader, tiled) = match self.registry.get(id) {
            Some(c) => (c.leader, c.layer == Layer::Tile),
            None => return true,
        };

        if tiled {
            let desktop = self.desktops.current();
            let target = self
                .registry
                .iter()
                .find(|c| {
                    c.layer == Layer::Tile
                        && c.leader != leader
                        && c.is_shown_on(desktop)
                        && c.frame_rect().is_inside(point)
                })
                .map(|c| c.id);

            if let Some(target) = target {
                log::debug!("dropping {:#x} onto {:#x}", id, target);
                self.swap_clients(id, target);
            }
        }

        true
    }
}
