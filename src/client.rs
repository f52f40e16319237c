//! A single managed window and its placement metadata

use crate::{
    core::{desktop_bit, Area, Layer, WinState, WindowType, Xid, ALL_DESKTOPS},
    geometry::{Dimension, Extents, Rectangle},
    hints::SizeHints,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry to return to once a maximize, fullscreen, above or below
/// excursion ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Saved {
    /// Content rectangle before the excursion
    pub(crate) rect:  Rectangle,
    /// Layer before the excursion
    pub(crate) layer: Layer,
    /// Area before the excursion
    pub(crate) area:  Area,
}

/// A managed top-level window
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Client {
    /// Window id
    pub(crate) id:           Xid,
    /// `WM_NAME`
    pub(crate) name:         String,
    /// `_NET_WM_WINDOW_TYPE`
    pub(crate) window_type:  WindowType,
    /// Z-order class
    pub(crate) layer:        Layer,
    /// Tiling column; [`Area::Any`] when not tiled
    pub(crate) area:         Area,
    /// Window this one is transient for
    pub(crate) owner:        Option<Xid>,
    /// Root of the transient chain. Fixed at creation
    pub(crate) leader:       Xid,
    /// Desktops the client is visible on
    pub(crate) desktop_mask: u32,
    /// EWMH-style states
    pub(crate) state:        WinState,
    /// Snapshot taken when an excursion starts
    pub(crate) saved:        Option<Saved>,
    /// Content rectangle
    pub(crate) rect:         Rectangle,
    /// Decoration drawn around the content
    pub(crate) extents:      Extents,
    /// ICCCM size constraints
    pub(crate) size_hints:   SizeHints,
    /// Not yet placed; the next layout pass fixes its geometry up
    pub(crate) fresh:        bool,
    /// Keeps its geometry relative to the owner
    pub(crate) follows_owner: bool,
    /// Drawn with the unfocused look
    pub(crate) dimmed:       bool,
}

impl Client {
    /// Create a top-level [`Client`] that leads its own subgroup
    pub(crate) fn new(id: Xid, rect: Rectangle) -> Self {
        Self {
            id,
            name: String::new(),
            window_type: WindowType::default(),
            layer: Layer::Stack,
            area: Area::Any,
            owner: None,
            leader: id,
            desktop_mask: desktop_bit(0),
            state: WinState::empty(),
            saved: None,
            rect,
            extents: Extents::EMPTY,
            size_hints: SizeHints::default(),
            fresh: true,
            follows_owner: false,
            dimmed: false,
        }
    }

    /// Is this client transient for another?
    pub(crate) const fn is_transient(&self) -> bool {
        self.owner.is_some()
    }

    /// Is the client iconified?
    pub(crate) const fn is_hidden(&self) -> bool {
        self.state.contains(WinState::HIDDEN)
    }

    /// Does the client have the given state?
    pub(crate) const fn has(&self, state: WinState) -> bool {
        self.state.contains(state)
    }

    /// Is the client visible on the given desktop?
    pub(crate) const fn visible_on(&self, desktop: usize) -> bool {
        self.desktop_mask == ALL_DESKTOPS || self.desktop_mask & desktop_bit(desktop) != 0
    }

    /// Is the client on the desktop and not iconified?
    pub(crate) const fn is_shown_on(&self, desktop: usize) -> bool {
        self.visible_on(desktop) && !self.is_hidden()
    }

    /// Rectangle of the decoration frame. A shaded client collapses to the
    /// decoration alone
    pub(crate) fn frame_rect(&self) -> Rectangle {
        let mut frame = self.rect + self.extents;
        if self.has(WinState::SHADED) {
            frame.dimension.height = self.extents.vertical();
        }

        frame
    }

    /// Place the client so that its frame covers `frame`
    pub(crate) fn set_frame(&mut self, frame: Rectangle) {
        self.rect = frame - self.extents;
    }

    /// Size of the frame around a content [`Dimension`]
    pub(crate) const fn frame_size(&self, content: Dimension) -> Dimension {
        Dimension {
            width:  content.width + self.extents.horizontal(),
            height: content.height + self.extents.vertical(),
        }
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.id)?;
        if !self.name.is_empty() {
            write!(f, " ({})", self.name)?;
        }

        Ok(())
    }
}
