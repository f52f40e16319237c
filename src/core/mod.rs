//! Base types used throughout [`tilestack`]

pub(crate) mod change;
pub(crate) mod decoration;

use bitflags::bitflags;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use strum_macros::{Display, EnumIter};

/// Type alias used for syntax compatibility
pub(crate) type Xid = u32;

/// Identifier that heads the client registry. Never a managed window
pub(crate) const SENTINEL: Xid = x11rb::NONE;

/// Desktop mask value reserved for "visible on every desktop"
pub(crate) const ALL_DESKTOPS: u32 = u32::MAX;

/// Desktop index reserved for "every desktop"
pub(crate) const EVERY_DESKTOP: usize = usize::MAX;

/// Largest number of desktops; the top bit is kept clear so that a full
/// desktop mask never collides with [`ALL_DESKTOPS`]
pub(crate) const MAX_DESKTOPS: usize = 31;

/// Mask with a single desktop's bit set
pub(crate) const fn desktop_bit(desktop: usize) -> u32 {
    1_u32 << desktop
}

// =============================== Layer ==============================

/// Coarse Z-order class of a client. Declaration order is registry order:
/// earlier layers sit higher in the stack
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Layer {
    Fullscreen,
    Above,
    Dock,
    Tile,
    Stack,
    Below,
    Desktop,
}

// =============================== Area ===============================

/// Tiling column of a client in the [`Layer::Tile`] layer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Area {
    Main,
    Second,
    Fixed,
    /// Not tiled
    Any,
}

/// Is the pair a valid placement? `Any` exactly when not tiled
pub(crate) fn placement_is_valid(layer: Layer, area: Area) -> bool {
    (layer == Layer::Tile) == (area != Area::Any)
}

// ============================ LayoutMode ============================

/// Arrangement used for a desktop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum LayoutMode {
    /// Free-form placement
    Stack,
    /// Three tiling columns
    Tile,
}

// ============================ WindowType ============================

/// Window type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WindowType {
    /// Single window containing desktop icons same dimensions as the screen
    Desktop,
    /// A dialog window
    Dialog,
    /// Dock or panel, keep such windows on top of others
    Dock,
    /// Pinnable menu windows torn-off from the main window
    Menu,
    /// A normal, top-level window
    Normal,
    /// A notification window
    Notification,
    /// A splash screen, a.k.a., an application startup screen
    Splash,
    /// Toolbar torn-off from the main window
    Toolbar,
    /// Small persistent utility window (e.g., pallete or toolbox)
    Utility,
}

impl Default for WindowType {
    fn default() -> Self {
        Self::Normal
    }
}

impl WindowType {
    /// Types that float when they have no owner
    pub(crate) const fn is_dialog_like(self) -> bool {
        matches!(
            self,
            Self::Dialog | Self::Menu | Self::Splash | Self::Toolbar | Self::Utility
        )
    }

    /// Types that never receive a frame
    pub(crate) const fn is_undecorated(self) -> bool {
        matches!(
            self,
            Self::Desktop | Self::Dock | Self::Notification | Self::Splash
        )
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================= WinState =============================

bitflags! {
    /// EWMH-style boolean window states of a client
    #[derive(Default)]
    pub(crate) struct WinState: u32 {
        const MODAL        = 1 << 0;
        const STICKY       = 1 << 1;
        const VMAX         = 1 << 2;
        const HMAX         = 1 << 3;
        const TMAX         = 1 << 4;
        const BMAX         = 1 << 5;
        const LMAX         = 1 << 6;
        const RMAX         = 1 << 7;
        const SHADED       = 1 << 8;
        const SKIP_TASKBAR = 1 << 9;
        const SKIP_PAGER   = 1 << 10;
        const HIDDEN       = 1 << 11;
        const FULLSCREEN   = 1 << 12;
        const ABOVE        = 1 << 13;
        const BELOW        = 1 << 14;
        const ATTENTION    = 1 << 15;
        const FOCUSED      = 1 << 16;

        const ANY_MAX = Self::VMAX.bits | Self::HMAX.bits | Self::TMAX.bits
            | Self::BMAX.bits | Self::LMAX.bits | Self::RMAX.bits;
        /// States that hold a snapshot of the pre-excursion geometry
        const EXCURSION = Self::ANY_MAX.bits | Self::FULLSCREEN.bits
            | Self::ABOVE.bits | Self::BELOW.bits;
    }
}

// ============================= StateFlag ============================

/// A single requestable state. `Maximized` is the combination of the
/// vertical and horizontal variants
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum StateFlag {
    Modal,
    Sticky,
    Vmax,
    Hmax,
    Tmax,
    Bmax,
    Lmax,
    Rmax,
    Maximized,
    Shaded,
    SkipTaskbar,
    SkipPager,
    Hidden,
    Fullscreen,
    Above,
    Below,
    Attention,
    Focused,
}

/// Reverse lookup of `_NET_WM_STATE` atom names
static ATOM_NAMES: Lazy<HashMap<&'static str, StateFlag>> = Lazy::new(|| {
    maplit::hashmap! {
        "_NET_WM_STATE_MODAL"                 => StateFlag::Modal,
        "_NET_WM_STATE_STICKY"                => StateFlag::Sticky,
        "_NET_WM_STATE_MAXIMIZED_VERT"        => StateFlag::Vmax,
        "_NET_WM_STATE_MAXIMIZED_HORZ"        => StateFlag::Hmax,
        "_TILESTACK_WM_STATE_MAXIMIZED_TOP"    => StateFlag::Tmax,
        "_TILESTACK_WM_STATE_MAXIMIZED_BOTTOM" => StateFlag::Bmax,
        "_TILESTACK_WM_STATE_MAXIMIZED_LEFT"   => StateFlag::Lmax,
        "_TILESTACK_WM_STATE_MAXIMIZED_RIGHT"  => StateFlag::Rmax,
        "_NET_WM_STATE_SHADED"                => StateFlag::Shaded,
        "_NET_WM_STATE_SKIP_TASKBAR"          => StateFlag::SkipTaskbar,
        "_NET_WM_STATE_SKIP_PAGER"            => StateFlag::SkipPager,
        "_NET_WM_STATE_HIDDEN"                => StateFlag::Hidden,
        "_NET_WM_STATE_FULLSCREEN"            => StateFlag::Fullscreen,
        "_NET_WM_STATE_ABOVE"                 => StateFlag::Above,
        "_NET_WM_STATE_BELOW"                 => StateFlag::Below,
        "_NET_WM_STATE_DEMANDS_ATTENTION"     => StateFlag::Attention,
        "_NET_WM_STATE_FOCUSED"               => StateFlag::Focused
    }
});

impl StateFlag {
    /// The [`WinState`] bits this flag stands for
    pub(crate) fn bits(self) -> WinState {
        match self {
            Self::Modal => WinState::MODAL,
            Self::Sticky => WinState::STICKY,
            Self::Vmax => WinState::VMAX,
            Self::Hmax => WinState::HMAX,
            Self::Tmax => WinState::TMAX,
            Self::Bmax => WinState::BMAX,
            Self::Lmax => WinState::LMAX,
            Self::Rmax => WinState::RMAX,
            Self::Maximized => WinState::VMAX | WinState::HMAX,
            Self::Shaded => WinState::SHADED,
            Self::SkipTaskbar => WinState::SKIP_TASKBAR,
            Self::SkipPager => WinState::SKIP_PAGER,
            Self::Hidden => WinState::HIDDEN,
            Self::Fullscreen => WinState::FULLSCREEN,
            Self::Above => WinState::ABOVE,
            Self::Below => WinState::BELOW,
            Self::Attention => WinState::ATTENTION,
            Self::Focused => WinState::FOCUSED,
        }
    }

    /// Names of the atoms a property collaborator writes for this flag
    pub(crate) fn atom_names(self) -> Vec<&'static str> {
        if self == Self::Maximized {
            return vec!["_NET_WM_STATE_MAXIMIZED_VERT", "_NET_WM_STATE_MAXIMIZED_HORZ"];
        }

        ATOM_NAMES
            .iter()
            .filter(|(_, flag)| **flag == self)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Find the flag matching an atom name
    pub(crate) fn from_atom_name(name: &str) -> Option<Self> {
        ATOM_NAMES.get(name).copied()
    }

    /// Split a [`WinState`] into single flags. `Maximized` is never produced
    pub(crate) fn split(state: WinState) -> Vec<Self> {
        use strum::IntoEnumIterator;

        Self::iter()
            .filter(|flag| *flag != Self::Maximized && state.contains(flag.bits()))
            .collect()
    }
}

// =========================== Window Edges ===========================

/// A corner of a window
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Corner {
    /// The top-left corner
    TopLeft,
    /// The top-right corner
    TopRight,
    /// The bottom-left corner
    BottomLeft,
    /// The bottom-right corner
    BottomRight,
}

impl Corner {
    /// Is the corner on the left edge?
    pub(crate) const fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Is the corner on the top edge?
    pub(crate) const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}
