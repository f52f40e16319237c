//! Structures used to map areas on the screen

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, Sub},
};

// ============================== Padding =============================
// ====================================================================

/// Padding around a window
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Padding {
    /// Padding on the top
    pub(crate) top:    u32,
    /// Padding on the right
    pub(crate) right:  u32,
    /// Padding on the bottom
    pub(crate) bottom: u32,
    /// Padding on the left
    pub(crate) left:   u32,
}

impl Padding {
    /// Create a new [`Padding`]
    pub(crate) const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Sum of the left and right sides
    pub(crate) const fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    /// Sum of the top and bottom sides
    pub(crate) const fn vertical(&self) -> u32 {
        self.top + self.bottom
    }
}

/// Type alias for [`Padding`]
pub(crate) type Extents = Padding;

impl Extents {
    /// No [`Extents`]
    pub(crate) const EMPTY: Self = Self {
        left:   0,
        right:  0,
        top:    0,
        bottom: 0,
    };
}

// =============================== Point ==============================
// ====================================================================

/// When this is used with a [`Rectangle`], it represents the top-left corner
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub(crate) struct Point {
    /// X-coordinate
    pub(crate) x: i32,
    /// Y-coordinate
    pub(crate) y: i32,
}

impl Point {
    /// Create a new [`Point`]
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the [`Point`] relative to the given [`Point`]
    pub(crate) const fn relative(self, p: Self) -> Self {
        Self {
            x: self.x - p.x,
            y: self.y - p.y,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x: {}, y: {}", self.x, self.y)
    }
}

impl Add<Self> for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::Output {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

// ============================= Dimension ===========================
// ====================================================================

/// A `width` and a `height`. The area of a [`Rectangle`]
#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) struct Dimension {
    /// The width of the [`Rectangle`]
    pub(crate) width:  u32,
    /// The height of the [`Rectangle`]
    pub(crate) height: u32,
}

impl Default for Dimension {
    fn default() -> Self {
        Self { width: 480, height: 260 }
    }
}

impl Dimension {
    /// Create a new [`Dimension`]
    pub(crate) const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "width: {}, height: {}", self.width, self.height)
    }
}

// ============================= Rectangle ============================
// ====================================================================

/// Equivalent to `xcb_rectangle_t`
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub(crate) struct Rectangle {
    /// Represents the top-left corner of the rectangle
    pub(crate) point:     Point,
    /// The width and height of the rectangle
    pub(crate) dimension: Dimension,
}

impl Rectangle {
    /// Create a new [`Rectangle`]
    pub(crate) const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            point:     Point::new(x, y),
            dimension: Dimension::new(width, height),
        }
    }

    /// X-coordinate one past the right edge
    pub(crate) const fn right(&self) -> i32 {
        self.point.x + self.dimension.width as i32
    }

    /// Y-coordinate one past the bottom edge
    pub(crate) const fn bottom(&self) -> i32 {
        self.point.y + self.dimension.height as i32
    }

    /// Test whether the given [`Point`] is contained within the [`Rectangle`]
    pub(crate) const fn is_inside(&self, point: Point) -> bool {
        point.x >= self.point.x
            && point.x < self.right()
            && point.y >= self.point.y
            && point.y < self.bottom()
    }

    /// A [`Rectangle`] of the given [`Dimension`] centered on this one
    pub(crate) const fn centered(&self, dimension: Dimension) -> Self {
        Self {
            point: Point {
                x: self.point.x + (self.dimension.width as i32 - dimension.width as i32) / 2,
                y: self.point.y + (self.dimension.height as i32 - dimension.height as i32) / 2,
            },
            dimension,
        }
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}), ({})", self.point, self.dimension)
    }
}

impl Add<Padding> for Rectangle {
    type Output = Self;

    fn add(self, padding: Padding) -> Self::Output {
        Self::Output {
            point:     Point {
                x: self.point.x - padding.left as i32,
                y: self.point.y - padding.top as i32,
            },
            dimension: Dimension {
                width:  self.dimension.width + padding.horizontal(),
                height: self.dimension.height + padding.vertical(),
            },
        }
    }
}

impl Sub<Padding> for Rectangle {
    type Output = Self;

    fn sub(self, padding: Padding) -> Self::Output {
        Self::Output {
            point:     Point {
                x: self.point.x + padding.left as i32,
                y: self.point.y + padding.top as i32,
            },
            dimension: Dimension {
                width:  self.dimension.width.saturating_sub(padding.horizontal()),
                height: self.dimension.height.saturating_sub(padding.vertical()),
            },
        }
    }
}
