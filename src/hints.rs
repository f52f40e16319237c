//! ICCCM size hints and the constraints they put on a client's size

use crate::geometry::Dimension;
use serde::{Deserialize, Serialize};
use x11rb::properties::WmSizeHints;

// =============================== Ratio ==============================

/// An aspect ratio `numerator` / `denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub(crate) struct Ratio {
    /// The numerator of the aspect [`Ratio`]
    pub(crate) numerator:   i32,
    /// The denomerator of the aspect [`Ratio`]
    pub(crate) denominator: i32,
}

impl Ratio {
    /// Create a new [`Ratio]
    pub(crate) const fn new(numerator: i32, denominator: i32) -> Self {
        Self { numerator, denominator }
    }

    /// Width divided by height, if both sides are usable
    fn as_f64(self) -> Option<f64> {
        (self.numerator > 0 && self.denominator > 0)
            .then(|| f64::from(self.numerator) / f64::from(self.denominator))
    }
}

// ============================ SizeHints =============================

/// Program-specified size constraints of a client
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SizeHints {
    /// Program-specified base width
    pub(crate) base_width:  Option<u32>,
    /// Program-specified base height
    pub(crate) base_height: Option<u32>,
    /// Program-specified minimum width
    pub(crate) min_width:   Option<u32>,
    /// Program-specified minimum height
    pub(crate) min_height:  Option<u32>,
    /// Program-specified maximum width
    pub(crate) max_width:   Option<u32>,
    /// Program-specified maximum height
    pub(crate) max_height:  Option<u32>,
    /// Program-specified resize increment for width
    pub(crate) inc_width:   Option<u32>,
    /// Program-specified resize increment for height
    pub(crate) inc_height:  Option<u32>,
    /// Program-specified minimum aspect ratio
    pub(crate) min_ratio:   Option<Ratio>,
    /// Program-specified maximum aspect ratio
    pub(crate) max_ratio:   Option<Ratio>,
}

/// Increment used when a client asks for a zero increment
const DEFAULT_INCREMENT: u32 = 1;

/// Clamp a possibly negative property value
fn positive(value: i32) -> Option<u32> {
    (value > 0).then(|| value as u32)
}

impl From<WmSizeHints> for SizeHints {
    fn from(hints: WmSizeHints) -> Self {
        let pair = |p: Option<(i32, i32)>| p.map(|(w, h)| (positive(w), positive(h)));
        let (base_width, base_height) = pair(hints.base_size).unwrap_or((None, None));
        let (min_width, min_height) = pair(hints.min_size).unwrap_or((None, None));
        let (max_width, max_height) = pair(hints.max_size).unwrap_or((None, None));
        let (inc_width, inc_height) = hints
            .size_increment
            .map(|(w, h)| (Some(w.max(0) as u32), Some(h.max(0) as u32)))
            .unwrap_or((None, None));

        Self {
            base_width,
            base_height,
            min_width,
            min_height,
            max_width,
            max_height,
            inc_width,
            inc_height,
            min_ratio: hints
                .aspect
                .map(|(min, _)| Ratio::new(min.numerator, min.denominator)),
            max_ratio: hints
                .aspect
                .map(|(_, max)| Ratio::new(max.numerator, max.denominator)),
        }
    }
}

impl SizeHints {
    /// Does the client pin its size (equal minimum and maximum)?
    pub(crate) fn is_fixed(&self) -> bool {
        self.min_width.is_some()
            && self.min_width == self.max_width
            && self.min_height.is_some()
            && self.min_height == self.max_height
    }

    /// Constrain a content [`Dimension`] to the hints
    pub(crate) fn apply(&self, dim: Dimension) -> Dimension {
        let base_w = self.base_width.or(self.min_width).unwrap_or(0);
        let base_h = self.base_height.or(self.min_height).unwrap_or(0);
        let min_w = self.min_width.or(self.base_width).unwrap_or(1).max(1);
        let min_h = self.min_height.or(self.base_height).unwrap_or(1).max(1);

        let mut w = dim.width.max(1);
        let mut h = dim.height.max(1);

        // Aspect ratios are measured without the base size
        if let (Some(min), Some(max)) = (
            self.min_ratio.and_then(Ratio::as_f64),
            self.max_ratio.and_then(Ratio::as_f64),
        ) {
            let cw = f64::from(w.saturating_sub(base_w).max(1));
            let ch = f64::from(h.saturating_sub(base_h).max(1));

            if cw / ch > max {
                w = base_w + (ch * max).round() as u32;
            } else if cw / ch < min {
                h = base_h + (cw / min).round() as u32;
            }
        }

        let inc_w = self.inc_width.filter(|i| *i > 0).unwrap_or(DEFAULT_INCREMENT);
        let inc_h = self.inc_height.filter(|i| *i > 0).unwrap_or(DEFAULT_INCREMENT);

        w = base_w + (w.saturating_sub(base_w) / inc_w) * inc_w;
        h = base_h + (h.saturating_sub(base_h) / inc_h) * inc_h;

        w = w.max(min_w);
        h = h.max(min_h);

        if let Some(max_w) = self.max_width.filter(|m| *m > 0) {
            w = w.min(max_w);
        }

        if let Some(max_h) = self.max_height.filter(|m| *m > 0) {
            h = h.min(max_h);
        }

        Dimension::new(w, h)
    }
}
