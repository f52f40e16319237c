//! Errors found throughout this crate

use crate::core::Xid;
use thiserror::Error;

/// Failures outside of the window-management core. Declined operations
/// inside the core are not errors
#[derive(Debug, Error)]
pub(crate) enum Error {
    /// A script step names a window that was never managed
    #[error("unknown client {0:#x}")]
    UnknownClient(Xid),

    /// A script step names a desktop that does not exist
    #[error("desktop {0} is out of range (there are {1} desktops)")]
    InvalidDesktop(usize, usize),

    /// A ratio in the configuration is outside of `0.0..=1.0`
    #[error("{name} must be within 0.0 and 1.0, found {value}")]
    InvalidRatio {
        /// Setting name
        name:  &'static str,
        /// Offending value
        value: f32,
    },

    /// The main and fixed columns leave no room for the second one
    #[error("main_ratio + fixed_ratio must not exceed 1.0, found {0}")]
    RatiosTooLarge(f32),

    /// Desktop count outside of `1..=31`
    #[error("the number of desktops must be within 1 and {max}, found {found}")]
    DesktopCount {
        /// Number of configured desktops
        found: usize,
        /// Largest supported number of desktops
        max:   usize,
    },

    /// A per-desktop override names a desktop that is not configured
    #[error("override given for unknown desktop {0:?}")]
    UnknownDesktopName(String),
}
