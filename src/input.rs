//! Input into the window manager

use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};
use x11rb::protocol::xproto::Button as XButton;

// ============================== Button ==============================
// ====================================================================

/// Available buttons on a mouse
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Button {
    /// 1, Left-click
    #[serde(rename = "mouse1", alias = "button1")]
    Left,
    /// 2, Middle-click
    #[serde(rename = "mouse2", alias = "button2")]
    Middle,
    /// 3, Right-click
    #[serde(rename = "mouse3", alias = "button3")]
    Right,
    /// 4, Wheel-scroll up
    #[serde(alias = "scroll-up", alias = "scroll_up")]
    ScrollUp,
    /// 5, Wheel-scroll down
    #[serde(alias = "scroll-down", alias = "scroll_down")]
    ScrollDown,
}

impl From<Button> for XButton {
    fn from(b: Button) -> Self {
        match b {
            Button::Left => 1,
            Button::Middle => 2,
            Button::Right => 3,
            Button::ScrollUp => 4,
            Button::ScrollDown => 5,
        }
    }
}

/// Button detail of a pointer event
impl TryFrom<XButton> for Button {
    type Error = XButton;

    fn try_from(detail: XButton) -> Result<Self, Self::Error> {
        match detail {
            1 => Ok(Self::Left),
            2 => Ok(Self::Middle),
            3 => Ok(Self::Right),
            4 => Ok(Self::ScrollUp),
            5 => Ok(Self::ScrollDown),
            other => Err(other),
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "button{}", XButton::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::Button;
    use std::convert::TryFrom;

    #[test]
    fn raw_detail() {
        assert_eq!(Button::try_from(3), Ok(Button::Right));
        assert_eq!(Button::try_from(9), Err(9));
        assert_eq!(Button::Middle.to_string(), "button2");
    }
}
