//! Decoration metrics drawn around a client by the frame collaborator

use crate::{config::Config, geometry::{Extents, Padding}};
use std::ops::Add;

/// Borders around a window
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Border {
    /// Width of the border
    pub(crate) width: u32,
}

impl Add<Border> for Padding {
    type Output = Self;

    fn add(self, border: Border) -> Self::Output {
        Self::Output {
            left:   self.left + border.width,
            right:  self.right + border.width,
            top:    self.top + border.width,
            bottom: self.bottom + border.width,
        }
    }
}

/// Title bar along the top edge of the frame
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Titlebar {
    /// Height of the title bar
    pub(crate) height: u32,
}

impl Add<Titlebar> for Padding {
    type Output = Self;

    fn add(self, title: Titlebar) -> Self::Output {
        Self::Output {
            top: self.top + title.height,
            ..self
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub(crate) struct Decoration {
    pub(crate) border: Option<Border>,
    pub(crate) title:  Option<Titlebar>,
}

impl Decoration {
    /// Build the decoration described by the [`Config`]
    pub(crate) fn new(config: &Config) -> Self {
        let global = &config.global;

        Self {
            border: (global.border_width > 0).then(|| Border {
                width: global.border_width,
            }),
            title:  (global.titlebar_height > 0).then(|| Titlebar {
                height: global.titlebar_height,
            }),
        }
    }

    /// Space taken by the decoration on each side of the content
    pub(crate) fn extents(&self) -> Extents {
        Extents::EMPTY + *self
    }
}

impl Add<Decoration> for Padding {
    type Output = Self;

    fn add(mut self, decoration: Decoration) -> Self::Output {
        if let Some(border) = decoration.border {
            self = self + border;
        }

        if let Some(title) = decoration.title {
            self = self + title;
        }

        self
    }
}
