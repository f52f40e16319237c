//! Virtual desktops: per-desktop layout parameters and desktop membership

use crate::{
    collab::{Frame, Properties, Taskbar},
    config::Config,
    core::{desktop_bit, LayoutMode, WinState, Xid, ALL_DESKTOPS, EVERY_DESKTOP},
    manager::Manager,
};
use colored::Colorize;

/// Layout parameters and bookkeeping of one desktop
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DesktopState {
    /// Name shown by pagers
    pub(crate) name:        String,
    /// Arrangement of the desktop
    pub(crate) layout_mode: LayoutMode,
    /// Share of the width given to the main column
    pub(crate) main_ratio:  f32,
    /// Share of the width given to the fixed column
    pub(crate) fixed_ratio: f32,
    /// Number of clients the main column holds
    pub(crate) main_area_n: usize,
    /// Client to focus when the desktop becomes visible
    pub(crate) focus:       Option<Xid>,
    /// Number of clients demanding attention
    pub(crate) attention:   u32,
}

/// Every desktop and which one is visible
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Desktops {
    states:  Vec<DesktopState>,
    current: usize,
}

impl Desktops {
    /// Build the desktops described by the [`Config`]
    pub(crate) fn new(config: &Config) -> Self {
        let global = &config.global;
        let states = global
            .desktops
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let over = config.desktop_override(idx);
                DesktopState {
                    name:        name.clone(),
                    layout_mode: over.layout_mode.unwrap_or(global.layout_mode),
                    main_ratio:  over.main_ratio.unwrap_or(global.main_ratio),
                    fixed_ratio: over.fixed_ratio.unwrap_or(global.fixed_ratio),
                    main_area_n: over.main_area_n.unwrap_or(global.main_area_n).max(1),
                    focus:       None,
                    attention:   0,
                }
            })
            .collect();

        Self { states, current: 0 }
    }

    /// Number of desktops
    pub(crate) fn count(&self) -> usize {
        self.states.len()
    }

    /// Index of the visible desktop
    pub(crate) const fn current(&self) -> usize {
        self.current
    }

    /// The visible desktop
    pub(crate) fn current_state(&self) -> &DesktopState {
        &self.states[self.current]
    }

    /// The visible desktop, mutably
    pub(crate) fn current_state_mut(&mut self) -> &mut DesktopState {
        &mut self.states[self.current]
    }

    /// A desktop by index
    pub(crate) fn get(&self, desktop: usize) -> Option<&DesktopState> {
        self.states.get(desktop)
    }

    /// A desktop by index, mutably
    pub(crate) fn get_mut(&mut self, desktop: usize) -> Option<&mut DesktopState> {
        self.states.get_mut(desktop)
    }

    /// Mask with every existing desktop's bit set
    pub(crate) fn all_mask(&self) -> u32 {
        (0..self.count()).fold(0, |mask, d| mask | desktop_bit(d))
    }

    /// Drop every remembered focus pointing at a client
    pub(crate) fn forget_focus(&mut self, id: Xid) {
        for state in &mut self.states {
            if state.focus == Some(id) {
                state.focus = None;
            }
        }
    }
}

impl<B: Frame + Properties + Taskbar> Manager<B> {
    /// Is `desktop` an existing desktop?
    pub(crate) fn valid_desktop(&self, desktop: usize) -> bool {
        desktop < self.desktops.count()
    }

    /// Give one client a new desktop mask. Attention counters move along with
    /// the client and the sticky state follows a mask of every desktop.
    /// Returns whether the client was, and now is, shown on the current desktop
    pub(crate) fn replace_mask(&mut self, id: Xid, mask: u32) -> Option<(bool, bool)> {
        let current = self.desktops.current();
        let (old, was, attention, sticky) = match self.registry.get(id) {
            Some(c) => (
                c.desktop_mask,
                c.is_shown_on(current),
                c.has(WinState::ATTENTION),
                c.has(WinState::STICKY),
            ),
            None => return None,
        };

        if attention {
            self.change_attention(old, false);
        }

        let now = match self.registry.get_mut(id) {
            Some(c) => {
                c.desktop_mask = mask;
                c.state.set(WinState::STICKY, mask == ALL_DESKTOPS);
                c.is_shown_on(current)
            },
            None => return None,
        };

        if attention {
            self.change_attention(mask, true);
        }

        self.backend.write_desktop(id, mask);
        if sticky != (mask == ALL_DESKTOPS) {
            self.publish_state(id);
        }

        Some((was, now))
    }

    /// Replace the desktop mask of a client's whole subgroup, keeping its
    /// visibility on the current desktop in sync
    fn set_subgroup_mask<F>(&mut self, id: Xid, mask_of: F) -> bool
    where
        F: Fn(u32) -> u32,
    {
        let members = self.subgroup_of(id);
        if members.is_empty() {
            return false;
        }

        let mut lost_focus = false;

        for member in &members {
            let mask = match self.registry.get(*member) {
                Some(c) => mask_of(c.desktop_mask),
                None => continue,
            };

            let (was, now) = match self.replace_mask(*member, mask) {
                Some(shown) => shown,
                None => continue,
            };

            if was && !now {
                self.backend.hide(*member);
                lost_focus |= self.focused == Some(*member);
            } else if !was && now {
                self.backend.show(*member);
            }
        }

        if lost_focus {
            let successor = self.next(Some(id)).filter(|next| !members.contains(next));
            self.focus(successor);
        }

        self.request_layout_update();
        true
    }

    /// Send a client to a single desktop
    pub(crate) fn move_to_desktop(&mut self, id: Xid, desktop: usize) -> bool {
        if !self.valid_desktop(desktop) {
            log::debug!("declining to move {:#x} to desktop {}", id, desktop);
            return false;
        }

        log::debug!("moving {:#x} to desktop {}", id, desktop);
        self.set_subgroup_mask(id, |_| desktop_bit(desktop))
    }

    /// Send a client to a single desktop and follow it there
    pub(crate) fn change_to_desktop(&mut self, id: Xid, desktop: usize) -> bool {
        if !self.move_to_desktop(id, desktop) {
            return false;
        }

        self.focus_desktop(desktop);
        self.focus(Some(id));
        true
    }

    /// Make a client visible on one more desktop, or on every desktop when
    /// given [`EVERY_DESKTOP`]
    pub(crate) fn attach_to_desktop(&mut self, id: Xid, desktop: usize) -> bool {
        if desktop == EVERY_DESKTOP {
            return self.set_subgroup_mask(id, |_| ALL_DESKTOPS);
        }

        if !self.valid_desktop(desktop) {
            log::debug!("declining to attach {:#x} to desktop {}", id, desktop);
            return false;
        }

        self.set_subgroup_mask(id, |mask| {
            if mask == ALL_DESKTOPS {
                mask
            } else {
                mask | desktop_bit(desktop)
            }
        })
    }

    /// Make a client visible on every desktop but the current one, in
    /// addition to where it already is
    pub(crate) fn attach_to_all_others(&mut self, id: Xid) -> bool {
        let others = self.desktops.all_mask() & !desktop_bit(self.desktops.current());

        self.set_subgroup_mask(id, |mask| {
            if mask == ALL_DESKTOPS {
                mask
            } else {
                mask | others
            }
        })
    }

    /// Switch the visible desktop
    pub(crate) fn focus_desktop(&mut self, desktop: usize) -> bool {
        let old = self.desktops.current();
        if !self.valid_desktop(desktop) || desktop == old {
            return false;
        }

        log::debug!("{} {} -> {}", "switching desktop".blue(), old, desktop);

        let changes = self
            .registry
            .iter()
            .map(|c| (c.id, c.is_shown_on(old), c.is_shown_on(desktop)))
            .collect::<Vec<_>>();

        for (id, was, now) in &changes {
            if *was && !*now {
                self.backend.hide(*id);
            }
        }

        for (id, was, now) in &changes {
            if !*was && *now {
                self.backend.show(*id);
            }
        }

        self.desktops.current = desktop;
        self.backend.set_current_desktop(desktop);

        let remembered = self
            .desktops
            .current_state()
            .focus
            .filter(|id| self.is_shown(*id));

        for (id, _, now) in changes {
            if !now {
                continue;
            }

            let dimmed = Some(id) != remembered;
            if let Some(c) = self.registry.get_mut(id) {
                if c.dimmed != dimmed {
                    c.dimmed = dimmed;
                    self.backend.set_dimmed(id, dimmed);
                }
            }
        }

        self.request_layout_update();
        self.focus(remembered);
        true
    }

    /// Change the arrangement of a desktop
    pub(crate) fn set_layout_mode(&mut self, desktop: usize, mode: LayoutMode) -> bool {
        match self.desktops.get_mut(desktop) {
            Some(state) if state.layout_mode != mode => {
                state.layout_mode = mode;
                log::debug!("desktop {} is now in {} mode", desktop, mode);
                self.request_layout_update();
                true
            },
            _ => false,
        }
    }

    /// Change how many clients the main column of a desktop holds
    pub(crate) fn set_main_area_n(&mut self, desktop: usize, count: usize) -> bool {
        match self.desktops.get_mut(desktop) {
            Some(state) => {
                state.main_area_n = count.max(1);
                self.request_layout_update();
                true
            },
            None => false,
        }
    }

    /// Change the width of the main column of a desktop
    pub(crate) fn set_main_ratio(&mut self, desktop: usize, ratio: f32) -> bool {
        match self.desktops.get_mut(desktop) {
            Some(state) if ratio.is_finite() => {
                state.main_ratio = ratio.max(0.0).min(1.0 - state.fixed_ratio);
                self.request_layout_update();
                true
            },
            _ => false,
        }
    }
}
