//! EWMH-style state transitions of a client

use crate::{
    client::Saved,
    collab::{Frame, Properties, Taskbar},
    core::{change::Action, desktop_bit, Area, Layer, StateFlag, WinState, Xid, ALL_DESKTOPS},
    geometry::Rectangle,
    manager::Manager,
};

/// Maximize states that share the vertical axis
const VERTICAL: WinState = WinState::from_bits_truncate(
    WinState::VMAX.bits() | WinState::TMAX.bits() | WinState::BMAX.bits(),
);

/// Maximize states that share the horizontal axis
const HORIZONTAL: WinState = WinState::from_bits_truncate(
    WinState::HMAX.bits() | WinState::LMAX.bits() | WinState::RMAX.bits(),
);

/// Frame covering the part of the work area a set of maximize states asks
/// for. An axis without any state keeps the span of `base`
pub(crate) fn maximized_frame(state: WinState, work: Rectangle, base: Rectangle) -> Rectangle {
    let half_width = work.dimension.width / 2;
    let half_height = work.dimension.height / 2;

    let (x, width) = if state.contains(WinState::HMAX) {
        (work.point.x, work.dimension.width)
    } else if state.contains(WinState::LMAX) {
        (work.point.x, half_width)
    } else if state.contains(WinState::RMAX) {
        (work.point.x + half_width as i32, work.dimension.width - half_width)
    } else {
        (base.point.x, base.dimension.width)
    };

    let (y, height) = if state.contains(WinState::VMAX) {
        (work.point.y, work.dimension.height)
    } else if state.contains(WinState::TMAX) {
        (work.point.y, half_height)
    } else if state.contains(WinState::BMAX) {
        (work.point.y + half_height as i32, work.dimension.height - half_height)
    } else {
        (base.point.y, base.dimension.height)
    };

    Rectangle::new(x, y, width, height)
}

/// States a maximize request knocks out on the axes it touches
fn axis_rivals(bits: WinState) -> WinState {
    let mut rivals = WinState::empty();
    if bits.intersects(VERTICAL) {
        rivals |= VERTICAL;
    }
    if bits.intersects(HORIZONTAL) {
        rivals |= HORIZONTAL;
    }

    rivals
}

impl<B: Frame + Properties + Taskbar> Manager<B> {
    /// Apply a state change to a client. Returns whether anything changed
    pub(crate) fn set_state(&mut self, id: Xid, flag: StateFlag, action: Action) -> bool {
        let bits = flag.bits();
        let (set, any) = match self.registry.get(id) {
            Some(c) => (c.state.contains(bits), c.state.intersects(bits)),
            None => return false,
        };

        let add = action.should_add(set);
        if (add && set) || (!add && !any) {
            return false;
        }

        log::debug!(
            "{} {} on {:#x}",
            if add { "adding" } else { "removing" },
            flag,
            id
        );

        let changed = match flag {
            StateFlag::Modal | StateFlag::SkipPager => self.toggle_bits(id, bits, add),
            StateFlag::Sticky => self.set_sticky(id, add),
            StateFlag::Vmax
            | StateFlag::Hmax
            | StateFlag::Tmax
            | StateFlag::Bmax
            | StateFlag::Lmax
            | StateFlag::Rmax
            | StateFlag::Maximized =>
                if add {
                    self.maximize(id, bits)
                } else {
                    self.unmaximize(id, bits)
                },
            StateFlag::Fullscreen | StateFlag::Above | StateFlag::Below =>
                if add {
                    self.begin_layer_excursion(id, flag)
                } else {
                    self.restore(id)
                },
            StateFlag::Shaded => self.set_shaded(id, add),
            StateFlag::SkipTaskbar => {
                if add && self.registry.get(id).map_or(false, |c| c.is_hidden()) {
                    self.set_state(id, StateFlag::Hidden, Action::Remove);
                }
                self.toggle_bits(id, bits, add)
            },
            StateFlag::Hidden => self.set_hidden(id, add),
            StateFlag::Attention => self.set_attention(id, add),
            StateFlag::Focused =>
                if add {
                    self.focus(Some(id))
                } else {
                    self.focus(None)
                },
        };

        if !changed {
            log::debug!("declined {} on {:#x}", flag, id);
        }

        changed
    }

    /// Flip state bits that carry no side effect
    fn toggle_bits(&mut self, id: Xid, bits: WinState, add: bool) -> bool {
        match self.registry.get_mut(id) {
            Some(c) => c.state.set(bits, add),
            None => return false,
        }

        self.publish_state(id);
        true
    }

    /// Remember where the client was before an excursion. An excursion that
    /// is already under way keeps its snapshot
    fn save_geometry(&mut self, id: Xid) {
        if let Some(c) = self.registry.get_mut(id) {
            if c.saved.is_none() || !c.state.intersects(WinState::EXCURSION) {
                c.saved = Some(Saved {
                    rect:  c.rect,
                    layer: c.layer,
                    area:  c.area,
                });
            }
        }
    }

    /// Can the client leave its layer for an excursion?
    fn can_travel(&self, id: Xid) -> bool {
        self.registry
            .get(id)
            .map_or(false, |c| !matches!(c.layer, Layer::Dock | Layer::Desktop))
    }

    /// Add maximize states and resize to match
    fn maximize(&mut self, id: Xid, bits: WinState) -> bool {
        let fullscreen = self.registry.get(id).map_or(true, |c| c.has(WinState::FULLSCREEN));
        if fullscreen || !self.can_travel(id) {
            return false;
        }

        self.save_geometry(id);

        if self.registry.get(id).map(|c| c.layer) == Some(Layer::Tile)
            && !self.move_client(id, None, Layer::Above, Area::Any)
        {
            return false;
        }

        if let Some(c) = self.registry.get_mut(id) {
            c.state.remove(axis_rivals(bits));
            c.state.insert(bits);
        }

        self.apply_maximized(id, WinState::empty())
    }

    /// Drop maximize states. Without any left the client is restored
    fn unmaximize(&mut self, id: Xid, bits: WinState) -> bool {
        let remaining = match self.registry.get_mut(id) {
            Some(c) => {
                c.state.remove(bits);
                c.state.intersects(WinState::ANY_MAX)
            },
            None => return false,
        };

        if remaining {
            self.apply_maximized(id, bits)
        } else {
            self.restore(id)
        }
    }

    /// Give a client the rectangle its maximize states ask for. Axes without
    /// a maximize state keep the current frame, except the `released` ones,
    /// which go back to the saved frame
    fn apply_maximized(&mut self, id: Xid, released: WinState) -> bool {
        let work = self.work_area();
        match self.registry.get_mut(id) {
            Some(c) => {
                let mut base = c.rect + c.extents;
                let saved = c.saved.map_or(base, |s| s.rect + c.extents);
                if released.intersects(HORIZONTAL) {
                    base.point.x = saved.point.x;
                    base.dimension.width = saved.dimension.width;
                }
                if released.intersects(VERTICAL) {
                    base.point.y = saved.point.y;
                    base.dimension.height = saved.dimension.height;
                }

                c.set_frame(maximized_frame(c.state, work, base));
                c.fresh = false;
            },
            None => return false,
        }

        self.publish_state(id);
        self.publish_rect(id);
        true
    }

    /// Enter the fullscreen, above or below layer
    fn begin_layer_excursion(&mut self, id: Xid, flag: StateFlag) -> bool {
        if !self.can_travel(id) {
            return false;
        }

        let layer = match flag {
            StateFlag::Fullscreen => Layer::Fullscreen,
            StateFlag::Above => Layer::Above,
            _ => Layer::Below,
        };

        self.save_geometry(id);
        if !self.move_client(id, None, layer, Area::Any) {
            return false;
        }

        let screen = self.config.global.screen;
        if let Some(c) = self.registry.get_mut(id) {
            c.state.insert(flag.bits());
            if flag == StateFlag::Fullscreen {
                c.rect = screen;
                c.fresh = false;
            }
        }

        self.publish_state(id);
        self.publish_rect(id);
        true
    }

    /// Return from any excursion to the saved rectangle, layer and area
    pub(crate) fn restore(&mut self, id: Xid) -> bool {
        let (saved, layer, area) = match self.registry.get_mut(id) {
            Some(c) => {
                c.state.remove(WinState::EXCURSION);
                (c.saved.take(), c.layer, c.area)
            },
            None => return false,
        };

        if let Some(saved) = saved {
            if (saved.layer, saved.area) != (layer, area) {
                self.move_client(id, None, saved.layer, saved.area);
            }

            if let Some(c) = self.registry.get_mut(id) {
                c.rect = saved.rect;
            }
        }

        log::debug!("restored {:#x}", id);
        self.publish_state(id);
        self.publish_rect(id);
        self.request_layout_update();
        true
    }

    /// Stick to every desktop, or only to the current one
    fn set_sticky(&mut self, id: Xid, add: bool) -> bool {
        let mask = if add {
            ALL_DESKTOPS
        } else {
            desktop_bit(self.desktops.current())
        };

        match self.replace_mask(id, mask) {
            Some((false, true)) => self.backend.show(id),
            Some(_) => {},
            None => return false,
        }

        self.request_layout_update();
        true
    }

    /// Roll the frame up to its decoration, or back down
    fn set_shaded(&mut self, id: Xid, add: bool) -> bool {
        match self.registry.get_mut(id) {
            Some(c) => c.state.set(WinState::SHADED, add),
            None => return false,
        }

        self.publish_state(id);
        self.publish_rect(id);
        true
    }

    /// Iconify or restore a whole subgroup
    fn set_hidden(&mut self, id: Xid, add: bool) -> bool {
        let members = self.subgroup_of(id);
        let leader = match self.registry.get(id) {
            Some(c) => c.leader,
            None => return false,
        };

        for member in &members {
            if let Some(c) = self.registry.get_mut(*member) {
                c.state.set(WinState::HIDDEN, add);
            }
            self.publish_state(*member);

            if add {
                self.backend.hide(*member);
            } else if self.is_shown(*member) {
                self.backend.show(*member);
            }
        }

        if add {
            self.backend.iconified(leader);
            if self.focused.map_or(false, |f| members.contains(&f)) {
                self.focus(None);
            }
        } else {
            self.backend.deiconified(leader);
            if let Some(top) = self.top_transient(leader) {
                self.focus(Some(top));
            }
        }

        self.request_layout_update();
        true
    }

    /// Raise or settle a demand for attention
    fn set_attention(&mut self, id: Xid, add: bool) -> bool {
        let mask = match self.registry.get_mut(id) {
            Some(c) => {
                c.state.set(WinState::ATTENTION, add);
                c.desktop_mask
            },
            None => return false,
        };

        self.change_attention(mask, add);
        self.publish_state(id);
        true
    }
}
