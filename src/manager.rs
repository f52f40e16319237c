//! The context object that owns every client and drives the collaborators

use crate::{
    client::Client,
    collab::{Frame, Properties, Taskbar},
    config::Config,
    core::{
        change::Action,
        desktop_bit,
        Area,
        Layer,
        LayoutMode,
        StateFlag,
        WinState,
        WindowType,
        Xid,
        ALL_DESKTOPS,
        SENTINEL,
    },
    desktop::Desktops,
    geometry::Rectangle,
    hints::SizeHints,
    pointer::Drag,
    registry::Registry,
};
use colored::Colorize;
use serde::Deserialize;

/// Everything known about a window when it is first managed
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct NewClient {
    /// Window id
    pub(crate) id:          Xid,
    /// `WM_NAME`
    #[serde(default)]
    pub(crate) name:        String,
    /// `_NET_WM_WINDOW_TYPE`
    #[serde(default, rename = "type")]
    pub(crate) window_type: WindowType,
    /// `WM_TRANSIENT_FOR`
    #[serde(default)]
    pub(crate) owner:       Option<Xid>,
    /// Requested content rectangle
    pub(crate) rect:        Rectangle,
    /// `WM_NORMAL_HINTS`
    #[serde(default)]
    pub(crate) size_hints:  SizeHints,
    /// Initial `_NET_WM_STATE`
    #[serde(default)]
    pub(crate) state:       Vec<StateFlag>,
    /// Initial `_NET_WM_DESKTOP`
    #[serde(default)]
    pub(crate) desktop:     Option<usize>,
}

impl NewClient {
    /// Describe a plain top-level window
    pub(crate) fn new(id: Xid, rect: Rectangle) -> Self {
        Self {
            id,
            name: String::new(),
            window_type: WindowType::Normal,
            owner: None,
            rect,
            size_hints: SizeHints::default(),
            state: vec![],
            desktop: None,
        }
    }
}

/// The window-management core
#[derive(Debug)]
pub(crate) struct Manager<B> {
    /// Every managed client, in stacking order
    pub(crate) registry: Registry,
    /// Per-desktop parameters and the visible desktop
    pub(crate) desktops: Desktops,
    /// Loaded configuration
    pub(crate) config:   Config,
    /// Frame, property and taskbar collaborator
    pub(crate) backend:  B,
    /// Client holding the input focus
    pub(crate) focused:  Option<Xid>,
    /// A layout pass is pending
    pub(crate) dirty:    bool,
    /// Pointer drag in progress
    pub(crate) drag:     Drag,
}

impl<B: Frame + Properties + Taskbar> Manager<B> {
    /// Create a new [`Manager`]
    pub(crate) fn new(config: Config, backend: B) -> Self {
        Self {
            registry: Registry::new(),
            desktops: Desktops::new(&config),
            config,
            backend,
            focused: None,
            dirty: false,
            drag: Drag::Idle,
        }
    }

    /// Screen region available to clients
    pub(crate) fn work_area(&self) -> Rectangle {
        self.config.global.work_area()
    }

    /// Is the client linked and visible on the current desktop?
    pub(crate) fn is_shown(&self, id: Xid) -> bool {
        self.registry
            .get(id)
            .map_or(false, |c| self.registry.contains(id) && c.is_shown_on(self.desktops.current()))
    }

    /// Mark the layout as needing a recompute on the next idle
    pub(crate) fn request_layout_update(&mut self) {
        self.dirty = true;
    }

    /// Run the layout pass if one is pending
    pub(crate) fn run_pending_layout(&mut self) -> bool {
        if !self.dirty {
            return false;
        }

        self.update_layout();
        self.dirty = false;
        true
    }

    /// Publish a client's state
    pub(crate) fn publish_state(&mut self, id: Xid) {
        if let Some(state) = self.registry.get(id).map(|c| c.state) {
            self.backend.write_state(id, state);
        }
    }

    /// Push a client's frame to the geometry collaborator
    pub(crate) fn publish_rect(&mut self, id: Xid) {
        if let Some(frame) = self.registry.get(id).map(Client::frame_rect) {
            self.backend.apply_rect(id, frame);
        }
    }

    /// Members of the subgroup `id` belongs to, top to bottom
    pub(crate) fn subgroup_of(&self, id: Xid) -> Vec<Xid> {
        self.registry
            .get(id)
            .map(|c| self.registry.run_of(c.leader))
            .unwrap_or_default()
    }

    /// Number of top-level tiled clients shown in an area of a desktop
    pub(crate) fn area_occupancy(&self, desktop: usize, area: Area) -> usize {
        self.registry
            .iter_where(move |c| {
                c.layer == Layer::Tile
                    && c.area == area
                    && !c.is_transient()
                    && c.is_shown_on(desktop)
            })
            .count()
    }

    /// Layer and area a new client starts in
    fn initial_placement(&self, new: &NewClient, desktop: usize) -> (Layer, Area) {
        match new.window_type {
            WindowType::Desktop => return (Layer::Desktop, Area::Any),
            WindowType::Dock => return (Layer::Dock, Area::Any),
            WindowType::Notification => return (Layer::Above, Area::Any),
            _ => {},
        }

        if let Some(owner) = new.owner.and_then(|o| self.registry.get(o)) {
            return self
                .registry
                .get(owner.leader)
                .map_or((owner.layer, owner.area), |leader| (leader.layer, leader.area));
        }

        if new.window_type.is_dialog_like() {
            return (Layer::Stack, Area::Any);
        }

        let state = self.desktops.get(desktop).unwrap_or_else(|| self.desktops.current_state());
        match state.layout_mode {
            LayoutMode::Stack => (Layer::Stack, Area::Any),
            LayoutMode::Tile =>
                if self.area_occupancy(desktop, Area::Main) < state.main_area_n {
                    (Layer::Tile, Area::Main)
                } else {
                    (Layer::Tile, Area::Second)
                },
        }
    }

    /// Start managing a window
    pub(crate) fn manage(&mut self, new: NewClient) -> bool {
        if new.id == SENTINEL || self.registry.get(new.id).is_some() {
            log::debug!("declining to manage {:#x}: already known", new.id);
            return false;
        }

        let owner = new
            .owner
            .filter(|o| *o != new.id)
            .and_then(|o| self.registry.get(o));
        let leader = owner.map_or(new.id, |o| o.leader);

        let desktop = new
            .desktop
            .filter(|d| *d < self.desktops.count())
            .unwrap_or_else(|| self.desktops.current());
        let desktop_mask = match (owner, new.window_type) {
            (_, WindowType::Dock | WindowType::Desktop) => ALL_DESKTOPS,
            (Some(owner), _) => owner.desktop_mask,
            (None, _) => desktop_bit(desktop),
        };

        let (layer, area) = self.initial_placement(&new, desktop);
        let mut client = Client::new(new.id, new.rect);
        client.name = new.name;
        client.window_type = new.window_type;
        client.owner = owner.map(|o| o.id);
        client.leader = leader;
        client.follows_owner = client.owner.is_some();
        client.desktop_mask = desktop_mask;
        client.layer = layer;
        client.area = area;
        client.size_hints = new.size_hints;
        client.extents = self.backend.extents(new.id, new.window_type);

        log::debug!(
            "{} {} on {:?}/{:?} (leader {:#x})",
            "managing".green(),
            client,
            layer,
            area,
            leader
        );

        let anchor = self.registry.head_for(Some(leader), layer, area);
        let id = client.id;
        self.registry.adopt(client);
        self.registry.insert_after(anchor, id);
        self.backend.write_desktop(id, desktop_mask);

        for flag in new.state {
            if flag != StateFlag::Focused {
                self.set_state(id, flag, Action::Add);
            }
        }

        if self.is_shown(id) {
            self.backend.show(id);
            if self.config.global.focus_new && !new.window_type.is_undecorated() {
                self.focus(Some(id));
            }
        }

        self.request_layout_update();
        true
    }

    /// Stop managing a window that disappeared
    pub(crate) fn unmanage(&mut self, id: Xid) -> bool {
        let (leader, state, mask) = match self.registry.get(id) {
            Some(c) => (c.leader, c.state, c.desktop_mask),
            None => return false,
        };

        let successor = if self.focused == Some(id) {
            self.next(Some(id)).filter(|next| *next != id)
        } else {
            self.focused
        };

        if state.contains(WinState::ATTENTION) {
            self.change_attention(mask, false);
        }

        let rest = self
            .registry
            .run_of(leader)
            .into_iter()
            .filter(|m| *m != id)
            .collect::<Vec<_>>();

        let new_leader = if leader == id { rest.last().copied() } else { Some(leader) };

        for member in rest {
            if let Some(c) = self.registry.get_mut(member) {
                if c.owner == Some(id) || (leader == id && Some(member) == new_leader) {
                    c.owner = None;
                    c.follows_owner = false;
                }
                if let Some(new_leader) = new_leader {
                    c.leader = new_leader;
                }
            }
        }

        self.desktops.forget_focus(id);
        self.registry.release(id);
        if let Drag::Moving { id: dragged, .. } | Drag::Resizing { id: dragged, .. } = self.drag {
            if dragged == id {
                self.drag = Drag::Idle;
            }
        }

        log::debug!("{} {:#x}", "unmanaged".red(), id);

        if self.focused == Some(id) {
            self.focused = None;
            self.focus(successor);
        }

        self.request_layout_update();
        true
    }

    /// Give the input focus to a client, or to nobody
    pub(crate) fn focus(&mut self, target: Option<Xid>) -> bool {
        if let Some(id) = target {
            if !self.is_shown(id) {
                log::debug!("declining to focus {:#x}: not shown", id);
                return false;
            }
        }

        if let Some(previous) = self.focused.filter(|p| Some(*p) != target) {
            if let Some(c) = self.registry.get_mut(previous) {
                c.state.remove(WinState::FOCUSED);
                c.dimmed = true;
                self.backend.set_dimmed(previous, true);
                self.publish_state(previous);
            }
        }

        if let Some(id) = target {
            if let Some(c) = self.registry.get_mut(id) {
                c.state.insert(WinState::FOCUSED);
                c.dimmed = false;
                self.backend.set_dimmed(id, false);
                self.publish_state(id);
            }
        }

        log::trace!("focus moves to {:?}", target);
        self.focused = target;
        self.desktops.current_state_mut().focus = target;
        self.backend.set_active_window(target);

        true
    }

    /// Move the attention counters of every desktop in `mask`
    pub(crate) fn change_attention(&mut self, mask: u32, add: bool) {
        for desktop in 0..self.desktops.count() {
            if mask != ALL_DESKTOPS && mask & desktop_bit(desktop) == 0 {
                continue;
            }

            if let Some(state) = self.desktops.get_mut(desktop) {
                state.attention = if add {
                    state.attention.saturating_add(1)
                } else {
                    state.attention.saturating_sub(1)
                };

                let count = state.attention;
                self.backend.attention_changed(desktop, count);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Manager, NewClient};
    use crate::{
        collab::{Call, Recorder},
        config::Config,
        core::{Area, Layer, LayoutMode, WindowType, Xid, ALL_DESKTOPS},
        geometry::Rectangle,
    };
    use pretty_assertions::assert_eq;

    /// A manager with a tiling first desktop and no decoration
    pub(crate) fn manager(mode: LayoutMode) -> Manager<Recorder> {
        let mut config = Config::default();
        config.global.layout_mode = mode;
        config.global.screen = Rectangle::new(0, 0, 1000, 800);
        config.global.taskbar_height = 0;
        config.global.window_gap = 0;
        config.global.main_area_n = 1;
        Manager::new(config, Recorder::default())
    }

    /// Manage a plain window
    pub(crate) fn add(wm: &mut Manager<Recorder>, id: Xid) {
        assert!(wm.manage(NewClient::new(id, Rectangle::new(100, 100, 300, 200))));
    }

    /// Manage a transient window
    pub(crate) fn add_transient(wm: &mut Manager<Recorder>, id: Xid, owner: Xid) {
        let mut new = NewClient::new(id, Rectangle::new(100, 100, 300, 200));
        new.owner = Some(owner);
        new.window_type = WindowType::Dialog;
        assert!(wm.manage(new));
    }

    /// Registry order, top first
    pub(crate) fn order(wm: &Manager<Recorder>) -> Vec<Xid> {
        wm.registry.iter().map(|c| c.id).collect()
    }

    /// Every subgroup forms one run ending in its leader
    pub(crate) fn assert_invariants(wm: &Manager<Recorder>) {
        let ids = order(wm);
        for client in wm.registry.iter() {
            let run = wm.registry.run_of(client.leader);
            let start = ids.iter().position(|id| *id == run[0]).expect("run start is linked");
            assert_eq!(&ids[start..start + run.len()], run.as_slice(), "run of {}", client);
            assert_eq!(run.last(), Some(&client.leader));
            assert_eq!(
                client.area != Area::Any,
                client.layer == Layer::Tile,
                "placement of {}",
                client
            );
        }
    }

    #[test]
    fn default_placement() {
        let mut wm = manager(LayoutMode::Tile);
        add(&mut wm, 1);
        add(&mut wm, 2);
        add(&mut wm, 3);

        let areas = [1, 2, 3].map(|id| wm.registry.get(id).map(|c| c.area));
        assert_eq!(areas, [Some(Area::Main), Some(Area::Second), Some(Area::Second)]);

        let mut dock = NewClient::new(9, Rectangle::new(0, 0, 1000, 20));
        dock.window_type = WindowType::Dock;
        assert!(wm.manage(dock));
        let dock = wm.registry.get(9).expect("dock is managed");
        assert_eq!((dock.layer, dock.desktop_mask), (Layer::Dock, ALL_DESKTOPS));

        add_transient(&mut wm, 10, 1);
        let transient = wm.registry.get(10).expect("transient is managed");
        assert_eq!((transient.layer, transient.area, transient.leader), (Layer::Tile, Area::Main, 1));

        let mut dialog = NewClient::new(11, Rectangle::new(0, 0, 10, 10));
        dialog.window_type = WindowType::Dialog;
        assert!(wm.manage(dialog));
        assert_eq!(wm.registry.get(11).map(|c| c.layer), Some(Layer::Stack));

        assert_eq!(order(&wm), vec![9, 10, 1, 3, 2, 11]);
        assert_invariants(&wm);
        assert!(!wm.manage(NewClient::new(1, Rectangle::default())));
    }

    #[test]
    fn new_clients_take_focus() {
        let mut wm = manager(LayoutMode::Stack);
        add(&mut wm, 1);
        add(&mut wm, 2);

        assert_eq!(wm.focused, Some(2));
        assert_eq!(wm.desktops.current_state().focus, Some(2));
        assert!(wm.backend.calls.contains(&Call::Active { id: Some(2) }));
        assert!(wm.registry.get(1).map_or(false, |c| c.dimmed));
    }

    #[test]
    fn unmanage_picks_successor_and_new_leader() {
        let mut wm = manager(LayoutMode::Stack);
        add(&mut wm, 1);
        add_transient(&mut wm, 10, 1);
        add_transient(&mut wm, 11, 10);
        add(&mut wm, 2);

        assert_eq!(order(&wm), vec![2, 11, 10, 1]);
        assert!(wm.focus(Some(1)));

        assert!(wm.unmanage(1));
        assert!(!wm.unmanage(1));
        assert_eq!(order(&wm), vec![2, 11, 10]);

        let heir = wm.registry.get(10).expect("transient survives");
        assert_eq!((heir.leader, heir.owner), (10, None));
        let grandchild = wm.registry.get(11).expect("transient survives");
        assert_eq!((grandchild.leader, grandchild.owner), (10, Some(10)));

        assert_eq!(wm.focused, Some(2));
        assert_invariants(&wm);
    }
}
