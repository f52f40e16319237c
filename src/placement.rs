//! Moving and swapping subgroups inside the registry

use crate::{
    collab::{Frame, Properties, Taskbar},
    core::{placement_is_valid, Area, Layer, LayoutMode, WinState, Xid},
    manager::Manager,
};
use std::cmp::Ordering;

/// States a client loses when it enters a layer
fn cleared_by(layer: Layer, mode: LayoutMode) -> WinState {
    let opposed = WinState::FULLSCREEN | WinState::ABOVE | WinState::BELOW;

    match layer {
        Layer::Fullscreen => WinState::ANY_MAX | WinState::ABOVE | WinState::BELOW,
        Layer::Above => WinState::FULLSCREEN | WinState::BELOW,
        Layer::Below => WinState::FULLSCREEN | WinState::ABOVE,
        Layer::Tile if mode == LayoutMode::Tile => WinState::ANY_MAX | opposed,
        _ => opposed,
    }
}

impl<B: Frame + Properties + Taskbar> Manager<B> {
    /// Give every member of a run a placement, dropping the states the new
    /// layer does not allow
    pub(crate) fn place_run(&mut self, run: &[Xid], layer: Layer, area: Area) {
        let mode = self.desktops.current_state().layout_mode;
        let cleared = cleared_by(layer, mode);

        for id in run {
            let changed = match self.registry.get_mut(*id) {
                Some(c) => {
                    c.layer = layer;
                    c.area = area;
                    let changed = c.state.intersects(cleared);
                    c.state.remove(cleared);
                    changed
                },
                None => continue,
            };

            if changed {
                self.publish_state(*id);
            }
        }
    }

    /// Move a client's subgroup next to `to`, or to the head of its new
    /// layer and area. Declined moves change nothing
    pub(crate) fn move_client(&mut self, from: Xid, to: Option<Xid>, layer: Layer, area: Area) -> bool {
        let (leader, current_area) = match self.registry.get(from) {
            Some(c) if self.registry.contains(from) => (c.leader, c.area),
            _ => return false,
        };

        let target = match to {
            Some(to) if to == from => {
                log::debug!("declining to move {:#x} onto itself", from);
                return false;
            },
            Some(to) => match self.registry.get(to) {
                Some(t) if self.registry.contains(to) && t.leader != leader => Some((to, t.leader)),
                _ => {
                    log::debug!("declining to move {:#x} next to {:#x}", from, to);
                    return false;
                },
            },
            None => None,
        };

        if !placement_is_valid(layer, area) {
            log::debug!("declining to place {:#x} on {:?}/{:?}", from, layer, area);
            return false;
        }

        if area == Area::Second && current_area == Area::Main {
            let desktop = self.desktops.current();
            let occupied = self
                .registry
                .iter_where(move |c| {
                    c.area == Area::Second && c.leader != leader && c.is_shown_on(desktop)
                })
                .next()
                .is_some();

            if !occupied {
                log::debug!("declining to open a second column with {:#x}", from);
                return false;
            }
        }

        log::debug!("moving {:#x} to {:?}/{:?} (next to {:?})", from, layer, area, to);

        let before = target.map(|(to, _)| self.registry.store_order(from, to));
        let run = self.registry.detach_run(leader);

        let anchor = match (target, before) {
            (Some((_, to_leader)), Some(Ordering::Less)) => to_leader,
            (Some((_, to_leader)), _) => {
                let to_run = self.registry.run_of(to_leader);
                let first = to_run.first().copied().unwrap_or(to_leader);
                self.registry.prev_of(first)
            },
            (None, _) => self.registry.head_for(None, layer, area),
        };

        self.registry.insert_run_after(anchor, &run);
        self.place_run(&run, layer, area);
        self.request_layout_update();

        true
    }

    /// Exchange the registry positions and placements of two subgroups
    pub(crate) fn swap_clients(&mut self, a: Xid, b: Xid) -> bool {
        let leaders = match (self.registry.get(a), self.registry.get(b)) {
            (Some(ca), Some(cb)) if self.registry.contains(a) && self.registry.contains(b) =>
                (ca.leader, cb.leader),
            _ => return false,
        };

        if leaders.0 == leaders.1 {
            log::debug!("declining to swap {:#x} with its own subgroup", a);
            return false;
        }

        let (first, second) = match self.registry.store_order(a, b) {
            Ordering::Less => leaders,
            _ => (leaders.1, leaders.0),
        };

        let placement = |id: Xid| self.registry.get(id).map(|c| (c.layer, c.area));
        let (first_place, second_place) = match (placement(first), placement(second)) {
            (Some(f), Some(s)) => (f, s),
            _ => return false,
        };

        let first_run = self.registry.run_of(first);
        let second_run = self.registry.run_of(second);
        let (head, tail) = match (first_run.first(), second_run.first()) {
            (Some(h), Some(t)) => (*h, *t),
            _ => return false,
        };

        let before_first = self.registry.prev_of(head);
        let before_second = self.registry.prev_of(tail);
        let adjacent = before_second == first;

        log::debug!("swapping {:#x} and {:#x}", a, b);

        self.registry.detach_run(second);
        self.registry.insert_run_after(before_first, &second_run);

        if !adjacent {
            self.registry.detach_run(first);
            self.registry.insert_run_after(before_second, &first_run);
        }

        self.place_run(&first_run, second_place.0, second_place.1);
        self.place_run(&second_run, first_place.0, first_place.1);
        self.request_layout_update();

        true
    }
}

#[cfg(test)]
mod tests {
    use super::cleared_by;
    use crate::{
        collab::Recorder,
        core::{change::Action, Area, Layer, LayoutMode, StateFlag, WinState, Xid},
        manager::{
            tests::{add, add_transient, assert_invariants, manager, order},
            Manager,
        },
    };
    use pretty_assertions::assert_eq;

    fn area(wm: &Manager<Recorder>, id: Xid) -> Option<Area> {
        wm.registry.get(id).map(|c| c.area)
    }

    #[test]
    fn layer_side_effects() {
        assert!(cleared_by(Layer::Fullscreen, LayoutMode::Tile).contains(WinState::ANY_MAX));
        assert!(!cleared_by(Layer::Fullscreen, LayoutMode::Tile).contains(WinState::FULLSCREEN));
        assert!(!cleared_by(Layer::Above, LayoutMode::Tile).contains(WinState::ABOVE));
        assert!(cleared_by(Layer::Above, LayoutMode::Tile).contains(WinState::BELOW));
        assert!(cleared_by(Layer::Tile, LayoutMode::Tile).contains(WinState::VMAX));
        assert!(!cleared_by(Layer::Tile, LayoutMode::Stack).contains(WinState::VMAX));
        assert!(cleared_by(Layer::Stack, LayoutMode::Stack).contains(WinState::FULLSCREEN));
    }

    #[test]
    fn scenario_main_area_rebalance() {
        let mut wm = manager(LayoutMode::Tile);
        add(&mut wm, 0xA);
        add(&mut wm, 0xB);
        add(&mut wm, 0xC);

        assert_eq!(area(&wm, 0xA), Some(Area::Main));
        assert_eq!(area(&wm, 0xB), Some(Area::Second));
        assert_eq!(area(&wm, 0xC), Some(Area::Second));

        assert!(wm.move_client(0xC, None, Layer::Tile, Area::Main));
        assert_eq!(order(&wm), vec![0xC, 0xA, 0xB]);
        assert!(wm.run_pending_layout());

        assert_eq!(area(&wm, 0xC), Some(Area::Main));
        assert_eq!(area(&wm, 0xA), Some(Area::Second));
        assert_eq!(area(&wm, 0xB), Some(Area::Second));
        assert_invariants(&wm);
    }

    #[test]
    fn declined_moves() {
        let mut wm = manager(LayoutMode::Tile);
        add(&mut wm, 1);
        add_transient(&mut wm, 10, 1);
        add(&mut wm, 2);
        let before = order(&wm);

        assert!(!wm.move_client(1, Some(1), Layer::Tile, Area::Main));
        assert!(!wm.move_client(1, Some(10), Layer::Tile, Area::Main));
        assert!(!wm.move_client(1, None, Layer::Tile, Area::Any));
        assert!(!wm.move_client(1, None, Layer::Stack, Area::Main));
        assert!(!wm.move_client(99, None, Layer::Stack, Area::Any));
        assert!(!wm.move_client(1, Some(99), Layer::Stack, Area::Any));

        // The only second-column client may not be the one that opens it
        assert!(wm.move_client(2, None, Layer::Stack, Area::Any));
        assert!(!wm.move_client(1, None, Layer::Tile, Area::Second));

        assert_eq!(
            order(&wm).into_iter().filter(|id| *id != 2).collect::<Vec<_>>(),
            before.into_iter().filter(|id| *id != 2).collect::<Vec<_>>()
        );
        assert_invariants(&wm);
    }

    #[test]
    fn move_next_to_target() {
        let mut wm = manager(LayoutMode::Stack);
        for id in 1..=4 {
            add(&mut wm, id);
        }
        add_transient(&mut wm, 10, 1);
        assert_eq!(order(&wm), vec![4, 3, 2, 10, 1]);

        // Moving down lands after the target's run
        assert!(wm.move_client(4, Some(1), Layer::Stack, Area::Any));
        assert_eq!(order(&wm), vec![3, 2, 10, 1, 4]);

        // Moving up lands before the target's run
        assert!(wm.move_client(1, Some(3), Layer::Stack, Area::Any));
        assert_eq!(order(&wm), vec![10, 1, 3, 2, 4]);
        assert_invariants(&wm);
    }

    #[test]
    fn moving_into_a_layer_drops_states() {
        let mut wm = manager(LayoutMode::Stack);
        add(&mut wm, 1);
        assert!(wm.set_state(1, StateFlag::Below, Action::Add));
        assert_eq!(wm.registry.get(1).map(|c| c.layer), Some(Layer::Below));

        assert!(wm.move_client(1, None, Layer::Stack, Area::Any));
        let client = wm.registry.get(1).expect("client is managed");
        assert!(!client.has(WinState::BELOW));
        assert_eq!(client.layer, Layer::Stack);
    }

    #[test]
    fn swap_adjacent_and_apart() {
        let mut wm = manager(LayoutMode::Tile);
        for id in 1..=4 {
            add(&mut wm, id);
        }
        add_transient(&mut wm, 10, 3);
        assert_eq!(order(&wm), vec![1, 4, 10, 3, 2]);

        assert!(wm.swap_clients(1, 4));
        assert_eq!(order(&wm), vec![4, 1, 10, 3, 2]);
        assert_eq!(wm.registry.get(4).map(|c| c.area), Some(Area::Main));
        assert_eq!(wm.registry.get(1).map(|c| c.area), Some(Area::Second));

        assert!(wm.swap_clients(2, 4));
        assert_eq!(order(&wm), vec![2, 1, 10, 3, 4]);

        assert!(wm.swap_clients(10, 1));
        assert_eq!(order(&wm), vec![2, 10, 3, 1, 4]);

        assert!(!wm.swap_clients(10, 3));
        assert!(!wm.swap_clients(10, 99));
        assert_invariants(&wm);
    }

    #[test]
    fn contiguity_survives_a_sequence() {
        let mut wm = manager(LayoutMode::Tile);
        for id in 1..=4 {
            add(&mut wm, id);
        }
        add_transient(&mut wm, 10, 1);
        add_transient(&mut wm, 11, 10);
        add_transient(&mut wm, 20, 3);

        assert!(wm.move_client(3, None, Layer::Stack, Area::Any));
        assert!(wm.swap_clients(11, 2));
        assert!(wm.set_state(20, StateFlag::Hidden, Action::Add));
        assert!(wm.move_client(4, Some(10), Layer::Tile, Area::Main));
        assert!(wm.set_state(3, StateFlag::Hidden, Action::Remove));
        assert!(wm.swap_clients(3, 1));
        assert!(wm.run_pending_layout());
        assert!(wm.set_state(10, StateFlag::Maximized, Action::Add));
        assert!(wm.move_client(2, Some(11), Layer::Above, Area::Any));

        assert_invariants(&wm);
    }

    #[test]
    fn contiguity_survives_every_order() {
        #[derive(Debug, Clone, Copy)]
        enum Op {
            Move(Xid, Option<Xid>, Layer, Area),
            Swap(Xid, Xid),
            Hide(Xid, bool),
        }

        let ops = [
            Op::Move(3, None, Layer::Stack, Area::Any),
            Op::Swap(11, 2),
            Op::Hide(20, true),
            Op::Move(4, Some(10), Layer::Tile, Area::Main),
            Op::Hide(3, false),
            Op::Swap(3, 1),
            Op::Move(2, Some(11), Layer::Above, Area::Any),
            Op::Hide(1, true),
            Op::Move(10, None, Layer::Tile, Area::Second),
            Op::Hide(1, false),
        ];

        for stride in [1, 3, 7, 9] {
            for start in 0..ops.len() {
                let mut wm = manager(LayoutMode::Tile);
                for id in 1..=4 {
                    add(&mut wm, id);
                }
                add_transient(&mut wm, 10, 1);
                add_transient(&mut wm, 11, 10);
                add_transient(&mut wm, 20, 3);

                for step in 0..ops.len() {
                    let op = ops[(start + step * stride) % ops.len()];
                    match op {
                        Op::Move(id, to, layer, area) => {
                            wm.move_client(id, to, layer, area);
                        },
                        Op::Swap(a, b) => {
                            wm.swap_clients(a, b);
                        },
                        Op::Hide(id, hide) => {
                            let action = if hide { Action::Add } else { Action::Remove };
                            wm.set_state(id, StateFlag::Hidden, action);
                        },
                    }
                    wm.run_pending_layout();

                    assert_invariants(&wm);
                    assert_eq!(
                        wm.registry.len(),
                        7,
                        "{:?} (stride {}, start {})",
                        op,
                        stride,
                        start
                    );
                }
            }
        }
    }
}
