//! Next and previous focus targets

use crate::{
    collab::{Frame, Properties, Taskbar},
    core::{WinState, Xid, SENTINEL},
    manager::Manager,
};

impl<B: Frame + Properties + Taskbar> Manager<B> {
    /// Can the client take the focus right now?
    fn focusable(&self, id: Xid) -> bool {
        self.registry
            .get(id)
            .map_or(false, |c| c.is_shown_on(self.desktops.current()))
    }

    /// Does any member of the client's subgroup hold a modal state?
    fn subgroup_has_modal(&self, id: Xid) -> bool {
        self.subgroup_of(id).iter().any(|m| {
            self.registry
                .get(*m)
                .map_or(false, |c| c.has(WinState::MODAL))
        })
    }

    /// Walk from `start` with `step` until a focusable client turns up,
    /// passing over the sentinel
    fn traverse<F>(&self, start: Xid, step: F) -> Option<Xid>
    where
        F: Fn(Xid) -> Xid,
    {
        if self.registry.is_empty() {
            return None;
        }

        let mut cursor = start;
        for _ in 0..=self.registry.len() {
            cursor = step(cursor);
            if cursor != SENTINEL && self.focusable(cursor) {
                return Some(cursor);
            }
        }

        None
    }

    /// Client after `from`, wrapping around. A subgroup holding a modal is
    /// passed over as a whole
    pub(crate) fn next(&self, from: Option<Xid>) -> Option<Xid> {
        let start = match from.and_then(|id| self.registry.get(id)) {
            Some(c) if self.subgroup_has_modal(c.id) => c.leader,
            Some(c) => c.id,
            None => SENTINEL,
        };

        self.traverse(start, |id| self.registry.next_of(id))
    }

    /// Client before `from`, wrapping around. With a modal in the subgroup
    /// the walk starts at the first ancestor that is not modal
    pub(crate) fn prev(&self, from: Option<Xid>) -> Option<Xid> {
        let start = match from.and_then(|id| self.registry.get(id)) {
            Some(c) if self.subgroup_has_modal(c.id) => self.first_non_modal_ancestor(c.id),
            Some(c) => c.id,
            None => SENTINEL,
        };

        self.traverse(start, |id| self.registry.prev_of(id))
    }

    /// First client along the owner chain, starting at `id`, without a modal
    /// state. The chain's root when all of them are modal
    fn first_non_modal_ancestor(&self, id: Xid) -> Xid {
        let mut cursor = id;
        // Bounded in case of an owner cycle
        for _ in 0..=self.registry.len() {
            match self.registry.get(cursor) {
                Some(c) if c.has(WinState::MODAL) => match c.owner {
                    Some(owner) if self.registry.get(owner).is_some() => cursor = owner,
                    _ => return cursor,
                },
                _ => return cursor,
            }
        }

        cursor
    }

    /// The top-most shown member of a client's subgroup
    pub(crate) fn top_transient(&self, id: Xid) -> Option<Xid> {
        let leader = self.registry.get(id)?.leader;
        self.registry
            .run_of(leader)
            .into_iter()
            .find(|m| self.focusable(*m))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        core::{change::Action, LayoutMode, StateFlag},
        manager::tests::{add, add_transient, manager, order},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn next_covers_every_shown_client() {
        let mut wm = manager(LayoutMode::Stack);
        for id in 1..=5 {
            add(&mut wm, id);
        }
        add_transient(&mut wm, 10, 2);
        assert!(wm.move_to_desktop(4, 1));
        assert!(wm.set_state(3, StateFlag::Hidden, Action::Add));

        let shown = order(&wm)
            .into_iter()
            .filter(|id| wm.is_shown(*id))
            .collect::<Vec<_>>();
        assert_eq!(shown.len(), 4);

        for start in &shown {
            let mut seen = vec![];
            let mut cursor = Some(*start);
            for _ in 0..shown.len() {
                cursor = wm.next(cursor);
                let id = cursor.expect("something is focusable");
                assert!(wm.is_shown(id));
                seen.push(id);
            }

            assert_eq!(cursor, Some(*start));
            seen.sort_unstable();
            let mut expected = shown.clone();
            expected.sort_unstable();
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn prev_walks_backwards() {
        let mut wm = manager(LayoutMode::Stack);
        for id in 1..=3 {
            add(&mut wm, id);
        }

        assert_eq!(order(&wm), vec![3, 2, 1]);
        assert_eq!(wm.prev(Some(2)), Some(3));
        assert_eq!(wm.prev(Some(3)), Some(1));
        assert_eq!(wm.next(Some(1)), Some(3));
        assert_eq!(wm.next(None), Some(3));
        assert_eq!(wm.prev(None), Some(1));
    }

    #[test]
    fn nothing_to_focus() {
        let mut wm = manager(LayoutMode::Stack);
        assert_eq!(wm.next(None), None);

        add(&mut wm, 1);
        assert!(wm.set_state(1, StateFlag::Hidden, Action::Add));
        assert_eq!(wm.next(Some(1)), None);
        assert_eq!(wm.prev(Some(1)), None);
    }

    #[test]
    fn modal_subgroups() {
        let mut wm = manager(LayoutMode::Stack);
        add(&mut wm, 1);
        add_transient(&mut wm, 10, 1);
        add(&mut wm, 2);
        assert!(wm.set_state(10, StateFlag::Modal, Action::Add));

        assert_eq!(order(&wm), vec![2, 10, 1]);

        // `next` leaves from the leader and skips the subgroup
        assert_eq!(wm.next(Some(10)), Some(2));
        // `prev` leaves from the first ancestor that is not modal
        assert_eq!(wm.prev(Some(10)), Some(10));
        assert_eq!(wm.prev(Some(2)), Some(1));

        assert_eq!(wm.top_transient(1), Some(10));
        assert!(wm.set_state(10, StateFlag::Hidden, Action::Add));
        assert_eq!(wm.top_transient(1), None);
    }
}
