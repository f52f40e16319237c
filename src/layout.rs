//! Tiling columns and the geometry fix-up of new windows

use crate::{
    client::Client,
    collab::{Frame, Properties, Taskbar},
    config::TaskbarPosition,
    core::{Area, Layer, LayoutMode, WinState, Xid},
    geometry::{Dimension, Point, Rectangle},
    manager::Manager,
};
use itertools::Itertools;

/// Tiling areas as their columns appear, left to right
pub(crate) const BANDS: [Area; 3] = [Area::Second, Area::Main, Area::Fixed];

/// Split the work area into the second, main and fixed columns. Unoccupied
/// columns give their width to the main column, and an unoccupied main column
/// gives its width to the first occupied one
pub(crate) fn bands(
    work: Rectangle,
    main_ratio: f32,
    fixed_ratio: f32,
    occupied: [bool; 3],
) -> [Rectangle; 3] {
    let total = work.dimension.width;
    let scaled = |ratio: f32| ((total as f32 * ratio.max(0.0)) as u32).min(total);

    let main = scaled(main_ratio);
    let fixed = scaled(fixed_ratio).min(total - main);
    let mut widths = [total - main - fixed, main, fixed];

    for idx in [0, 2] {
        if !occupied[idx] {
            widths[1] += widths[idx];
            widths[idx] = 0;
        }
    }

    if !occupied[1] {
        if let Some(idx) = [0, 2].into_iter().find(|idx| occupied[*idx]) {
            widths[idx] += widths[1];
            widths[1] = 0;
        }
    }

    let mut x = work.point.x;
    let mut columns = [Rectangle::default(); 3];
    for (column, width) in columns.iter_mut().zip(widths) {
        *column = Rectangle::new(x, work.point.y, width, work.dimension.height);
        x += width as i32;
    }

    columns
}

/// Cut a column into `count` stacked slots. The last slot takes what is left
/// of the division, so the slots cover the column exactly
pub(crate) fn band_slots(band: Rectangle, count: usize) -> Vec<Rectangle> {
    if count == 0 {
        return vec![];
    }

    let count = count as u32;
    let height = band.dimension.height / count;
    let rest = band.dimension.height % count;

    (0..count)
        .map(|idx| {
            let extra = if idx == count - 1 { rest } else { 0 };
            Rectangle::new(
                band.point.x,
                band.point.y + (idx * height) as i32,
                band.dimension.width,
                height + extra,
            )
        })
        .collect()
}

/// Reserve the gap between tiles on the leading edges of a slot. With the
/// taskbar at the top the vertical gap moves to the bottom edge
pub(crate) fn with_gap(slot: Rectangle, gap: u32, taskbar: TaskbarPosition) -> Rectangle {
    let mut rect = slot;
    rect.point.x += gap as i32;
    rect.dimension.width = rect.dimension.width.saturating_sub(gap);

    if taskbar != TaskbarPosition::Top {
        rect.point.y += gap as i32;
    }
    rect.dimension.height = rect.dimension.height.saturating_sub(gap);

    rect
}

/// Keep a frame inside the work area, shrinking it first if it is too big
pub(crate) fn clamp_into(frame: Rectangle, work: Rectangle) -> Rectangle {
    let dimension = Dimension::new(
        frame.dimension.width.min(work.dimension.width),
        frame.dimension.height.min(work.dimension.height),
    );

    let max_x = (work.right() - dimension.width as i32).max(work.point.x);
    let max_y = (work.bottom() - dimension.height as i32).max(work.point.y);

    Rectangle {
        point: Point::new(
            frame.point.x.clamp(work.point.x, max_x),
            frame.point.y.clamp(work.point.y, max_y),
        ),
        dimension,
    }
}

impl<B: Frame + Properties + Taskbar> Manager<B> {
    /// Is the client arranged in a column by the tiling pass?
    fn is_tiled(&self, client: &Client) -> bool {
        client.layer == Layer::Tile
            && !client.is_transient()
            && self.desktops.current_state().layout_mode == LayoutMode::Tile
    }

    /// Top-level tiled clients shown on the current desktop, top first
    fn tiled_clients(&self) -> Vec<Xid> {
        let desktop = self.desktops.current();
        self.registry.ids_where(|c| {
            c.layer == Layer::Tile && !c.is_transient() && c.is_shown_on(desktop)
        })
    }

    /// Move a tiled subgroup between the main and second columns, keeping the
    /// columns in registry order
    fn regroup(&mut self, leader: Xid, area: Area) {
        let run = self.registry.detach_run(leader);
        let anchor = self.registry.head_for(None, Layer::Tile, Area::Second);
        self.registry.insert_run_after(anchor, &run);
        self.place_run(&run, Layer::Tile, area);
    }

    /// Keep exactly `main_area_n` clients in the main column while enough
    /// tiled clients exist
    pub(crate) fn rebalance(&mut self) {
        let capacity = self.desktops.current_state().main_area_n;
        let mut in_main = 0;

        for id in self.tiled_clients() {
            let (area, leader) = match self.registry.get(id) {
                Some(c) => (c.area, c.leader),
                None => continue,
            };

            if area == Area::Main {
                if in_main < capacity {
                    in_main += 1;
                } else {
                    log::debug!("{:#x} overflows the main column", id);
                    self.regroup(leader, Area::Second);
                }
            }
        }

        for id in self.tiled_clients() {
            if in_main >= capacity {
                break;
            }

            if let Some(leader) = self
                .registry
                .get(id)
                .filter(|c| c.area == Area::Second)
                .map(|c| c.leader)
            {
                log::debug!("{:#x} fills the main column", id);
                self.regroup(leader, Area::Main);
                in_main += 1;
            }
        }
    }

    /// Give every top-level tiled client its slot
    fn arrange_columns(&mut self) {
        let tiled = self.tiled_clients();
        let mut occupants: [Vec<Xid>; 3] = Default::default();
        for id in tiled {
            let band = self
                .registry
                .get(id)
                .and_then(|c| BANDS.iter().position(|a| *a == c.area));
            if let Some(idx) = band {
                occupants[idx].push(id);
            }
        }

        let state = self.desktops.current_state();
        let columns = bands(
            self.work_area(),
            state.main_ratio,
            state.fixed_ratio,
            [0, 1, 2].map(|idx| !occupants[idx].is_empty()),
        );

        let gap = self.config.global.window_gap;
        let taskbar = self.config.global.taskbar;

        for (column, ids) in columns.iter().zip(&occupants) {
            for (slot, id) in band_slots(*column, ids.len()).into_iter().zip(ids) {
                if let Some(c) = self.registry.get_mut(*id) {
                    c.set_frame(with_gap(slot, gap, taskbar));
                    c.fresh = false;
                }
            }
        }
    }

    /// Settle the geometry of a window that was just mapped or that follows
    /// its owner
    fn fix_up(&mut self, id: Xid) {
        let work = self.work_area();
        let honor_hints = self.config.global.honor_size_hints;

        let (client, owner_frame) = match self.registry.get(id) {
            Some(c) => (
                c.clone(),
                c.owner
                    .and_then(|o| self.registry.get(o))
                    .map(Client::frame_rect),
            ),
            None => return,
        };

        let mut frame = client.rect + client.extents;
        frame.dimension.width = frame.dimension.width.min(work.dimension.width);
        frame.dimension.height = frame.dimension.height.min(work.dimension.height);

        match owner_frame {
            Some(owner) if client.fresh => {
                let half = Dimension::new(
                    (owner.dimension.width / 2).max(1),
                    (owner.dimension.height / 2).max(1),
                );
                frame = owner.centered(half);
            },
            Some(owner) if client.follows_owner => frame = owner.centered(frame.dimension),
            None if client.fresh && client.window_type.is_dialog_like() => {
                let half = Dimension::new(work.dimension.width / 2, work.dimension.height / 2);
                frame = work.centered(half);
            },
            _ => {},
        }

        if honor_hints {
            let content = client.size_hints.apply((frame - client.extents).dimension);
            frame.dimension = client.frame_size(content);
        }

        let frame = clamp_into(frame, work);
        if let Some(c) = self.registry.get_mut(id) {
            c.set_frame(frame);
        }
    }

    /// Recompute the geometry of the current desktop and push it out
    pub(crate) fn update_layout(&mut self) {
        let mode = self.desktops.current_state().layout_mode;
        log::debug!("updating the {} layout of desktop {}", mode, self.desktops.current());

        if mode == LayoutMode::Tile {
            self.rebalance();
            self.arrange_columns();
        }

        // Owners come before their transients
        let pending = self
            .registry
            .iter()
            .filter(|c| self.is_shown(c.id))
            .filter(|c| c.fresh || c.follows_owner)
            .filter(|c| !self.is_tiled(c))
            .filter(|c| !matches!(c.layer, Layer::Dock | Layer::Desktop))
            .filter(|c| !c.state.intersects(WinState::ANY_MAX | WinState::FULLSCREEN))
            .map(|c| c.id)
            .collect_vec();

        for id in pending.into_iter().rev() {
            self.fix_up(id);
        }

        let shown = self
            .registry
            .iter()
            .map(|c| c.id)
            .filter(|id| self.is_shown(*id))
            .collect_vec();

        for id in &shown {
            if let Some(c) = self.registry.get_mut(*id) {
                c.fresh = false;
            }
            self.publish_rect(*id);
        }

        let order = self.registry.iter().map(|c| c.id).collect_vec();
        self.backend.restack(&order);
    }
}

#[cfg(test)]
mod tests {
    use super::{band_slots, bands, clamp_into, with_gap};
    use crate::{
        collab::{Call, Recorder},
        config::TaskbarPosition,
        core::{change::Action, Area, LayoutMode, StateFlag, WindowType, Xid},
        geometry::Rectangle,
        hints::SizeHints,
        manager::{
            tests::{add, add_transient, assert_invariants, manager, order},
            Manager,
            NewClient,
        },
    };
    use pretty_assertions::assert_eq;

    fn rect(wm: &Manager<Recorder>, id: Xid) -> Option<Rectangle> {
        wm.registry.get(id).map(|c| c.rect)
    }

    #[test]
    fn slot_heights_cover_the_band() {
        let band = Rectangle::new(10, 20, 300, 801);
        for count in [1, 2, 3, 7] {
            let slots = band_slots(band, count);
            assert_eq!(slots.len(), count);

            let total: u32 = slots.iter().map(|s| s.dimension.height).sum();
            assert_eq!(total, 801, "{} slots", count);

            let mut y = band.point.y;
            for slot in &slots {
                assert_eq!(slot.point.y, y);
                assert_eq!((slot.point.x, slot.dimension.width), (10, 300));
                y = slot.bottom();
            }
            assert_eq!(y, band.bottom());
        }

        assert!(band_slots(band, 0).is_empty());
    }

    #[test]
    fn column_widths() {
        let work = Rectangle::new(0, 0, 1000, 800);

        assert_eq!(bands(work, 0.5, 0.0, [true, true, false]), [
            Rectangle::new(0, 0, 500, 800),
            Rectangle::new(500, 0, 500, 800),
            Rectangle::new(1000, 0, 0, 800),
        ]);

        assert_eq!(bands(work, 0.5, 0.2, [true, true, true]), [
            Rectangle::new(0, 0, 300, 800),
            Rectangle::new(300, 0, 500, 800),
            Rectangle::new(800, 0, 200, 800),
        ]);

        // Empty columns donate to the main column
        assert_eq!(bands(work, 0.5, 0.2, [false, true, false])[1], work);

        // An empty main column donates to the first occupied one
        let columns = bands(work, 0.5, 0.2, [true, false, true]);
        assert_eq!(columns[0], Rectangle::new(0, 0, 800, 800));
        assert_eq!(columns[2], Rectangle::new(800, 0, 200, 800));
    }

    #[test]
    fn gaps_and_clamping() {
        let slot = Rectangle::new(0, 0, 100, 100);
        assert_eq!(with_gap(slot, 4, TaskbarPosition::Bottom), Rectangle::new(4, 4, 96, 96));
        assert_eq!(with_gap(slot, 4, TaskbarPosition::Top), Rectangle::new(4, 0, 96, 96));

        let work = Rectangle::new(0, 0, 1000, 800);
        assert_eq!(
            clamp_into(Rectangle::new(900, 700, 300, 200), work),
            Rectangle::new(700, 600, 300, 200)
        );
        assert_eq!(clamp_into(Rectangle::new(-50, 10, 2000, 2000), work), work);
    }

    #[test]
    fn tiles_fill_the_work_area() {
        let mut wm = manager(LayoutMode::Tile);
        for id in 1..=3 {
            add(&mut wm, id);
        }
        assert!(wm.run_pending_layout());
        assert!(!wm.run_pending_layout());

        assert_eq!(order(&wm), vec![1, 3, 2]);
        assert_eq!(wm.backend.last_rect(1), Some(Rectangle::new(500, 0, 500, 800)));
        assert_eq!(wm.backend.last_rect(3), Some(Rectangle::new(0, 0, 500, 400)));
        assert_eq!(wm.backend.last_rect(2), Some(Rectangle::new(0, 400, 500, 400)));
        assert_eq!(wm.backend.calls.last(), Some(&Call::Restack { order: vec![1, 3, 2] }));
    }

    #[test]
    fn gap_is_reserved() {
        let mut wm = manager(LayoutMode::Tile);
        wm.config.global.window_gap = 4;
        add(&mut wm, 1);
        assert!(wm.run_pending_layout());

        assert_eq!(wm.registry.get(1).map(|c| c.rect), Some(Rectangle::new(4, 4, 996, 796)));
    }

    #[test]
    fn hidden_main_client_is_replaced() {
        let mut wm = manager(LayoutMode::Tile);
        for id in 1..=3 {
            add(&mut wm, id);
        }

        assert!(wm.set_state(1, StateFlag::Hidden, Action::Add));
        assert!(wm.run_pending_layout());
        assert_eq!(wm.registry.get(3).map(|c| c.area), Some(Area::Main));
        assert_eq!(wm.backend.last_rect(2), Some(Rectangle::new(0, 0, 500, 800)));

        assert!(wm.set_state(1, StateFlag::Hidden, Action::Remove));
        assert!(wm.run_pending_layout());
        assert_eq!(wm.registry.get(1).map(|c| c.area), Some(Area::Main));
        assert_eq!(wm.registry.get(3).map(|c| c.area), Some(Area::Second));
        assert_invariants(&wm);
    }

    #[test]
    fn wider_main_column() {
        let mut wm = manager(LayoutMode::Tile);
        add(&mut wm, 1);
        add(&mut wm, 2);
        add(&mut wm, 3);
        assert!(wm.set_main_area_n(0, 2));
        assert!(wm.run_pending_layout());

        assert_eq!(order(&wm), vec![1, 3, 2]);
        assert_eq!(wm.registry.get(3).map(|c| c.area), Some(Area::Main));
        assert_eq!(wm.backend.last_rect(1), Some(Rectangle::new(500, 0, 500, 400)));
        assert_eq!(wm.backend.last_rect(3), Some(Rectangle::new(500, 400, 500, 400)));
        assert_eq!(wm.backend.last_rect(2), Some(Rectangle::new(0, 0, 500, 800)));
        assert_invariants(&wm);
    }

    #[test]
    fn transients_center_on_their_owner() {
        let mut wm = manager(LayoutMode::Stack);
        add(&mut wm, 1);
        add_transient(&mut wm, 10, 1);
        assert!(wm.run_pending_layout());
        assert_eq!(wm.registry.get(10).map(|c| c.rect), Some(Rectangle::new(175, 150, 150, 100)));

        if let Some(c) = wm.registry.get_mut(1) {
            c.rect = Rectangle::new(500, 500, 300, 200);
        }
        wm.request_layout_update();
        assert!(wm.run_pending_layout());
        assert_eq!(wm.registry.get(10).map(|c| c.rect), Some(Rectangle::new(575, 550, 150, 100)));
        assert_eq!(wm.registry.get(1).map(|c| c.rect), Some(Rectangle::new(500, 500, 300, 200)));
    }

    #[test]
    fn new_windows_are_fixed_up() {
        let mut wm = manager(LayoutMode::Stack);

        let mut dialog = NewClient::new(1, Rectangle::new(0, 0, 10, 10));
        dialog.window_type = WindowType::Dialog;
        assert!(wm.manage(dialog));

        assert!(wm.manage(NewClient::new(2, Rectangle::new(900, 700, 300, 200))));
        assert!(wm.manage(NewClient::new(3, Rectangle::new(0, 0, 4000, 4000))));

        let mut hinted = NewClient::new(4, Rectangle::new(0, 0, 100, 100));
        hinted.size_hints = SizeHints {
            min_width: Some(400),
            min_height: Some(300),
            ..SizeHints::default()
        };
        assert!(wm.manage(hinted));

        assert!(wm.run_pending_layout());
        assert_eq!(rect(&wm, 1), Some(Rectangle::new(250, 200, 500, 400)));
        assert_eq!(rect(&wm, 2), Some(Rectangle::new(700, 600, 300, 200)));
        assert_eq!(rect(&wm, 3), Some(Rectangle::new(0, 0, 1000, 800)));
        assert_eq!(rect(&wm, 4), Some(Rectangle::new(0, 0, 400, 300)));

        // Placed windows are left where they are
        if let Some(c) = wm.registry.get_mut(2) {
            c.rect = Rectangle::new(-200, 0, 300, 200);
        }
        wm.request_layout_update();
        assert!(wm.run_pending_layout());
        assert_eq!(rect(&wm, 2), Some(Rectangle::new(-200, 0, 300, 200)));
    }
}
