//! Scripts of window-manager events, used to drive the core without a
//! display server

use crate::{
    collab::{Frame, Properties, Taskbar},
    core::{change::Action, Area, Layer, LayoutMode, StateFlag, Xid, EVERY_DESKTOP},
    error::Error,
    manager::{Manager, NewClient},
    pointer::PointerEvent,
    query::Snapshot,
};
use anyhow::{Context, Result};
use colored::Colorize;
use format_serde_error::SerdeError;
use serde::{de, Deserialize, Deserializer};
use strum_macros::IntoStaticStr;

/// Accept a flag by its short name or by its `_NET_WM_STATE` atom name
fn state_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StateFlag, D::Error> {
    use strum::IntoEnumIterator;

    let name = String::deserialize(deserializer)?;
    StateFlag::iter()
        .find(|flag| flag.to_string() == name)
        .or_else(|| StateFlag::from_atom_name(&name))
        .ok_or_else(|| de::Error::custom(format!("unknown state flag: {}", name)))
}

/// Desktop membership changes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub(crate) enum DesktopStep {
    /// Switch the visible desktop
    Focus { desktop: usize },
    /// Send a client to a single desktop
    MoveTo { id: Xid, desktop: usize },
    /// Send a client to a single desktop and follow it
    ChangeTo { id: Xid, desktop: usize },
    /// Show a client on one more desktop
    AttachTo { id: Xid, desktop: usize },
    /// Show a client on every desktop
    AttachToAll { id: Xid },
    /// Show a client on every desktop besides the current one
    AttachToAllOthers { id: Xid },
}

/// One event fed to the window manager
#[derive(Debug, Clone, PartialEq, Deserialize, IntoStaticStr)]
#[serde(rename_all = "snake_case", tag = "op")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Step {
    /// A window was mapped
    Manage(NewClient),
    /// A window went away
    Unmanage { id: Xid },
    /// Move a subgroup to a layer and area, or next to another client
    Move {
        id:    Xid,
        #[serde(default)]
        to:    Option<Xid>,
        layer: Layer,
        #[serde(default = "not_tiled")]
        area:  Area,
    },
    /// Trade the places of two subgroups
    Swap { a: Xid, b: Xid },
    /// A `_NET_WM_STATE` request
    State {
        id:     Xid,
        #[serde(deserialize_with = "state_flag")]
        flag:   StateFlag,
        action: Action,
    },
    /// Desktop membership or the visible desktop
    Desktop(DesktopStep),
    /// Change the arrangement of a desktop
    LayoutMode {
        #[serde(default)]
        desktop: Option<usize>,
        mode:    LayoutMode,
    },
    /// Change the capacity of the main column
    MainArea {
        #[serde(default)]
        desktop: Option<usize>,
        count:   usize,
    },
    /// Change the width of the main column
    Ratio {
        #[serde(default)]
        desktop: Option<usize>,
        main:    f32,
    },
    /// Focus a client, or nobody
    Focus {
        #[serde(default)]
        id: Option<Xid>,
    },
    /// Focus the client after `from` (the focused client by default)
    Next {
        #[serde(default)]
        from: Option<Xid>,
    },
    /// Focus the client before `from` (the focused client by default)
    Prev {
        #[serde(default)]
        from: Option<Xid>,
    },
    /// A pointer event
    Pointer(PointerEvent),
    /// Run the pending layout pass
    Layout,
    /// Record a [`Snapshot`]
    Query,
}

/// Area of untiled placements
const fn not_tiled() -> Area {
    Area::Any
}

/// A list of [`Step`]s
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Script {
    pub(crate) steps: Vec<Step>,
}

/// Check that a client is managed
fn known<B: Frame + Properties + Taskbar>(wm: &Manager<B>, id: Xid) -> Result<Xid, Error> {
    wm.registry
        .get(id)
        .map(|c| c.id)
        .ok_or(Error::UnknownClient(id))
}

/// Check that a desktop exists, defaulting to the visible one
fn desktop_or_current<B: Frame + Properties + Taskbar>(
    wm: &Manager<B>,
    desktop: Option<usize>,
) -> Result<usize, Error> {
    let desktop = desktop.unwrap_or_else(|| wm.desktops.current());
    if wm.valid_desktop(desktop) {
        Ok(desktop)
    } else {
        Err(Error::InvalidDesktop(desktop, wm.desktops.count()))
    }
}

impl DesktopStep {
    /// Apply the change. Returns whether anything changed
    fn apply<B: Frame + Properties + Taskbar>(&self, wm: &mut Manager<B>) -> Result<bool, Error> {
        let changed = match *self {
            Self::Focus { desktop } => {
                let desktop = desktop_or_current(wm, Some(desktop))?;
                wm.focus_desktop(desktop)
            },
            Self::MoveTo { id, desktop } => {
                let (id, desktop) = (known(wm, id)?, desktop_or_current(wm, Some(desktop))?);
                wm.move_to_desktop(id, desktop)
            },
            Self::ChangeTo { id, desktop } => {
                let (id, desktop) = (known(wm, id)?, desktop_or_current(wm, Some(desktop))?);
                wm.change_to_desktop(id, desktop)
            },
            Self::AttachTo { id, desktop } => {
                let (id, desktop) = (known(wm, id)?, desktop_or_current(wm, Some(desktop))?);
                wm.attach_to_desktop(id, desktop)
            },
            Self::AttachToAll { id } => wm.attach_to_desktop(known(wm, id)?, EVERY_DESKTOP),
            Self::AttachToAllOthers { id } => wm.attach_to_all_others(known(wm, id)?),
        };

        Ok(changed)
    }
}

impl Step {
    /// Name of the step as written in scripts
    pub(crate) fn name(&self) -> &'static str {
        self.into()
    }

    /// Feed the step to the window manager. Returns whether anything changed
    fn apply<B: Frame + Properties + Taskbar>(
        &self,
        wm: &mut Manager<B>,
        snapshots: &mut Vec<Snapshot>,
    ) -> Result<bool, Error> {
        let changed = match self {
            Self::Manage(new) => wm.manage(new.clone()),
            Self::Unmanage { id } => wm.unmanage(known(wm, *id)?),
            Self::Move { id, to, layer, area } => {
                if let Some(to) = to {
                    known(wm, *to)?;
                }
                wm.move_client(known(wm, *id)?, *to, *layer, *area)
            },
            Self::Swap { a, b } => {
                let (a, b) = (known(wm, *a)?, known(wm, *b)?);
                wm.swap_clients(a, b)
            },
            Self::State { id, flag, action } => wm.set_state(known(wm, *id)?, *flag, *action),
            Self::Desktop(step) => step.apply(wm)?,
            Self::LayoutMode { desktop, mode } => {
                let desktop = desktop_or_current(wm, *desktop)?;
                wm.set_layout_mode(desktop, *mode)
            },
            Self::MainArea { desktop, count } => {
                let desktop = desktop_or_current(wm, *desktop)?;
                wm.set_main_area_n(desktop, *count)
            },
            Self::Ratio { desktop, main } => {
                let desktop = desktop_or_current(wm, *desktop)?;
                wm.set_main_ratio(desktop, *main)
            },
            Self::Focus { id } => {
                let target = id.map(|id| known(wm, id)).transpose()?;
                wm.focus(target)
            },
            Self::Next { from } => {
                let from = from.map(|id| known(wm, id)).transpose()?.or(wm.focused);
                let target = wm.next(from);
                target.is_some() && wm.focus(target)
            },
            Self::Prev { from } => {
                let from = from.map(|id| known(wm, id)).transpose()?.or(wm.focused);
                let target = wm.prev(from);
                target.is_some() && wm.focus(target)
            },
            Self::Pointer(event) => wm.handle_pointer(*event),
            Self::Layout => wm.run_pending_layout(),
            Self::Query => {
                snapshots.push(wm.snapshot());
                true
            },
        };

        Ok(changed)
    }
}

impl Script {
    /// Parse a YAML (or JSON) script
    pub(crate) fn from_yaml(text: String) -> Result<Self> {
        let script: Self = serde_yaml::from_str(&text).map_err(|e| SerdeError::new(text, e))?;
        log::debug!("parsed a script of {} steps", script.steps.len());

        Ok(script)
    }

    /// Feed every step to the window manager, returning the snapshots the
    /// `query` steps took. Stops at the first step naming something that does
    /// not exist
    pub(crate) fn run<B: Frame + Properties + Taskbar>(
        &self,
        wm: &mut Manager<B>,
    ) -> Result<Vec<Snapshot>> {
        let mut snapshots = vec![];

        for (idx, step) in self.steps.iter().enumerate() {
            let changed = step
                .apply(wm, &mut snapshots)
                .with_context(|| format!("step {} ({}) failed", idx + 1, step.name()))?;

            if changed {
                log::trace!("step {} ({}) applied", idx + 1, step.name());
            } else {
                log::info!("step {} ({}) was {}", idx + 1, step.name(), "declined".yellow());
            }
        }

        wm.run_pending_layout();
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::{DesktopStep, Script, Step};
    use crate::{
        core::{change::Action, Area, Layer, LayoutMode, StateFlag},
        manager::tests::manager,
        pointer::PointerEvent,
    };
    use pretty_assertions::assert_eq;

    const SCENARIO: &str = r#"
steps:
  - op: manage
    id: 1
    name: editor
    rect: { point: { x: 0, y: 0 }, dimension: { width: 300, height: 200 } }
  - op: manage
    id: 2
    rect: { point: { x: 0, y: 0 }, dimension: { width: 300, height: 200 } }
  - op: manage
    id: 3
    rect: { point: { x: 0, y: 0 }, dimension: { width: 300, height: 200 } }
  - op: query
  - op: move
    id: 3
    layer: tile
    area: main
  - op: layout
  - op: query
  - op: desktop
    action: move_to
    id: 2
    desktop: 1
  - op: state
    id: 1
    flag: fullscreen
    action: add
  - op: query
"#;

    #[test]
    fn parses_every_kind_of_step() {
        let script = Script::from_yaml(String::from(
            r#"
steps:
  - { op: desktop, action: attach_to_all_others, id: 4 }
  - { op: pointer, event: motion, x: 3, y: 4 }
  - { op: state, id: 4, flag: skip_taskbar, action: toggle }
  - { op: next }
  - { op: ratio, main: 0.6 }
  - { op: move, id: 4, layer: stack }
  - { op: state, id: 4, flag: _NET_WM_STATE_MAXIMIZED_HORZ, action: remove }
"#,
        ))
        .expect("script parses");

        assert_eq!(script.steps, vec![
            Step::Desktop(DesktopStep::AttachToAllOthers { id: 4 }),
            Step::Pointer(PointerEvent::Motion { x: 3, y: 4 }),
            Step::State {
                id:     4,
                flag:   StateFlag::SkipTaskbar,
                action: Action::Toggle,
            },
            Step::Next { from: None },
            Step::Ratio {
                desktop: None,
                main:    0.6,
            },
            Step::Move {
                id:    4,
                to:    None,
                layer: Layer::Stack,
                area:  Area::Any,
            },
            Step::State {
                id:     4,
                flag:   StateFlag::Hmax,
                action: Action::Remove,
            },
        ]);
        assert_eq!(script.steps[1].name(), "pointer");
        assert_eq!(script.steps[2].name(), "state");
    }

    #[test]
    fn rejects_malformed_scripts() {
        assert!(Script::from_yaml(String::from("steps:\n  - op: dance\n")).is_err());
        assert!(Script::from_yaml(String::from("steps:\n  - op: swap\n    a: 1\n")).is_err());
        assert!(Script::from_yaml(String::from(
            "steps:\n  - { op: state, id: 1, flag: wobbly, action: add }\n"
        ))
        .is_err());
    }

    #[test]
    fn runs_the_rebalance_scenario() {
        let mut wm = manager(LayoutMode::Tile);
        let script = Script::from_yaml(String::from(SCENARIO)).expect("script parses");
        let snapshots = script.run(&mut wm).expect("script runs");
        assert_eq!(snapshots.len(), 3);

        let areas = |idx: usize| {
            snapshots[idx]
                .clients
                .iter()
                .map(|c| (c.id, c.area))
                .collect::<Vec<_>>()
        };
        assert_eq!(areas(0), vec![(1, Area::Main), (3, Area::Second), (2, Area::Second)]);
        assert_eq!(areas(1), vec![(3, Area::Main), (1, Area::Second), (2, Area::Second)]);

        let last = &snapshots[2];
        assert_eq!(last.clients[0].id, 1);
        assert!(last.clients[0].state.contains(&StateFlag::Fullscreen));
        assert_eq!(last.clients.iter().find(|c| c.id == 2).map(|c| c.desktop_mask), Some(1 << 1));
        assert_eq!(snapshots[0].clients[0].name, "editor");
    }

    #[test]
    fn unknown_names_are_errors() {
        let mut wm = manager(LayoutMode::Stack);

        let script = Script::from_yaml(String::from("steps:\n  - { op: unmanage, id: 5 }\n"))
            .expect("script parses");
        let err = script.run(&mut wm).expect_err("client 5 is unknown");
        assert_eq!(err.to_string(), "step 1 (unmanage) failed");
        assert_eq!(err.root_cause().to_string(), "unknown client 0x5");

        let script = Script::from_yaml(String::from(
            "steps:\n  - { op: layout_mode, desktop: 9, mode: stack }\n",
        ))
        .expect("script parses");
        let err = script.run(&mut wm).expect_err("desktop 9 does not exist");
        assert_eq!(
            err.root_cause().to_string(),
            "desktop 9 is out of range (there are 4 desktops)"
        );
    }

    #[test]
    fn declined_steps_do_not_stop_the_script() {
        let mut wm = manager(LayoutMode::Stack);
        let script = Script::from_yaml(String::from(
            r#"
steps:
  - op: manage
    id: 1
    rect: { point: { x: 0, y: 0 }, dimension: { width: 300, height: 200 } }
  - { op: swap, a: 1, b: 1 }
  - { op: prev }
  - { op: focus }
  - { op: next, from: 1 }
  - { op: query }
"#,
        ))
        .expect("script parses");

        let snapshots = script.run(&mut wm).expect("script runs");
        assert_eq!(snapshots[0].focused, Some(1));
    }
}
