//! Query information about the clients and desktops of the window manager

use crate::{
    client::Client,
    collab::{Frame, Properties, Taskbar},
    core::{Area, Layer, LayoutMode, StateFlag, Xid},
    geometry::Rectangle,
    manager::Manager,
};
use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Serialize;

/// What is known about one client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ClientInfo {
    pub(crate) id:           Xid,
    pub(crate) name:         String,
    pub(crate) layer:        Layer,
    pub(crate) area:         Area,
    pub(crate) leader:       Xid,
    pub(crate) owner:        Option<Xid>,
    pub(crate) desktop_mask: u32,
    pub(crate) state:        Vec<StateFlag>,
    pub(crate) rect:         Rectangle,
}

impl From<&Client> for ClientInfo {
    fn from(c: &Client) -> Self {
        Self {
            id:           c.id,
            name:         c.name.clone(),
            layer:        c.layer,
            area:         c.area,
            leader:       c.leader,
            owner:        c.owner,
            desktop_mask: c.desktop_mask,
            state:        StateFlag::split(c.state),
            rect:         c.rect,
        }
    }
}

/// State of the window manager at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Snapshot {
    /// Visible desktop
    pub(crate) desktop:     usize,
    /// Name of the visible desktop
    pub(crate) name:        String,
    /// Arrangement of the visible desktop
    pub(crate) layout_mode: LayoutMode,
    /// Client holding the focus
    pub(crate) focused:     Option<Xid>,
    /// Every client, top of the stack first
    pub(crate) clients:     Vec<ClientInfo>,
}

impl Snapshot {
    /// Render the snapshot as a single line of JSON
    pub(crate) fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize snapshot")
    }

    /// Render the snapshot as indented JSON
    pub(crate) fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize snapshot")
    }
}

impl<B: Frame + Properties + Taskbar> Manager<B> {
    /// Take a [`Snapshot`]
    pub(crate) fn snapshot(&self) -> Snapshot {
        let state = self.desktops.current_state();

        Snapshot {
            desktop:     self.desktops.current(),
            name:        state.name.clone(),
            layout_mode: state.layout_mode,
            focused:     self.focused,
            clients:     self.registry.iter().map(ClientInfo::from).collect_vec(),
        }
    }
}
