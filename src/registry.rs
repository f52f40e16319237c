//! The ordered set of every managed client.
//!
//! Clients live in a sentinel-headed circular list. The front of the list is
//! the top of the stacking order. Subgroups occupy contiguous runs with the
//! leader last, and layers follow each other in [`Layer`] order.

use crate::{
    client::Client,
    core::{Area, Layer, Xid, SENTINEL},
    utils::BuildIdHasher,
};
use std::{cmp::Ordering, collections::HashMap};

/// Neighbours of a linked client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Links {
    prev: Xid,
    next: Xid,
}

/// Ordered container of clients
#[derive(Debug, Clone)]
pub(crate) struct Registry {
    /// Order of linked clients, including the sentinel
    links:   HashMap<Xid, Links, BuildIdHasher>,
    /// Every client, linked or not
    clients: HashMap<Xid, Client, BuildIdHasher>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty [`Registry`]
    pub(crate) fn new() -> Self {
        let mut links = HashMap::default();
        links.insert(SENTINEL, Links {
            prev: SENTINEL,
            next: SENTINEL,
        });

        Self {
            links,
            clients: HashMap::default(),
        }
    }

    /// Number of linked clients
    pub(crate) fn len(&self) -> usize {
        self.links.len() - 1
    }

    /// Are there no linked clients?
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take ownership of a client without linking it
    pub(crate) fn adopt(&mut self, client: Client) -> bool {
        if client.id == SENTINEL || self.clients.contains_key(&client.id) {
            return false;
        }

        self.clients.insert(client.id, client);
        true
    }

    /// Unlink and drop a client, handing it back
    pub(crate) fn release(&mut self, id: Xid) -> Option<Client> {
        self.remove(id);
        self.clients.remove(&id)
    }

    /// Get a client by id
    pub(crate) fn get(&self, id: Xid) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Get a mutable client by id
    pub(crate) fn get_mut(&mut self, id: Xid) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    /// Is the client linked into the order?
    pub(crate) fn contains(&self, id: Xid) -> bool {
        id != SENTINEL && self.links.contains_key(&id)
    }

    /// Link an adopted client right after `anchor`
    pub(crate) fn insert_after(&mut self, anchor: Xid, id: Xid) -> bool {
        if id == SENTINEL
            || !self.clients.contains_key(&id)
            || self.links.contains_key(&id)
            || !self.links.contains_key(&anchor)
        {
            return false;
        }

        let next = self.links[&anchor].next;
        self.links.insert(id, Links { prev: anchor, next });
        self.link_mut(anchor).next = id;
        self.link_mut(next).prev = id;

        true
    }

    /// Unlink a client from the order. It stays owned by the registry
    pub(crate) fn remove(&mut self, id: Xid) -> bool {
        if id == SENTINEL {
            return false;
        }

        match self.links.remove(&id) {
            Some(Links { prev, next }) => {
                self.link_mut(prev).next = next;
                self.link_mut(next).prev = prev;
                true
            },
            None => false,
        }
    }

    /// Neighbour entry of a linked id. Every `prev`/`next` of a linked entry
    /// is linked as well
    fn link_mut(&mut self, id: Xid) -> &mut Links {
        self.links
            .entry(id)
            .or_insert(Links {
                prev: SENTINEL,
                next: SENTINEL,
            })
    }

    /// Follower of `id`, which may be the sentinel
    pub(crate) fn next_of(&self, id: Xid) -> Xid {
        self.links.get(&id).map_or(SENTINEL, |l| l.next)
    }

    /// Predecessor of `id`, which may be the sentinel
    pub(crate) fn prev_of(&self, id: Xid) -> Xid {
        self.links.get(&id).map_or(SENTINEL, |l| l.prev)
    }

    /// Walk the clients from top to bottom
    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            registry: self,
            cursor:   self.next_of(SENTINEL),
        }
    }

    /// Walk the clients matching a predicate
    pub(crate) fn iter_where<'a, P>(
        &'a self,
        predicate: P,
    ) -> impl Iterator<Item = &'a Client> + Clone
    where
        P: Fn(&Client) -> bool + Clone + 'a,
    {
        self.iter().filter(move |c| predicate(c))
    }

    /// Ids of the clients matching a predicate, top to bottom
    pub(crate) fn ids_where<P>(&self, predicate: P) -> Vec<Xid>
    where
        P: Fn(&Client) -> bool,
    {
        self.iter().filter(|c| predicate(c)).map(|c| c.id).collect()
    }

    /// Relative order of two linked clients, found by walking from `a`
    /// towards the sentinel
    pub(crate) fn store_order(&self, a: Xid, b: Xid) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }

        let mut cursor = self.next_of(a);
        while cursor != SENTINEL {
            if cursor == b {
                return Ordering::Less;
            }
            cursor = self.next_of(cursor);
        }

        Ordering::Greater
    }

    /// Anchor after which a client of the given placement is inserted.
    ///
    /// The first match decides: a member of the `leader`'s subgroup, a client
    /// with the same layer and area, a client of the same layer with a later
    /// area, a client of a later layer. Without a match the anchor is the
    /// last client.
    pub(crate) fn head_for(&self, leader: Option<Xid>, layer: Layer, area: Area) -> Xid {
        let found = leader
            .and_then(|leader| self.iter().find(|c| c.leader == leader))
            .or_else(|| self.iter().find(|c| c.layer == layer && c.area == area))
            .or_else(|| self.iter().find(|c| c.layer == layer && c.area > area))
            .or_else(|| self.iter().find(|c| c.layer > layer))
            .map_or(SENTINEL, |c| c.id);

        self.prev_of(found)
    }

    /// Linked members of a subgroup, top to bottom
    pub(crate) fn run_of(&self, leader: Xid) -> Vec<Xid> {
        self.ids_where(|c| c.leader == leader)
    }

    /// Unlink a whole subgroup, returning its members in order
    pub(crate) fn detach_run(&mut self, leader: Xid) -> Vec<Xid> {
        let run = self.run_of(leader);
        for id in &run {
            self.remove(*id);
        }

        run
    }

    /// Link a detached run after `anchor`, keeping its order
    pub(crate) fn insert_run_after(&mut self, anchor: Xid, run: &[Xid]) {
        let mut anchor = anchor;
        for id in run {
            if self.insert_after(anchor, *id) {
                anchor = *id;
            }
        }
    }
}

/// Lazy walk over the [`Registry`] from top to bottom
#[derive(Debug, Clone)]
pub(crate) struct Iter<'a> {
    registry: &'a Registry,
    cursor:   Xid,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Client;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == SENTINEL {
            return None;
        }

        let client = self.registry.get(self.cursor)?;
        self.cursor = self.registry.next_of(self.cursor);
        Some(client)
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::{
        client::Client,
        core::{Area, Layer, Xid, SENTINEL},
        geometry::Rectangle,
    };
    use pretty_assertions::assert_eq;
    use std::cmp::Ordering;

    fn client(id: Xid, leader: Xid, layer: Layer, area: Area) -> Client {
        let mut c = Client::new(id, Rectangle::new(0, 0, 100, 100));
        c.leader = leader;
        c.owner = (leader != id).then(|| leader);
        c.layer = layer;
        c.area = area;
        c
    }

    fn push(registry: &mut Registry, c: Client) {
        let anchor = registry.head_for(Some(c.leader), c.layer, c.area);
        let id = c.id;
        assert!(registry.adopt(c));
        assert!(registry.insert_after(anchor, id));
    }

    fn order(registry: &Registry) -> Vec<Xid> {
        registry.iter().map(|c| c.id).collect()
    }

    #[test]
    fn insert_and_remove() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.next_of(SENTINEL), SENTINEL);

        for id in 1..=3 {
            registry.adopt(client(id, id, Layer::Stack, Area::Any));
        }
        assert!(registry.insert_after(SENTINEL, 1));
        assert!(registry.insert_after(1, 3));
        assert!(registry.insert_after(1, 2));
        assert!(!registry.insert_after(1, 2));
        assert!(!registry.insert_after(9, 9));

        assert_eq!(order(&registry), vec![1, 2, 3]);
        assert_eq!(registry.prev_of(SENTINEL), 3);

        assert!(registry.remove(2));
        assert!(!registry.remove(2));
        assert!(!registry.contains(2));
        assert!(registry.get(2).is_some());
        assert_eq!(order(&registry), vec![1, 3]);
        assert_eq!(registry.len(), 2);

        assert!(registry.release(1).is_some());
        assert_eq!(order(&registry), vec![3]);
        assert!(!registry.remove(SENTINEL));
    }

    #[test]
    fn store_order() {
        let mut registry = Registry::new();
        for id in 1..=4 {
            push(&mut registry, client(id, id, Layer::Stack, Area::Any));
        }

        assert_eq!(order(&registry), vec![4, 3, 2, 1]);
        assert_eq!(registry.store_order(4, 1), Ordering::Less);
        assert_eq!(registry.store_order(1, 4), Ordering::Greater);
        assert_eq!(registry.store_order(2, 2), Ordering::Equal);
    }

    #[test]
    fn head_for_groups_layers_and_areas() {
        let mut registry = Registry::new();
        push(&mut registry, client(1, 1, Layer::Stack, Area::Any));
        push(&mut registry, client(2, 2, Layer::Tile, Area::Second));
        push(&mut registry, client(3, 3, Layer::Tile, Area::Main));
        push(&mut registry, client(4, 4, Layer::Above, Area::Any));
        push(&mut registry, client(5, 5, Layer::Desktop, Area::Any));
        push(&mut registry, client(6, 6, Layer::Tile, Area::Fixed));

        assert_eq!(order(&registry), vec![4, 3, 2, 6, 1, 5]);

        let layers = registry.iter().map(|c| c.layer).collect::<Vec<_>>();
        let mut sorted = layers.clone();
        sorted.sort();
        assert_eq!(layers, sorted);
    }

    #[test]
    fn transients_join_their_run() {
        let mut registry = Registry::new();
        push(&mut registry, client(1, 1, Layer::Stack, Area::Any));
        push(&mut registry, client(2, 2, Layer::Stack, Area::Any));
        push(&mut registry, client(10, 1, Layer::Stack, Area::Any));
        push(&mut registry, client(11, 1, Layer::Stack, Area::Any));

        assert_eq!(order(&registry), vec![2, 11, 10, 1]);
        assert_eq!(registry.run_of(1), vec![11, 10, 1]);
    }

    #[test]
    fn detach_and_reinsert_run() {
        let mut registry = Registry::new();
        push(&mut registry, client(1, 1, Layer::Stack, Area::Any));
        push(&mut registry, client(10, 1, Layer::Stack, Area::Any));
        push(&mut registry, client(2, 2, Layer::Stack, Area::Any));

        assert_eq!(order(&registry), vec![2, 10, 1]);

        let run = registry.detach_run(1);
        assert_eq!(run, vec![10, 1]);
        assert_eq!(order(&registry), vec![2]);

        registry.insert_run_after(SENTINEL, &run);
        assert_eq!(order(&registry), vec![10, 1, 2]);
    }

    #[test]
    fn iteration_is_restartable() {
        let mut registry = Registry::new();
        for id in 1..=3 {
            push(&mut registry, client(id, id, Layer::Stack, Area::Any));
        }

        let iter = registry.iter_where(|c| c.id != 2);
        let first = iter.clone().map(|c| c.id).collect::<Vec<_>>();
        let second = iter.map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(first, vec![3, 1]);
        assert_eq!(first, second);
    }
}
