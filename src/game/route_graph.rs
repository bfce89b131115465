use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::board::{EdgeId, NodeId, normalize_edge};
use crate::types::RouteKind;

type Links = SmallVec<[(NodeId, RouteKind); 3]>;

/// Symmetric adjacency over the nodes joined by one player's roads and ships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGraph {
    adjacency: BTreeMap<NodeId, Links>,
    edge_count: usize,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, edge: EdgeId, kind: RouteKind) {
        let (a, b) = normalize_edge(edge);
        if self.kind_of((a, b)).is_some() {
            return;
        }
        Self::link(self.adjacency.entry(a).or_default(), b, kind);
        Self::link(self.adjacency.entry(b).or_default(), a, kind);
        self.edge_count += 1;
    }

    pub fn remove(&mut self, edge: EdgeId) {
        let (a, b) = normalize_edge(edge);
        if self.kind_of((a, b)).is_none() {
            return;
        }
        self.unlink(a, b);
        self.unlink(b, a);
        self.edge_count -= 1;
    }

    fn link(links: &mut Links, to: NodeId, kind: RouteKind) {
        let at = links.partition_point(|(node, _)| *node < to);
        links.insert(at, (to, kind));
    }

    fn unlink(&mut self, from: NodeId, to: NodeId) {
        if let Some(links) = self.adjacency.get_mut(&from) {
            links.retain(|(node, _)| *node != to);
            if links.is_empty() {
                self.adjacency.remove(&from);
            }
        }
    }

    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, RouteKind)] {
        self.adjacency
            .get(&node)
            .map(|links| links.as_slice())
            .unwrap_or(&[])
    }

    pub fn kind_of(&self, edge: EdgeId) -> Option<RouteKind> {
        let (a, b) = normalize_edge(edge);
        self.neighbors(a)
            .iter()
            .find(|(node, _)| *node == b)
            .map(|(_, kind)| *kind)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn touches_with(&self, node: NodeId, kind: RouteKind) -> bool {
        self.neighbors(node).iter().any(|(_, k)| *k == kind)
    }

    /// Nodes with at least one route, ascending.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}
