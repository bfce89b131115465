use std::collections::BTreeSet;

use smallvec::SmallVec;

use super::{CatanMap, EdgeId, HexId, NodeId, edge_contains_node, normalize_edge};
use crate::types::HexKind;

/// Static graph queries over a board. Everything that tracks placements works
/// through this trait and treats the ids as opaque keys.
pub trait BoardTopology {
    fn is_sea_board(&self) -> bool;

    fn nodes_of_node(&self, node: NodeId) -> &[NodeId];

    fn edges_of_node(&self, node: NodeId) -> &[EdgeId];

    fn hexes_of_node(&self, node: NodeId) -> &[HexId];

    fn is_node_on_land(&self, node: NodeId) -> bool;

    fn hex_kind_and_number(&self, hex: HexId) -> Option<(HexKind, Option<u8>)>;

    fn land_nodes(&self) -> &BTreeSet<NodeId>;

    fn land_edges(&self) -> &BTreeSet<EdgeId>;

    fn sea_edges(&self) -> &BTreeSet<EdgeId>;

    fn nodes_of_edge(&self, edge: EdgeId) -> [NodeId; 2] {
        [edge.0, edge.1]
    }

    /// Edges sharing an endpoint with `edge`, excluding `edge` itself.
    fn edges_of_edge(&self, edge: EdgeId) -> SmallVec<[EdgeId; 4]> {
        let edge = normalize_edge(edge);
        self.nodes_of_edge(edge)
            .into_iter()
            .flat_map(|node| self.edges_of_node(node).iter().copied())
            .filter(|other| *other != edge)
            .collect()
    }

    fn is_land_edge(&self, edge: EdgeId) -> bool {
        self.land_edges().contains(&normalize_edge(edge))
    }

    fn is_sea_edge(&self, edge: EdgeId) -> bool {
        self.sea_edges().contains(&normalize_edge(edge))
    }

    fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        let edge = normalize_edge((a, b));
        self.edges_of_node(a).contains(&edge).then_some(edge)
    }

    fn node_between_edges(&self, first: EdgeId, second: EdgeId) -> Option<NodeId> {
        let second = normalize_edge(second);
        self.nodes_of_edge(first)
            .into_iter()
            .find(|node| edge_contains_node(second, *node))
    }

    /// The endpoint of `edge` that is not `node`.
    fn far_node(&self, edge: EdgeId, node: NodeId) -> NodeId {
        if edge.0 == node { edge.1 } else { edge.0 }
    }
}

impl BoardTopology for CatanMap {
    fn is_sea_board(&self) -> bool {
        self.map_type.is_sea_board()
    }

    fn nodes_of_node(&self, node: NodeId) -> &[NodeId] {
        self.neighbors_slice(node)
    }

    fn edges_of_node(&self, node: NodeId) -> &[EdgeId] {
        self.edges_slice(node)
    }

    fn hexes_of_node(&self, node: NodeId) -> &[HexId] {
        self.hexes_slice(node)
    }

    fn is_node_on_land(&self, node: NodeId) -> bool {
        self.land_node_set().contains(&node)
    }

    fn hex_kind_and_number(&self, hex: HexId) -> Option<(HexKind, Option<u8>)> {
        self.hexes
            .get(hex as usize)
            .map(|tile| (tile.kind, tile.number))
    }

    fn land_nodes(&self) -> &BTreeSet<NodeId> {
        self.land_node_set()
    }

    fn land_edges(&self) -> &BTreeSet<EdgeId> {
        self.land_edge_set()
    }

    fn sea_edges(&self) -> &BTreeSet<EdgeId> {
        self.sea_edge_set()
    }
}
