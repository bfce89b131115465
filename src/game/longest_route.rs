use std::collections::BTreeSet;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::board::{BoardTopology, EdgeId, NodeId, normalize_edge};
use crate::types::RouteKind;

use super::occupancy::Occupancy;
use super::route_graph::RouteGraph;

/// Length needed before a route scores the bonus.
pub const MIN_LONGEST_ROUTE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePath {
    pub start: NodeId,
    pub end: NodeId,
    pub length: usize,
    pub edges: BTreeSet<EdgeId>,
}

impl RoutePath {
    fn overlaps(&self, edges: &BTreeSet<EdgeId>) -> bool {
        !self.edges.is_disjoint(edges)
    }
}

/// Result of the last full search: the longest length and a set of non-overlapping
/// maximal paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestRouteRecord {
    pub length: usize,
    pub paths: Vec<RoutePath>,
}

struct Frame {
    node: NodeId,
    length: usize,
    visited: BTreeSet<EdgeId>,
    inbound: Option<RouteKind>,
}

/// Depth-first search over `graph` from every node it touches, in ascending order.
///
/// Visits are tracked per edge, not per node, so a path may come back through a node
/// along a different edge. A path stops at a foreign settlement or city, and on a sea
/// board a road may only continue as a ship (or the reverse) through an own building.
pub fn longest_route(
    topology: &impl BoardTopology,
    graph: &RouteGraph,
    occupancy: &Occupancy,
    player: usize,
) -> LongestRouteRecord {
    let sea_board = topology.is_sea_board();
    let mut record = LongestRouteRecord::default();
    let mut pending: Vec<Frame> = Vec::new();

    for start in graph.nodes() {
        pending.push(Frame {
            node: start,
            length: 0,
            visited: BTreeSet::new(),
            inbound: None,
        });

        while let Some(frame) = pending.pop() {
            let mut path_end = frame.length > 0 && occupancy.has_foreign_building(frame.node, player);

            if !path_end {
                path_end = true;
                let own_building = occupancy.owns_building(frame.node, player);
                for &(next, kind) in graph.neighbors(frame.node) {
                    if sea_board
                        && frame.inbound.is_some_and(|inbound| inbound != kind)
                        && !own_building
                    {
                        continue;
                    }
                    let edge = normalize_edge((frame.node, next));
                    if frame.visited.contains(&edge) {
                        continue;
                    }
                    let mut visited = frame.visited.clone();
                    visited.insert(edge);
                    pending.push(Frame {
                        node: next,
                        length: frame.length + 1,
                        visited,
                        inbound: Some(kind),
                    });
                    path_end = false;
                }
            }

            if path_end {
                record_path(&mut record, start, frame);
            }
        }
    }

    trace!("player {player} longest route {}", record.length);
    record
}

fn record_path(record: &mut LongestRouteRecord, start: NodeId, frame: Frame) {
    record.length = record.length.max(frame.length);

    let mut keep_new = true;
    record.paths.retain(|old| {
        if !old.overlaps(&frame.visited) {
            return true;
        }
        if old.length < frame.length {
            false
        } else {
            keep_new = false;
            true
        }
    });

    if keep_new {
        record.paths.push(RoutePath {
            start,
            end: frame.node,
            length: frame.length,
            edges: frame.visited,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::pieces::Piece;

    /// Minimal topology for hand-built graphs; only sea-board detection matters here.
    struct Flat {
        sea: bool,
        empty_nodes: BTreeSet<NodeId>,
        empty_edges: BTreeSet<EdgeId>,
    }

    impl Flat {
        fn new(sea: bool) -> Self {
            Self {
                sea,
                empty_nodes: BTreeSet::new(),
                empty_edges: BTreeSet::new(),
            }
        }
    }

    impl BoardTopology for Flat {
        fn is_sea_board(&self) -> bool {
            self.sea
        }
        fn nodes_of_node(&self, _: NodeId) -> &[NodeId] {
            &[]
        }
        fn edges_of_node(&self, _: NodeId) -> &[EdgeId] {
            &[]
        }
        fn hexes_of_node(&self, _: NodeId) -> &[u16] {
            &[]
        }
        fn is_node_on_land(&self, _: NodeId) -> bool {
            true
        }
        fn hex_kind_and_number(&self, _: u16) -> Option<(crate::types::HexKind, Option<u8>)> {
            None
        }
        fn land_nodes(&self) -> &BTreeSet<NodeId> {
            &self.empty_nodes
        }
        fn land_edges(&self) -> &BTreeSet<EdgeId> {
            &self.empty_edges
        }
        fn sea_edges(&self) -> &BTreeSet<EdgeId> {
            &self.empty_edges
        }
    }

    fn graph_of(edges: &[(EdgeId, RouteKind)]) -> RouteGraph {
        let mut graph = RouteGraph::new();
        for (edge, kind) in edges {
            graph.add(*edge, *kind);
        }
        graph
    }

    fn roads(edges: &[EdgeId]) -> RouteGraph {
        graph_of(
            &edges
                .iter()
                .map(|edge| (*edge, RouteKind::Road))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn straight_chain_counts_every_edge() {
        let graph = roads(&[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let record = longest_route(&Flat::new(false), &graph, &Occupancy::new(), 0);
        assert_eq!(record.length, 4);
        assert_eq!(record.paths.len(), 1);
        assert_eq!(record.paths[0].length, 4);
    }

    #[test]
    fn path_runs_through_a_fork() {
        // Arms of 3, 2 and 1 edges out of node 0; the best path joins the two longest.
        let graph = roads(&[(0, 1), (1, 2), (2, 3), (0, 4), (4, 5), (0, 6)]);
        let record = longest_route(&Flat::new(false), &graph, &Occupancy::new(), 0);
        assert_eq!(record.length, 5);
    }

    #[test]
    fn cycle_is_walked_once_around() {
        let graph = roads(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (0, 5)]);
        let record = longest_route(&Flat::new(false), &graph, &Occupancy::new(), 0);
        assert_eq!(record.length, 6);
    }

    #[test]
    fn foreign_building_splits_the_route() {
        let graph = roads(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
        let mut occupancy = Occupancy::new();
        occupancy.place(Piece::Settlement { player: 1, node: 2 });
        let record = longest_route(&Flat::new(false), &graph, &occupancy, 0);
        assert_eq!(record.length, 3);

        occupancy.remove(Piece::Settlement { player: 1, node: 2 });
        occupancy.place(Piece::Settlement { player: 0, node: 2 });
        let record = longest_route(&Flat::new(false), &graph, &occupancy, 0);
        assert_eq!(record.length, 5);
    }

    #[test]
    fn road_to_ship_needs_own_building_on_sea_board() {
        let graph = graph_of(&[
            ((0, 1), RouteKind::Road),
            ((1, 2), RouteKind::Road),
            ((2, 3), RouteKind::Ship),
            ((3, 4), RouteKind::Ship),
            ((4, 5), RouteKind::Ship),
        ]);
        let mut occupancy = Occupancy::new();
        let record = longest_route(&Flat::new(true), &graph, &occupancy, 0);
        assert_eq!(record.length, 3);

        let land = longest_route(&Flat::new(false), &graph, &occupancy, 0);
        assert_eq!(land.length, 5);

        occupancy.place(Piece::Settlement { player: 0, node: 2 });
        let record = longest_route(&Flat::new(true), &graph, &occupancy, 0);
        assert_eq!(record.length, 5);
    }

    #[test]
    fn kept_paths_never_overlap() {
        let graph = roads(&[(0, 1), (1, 2), (2, 3), (0, 4), (4, 5), (0, 6), (7, 8)]);
        let record = longest_route(&Flat::new(false), &graph, &Occupancy::new(), 0);
        for (i, a) in record.paths.iter().enumerate() {
            for b in &record.paths[i + 1..] {
                assert!(a.edges.is_disjoint(&b.edges));
            }
        }
        assert_eq!(record.paths.iter().map(|p| p.length).max(), Some(record.length));
        assert!(record.paths.iter().any(|p| p.length == 1 && p.edges.contains(&(7, 8))));
    }

    #[test]
    fn empty_graph_has_no_route() {
        let record = longest_route(&Flat::new(false), &RouteGraph::new(), &Occupancy::new(), 0);
        assert_eq!(record, LongestRouteRecord::default());
    }
}
