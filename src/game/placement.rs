use std::collections::BTreeSet;

use log::trace;
use smallvec::SmallVec;

use crate::board::{BoardTopology, EdgeId, NodeId, normalize_edge};
use crate::types::RouteKind;

use super::occupancy::{Occupancy, Structure};
use super::pieces::Piece;
use super::route_graph::RouteGraph;

/// Where one player may build ever (legal) and right now (potential).
///
/// Updates are done by changing legality first and then re-evaluating the potential
/// predicates over the locality a piece can influence: its own location plus the
/// locations sharing a node with it. Since the predicates only read the current
/// occupancy, removing a piece is the exact inverse of placing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementTracker {
    player: usize,
    sea_board: bool,
    legal_roads: BTreeSet<EdgeId>,
    legal_ships: BTreeSet<EdgeId>,
    legal_settlements: BTreeSet<NodeId>,
    potential_roads: BTreeSet<EdgeId>,
    potential_ships: BTreeSet<EdgeId>,
    potential_settlements: BTreeSet<NodeId>,
    potential_cities: BTreeSet<NodeId>,
    route_graph: RouteGraph,
    initial_settlements_open: bool,
}

impl PlacementTracker {
    pub fn new(player: usize, topology: &impl BoardTopology, initial_settlements_open: bool) -> Self {
        let sea_board = topology.is_sea_board();
        let legal_settlements = topology.land_nodes().clone();
        let legal_ships = if sea_board {
            topology.sea_edges().clone()
        } else {
            BTreeSet::new()
        };
        let potential_settlements = if initial_settlements_open {
            legal_settlements.clone()
        } else {
            BTreeSet::new()
        };
        Self {
            player,
            sea_board,
            legal_roads: topology.land_edges().clone(),
            legal_ships,
            legal_settlements,
            potential_roads: BTreeSet::new(),
            potential_ships: BTreeSet::new(),
            potential_settlements,
            potential_cities: BTreeSet::new(),
            route_graph: RouteGraph::new(),
            initial_settlements_open,
        }
    }

    pub fn player(&self) -> usize {
        self.player
    }

    /// Called after `piece` (anyone's) has been added to `occupancy`.
    pub fn on_place(&mut self, topology: &impl BoardTopology, occupancy: &Occupancy, piece: Piece) {
        let piece = piece.normalized();
        match piece {
            Piece::Road { edge, .. } | Piece::Ship { edge, .. } => {
                self.legal_roads.remove(&edge);
                self.legal_ships.remove(&edge);
                if piece.player() == self.player {
                    if let Some(kind) = piece.kind().route_kind() {
                        self.route_graph.add(edge, kind);
                    }
                }
                self.refresh_around_edge(topology, occupancy, edge);
            }
            Piece::Settlement { node, .. } => {
                self.legal_settlements.remove(&node);
                for neighbor in topology.nodes_of_node(node) {
                    self.legal_settlements.remove(neighbor);
                }
                self.refresh_around_node(topology, occupancy, node);
            }
            Piece::City { node, .. } => {
                self.refresh_city(occupancy, node);
            }
        }
    }

    /// Called after `piece` has been taken back out of `occupancy`.
    pub fn on_remove(&mut self, topology: &impl BoardTopology, occupancy: &Occupancy, piece: Piece) {
        let piece = piece.normalized();
        match piece {
            Piece::Road { edge, .. } | Piece::Ship { edge, .. } => {
                if topology.is_land_edge(edge) {
                    self.legal_roads.insert(edge);
                }
                if self.sea_board && topology.is_sea_edge(edge) {
                    self.legal_ships.insert(edge);
                }
                if piece.player() == self.player {
                    self.route_graph.remove(edge);
                }
                self.refresh_around_edge(topology, occupancy, edge);
            }
            Piece::Settlement { node, .. } => {
                let mut affected: SmallVec<[NodeId; 4]> = SmallVec::new();
                affected.push(node);
                affected.extend(topology.nodes_of_node(node).iter().copied());
                for candidate in affected {
                    if settlement_allowed(topology, occupancy, candidate) {
                        self.legal_settlements.insert(candidate);
                    }
                }
                self.refresh_around_node(topology, occupancy, node);
            }
            Piece::City { node, .. } => {
                self.refresh_city(occupancy, node);
            }
        }
    }

    /// Opens or closes the initial-placement window in which every legal node is potential.
    pub fn set_initial_settlements_open(&mut self, topology: &impl BoardTopology, open: bool) {
        self.initial_settlements_open = open;
        let nodes: Vec<NodeId> = topology.land_nodes().iter().copied().collect();
        for node in nodes {
            self.refresh_settlement(node);
        }
    }

    pub fn initial_settlements_open(&self) -> bool {
        self.initial_settlements_open
    }

    fn refresh_around_edge(&mut self, topology: &impl BoardTopology, occupancy: &Occupancy, edge: EdgeId) {
        self.refresh_edge(topology, occupancy, edge);
        for other in topology.edges_of_edge(edge) {
            self.refresh_edge(topology, occupancy, other);
        }
        for node in topology.nodes_of_edge(edge) {
            self.refresh_settlement(node);
        }
    }

    fn refresh_around_node(&mut self, topology: &impl BoardTopology, occupancy: &Occupancy, node: NodeId) {
        self.refresh_settlement(node);
        for neighbor in topology.nodes_of_node(node) {
            self.refresh_settlement(*neighbor);
        }
        for edge in topology.edges_of_node(node) {
            self.refresh_edge(topology, occupancy, *edge);
        }
        self.refresh_city(occupancy, node);
    }

    fn refresh_edge(&mut self, topology: &impl BoardTopology, occupancy: &Occupancy, edge: EdgeId) {
        let road = self.legal_roads.contains(&edge)
            && self.route_reaches(topology, occupancy, edge, RouteKind::Road);
        set_membership(&mut self.potential_roads, edge, road);

        let ship = self.legal_ships.contains(&edge)
            && self.route_reaches(topology, occupancy, edge, RouteKind::Ship);
        set_membership(&mut self.potential_ships, edge, ship);
    }

    /// An end of `edge` holds our settlement or city, or is free of foreign buildings and
    /// continues one of our routes of the same kind.
    fn route_reaches(
        &self,
        topology: &impl BoardTopology,
        occupancy: &Occupancy,
        edge: EdgeId,
        kind: RouteKind,
    ) -> bool {
        topology.nodes_of_edge(edge).into_iter().any(|node| {
            match occupancy.settlement_at_node(node) {
                Some(structure) => structure.player() == self.player,
                None => topology
                    .edges_of_node(node)
                    .iter()
                    .any(|other| *other != edge && self.route_graph.kind_of(*other) == Some(kind)),
            }
        })
    }

    fn refresh_settlement(&mut self, node: NodeId) {
        let potential = self.legal_settlements.contains(&node)
            && (self.initial_settlements_open || self.route_graph.touches(node));
        set_membership(&mut self.potential_settlements, node, potential);
    }

    fn refresh_city(&mut self, occupancy: &Occupancy, node: NodeId) {
        let potential = occupancy.settlement_at_node(node)
            == Some(Structure::Settlement {
                player: self.player,
            });
        set_membership(&mut self.potential_cities, node, potential);
    }

    pub fn is_legal_road(&self, edge: EdgeId) -> bool {
        self.legal_roads.contains(&normalize_edge(edge))
    }

    pub fn is_legal_ship(&self, edge: EdgeId) -> bool {
        self.legal_ships.contains(&normalize_edge(edge))
    }

    pub fn is_legal_settlement(&self, node: NodeId) -> bool {
        self.legal_settlements.contains(&node)
    }

    pub fn is_potential_road(&self, edge: EdgeId) -> bool {
        self.potential_roads.contains(&normalize_edge(edge))
    }

    pub fn is_potential_ship(&self, edge: EdgeId) -> bool {
        self.potential_ships.contains(&normalize_edge(edge))
    }

    pub fn is_potential_settlement(&self, node: NodeId) -> bool {
        self.potential_settlements.contains(&node)
    }

    pub fn is_potential_city(&self, node: NodeId) -> bool {
        self.potential_cities.contains(&node)
    }

    pub fn legal_roads(&self) -> &BTreeSet<EdgeId> {
        &self.legal_roads
    }

    pub fn legal_ships(&self) -> &BTreeSet<EdgeId> {
        &self.legal_ships
    }

    pub fn legal_settlements(&self) -> &BTreeSet<NodeId> {
        &self.legal_settlements
    }

    pub fn potential_roads(&self) -> &BTreeSet<EdgeId> {
        &self.potential_roads
    }

    pub fn potential_ships(&self) -> &BTreeSet<EdgeId> {
        &self.potential_ships
    }

    pub fn potential_settlements(&self) -> &BTreeSet<NodeId> {
        &self.potential_settlements
    }

    pub fn potential_cities(&self) -> &BTreeSet<NodeId> {
        &self.potential_cities
    }

    pub fn route_graph(&self) -> &RouteGraph {
        &self.route_graph
    }
}

/// A node may hold a settlement when it is on land and neither it nor a neighbor is built on.
fn settlement_allowed(topology: &impl BoardTopology, occupancy: &Occupancy, node: NodeId) -> bool {
    topology.is_node_on_land(node)
        && occupancy.settlement_at_node(node).is_none()
        && topology
            .nodes_of_node(node)
            .iter()
            .all(|neighbor| occupancy.settlement_at_node(*neighbor).is_none())
}

fn set_membership<T: Ord + Copy + std::fmt::Debug>(set: &mut BTreeSet<T>, item: T, member: bool) {
    let changed = if member {
        set.insert(item)
    } else {
        set.remove(&item)
    };
    if changed {
        trace!("potential {item:?} -> {member}");
    }
}
