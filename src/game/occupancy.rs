use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, NodeId, normalize_edge};
use crate::types::RouteKind;

use super::pieces::Piece;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Structure {
    Settlement { player: usize },
    City { player: usize },
}

impl Structure {
    pub fn player(self) -> usize {
        match self {
            Structure::Settlement { player } | Structure::City { player } => player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSlot {
    pub player: usize,
    pub kind: RouteKind,
}

/// Board-level view of every player's pieces, keyed by location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupancy {
    buildings: HashMap<NodeId, Structure>,
    routes: HashMap<EdgeId, RouteSlot>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settlement_at_node(&self, node: NodeId) -> Option<Structure> {
        self.buildings.get(&node).copied()
    }

    pub fn route_at_edge(&self, edge: EdgeId) -> Option<RouteSlot> {
        self.routes.get(&normalize_edge(edge)).copied()
    }

    pub fn owns_building(&self, node: NodeId, player: usize) -> bool {
        self.settlement_at_node(node)
            .is_some_and(|structure| structure.player() == player)
    }

    pub fn has_foreign_building(&self, node: NodeId, player: usize) -> bool {
        self.settlement_at_node(node)
            .is_some_and(|structure| structure.player() != player)
    }

    pub fn owns_route(&self, edge: EdgeId, player: usize, kind: RouteKind) -> bool {
        self.route_at_edge(edge) == Some(RouteSlot { player, kind })
    }

    pub fn place(&mut self, piece: Piece) {
        match piece.normalized() {
            Piece::Road { player, edge } => {
                self.routes.insert(
                    edge,
                    RouteSlot {
                        player,
                        kind: RouteKind::Road,
                    },
                );
            }
            Piece::Ship { player, edge } => {
                self.routes.insert(
                    edge,
                    RouteSlot {
                        player,
                        kind: RouteKind::Ship,
                    },
                );
            }
            Piece::Settlement { player, node } => {
                self.buildings.insert(node, Structure::Settlement { player });
            }
            Piece::City { player, node } => {
                self.buildings.insert(node, Structure::City { player });
            }
        }
    }

    /// Reverses [`Occupancy::place`]; removing a city leaves its settlement behind.
    pub fn remove(&mut self, piece: Piece) {
        match piece.normalized() {
            Piece::Road { edge, .. } | Piece::Ship { edge, .. } => {
                self.routes.remove(&edge);
            }
            Piece::Settlement { node, .. } => {
                self.buildings.remove(&node);
            }
            Piece::City { player, node } => {
                self.buildings.insert(node, Structure::Settlement { player });
            }
        }
    }

    pub fn buildings(&self) -> impl Iterator<Item = (NodeId, Structure)> + '_ {
        self.buildings.iter().map(|(node, structure)| (*node, *structure))
    }

    pub fn routes(&self) -> impl Iterator<Item = (EdgeId, RouteSlot)> + '_ {
        self.routes.iter().map(|(edge, slot)| (*edge, *slot))
    }
}
