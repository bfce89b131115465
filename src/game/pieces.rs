use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, NodeId, normalize_edge};
use crate::types::{PieceKind, RouteKind};

use super::state::GameError;

/// A piece on the board. Route pieces sit on edges, buildings on nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Piece {
    Road { player: usize, edge: EdgeId },
    Ship { player: usize, edge: EdgeId },
    Settlement { player: usize, node: NodeId },
    City { player: usize, node: NodeId },
}

impl Piece {
    pub fn player(&self) -> usize {
        match *self {
            Piece::Road { player, .. }
            | Piece::Ship { player, .. }
            | Piece::Settlement { player, .. }
            | Piece::City { player, .. } => player,
        }
    }

    pub fn kind(&self) -> PieceKind {
        match self {
            Piece::Road { .. } => PieceKind::Road,
            Piece::Ship { .. } => PieceKind::Ship,
            Piece::Settlement { .. } => PieceKind::Settlement,
            Piece::City { .. } => PieceKind::City,
        }
    }

    pub fn location(&self) -> Location {
        match *self {
            Piece::Road { edge, .. } | Piece::Ship { edge, .. } => Location::Edge(edge),
            Piece::Settlement { node, .. } | Piece::City { node, .. } => Location::Node(node),
        }
    }

    pub fn edge(&self) -> Option<EdgeId> {
        match *self {
            Piece::Road { edge, .. } | Piece::Ship { edge, .. } => Some(edge),
            Piece::Settlement { .. } | Piece::City { .. } => None,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        match *self {
            Piece::Settlement { node, .. } | Piece::City { node, .. } => Some(node),
            Piece::Road { .. } | Piece::Ship { .. } => None,
        }
    }

    pub fn route(player: usize, kind: RouteKind, edge: EdgeId) -> Self {
        match kind {
            RouteKind::Road => Piece::Road { player, edge },
            RouteKind::Ship => Piece::Ship { player, edge },
        }
    }

    /// Same piece with its edge endpoints ordered.
    pub fn normalized(self) -> Self {
        match self {
            Piece::Road { player, edge } => Piece::Road {
                player,
                edge: normalize_edge(edge),
            },
            Piece::Ship { player, edge } => Piece::Ship {
                player,
                edge: normalize_edge(edge),
            },
            other => other,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of player {} at {}", self.kind(), self.player(), self.location())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Node(NodeId),
    Edge(EdgeId),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Node(node) => write!(f, "node {node}"),
            Location::Edge((a, b)) => write!(f, "edge {a}-{b}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCounts {
    pub roads: u8,
    pub ships: u8,
    pub settlements: u8,
    pub cities: u8,
}

impl Default for PieceCounts {
    fn default() -> Self {
        Self {
            roads: 15,
            ships: 15,
            settlements: 5,
            cities: 4,
        }
    }
}

impl PieceCounts {
    pub fn get(&self, kind: PieceKind) -> u8 {
        match kind {
            PieceKind::Road => self.roads,
            PieceKind::Ship => self.ships,
            PieceKind::Settlement => self.settlements,
            PieceKind::City => self.cities,
        }
    }

    fn get_mut(&mut self, kind: PieceKind) -> &mut u8 {
        match kind {
            PieceKind::Road => &mut self.roads,
            PieceKind::Ship => &mut self.ships,
            PieceKind::Settlement => &mut self.settlements,
            PieceKind::City => &mut self.cities,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedRoute {
    pub kind: RouteKind,
    pub closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingKind {
    Settlement,
    City,
}

/// Pieces one player has on the board plus what is left in their supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceLedger {
    player: usize,
    remaining: PieceCounts,
    routes: HashMap<EdgeId, PlacedRoute>,
    buildings: HashMap<NodeId, BuildingKind>,
}

impl PieceLedger {
    pub fn new(player: usize, limits: PieceCounts) -> Self {
        Self {
            player,
            remaining: limits,
            routes: HashMap::new(),
            buildings: HashMap::new(),
        }
    }

    pub fn remaining(&self, kind: PieceKind) -> u8 {
        self.remaining.get(kind)
    }

    pub fn remaining_counts(&self) -> PieceCounts {
        self.remaining
    }

    /// Records `piece` and takes it from the supply. A city replaces the settlement at its
    /// node and hands that settlement back to the supply.
    pub fn place(&mut self, piece: Piece) -> Result<(), GameError> {
        let piece = piece.normalized();
        let kind = piece.kind();
        if self.remaining(kind) == 0 {
            return Err(GameError::OutOfPieces {
                player: self.player,
                kind,
            });
        }
        match piece {
            Piece::Road { edge, .. } | Piece::Ship { edge, .. } => {
                if self.routes.contains_key(&edge) {
                    return Err(GameError::IllegalLocation {
                        kind,
                        location: piece.location(),
                    });
                }
                let route_kind = kind.route_kind().unwrap_or(RouteKind::Road);
                self.routes.insert(
                    edge,
                    PlacedRoute {
                        kind: route_kind,
                        closed: false,
                    },
                );
            }
            Piece::Settlement { node, .. } => {
                if self.buildings.contains_key(&node) {
                    return Err(GameError::IllegalLocation {
                        kind,
                        location: piece.location(),
                    });
                }
                self.buildings.insert(node, BuildingKind::Settlement);
            }
            Piece::City { node, .. } => {
                if self.buildings.get(&node) != Some(&BuildingKind::Settlement) {
                    return Err(GameError::IllegalLocation {
                        kind,
                        location: piece.location(),
                    });
                }
                self.buildings.insert(node, BuildingKind::City);
                *self.remaining.get_mut(PieceKind::Settlement) += 1;
            }
        }
        *self.remaining.get_mut(kind) -= 1;
        Ok(())
    }

    /// Exact inverse of [`PieceLedger::place`].
    pub fn remove(&mut self, piece: Piece) -> Result<(), GameError> {
        let piece = piece.normalized();
        if !self.contains(piece) {
            return Err(GameError::NotFound {
                kind: piece.kind(),
                location: piece.location(),
            });
        }
        match piece {
            Piece::Road { edge, .. } | Piece::Ship { edge, .. } => {
                self.routes.remove(&edge);
            }
            Piece::Settlement { node, .. } => {
                self.buildings.remove(&node);
            }
            Piece::City { node, .. } => {
                self.buildings.insert(node, BuildingKind::Settlement);
                let settlements = self.remaining.get_mut(PieceKind::Settlement);
                *settlements = settlements.saturating_sub(1);
            }
        }
        *self.remaining.get_mut(piece.kind()) += 1;
        Ok(())
    }

    pub fn contains(&self, piece: Piece) -> bool {
        match piece.normalized() {
            Piece::Road { edge, .. } => self.route_at(edge) == Some(RouteKind::Road),
            Piece::Ship { edge, .. } => self.route_at(edge) == Some(RouteKind::Ship),
            Piece::Settlement { node, .. } => self.building_at(node) == Some(BuildingKind::Settlement),
            Piece::City { node, .. } => self.building_at(node) == Some(BuildingKind::City),
        }
    }

    pub fn route_at(&self, edge: EdgeId) -> Option<RouteKind> {
        self.routes.get(&normalize_edge(edge)).map(|route| route.kind)
    }

    pub fn building_at(&self, node: NodeId) -> Option<BuildingKind> {
        self.buildings.get(&node).copied()
    }

    /// Finds the road or ship at `edge`, if this player has one there.
    pub fn find(&self, edge: EdgeId) -> Option<Piece> {
        self.route_at(edge)
            .map(|kind| Piece::route(self.player, kind, normalize_edge(edge)))
    }

    pub fn is_closed(&self, edge: EdgeId) -> bool {
        self.routes
            .get(&normalize_edge(edge))
            .is_some_and(|route| route.closed)
    }

    pub fn set_closed(&mut self, edge: EdgeId, closed: bool) -> Result<(), GameError> {
        match self.routes.get_mut(&normalize_edge(edge)) {
            Some(route) if route.kind == RouteKind::Ship => {
                route.closed = closed;
                Ok(())
            }
            _ => Err(GameError::NotFound {
                kind: PieceKind::Ship,
                location: Location::Edge(edge),
            }),
        }
    }

    /// Pieces on the board: routes plus settlements and cities.
    pub fn placed_count(&self) -> usize {
        self.routes.len() + self.buildings.len()
    }

    pub fn count(&self, kind: PieceKind) -> usize {
        match kind {
            PieceKind::Road | PieceKind::Ship => self
                .routes
                .values()
                .filter(|route| Some(route.kind) == kind.route_kind())
                .count(),
            PieceKind::Settlement => self
                .buildings
                .values()
                .filter(|b| **b == BuildingKind::Settlement)
                .count(),
            PieceKind::City => self
                .buildings
                .values()
                .filter(|b| **b == BuildingKind::City)
                .count(),
        }
    }

    pub fn routes(&self) -> impl Iterator<Item = (EdgeId, PlacedRoute)> + '_ {
        self.routes.iter().map(|(edge, route)| (*edge, *route))
    }

    pub fn buildings(&self) -> impl Iterator<Item = (NodeId, BuildingKind)> + '_ {
        self.buildings.iter().map(|(node, kind)| (*node, *kind))
    }
}
