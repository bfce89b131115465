use std::collections::{BTreeSet, HashSet};

use log::trace;
use smallvec::SmallVec;

use crate::board::{BoardTopology, EdgeId, NodeId, normalize_edge};
use crate::types::RouteKind;

use super::occupancy::Occupancy;
use super::pieces::PieceLedger;
use super::state::GameError;

/// A walk that ran back into ships it had already visited. Once the first pass has
/// closed what it could, the walk is retried from `ships[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopRecheck {
    /// Node just past the ship that was encountered again.
    pub far_node: NodeId,
    /// Ships from the start of the walk outwards; never empty.
    pub ships: Vec<EdgeId>,
}

/// Ships newly closed after the owner placed a ship at `ship`. The ship must already be
/// in the ledger and the occupancy.
pub fn close_after_ship(
    topology: &impl BoardTopology,
    occupancy: &Occupancy,
    ledger: &PieceLedger,
    player: usize,
    ship: EdgeId,
) -> Result<Vec<EdgeId>, GameError> {
    ensure_sea_board(topology)?;
    let ship = normalize_edge(ship);
    let mut walk = TradeRouteWalk::new(topology, occupancy, ledger, player);
    for node in topology.nodes_of_edge(ship) {
        if !occupancy.owns_building(node, player) {
            continue;
        }
        // One end is anchored; the ship closes if the other end leads to an anchor too.
        if walk.close_from(ship, topology.far_node(ship, node)) {
            break;
        }
    }
    Ok(walk.finish())
}

/// Ships newly closed after the owner placed a settlement at `node`.
pub fn close_after_settlement(
    topology: &impl BoardTopology,
    occupancy: &Occupancy,
    ledger: &PieceLedger,
    player: usize,
    node: NodeId,
) -> Result<Vec<EdgeId>, GameError> {
    ensure_sea_board(topology)?;
    let mut walk = TradeRouteWalk::new(topology, occupancy, ledger, player);
    for &edge in topology.edges_of_node(node) {
        if ledger.route_at(edge) != Some(RouteKind::Ship) || walk.is_closed(edge) {
            continue;
        }
        walk.close_from(edge, topology.far_node(edge, node));
    }
    Ok(walk.finish())
}

/// Whether the owner could pick up the ship at `edge`: it must be open and sit at the
/// loose end of its route, with neither an own building nor another own ship past one
/// of its nodes.
pub fn can_move_ship(
    topology: &impl BoardTopology,
    occupancy: &Occupancy,
    ledger: &PieceLedger,
    player: usize,
    edge: EdgeId,
) -> bool {
    let edge = normalize_edge(edge);
    if ledger.route_at(edge) != Some(RouteKind::Ship) || ledger.is_closed(edge) {
        return false;
    }
    topology.nodes_of_edge(edge).into_iter().any(|node| {
        !occupancy.owns_building(node, player)
            && !topology
                .edges_of_node(node)
                .iter()
                .any(|other| *other != edge && ledger.route_at(*other) == Some(RouteKind::Ship))
    })
}

fn ensure_sea_board(topology: &impl BoardTopology) -> Result<(), GameError> {
    if topology.is_sea_board() {
        Ok(())
    } else {
        Err(GameError::InvalidState(
            "trade route closure needs a sea board".to_string(),
        ))
    }
}

struct TradeRouteWalk<'a, T: BoardTopology> {
    topology: &'a T,
    occupancy: &'a Occupancy,
    ledger: &'a PieceLedger,
    player: usize,
    newly_closed: BTreeSet<EdgeId>,
}

impl<'a, T: BoardTopology> TradeRouteWalk<'a, T> {
    fn new(topology: &'a T, occupancy: &'a Occupancy, ledger: &'a PieceLedger, player: usize) -> Self {
        Self {
            topology,
            occupancy,
            ledger,
            player,
            newly_closed: BTreeSet::new(),
        }
    }

    fn finish(self) -> Vec<EdgeId> {
        self.newly_closed.into_iter().collect()
    }

    fn is_closed(&self, edge: EdgeId) -> bool {
        self.ledger.is_closed(edge) || self.newly_closed.contains(&edge)
    }

    fn is_own_ship(&self, edge: EdgeId) -> bool {
        self.ledger.route_at(edge) == Some(RouteKind::Ship)
    }

    fn mark_closed(&mut self, segment: Vec<EdgeId>) {
        for edge in segment {
            if !self.ledger.is_closed(edge) && self.newly_closed.insert(edge) {
                trace!("player {} closes ship {edge:?}", self.player);
            }
        }
    }

    /// Follows the route from `first` towards `far_node`, closing it if the far end is
    /// anchored, then retries any loops it ran into. Returns whether anything closed.
    fn close_from(&mut self, first: EdgeId, far_node: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut loops = Vec::new();
        let Some(segment) = self.far_end_closed(first, far_node, &mut visited, &mut loops) else {
            return false;
        };
        self.mark_closed(segment);

        for recheck in loops {
            let Some(&nearest) = recheck.ships.first() else {
                continue;
            };
            if self.is_closed(nearest) {
                continue;
            }
            let toward = match recheck.ships.get(1) {
                None => Some(recheck.far_node),
                Some(&next) => self.topology.node_between_edges(nearest, next),
            };
            let Some(toward) = toward else {
                continue;
            };
            trace!("rechecking loop at node {} from {nearest:?}", recheck.far_node);
            let mut revisited = HashSet::new();
            let mut nested = Vec::new();
            if let Some(segment) = self.far_end_closed(nearest, toward, &mut revisited, &mut nested) {
                self.mark_closed(segment);
            }
        }
        true
    }

    /// Walks ships from `first` through `far_node` onwards. Returns the ships walked when
    /// the far end is closed: an own settlement or city, or a branch into a closed ship.
    fn far_end_closed(
        &self,
        first: EdgeId,
        far_node: NodeId,
        visited: &mut HashSet<EdgeId>,
        loops: &mut Vec<LoopRecheck>,
    ) -> Option<Vec<EdgeId>> {
        let mut segment = vec![first];
        let mut edge = first;
        let mut node = far_node;

        loop {
            if !visited.insert(edge) {
                loops.push(LoopRecheck {
                    far_node: node,
                    ships: segment,
                });
                return None;
            }

            if let Some(structure) = self.occupancy.settlement_at_node(node) {
                // Foreign buildings end the route without anchoring it.
                return (structure.player() == self.player).then_some(segment);
            }

            let next: SmallVec<[EdgeId; 2]> = self
                .topology
                .edges_of_node(node)
                .iter()
                .copied()
                .filter(|other| *other != edge && self.is_own_ship(*other))
                .collect();

            match next.as_slice() {
                [] => return None,
                [only] => {
                    edge = *only;
                    node = self.topology.far_node(edge, node);
                    segment.push(edge);
                }
                [one, two, ..] => {
                    if self.is_closed(*one) || self.is_closed(*two) {
                        return Some(segment);
                    }
                    let (one, two) = (*one, *two);
                    let loops_before = loops.len();
                    let from_one =
                        self.far_end_closed(one, self.topology.far_node(one, node), visited, loops);
                    let from_two =
                        self.far_end_closed(two, self.topology.far_node(two, node), visited, loops);
                    if loops.len() != loops_before {
                        loops.push(LoopRecheck {
                            far_node: node,
                            ships: segment.clone(),
                        });
                    }
                    if from_one.is_none() && from_two.is_none() {
                        return None;
                    }
                    segment.extend(from_one.into_iter().flatten());
                    segment.extend(from_two.into_iter().flatten());
                    return Some(segment);
                }
            }
        }
    }
}
