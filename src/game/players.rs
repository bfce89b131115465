use std::collections::BTreeMap;

use crate::board::{CatanMap, NodeId};
use crate::types::{Color, PieceKind, Resource};

use super::longest_route::LongestRouteRecord;
use super::numbers::ResourceTouch;
use super::pieces::{PieceCounts, PieceLedger};
use super::placement::PlacementTracker;

/// Everything tracked for one seat: pieces, placement sets, dice touches and routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub color: Color,
    pub ledger: PieceLedger,
    pub placement: PlacementTracker,
    pub touch: ResourceTouch,
    pub longest_route: LongestRouteRecord,
    pub has_longest_route: bool,
    port_flags: BTreeMap<Option<Resource>, u8>,
}

impl PlayerState {
    pub fn new(
        index: usize,
        color: Color,
        map: &CatanMap,
        limits: PieceCounts,
        initial_settlements_open: bool,
    ) -> Self {
        Self {
            color,
            ledger: PieceLedger::new(index, limits),
            placement: PlacementTracker::new(index, map, initial_settlements_open),
            touch: ResourceTouch::new(),
            longest_route: LongestRouteRecord::default(),
            has_longest_route: false,
            port_flags: BTreeMap::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.placement.player()
    }

    pub fn longest_route_length(&self) -> usize {
        self.longest_route.length
    }

    /// Whether a settlement or city of this player sits on a port of that kind;
    /// `None` is the generic 3:1 port.
    pub fn has_port(&self, port: Option<Resource>) -> bool {
        self.port_flags.get(&port).is_some_and(|count| *count > 0)
    }

    pub fn ports(&self) -> impl Iterator<Item = Option<Resource>> + '_ {
        self.port_flags
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(port, _)| *port)
    }

    pub(crate) fn add_port_flags(&mut self, map: &CatanMap, node: NodeId) {
        for port in map.port_resources_at(node) {
            *self.port_flags.entry(port).or_insert(0) += 1;
        }
    }

    pub(crate) fn remove_port_flags(&mut self, map: &CatanMap, node: NodeId) {
        for port in map.port_resources_at(node) {
            if let Some(count) = self.port_flags.get_mut(&port) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.port_flags.remove(&port);
                }
            }
        }
    }

    pub fn public_points(&self) -> u8 {
        let settlement_points = self.ledger.count(PieceKind::Settlement) as u8;
        let city_points = (self.ledger.count(PieceKind::City) as u8) * 2;
        settlement_points + city_points + self.bonus_points()
    }

    pub fn bonus_points(&self) -> u8 {
        if self.has_longest_route { 2 } else { 0 }
    }
}
