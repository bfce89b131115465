#![allow(dead_code)]

use std::collections::BTreeSet;

use settle_rs::board::{BoardTopology, CatanMap, EdgeId, MapType, NodeId, normalize_edge};
use settle_rs::game::{GameConfig, GameState, Piece};

/// A game already in play, so each player founds their network with one settlement
/// on any legal node.
pub fn playing_state(map_type: MapType, num_players: usize, seed: u64) -> GameState {
    GameState::new(GameConfig {
        num_players,
        map_type,
        seed,
        initial_pieces: 0,
        ..GameConfig::default()
    })
    .unwrap()
}

/// A simple path of `len` land edges that never visits a node in `avoid`.
pub fn land_path(map: &CatanMap, len: usize, avoid: &BTreeSet<NodeId>) -> Vec<NodeId> {
    for &start in map.land_nodes() {
        if avoid.contains(&start) {
            continue;
        }
        let mut path = vec![start];
        if extend_path(map, &mut path, len, avoid) {
            return path;
        }
    }
    panic!("no land path of {len} edges");
}

fn extend_path(map: &CatanMap, path: &mut Vec<NodeId>, len: usize, avoid: &BTreeSet<NodeId>) -> bool {
    if path.len() == len + 1 {
        return true;
    }
    let last = *path.last().unwrap();
    for &next in map.nodes_of_node(last) {
        if path.contains(&next) || avoid.contains(&next) {
            continue;
        }
        if !map.land_edges().contains(&normalize_edge((last, next))) {
            continue;
        }
        path.push(next);
        if extend_path(map, path, len, avoid) {
            return true;
        }
        path.pop();
    }
    false
}

pub fn path_edges(path: &[NodeId]) -> Vec<EdgeId> {
    path.windows(2)
        .map(|pair| normalize_edge((pair[0], pair[1])))
        .collect()
}

/// Founds a settlement at the start of `path`, then lays roads along it.
pub fn settle_and_lay_roads(state: &mut GameState, player: usize, path: &[NodeId]) {
    state
        .place_piece(Piece::Settlement { player, node: path[0] })
        .unwrap();
    for edge in path_edges(path) {
        state.place_piece(Piece::Road { player, edge }).unwrap();
    }
}

/// Land node `start`, a middle node and land node `end`, joined by two sea edges.
pub fn two_ship_crossing(map: &CatanMap) -> (NodeId, NodeId, NodeId) {
    for &start in map.land_nodes() {
        for &middle in map.nodes_of_node(start) {
            if !map.sea_edges().contains(&normalize_edge((start, middle))) {
                continue;
            }
            for &end in map.nodes_of_node(middle) {
                if end != start
                    && map.land_nodes().contains(&end)
                    && map.sea_edges().contains(&normalize_edge((middle, end)))
                {
                    return (start, middle, end);
                }
            }
        }
    }
    panic!("sea board without a two-ship crossing");
}

/// Every player's potential sets sit inside the matching legal sets.
pub fn potentials_within_legal(state: &GameState) -> bool {
    state.players.iter().all(|player| {
        let placement = &player.placement;
        placement.potential_roads().is_subset(placement.legal_roads())
            && placement.potential_ships().is_subset(placement.legal_ships())
            && placement
                .potential_settlements()
                .is_subset(placement.legal_settlements())
    })
}

/// No two settlements or cities, of any owner, sit on neighbouring nodes.
pub fn buildings_respect_distance(state: &GameState) -> bool {
    let occupied: BTreeSet<NodeId> = state.occupancy.buildings().map(|(node, _)| node).collect();
    occupied.iter().all(|node| {
        state
            .map
            .nodes_of_node(*node)
            .iter()
            .all(|neighbor| !occupied.contains(neighbor))
    })
}
