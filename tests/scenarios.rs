use std::collections::BTreeSet;

use settle_rs::board::{BoardTopology, CatanMap, MapType, NodeId, normalize_edge};
use settle_rs::game::{GameConfig, GameError, GamePhase, GameState, Piece};
use settle_rs::types::{HexKind, PieceKind, Resource};

mod common;

use common::{land_path, path_edges, playing_state, settle_and_lay_roads, two_ship_crossing};

#[test]
fn three_roads_in_a_line_make_a_route_of_three() {
    let mut state = playing_state(MapType::Base, 2, 5);
    let path = land_path(&state.map, 3, &BTreeSet::new());
    settle_and_lay_roads(&mut state, 0, &path);

    assert_eq!(state.longest_route_length(0).unwrap(), 3);
    assert_eq!(state.longest_route_holder(), None);
}

#[test]
fn road_away_from_the_settlement_opens_nothing() {
    let mut state = playing_state(MapType::Base, 2, 5);
    let path = land_path(&state.map, 3, &BTreeSet::new());
    let settlement = path[0];
    state
        .place_piece(Piece::Settlement { player: 0, node: settlement })
        .unwrap();
    let before = state.players.clone();

    let stray = normalize_edge((path[2], path[3]));
    assert!(matches!(
        state.place_piece(Piece::Road { player: 0, edge: stray }),
        Err(GameError::IllegalLocation { kind: PieceKind::Road, .. })
    ));
    assert_eq!(state.players, before);
    let placement = &state.players[0].placement;
    assert!(!placement.is_potential_settlement(path[2]));
    assert!(!placement.is_potential_settlement(path[3]));
    assert!(placement.potential_settlements().is_empty());
    assert!(!placement.is_potential_road(stray));
}

#[test]
fn connected_roads_open_spots_clear_of_the_distance_rule() {
    let mut state = playing_state(MapType::Base, 2, 5);
    let path = land_path(&state.map, 3, &BTreeSet::new());
    let (settlement, near, far) = (path[0], path[1], path[2]);
    settle_and_lay_roads(&mut state, 0, &path[..3]);

    let placement = &state.players[0].placement;
    assert!(!placement.is_potential_settlement(settlement));
    assert!(!placement.is_potential_settlement(near));
    for neighbor in state.map.nodes_of_node(settlement) {
        assert!(!placement.is_potential_settlement(*neighbor));
    }
    assert!(placement.is_potential_settlement(far));
}

#[test]
fn foreign_settlement_cuts_off_the_road_ahead() {
    let mut state = playing_state(MapType::Base, 2, 5);
    let path = land_path(&state.map, 3, &BTreeSet::new());
    let (a, b, c) = (path[1], path[2], path[3]);
    settle_and_lay_roads(&mut state, 0, &path[..3]);

    let ahead = normalize_edge((b, c));
    assert!(state.players[0].placement.is_potential_road(ahead));
    let before = state.players.clone();

    state
        .place_piece(Piece::Settlement { player: 1, node: b })
        .unwrap();
    let placement = &state.players[0].placement;
    assert!(!placement.is_potential_road(ahead));
    assert!(!placement.is_potential_settlement(b));
    // The edge into the blocked node is still reachable from our side.
    assert!(state.players[0].ledger.route_at(normalize_edge((a, b))).is_some());

    state
        .remove_piece(Piece::Settlement { player: 1, node: b })
        .unwrap();
    assert_eq!(state.players, before);
}

#[test]
fn ships_close_between_two_settlements_and_reopen_on_undo() {
    let mut state = playing_state(MapType::Archipelago, 2, 9);
    let (start, middle, end) = two_ship_crossing(&state.map);
    let ship_a = normalize_edge((start, middle));
    let ship_b = normalize_edge((middle, end));

    state
        .place_piece(Piece::Settlement { player: 0, node: start })
        .unwrap();
    let first = state.place_piece(Piece::Ship { player: 0, edge: ship_a }).unwrap();
    assert!(first.closed_ships.is_empty());
    state.place_piece(Piece::Ship { player: 0, edge: ship_b }).unwrap();
    assert!(state.can_move_ship(0, ship_b).unwrap());
    assert!(!state.can_move_ship(0, ship_a).unwrap());

    let outcome = state
        .place_piece(Piece::Settlement { player: 0, node: end })
        .unwrap();
    assert_eq!(
        outcome.closed_ships.iter().copied().collect::<BTreeSet<_>>(),
        BTreeSet::from([ship_a, ship_b])
    );
    let ledger = &state.players[0].ledger;
    assert!(ledger.is_closed(ship_a) && ledger.is_closed(ship_b));
    assert!(!state.can_move_ship(0, ship_b).unwrap());

    state
        .remove_piece(Piece::Settlement { player: 0, node: end })
        .unwrap();
    let ledger = &state.players[0].ledger;
    assert!(!ledger.is_closed(ship_a));
    assert!(!ledger.is_closed(ship_b));
    assert!(state.can_move_ship(0, ship_b).unwrap());
}

/// A ring of six sea edges around one hex, entered by a spoke from `home` and left by a
/// spoke to `away`. `ring` starts and ends at the corner next to `home`.
struct ShipRing {
    seed: u64,
    home: NodeId,
    ring: Vec<NodeId>,
    exit: NodeId,
    away: NodeId,
}

fn ship_ring() -> ShipRing {
    for seed in 0..64u64 {
        let map = CatanMap::build(MapType::Archipelago, seed);
        let sea = |a: NodeId, b: NodeId| map.sea_edges().contains(&normalize_edge((a, b)));
        for tile in map.tiles.values() {
            let corners = tile.nodes();
            if (0..6).any(|i| !sea(corners[i], corners[(i + 1) % 6])) {
                continue;
            }
            let spokes = |corner: NodeId| -> Vec<NodeId> {
                map.nodes_of_node(corner)
                    .iter()
                    .copied()
                    .filter(|n| {
                        !corners.contains(n) && map.land_nodes().contains(n) && sea(corner, *n)
                    })
                    .collect()
            };
            for i in 0..6 {
                for home in spokes(corners[i]) {
                    for j in (0..6).filter(|j| *j != i) {
                        let away = spokes(corners[j]).into_iter().find(|away| {
                            *away != home && !map.nodes_of_node(home).contains(away)
                        });
                        if let Some(away) = away {
                            return ShipRing {
                                seed,
                                home,
                                ring: (0..=6).map(|k| corners[(i + k) % 6]).collect(),
                                exit: corners[j],
                                away,
                            };
                        }
                    }
                }
            }
        }
    }
    panic!("no archipelago board with a ship ring between two coasts");
}

#[test]
fn ships_around_a_ring_close_through_the_loop_and_reopen_on_undo() {
    let layout = ship_ring();
    let mut state = playing_state(MapType::Archipelago, 2, layout.seed);
    let mut ships = vec![normalize_edge((layout.home, layout.ring[0]))];
    ships.extend(path_edges(&layout.ring));
    ships.push(normalize_edge((layout.exit, layout.away)));
    let all: BTreeSet<_> = ships.iter().copied().collect();
    assert_eq!(all.len(), 8);

    state
        .place_piece(Piece::Settlement { player: 0, node: layout.home })
        .unwrap();
    for edge in &ships {
        let outcome = state
            .place_piece(Piece::Ship { player: 0, edge: *edge })
            .unwrap();
        assert!(outcome.closed_ships.is_empty());
    }

    let outcome = state
        .place_piece(Piece::Settlement { player: 0, node: layout.away })
        .unwrap();
    assert_eq!(outcome.closed_ships.iter().copied().collect::<BTreeSet<_>>(), all);
    for edge in &ships {
        assert!(state.players[0].ledger.is_closed(*edge));
        assert!(!state.can_move_ship(0, *edge).unwrap());
    }

    state
        .remove_piece(Piece::Settlement { player: 0, node: layout.away })
        .unwrap();
    for edge in &ships {
        assert!(!state.players[0].ledger.is_closed(*edge));
    }
}

#[test]
fn city_counts_a_wheat_eight_twice() {
    let (map_seed, hex, node) = (0..500u64)
        .find_map(|seed| {
            let map = CatanMap::build(MapType::Base, seed);
            map.hexes
                .iter()
                .find(|hex| {
                    hex.kind == HexKind::Producing(Resource::Wheat) && hex.number == Some(8)
                })
                .map(|hex| (seed, hex.id, hex.nodes[0]))
        })
        .expect("some seed puts an 8 on a wheat hex");

    let mut state = playing_state(MapType::Base, 2, map_seed);
    let wheat_eights = |state: &GameState| {
        state.players[0]
            .touch
            .pairs_for_hex(hex)
            .iter()
            .filter(|pair| **pair == (8, Resource::Wheat))
            .count()
    };

    state
        .place_piece(Piece::Settlement { player: 0, node })
        .unwrap();
    assert_eq!(wheat_eights(&state), 1);
    assert!(state.resource_yield(0, 8, None).unwrap().get(Resource::Wheat) >= 1);

    state.place_piece(Piece::City { player: 0, node }).unwrap();
    assert_eq!(wheat_eights(&state), 2);

    state.remove_piece(Piece::City { player: 0, node }).unwrap();
    assert_eq!(wheat_eights(&state), 1);
}

#[test]
fn longest_route_holder_keeps_the_bonus_on_a_tie() {
    let mut state = playing_state(MapType::Base, 2, 5);
    let first = land_path(&state.map, 5, &BTreeSet::new());
    let mut taken: BTreeSet<_> = first.iter().copied().collect();
    taken.extend(state.map.nodes_of_node(first[0]).iter().copied());
    let second = land_path(&state.map, 6, &taken);

    settle_and_lay_roads(&mut state, 0, &first);
    assert_eq!(state.longest_route_holder(), Some(0));
    assert!(state.players[0].has_longest_route);
    assert_eq!(state.players[0].public_points(), 3);

    settle_and_lay_roads(&mut state, 1, &second[..6]);
    assert_eq!(state.longest_route_length(1).unwrap(), 5);
    assert_eq!(state.longest_route_holder(), Some(0));

    let last = path_edges(&second)[5];
    let outcome = state.place_piece(Piece::Road { player: 1, edge: last }).unwrap();
    assert_eq!(outcome.longest_route, 6);
    assert_eq!(outcome.longest_route_holder, Some(1));
    assert!(!state.players[0].has_longest_route);

    state.remove_piece(Piece::Road { player: 1, edge: last }).unwrap();
    assert_eq!(state.longest_route_holder(), Some(0));
    assert!(state.players[0].has_longest_route);
}

#[test]
fn initial_placement_runs_until_everyone_has_their_pieces() {
    let mut state = GameState::new(GameConfig {
        num_players: 2,
        map_type: MapType::Mini,
        seed: 4,
        initial_pieces: 4,
        ..GameConfig::default()
    })
    .unwrap();
    assert_eq!(state.phase, GamePhase::InitialPlacement);

    for player in 0..2 {
        for _ in 0..2 {
            let node = *state.players[player]
                .placement
                .potential_settlements()
                .iter()
                .next()
                .unwrap();
            state
                .place_piece(Piece::Settlement { player, node })
                .unwrap();
            let edge = *state.players[player]
                .placement
                .potential_roads()
                .iter()
                .find(|edge| edge.0 == node || edge.1 == node)
                .unwrap();
            state.place_piece(Piece::Road { player, edge }).unwrap();
        }
        if player == 0 {
            assert!(matches!(state.begin_play(), Err(GameError::InvalidState(_))));
        }
        let placement = &state.players[player].placement;
        assert!(!placement.initial_settlements_open());
        for node in placement.potential_settlements() {
            assert!(placement.route_graph().touches(*node));
        }
    }

    let stale = state.savepoint();
    state.begin_play().unwrap();
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.play_started_at(), Some(8));
    assert_eq!(state.undo_depth(), 0);
    assert!(state.rollback_to(stale).is_err());
    assert!(matches!(
        state.can_build_initial_piece_type(0, PieceKind::Road),
        Err(GameError::InvalidState(_))
    ));
}

#[test]
fn two_potential_roads_looks_one_road_ahead() {
    let mut state = playing_state(MapType::Base, 2, 5);
    assert!(!state.has_two_potential_roads(0).unwrap());

    let path = land_path(&state.map, 2, &BTreeSet::new());
    state
        .place_piece(Piece::Settlement { player: 0, node: path[0] })
        .unwrap();
    let before = state.players.clone();
    let depth = state.undo_depth();

    assert!(state.has_two_potential_roads(0).unwrap());
    assert_eq!(state.players, before);
    assert_eq!(state.undo_depth(), depth);
    assert!(matches!(
        state.has_two_potential_roads(7),
        Err(GameError::InvalidPlayer(7))
    ));
}
