use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::board::{BoardTopology, CatanMap, EdgeId, HexId, MapType};
use crate::types::{Color, PieceKind};

use super::closure;
use super::longest_route::{LongestRouteRecord, MIN_LONGEST_ROUTE, longest_route};
use super::occupancy::{Occupancy, Structure};
use super::pieces::{Location, Piece, PieceCounts};
use super::players::PlayerState;
use super::resources::ResourceBundle;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("player {player} has no {kind} left")]
    OutOfPieces { player: usize, kind: PieceKind },
    #[error("{kind} cannot be placed at {location}")]
    IllegalLocation { kind: PieceKind, location: Location },
    #[error("no {kind} at {location}")]
    NotFound { kind: PieceKind, location: Location },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid player index {0}")]
    InvalidPlayer(usize),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub num_players: usize,
    pub map_type: MapType,
    pub seed: u64,
    /// Pieces each player lays before play starts: 4, 6, or 0 to start in play.
    pub initial_pieces: u8,
    pub piece_limits: PieceCounts,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 4,
            map_type: MapType::Base,
            seed: 42,
            initial_pieces: 4,
            piece_limits: PieceCounts::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, GameError> {
        let config: GameConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(2..=Color::ORDERED.len()).contains(&self.num_players) {
            return Err(GameError::InvalidConfig(format!(
                "num_players must be between 2 and {}, got {}",
                Color::ORDERED.len(),
                self.num_players
            )));
        }
        if !matches!(self.initial_pieces, 0 | 4 | 6) {
            return Err(GameError::InvalidConfig(format!(
                "initial_pieces must be 0, 4 or 6, got {}",
                self.initial_pieces
            )));
        }
        let pairs = self.initial_pieces / 2;
        if self.piece_limits.settlements < pairs || self.piece_limits.roads < pairs {
            return Err(GameError::InvalidConfig(
                "piece limits are too small for initial placement".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    InitialPlacement,
    Playing,
}

/// Marker returned by [`GameState::savepoint`]; rolling back to it undoes every later
/// placement. Stale once the journal drops below it or is rebased by `begin_play`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint {
    depth: usize,
    generation: u64,
}

/// What one placement changed beyond the piece itself.
#[derive(Debug, Clone)]
struct JournalEntry {
    generation: u64,
    piece: Piece,
    closed_ships: Vec<EdgeId>,
    cleared_initial_settlements: bool,
    previous_routes: Vec<(usize, LongestRouteRecord)>,
    previous_holder: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub generation: u64,
    pub closed_ships: Vec<EdgeId>,
    /// Owner's longest route after the placement.
    pub longest_route: usize,
    pub longest_route_holder: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub map: CatanMap,
    pub players: Vec<PlayerState>,
    pub occupancy: Occupancy,
    pub phase: GamePhase,
    longest_route_holder: Option<usize>,
    journal: Vec<JournalEntry>,
    history: Vec<Piece>,
    play_started_at: Option<usize>,
    base_generation: u64,
    next_generation: u64,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let map = CatanMap::build(config.map_type, config.seed);
        let initial = config.initial_pieces > 0;
        let players = Color::ORDERED
            .iter()
            .take(config.num_players)
            .enumerate()
            .map(|(idx, color)| PlayerState::new(idx, *color, &map, config.piece_limits, initial))
            .collect();
        info!(
            "new {} game, {} players, seed {}",
            config.map_type, config.num_players, config.seed
        );

        Ok(Self {
            phase: if initial {
                GamePhase::InitialPlacement
            } else {
                GamePhase::Playing
            },
            play_started_at: if initial { None } else { Some(0) },
            config,
            map,
            players,
            occupancy: Occupancy::new(),
            longest_route_holder: None,
            journal: Vec::new(),
            history: Vec::new(),
            base_generation: 0,
            next_generation: 1,
        })
    }

    pub fn player(&self, idx: usize) -> Result<&PlayerState, GameError> {
        self.players.get(idx).ok_or(GameError::InvalidPlayer(idx))
    }

    pub fn longest_route_holder(&self) -> Option<usize> {
        self.longest_route_holder
    }

    pub fn longest_route_length(&self, player: usize) -> Result<usize, GameError> {
        Ok(self.player(player)?.longest_route_length())
    }

    /// Every placement since the game started, oldest first.
    pub fn history(&self) -> &[Piece] {
        &self.history
    }

    /// Index into [`GameState::history`] where play began, once it has.
    pub fn play_started_at(&self) -> Option<usize> {
        self.play_started_at
    }

    /// Number of placements that can still be undone.
    pub fn undo_depth(&self) -> usize {
        self.journal.len()
    }

    pub fn generation(&self) -> u64 {
        self.journal
            .last()
            .map_or(self.base_generation, |entry| entry.generation)
    }

    /// Places `piece` after checking supply, that the location is potential for the owner
    /// and, during initial placement, whose turn the piece type is. Every derived view is updated before returning.
    pub fn place_piece(&mut self, piece: Piece) -> Result<PlacementOutcome, GameError> {
        let piece = piece.normalized();
        if self.phase == GamePhase::InitialPlacement
            && !self.can_build_initial_piece_type(piece.player(), piece.kind())?
        {
            return Err(GameError::InvalidState(format!(
                "player {} cannot place a {} now",
                piece.player(),
                piece.kind()
            )));
        }
        self.apply_placement(piece)
    }

    /// Undoes the most recent placement. Only the top of the journal can be removed.
    pub fn remove_piece(&mut self, piece: Piece) -> Result<(), GameError> {
        let piece = piece.normalized();
        let owner = self.player(piece.player())?;
        let on_top = self.journal.last().is_some_and(|entry| entry.piece == piece);
        if !on_top {
            if !owner.ledger.contains(piece) {
                return Err(GameError::NotFound {
                    kind: piece.kind(),
                    location: piece.location(),
                });
            }
            return Err(GameError::InvalidState(format!(
                "{piece} is not the most recent placement"
            )));
        }
        match self.journal.pop() {
            Some(entry) => self.undo(entry),
            None => Err(GameError::InvalidState("nothing to undo".to_string())),
        }
    }

    pub fn savepoint(&self) -> Savepoint {
        Savepoint {
            depth: self.journal.len(),
            generation: self.generation(),
        }
    }

    /// Undoes every placement made after `savepoint`, most recent first.
    pub fn rollback_to(&mut self, savepoint: Savepoint) -> Result<(), GameError> {
        let expected = match savepoint.depth {
            0 => Some(self.base_generation),
            depth => self.journal.get(depth - 1).map(|entry| entry.generation),
        };
        if expected != Some(savepoint.generation) {
            return Err(GameError::InvalidState(format!(
                "stale savepoint at depth {}",
                savepoint.depth
            )));
        }
        let undone = self.journal.len() - savepoint.depth;
        while self.journal.len() > savepoint.depth {
            if let Some(entry) = self.journal.pop() {
                self.undo(entry)?;
            }
        }
        debug!("rolled back {undone} placements to depth {}", savepoint.depth);
        Ok(())
    }

    /// Ends initial placement. Initial pieces become permanent and older savepoints go stale.
    pub fn begin_play(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::InitialPlacement {
            return Err(GameError::InvalidState("play has already begun".to_string()));
        }
        let required = self.config.initial_pieces as usize;
        if let Some((idx, _)) = self
            .players
            .iter()
            .enumerate()
            .find(|(_, player)| player.ledger.placed_count() < required)
        {
            return Err(GameError::InvalidState(format!(
                "player {idx} has not placed {required} initial pieces"
            )));
        }
        for player in &mut self.players {
            if player.placement.initial_settlements_open() {
                player
                    .placement
                    .set_initial_settlements_open(&self.map, false);
            }
        }
        self.phase = GamePhase::Playing;
        self.journal.clear();
        self.base_generation = self.bump_generation();
        self.play_started_at = Some(self.history.len());
        info!("play begins after {} placements", self.history.len());
        Ok(())
    }

    /// Whether `kind` is the piece type `player` lays next in initial placement:
    /// settlement and route alternate until `initial_pieces` are down, then anything goes.
    pub fn can_build_initial_piece_type(
        &self,
        player: usize,
        kind: PieceKind,
    ) -> Result<bool, GameError> {
        if self.phase != GamePhase::InitialPlacement {
            return Err(GameError::InvalidState(
                "initial placement is over".to_string(),
            ));
        }
        let placed = self.player(player)?.ledger.placed_count();
        if placed >= self.config.initial_pieces as usize {
            return Ok(true);
        }
        let route_turn = placed % 2 == 1;
        Ok(match kind {
            PieceKind::Settlement => !route_turn,
            PieceKind::Road => route_turn,
            PieceKind::Ship => route_turn && self.map.is_sea_board(),
            PieceKind::City => false,
        })
    }

    /// Whether `player` has at least two road spots, counting a spot that only opens
    /// up after building the single one available.
    pub fn has_two_potential_roads(&mut self, player: usize) -> Result<bool, GameError> {
        let potential = self.player(player)?.placement.potential_roads();
        if potential.len() > 1 {
            return Ok(true);
        }
        let Some(&edge) = potential.iter().next() else {
            return Ok(false);
        };

        let savepoint = self.savepoint();
        if self.apply_placement(Piece::Road { player, edge }).is_err() {
            return Ok(false);
        }
        let more = !self.players[player].placement.potential_roads().is_empty();
        self.rollback_to(savepoint)?;
        Ok(more)
    }

    pub fn can_move_ship(&self, player: usize, edge: EdgeId) -> Result<bool, GameError> {
        let owner = self.player(player)?;
        Ok(closure::can_move_ship(
            &self.map,
            &self.occupancy,
            &owner.ledger,
            player,
            edge,
        ))
    }

    /// Resources `player` collects when `number` is rolled, skipping hex `excluded`.
    pub fn resource_yield(
        &self,
        player: usize,
        number: u8,
        excluded: Option<HexId>,
    ) -> Result<ResourceBundle, GameError> {
        Ok(self.player(player)?.touch.resources_for_number(number, excluded))
    }

    fn validate(&self, piece: Piece) -> Result<(), GameError> {
        let player = self.player(piece.player())?;
        let kind = piece.kind();
        if player.ledger.remaining(kind) == 0 {
            return Err(GameError::OutOfPieces {
                player: piece.player(),
                kind,
            });
        }
        let placement = &player.placement;
        let founding = player.ledger.count(PieceKind::Settlement) == 0
            && player.ledger.count(PieceKind::City) == 0;
        let legal = match piece {
            Piece::Road { edge, .. } => placement.is_potential_road(edge),
            Piece::Ship { edge, .. } => {
                self.map.is_sea_board() && placement.is_potential_ship(edge)
            }
            // A player's first building may go on any legal node; later ones grow off a route.
            Piece::Settlement { node, .. } => {
                placement.is_potential_settlement(node)
                    || (founding && placement.is_legal_settlement(node))
            }
            Piece::City { node, .. } => {
                self.occupancy.settlement_at_node(node)
                    == Some(Structure::Settlement {
                        player: piece.player(),
                    })
            }
        };
        if !legal {
            return Err(GameError::IllegalLocation {
                kind,
                location: piece.location(),
            });
        }
        Ok(())
    }

    fn apply_placement(&mut self, piece: Piece) -> Result<PlacementOutcome, GameError> {
        self.validate(piece)?;
        let owner = piece.player();

        self.players[owner].ledger.place(piece)?;
        self.occupancy.place(piece);
        for player in &mut self.players {
            player.placement.on_place(&self.map, &self.occupancy, piece);
        }
        let cleared_initial_settlements = self.close_initial_settlements(piece);
        let closed_ships = self.close_trade_routes(piece)?;

        if let Piece::Settlement { node, .. } | Piece::City { node, .. } = piece {
            self.players[owner].touch.add_node(&self.map, node);
        }
        if let Piece::Settlement { node, .. } = piece {
            self.players[owner].add_port_flags(&self.map, node);
        }

        let previous_routes = self.refresh_longest_routes(piece);
        let previous_holder = self.longest_route_holder;
        self.update_longest_route_holder();

        let generation = self.bump_generation();
        self.journal.push(JournalEntry {
            generation,
            piece,
            closed_ships: closed_ships.clone(),
            cleared_initial_settlements,
            previous_routes,
            previous_holder,
        });
        self.history.push(piece);
        debug!("placed {piece} (generation {generation})");

        Ok(PlacementOutcome {
            generation,
            closed_ships,
            longest_route: self.players[owner].longest_route_length(),
            longest_route_holder: self.longest_route_holder,
        })
    }

    fn undo(&mut self, entry: JournalEntry) -> Result<(), GameError> {
        let piece = entry.piece;
        let owner = piece.player();

        if let Piece::Settlement { node, .. } = piece {
            self.players[owner].remove_port_flags(&self.map, node);
        }
        if let Piece::Settlement { node, .. } | Piece::City { node, .. } = piece {
            self.players[owner].touch.remove_node(&self.map, node);
        }
        for ship in &entry.closed_ships {
            self.players[owner].ledger.set_closed(*ship, false)?;
        }

        self.players[owner].ledger.remove(piece)?;
        self.occupancy.remove(piece);
        for player in &mut self.players {
            player.placement.on_remove(&self.map, &self.occupancy, piece);
        }
        if entry.cleared_initial_settlements {
            self.players[owner]
                .placement
                .set_initial_settlements_open(&self.map, true);
        }

        for (idx, record) in entry.previous_routes {
            self.players[idx].longest_route = record;
        }
        self.longest_route_holder = entry.previous_holder;
        self.sync_longest_route_flags();

        self.history.pop();
        debug!("removed {piece}");
        Ok(())
    }

    /// Closes the owner's free choice of settlement spots once their last initial
    /// settlement is down.
    fn close_initial_settlements(&mut self, piece: Piece) -> bool {
        let Piece::Settlement { player, .. } = piece else {
            return false;
        };
        if self.phase != GamePhase::InitialPlacement {
            return false;
        }
        let owner = &mut self.players[player];
        let last_initial = (self.config.initial_pieces / 2) as usize;
        if !owner.placement.initial_settlements_open()
            || owner.ledger.count(PieceKind::Settlement) != last_initial
        {
            return false;
        }
        owner
            .placement
            .set_initial_settlements_open(&self.map, false);
        true
    }

    fn close_trade_routes(&mut self, piece: Piece) -> Result<Vec<EdgeId>, GameError> {
        if !self.map.is_sea_board() {
            return Ok(Vec::new());
        }
        let owner = piece.player();
        let ledger = &self.players[owner].ledger;
        let closed = match piece {
            Piece::Ship { edge, .. } => {
                closure::close_after_ship(&self.map, &self.occupancy, ledger, owner, edge)?
            }
            Piece::Settlement { node, .. } => {
                closure::close_after_settlement(&self.map, &self.occupancy, ledger, owner, node)?
            }
            Piece::Road { .. } | Piece::City { .. } => Vec::new(),
        };
        for ship in &closed {
            self.players[owner].ledger.set_closed(*ship, true)?;
        }
        if !closed.is_empty() {
            debug!("player {owner} closed {} ships", closed.len());
        }
        Ok(closed)
    }

    /// Recomputes the routes `piece` can change and returns the records it replaced.
    /// A route piece only touches its owner; a settlement can cut through anyone passing
    /// the node, or join an owner's road and ship.
    fn refresh_longest_routes(&mut self, piece: Piece) -> Vec<(usize, LongestRouteRecord)> {
        let affected: Vec<usize> = match piece {
            Piece::Road { player, .. } | Piece::Ship { player, .. } => vec![player],
            Piece::Settlement { node, .. } => self
                .players
                .iter()
                .enumerate()
                .filter(|(_, player)| player.placement.route_graph().touches(node))
                .map(|(idx, _)| idx)
                .collect(),
            Piece::City { .. } => Vec::new(),
        };

        let mut previous = Vec::with_capacity(affected.len());
        for idx in affected {
            let player = &mut self.players[idx];
            let record = longest_route(
                &self.map,
                player.placement.route_graph(),
                &self.occupancy,
                idx,
            );
            previous.push((idx, std::mem::replace(&mut player.longest_route, record)));
        }
        previous
    }

    /// The holder keeps the bonus on a tie; otherwise it goes to a sole leader at or
    /// above the minimum, or to nobody.
    fn update_longest_route_holder(&mut self) {
        let best = self
            .players
            .iter()
            .map(PlayerState::longest_route_length)
            .max()
            .unwrap_or(0);
        let leaders: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, player)| player.longest_route_length() == best)
            .map(|(idx, _)| idx)
            .collect();

        let holder = if best < MIN_LONGEST_ROUTE {
            None
        } else if let Some(current) = self
            .longest_route_holder
            .filter(|current| leaders.contains(current))
        {
            Some(current)
        } else if leaders.len() == 1 {
            Some(leaders[0])
        } else {
            None
        };

        if holder != self.longest_route_holder {
            debug!("longest route moves from {:?} to {holder:?}", self.longest_route_holder);
        }
        self.longest_route_holder = holder;
        self.sync_longest_route_flags();
    }

    fn sync_longest_route_flags(&mut self) {
        for (idx, player) in self.players.iter_mut().enumerate() {
            player.has_longest_route = self.longest_route_holder == Some(idx);
        }
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::NodeId;

    fn mini_game(initial_pieces: u8) -> GameState {
        GameState::new(GameConfig {
            num_players: 2,
            map_type: MapType::Mini,
            seed: 3,
            initial_pieces,
            ..GameConfig::default()
        })
        .unwrap()
    }

    fn first_settlement_spot(state: &GameState, player: usize) -> NodeId {
        *state.players[player]
            .placement
            .legal_settlements()
            .iter()
            .next()
            .unwrap()
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        let bad_players = GameConfig {
            num_players: 5,
            ..GameConfig::default()
        };
        assert!(matches!(
            bad_players.validate(),
            Err(GameError::InvalidConfig(_))
        ));
        let bad_initial = GameConfig {
            initial_pieces: 3,
            ..GameConfig::default()
        };
        assert!(bad_initial.validate().is_err());

        let parsed = GameConfig::from_json_str(r#"{"num_players": 3, "map_type": "Mini"}"#).unwrap();
        assert_eq!(parsed.num_players, 3);
        assert_eq!(parsed.initial_pieces, 4);
        assert!(matches!(
            GameConfig::from_json_str("{not json"),
            Err(GameError::Snapshot(_))
        ));
    }

    #[test]
    fn initial_turn_order_alternates_settlement_and_road() {
        let mut state = mini_game(4);
        assert!(state.can_build_initial_piece_type(0, PieceKind::Settlement).unwrap());
        assert!(!state.can_build_initial_piece_type(0, PieceKind::Road).unwrap());
        assert!(!state.can_build_initial_piece_type(0, PieceKind::Ship).unwrap());
        assert!(!state.can_build_initial_piece_type(0, PieceKind::City).unwrap());

        let node = first_settlement_spot(&state, 0);
        state
            .place_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        assert!(state.can_build_initial_piece_type(0, PieceKind::Road).unwrap());
        assert!(!state.can_build_initial_piece_type(0, PieceKind::Settlement).unwrap());

        let edge = *state.players[0].placement.potential_roads().iter().next().unwrap();
        assert!(matches!(
            state.place_piece(Piece::Settlement { player: 0, node: edge.0 }),
            Err(GameError::InvalidState(_))
        ));
        state.place_piece(Piece::Road { player: 0, edge }).unwrap();
        assert_eq!(state.history().len(), 2);
        assert!(matches!(
            state.can_build_initial_piece_type(9, PieceKind::Road),
            Err(GameError::InvalidPlayer(9))
        ));
    }

    #[test]
    fn undo_only_pops_the_top() {
        let mut state = mini_game(0);
        let node = first_settlement_spot(&state, 0);
        let before = state.players.clone();
        state
            .place_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        let edge = *state.players[0].placement.potential_roads().iter().next().unwrap();
        state.place_piece(Piece::Road { player: 0, edge }).unwrap();

        assert!(matches!(
            state.remove_piece(Piece::Settlement { player: 0, node }),
            Err(GameError::InvalidState(_))
        ));
        assert!(matches!(
            state.remove_piece(Piece::City { player: 0, node }),
            Err(GameError::NotFound { .. })
        ));
        state.remove_piece(Piece::Road { player: 0, edge }).unwrap();
        state
            .remove_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        assert_eq!(state.players, before);
        assert!(state.history().is_empty());
    }

    #[test]
    fn stale_savepoints_are_rejected() {
        let mut state = mini_game(0);
        let start = state.savepoint();
        let node = first_settlement_spot(&state, 0);
        state
            .place_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        let after_settlement = state.savepoint();
        state.rollback_to(start).unwrap();
        assert!(matches!(
            state.rollback_to(after_settlement),
            Err(GameError::InvalidState(_))
        ));

        // A new placement at the same depth does not revive the old savepoint.
        state
            .place_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        assert!(state.rollback_to(after_settlement).is_err());
        assert_eq!(state.undo_depth(), 1);
    }

    #[test]
    fn out_of_pieces_is_reported() {
        let mut state = GameState::new(GameConfig {
            num_players: 2,
            map_type: MapType::Mini,
            initial_pieces: 0,
            piece_limits: PieceCounts {
                settlements: 1,
                ..PieceCounts::default()
            },
            ..GameConfig::default()
        })
        .unwrap();
        let node = first_settlement_spot(&state, 0);
        state
            .place_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        let other = first_settlement_spot(&state, 1);
        assert!(matches!(
            state.place_piece(Piece::Settlement { player: 0, node: other }),
            Err(GameError::OutOfPieces { player: 0, kind: PieceKind::Settlement })
        ));
    }

    #[test]
    fn city_needs_own_settlement() {
        let mut state = mini_game(0);
        let node = first_settlement_spot(&state, 0);
        assert!(matches!(
            state.place_piece(Piece::City { player: 0, node }),
            Err(GameError::IllegalLocation { .. })
        ));
        state
            .place_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        assert!(state.place_piece(Piece::City { player: 1, node }).is_err());
        let touches = state.players[0].touch.len();
        state.place_piece(Piece::City { player: 0, node }).unwrap();
        assert_eq!(state.players[0].touch.len(), touches * 2);
        state.remove_piece(Piece::City { player: 0, node }).unwrap();
        assert_eq!(state.players[0].touch.len(), touches);
    }

    #[test]
    fn later_pieces_must_grow_from_own_network() {
        let mut state = mini_game(0);
        let node = first_settlement_spot(&state, 0);
        state
            .place_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        let before = state.players.clone();

        let placement = &state.players[0].placement;
        let stray_road = *placement
            .legal_roads()
            .iter()
            .find(|edge| !placement.is_potential_road(**edge))
            .unwrap();
        let stray_node = *placement
            .legal_settlements()
            .iter()
            .find(|n| !placement.is_potential_settlement(**n))
            .unwrap();
        assert!(matches!(
            state.place_piece(Piece::Road { player: 0, edge: stray_road }),
            Err(GameError::IllegalLocation { kind: PieceKind::Road, .. })
        ));
        assert!(matches!(
            state.place_piece(Piece::Settlement { player: 0, node: stray_node }),
            Err(GameError::IllegalLocation { kind: PieceKind::Settlement, .. })
        ));
        assert_eq!(state.players, before);
        assert_eq!(state.undo_depth(), 1);

        // Player 1 has nothing yet, so any legal node founds their network.
        state
            .place_piece(Piece::Settlement { player: 1, node: stray_node })
            .unwrap();
    }

    #[test]
    fn ships_are_refused_off_sea_boards() {
        let mut state = mini_game(0);
        let node = first_settlement_spot(&state, 0);
        state
            .place_piece(Piece::Settlement { player: 0, node })
            .unwrap();
        let edge = state.map.edges_of_node(node)[0];
        assert!(matches!(
            state.place_piece(Piece::Ship { player: 0, edge }),
            Err(GameError::IllegalLocation { .. })
        ));
    }
}
