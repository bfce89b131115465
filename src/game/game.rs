use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::pieces::Piece;
use crate::game::{GameConfig, GameError, GamePhase, GameState};

/// Everything needed to rebuild a game: the config plus the placements in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub config: GameConfig,
    pub placements: Vec<Piece>,
    /// Placements before this index were made during initial placement.
    pub play_started_at: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub seed: u64,
    pub id: Uuid,
    pub state: GameState,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Ok(Self {
            seed: config.seed,
            id: Uuid::new_v4(),
            state: GameState::new(config)?,
        })
    }

    /// Runs `f` against the live state and rolls every placement it made back
    /// afterwards, whether or not it succeeded.
    pub fn speculate<R>(
        &mut self,
        f: impl FnOnce(&mut GameState) -> Result<R, GameError>,
    ) -> Result<R, GameError> {
        let savepoint = self.state.savepoint();
        let result = f(&mut self.state);
        self.state.rollback_to(savepoint)?;
        result
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            config: self.state.config.clone(),
            placements: self.state.history().to_vec(),
            play_started_at: self.state.play_started_at(),
        }
    }

    /// Replays the snapshot's placements on a fresh board built from its config.
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Result<Self, GameError> {
        let mut game = Game::new(snapshot.config.clone())?;
        for (idx, piece) in snapshot.placements.iter().enumerate() {
            if snapshot.play_started_at == Some(idx) {
                game.begin_play_if_needed()?;
            }
            game.state.place_piece(*piece)?;
        }
        if snapshot.play_started_at == Some(snapshot.placements.len()) {
            game.begin_play_if_needed()?;
        }
        debug!(
            "replayed {} placements into game {}",
            snapshot.placements.len(),
            game.id
        );
        Ok(game)
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn from_json(raw: &str) -> Result<Self, GameError> {
        let snapshot: GameSnapshot = serde_json::from_str(raw)?;
        snapshot.config.validate()?;
        Self::from_snapshot(&snapshot)
    }

    fn begin_play_if_needed(&mut self) -> Result<(), GameError> {
        if self.state.phase == GamePhase::InitialPlacement {
            self.state.begin_play()?;
        }
        Ok(())
    }
}
