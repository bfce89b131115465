#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod coords;
pub mod game;
pub mod types;

pub use board::{BoardTopology, CatanMap, EdgeId, HexId, MapType, NodeId, Tile};
pub use game::{Game, GameConfig, GameError, GameState, Piece};
pub use types::{Color, PieceKind, Resource};
