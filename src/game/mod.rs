pub mod closure;
pub mod game;
pub mod longest_route;
pub mod numbers;
pub mod occupancy;
pub mod pieces;
pub mod placement;
pub mod players;
pub mod resources;
pub mod route_graph;
pub mod state;

pub use game::{Game, GameSnapshot};
pub use longest_route::{LongestRouteRecord, MIN_LONGEST_ROUTE, RoutePath, longest_route};
pub use numbers::{ResourceTouch, Touch};
pub use occupancy::{Occupancy, Structure};
pub use pieces::{Location, Piece, PieceCounts, PieceLedger};
pub use placement::PlacementTracker;
pub use players::PlayerState;
pub use resources::ResourceBundle;
pub use route_graph::RouteGraph;
pub use state::{GameConfig, GameError, GamePhase, GameState, PlacementOutcome, Savepoint};
