use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

/// What a hex is made of. Only land hexes other than the desert carry a dice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexKind {
    Desert,
    Water,
    /// Wildcard hex: a roll pays any one resource, so it touches all of them.
    Gold,
    Producing(Resource),
}

impl fmt::Display for HexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexKind::Desert => write!(f, "DESERT"),
            HexKind::Water => write!(f, "WATER"),
            HexKind::Gold => write!(f, "GOLD"),
            HexKind::Producing(resource) => write!(f, "{resource}"),
        }
    }
}

impl HexKind {
    pub fn is_land(self) -> bool {
        !matches!(self, HexKind::Water)
    }

    pub fn yields(self) -> SmallVec<[Resource; 5]> {
        match self {
            HexKind::Producing(resource) => smallvec![resource],
            HexKind::Gold => SmallVec::from_buf(Resource::ALL),
            HexKind::Desert | HexKind::Water => SmallVec::new(),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceKind {
    Road,
    Ship,
    Settlement,
    City,
}

impl PieceKind {
    pub fn is_route(self) -> bool {
        matches!(self, PieceKind::Road | PieceKind::Ship)
    }

    pub fn route_kind(self) -> Option<RouteKind> {
        match self {
            PieceKind::Road => Some(RouteKind::Road),
            PieceKind::Ship => Some(RouteKind::Ship),
            PieceKind::Settlement | PieceKind::City => None,
        }
    }
}

/// The two piece types that make up a trade route.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteKind {
    Road,
    Ship,
}

impl From<RouteKind> for PieceKind {
    fn from(kind: RouteKind) -> Self {
        match kind {
            RouteKind::Road => PieceKind::Road,
            RouteKind::Ship => PieceKind::Ship,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    Red,
    Blue,
    Orange,
    White,
}

impl Color {
    pub const ORDERED: [Color; 4] = [Color::Red, Color::Blue, Color::Orange, Color::White];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum NodeRef {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum EdgeRef {
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
    NorthEast,
}
