use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::IntoEnumIterator;

use crate::coords::{CubeCoord, Direction, UNIT_VECTORS, generate_coordinate_system};
use crate::types::{EdgeRef, HexKind, NodeRef, Resource};

mod topology;

pub use topology::BoardTopology;

pub type NodeId = u16;
pub type EdgeId = (NodeId, NodeId);
pub type HexId = u16;

pub type NodeList = SmallVec<[NodeId; 3]>;
pub type EdgeList = SmallVec<[EdgeId; 3]>;
pub type HexList = SmallVec<[HexId; 3]>;

/// Orders the endpoints of an edge so that equal edges compare equal.
pub fn normalize_edge(edge: EdgeId) -> EdgeId {
    if edge.0 <= edge.1 {
        edge
    } else {
        (edge.1, edge.0)
    }
}

pub fn edge_contains_node(edge: EdgeId, node: NodeId) -> bool {
    edge.0 == node || edge.1 == node
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandTile {
    pub id: HexId,
    pub kind: HexKind,
    pub number: Option<u8>,
    pub nodes: [NodeId; 6],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub id: u16,
    pub resource: Option<Resource>,
    pub direction: Direction,
    pub nodes: [NodeId; 6],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Water {
    pub nodes: [NodeId; 6],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Tile {
    Land(LandTile),
    Port(Port),
    Water(Water),
}

impl Tile {
    pub fn nodes(&self) -> &[NodeId; 6] {
        match self {
            Tile::Land(tile) => &tile.nodes,
            Tile::Port(port) => &port.nodes,
            Tile::Water(water) => &water.nodes,
        }
    }

    pub fn node(&self, node_ref: NodeRef) -> NodeId {
        self.nodes()[node_ref as usize]
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        EdgeRef::iter().map(move |edge_ref| {
            let (a, b) = edge_node_refs(edge_ref);
            normalize_edge((self.node(a), self.node(b)))
        })
    }

    pub fn is_land(&self) -> bool {
        matches!(self, Tile::Land(_))
    }
}

#[derive(Debug, Clone)]
pub enum TileTemplate {
    Land,
    Water,
    Port(Direction),
}

#[derive(Debug, Clone)]
pub struct MapTemplate {
    pub numbers: Vec<u8>,
    pub port_resources: Vec<Option<Resource>>,
    pub tile_kinds: Vec<HexKind>,
    pub topology: Vec<(CubeCoord, TileTemplate)>,
}

impl MapTemplate {
    pub fn base() -> &'static MapTemplate {
        &BASE_TEMPLATE
    }

    pub fn mini() -> &'static MapTemplate {
        &MINI_TEMPLATE
    }

    pub fn archipelago() -> &'static MapTemplate {
        &ARCHIPELAGO_TEMPLATE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapType {
    #[default]
    Base,
    Tournament,
    Mini,
    /// Sea board: a central island plus outer islands reachable only by ship.
    Archipelago,
}

impl MapType {
    pub fn is_sea_board(self) -> bool {
        matches!(self, MapType::Archipelago)
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MapType::Base => "BASE",
            MapType::Tournament => "TOURNAMENT",
            MapType::Mini => "MINI",
            MapType::Archipelago => "ARCHIPELAGO",
        };
        write!(f, "{label}")
    }
}

impl FromStr for MapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(MapType::Base),
            "tournament" => Ok(MapType::Tournament),
            "mini" => Ok(MapType::Mini),
            "archipelago" | "sea" => Ok(MapType::Archipelago),
            _ => Err(format!("unknown map type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MapShuffleOverrides<'a> {
    pub numbers: Option<&'a [u8]>,
    pub port_resources: Option<&'a [Option<Resource>]>,
    pub tile_kinds: Option<&'a [HexKind]>,
}

/// Static board graph. Node ids are dense (`0..num_nodes`) and assigned in template order,
/// so the same template and seed always produce the same ids.
#[derive(Debug, Clone)]
pub struct CatanMap {
    pub map_type: MapType,
    pub tiles: BTreeMap<CubeCoord, Tile>,
    pub hexes: Vec<LandTile>,
    pub port_nodes: BTreeMap<Option<Resource>, BTreeSet<NodeId>>,
    land_nodes: BTreeSet<NodeId>,
    land_edges: BTreeSet<EdgeId>,
    sea_edges: BTreeSet<EdgeId>,
    node_neighbors: Vec<NodeList>,
    node_edges: Vec<EdgeList>,
    node_hexes: Vec<HexList>,
}

impl CatanMap {
    pub fn from_template_with_rng(
        map_type: MapType,
        template: &MapTemplate,
        overrides: MapShuffleOverrides<'_>,
        rng: &mut impl rand::Rng,
    ) -> Self {
        let tiles = initialize_tiles(template, overrides, rng);
        Self::from_tiles(map_type, tiles)
    }

    pub fn from_tiles(map_type: MapType, tiles: BTreeMap<CubeCoord, Tile>) -> Self {
        let num_nodes = tiles
            .values()
            .flat_map(|tile| tile.nodes().iter().copied())
            .max()
            .map_or(0, |max| max as usize + 1);

        let mut hexes: Vec<LandTile> = tiles
            .values()
            .filter_map(|tile| match tile {
                Tile::Land(land) => Some(land.clone()),
                _ => None,
            })
            .collect();
        hexes.sort_by_key(|tile| tile.id);

        let mut port_nodes: BTreeMap<Option<Resource>, BTreeSet<NodeId>> = BTreeMap::new();
        for tile in tiles.values() {
            if let Tile::Port(port) = tile {
                let (first, second) = port_node_refs(port.direction);
                let entry = port_nodes.entry(port.resource).or_default();
                entry.insert(tile.node(first));
                entry.insert(tile.node(second));
            }
        }

        let mut node_hexes: Vec<HexList> = vec![HexList::new(); num_nodes];
        let mut land_nodes = BTreeSet::new();
        for hex in &hexes {
            for &node in &hex.nodes {
                node_hexes[node as usize].push(hex.id);
                land_nodes.insert(node);
            }
        }

        let mut land_edges = BTreeSet::new();
        let mut sea_edges = BTreeSet::new();
        let mut node_neighbors: Vec<NodeList> = vec![NodeList::new(); num_nodes];
        let mut node_edges: Vec<EdgeList> = vec![EdgeList::new(); num_nodes];
        let mut all_edges = BTreeSet::new();
        for tile in tiles.values() {
            for edge in tile.edges() {
                if tile.is_land() {
                    land_edges.insert(edge);
                } else {
                    sea_edges.insert(edge);
                }
                all_edges.insert(edge);
            }
        }
        for &(a, b) in &all_edges {
            node_neighbors[a as usize].push(b);
            node_neighbors[b as usize].push(a);
            node_edges[a as usize].push((a, b));
            node_edges[b as usize].push((a, b));
        }

        Self {
            map_type,
            tiles,
            hexes,
            port_nodes,
            land_nodes,
            land_edges,
            sea_edges,
            node_neighbors,
            node_edges,
            node_hexes,
        }
    }

    pub fn build(map_type: MapType, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::build_with_rng(map_type, &mut rng)
    }

    pub fn build_with_rng(map_type: MapType, rng: &mut impl rand::Rng) -> Self {
        let defaults = MapShuffleOverrides::default();
        match map_type {
            MapType::Base => Self::from_template_with_rng(map_type, MapTemplate::base(), defaults, rng),
            MapType::Mini => Self::from_template_with_rng(map_type, MapTemplate::mini(), defaults, rng),
            MapType::Archipelago => {
                Self::from_template_with_rng(map_type, MapTemplate::archipelago(), defaults, rng)
            }
            MapType::Tournament => build_tournament_map(rng),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.node_edges.len()
    }

    pub fn all_edges(&self) -> BTreeSet<EdgeId> {
        self.land_edges.union(&self.sea_edges).copied().collect()
    }

    pub fn port_resources_at(&self, node: NodeId) -> impl Iterator<Item = Option<Resource>> + '_ {
        self.port_nodes
            .iter()
            .filter(move |(_, nodes)| nodes.contains(&node))
            .map(|(resource, _)| *resource)
    }

    pub(crate) fn neighbors_slice(&self, node: NodeId) -> &[NodeId] {
        self.node_neighbors
            .get(node as usize)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn edges_slice(&self, node: NodeId) -> &[EdgeId] {
        self.node_edges
            .get(node as usize)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn hexes_slice(&self, node: NodeId) -> &[HexId] {
        self.node_hexes
            .get(node as usize)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn land_node_set(&self) -> &BTreeSet<NodeId> {
        &self.land_nodes
    }

    pub(crate) fn land_edge_set(&self) -> &BTreeSet<EdgeId> {
        &self.land_edges
    }

    pub(crate) fn sea_edge_set(&self) -> &BTreeSet<EdgeId> {
        &self.sea_edges
    }
}

fn build_tournament_map(rng: &mut impl rand::Rng) -> CatanMap {
    use HexKind::{Desert, Producing};
    use Resource::*;

    static TOURNAMENT_NUMBERS: Lazy<Vec<u8>> =
        Lazy::new(|| vec![10, 8, 3, 6, 2, 5, 10, 8, 4, 11, 12, 9, 5, 4, 9, 11, 3, 6]);
    static TOURNAMENT_PORTS: Lazy<Vec<Option<Resource>>> = Lazy::new(|| {
        vec![
            None,
            Some(Sheep),
            None,
            Some(Ore),
            Some(Wheat),
            None,
            Some(Wood),
            Some(Brick),
            None,
        ]
    });
    static TOURNAMENT_TILES: Lazy<Vec<HexKind>> = Lazy::new(|| {
        vec![
            Producing(Wood),
            Producing(Sheep),
            Producing(Sheep),
            Producing(Wood),
            Producing(Wheat),
            Producing(Wood),
            Producing(Wheat),
            Producing(Brick),
            Producing(Sheep),
            Producing(Brick),
            Producing(Sheep),
            Producing(Wheat),
            Producing(Wheat),
            Producing(Ore),
            Producing(Brick),
            Producing(Ore),
            Producing(Wood),
            Producing(Ore),
            Desert,
        ]
    });

    CatanMap::from_template_with_rng(
        MapType::Tournament,
        MapTemplate::base(),
        MapShuffleOverrides {
            numbers: Some(&TOURNAMENT_NUMBERS),
            port_resources: Some(&TOURNAMENT_PORTS),
            tile_kinds: Some(&TOURNAMENT_TILES),
        },
        rng,
    )
}

fn initialize_tiles(
    template: &MapTemplate,
    overrides: MapShuffleOverrides<'_>,
    rng: &mut impl rand::Rng,
) -> BTreeMap<CubeCoord, Tile> {
    let mut numbers = overrides
        .numbers
        .map(|slice| slice.to_vec())
        .unwrap_or_else(|| template.numbers.clone());
    if overrides.numbers.is_none() {
        numbers.shuffle(rng);
    }

    let mut port_resources = overrides
        .port_resources
        .map(|slice| slice.to_vec())
        .unwrap_or_else(|| template.port_resources.clone());
    if overrides.port_resources.is_none() {
        port_resources.shuffle(rng);
    }

    let mut tile_kinds = overrides
        .tile_kinds
        .map(|slice| slice.to_vec())
        .unwrap_or_else(|| template.tile_kinds.clone());
    if overrides.tile_kinds.is_none() {
        tile_kinds.shuffle(rng);
    }

    let mut tiles: BTreeMap<CubeCoord, Tile> = BTreeMap::new();
    let mut node_autoinc: NodeId = 0;
    let mut land_autoinc: HexId = 0;
    let mut port_autoinc: u16 = 0;

    for (coord, template_kind) in &template.topology {
        let nodes = get_nodes(&tiles, *coord, &mut node_autoinc);

        match template_kind {
            TileTemplate::Land => {
                // Templates carry exactly one kind per land tile; a short list reads as desert.
                let kind = tile_kinds.pop().unwrap_or(HexKind::Desert);
                let number = match kind {
                    HexKind::Producing(_) | HexKind::Gold => numbers.pop(),
                    HexKind::Desert | HexKind::Water => None,
                };
                let tile = LandTile {
                    id: land_autoinc,
                    kind,
                    number,
                    nodes,
                };
                tiles.insert(*coord, Tile::Land(tile));
                land_autoinc += 1;
            }
            TileTemplate::Water => {
                tiles.insert(*coord, Tile::Water(Water { nodes }));
            }
            TileTemplate::Port(direction) => {
                let port = Port {
                    id: port_autoinc,
                    resource: port_resources.pop().flatten(),
                    direction: *direction,
                    nodes,
                };
                tiles.insert(*coord, Tile::Port(port));
                port_autoinc += 1;
            }
        }
    }

    tiles
}

/// Corners shared with the neighbor in each direction: (our corner, their corner).
const SHARED_CORNERS: [(Direction, [(NodeRef, NodeRef); 2]); 6] = [
    (
        Direction::East,
        [
            (NodeRef::NorthEast, NodeRef::NorthWest),
            (NodeRef::SouthEast, NodeRef::SouthWest),
        ],
    ),
    (
        Direction::SouthEast,
        [
            (NodeRef::South, NodeRef::NorthWest),
            (NodeRef::SouthEast, NodeRef::North),
        ],
    ),
    (
        Direction::SouthWest,
        [
            (NodeRef::South, NodeRef::NorthEast),
            (NodeRef::SouthWest, NodeRef::North),
        ],
    ),
    (
        Direction::West,
        [
            (NodeRef::NorthWest, NodeRef::NorthEast),
            (NodeRef::SouthWest, NodeRef::SouthEast),
        ],
    ),
    (
        Direction::NorthWest,
        [
            (NodeRef::North, NodeRef::SouthEast),
            (NodeRef::NorthWest, NodeRef::South),
        ],
    ),
    (
        Direction::NorthEast,
        [
            (NodeRef::North, NodeRef::SouthWest),
            (NodeRef::NorthEast, NodeRef::South),
        ],
    ),
];

fn get_nodes(
    tiles: &BTreeMap<CubeCoord, Tile>,
    coordinate: CubeCoord,
    node_autoinc: &mut NodeId,
) -> [NodeId; 6] {
    let mut nodes: [Option<NodeId>; 6] = [None; 6];

    for (direction, corners) in &SHARED_CORNERS {
        let Some(offset) = UNIT_VECTORS.get(direction) else {
            continue;
        };
        if let Some(neighbor) = tiles.get(&coordinate.add(*offset)) {
            for (ours, theirs) in corners {
                nodes[*ours as usize] = Some(neighbor.node(*theirs));
            }
        }
    }

    std::array::from_fn(|idx| match nodes[idx] {
        Some(id) => id,
        None => {
            let id = *node_autoinc;
            *node_autoinc += 1;
            id
        }
    })
}

fn edge_node_refs(edge_ref: EdgeRef) -> (NodeRef, NodeRef) {
    match edge_ref {
        EdgeRef::East => (NodeRef::NorthEast, NodeRef::SouthEast),
        EdgeRef::SouthEast => (NodeRef::SouthEast, NodeRef::South),
        EdgeRef::SouthWest => (NodeRef::South, NodeRef::SouthWest),
        EdgeRef::West => (NodeRef::SouthWest, NodeRef::NorthWest),
        EdgeRef::NorthWest => (NodeRef::NorthWest, NodeRef::North),
        EdgeRef::NorthEast => (NodeRef::North, NodeRef::NorthEast),
    }
}

fn port_node_refs(direction: Direction) -> (NodeRef, NodeRef) {
    match direction {
        Direction::West => (NodeRef::NorthWest, NodeRef::SouthWest),
        Direction::NorthWest => (NodeRef::North, NodeRef::NorthWest),
        Direction::NorthEast => (NodeRef::NorthEast, NodeRef::North),
        Direction::East => (NodeRef::SouthEast, NodeRef::NorthEast),
        Direction::SouthEast => (NodeRef::South, NodeRef::SouthEast),
        Direction::SouthWest => (NodeRef::SouthWest, NodeRef::South),
    }
}

static BASE_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| {
    use HexKind::{Desert, Producing};
    use Resource::*;
    MapTemplate {
        numbers: vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12],
        port_resources: vec![
            Some(Wood),
            Some(Brick),
            Some(Sheep),
            Some(Wheat),
            Some(Ore),
            None,
            None,
            None,
            None,
        ],
        tile_kinds: vec![
            Producing(Wood),
            Producing(Wood),
            Producing(Wood),
            Producing(Wood),
            Producing(Brick),
            Producing(Brick),
            Producing(Brick),
            Producing(Sheep),
            Producing(Sheep),
            Producing(Sheep),
            Producing(Sheep),
            Producing(Wheat),
            Producing(Wheat),
            Producing(Wheat),
            Producing(Wheat),
            Producing(Ore),
            Producing(Ore),
            Producing(Ore),
            Desert,
        ],
        topology: base_topology(),
    }
});

static MINI_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| {
    use HexKind::{Desert, Producing};
    use Resource::*;
    MapTemplate {
        numbers: vec![3, 4, 5, 6, 8, 9, 10],
        port_resources: vec![],
        tile_kinds: vec![
            Producing(Wood),
            Desert,
            Producing(Brick),
            Producing(Sheep),
            Producing(Wheat),
            Producing(Wheat),
            Producing(Ore),
        ],
        topology: mini_topology(),
    }
});

static ARCHIPELAGO_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| {
    use HexKind::{Desert, Gold, Producing};
    use Resource::*;
    MapTemplate {
        numbers: vec![2, 3, 4, 5, 6, 6, 8, 8, 9, 10, 11, 12],
        port_resources: vec![],
        tile_kinds: vec![
            Producing(Wood),
            Producing(Wood),
            Producing(Brick),
            Producing(Brick),
            Producing(Sheep),
            Producing(Sheep),
            Producing(Wheat),
            Producing(Wheat),
            Producing(Ore),
            Producing(Ore),
            Gold,
            Gold,
            Desert,
        ],
        topology: archipelago_topology(),
    }
});

fn base_topology() -> Vec<(CubeCoord, TileTemplate)> {
    use TileTemplate::*;
    vec![
        (CubeCoord::new(0, 0, 0), Land),
        (CubeCoord::new(1, -1, 0), Land),
        (CubeCoord::new(0, -1, 1), Land),
        (CubeCoord::new(-1, 0, 1), Land),
        (CubeCoord::new(-1, 1, 0), Land),
        (CubeCoord::new(0, 1, -1), Land),
        (CubeCoord::new(1, 0, -1), Land),
        (CubeCoord::new(2, -2, 0), Land),
        (CubeCoord::new(1, -2, 1), Land),
        (CubeCoord::new(0, -2, 2), Land),
        (CubeCoord::new(-1, -1, 2), Land),
        (CubeCoord::new(-2, 0, 2), Land),
        (CubeCoord::new(-2, 1, 1), Land),
        (CubeCoord::new(-2, 2, 0), Land),
        (CubeCoord::new(-1, 2, -1), Land),
        (CubeCoord::new(0, 2, -2), Land),
        (CubeCoord::new(1, 1, -2), Land),
        (CubeCoord::new(2, 0, -2), Land),
        (CubeCoord::new(2, -1, -1), Land),
        (CubeCoord::new(3, -3, 0), Port(Direction::West)),
        (CubeCoord::new(2, -3, 1), Water),
        (CubeCoord::new(1, -3, 2), Port(Direction::NorthWest)),
        (CubeCoord::new(0, -3, 3), Water),
        (CubeCoord::new(-1, -2, 3), Port(Direction::NorthWest)),
        (CubeCoord::new(-2, -1, 3), Water),
        (CubeCoord::new(-3, 0, 3), Port(Direction::NorthEast)),
        (CubeCoord::new(-3, 1, 2), Water),
        (CubeCoord::new(-3, 2, 1), Port(Direction::East)),
        (CubeCoord::new(-3, 3, 0), Water),
        (CubeCoord::new(-2, 3, -1), Port(Direction::East)),
        (CubeCoord::new(-1, 3, -2), Water),
        (CubeCoord::new(0, 3, -3), Port(Direction::SouthEast)),
        (CubeCoord::new(1, 2, -3), Water),
        (CubeCoord::new(2, 1, -3), Port(Direction::SouthWest)),
        (CubeCoord::new(3, 0, -3), Water),
        (CubeCoord::new(3, -1, -2), Port(Direction::SouthWest)),
        (CubeCoord::new(3, -2, -1), Water),
    ]
}

fn mini_topology() -> Vec<(CubeCoord, TileTemplate)> {
    generate_coordinate_system(2)
        .into_iter()
        .map(|coord| {
            let kind = if coord.layer() <= 1 {
                TileTemplate::Land
            } else {
                TileTemplate::Water
            };
            (coord, kind)
        })
        .collect()
}

/// Land hexes of the sea board outside the central island.
const ARCHIPELAGO_ISLANDS: [CubeCoord; 6] = [
    CubeCoord { x: 3, y: -3, z: 0 },
    CubeCoord { x: 3, y: -2, z: -1 },
    CubeCoord { x: 2, y: -3, z: 1 },
    CubeCoord { x: -3, y: 3, z: 0 },
    CubeCoord { x: -3, y: 2, z: 1 },
    CubeCoord { x: 0, y: 3, z: -3 },
];

fn archipelago_topology() -> Vec<(CubeCoord, TileTemplate)> {
    generate_coordinate_system(4)
        .into_iter()
        .map(|coord| {
            let kind = if coord.layer() <= 1 || ARCHIPELAGO_ISLANDS.contains(&coord) {
                TileTemplate::Land
            } else {
                TileTemplate::Water
            };
            (coord, kind)
        })
        .collect()
}

/// Counts of land/sea edge classes, used by the topology export tool.
pub fn edge_class_counts(map: &CatanMap) -> HashMap<&'static str, usize> {
    let coast = map.land_edges.intersection(&map.sea_edges).count();
    HashMap::from([
        ("land", map.land_edges.len()),
        ("sea", map.sea_edges.len()),
        ("coast", coast),
    ])
}
