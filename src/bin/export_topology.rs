use std::collections::BTreeMap;
use std::str::FromStr;

use clap::Parser;
use serde::Serialize;
use settle_rs::board::{CatanMap, MapType, NodeId, Tile, edge_class_counts};
use settle_rs::types::NodeRef;
use settle_rs::BoardTopology;
use strum::IntoEnumIterator;

#[derive(Debug, Parser, Clone)]
#[command(name = "settle-rs-export-topology")]
#[command(about = "Dump node ids, edge classes and hexes of a generated board as JSON")]
struct Args {
    /// Map type: BASE, TOURNAMENT, MINI or ARCHIPELAGO
    #[arg(long, default_value = "BASE")]
    map: String,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct NodeEntry {
    coord: (i32, i32, i32),
    corner: String,
    node: NodeId,
}

#[derive(Debug, Serialize)]
struct Export {
    map: String,
    num_nodes: usize,
    edge_classes: BTreeMap<&'static str, usize>,
    nodes: Vec<NodeEntry>,
    land_edges: Vec<(NodeId, NodeId)>,
    sea_edges: Vec<(NodeId, NodeId)>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let map_type = MapType::from_str(&args.map).unwrap_or_else(|err| {
        eprintln!("Error: {err}. Use BASE, TOURNAMENT, MINI or ARCHIPELAGO");
        std::process::exit(1);
    });
    let map = CatanMap::build(map_type, args.seed);

    let mut nodes = Vec::new();
    for (coord, tile) in &map.tiles {
        for corner in NodeRef::iter() {
            nodes.push(NodeEntry {
                coord: (coord.x, coord.y, coord.z),
                corner: format!("{corner:?}"),
                node: tile.node(corner),
            });
        }
        if let Tile::Land(land) = tile {
            log::debug!("hex {} at {coord:?} is {}", land.id, land.kind);
        }
    }
    nodes.sort_by_key(|entry| (entry.node, entry.coord));

    let export = Export {
        map: map_type.to_string(),
        num_nodes: map.num_nodes(),
        edge_classes: edge_class_counts(&map).into_iter().collect(),
        nodes,
        land_edges: map.land_edges().iter().copied().collect(),
        sea_edges: map.sea_edges().iter().copied().collect(),
    };

    match serde_json::to_string_pretty(&export) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
