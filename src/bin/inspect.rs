use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use settle_rs::game::{Game, GameState, PlayerState};
use settle_rs::types::Resource;

#[derive(Debug, Parser, Clone)]
#[command(name = "settle-rs-inspect")]
#[command(about = "Replay a saved game and print each player's placement options")]
struct Args {
    /// Snapshot JSON file; reads stdin when omitted
    snapshot: Option<PathBuf>,

    /// Hex to leave out of dice yields (e.g. the robber's)
    #[arg(long)]
    exclude_hex: Option<u16>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let raw = match read_input(args.snapshot.as_ref()) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("Error: cannot read snapshot: {err}");
            std::process::exit(1);
        }
    };
    let game = Game::from_json(&raw).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });

    let state = &game.state;
    println!(
        "{} board, {} placements, phase {:?}, longest route holder {:?}",
        state.config.map_type,
        state.history().len(),
        state.phase,
        state.longest_route_holder()
    );
    for player in &state.players {
        print_player(state, player, args.exclude_hex);
    }
}

fn read_input(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn print_player(state: &GameState, player: &PlayerState, exclude_hex: Option<u16>) {
    let placement = &player.placement;
    let supply = player.ledger.remaining_counts();
    println!();
    println!(
        "{} (player {}): {} points, longest route {}",
        player.color,
        player.index(),
        player.public_points(),
        player.longest_route_length()
    );
    println!(
        "  supply:      {} roads, {} ships, {} settlements, {} cities",
        supply.roads, supply.ships, supply.settlements, supply.cities
    );
    println!("  settlements: {}", placement.potential_settlements().iter().join(", "));
    println!("  cities:      {}", placement.potential_cities().iter().join(", "));
    println!(
        "  roads:       {}",
        placement
            .potential_roads()
            .iter()
            .map(|(a, b)| format!("{a}-{b}"))
            .join(", ")
    );
    if state.map.map_type.is_sea_board() {
        println!(
            "  ships:       {}",
            placement
                .potential_ships()
                .iter()
                .map(|(a, b)| format!("{a}-{b}"))
                .join(", ")
        );
    }
    let ports = player
        .ports()
        .map(|port| port.map_or("3:1".to_string(), |resource| resource.to_string()))
        .join(", ");
    if !ports.is_empty() {
        println!("  ports:       {ports}");
    }
    let yields = (2..=12u8)
        .filter_map(|number| {
            let bundle = player.touch.resources_for_number(number, exclude_hex);
            (!bundle.is_empty()).then(|| format!("{number}: {bundle}"))
        })
        .join("; ");
    println!("  yields:      {yields}");
    let numbers = Resource::ALL
        .iter()
        .map(|resource| {
            let numbers = player.touch.numbers_for_resource(*resource, exclude_hex);
            format!("{resource} [{}]", numbers.iter().join(" "))
        })
        .join(", ");
    println!("  numbers:     {numbers}");
}
