use std::str::FromStr;
use std::time::Instant;

use clap::Parser;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use settle_rs::MapType;
use settle_rs::game::{GameConfig, GameState, Piece};

#[derive(Debug, Parser, Clone)]
#[command(name = "settle-rs-profile-placements")]
#[command(about = "Time random placements and rollbacks on a generated board")]
struct Args {
    #[arg(long, default_value_t = 10_000)]
    num_steps: u32,

    /// Map type: BASE, TOURNAMENT, MINI or ARCHIPELAGO
    #[arg(long, default_value = "BASE")]
    map: String,

    #[arg(long, default_value_t = 4)]
    num_players: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let map_type = MapType::from_str(&args.map).unwrap_or_else(|err| {
        eprintln!("Error: {err}. Use BASE, TOURNAMENT, MINI or ARCHIPELAGO");
        std::process::exit(1);
    });
    let config = GameConfig {
        num_players: args.num_players,
        map_type,
        seed: args.seed,
        initial_pieces: 0,
        ..GameConfig::default()
    };
    let mut state = GameState::new(config).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });
    let mut rng = StdRng::seed_from_u64(args.seed);

    seed_settlements(&mut state, &mut rng);
    let base = state.savepoint();

    let start = Instant::now();
    let mut placed = 0u32;
    let mut rollbacks = 0u32;
    for step in 0..args.num_steps {
        let player = step as usize % args.num_players;
        match random_piece(&state, player, &mut rng) {
            Some(piece) if state.place_piece(piece).is_ok() => placed += 1,
            _ => {
                if state.rollback_to(base).is_ok() {
                    rollbacks += 1;
                }
            }
        }
    }
    let elapsed = start.elapsed();

    println!(
        "{} steps on {map_type}: {placed} placements, {rollbacks} rollbacks in {:.2?}",
        args.num_steps, elapsed
    );
    if placed > 0 {
        println!("{:.2?} per placement", elapsed / placed);
    }
    for player in &state.players {
        println!(
            "{}: longest route {}, {} pieces",
            player.color,
            player.longest_route_length(),
            player.ledger.placed_count()
        );
    }
}

/// Gives every player one settlement to grow from.
fn seed_settlements(state: &mut GameState, rng: &mut StdRng) {
    for player in 0..state.players.len() {
        let node = state.players[player]
            .placement
            .legal_settlements()
            .iter()
            .copied()
            .choose(rng);
        if let Some(node) = node {
            if let Err(err) = state.place_piece(Piece::Settlement { player, node }) {
                log::warn!("could not seed player {player}: {err}");
            }
        }
    }
}

fn random_piece(state: &GameState, player: usize, rng: &mut StdRng) -> Option<Piece> {
    let placement = &state.players[player].placement;
    match rng.gen_range(0..4) {
        0 => placement
            .potential_settlements()
            .iter()
            .choose(rng)
            .map(|node| Piece::Settlement { player, node: *node }),
        1 => placement
            .potential_cities()
            .iter()
            .choose(rng)
            .map(|node| Piece::City { player, node: *node }),
        2 => placement
            .potential_ships()
            .iter()
            .choose(rng)
            .map(|edge| Piece::Ship { player, edge: *edge }),
        _ => placement
            .potential_roads()
            .iter()
            .choose(rng)
            .map(|edge| Piece::Road { player, edge: *edge }),
    }
}
