use anyhow::{Result, bail};
use clap::Parser;
use level_core::chromosome;
use level_core::random::{self, stream_rng};
use level_core::{Chromosome, LevelConfig, RoomChromosome, RoomMap, RoomsGraph};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Random room genes to check
    #[arg(short, long, default_value_t = 2000)]
    cases: u64,
}

/// Grid sizes vary per case so small and cramped plans get covered too.
fn case_config(rng: &mut ChaCha8Rng) -> LevelConfig {
    let base = LevelConfig::default();
    let min = base.min_room_size;
    LevelConfig {
        width: random::in_range(rng, min + 4, 40),
        height: random::in_range(rng, min + 4, 30),
        gene_length: 1 + random::below(rng, 14),
        ..base
    }
}

fn check_case(rng: &mut ChaCha8Rng, config: &LevelConfig) -> Vec<String> {
    let gene = RoomChromosome::generate_gene(rng, config);
    let room_map = RoomMap::from_config(config, &gene);
    let graph = RoomsGraph::new(&room_map);
    let mut violations = Vec::new();

    if room_map.grid().len() != config.cell_count() {
        violations.push(format!("grid has {} cells", room_map.grid().len()));
    }
    if let Some(owner) = room_map
        .grid()
        .iter()
        .flatten()
        .find(|&&owner| room_map.placed_room(owner).is_none())
    {
        violations.push(format!("cell owned by unplaced room {owner}"));
    }
    if room_map.room_count() == 0 {
        violations.push("first room was not placed".to_string());
    }

    for (&room, neighbours) in graph.adjacency() {
        for &neighbour in neighbours {
            if !graph.has_edge(neighbour, room) {
                violations.push(format!("edge {room}->{neighbour} has no reverse"));
            }
        }
        let distances = graph.distance_map(room);
        if distances.get(room) != Some(0.0) {
            violations.push(format!("room {room} is not at distance 0 from itself"));
        }
    }
    let max_hops = graph.vertex_count().saturating_sub(1) as f64;
    if graph.diameter() > max_hops {
        violations.push(format!("diameter {} exceeds {max_hops}", graph.diameter()));
    }

    let narrow = room_map.narrow_corridors();
    if let Some(cell) = room_map.tiny_corridors().iter().find(|cell| narrow.contains(cell)) {
        violations.push(format!("{cell:?} is both narrow and tiny"));
    }
    if let Some(hole) = room_map.holes().iter().find(|&&hole| room_map.owner_at(hole).is_some()) {
        violations.push(format!("hole {hole:?} is owned"));
    }

    let mutated = chromosome::mutate(rng, config, gene.clone());
    if mutated.len() != gene.len() {
        violations.push(format!("mutation changed length {} -> {}", gene.len(), mutated.len()));
    }
    violations
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .compact()
        .init();
    let args = Args::parse();

    tracing::info!(seed = args.seed, cases = args.cases, "starting layout fuzz");
    let mut failures = 0_u64;
    for case in 0..args.cases {
        let mut rng = stream_rng(args.seed, case);
        let config = case_config(&mut rng);
        for violation in check_case(&mut rng, &config) {
            failures += 1;
            tracing::error!(
                case,
                width = config.width,
                height = config.height,
                gene_length = config.gene_length,
                "{violation}"
            );
        }
    }

    if failures > 0 {
        bail!("{failures} invariant violations across {} cases", args.cases);
    }
    tracing::info!("fuzzing completed successfully");
    Ok(())
}
