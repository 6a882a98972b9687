use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use level_core::pipeline::{self, GeneratedLevel};
use level_core::{LevelConfig, Point};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Evolve a level layout and print it", long_about = None)]
struct Args {
    /// TOML file with level settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    seed: Option<u64>,
    /// Generations per pass
    #[arg(short, long)]
    generations: Option<usize>,
    #[arg(short, long)]
    population: Option<usize>,
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
    /// Print a JSON report instead of the ASCII plan
    #[arg(long)]
    json: bool,
    /// Print the best layout fitness of every room generation to stderr
    #[arg(long)]
    watch: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a LevelConfig,
    fingerprint: String,
    level: &'a GeneratedLevel,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).compact().init();
}

fn load_config(path: Option<&Path>) -> Result<LevelConfig> {
    let Some(path) = path else {
        return Ok(LevelConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config: {}", path.display()))
}

fn apply_overrides(mut config: LevelConfig, args: &Args) -> LevelConfig {
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if let Some(population) = args.population {
        config.population_size = population;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    config
}

/// One character per cell: room index in base 36, `!` on hazards, `.` when empty.
fn render(level: &GeneratedLevel) -> String {
    let room_map = level.room_map();
    let hazards: BTreeSet<Point> = level.hazard_placements().map(|hazard| hazard.tile).collect();
    let mut out = String::new();
    for y in 0..room_map.height() {
        for x in 0..room_map.width() {
            let pos = Point { x, y };
            out.push(match room_map.owner_at(pos) {
                _ if hazards.contains(&pos) => '!',
                Some(room) => char::from_digit(room as u32 % 36, 36).unwrap_or('?'),
                None => '.',
            });
        }
        out.push('\n');
    }
    out
}

fn summary(level: &GeneratedLevel) -> String {
    let room_map = level.room_map();
    let areas = room_map.rooms_area();
    let mut lines = vec![
        format!("Seed: {}", level.seed),
        format!(
            "Layout fitness: {:.3} ({} rooms, avg degree {:.2}, diameter {})",
            level.scores.layout,
            level.metrics.rooms,
            level.metrics.average_degree,
            level.metrics.diameter,
        ),
        format!("Room type fitness: {:.1}", level.scores.room_types),
        format!("Hazard fitness: {:.2}", level.scores.hazards),
        match level.entrance_room {
            Some(room) => format!("Entrance room: {room}"),
            None => "Entrance room: none".to_string(),
        },
        format!("Fingerprint: {:016x}", level.fingerprint()),
    ];
    for label in &level.room_types {
        let Some(area) = areas.get(&label.room.index) else {
            continue;
        };
        let hazards = level
            .hazards
            .iter()
            .find(|room| room.room == label.room.index)
            .map_or(0, |room| room.hazards.len());
        lines.push(format!(
            "  room {:>2}: {:<8} area {:>3}, hazards {}",
            label.room.index, label.room_type, area, hazards
        ));
    }
    lines.join("\n")
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = apply_overrides(load_config(args.config.as_deref())?, &args);
    config.validate().context("Invalid level config")?;

    let level = if args.watch {
        pipeline::generate_level_observed(&config, |generation| {
            eprintln!("generation {:>4}  best {:.3}", generation.index, generation.best().fitness);
        })
    } else {
        pipeline::generate_level(&config)
    }
    .context("Level generation failed")?;

    if args.json {
        let fingerprint = format!("{:016x}", level.fingerprint());
        let report = Report { config: &config, fingerprint, level: &level };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary(&level));
        print!("{}", render(&level));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::iter;

    use level_core::Crossover;

    use super::*;

    fn args(flags: &[&str]) -> Args {
        Args::parse_from(iter::once("levelgen").chain(flags.iter().copied()))
    }

    #[test]
    fn missing_config_path_falls_back_to_defaults() {
        assert_eq!(load_config(None).unwrap(), LevelConfig::default());
    }

    #[test]
    fn toml_values_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "width = 40\nseed = 7\ncrossover = \"one_point\"").unwrap();

        let loaded = load_config(Some(file.path())).unwrap();
        assert_eq!((loaded.width, loaded.seed), (40, 7));
        assert_eq!(loaded.height, LevelConfig::default().height);

        let config = apply_overrides(loaded, &args(&["--seed", "99", "--height", "30"]));
        assert_eq!((config.width, config.height, config.seed), (40, 30, 99));
        assert_eq!(config.crossover, Crossover::OnePoint);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.toml");
        fs::write(&path, "widht = 40\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("widht"), "{err:#}");
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn render_has_one_line_per_row() {
        let config = LevelConfig { population_size: 4, generations: 3, ..LevelConfig::default() };
        let level = pipeline::generate_level(&config).unwrap();
        let plan = render(&level);

        assert_eq!(plan.lines().count(), config.height as usize);
        assert!(plan.lines().all(|line| line.chars().count() == config.width as usize));
        let hazards = level.hazard_placements().count();
        assert_eq!(plan.chars().filter(|&cell| cell == '!').count(), hazards);
        assert!(summary(&level).contains("Fingerprint: "));
    }
}
