// Beatsmith Pattern Generator: CLI entry point.
//
// Subcommands:
//   track    generate one track, write MIDI and/or JSON, optionally print a
//            text summary
//   genres   list the catalogue, optionally filtered by family
//   dataset  write a directory of MIDI files plus dataset_info.json
//
// Usage:
//   cargo run -p beatsmith_pattern -- track --genre liquid_dnb --bars 16 \
//     --seed 42 --output liquid.mid --summary
//   cargo run -p beatsmith_pattern -- genres --family dnb
//   cargo run -p beatsmith_pattern -- dataset --output data/midi --per-genre 5
//
// Logging goes through tracing; set RUST_LOG=debug to see per-layer counts.

use anyhow::{Context, Result};
use beatsmith_pattern::dataset::{DatasetOptions, generate_dataset};
use beatsmith_pattern::midi::write_midi;
use beatsmith_pattern::scale::pitch_class_name;
use beatsmith_pattern::{Family, GenerationRequest, Generator, GeneratorConfig, GenreCatalog};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "generate")]
#[command(about = "Deterministic genre-aware drum, bass and melody pattern generator")]
struct Cli {
    /// Generator config JSON (defaults are used when absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single track
    Track {
        #[arg(long)]
        genre: String,
        #[arg(long, default_value_t = 16)]
        bars: u32,
        #[arg(long)]
        tempo: Option<u16>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        complexity: Option<f32>,
        #[arg(long)]
        energy: Option<f32>,
        #[arg(long)]
        melody_density: Option<f32>,
        /// MIDI output path
        #[arg(long)]
        output: Option<PathBuf>,
        /// JSON output path
        #[arg(long)]
        json: Option<PathBuf>,
        /// Print a text rendering of the first bars
        #[arg(long)]
        summary: bool,
    },

    /// List available genres
    Genres {
        #[arg(long)]
        family: Option<Family>,
    },

    /// Generate a batch of MIDI files with a manifest
    Dataset {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 5)]
        per_genre: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        family: Option<Family>,
        /// Restrict to these genre keys (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    let catalog = GenreCatalog::builtin().context("loading built-in genre catalogue")?;
    let generator = Generator::new(catalog, config).context("invalid generator config")?;

    match cli.command {
        Commands::Track {
            genre,
            bars,
            tempo,
            seed,
            complexity,
            energy,
            melody_density,
            output,
            json,
            summary,
        } => {
            let request = GenerationRequest {
                genre,
                tempo,
                bar_count: bars,
                seed,
                complexity,
                energy,
                melody_density,
            };
            run_track(&generator, &request, output, json, summary)
        }
        Commands::Genres { family } => {
            list_genres(&generator, family);
            Ok(())
        }
        Commands::Dataset {
            output,
            per_genre,
            seed,
            family,
            genres,
        } => {
            let mut options = DatasetOptions::new(output);
            options.tracks_per_genre = per_genre;
            options.base_seed = seed;
            options.family = family;
            if !genres.is_empty() {
                options.genres = Some(genres);
            }
            let manifest = generate_dataset(&generator, &options)?;
            println!(
                "Wrote {} tracks for {} genres to {}",
                manifest.total_tracks,
                manifest.genres.len(),
                options.output_dir.display()
            );
            Ok(())
        }
    }
}

fn run_track(
    generator: &Generator,
    request: &GenerationRequest,
    output: Option<PathBuf>,
    json: Option<PathBuf>,
    summary: bool,
) -> Result<()> {
    let track = generator.generate(request)?;
    let scale = track.scale();
    println!(
        "{}: {} bars at {} BPM, {} {:?}, seed {}, {} events ({:.1}s)",
        track.genre(),
        track.bar_count(),
        track.tempo_bpm(),
        pitch_class_name(scale.root_pc),
        scale.kind,
        track.seed(),
        track.events().len(),
        track.duration_seconds()
    );

    if summary {
        println!();
        print!("{}", track.summary());
        let stats = track.stats();
        println!(
            "drums {} | bass {} | lead {} | pads {} | comp {} | fx {} | mean velocity {:.1}",
            stats.drum_hits,
            stats.bass_notes,
            stats.lead_notes,
            stats.pad_notes,
            stats.comp_notes,
            stats.fx_notes,
            stats.mean_velocity
        );
    }

    if let Some(path) = output {
        write_midi(&track, &path)?;
        tracing::info!(path = %path.display(), "wrote MIDI");
    }
    if let Some(path) = json {
        let text = serde_json::to_string_pretty(&track).context("serializing track")?;
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote JSON");
    }
    Ok(())
}

fn list_genres(generator: &Generator, family: Option<Family>) {
    for profile in generator.catalog().profiles() {
        if family.is_some_and(|f| f != profile.family) {
            continue;
        }
        println!(
            "{:<24} {:<11} {:>3}-{:<3} BPM  bars {:>3}-{:<4} {:<14} {}",
            profile.key,
            profile.family.name(),
            profile.bpm_min,
            profile.bpm_max,
            profile.min_bars,
            profile.max_bars,
            format!("{:?}", profile.atmosphere).to_lowercase(),
            if profile.melodic { "melodic" } else { "" }
        );
    }
}
