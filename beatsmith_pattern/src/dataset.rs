// Batch dataset generation.
//
// Writes `tracks_per_genre` MIDI files for each selected genre into one
// directory, plus a `dataset_info.json` manifest describing every file.
//
// Planning is sequential and seeded: a `PatternRng` built from the base seed
// draws each job's track seed and bar count in genre-key order, so the same
// options always describe the same dataset. The jobs themselves run in
// parallel with rayon; the indexed collect keeps manifest entries in
// planning order regardless of which thread finishes first.

use crate::error::DatasetError;
use crate::generator::Generator;
use crate::midi::write_midi;
use crate::profile::{Family, GenreProfile, normalize_key};
use crate::request::GenerationRequest;
use beatsmith_prng::PatternRng;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const MANIFEST_NAME: &str = "dataset_info.json";

#[derive(Debug, Clone)]
pub struct DatasetOptions {
    pub output_dir: PathBuf,
    pub tracks_per_genre: u32,
    pub base_seed: u64,
    /// Restrict to one family.
    pub family: Option<Family>,
    /// Restrict to these genre keys (after the family filter).
    pub genres: Option<Vec<String>>,
    /// Preferred bar-count range, intersected with each profile's range.
    pub min_bars: u32,
    pub max_bars: u32,
}

impl DatasetOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        DatasetOptions {
            output_dir: output_dir.into(),
            tracks_per_genre: 5,
            base_seed: 0,
            family: None,
            genres: None,
            min_bars: 16,
            max_bars: 64,
        }
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetEntry {
    pub file: String,
    pub genre: String,
    pub family: Family,
    pub seed: u64,
    pub bars: u32,
    pub tempo_bpm: u16,
    pub events: usize,
    pub duration_seconds: f64,
}

/// Contents of `dataset_info.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetManifest {
    pub base_seed: u64,
    pub tracks_per_genre: u32,
    pub total_tracks: usize,
    pub genres: Vec<String>,
    pub tracks: Vec<DatasetEntry>,
}

struct Job<'a> {
    profile: &'a GenreProfile,
    index: u32,
    seed: u64,
    bars: u32,
}

impl Job<'_> {
    fn file_name(&self) -> String {
        format!("{}_{:02}.mid", self.profile.key, self.index + 1)
    }
}

pub fn generate_dataset(
    generator: &Generator,
    options: &DatasetOptions,
) -> Result<DatasetManifest, DatasetError> {
    let profiles = select_profiles(generator, options);
    if profiles.is_empty() {
        return Err(DatasetError::NoGenres);
    }
    std::fs::create_dir_all(&options.output_dir).map_err(|source| DatasetError::CreateDir {
        path: options.output_dir.clone(),
        source,
    })?;

    let jobs = plan(&profiles, options);
    tracing::info!(
        genres = profiles.len(),
        tracks = jobs.len(),
        dir = %options.output_dir.display(),
        "generating dataset"
    );

    let tracks: Result<Vec<DatasetEntry>, DatasetError> = jobs
        .par_iter()
        .map(|job| run_job(generator, job, &options.output_dir))
        .collect();
    let tracks = tracks?;

    let manifest = DatasetManifest {
        base_seed: options.base_seed,
        tracks_per_genre: options.tracks_per_genre,
        total_tracks: tracks.len(),
        genres: profiles.iter().map(|p| p.key.clone()).collect(),
        tracks,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(options.output_dir.join(MANIFEST_NAME), json).map_err(DatasetError::Manifest)?;
    tracing::info!(tracks = manifest.total_tracks, "dataset complete");
    Ok(manifest)
}

fn select_profiles<'a>(generator: &'a Generator, options: &DatasetOptions) -> Vec<&'a GenreProfile> {
    generator
        .catalog()
        .profiles()
        .filter(|p| options.family.is_none_or(|f| p.family == f))
        .filter(|p| {
            options.genres.as_ref().is_none_or(|keys| {
                keys.iter().any(|k| normalize_key(k) == p.key)
            })
        })
        .collect()
}

fn plan<'a>(profiles: &[&'a GenreProfile], options: &DatasetOptions) -> Vec<Job<'a>> {
    let mut rng = PatternRng::new(options.base_seed);
    let mut jobs = Vec::new();
    for &profile in profiles {
        let (low, high) = bar_range(profile, options);
        for index in 0..options.tracks_per_genre {
            let seed = rng.next_u64();
            let bars = rng.range_u32_inclusive(low, high);
            jobs.push(Job {
                profile,
                index,
                seed,
                bars,
            });
        }
    }
    jobs
}

/// The preferred range intersected with the profile's range; falls back to
/// the profile's range when they don't overlap.
fn bar_range(profile: &GenreProfile, options: &DatasetOptions) -> (u32, u32) {
    let low = options.min_bars.max(profile.min_bars);
    let high = options.max_bars.min(profile.max_bars);
    if low <= high {
        (low, high)
    } else {
        (profile.min_bars, profile.max_bars)
    }
}

fn run_job(generator: &Generator, job: &Job, dir: &Path) -> Result<DatasetEntry, DatasetError> {
    let request = GenerationRequest::new(job.profile.key.clone(), job.bars).with_seed(job.seed);
    let track = generator.generate(&request)?;
    let file = job.file_name();
    write_midi(&track, &dir.join(&file))?;
    tracing::debug!(%file, events = track.events().len(), "wrote track");
    Ok(DatasetEntry {
        file,
        genre: track.genre().to_string(),
        family: track.family(),
        seed: track.seed(),
        bars: track.bar_count(),
        tempo_bpm: track.tempo_bpm(),
        events: track.events().len(),
        duration_seconds: track.duration_seconds(),
    })
}
