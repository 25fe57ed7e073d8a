// Generation requests and their normalization against a genre profile.
//
// A `GenerationRequest` is what a caller asks for; it may be out of range in
// every numeric field. `NormalizedRequest` is what the layers actually see:
// bar count inside the profile's range, scalars in [0, 1], defaults filled
// in from the profile, and the melody hint dropped for non-melodic genres.
// Tempo and seed are resolved by the generator itself because they depend on
// randomness.

use crate::profile::GenreProfile;
use serde::{Deserialize, Serialize};

/// Parameters of one `generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub genre: String,
    /// Explicit tempo in BPM. Clamped into the profile's range; sampled from
    /// it when absent.
    pub tempo: Option<u16>,
    pub bar_count: u32,
    /// Absent means "draw one from process entropy"; the drawn seed is
    /// echoed in the resulting track.
    pub seed: Option<u64>,
    pub complexity: Option<f32>,
    pub energy: Option<f32>,
    /// Fraction of melodic slots that sound. Ignored for non-melodic genres.
    pub melody_density: Option<f32>,
}

impl GenerationRequest {
    pub fn new(genre: impl Into<String>, bar_count: u32) -> Self {
        GenerationRequest {
            genre: genre.into(),
            tempo: None,
            bar_count,
            seed: None,
            complexity: None,
            energy: None,
            melody_density: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tempo(mut self, bpm: u16) -> Self {
        self.tempo = Some(bpm);
        self
    }

    pub fn with_complexity(mut self, complexity: f32) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn with_energy(mut self, energy: f32) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn with_melody_density(mut self, density: f32) -> Self {
        self.melody_density = Some(density);
        self
    }
}

/// A request with every field resolved against a profile, except tempo and
/// seed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub bar_count: u32,
    pub complexity: f32,
    pub energy: f32,
    pub melody_density: Option<f32>,
}

impl NormalizedRequest {
    pub fn resolve(request: &GenerationRequest, profile: &GenreProfile) -> Self {
        NormalizedRequest {
            bar_count: profile.clamp_bars(request.bar_count),
            complexity: unit(request.complexity, profile.drum_complexity),
            energy: unit(request.energy, profile.energy),
            melody_density: if profile.melodic {
                request
                    .melody_density
                    .filter(|d| !d.is_nan())
                    .map(|d| d.clamp(0.0, 1.0))
            } else {
                None
            },
        }
    }
}

/// Clamp an optional scalar into [0, 1]. NaN counts as absent.
fn unit(value: Option<f32>, default: f32) -> f32 {
    match value {
        Some(v) if !v.is_nan() => v.clamp(0.0, 1.0),
        _ => default.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::synthetic_profile;

    #[test]
    fn bar_count_is_clamped() {
        let profile = synthetic_profile("synth", true);
        let low = NormalizedRequest::resolve(&GenerationRequest::new("synth", 0), &profile);
        let high = NormalizedRequest::resolve(&GenerationRequest::new("synth", 10_000), &profile);
        assert_eq!(low.bar_count, profile.min_bars);
        assert_eq!(high.bar_count, profile.max_bars);
    }

    #[test]
    fn scalars_are_clamped_and_defaulted() {
        let profile = synthetic_profile("synth", true);
        let req = GenerationRequest::new("synth", 4)
            .with_complexity(3.0)
            .with_energy(-1.0)
            .with_melody_density(f32::NAN);
        let norm = NormalizedRequest::resolve(&req, &profile);
        assert_eq!(norm.complexity, 1.0);
        assert_eq!(norm.energy, 0.0);
        assert_eq!(norm.melody_density, None);

        let dense = GenerationRequest::new("synth", 4).with_melody_density(1.5);
        assert_eq!(
            NormalizedRequest::resolve(&dense, &profile).melody_density,
            Some(1.0)
        );

        let defaults = NormalizedRequest::resolve(&GenerationRequest::new("synth", 4), &profile);
        assert_eq!(defaults.complexity, profile.drum_complexity);
        assert_eq!(defaults.energy, profile.energy);
        assert_eq!(defaults.melody_density, None);
    }

    #[test]
    fn melody_hint_ignored_for_non_melodic_profiles() {
        let profile = synthetic_profile("synth", false);
        let req = GenerationRequest::new("synth", 4).with_melody_density(0.9);
        assert_eq!(NormalizedRequest::resolve(&req, &profile).melody_density, None);
    }
}
