// Genre profiles and the genre catalogue.
//
// A `GenreProfile` is the static description of one subgenre: its tempo
// range, swing, characteristic complexities, allowed drum voices, bar-count
// range, atmosphere tag, melodic flag, base drum template and bass style.
// Profiles are data, not code: the built-in table lives in
// `data/genres.json` and is embedded with `include_str!`, the same way any
// custom or synthetic table is loaded (`GenreCatalog::from_json`).
//
// The catalogue is immutable after loading and is handed to the `Generator`
// explicitly; nothing reads it through a global. Loading validates every
// profile so the generator can rely on sane ranges (non-empty voice set,
// `bpm_min <= bpm_max`, `1 <= min_bars <= max_bars`, scalars in [0, 1]).
//
// The atmosphere tag drives the scale used by the pitched layers
// (`Atmosphere::scale_kind`), the rhythmic density of hats and ghost snares
// (`Atmosphere::density`), and how often effect hits fire. The family picks
// the instruments, the comping rhythm and the kind of effect layer.

use crate::error::CatalogError;
use crate::scale::ScaleKind;
use crate::voice::{DrumVoice, Part};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Highest tempo a profile may declare.
pub const MAX_BPM: u16 = 400;
/// Lowest tempo a profile may declare.
pub const MIN_BPM: u16 = 20;
/// Longest track a profile may allow, in bars.
pub const MAX_BARS: u32 = 1024;

const BUILTIN_GENRES: &str = include_str!("../data/genres.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Dnb,
    HipHop,
    Electronic,
    Rock,
    Country,
    Futuristic,
}

impl Family {
    pub const ALL: [Family; 6] = [
        Family::Dnb,
        Family::HipHop,
        Family::Electronic,
        Family::Rock,
        Family::Country,
        Family::Futuristic,
    ];

    /// General MIDI program of a pitched part. Drums have none.
    pub fn program(self, part: Part) -> Option<u8> {
        let (bass, lead, pad, comp, fx) = match self {
            Family::Dnb => (38, 81, 88, 4, 122),
            Family::HipHop => (33, 81, 4, 0, 122),
            Family::Electronic => (38, 81, 88, 4, 102),
            Family::Rock => (34, 30, 29, 29, 120),
            Family::Country => (32, 40, 25, 25, 122),
            Family::Futuristic => (38, 103, 95, 4, 95),
        };
        match part {
            Part::Drums => None,
            Part::Bass => Some(bass),
            Part::Lead => Some(lead),
            Part::Pads => Some(pad),
            Part::Comp => Some(comp),
            Part::Fx => Some(fx),
        }
    }

    /// How the family comps chords, if it does.
    pub fn comp_style(self) -> Option<CompStyle> {
        match self {
            Family::HipHop => Some(CompStyle::HeldChords),
            Family::Rock => Some(CompStyle::PowerChords),
            Family::Country => Some(CompStyle::Strums),
            Family::Dnb | Family::Electronic | Family::Futuristic => None,
        }
    }

    /// The family's effect layer, if it has one.
    pub fn fx_style(self) -> Option<FxStyle> {
        match self {
            Family::Dnb => Some(FxStyle::Hits),
            Family::Futuristic => Some(FxStyle::Texture),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Family::Dnb => "dnb",
            Family::HipHop => "hip_hop",
            Family::Electronic => "electronic",
            Family::Rock => "rock",
            Family::Country => "country",
            Family::Futuristic => "futuristic",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(s);
        Family::ALL
            .into_iter()
            .find(|f| f.name() == wanted || (wanted == "hiphop" && *f == Family::HipHop))
            .ok_or_else(|| format!("unknown genre family '{s}'"))
    }
}

/// Rhythm of the comping part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompStyle {
    /// Piano chords held for two bars.
    HeldChords,
    /// Root and fifth, one per bar or chugged in eighths.
    PowerChords,
    /// Guitar chords strummed on the beat.
    Strums,
}

/// Shape of the effect layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxStyle {
    /// Sporadic high one-shots, at most one per bar.
    Hits,
    /// Sustained open-fifth clusters every eight bars.
    Texture,
}

/// How busy the hat layer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RhythmDensity {
    /// Offbeat eighths, swung, plenty of space.
    Sparse,
    /// Straight eighths with occasional sixteenths.
    Moderate,
    /// Sixteenths, syncopation, rolls.
    Dense,
}

impl RhythmDensity {
    /// Multiplier on the ghost-snare probability.
    pub fn ghost_weight(self) -> f64 {
        match self {
            RhythmDensity::Sparse => 0.6,
            RhythmDensity::Moderate => 1.0,
            RhythmDensity::Dense => 1.5,
        }
    }
}

/// Qualitative mood tag of a subgenre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Atmosphere {
    Aggressive,
    Algorithmic,
    Angsty,
    Anthemic,
    AvantGarde,
    Barroom,
    Building,
    Chaotic,
    Cultural,
    Danceable,
    Dark,
    Deep,
    Dreamy,
    Driving,
    Energetic,
    Ethereal,
    Euphoric,
    Frantic,
    Gritty,
    Groovy,
    Hypnotic,
    Intense,
    Lyrical,
    Mechanical,
    Menacing,
    Minimal,
    Modern,
    Nostalgic,
    Party,
    Peaceful,
    Raw,
    Rebellious,
    RetroFuture,
    Rolling,
    Smooth,
    Sophisticated,
    Spacious,
    Swaggering,
    Tropical,
    Uplifting,
}

impl Atmosphere {
    /// Scale used by the bass and melodic layers.
    pub fn scale_kind(self) -> ScaleKind {
        use Atmosphere::*;
        match self {
            Dark | Menacing | Mechanical | Intense => ScaleKind::Phrygian,
            Aggressive | Frantic | Chaotic | Angsty => ScaleKind::HarmonicMinor,
            Gritty | Raw | Rebellious | Swaggering | Barroom => ScaleKind::Blues,
            Deep | Hypnotic | Rolling | Lyrical | Algorithmic => ScaleKind::NaturalMinor,
            Sophisticated | Groovy | Dreamy => ScaleKind::Dorian,
            Smooth | Uplifting | Euphoric | Anthemic | Building | Danceable => ScaleKind::Major,
            Party | Energetic | Tropical | Cultural => ScaleKind::MajorPentatonic,
            Ethereal | Spacious | Peaceful | Minimal => ScaleKind::MinorPentatonic,
            Nostalgic | RetroFuture | Driving | Modern | AvantGarde => ScaleKind::Mixolydian,
        }
    }

    /// Chance per bar of an effect hit.
    pub fn fx_density(self) -> f64 {
        if self.density() == RhythmDensity::Sparse { 0.1 } else { 0.3 }
    }

    /// Hat-layer density.
    pub fn density(self) -> RhythmDensity {
        use Atmosphere::*;
        match self {
            Aggressive | Chaotic | Frantic | Intense | Energetic | Mechanical | Menacing
            | Driving | Party | Rolling | Raw | Algorithmic | Modern => RhythmDensity::Dense,
            Smooth | Ethereal | Spacious | Peaceful | Dreamy | Minimal | Deep | Nostalgic
            | Lyrical => RhythmDensity::Sparse,
            _ => RhythmDensity::Moderate,
        }
    }
}

/// The 16-step rhythm skeleton a drum layer starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumTemplate {
    BasicDnb,
    AmenBreak,
    ThinkBreak,
    ComplexChop,
    MinimalBreak,
    JungleRapid,
    Halftime,
    BoomBap,
    Trap,
    Drill,
    OldSchool,
    CrunkBounce,
    GFunk,
    FourOnFloor,
    Driving,
    Broken,
    Dubstep,
    Complex,
    Sparse,
    RockBeat,
    Shuffle,
}

impl DrumTemplate {
    /// Hit mask over one bar of sixteenth-note steps.
    pub fn steps(self) -> [u8; 16] {
        match self {
            DrumTemplate::BasicDnb => [1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0],
            DrumTemplate::AmenBreak => [1, 0, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 1, 1, 0, 0],
            DrumTemplate::ThinkBreak => [1, 0, 0, 1, 1, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1],
            DrumTemplate::ComplexChop => [1, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 1, 1, 0, 1],
            DrumTemplate::MinimalBreak => [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0],
            DrumTemplate::JungleRapid => [1, 1, 1, 0, 1, 1, 0, 1, 1, 1, 1, 0, 1, 0, 1, 1],
            DrumTemplate::Halftime => [1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0],
            DrumTemplate::BoomBap => [1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0],
            DrumTemplate::Trap => [1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1],
            DrumTemplate::Drill => [1, 0, 1, 0, 1, 1, 0, 1, 1, 0, 1, 0, 1, 1, 0, 0],
            DrumTemplate::OldSchool => [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0],
            DrumTemplate::CrunkBounce => [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 1, 0],
            DrumTemplate::GFunk => [1, 0, 0, 1, 1, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 0],
            DrumTemplate::FourOnFloor => [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0],
            DrumTemplate::Driving => [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
            DrumTemplate::Broken => [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 0],
            DrumTemplate::Dubstep => [1, 0, 0, 0, 0, 0, 1, 0, 1, 1, 0, 0, 0, 0, 1, 0],
            DrumTemplate::Complex => [1, 0, 1, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 1, 0, 0],
            DrumTemplate::Sparse => [1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
            DrumTemplate::RockBeat => [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0],
            DrumTemplate::Shuffle => [1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1],
        }
    }

    /// Steps that carry the backbeat snare (or clap).
    pub fn backbeat(self) -> &'static [usize] {
        match self {
            DrumTemplate::Halftime | DrumTemplate::Dubstep | DrumTemplate::Sparse => &[8],
            _ => &[4, 12],
        }
    }

    /// Every template hit on a quarter-note step is a kick.
    pub fn four_on_floor(self) -> bool {
        matches!(self, DrumTemplate::FourOnFloor | DrumTemplate::Driving)
    }

    /// Templates whose hats roll in triplets.
    pub fn rolls(self) -> bool {
        matches!(self, DrumTemplate::Trap | DrumTemplate::Drill | DrumTemplate::Halftime)
    }
}

/// Shape of the bass line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BassStyle {
    /// Long held roots, one every bar or two.
    Sustained,
    /// Busy eighth-note stabs with off-grid lengths.
    Syncopated,
    /// Continuous eighth-note roll over a short riff.
    Rolling,
    /// Quarter notes stepping through the scale.
    Walking,
    /// 808-style notes held from kick to kick, gliding between degrees.
    Sliding,
    /// Notes on the kicks plus occasional pickups.
    Standard,
}

/// Static descriptor of one subgenre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreProfile {
    pub key: String,
    pub family: Family,
    pub bpm_min: u16,
    pub bpm_max: u16,
    /// Swing amount in [0, 1]; 1 delays off-beat sixteenths by the
    /// configured maximum fraction of a step.
    pub swing: f32,
    pub drum_complexity: f32,
    pub bass_complexity: f32,
    pub energy: f32,
    pub allowed_voices: BTreeSet<DrumVoice>,
    pub min_bars: u32,
    pub max_bars: u32,
    pub atmosphere: Atmosphere,
    pub melodic: bool,
    pub drum_template: DrumTemplate,
    pub bass_style: BassStyle,
}

impl GenreProfile {
    /// Clamp a requested bar count into the allowed range.
    pub fn clamp_bars(&self, bars: u32) -> u32 {
        bars.clamp(self.min_bars, self.max_bars)
    }

    /// Clamp a tempo into the declared BPM range.
    pub fn clamp_tempo(&self, bpm: u16) -> u16 {
        bpm.clamp(self.bpm_min, self.bpm_max)
    }

    pub fn allows(&self, voice: DrumVoice) -> bool {
        self.allowed_voices.contains(&voice)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidProfile {
            key: self.key.clone(),
            reason,
        };
        if self.key.is_empty() || normalize_key(&self.key) != self.key {
            return Err(invalid("key must be non-empty lowercase snake_case".into()));
        }
        if self.bpm_min < MIN_BPM || self.bpm_max > MAX_BPM || self.bpm_min > self.bpm_max {
            return Err(invalid(format!(
                "bpm range {}..={} must lie within {MIN_BPM}..={MAX_BPM}",
                self.bpm_min, self.bpm_max
            )));
        }
        if self.min_bars == 0 || self.min_bars > self.max_bars || self.max_bars > MAX_BARS {
            return Err(invalid(format!(
                "bar range {}..={} must lie within 1..={MAX_BARS}",
                self.min_bars, self.max_bars
            )));
        }
        for (name, value) in [
            ("swing", self.swing),
            ("drum_complexity", self.drum_complexity),
            ("bass_complexity", self.bass_complexity),
            ("energy", self.energy),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} {value} must be in [0, 1]")));
            }
        }
        if self.allowed_voices.is_empty() {
            return Err(invalid("allowed_voices must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    genres: Vec<GenreProfile>,
}

/// Immutable table of genre profiles keyed by genre key.
#[derive(Debug, Clone)]
pub struct GenreCatalog {
    profiles: BTreeMap<String, GenreProfile>,
}

impl GenreCatalog {
    /// The embedded catalogue of built-in subgenres.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_GENRES)
    }

    /// Parse and validate a catalogue from a JSON string of the form
    /// `{"genres": [ ...profiles... ]}`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_profiles(file.genres)
    }

    /// Build a catalogue from already-constructed profiles.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = GenreProfile>,
    ) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for profile in profiles {
            profile.validate()?;
            if map.contains_key(&profile.key) {
                return Err(CatalogError::DuplicateKey(profile.key));
            }
            map.insert(profile.key.clone(), profile);
        }
        if map.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(GenreCatalog { profiles: map })
    }

    /// Look up a profile. The key is normalized first, so `"Liquid-DNB"`
    /// finds `liquid_dnb`.
    pub fn get(&self, key: &str) -> Option<&GenreProfile> {
        self.profiles.get(&normalize_key(key))
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// All profiles in key order.
    pub fn profiles(&self) -> impl Iterator<Item = &GenreProfile> {
        self.profiles.values()
    }

    pub fn by_family(&self, family: Family) -> impl Iterator<Item = &GenreProfile> {
        self.profiles.values().filter(move |p| p.family == family)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Lowercase, with `-` and spaces turned into `_`.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
