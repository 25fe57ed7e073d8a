// Beatsmith Pattern Generator
//
// A deterministic, genre-aware generator of symbolic multi-layer tracks.
// Given a subgenre key and a handful of musical parameters (tempo, length,
// seed, complexity, energy) it produces timed note events for drums, bass,
// family-specific comping and effects, and, for melodic genres, a lead line
// and pads, then writes them out as a Standard MIDI File.
//
// Architecture:
// - profile.rs: Genre profiles, atmosphere tags, drum templates, bass styles,
//   and the validated catalogue (built-in table in data/genres.json)
// - config.rs: Generator configuration (resolution, velocities, swing limit)
// - request.rs: Generation requests and their clamping against a profile
// - voice.rs: Drum voices (GM keys, substitutes), voices, MIDI parts
// - scale.rs: Scale kinds, degree-to-pitch mapping
// - layer.rs: Per-call layer context (timing grid, swing, harmony)
// - drums.rs: Template-driven drum layer with hats, ghosts, fills, crashes
// - bass.rs: Kick-locked bass line in six styles
// - melody.rs: Phrase-based lead random walk and pad chords
// - comping.rs: Held chords, power chords and strums per family
// - fx.rs: Atmosphere-weighted effect hits and fifth textures
// - humanize.rs: Accented velocities and seeded per-part jitter
// - generator.rs: `Generator::generate`, seeding and stream forking, merge
// - track.rs: Note events, generated tracks, stats and text summary
// - midi.rs: SMF Format 1 output via midly
// - dataset.rs: Parallel batch generation with a JSON manifest
// - error.rs: Error enums for every fallible edge
//
// The generator is deterministic given a seed: the same request always
// yields the same events, on every platform.

pub mod bass;
pub mod comping;
pub mod config;
pub mod dataset;
pub mod drums;
pub mod error;
pub mod fx;
pub mod generator;
pub mod humanize;
pub mod layer;
pub mod melody;
pub mod midi;
pub mod profile;
pub mod request;
pub mod scale;
pub mod track;
pub mod voice;

pub use config::GeneratorConfig;
pub use error::{CatalogError, ConfigError, DatasetError, ExportError, GenerateError};
pub use generator::Generator;
pub use profile::{Family, GenreCatalog, GenreProfile};
pub use request::GenerationRequest;
pub use track::{GeneratedTrack, NoteEvent};
pub use voice::{DrumVoice, Part, Voice};
