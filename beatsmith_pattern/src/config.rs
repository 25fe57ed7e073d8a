// Data-driven generator configuration.
//
// Everything tunable that is not a property of a genre lives in
// `GeneratorConfig`: the tick resolution, base velocities per voice, the
// humanization jitter, and how far swing may push an off-beat. The config is
// JSON with serde defaults, so a file only needs the fields it overrides.
//
// Determinism: the config is part of the generator's input. Two generators
// with different configs may produce different tracks for the same request.

use crate::error::ConfigError;
use crate::voice::{DrumVoice, Voice};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base velocities (before accents and jitter), by voice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityTable {
    pub kick: u8,
    pub snare: u8,
    pub clap: u8,
    pub rimshot: u8,
    pub hat: u8,
    pub ride: u8,
    pub crash: u8,
    pub tom: u8,
    pub percussion: u8,
    pub bass: u8,
    pub lead: u8,
    pub pad: u8,
    pub comp: u8,
    pub fx: u8,
}

impl Default for VelocityTable {
    fn default() -> Self {
        VelocityTable {
            kick: 112,
            snare: 104,
            clap: 100,
            rimshot: 84,
            hat: 68,
            ride: 72,
            crash: 100,
            tom: 92,
            percussion: 76,
            bass: 100,
            lead: 80,
            pad: 56,
            comp: 64,
            fx: 44,
        }
    }
}

impl VelocityTable {
    pub fn base(&self, voice: Voice) -> u8 {
        match voice {
            Voice::Drum(drum) => match drum {
                DrumVoice::Kick => self.kick,
                DrumVoice::Snare => self.snare,
                DrumVoice::Clap => self.clap,
                DrumVoice::Rimshot => self.rimshot,
                DrumVoice::ClosedHat | DrumVoice::OpenHat => self.hat,
                DrumVoice::Ride => self.ride,
                DrumVoice::Crash => self.crash,
                DrumVoice::LowTom | DrumVoice::HighTom => self.tom,
                DrumVoice::Cowbell | DrumVoice::Shaker => self.percussion,
            },
            Voice::Bass => self.bass,
            Voice::Lead => self.lead,
            Voice::Pad => self.pad,
            Voice::Comp => self.comp,
            Voice::Fx => self.fx,
        }
    }

    fn entries(&self) -> [(&'static str, u8); 14] {
        [
            ("kick", self.kick),
            ("snare", self.snare),
            ("clap", self.clap),
            ("rimshot", self.rimshot),
            ("hat", self.hat),
            ("ride", self.ride),
            ("crash", self.crash),
            ("tom", self.tom),
            ("percussion", self.percussion),
            ("bass", self.bass),
            ("lead", self.lead),
            ("pad", self.pad),
            ("comp", self.comp),
            ("fx", self.fx),
        ]
    }
}

/// Tunable generator parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// MIDI resolution. Must be a multiple of 12 so that sixteenth notes
    /// and sixteenth-note triplets land on whole ticks.
    pub ticks_per_quarter: u16,
    pub velocities: VelocityTable,
    /// Maximum humanization offset, applied as a uniform draw in
    /// `[-velocity_jitter, +velocity_jitter]`.
    pub velocity_jitter: u8,
    /// Velocity multiplier for ghost notes.
    pub ghost_scale: f32,
    /// Velocity multiplier for accented hits (downbeats, backbeats).
    pub accent_scale: f32,
    /// Fraction of a sixteenth step that full swing (profile swing 1.0,
    /// energy 1.0) delays an off-beat. Must be below 1.0 so a swung hit never
    /// crosses into the next step.
    pub max_swing_fraction: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            ticks_per_quarter: 480,
            velocities: VelocityTable::default(),
            velocity_jitter: 6,
            ghost_scale: 0.45,
            accent_scale: 1.1,
            max_swing_fraction: 0.5,
        }
    }
}

impl GeneratorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn ticks_per_bar(&self) -> u32 {
        self.ticks_per_quarter as u32 * 4
    }

    pub fn ticks_per_step(&self) -> u32 {
        self.ticks_per_quarter as u32 / 4
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_quarter < 24
            || self.ticks_per_quarter > 0x7fff
            || self.ticks_per_quarter % 12 != 0
        {
            return Err(ConfigError::Invalid {
                field: "ticks_per_quarter",
                reason: format!(
                    "{} must be a multiple of 12 between 24 and 32767",
                    self.ticks_per_quarter
                ),
            });
        }
        for (name, value) in self.velocities.entries() {
            if !(1..=127).contains(&value) {
                return Err(ConfigError::Invalid {
                    field: "velocities",
                    reason: format!("{name} velocity {value} must be in 1..=127"),
                });
            }
        }
        if self.velocity_jitter > 32 {
            return Err(ConfigError::Invalid {
                field: "velocity_jitter",
                reason: format!("{} must be at most 32", self.velocity_jitter),
            });
        }
        if !(0.0..=1.0).contains(&self.ghost_scale) {
            return Err(ConfigError::Invalid {
                field: "ghost_scale",
                reason: format!("{} must be in [0, 1]", self.ghost_scale),
            });
        }
        if !(1.0..=2.0).contains(&self.accent_scale) {
            return Err(ConfigError::Invalid {
                field: "accent_scale",
                reason: format!("{} must be in [1, 2]", self.accent_scale),
            });
        }
        if !(0.0..0.9).contains(&self.max_swing_fraction) {
            return Err(ConfigError::Invalid {
                field: "max_swing_fraction",
                reason: format!("{} must be in [0, 0.9)", self.max_swing_fraction),
            });
        }
        Ok(())
    }
}
