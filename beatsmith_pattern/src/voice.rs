// Voices: the instruments a generated track can address.
//
// Percussive voices are `DrumVoice`s, each mapped to its General MIDI
// percussion key. Pitched voices are the bass, the lead and the pads. A
// genre profile restricts which drum voices it may use; when a layer asks for
// a voice outside that set, `DrumVoice::resolve` walks the voice's
// substitute list (open hat -> closed hat, clap -> snare, ...) and gives up
// if nothing allowed is found.
//
// The derived `Ord` on `Voice` is the tie-break order for events that start
// on the same tick: drums, then bass, lead, pads, comping, effects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A percussion instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumVoice {
    Kick,
    Snare,
    Clap,
    Rimshot,
    ClosedHat,
    OpenHat,
    Ride,
    Crash,
    LowTom,
    HighTom,
    Cowbell,
    Shaker,
}

impl DrumVoice {
    pub const ALL: [DrumVoice; 12] = [
        DrumVoice::Kick,
        DrumVoice::Snare,
        DrumVoice::Clap,
        DrumVoice::Rimshot,
        DrumVoice::ClosedHat,
        DrumVoice::OpenHat,
        DrumVoice::Ride,
        DrumVoice::Crash,
        DrumVoice::LowTom,
        DrumVoice::HighTom,
        DrumVoice::Cowbell,
        DrumVoice::Shaker,
    ];

    /// General MIDI percussion key (channel 10).
    pub fn gm_key(self) -> u8 {
        match self {
            DrumVoice::Kick => 36,
            DrumVoice::Rimshot => 37,
            DrumVoice::Snare => 38,
            DrumVoice::Clap => 39,
            DrumVoice::ClosedHat => 42,
            DrumVoice::LowTom => 45,
            DrumVoice::OpenHat => 46,
            DrumVoice::Crash => 49,
            DrumVoice::HighTom => 50,
            DrumVoice::Ride => 51,
            DrumVoice::Cowbell => 56,
            DrumVoice::Shaker => 70,
        }
    }

    /// Voices that can stand in for this one, in order of preference.
    pub fn substitutes(self) -> &'static [DrumVoice] {
        match self {
            DrumVoice::Kick => &[],
            DrumVoice::Snare => &[DrumVoice::Clap, DrumVoice::Rimshot],
            DrumVoice::Clap => &[DrumVoice::Snare, DrumVoice::Rimshot],
            DrumVoice::Rimshot => &[DrumVoice::Snare, DrumVoice::Clap],
            DrumVoice::ClosedHat => &[DrumVoice::Shaker, DrumVoice::Ride],
            DrumVoice::OpenHat => &[DrumVoice::ClosedHat, DrumVoice::Ride, DrumVoice::Shaker],
            DrumVoice::Ride => &[DrumVoice::ClosedHat, DrumVoice::Shaker],
            DrumVoice::Crash => &[DrumVoice::Ride],
            DrumVoice::LowTom => &[DrumVoice::HighTom],
            DrumVoice::HighTom => &[DrumVoice::LowTom],
            DrumVoice::Cowbell => &[DrumVoice::Rimshot, DrumVoice::ClosedHat],
            DrumVoice::Shaker => &[DrumVoice::ClosedHat],
        }
    }

    /// This voice if allowed, otherwise its first allowed substitute.
    pub fn resolve(self, allowed: &BTreeSet<DrumVoice>) -> Option<DrumVoice> {
        if allowed.contains(&self) {
            return Some(self);
        }
        self.substitutes()
            .iter()
            .copied()
            .find(|v| allowed.contains(v))
    }

    /// One-character symbol for text summaries.
    pub fn symbol(self) -> char {
        match self {
            DrumVoice::Kick => 'K',
            DrumVoice::Snare => 'S',
            DrumVoice::Clap => 'C',
            DrumVoice::Rimshot => 'r',
            DrumVoice::ClosedHat => 'h',
            DrumVoice::OpenHat => 'o',
            DrumVoice::Ride => 'd',
            DrumVoice::Crash => 'X',
            DrumVoice::LowTom => 't',
            DrumVoice::HighTom => 'T',
            DrumVoice::Cowbell => 'b',
            DrumVoice::Shaker => 's',
        }
    }
}

/// The instrument an event is played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voice {
    Drum(DrumVoice),
    Bass,
    Lead,
    Pad,
    /// Chord comping (piano, rhythm guitar).
    Comp,
    /// Effect hits and ambient textures.
    Fx,
}

impl Voice {
    /// True for the voices produced by the melodic layer.
    pub fn is_melodic(self) -> bool {
        matches!(self, Voice::Lead | Voice::Pad)
    }

    pub fn is_drum(self) -> bool {
        matches!(self, Voice::Drum(_))
    }

    /// The MIDI track this voice is written to.
    pub fn part(self) -> Part {
        match self {
            Voice::Drum(_) => Part::Drums,
            Voice::Bass => Part::Bass,
            Voice::Lead => Part::Lead,
            Voice::Pad => Part::Pads,
            Voice::Comp => Part::Comp,
            Voice::Fx => Part::Fx,
        }
    }
}

/// Voice groups that share a MIDI track and channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Drums,
    Bass,
    Lead,
    Pads,
    Comp,
    Fx,
}

impl Part {
    pub const ALL: [Part; 6] = [
        Part::Drums,
        Part::Bass,
        Part::Lead,
        Part::Pads,
        Part::Comp,
        Part::Fx,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Part::Drums => "Drums",
            Part::Bass => "Bass",
            Part::Lead => "Lead",
            Part::Pads => "Pads",
            Part::Comp => "Comp",
            Part::Fx => "FX",
        }
    }

    /// Zero-based MIDI channel. Drums use channel 10 (index 9).
    pub fn channel(self) -> u8 {
        match self {
            Part::Drums => 9,
            Part::Bass => 0,
            Part::Lead => 1,
            Part::Pads => 2,
            Part::Comp => 3,
            Part::Fx => 4,
        }
    }
}
