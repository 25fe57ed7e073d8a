// Scales for the bass and melodic layers.
//
// A `Scale` is a `ScaleKind` (interval pattern) rooted at a pitch class.
// Layers think in scale degrees rather than semitones: the bass walks a
// degree progression, the lead takes a constrained random walk over degrees,
// and pads stack thirds on a degree. `degree_to_pitch` turns a (possibly
// negative or overflowing) degree into a MIDI pitch, carrying octaves.
//
// Which kind a track uses is decided by its atmosphere tag
// (`Atmosphere::scale_kind` in profile.rs).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    Major,
    NaturalMinor,
    HarmonicMinor,
    Dorian,
    Phrygian,
    Mixolydian,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
}

impl ScaleKind {
    /// Semitone offsets from the root, ascending, starting at 0.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleKind::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleKind::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleKind::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }

    /// Number of degrees per octave.
    pub fn len(self) -> usize {
        self.intervals().len()
    }

    /// Pitch-class membership, indexed by semitones above the root.
    pub fn pitch_classes(self) -> [bool; 12] {
        let mut pcs = [false; 12];
        for &interval in self.intervals() {
            pcs[interval as usize] = true;
        }
        pcs
    }

    /// Degree (counted from 0) of the fifth, or of the closest thing to it.
    pub fn fifth_degree(self) -> i32 {
        self.intervals()
            .iter()
            .position(|&iv| iv == 7)
            .unwrap_or(self.len() / 2) as i32
    }
}

/// A scale kind anchored at a root pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub kind: ScaleKind,
    /// Root pitch class (0 = C, 2 = D, ...).
    pub root_pc: u8,
}

impl Scale {
    pub fn new(kind: ScaleKind, root_pc: u8) -> Self {
        Scale {
            kind,
            root_pc: root_pc % 12,
        }
    }

    pub fn is_in_scale(&self, pitch: u8) -> bool {
        let pc = (pitch % 12 + 12 - self.root_pc) % 12;
        self.kind.pitch_classes()[pc as usize]
    }

    pub fn pitches_in_range(&self, low: u8, high: u8) -> Vec<u8> {
        (low..=high).filter(|&p| self.is_in_scale(p)).collect()
    }

    /// MIDI pitch of `degree` counted from the root in `octave`
    /// (octave 4 puts the root between C4 = 60 and B4 = 71).
    ///
    /// Degrees outside `0..len` wrap into neighbouring octaves. The result
    /// is clamped to the MIDI range.
    pub fn degree_to_pitch(&self, degree: i32, octave: u8) -> u8 {
        let len = self.kind.len() as i32;
        let octave_shift = degree.div_euclid(len);
        let index = degree.rem_euclid(len) as usize;
        let base = (octave as i32 + 1) * 12 + self.root_pc as i32;
        let pitch = base + self.kind.intervals()[index] as i32 + octave_shift * 12;
        pitch.clamp(0, 127) as u8
    }
}

/// Compact note name for a pitch class.
pub fn pitch_class_name(pc: u8) -> &'static str {
    match pc % 12 {
        0 => "C",
        1 => "C#",
        2 => "D",
        3 => "Eb",
        4 => "E",
        5 => "F",
        6 => "F#",
        7 => "G",
        8 => "Ab",
        9 => "A",
        10 => "Bb",
        _ => "B",
    }
}
