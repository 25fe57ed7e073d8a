// Generated tracks: timed note events plus the metadata needed to play them.
//
// A `GeneratedTrack` is the only output of generation and the only input of
// MIDI export. Events are kept sorted by (start tick, voice, pitch), every
// event ends at or before `total_ticks`, and every drum event's pitch is the
// GM key of its drum voice. The generator establishes these when it builds
// the track; nothing mutates a track afterwards, so fields are crate-private
// behind accessors.
//
// `summary()` renders a compact text view for the CLI: a step grid for each
// drum voice and the note names of each pitched part, bar by bar.

use crate::profile::{Atmosphere, Family};
use crate::scale::{Scale, pitch_class_name};
use crate::voice::{DrumVoice, Part, Voice};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Bars shown by `GeneratedTrack::summary`.
const SUMMARY_BARS: u32 = 4;

/// One note (or drum hit) in a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    pub voice: Voice,
    /// MIDI key. For drums, the GM percussion key of the drum voice.
    pub pitch: u8,
    pub start_tick: u32,
    /// Length in ticks, at least 1.
    pub duration: u32,
    /// 1..=127.
    pub velocity: u8,
}

impl NoteEvent {
    pub fn drum(voice: DrumVoice, start_tick: u32, duration: u32, velocity: u8) -> Self {
        NoteEvent {
            voice: Voice::Drum(voice),
            pitch: voice.gm_key(),
            start_tick,
            duration,
            velocity,
        }
    }

    pub fn pitched(voice: Voice, pitch: u8, start_tick: u32, duration: u32, velocity: u8) -> Self {
        NoteEvent {
            voice,
            pitch,
            start_tick,
            duration,
            velocity,
        }
    }

    pub fn end_tick(&self) -> u32 {
        self.start_tick + self.duration
    }

    /// Canonical ordering key of events within a track.
    pub fn sort_key(&self) -> (u32, Voice, u8) {
        (self.start_tick, self.voice, self.pitch)
    }
}

/// A finished multi-layer track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedTrack {
    pub(crate) genre: String,
    pub(crate) family: Family,
    pub(crate) tempo_bpm: u16,
    pub(crate) bar_count: u32,
    pub(crate) ticks_per_quarter: u16,
    pub(crate) ticks_per_bar: u32,
    pub(crate) total_ticks: u32,
    pub(crate) seed: u64,
    pub(crate) atmosphere: Atmosphere,
    pub(crate) scale: Scale,
    pub(crate) events: Vec<NoteEvent>,
}

impl GeneratedTrack {
    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn tempo_bpm(&self) -> u16 {
        self.tempo_bpm
    }

    pub fn bar_count(&self) -> u32 {
        self.bar_count
    }

    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    pub fn ticks_per_bar(&self) -> u32 {
        self.ticks_per_bar
    }

    /// `bar_count * ticks_per_bar`.
    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }

    /// The seed that reproduces this track (echoed even when the request
    /// had none).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn atmosphere(&self) -> Atmosphere {
        self.atmosphere
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// All events, sorted by (start tick, voice, pitch).
    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// Playing time at the track's tempo.
    pub fn duration_seconds(&self) -> f64 {
        let quarters = self.total_ticks as f64 / self.ticks_per_quarter as f64;
        quarters * 60.0 / self.tempo_bpm as f64
    }

    pub fn events_for(&self, voice: Voice) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(move |e| e.voice == voice)
    }

    pub fn events_in_part(&self, part: Part) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(move |e| e.voice.part() == part)
    }

    /// Parts that have at least one event, in MIDI track order.
    pub fn parts(&self) -> BTreeSet<Part> {
        self.events.iter().map(|e| e.voice.part()).collect()
    }

    pub fn drum_voices(&self) -> BTreeSet<DrumVoice> {
        self.events
            .iter()
            .filter_map(|e| match e.voice {
                Voice::Drum(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn has_melody(&self) -> bool {
        self.events.iter().any(|e| e.voice.is_melodic())
    }

    pub fn stats(&self) -> TrackStats {
        let mut per_part: BTreeMap<Part, usize> = BTreeMap::new();
        let mut velocity_sum = 0u64;
        let mut pitch_range: Option<(u8, u8)> = None;
        for event in &self.events {
            *per_part.entry(event.voice.part()).or_default() += 1;
            velocity_sum += event.velocity as u64;
            if !event.voice.is_drum() {
                pitch_range = Some(match pitch_range {
                    Some((lo, hi)) => (lo.min(event.pitch), hi.max(event.pitch)),
                    None => (event.pitch, event.pitch),
                });
            }
        }
        let count = |part| per_part.get(&part).copied().unwrap_or(0);
        TrackStats {
            total_events: self.events.len(),
            drum_hits: count(Part::Drums),
            bass_notes: count(Part::Bass),
            lead_notes: count(Part::Lead),
            pad_notes: count(Part::Pads),
            comp_notes: count(Part::Comp),
            fx_notes: count(Part::Fx),
            distinct_drum_voices: self.drum_voices().len(),
            mean_velocity: if self.events.is_empty() {
                0.0
            } else {
                velocity_sum as f64 / self.events.len() as f64
            },
            pitch_range,
        }
    }

    /// Text rendering of the first few bars.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} ({}) | {} BPM | {} bars | {} {:?} | seed {}\n",
            self.genre,
            self.family,
            self.tempo_bpm,
            self.bar_count,
            pitch_class_name(self.scale.root_pc),
            self.scale.kind,
            self.seed,
        );
        let bars = self.bar_count.min(SUMMARY_BARS);
        let step_ticks = (self.ticks_per_bar / 16).max(1);

        for drum in self.drum_voices() {
            let mut hits = BTreeSet::new();
            for e in self.events_for(Voice::Drum(drum)) {
                hits.insert(e.start_tick / step_ticks);
            }
            out.push_str(&format!("{:>10}: ", format!("{drum:?}")));
            for step in 0..bars * 16 {
                if step > 0 && step % 16 == 0 {
                    out.push('|');
                }
                out.push(if hits.contains(&step) { drum.symbol() } else { '.' });
            }
            out.push('\n');
        }

        for part in [Part::Bass, Part::Lead, Part::Pads, Part::Comp, Part::Fx] {
            if !self.parts().contains(&part) {
                continue;
            }
            out.push_str(&format!("{:>10}: ", part.name()));
            for bar in 0..bars {
                if bar > 0 {
                    out.push_str("| ");
                }
                let bar_start = bar * self.ticks_per_bar;
                let bar_end = bar_start + self.ticks_per_bar;
                for e in self
                    .events_in_part(part)
                    .filter(|e| e.start_tick >= bar_start && e.start_tick < bar_end)
                {
                    out.push_str(&pitch_name(e.pitch));
                    out.push(' ');
                }
            }
            out.push('\n');
        }

        if self.bar_count > bars {
            out.push_str(&format!("... {} more bars\n", self.bar_count - bars));
        }
        out
    }
}

/// Event counts and ranges of a track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackStats {
    pub total_events: usize,
    pub drum_hits: usize,
    pub bass_notes: usize,
    pub lead_notes: usize,
    pub pad_notes: usize,
    pub comp_notes: usize,
    pub fx_notes: usize,
    pub distinct_drum_voices: usize,
    pub mean_velocity: f64,
    /// Lowest and highest pitched (non-drum) note.
    pub pitch_range: Option<(u8, u8)>,
}

/// Compact note name with octave, e.g. `C4` for 60.
pub fn pitch_name(pitch: u8) -> String {
    format!("{}{}", pitch_class_name(pitch % 12), pitch as i32 / 12 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::ScaleKind;

    fn tiny_track() -> GeneratedTrack {
        let events = vec![
            NoteEvent::drum(DrumVoice::Kick, 0, 60, 110),
            NoteEvent::pitched(Voice::Bass, 36, 0, 240, 100),
            NoteEvent::drum(DrumVoice::Snare, 480, 60, 100),
            NoteEvent::pitched(Voice::Lead, 72, 960, 240, 80),
        ];
        GeneratedTrack {
            genre: "test".into(),
            family: Family::Electronic,
            tempo_bpm: 120,
            bar_count: 2,
            ticks_per_quarter: 480,
            ticks_per_bar: 1920,
            total_ticks: 3840,
            seed: 7,
            atmosphere: Atmosphere::Groovy,
            scale: Scale::new(ScaleKind::Dorian, 0),
            events,
        }
    }

    #[test]
    fn duration_in_seconds() {
        // 8 quarters at 120 BPM.
        assert!((tiny_track().duration_seconds() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn stats_count_parts() {
        let stats = tiny_track().stats();
        assert_eq!(stats.total_events, 4);
        assert_eq!(stats.drum_hits, 2);
        assert_eq!(stats.bass_notes, 1);
        assert_eq!(stats.lead_notes, 1);
        assert_eq!(stats.pad_notes, 0);
        assert_eq!(stats.comp_notes, 0);
        assert_eq!(stats.fx_notes, 0);
        assert_eq!(stats.distinct_drum_voices, 2);
        assert_eq!(stats.pitch_range, Some((36, 72)));
    }

    #[test]
    fn events_for_filters_by_voice() {
        let track = tiny_track();
        assert_eq!(track.events_for(Voice::Drum(DrumVoice::Kick)).count(), 1);
        assert_eq!(track.events_for(Voice::Pad).count(), 0);
        assert!(track.has_melody());
        assert_eq!(
            track.parts().into_iter().collect::<Vec<_>>(),
            vec![Part::Drums, Part::Bass, Part::Lead]
        );
    }

    #[test]
    fn summary_shows_grid_and_notes() {
        let summary = tiny_track().summary();
        assert!(summary.contains("K..............."));
        assert!(summary.contains("....S"));
        assert!(summary.contains("C2"));
        assert!(summary.contains("C5"));
        assert!(!summary.contains("Pads"));
    }

    #[test]
    fn pitch_names() {
        assert_eq!(pitch_name(60), "C4");
        assert_eq!(pitch_name(69), "A4");
        assert_eq!(pitch_name(0), "C-1");
    }

    #[test]
    fn track_serializes_to_json() {
        let json = serde_json::to_value(tiny_track()).unwrap();
        assert_eq!(json["tempo_bpm"], 120);
        assert_eq!(json["events"][0]["voice"]["drum"], "kick");
        assert_eq!(json["events"][1]["voice"], "bass");
    }
}
