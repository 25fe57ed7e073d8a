// MIDI output from generated tracks.
//
// Converts a GeneratedTrack into a Standard MIDI File (SMF Format 1). Track 0
// carries the tempo and a 4/4 time signature; then one track per part that
// has events, in the order drums, bass, lead, pads, comp, fx. Drums play on
// channel 10 (index 9) with GM percussion keys; the pitched parts get the
// programs of the genre family.
//
// The file's resolution is the track's ticks-per-quarter, so event ticks
// are written unchanged. Within a track, note-offs sort before note-ons at
// the same tick so a retriggered key is released before it sounds again.
//
// Uses the `midly` crate for MIDI writing.

use crate::error::ExportError;
use crate::track::GeneratedTrack;
use crate::voice::Part;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Convert a track to MIDI and write it to a file.
pub fn write_midi(track: &GeneratedTrack, path: &Path) -> Result<(), ExportError> {
    let bytes = to_midi_bytes(track)?;
    std::fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode a track as SMF bytes.
pub fn to_midi_bytes(track: &GeneratedTrack) -> Result<Vec<u8>, ExportError> {
    let smf = track_to_smf(track);
    let mut buf = Vec::new();
    smf.write_std(&mut buf).map_err(ExportError::Encode)?;
    Ok(buf)
}

/// Microseconds per quarter note at `bpm`.
pub fn tempo_micros(bpm: u16) -> u32 {
    60_000_000 / bpm.max(1) as u32
}

/// Convert a track to an in-memory SMF.
pub fn track_to_smf(track: &GeneratedTrack) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(track.ticks_per_quarter())),
    ));

    // Track 0: tempo and meter.
    smf.tracks.push(vec![
        meta(0, MetaMessage::Tempo(u24::new(tempo_micros(track.tempo_bpm())))),
        meta(0, MetaMessage::TimeSignature(4, 2, 24, 8)),
        meta(0, MetaMessage::EndOfTrack),
    ]);

    for part in track.parts() {
        let program = track.family().program(part);
        smf.tracks.push(part_track(track, part, program));
    }
    smf
}

fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(message),
    }
}

fn part_track(track: &GeneratedTrack, part: Part, program: Option<u8>) -> Track<'static> {
    let channel = u4::new(part.channel());
    let mut out: Track<'static> = vec![meta(0, MetaMessage::TrackName(part.name().as_bytes()))];
    if let Some(program) = program {
        out.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(program),
                },
            },
        });
    }

    // (tick, is_on, key, velocity); offs sort before ons at equal ticks.
    let mut messages: Vec<(u32, bool, u8, u8)> = Vec::new();
    for event in track.events_in_part(part) {
        messages.push((event.start_tick, true, event.pitch, event.velocity));
        messages.push((event.end_tick(), false, event.pitch, 0));
    }
    messages.sort_by_key(|&(tick, is_on, key, _)| (tick, is_on, key));

    let mut last_tick = 0;
    for (tick, is_on, key, vel) in messages {
        let message = if is_on {
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            }
        };
        out.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    out.push(meta(0, MetaMessage::EndOfTrack));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::request::GenerationRequest;

    fn liquid_track() -> GeneratedTrack {
        Generator::builtin()
            .unwrap()
            .generate(
                &GenerationRequest::new("liquid_dnb", 4)
                    .with_seed(42)
                    .with_tempo(174),
            )
            .unwrap()
    }

    #[test]
    fn tempo_micros_for_common_tempos() {
        assert_eq!(tempo_micros(120), 500_000);
        assert_eq!(tempo_micros(174), 344_827);
    }

    #[test]
    fn one_track_per_part_plus_tempo() {
        let track = liquid_track();
        let smf = track_to_smf(&track);
        assert_eq!(smf.tracks.len(), 1 + track.parts().len());
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(480)));
    }

    #[test]
    fn drums_use_channel_ten() {
        let smf = track_to_smf(&liquid_track());
        let drum_track = &smf.tracks[1];
        for event in drum_track {
            if let TrackEventKind::Midi { channel, .. } = event.kind {
                assert_eq!(channel.as_int(), 9);
            }
        }
    }

    #[test]
    fn note_offs_precede_note_ons_at_same_tick() {
        let smf = track_to_smf(&liquid_track());
        for midi_track in &smf.tracks[1..] {
            let mut tick = 0u32;
            let mut last: Option<(u32, bool)> = None;
            for event in midi_track {
                tick += event.delta.as_int();
                if let TrackEventKind::Midi { message, .. } = event.kind {
                    let is_on = matches!(message, MidiMessage::NoteOn { .. });
                    let is_off = matches!(message, MidiMessage::NoteOff { .. });
                    if is_off {
                        if let Some((t, was_on)) = last {
                            assert!(!(t == tick && was_on), "note-off after note-on at {tick}");
                        }
                    }
                    if is_on || is_off {
                        last = Some((tick, is_on));
                    }
                }
            }
        }
    }

    #[test]
    fn family_programs_are_set() {
        let track = Generator::builtin()
            .unwrap()
            .generate(&GenerationRequest::new("boom_bap", 4).with_seed(2))
            .unwrap();
        let smf = track_to_smf(&track);
        let programs: Vec<(u8, u8)> = smf.tracks[1..]
            .iter()
            .flat_map(|t| t.iter())
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::ProgramChange { program },
                } => Some((channel.as_int(), program.as_int())),
                _ => None,
            })
            .collect();
        assert!(programs.contains(&(Part::Bass.channel(), 33)));
        assert!(programs.contains(&(Part::Comp.channel(), 0)));
    }

    #[test]
    fn bytes_parse_back() {
        let track = liquid_track();
        let bytes = to_midi_bytes(&track).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::Parallel);
        assert_eq!(smf.tracks.len(), 1 + track.parts().len());
    }
}
