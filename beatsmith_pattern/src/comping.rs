// Chord comping for the families that have a rhythm instrument.
//
// The family's `CompStyle` picks the figure; families without one get no
// comp events. All three styles follow the progression in the layer context.
//
// - Held chords (hip-hop): one chord per two bars, thirds stacked on the
//   progression degree in octave 3, four voices when complexity is above 0.5.
// - Power chords (rock): root and fifth in octave 2 every bar, either held
//   for the bar or chugged as eighths (probability `complexity * 0.5`).
// - Strums (country): root, third, fifth and octave in octave 3 on each
//   beat, strings offset by a thirty-second of a step. Off-beats drop out
//   with probability `(1 - complexity) * 0.3`.

use crate::humanize::{Accent, velocity};
use crate::layer::LayerContext;
use crate::profile::CompStyle;
use crate::track::NoteEvent;
use crate::voice::Voice;
use beatsmith_prng::PatternRng;

const CHORD_OCTAVE: u8 = 3;
const POWER_OCTAVE: u8 = 2;
const HELD_BARS: u32 = 2;
const BEATS_PER_BAR: u32 = 4;

pub fn generate(ctx: &LayerContext, rng: &mut PatternRng) -> Vec<NoteEvent> {
    let Some(style) = ctx.profile.family.comp_style() else {
        return Vec::new();
    };
    let events = match style {
        CompStyle::HeldChords => held_chords(ctx),
        CompStyle::PowerChords => power_chords(ctx, rng),
        CompStyle::Strums => strums(ctx, rng),
    };
    tracing::debug!(notes = events.len(), ?style, "comp layer");
    events
}

fn held_chords(ctx: &LayerContext) -> Vec<NoteEvent> {
    let voices = if ctx.complexity > 0.5 { 4 } else { 3 };
    let mut events = Vec::new();
    let mut bar = 0;
    while bar < ctx.bars {
        let span = HELD_BARS.min(ctx.bars - bar);
        let root = ctx.progression[((bar / HELD_BARS) % 4) as usize];
        let start = ctx.bar_start(bar);
        for k in 0..voices {
            events.push(NoteEvent::pitched(
                Voice::Comp,
                ctx.scale.degree_to_pitch(root + 2 * k, CHORD_OCTAVE),
                start,
                span * ctx.ticks_per_bar,
                velocity(ctx.config, Voice::Comp, Accent::Normal),
            ));
        }
        bar += span;
    }
    events
}

fn power_chords(ctx: &LayerContext, rng: &mut PatternRng) -> Vec<NoteEvent> {
    let chug_chance = ctx.complexity as f64 * 0.5;
    let fifth = ctx.scale.kind.fifth_degree();
    let eighth = ctx.step_ticks * 2;
    let mut events = Vec::new();
    for bar in 0..ctx.bars {
        let root = ctx.chord_degree(bar);
        let pitches = [
            ctx.scale.degree_to_pitch(root, POWER_OCTAVE),
            ctx.scale.degree_to_pitch(root + fifth, POWER_OCTAVE),
        ];
        let start = ctx.bar_start(bar);
        if rng.random_bool(chug_chance) {
            for slot in 0..ctx.ticks_per_bar / eighth {
                let accent = if slot % 4 == 0 { Accent::Strong } else { Accent::Normal };
                for pitch in pitches {
                    events.push(NoteEvent::pitched(
                        Voice::Comp,
                        pitch,
                        start + slot * eighth,
                        eighth,
                        velocity(ctx.config, Voice::Comp, accent),
                    ));
                }
            }
        } else {
            for pitch in pitches {
                events.push(NoteEvent::pitched(
                    Voice::Comp,
                    pitch,
                    start,
                    ctx.ticks_per_bar,
                    velocity(ctx.config, Voice::Comp, Accent::Strong),
                ));
            }
        }
    }
    events
}

fn strums(ctx: &LayerContext, rng: &mut PatternRng) -> Vec<NoteEvent> {
    let drop_chance = (1.0 - ctx.complexity as f64) * 0.3;
    let len = ctx.scale.kind.len() as i32;
    let beat_ticks = ctx.ticks_per_bar / BEATS_PER_BAR;
    let spread = (ctx.step_ticks / 8).max(1);
    let mut events = Vec::new();
    for bar in 0..ctx.bars {
        let root = ctx.chord_degree(bar);
        let strings = [root, root + 2, root + 4, root + len];
        for beat in 0..BEATS_PER_BAR {
            if beat != 0 && rng.random_bool(drop_chance) {
                continue;
            }
            let accent = if beat % 2 == 0 { Accent::Strong } else { Accent::Normal };
            let beat_start = ctx.bar_start(bar) + beat * beat_ticks;
            for (k, &degree) in (0u32..).zip(strings.iter()) {
                // Every string rings until the next beat.
                let offset = k * spread;
                events.push(NoteEvent::pitched(
                    Voice::Comp,
                    ctx.scale.degree_to_pitch(degree, CHORD_OCTAVE),
                    beat_start + offset,
                    beat_ticks - offset,
                    velocity(ctx.config, Voice::Comp, accent),
                ));
            }
        }
    }
    events
}
