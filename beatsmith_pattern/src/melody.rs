// Melodic layer: lead line and pads, generated only for melodic profiles.
//
// The lead works in four-bar phrases on an eighth-note grid. Each slot
// sounds with probability equal to the melody density (the request's hint,
// or `0.2 + 0.4 * complexity`). Pitches take a random walk over scale
// degrees around the root in octave 4: mostly steps, with leaps of a fourth
// or fifth at probability `complexity * 0.2`. The walk reflects off the edges
// of a register whose width grows with complexity (5 to 12 degrees). The
// last beat of every phrase resolves to the root or the fifth, whichever is
// closer, and holds.
//
// Pads play one chord every four bars: thirds stacked on the progression
// degree in octave 3, three voices, or four when complexity is above 0.5.

use crate::humanize::{Accent, velocity};
use crate::layer::LayerContext;
use crate::track::NoteEvent;
use crate::voice::Voice;
use beatsmith_prng::PatternRng;

const LEAD_OCTAVE: u8 = 4;
const PAD_OCTAVE: u8 = 3;
const PHRASE_BARS: u32 = 4;
const SLOTS_PER_BAR: u32 = 8;

/// Step sizes of the walk, weighted toward small moves.
const STEPS: [i32; 7] = [-2, -1, -1, 0, 1, 1, 2];
const LEAPS: [i32; 4] = [-4, -3, 3, 4];

/// Melody density used when the request carries no hint.
pub fn default_density(complexity: f32) -> f32 {
    0.2 + 0.4 * complexity
}

/// Lowest and highest degree (relative to the root) the lead may reach.
pub fn register(complexity: f32) -> (i32, i32) {
    let span = 5 + (complexity * 7.0).round() as i32;
    let low = -(span / 2);
    (low, low + span)
}

pub fn generate_lead(ctx: &LayerContext, rng: &mut PatternRng) -> Vec<NoteEvent> {
    let density = ctx
        .melody_density
        .unwrap_or_else(|| default_density(ctx.complexity)) as f64;
    let leap_chance = ctx.complexity as f64 * 0.2;
    let (low, high) = register(ctx.complexity);
    let slot_ticks = ctx.step_ticks * 2;

    // (slot index, degree, accent)
    let mut notes: Vec<(u32, i32, Accent)> = Vec::new();
    let mut phrase_start = 0;
    while phrase_start < ctx.bars {
        let phrase_bars = PHRASE_BARS.min(ctx.bars - phrase_start);
        let first_slot = phrase_start * SLOTS_PER_BAR;
        let last_slot = first_slot + phrase_bars * SLOTS_PER_BAR;
        // The final quarter of the phrase is the resolution.
        let resolve_slot = last_slot - 2;

        let mut degree = ctx.chord_degree(phrase_start).clamp(low, high);
        for slot in first_slot..resolve_slot {
            let downbeat = slot == first_slot;
            if !downbeat && !rng.random_bool(density) {
                continue;
            }
            if !downbeat {
                let delta = if rng.random_bool(leap_chance) {
                    *rng.choose(&LEAPS).unwrap_or(&0)
                } else {
                    *rng.choose(&STEPS).unwrap_or(&0)
                };
                degree = reflect(degree + delta, low, high);
            }
            let accent = if downbeat { Accent::Strong } else { Accent::Normal };
            notes.push((slot, degree, accent));
        }
        degree = resolution(ctx, degree, low, high);
        notes.push((resolve_slot, degree, Accent::Strong));
        phrase_start += phrase_bars;
    }

    let total = ctx.total_ticks();
    let mut events = Vec::with_capacity(notes.len());
    for (i, &(slot, degree, accent)) in notes.iter().enumerate() {
        let start = slot * slot_ticks;
        let next = notes.get(i + 1).map_or(total, |&(s, _, _)| s * slot_ticks);
        // Hold for up to two slots, never past the next note.
        let duration = (2 * slot_ticks).min(next - start).min(total - start).max(1);
        events.push(NoteEvent::pitched(
            Voice::Lead,
            ctx.scale.degree_to_pitch(degree, LEAD_OCTAVE),
            start,
            duration,
            velocity(ctx.config, Voice::Lead, accent),
        ));
    }
    tracing::debug!(notes = events.len(), density, "lead layer");
    events
}

pub fn generate_pads(ctx: &LayerContext) -> Vec<NoteEvent> {
    let voices = if ctx.complexity > 0.5 { 4 } else { 3 };
    let mut events = Vec::new();
    let mut bar = 0;
    let mut chord = 0u32;
    while bar < ctx.bars {
        let span = PHRASE_BARS.min(ctx.bars - bar);
        let root = ctx.progression[(chord % 4) as usize];
        let start = ctx.bar_start(bar);
        for k in 0..voices {
            events.push(NoteEvent::pitched(
                Voice::Pad,
                ctx.scale.degree_to_pitch(root + 2 * k, PAD_OCTAVE),
                start,
                span * ctx.ticks_per_bar,
                velocity(ctx.config, Voice::Pad, Accent::Normal),
            ));
        }
        bar += span;
        chord += 1;
    }
    tracing::debug!(notes = events.len(), "pad layer");
    events
}

/// Fold a degree back inside `[low, high]`.
fn reflect(degree: i32, low: i32, high: i32) -> i32 {
    let folded = if degree > high {
        2 * high - degree
    } else if degree < low {
        2 * low - degree
    } else {
        degree
    };
    folded.clamp(low, high)
}

/// The root or fifth (in any octave within the register) closest to
/// `degree`.
fn resolution(ctx: &LayerContext, degree: i32, low: i32, high: i32) -> i32 {
    let len = ctx.scale.kind.len() as i32;
    let fifth = ctx.scale.kind.fifth_degree();
    let mut best = 0.clamp(low, high);
    for octave in -2..=2 {
        for candidate in [octave * len, octave * len + fifth] {
            if candidate < low || candidate > high {
                continue;
            }
            if (candidate - degree).abs() < (best - degree).abs() {
                best = candidate;
            }
        }
    }
    best
}
