// Bass layer.
//
// The bass follows the bar-by-bar progression degree and sits in the bass
// register of the track's scale. Its rhythm is anchored on the drum layer's
// kicks plus every downbeat, then shaped by the profile's `BassStyle`:
//
// - Sustained: one held root per bar (per two bars when sparse).
// - Standard: a note on each anchor, held to the next, with pickups.
// - Syncopated: anchors plus off-beat stabs of one to three steps.
// - Rolling: an eighth-note riff drawn once and repeated under each chord.
// - Walking: quarter notes stepping toward the next bar's root.
// - Sliding: 808-style notes one octave lower, held kick to kick, jumping
//   to the fifth or octave now and then.
//
// Density is `0.5 * bass_complexity + 0.5 * complexity`. Notes never
// overlap: each one ends at or before the next note's start.

use crate::humanize::{Accent, velocity};
use crate::layer::{LayerContext, STEPS_PER_BAR};
use crate::profile::BassStyle;
use crate::track::NoteEvent;
use crate::voice::Voice;
use beatsmith_prng::PatternRng;

/// Octave of the bass register.
const BASS_OCTAVE: u8 = 2;
/// Octave of sliding 808 bass.
const SUB_OCTAVE: u8 = 1;

/// A note before it is turned into an event.
#[derive(Debug, Clone, Copy)]
struct BassNote {
    tick: u32,
    /// Requested length; trimmed later so notes never overlap.
    length: u32,
    degree: i32,
    accent: Accent,
}

pub fn generate(ctx: &LayerContext, kick_ticks: &[u32], rng: &mut PatternRng) -> Vec<NoteEvent> {
    let density = 0.5 * ctx.profile.bass_complexity as f64 + 0.5 * ctx.complexity as f64;
    let octave = if ctx.profile.bass_style == BassStyle::Sliding {
        SUB_OCTAVE
    } else {
        BASS_OCTAVE
    };

    let riff = rolling_riff(ctx, rng);
    let mut notes = Vec::new();
    for bar in 0..ctx.bars {
        let anchors = anchors(ctx, bar, kick_ticks);
        match ctx.profile.bass_style {
            BassStyle::Sustained => sustained(ctx, bar, density, &mut notes),
            BassStyle::Standard => standard(ctx, bar, &anchors, density, rng, &mut notes),
            BassStyle::Syncopated => syncopated(ctx, bar, &anchors, density, rng, &mut notes),
            BassStyle::Rolling => rolling(ctx, bar, &riff, density, rng, &mut notes),
            BassStyle::Walking => walking(ctx, bar, rng, &mut notes),
            BassStyle::Sliding => sliding(ctx, bar, &anchors, density, rng, &mut notes),
        }
    }

    let events = to_events(ctx, octave, notes);
    tracing::debug!(notes = events.len(), style = ?ctx.profile.bass_style, "bass layer");
    events
}

/// Kick ticks inside `bar`, plus the downbeat.
fn anchors(ctx: &LayerContext, bar: u32, kick_ticks: &[u32]) -> Vec<u32> {
    let start = ctx.bar_start(bar);
    let end = start + ctx.ticks_per_bar;
    let mut anchors: Vec<u32> = kick_ticks
        .iter()
        .copied()
        .filter(|&t| t >= start && t < end)
        .collect();
    if anchors.first() != Some(&start) {
        anchors.insert(0, start);
    }
    anchors
}

/// Progression degree of `bar`, folded so the line stays low: degrees above
/// the fifth drop an octave.
fn root_degree(ctx: &LayerContext, bar: u32) -> i32 {
    let len = octave_up(ctx);
    let degree = ctx.chord_degree(bar).rem_euclid(len);
    if degree > fifth(ctx) { degree - len } else { degree }
}

fn fifth(ctx: &LayerContext) -> i32 {
    ctx.scale.kind.fifth_degree()
}

fn octave_up(ctx: &LayerContext) -> i32 {
    ctx.scale.kind.len() as i32
}

fn sustained(ctx: &LayerContext, bar: u32, density: f64, notes: &mut Vec<BassNote>) {
    let span = if density < 0.4 { 2 } else { 1 };
    if bar % span != 0 {
        return;
    }
    notes.push(BassNote {
        tick: ctx.bar_start(bar),
        length: ctx.ticks_per_bar * span,
        degree: root_degree(ctx, bar),
        accent: Accent::Strong,
    });
}

fn standard(
    ctx: &LayerContext,
    bar: u32,
    anchors: &[u32],
    density: f64,
    rng: &mut PatternRng,
    notes: &mut Vec<BassNote>,
) {
    let root = root_degree(ctx, bar);
    for (i, &tick) in anchors.iter().enumerate() {
        let degree = if i > 0 && rng.random_bool(density * 0.3) {
            root + if rng.random_bool(0.5) { fifth(ctx) } else { octave_up(ctx) }
        } else {
            root
        };
        notes.push(BassNote {
            tick,
            length: ctx.ticks_per_bar,
            degree,
            accent: if i == 0 { Accent::Strong } else { Accent::Normal },
        });
    }
    if rng.random_bool(density * 0.5) {
        let next_root = root_degree(ctx, bar + 1);
        notes.push(BassNote {
            tick: ctx.step_tick(bar, 14),
            length: ctx.step_ticks * 2,
            degree: next_root + fifth(ctx) - octave_up(ctx),
            accent: Accent::Ghost,
        });
    }
}

fn syncopated(
    ctx: &LayerContext,
    bar: u32,
    anchors: &[u32],
    density: f64,
    rng: &mut PatternRng,
    notes: &mut Vec<BassNote>,
) {
    let root = root_degree(ctx, bar);
    for &tick in anchors {
        let steps = rng.range_u32_inclusive(1, 3);
        notes.push(BassNote {
            tick,
            length: steps * ctx.step_ticks,
            degree: root,
            accent: Accent::Strong,
        });
    }
    for step in (3..STEPS_PER_BAR).step_by(4) {
        if rng.random_bool(density) {
            let steps = rng.range_u32_inclusive(1, 2);
            let degree = root + *rng.choose(&[0, 0, fifth(ctx), octave_up(ctx)]).unwrap_or(&0);
            notes.push(BassNote {
                tick: ctx.swung_tick(bar, step),
                length: steps * ctx.step_ticks,
                degree,
                accent: Accent::Normal,
            });
        }
    }
}

/// Four-note eighth riff shared by every bar of a rolling line.
fn rolling_riff(ctx: &LayerContext, rng: &mut PatternRng) -> [i32; 4] {
    if ctx.profile.bass_style != BassStyle::Rolling {
        return [0; 4];
    }
    let choices = [0, 0, fifth(ctx), octave_up(ctx), 2, -1];
    let mut riff = [0; 4];
    for slot in riff.iter_mut().skip(1) {
        *slot = *rng.choose(&choices).unwrap_or(&0);
    }
    riff
}

fn rolling(
    ctx: &LayerContext,
    bar: u32,
    riff: &[i32; 4],
    density: f64,
    rng: &mut PatternRng,
    notes: &mut Vec<BassNote>,
) {
    let root = root_degree(ctx, bar);
    for eighth in 0..8u32 {
        if eighth > 0 && rng.random_bool((1.0 - density) * 0.3) {
            continue;
        }
        notes.push(BassNote {
            tick: ctx.step_tick(bar, eighth * 2),
            length: ctx.step_ticks * 2,
            degree: root + riff[(eighth % 4) as usize],
            accent: if eighth % 4 == 0 { Accent::Strong } else { Accent::Normal },
        });
    }
}

fn walking(ctx: &LayerContext, bar: u32, rng: &mut PatternRng, notes: &mut Vec<BassNote>) {
    let root = root_degree(ctx, bar);
    let target = root_degree(ctx, bar + 1);
    let mut degree = root;
    for beat in 0..4u32 {
        if beat == 3 {
            // Approach the next root from a step away.
            degree = if target >= degree { target - 1 } else { target + 1 };
        } else if beat > 0 {
            degree += *rng.choose(&[-1, 1, 1, 2]).unwrap_or(&1);
        }
        notes.push(BassNote {
            tick: ctx.step_tick(bar, beat * 4),
            length: ctx.step_ticks * 4,
            degree,
            accent: if beat == 0 { Accent::Strong } else { Accent::Normal },
        });
    }
}

fn sliding(
    ctx: &LayerContext,
    bar: u32,
    anchors: &[u32],
    density: f64,
    rng: &mut PatternRng,
    notes: &mut Vec<BassNote>,
) {
    let root = root_degree(ctx, bar);
    for (i, &tick) in anchors.iter().enumerate() {
        let degree = if i > 0 && rng.random_bool(density * 0.4) {
            root + if rng.random_bool(0.5) { fifth(ctx) } else { octave_up(ctx) }
        } else {
            root
        };
        notes.push(BassNote {
            tick,
            length: ctx.ticks_per_bar,
            degree,
            accent: Accent::Strong,
        });
    }
}

/// Sort, drop duplicates, trim overlaps, and pitch the notes.
fn to_events(ctx: &LayerContext, octave: u8, mut notes: Vec<BassNote>) -> Vec<NoteEvent> {
    notes.sort_by_key(|n| n.tick);
    notes.dedup_by_key(|n| n.tick);
    let total = ctx.total_ticks();
    let mut events = Vec::with_capacity(notes.len());
    for (i, note) in notes.iter().enumerate() {
        if note.tick >= total {
            continue;
        }
        let limit = notes.get(i + 1).map_or(total, |next| next.tick.min(total));
        let duration = note.length.min(limit - note.tick).max(1);
        let pitch = ctx.scale.degree_to_pitch(note.degree, octave);
        events.push(NoteEvent::pitched(
            Voice::Bass,
            pitch,
            note.tick,
            duration,
            velocity(ctx.config, Voice::Bass, note.accent),
        ));
    }
    events
}
