// Drum layer.
//
// Each bar starts from the profile's 16-step template. Template hits on
// quarter-note steps become kicks (on every quarter for four-on-the-floor
// templates), the template's backbeat steps always carry a snare, and
// off-quarter template hits become syncopated kicks or ghost snares. Ghost
// snares are sprinkled on free steps with probability `complexity * 0.3`,
// scaled by the atmosphere's density (0.6 sparse, 1.5 dense).
// Hats follow the atmosphere's rhythmic density: offbeat eighths when
// sparse, eighths with the odd sixteenth when moderate, straight sixteenths
// (with triplet rolls on trap-like templates) when dense.
//
// Every fourth bar is a fill: the second half of the bar gains tom hits
// (snare if no toms are allowed) with probability `complexity * 0.5`. A
// crash marks bar 0 and every eighth bar when the profile allows one.
//
// Every voice passes through `DrumVoice::resolve`, so a profile only ever
// hears its allowed voices; hits with no allowed substitute are dropped.
// Kick ticks are returned alongside the events for the bass layer to lock
// onto.

use crate::humanize::{Accent, velocity};
use crate::layer::{LayerContext, STEPS_PER_BAR};
use crate::profile::RhythmDensity;
use crate::track::NoteEvent;
use crate::voice::{DrumVoice, Voice};
use beatsmith_prng::PatternRng;

/// Output of the drum layer.
#[derive(Debug, Clone, Default)]
pub struct DrumPattern {
    pub events: Vec<NoteEvent>,
    /// Start ticks of every kick, ascending.
    pub kick_ticks: Vec<u32>,
}

impl DrumPattern {
    fn hit(&mut self, ctx: &LayerContext, voice: DrumVoice, tick: u32, gate: u32, accent: Accent) {
        let Some(voice) = voice.resolve(&ctx.profile.allowed_voices) else {
            return;
        };
        let vel = velocity(ctx.config, Voice::Drum(voice), accent);
        self.events.push(NoteEvent::drum(voice, tick, gate, vel));
        if voice == DrumVoice::Kick {
            self.kick_ticks.push(tick);
        }
    }
}

pub fn generate(ctx: &LayerContext, rng: &mut PatternRng) -> DrumPattern {
    let mut pattern = DrumPattern::default();
    for bar in 0..ctx.bars {
        generate_bar(ctx, bar, rng, &mut pattern);
    }
    pattern.kick_ticks.sort_unstable();
    pattern.kick_ticks.dedup();
    tracing::debug!(
        hits = pattern.events.len(),
        kicks = pattern.kick_ticks.len(),
        "drum layer"
    );
    pattern
}

fn generate_bar(ctx: &LayerContext, bar: u32, rng: &mut PatternRng, out: &mut DrumPattern) {
    let template = ctx.profile.drum_template;
    let steps = template.steps();
    let backbeat = template.backbeat();
    let gate = ctx.drum_gate();
    let fill_bar = bar % 4 == 3;
    let complexity = ctx.complexity as f64;
    let ghost_weight = ctx.profile.atmosphere.density().ghost_weight();

    if bar % 8 == 0 && ctx.profile.allows(DrumVoice::Crash) {
        out.hit(ctx, DrumVoice::Crash, ctx.bar_start(bar), ctx.step_ticks * 4, Accent::Strong);
    }

    for step in 0..STEPS_PER_BAR {
        let tick = ctx.swung_tick(bar, step);
        let on_template = steps[step as usize] == 1;
        let on_quarter = step % 4 == 0;
        let on_backbeat = backbeat.contains(&(step as usize));

        // Kick and snare.
        let mut snare_placed = false;
        if on_backbeat {
            out.hit(ctx, DrumVoice::Snare, tick, gate, Accent::Strong);
            snare_placed = true;
            if template.four_on_floor() {
                out.hit(ctx, DrumVoice::Kick, tick, gate, Accent::Normal);
            }
        } else if on_quarter && (on_template || template.four_on_floor()) {
            let accent = if step == 0 { Accent::Strong } else { Accent::Normal };
            out.hit(ctx, DrumVoice::Kick, tick, gate, accent);
        } else if on_template {
            if rng.random_bool(0.3 + 0.5 * complexity) {
                out.hit(ctx, DrumVoice::Kick, tick, gate, Accent::Normal);
            } else {
                out.hit(ctx, DrumVoice::Snare, tick, gate, Accent::Ghost);
                snare_placed = true;
            }
        }

        // Fill or ghost notes on the remaining steps.
        if !snare_placed && !on_template && !on_backbeat {
            if fill_bar && step >= 8 {
                if rng.random_bool(complexity * 0.5) {
                    let tom = if step < 12 { DrumVoice::HighTom } else { DrumVoice::LowTom };
                    if tom.resolve(&ctx.profile.allowed_voices).is_some() {
                        out.hit(ctx, tom, tick, gate, Accent::Normal);
                    } else {
                        out.hit(ctx, DrumVoice::Snare, tick, gate, Accent::Normal);
                    }
                }
            } else if rng.random_bool(complexity * 0.3 * ghost_weight) {
                out.hit(ctx, DrumVoice::Snare, tick, gate, Accent::Ghost);
            }
        }

        hats(ctx, bar, step, rng, out);
    }
}

fn hats(ctx: &LayerContext, bar: u32, step: u32, rng: &mut PatternRng, out: &mut DrumPattern) {
    let tick = ctx.swung_tick(bar, step);
    let gate = ctx.drum_gate();
    let complexity = ctx.complexity as f64;
    let accent = if step % 4 == 0 { Accent::Normal } else { Accent::Ghost };

    let play = match ctx.profile.atmosphere.density() {
        RhythmDensity::Sparse => step % 4 == 2 || (step % 2 == 0 && rng.random_bool(complexity * 0.5)),
        RhythmDensity::Moderate => step % 2 == 0 || rng.random_bool(complexity * 0.25),
        RhythmDensity::Dense => {
            if step % 2 == 1
                && ctx.profile.drum_template.rolls()
                && rng.random_bool(complexity * 0.25)
            {
                roll(ctx, bar, step, out);
                return;
            }
            true
        }
    };
    if !play {
        return;
    }

    let open = step == 14
        && ctx.profile.atmosphere.density() != RhythmDensity::Sparse
        && rng.random_bool(ctx.energy as f64 * 0.5);
    let voice = if open { DrumVoice::OpenHat } else { DrumVoice::ClosedHat };
    out.hit(ctx, voice, tick, gate, accent);
}

/// Three closed-hat hits spread evenly over one step.
fn roll(ctx: &LayerContext, bar: u32, step: u32, out: &mut DrumPattern) {
    let spacing = ctx.step_ticks / 3;
    let gate = ctx.drum_gate().min(spacing).max(1);
    let start = ctx.step_tick(bar, step);
    for k in 0..3 {
        out.hit(ctx, DrumVoice::ClosedHat, start + k * spacing, gate, Accent::Ghost);
    }
}
