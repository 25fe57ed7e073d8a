// Effect layer: sparse hits for drum and bass, slow fifths for futuristic.
//
// Hits fire at most once per bar with the atmosphere's effect density, on a
// random step, pitched from the scale between 80 and 100 and held for a
// quarter to a full bar (cut at the bar line).
//
// Texture lays an eight-bar cluster every eight bars: three distinct pitches
// from the stacked root and fifth over three octaves, starting in octave 2.

use crate::humanize::{Accent, velocity};
use crate::layer::{LayerContext, STEPS_PER_BAR};
use crate::profile::FxStyle;
use crate::track::NoteEvent;
use crate::voice::Voice;
use beatsmith_prng::PatternRng;

const HIT_LOW: u8 = 80;
const HIT_HIGH: u8 = 100;
const TEXTURE_OCTAVE: u8 = 2;
const TEXTURE_BARS: u32 = 8;
const TEXTURE_VOICES: usize = 3;

pub fn generate(ctx: &LayerContext, rng: &mut PatternRng) -> Vec<NoteEvent> {
    let Some(style) = ctx.profile.family.fx_style() else {
        return Vec::new();
    };
    let events = match style {
        FxStyle::Hits => hits(ctx, rng),
        FxStyle::Texture => texture(ctx, rng),
    };
    tracing::debug!(notes = events.len(), ?style, "fx layer");
    events
}

fn hits(ctx: &LayerContext, rng: &mut PatternRng) -> Vec<NoteEvent> {
    let chance = ctx.profile.atmosphere.fx_density();
    let pitches = ctx.scale.pitches_in_range(HIT_LOW, HIT_HIGH);
    let mut events = Vec::new();
    for bar in 0..ctx.bars {
        if !rng.random_bool(chance) {
            continue;
        }
        let start = ctx.step_tick(bar, rng.range_u32_inclusive(0, STEPS_PER_BAR - 1));
        let Some(&pitch) = rng.choose(&pitches) else {
            continue;
        };
        let length = rng.range_u32_inclusive(4, STEPS_PER_BAR) * ctx.step_ticks;
        let bar_end = ctx.bar_start(bar + 1);
        events.push(NoteEvent::pitched(
            Voice::Fx,
            pitch,
            start,
            length.min(bar_end - start),
            velocity(ctx.config, Voice::Fx, Accent::Normal),
        ));
    }
    events
}

fn texture(ctx: &LayerContext, rng: &mut PatternRng) -> Vec<NoteEvent> {
    let len = ctx.scale.kind.len() as i32;
    let fifth = ctx.scale.kind.fifth_degree();
    let mut events = Vec::new();
    let mut bar = 0;
    while bar < ctx.bars {
        let span = TEXTURE_BARS.min(ctx.bars - bar);
        let mut pool = [0, fifth, len, len + fifth, 2 * len, 2 * len + fifth];
        // Partial shuffle: the first three slots end up a uniform pick.
        for i in 0..TEXTURE_VOICES {
            let j = rng.range_u32_inclusive(i as u32, pool.len() as u32 - 1) as usize;
            pool.swap(i, j);
        }
        for &degree in &pool[..TEXTURE_VOICES] {
            events.push(NoteEvent::pitched(
                Voice::Fx,
                ctx.scale.degree_to_pitch(degree, TEXTURE_OCTAVE),
                ctx.bar_start(bar),
                span * ctx.ticks_per_bar,
                velocity(ctx.config, Voice::Fx, Accent::Ghost),
            ));
        }
        bar += span;
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::layer::tests::context;
    use crate::profile::tests::synthetic_profile;
    use crate::profile::{Atmosphere, Family, GenreProfile};

    fn family_profile(family: Family, atmosphere: Atmosphere) -> GenreProfile {
        let mut profile = synthetic_profile("fx", false);
        profile.family = family;
        profile.atmosphere = atmosphere;
        profile.max_bars = 64;
        profile
    }

    #[test]
    fn only_dnb_and_futuristic_have_effects() {
        let config = GeneratorConfig::default();
        for family in [Family::HipHop, Family::Electronic, Family::Rock, Family::Country] {
            let profile = family_profile(family, Atmosphere::Dark);
            let ctx = context(&profile, &config, 16, 0.5);
            assert!(generate(&ctx, &mut PatternRng::new(2)).is_empty(), "{family:?}");
        }
    }

    #[test]
    fn hits_stay_in_their_bar() {
        let config = GeneratorConfig::default();
        let profile = family_profile(Family::Dnb, Atmosphere::Dark);
        let ctx = context(&profile, &config, 32, 0.5);
        let hits = generate(&ctx, &mut PatternRng::new(8));
        assert!(!hits.is_empty());
        assert_eq!(hits, generate(&ctx, &mut PatternRng::new(8)));
        for e in &hits {
            assert_eq!(e.voice, Voice::Fx);
            assert!((HIT_LOW..=HIT_HIGH).contains(&e.pitch));
            assert!(ctx.scale.is_in_scale(e.pitch));
            let bar = e.start_tick / ctx.ticks_per_bar;
            assert!(e.end_tick() <= ctx.bar_start(bar + 1));
            assert!(e.duration >= ctx.step_ticks);
        }
    }

    #[test]
    fn sparse_atmospheres_get_fewer_hits() {
        let config = GeneratorConfig::default();
        let minimal = family_profile(Family::Dnb, Atmosphere::Minimal);
        let dark = family_profile(Family::Dnb, Atmosphere::Dark);
        let minimal_ctx = context(&minimal, &config, 64, 0.5);
        let dark_ctx = context(&dark, &config, 64, 0.5);
        let mut sparse = 0;
        let mut busy = 0;
        for seed in 0..4 {
            sparse += generate(&minimal_ctx, &mut PatternRng::new(seed)).len();
            busy += generate(&dark_ctx, &mut PatternRng::new(seed)).len();
        }
        assert!(sparse * 2 < busy, "minimal {sparse} vs dark {busy}");
    }

    #[test]
    fn texture_holds_three_fifths_per_eight_bars() {
        let config = GeneratorConfig::default();
        let profile = family_profile(Family::Futuristic, Atmosphere::Dark);
        let ctx = context(&profile, &config, 12, 0.5);
        let texture = generate(&ctx, &mut PatternRng::new(30));
        assert_eq!(texture.len(), 6);
        let allowed: Vec<u8> = [0, 4, 7, 11, 14, 18]
            .iter()
            .map(|&d| ctx.scale.degree_to_pitch(d, TEXTURE_OCTAVE))
            .collect();
        for chunk in texture.chunks(3) {
            let mut pitches: Vec<u8> = chunk.iter().map(|e| e.pitch).collect();
            pitches.sort();
            pitches.dedup();
            assert_eq!(pitches.len(), 3);
            assert!(pitches.iter().all(|p| allowed.contains(p)));
        }
        assert_eq!(texture[0].duration, 8 * 1920);
        assert_eq!(texture[3].start_tick, 8 * 1920);
        assert_eq!(texture[3].duration, 4 * 1920);
    }
}
