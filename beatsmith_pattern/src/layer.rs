// Shared inputs of the drum, bass and melodic layers.
//
// `LayerContext` is built once per `generate` call from the profile, the
// config and the normalized request, after the master stream has fixed the
// tempo and the harmony (root pitch class and a four-degree progression).
// Layers read it and draw only from their own forked stream.
//
// Timing is 4/4 with a sixteenth-note step grid: `ticks_per_bar` is
// `4 * ticks_per_quarter` and a step is a sixteenth of a bar. Off-beat
// sixteenths (odd steps) are delayed by a fixed swing offset derived from the
// profile's swing, the request energy, and the config's maximum swing
// fraction.

use crate::config::GeneratorConfig;
use crate::profile::GenreProfile;
use crate::request::NormalizedRequest;
use crate::scale::Scale;

/// Steps per bar.
pub const STEPS_PER_BAR: u32 = 16;

/// Degree progressions the harmony is drawn from. Degree 0 is the scale
/// root; each entry covers four bars (or four pad chords).
pub const PROGRESSIONS: [[i32; 4]; 8] = [
    [0, 5, 3, 4],
    [0, 3, 4, 0],
    [0, 4, 5, 3],
    [0, 0, 3, 4],
    [0, 5, 2, 4],
    [0, 6, 5, 4],
    [0, 3, 0, 4],
    [0, 2, 3, 1],
];

#[derive(Debug, Clone)]
pub struct LayerContext<'a> {
    pub profile: &'a GenreProfile,
    pub config: &'a GeneratorConfig,
    pub bars: u32,
    pub complexity: f32,
    pub energy: f32,
    pub melody_density: Option<f32>,
    pub scale: Scale,
    pub progression: [i32; 4],
    pub ticks_per_bar: u32,
    pub step_ticks: u32,
    /// Delay applied to every odd step.
    pub swing_offset: u32,
}

impl<'a> LayerContext<'a> {
    pub fn new(
        profile: &'a GenreProfile,
        config: &'a GeneratorConfig,
        request: &NormalizedRequest,
        scale: Scale,
        progression: [i32; 4],
    ) -> Self {
        let ticks_per_bar = config.ticks_per_bar();
        let step_ticks = config.ticks_per_step();
        let swing_amount = profile.swing * (0.5 + 0.5 * request.energy);
        let swing_offset =
            (swing_amount * step_ticks as f32 * config.max_swing_fraction).round() as u32;
        LayerContext {
            profile,
            config,
            bars: request.bar_count,
            complexity: request.complexity,
            energy: request.energy,
            melody_density: request.melody_density,
            scale,
            progression,
            ticks_per_bar,
            step_ticks,
            swing_offset: swing_offset.min(step_ticks.saturating_sub(1)),
        }
    }

    pub fn total_ticks(&self) -> u32 {
        self.bars * self.ticks_per_bar
    }

    pub fn bar_start(&self, bar: u32) -> u32 {
        bar * self.ticks_per_bar
    }

    /// Straight (unswung) tick of a step.
    pub fn step_tick(&self, bar: u32, step: u32) -> u32 {
        self.bar_start(bar) + step * self.step_ticks
    }

    /// Tick of a step with swing applied to odd steps.
    pub fn swung_tick(&self, bar: u32, step: u32) -> u32 {
        let tick = self.step_tick(bar, step);
        if step % 2 == 1 { tick + self.swing_offset } else { tick }
    }

    /// Progression degree for a bar.
    pub fn chord_degree(&self, bar: u32) -> i32 {
        self.progression[(bar % 4) as usize]
    }

    /// Gate length of a drum hit: short enough that a swung hit never
    /// reaches the next step.
    pub fn drum_gate(&self) -> u32 {
        (self.step_ticks / 4)
            .min(self.step_ticks - self.swing_offset)
            .max(1)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::profile::tests::synthetic_profile;
    use crate::request::{GenerationRequest, NormalizedRequest};
    use crate::scale::ScaleKind;

    pub(crate) fn context<'a>(
        profile: &'a GenreProfile,
        config: &'a GeneratorConfig,
        bars: u32,
        complexity: f32,
    ) -> LayerContext<'a> {
        let request = GenerationRequest::new(profile.key.clone(), bars).with_complexity(complexity);
        let normalized = NormalizedRequest::resolve(&request, profile);
        LayerContext::new(
            profile,
            config,
            &normalized,
            Scale::new(ScaleKind::NaturalMinor, 9),
            PROGRESSIONS[0],
        )
    }

    #[test]
    fn swing_only_moves_odd_steps() {
        let profile = synthetic_profile("synth", true);
        let config = GeneratorConfig::default();
        let ctx = context(&profile, &config, 4, 0.5);
        // swing 0.2, energy 0.6: 0.2 * 0.8 * 120 * 0.5 = 9.6 -> 10
        assert_eq!(ctx.swing_offset, 10);
        assert_eq!(ctx.swung_tick(0, 2), 240);
        assert_eq!(ctx.swung_tick(1, 3), 1920 + 360 + 10);
    }

    #[test]
    fn zero_swing_is_straight() {
        let mut profile = synthetic_profile("synth", true);
        profile.swing = 0.0;
        let config = GeneratorConfig::default();
        let ctx = context(&profile, &config, 4, 0.5);
        assert_eq!(ctx.swing_offset, 0);
        assert_eq!(ctx.swung_tick(0, 1), ctx.step_tick(0, 1));
    }

    #[test]
    fn gate_fits_inside_a_step() {
        let mut profile = synthetic_profile("synth", true);
        profile.swing = 1.0;
        let config = GeneratorConfig {
            max_swing_fraction: 0.85,
            ..GeneratorConfig::default()
        };
        let ctx = context(&profile, &config, 4, 0.5);
        assert!(ctx.swing_offset + ctx.drum_gate() <= ctx.step_ticks);
    }

    #[test]
    fn progression_cycles_every_four_bars() {
        let profile = synthetic_profile("synth", true);
        let config = GeneratorConfig::default();
        let ctx = context(&profile, &config, 8, 0.5);
        assert_eq!(ctx.chord_degree(1), ctx.chord_degree(5));
        assert_eq!(ctx.total_ticks(), 8 * 1920);
    }
}
