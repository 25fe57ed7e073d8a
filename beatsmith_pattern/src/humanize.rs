// Velocity shaping.
//
// Layers assign each event an accent level and get back a deterministic
// velocity (base velocity of the voice, scaled by the accent). After all
// layers are merged and sorted, `jitter_velocities` walks the events in
// their final order and adds a uniform offset drawn from the velocity
// stream. The velocity stream is forked once per part, so the jitter of a
// drum hit depends only on the drum part, never on whether a lead exists.

use crate::config::GeneratorConfig;
use crate::track::NoteEvent;
use crate::voice::{Part, Voice};
use beatsmith_prng::PatternRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Ghost,
    Normal,
    Strong,
}

/// Velocity of `voice` at `accent`, before jitter.
pub fn velocity(config: &GeneratorConfig, voice: Voice, accent: Accent) -> u8 {
    let base = config.velocities.base(voice) as f32;
    let scaled = match accent {
        Accent::Ghost => base * config.ghost_scale,
        Accent::Normal => base,
        Accent::Strong => base * config.accent_scale,
    };
    scaled.round().clamp(1.0, 127.0) as u8
}

/// Add seeded jitter to every event, in slice order within each part.
/// Velocities stay in 1..=127.
pub fn jitter_velocities(events: &mut [NoteEvent], jitter: u8, rng: &mut PatternRng) {
    if jitter == 0 {
        for event in events.iter_mut() {
            event.velocity = event.velocity.clamp(1, 127);
        }
        return;
    }
    let mut streams: Vec<PatternRng> = Part::ALL.iter().map(|_| rng.fork()).collect();
    let j = jitter as i32;
    for event in events.iter_mut() {
        let offset = streams[event.voice.part() as usize].range_i32_inclusive(-j, j);
        event.velocity = (event.velocity as i32 + offset).clamp(1, 127) as u8;
    }
}
