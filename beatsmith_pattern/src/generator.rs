// The pattern generator: one request in, one track out.
//
// `Generator` owns a genre catalogue and a validated config and is otherwise
// stateless, so it is `Send + Sync` and `generate` can be called from many
// threads at once (the dataset writer does exactly that).
//
// Randomness flows through a single master `PatternRng` seeded from the
// request seed (or from process entropy when the request has none; the seed
// actually used is echoed in the track). The master stream always draws, in
// this order:
//
// 1. a tempo sample from the profile's BPM range (drawn even when the
//    request fixes the tempo, so an explicit tempo changes nothing else),
// 2. the harmony: root pitch class, then a four-degree progression,
// 3. one forked child each for drums, bass, melody, velocity, comping, fx.
//
// Each layer consumes only its own child, so turning the melodic layer on
// or off leaves drums and bass untouched. Comping and fx were added after
// the first four and fork last, which keeps older tracks stable. After the layers run, events are
// merged, clipped to the track length, sorted by (start tick, voice, pitch),
// and finally humanized from the velocity stream in that sorted order.

use crate::config::GeneratorConfig;
use crate::error::{CatalogError, ConfigError, GenerateError};
use crate::humanize::jitter_velocities;
use crate::layer::{LayerContext, PROGRESSIONS};
use crate::profile::GenreCatalog;
use crate::request::{GenerationRequest, NormalizedRequest};
use crate::scale::Scale;
use crate::track::{GeneratedTrack, NoteEvent};
use crate::{bass, comping, drums, fx, melody};
use beatsmith_prng::PatternRng;

#[derive(Debug, Clone)]
pub struct Generator {
    catalog: GenreCatalog,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(catalog: GenreCatalog, config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Generator { catalog, config })
    }

    /// Built-in catalogue with the default config.
    pub fn builtin() -> Result<Self, CatalogError> {
        Ok(Generator {
            catalog: GenreCatalog::builtin()?,
            config: GeneratorConfig::default(),
        })
    }

    pub fn catalog(&self) -> &GenreCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&self, request: &GenerationRequest) -> Result<GeneratedTrack, GenerateError> {
        let profile =
            self.catalog
                .get(&request.genre)
                .ok_or_else(|| GenerateError::UnknownGenre {
                    key: request.genre.clone(),
                })?;
        let normalized = NormalizedRequest::resolve(request, profile);
        let seed = request.seed.unwrap_or_else(rand::random::<u64>);

        let mut master = PatternRng::new(seed);
        let sampled_tempo =
            master.range_u32_inclusive(profile.bpm_min as u32, profile.bpm_max as u32) as u16;
        let tempo_bpm = request
            .tempo
            .map_or(sampled_tempo, |bpm| profile.clamp_tempo(bpm));
        let root_pc = master.range_u32_inclusive(0, 11) as u8;
        let progression = *master.choose(&PROGRESSIONS).unwrap_or(&PROGRESSIONS[0]);
        let mut drum_rng = master.fork();
        let mut bass_rng = master.fork();
        let mut melody_rng = master.fork();
        let mut velocity_rng = master.fork();
        let mut comp_rng = master.fork();
        let mut fx_rng = master.fork();

        let scale = Scale::new(profile.atmosphere.scale_kind(), root_pc);
        let ctx = LayerContext::new(profile, &self.config, &normalized, scale, progression);

        let drum_pattern = drums::generate(&ctx, &mut drum_rng);
        let bass_line = bass::generate(&ctx, &drum_pattern.kick_ticks, &mut bass_rng);
        let mut events = drum_pattern.events;
        events.extend(bass_line);
        if profile.melodic {
            events.extend(melody::generate_lead(&ctx, &mut melody_rng));
            events.extend(melody::generate_pads(&ctx));
        }
        events.extend(comping::generate(&ctx, &mut comp_rng));
        events.extend(fx::generate(&ctx, &mut fx_rng));

        let mut events = merge(events, ctx.total_ticks());
        jitter_velocities(&mut events, self.config.velocity_jitter, &mut velocity_rng);

        tracing::debug!(
            genre = %profile.key,
            seed,
            tempo_bpm,
            bars = normalized.bar_count,
            events = events.len(),
            "generated track"
        );

        Ok(GeneratedTrack {
            genre: profile.key.clone(),
            family: profile.family,
            tempo_bpm,
            bar_count: normalized.bar_count,
            ticks_per_quarter: self.config.ticks_per_quarter,
            ticks_per_bar: ctx.ticks_per_bar,
            total_ticks: ctx.total_ticks(),
            seed,
            atmosphere: profile.atmosphere,
            scale,
            events,
        })
    }
}

/// Drop events past the end, clip durations to the end, sort canonically,
/// and remove exact (tick, voice, pitch) duplicates.
fn merge(mut events: Vec<NoteEvent>, total_ticks: u32) -> Vec<NoteEvent> {
    events.retain(|e| e.start_tick < total_ticks);
    for event in &mut events {
        event.duration = event.duration.min(total_ticks - event.start_tick).max(1);
    }
    events.sort_by_key(NoteEvent::sort_key);
    events.dedup_by_key(|e| e.sort_key());
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Family;
    use crate::profile::tests::synthetic_profile;
    use crate::voice::{DrumVoice, Voice};

    fn synthetic_generator() -> Generator {
        let catalog = GenreCatalog::from_profiles([
            synthetic_profile("melodic_synth", true),
            synthetic_profile("plain_synth", false),
        ])
        .unwrap();
        Generator::new(catalog, GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn generator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Generator>();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let catalog = GenreCatalog::from_profiles([synthetic_profile("x", true)]).unwrap();
        let config = GeneratorConfig {
            ticks_per_quarter: 7,
            ..GeneratorConfig::default()
        };
        assert!(Generator::new(catalog, config).is_err());
    }

    #[test]
    fn merge_clips_and_sorts() {
        let events = vec![
            NoteEvent::pitched(Voice::Bass, 40, 100, 50, 90),
            NoteEvent::drum(DrumVoice::Kick, 100, 10, 100),
            NoteEvent::pitched(Voice::Pad, 60, 0, 500, 60),
            NoteEvent::drum(DrumVoice::Kick, 300, 10, 100),
            NoteEvent::drum(DrumVoice::Kick, 100, 10, 100),
        ];
        let merged = merge(events, 120);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].voice, Voice::Pad);
        assert_eq!(merged[0].duration, 120);
        assert_eq!(merged[1].voice, Voice::Drum(DrumVoice::Kick));
        assert_eq!(merged[2].voice, Voice::Bass);
        assert_eq!(merged[2].duration, 20);
    }

    #[test]
    fn explicit_tempo_does_not_change_events() {
        let generator = synthetic_generator();
        let base = GenerationRequest::new("melodic_synth", 4).with_seed(5);
        let sampled = generator.generate(&base).unwrap();
        let fixed = generator
            .generate(&base.clone().with_tempo(sampled.tempo_bpm()))
            .unwrap();
        assert_eq!(sampled, fixed);
    }

    #[test]
    fn tempo_is_clamped() {
        let generator = synthetic_generator();
        let fast = generator
            .generate(&GenerationRequest::new("plain_synth", 2).with_seed(1).with_tempo(999))
            .unwrap();
        assert_eq!(fast.tempo_bpm(), 124);
        let slow = generator
            .generate(&GenerationRequest::new("plain_synth", 2).with_seed(1).with_tempo(0))
            .unwrap();
        assert_eq!(slow.tempo_bpm(), 120);
    }

    #[test]
    fn drums_and_bass_ignore_the_melodic_layer() {
        let generator = synthetic_generator();
        let melodic = generator
            .generate(&GenerationRequest::new("melodic_synth", 8).with_seed(31))
            .unwrap();
        let plain = generator
            .generate(&GenerationRequest::new("plain_synth", 8).with_seed(31))
            .unwrap();
        let rhythm = |t: &GeneratedTrack| -> Vec<NoteEvent> {
            t.events()
                .iter()
                .filter(|e| !e.voice.is_melodic())
                .copied()
                .collect()
        };
        assert_eq!(rhythm(&melodic), rhythm(&plain));
        assert!(melodic.has_melody());
        assert!(!plain.has_melody());
    }

    #[test]
    fn comping_and_fx_leave_the_rhythm_section_alone() {
        let mut rock = synthetic_profile("rock_synth", false);
        rock.family = Family::Rock;
        let mut dnb = synthetic_profile("dnb_synth", false);
        dnb.family = Family::Dnb;
        let catalog = GenreCatalog::from_profiles([
            synthetic_profile("plain_synth", false),
            rock,
            dnb,
        ])
        .unwrap();
        let generator = Generator::new(catalog, GeneratorConfig::default()).unwrap();
        let generate = |key: &str| {
            generator
                .generate(&GenerationRequest::new(key, 8).with_seed(44))
                .unwrap()
        };
        let rhythm = |t: &GeneratedTrack| -> Vec<NoteEvent> {
            t.events()
                .iter()
                .filter(|e| matches!(e.voice, Voice::Drum(_) | Voice::Bass))
                .copied()
                .collect()
        };
        let plain = generate("plain_synth");
        let rock = generate("rock_synth");
        let dnb = generate("dnb_synth");
        assert_eq!(rhythm(&plain), rhythm(&rock));
        assert_eq!(rhythm(&plain), rhythm(&dnb));
        assert!(rock.events().iter().any(|e| e.voice == Voice::Comp));
        assert!(!plain.events().iter().any(|e| matches!(e.voice, Voice::Comp | Voice::Fx)));
        assert!(!dnb.events().iter().any(|e| e.voice == Voice::Comp));
    }

    #[test]
    fn events_are_sorted_and_bounded() {
        let generator = synthetic_generator();
        let track = generator
            .generate(&GenerationRequest::new("melodic_synth", 8).with_seed(2))
            .unwrap();
        for pair in track.events().windows(2) {
            assert!(pair[0].sort_key() < pair[1].sort_key());
        }
        for e in track.events() {
            assert!(e.end_tick() <= track.total_ticks());
            assert!((1..=127).contains(&e.velocity));
        }
    }
}
