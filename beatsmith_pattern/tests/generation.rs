// End-to-end properties of `Generator::generate` over the built-in
// catalogue.

use beatsmith_pattern::profile::Family;
use beatsmith_pattern::{
    GenerateError, GenerationRequest, Generator, GeneratorConfig, GenreCatalog, Voice,
};

fn generator() -> Generator {
    Generator::builtin().unwrap()
}

#[test]
fn liquid_dnb_scenario() {
    let generator = generator();
    let request = GenerationRequest::new("liquid_dnb", 16)
        .with_seed(42)
        .with_tempo(174);
    let track = generator.generate(&request).unwrap();
    let profile = generator.catalog().get("liquid_dnb").unwrap();

    assert_eq!(track.bar_count(), 16);
    assert_eq!(track.tempo_bpm(), 174);
    assert_eq!(track.seed(), 42);
    assert_eq!(track.total_ticks(), 16 * track.ticks_per_bar());
    assert_eq!(track.total_ticks(), 16 * 1920);
    assert!(track.has_melody());
    for event in track.events() {
        if let Voice::Drum(d) = event.voice {
            assert!(profile.allows(d), "{d:?} not allowed in liquid_dnb");
        }
        assert!(event.end_tick() <= track.total_ticks());
    }
}

#[test]
fn identical_requests_give_identical_tracks() {
    let generator = generator();
    for genre in ["liquid_dnb", "boom_bap", "house", "bluegrass", "hyperpop"] {
        let request = GenerationRequest::new(genre, 12).with_seed(1234);
        let a = generator.generate(&request).unwrap();
        let b = generator.generate(&request).unwrap();
        assert_eq!(a.events(), b.events(), "{genre}");
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

#[test]
fn different_seeds_differ() {
    let generator = generator();
    let a = generator
        .generate(&GenerationRequest::new("jungle_dnb", 8).with_seed(1))
        .unwrap();
    let b = generator
        .generate(&GenerationRequest::new("jungle_dnb", 8).with_seed(2))
        .unwrap();
    assert_ne!(a.events(), b.events());
}

#[test]
fn every_genre_respects_its_profile() {
    let generator = generator();
    for profile in generator.catalog().profiles() {
        for seed in [0, 7] {
            let request = GenerationRequest::new(profile.key.clone(), 8).with_seed(seed);
            let track = generator.generate(&request).unwrap();
            let key = &profile.key;

            assert!(
                (profile.bpm_min..=profile.bpm_max).contains(&track.tempo_bpm()),
                "{key}: tempo {}",
                track.tempo_bpm()
            );
            assert_eq!(track.bar_count(), profile.clamp_bars(8), "{key}");
            assert_eq!(track.has_melody(), profile.melodic, "{key}");
            assert!(!track.events().is_empty(), "{key}: empty track");
            for event in track.events() {
                if let Voice::Drum(d) = event.voice {
                    assert!(profile.allows(d), "{key}: {d:?} not allowed");
                    assert_eq!(event.pitch, d.gm_key());
                }
                assert!(event.duration >= 1);
                assert!(event.end_tick() <= track.total_ticks(), "{key}: event overruns");
                assert!((1..=127).contains(&event.velocity));
                assert!(event.pitch <= 127);
            }
        }
    }
}

#[test]
fn bar_count_is_clamped_to_profile_range() {
    let generator = generator();
    let profile = generator.catalog().get("liquid_dnb").unwrap();
    let short = generator
        .generate(&GenerationRequest::new("liquid_dnb", 0).with_seed(3))
        .unwrap();
    let long = generator
        .generate(&GenerationRequest::new("liquid_dnb", 10_000).with_seed(3))
        .unwrap();
    assert_eq!(short.bar_count(), profile.min_bars);
    assert_eq!(long.bar_count(), profile.max_bars);
    assert_eq!(long.total_ticks(), profile.max_bars * long.ticks_per_bar());
}

#[test]
fn explicit_tempo_is_clamped() {
    let generator = generator();
    let track = generator
        .generate(&GenerationRequest::new("boom_bap", 4).with_seed(1).with_tempo(300))
        .unwrap();
    let profile = generator.catalog().get("boom_bap").unwrap();
    assert_eq!(track.tempo_bpm(), profile.bpm_max);
}

#[test]
fn unknown_genre_is_an_error() {
    let err = generator()
        .generate(&GenerationRequest::new("not_a_real_genre", 8).with_seed(1))
        .unwrap_err();
    assert_eq!(
        err,
        GenerateError::UnknownGenre {
            key: "not_a_real_genre".into()
        }
    );
}

#[test]
fn genre_lookup_normalizes_key() {
    let track = generator()
        .generate(&GenerationRequest::new("Liquid-DNB", 4).with_seed(9))
        .unwrap();
    assert_eq!(track.genre(), "liquid_dnb");
}

#[test]
fn missing_seed_is_echoed_and_reproduces() {
    let generator = generator();
    let first = generator
        .generate(&GenerationRequest::new("trap", 8))
        .unwrap();
    let replay = generator
        .generate(&GenerationRequest::new("trap", 8).with_seed(first.seed()))
        .unwrap();
    assert_eq!(first, replay);
}

#[test]
fn melody_hint_ignored_for_non_melodic_genre() {
    let generator = generator();
    let profile = generator
        .catalog()
        .profiles()
        .find(|p| !p.melodic)
        .unwrap()
        .key
        .clone();
    let plain = generator
        .generate(&GenerationRequest::new(profile.clone(), 8).with_seed(5))
        .unwrap();
    let hinted = generator
        .generate(
            &GenerationRequest::new(profile, 8)
                .with_seed(5)
                .with_melody_density(1.0),
        )
        .unwrap();
    assert_eq!(plain, hinted);
    assert!(!hinted.has_melody());
}

#[test]
fn out_of_range_scalars_are_clamped() {
    let generator = generator();
    let wild = generator
        .generate(
            &GenerationRequest::new("house", 8)
                .with_seed(4)
                .with_complexity(9.0)
                .with_energy(-3.0),
        )
        .unwrap();
    let tame = generator
        .generate(
            &GenerationRequest::new("house", 8)
                .with_seed(4)
                .with_complexity(1.0)
                .with_energy(0.0),
        )
        .unwrap();
    assert_eq!(wild, tame);
}

#[test]
fn drums_identical_when_melodic_layer_disabled() {
    let builtin = GenreCatalog::builtin().unwrap();
    let melodic = builtin.get("liquid_dnb").unwrap().clone();
    let mut silent = melodic.clone();
    silent.key = "liquid_dnb_rhythm".into();
    silent.melodic = false;
    let catalog = GenreCatalog::from_profiles([melodic, silent]).unwrap();
    let generator = Generator::new(catalog, GeneratorConfig::default()).unwrap();

    let with_melody = generator
        .generate(&GenerationRequest::new("liquid_dnb", 16).with_seed(42))
        .unwrap();
    let without = generator
        .generate(&GenerationRequest::new("liquid_dnb_rhythm", 16).with_seed(42))
        .unwrap();

    let rhythm = |events: &[beatsmith_pattern::NoteEvent]| {
        events
            .iter()
            .filter(|e| !e.voice.is_melodic())
            .copied()
            .collect::<Vec<_>>()
    };
    assert_eq!(rhythm(with_melody.events()), rhythm(without.events()));
    assert!(with_melody.has_melody());
    assert!(!without.has_melody());
    assert_eq!(with_melody.tempo_bpm(), without.tempo_bpm());
}

#[test]
fn families_cover_catalogue() {
    let catalog = GenreCatalog::builtin().unwrap();
    let total: usize = Family::ALL.iter().map(|&f| catalog.by_family(f).count()).sum();
    assert_eq!(total, catalog.len());
}

#[test]
fn custom_resolution_scales_ticks() {
    let config = GeneratorConfig {
        ticks_per_quarter: 96,
        ..GeneratorConfig::default()
    };
    let generator = Generator::new(GenreCatalog::builtin().unwrap(), config).unwrap();
    let track = generator
        .generate(&GenerationRequest::new("boom_bap", 4).with_seed(8))
        .unwrap();
    assert_eq!(track.ticks_per_bar(), 384);
    assert_eq!(track.total_ticks(), 4 * 384);
    for event in track.events() {
        assert!(event.end_tick() <= track.total_ticks());
    }
}

#[test]
fn comping_and_fx_follow_the_family() {
    let generator = generator();
    for profile in generator.catalog().profiles() {
        let track = generator
            .generate(&GenerationRequest::new(profile.key.clone(), 16).with_seed(19))
            .unwrap();
        let key = &profile.key;
        let comp = track.events().iter().filter(|e| e.voice == Voice::Comp).count();
        let fx = track.events().iter().filter(|e| e.voice == Voice::Fx).count();
        assert_eq!(comp > 0, profile.family.comp_style().is_some(), "{key}: {comp} comp notes");
        if profile.family.fx_style().is_none() {
            assert_eq!(fx, 0, "{key}");
        }
        if profile.family == Family::Futuristic {
            assert!(fx > 0, "{key}: no texture");
        }
    }
}
