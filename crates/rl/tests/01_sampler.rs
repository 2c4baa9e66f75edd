use rl::{sampler::sampler, EpisodeSample, FixedSampler, RandomSampler, RlError, Sampler, Window};

#[test]
fn fixed_sampling_returns_most_recent_window() {
    let mut s = FixedSampler;
    for table_length in [1usize, 5, 48, 2016] {
        for episode_length in 1..=table_length.min(50) {
            for _ in 0..3 {
                let w = s.sample(episode_length, table_length).unwrap();
                assert_eq!(w, Window { start: table_length - episode_length, end: table_length });
            }
        }
    }
}

#[test]
fn fixed_sampling_zero_length_uses_whole_table() {
    let w = FixedSampler.sample(0, 37).unwrap();
    assert_eq!(w, Window { start: 0, end: 37 });
    assert_eq!(w.len(), 37);
}

#[test]
fn fixed_sampling_rejects_window_longer_than_table() {
    let err = FixedSampler.sample(11, 10).unwrap_err();
    assert!(matches!(err, RlError::Configuration(_)));
}

#[test]
fn random_sampling_stays_in_bounds() {
    let mut s = RandomSampler::new(7);
    let (table_length, episode_length) = (100, 24);
    for _ in 0..1000 {
        let w = s.sample(episode_length, table_length).unwrap();
        assert!(w.start < table_length - episode_length);
        assert_eq!(w.len(), episode_length);
        assert!(w.end <= table_length);
    }
}

#[test]
fn random_sampling_is_reproducible_from_seed() {
    let draw = |seed| {
        let mut s = RandomSampler::new(seed);
        (0..20).map(|_| s.sample(10, 500).unwrap().start).collect::<Vec<_>>()
    };
    assert_eq!(draw(3), draw(3));
    assert_ne!(draw(3), draw(4));
}

#[test]
fn random_sampling_requires_more_rows_than_episode() {
    let mut s = RandomSampler::new(0);
    assert!(matches!(s.sample(10, 10), Err(RlError::Configuration(_))));
    assert!(matches!(s.sample(0, 10), Err(RlError::Configuration(_))));
    assert!(s.sample(9, 10).is_ok());
}

#[test]
fn strategy_is_resolved_from_mode() {
    let mut fixed = sampler(EpisodeSample::Fixed, 0);
    assert_eq!(fixed.sample(4, 10).unwrap().start, 6);
    let mut random = sampler(EpisodeSample::Random, 0);
    assert!(random.sample(4, 10).unwrap().start < 6);
}
