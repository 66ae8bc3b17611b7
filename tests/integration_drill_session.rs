use letterdrill::clock::ManualClock;
use letterdrill::{DrillSession, LetterStat, LetterStats, Settings, Speed};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

fn session_with(
    letters: &str,
    upcoming: usize,
    settings: &Settings,
    stats: &HashMap<char, LetterStat>,
    seed: u64,
) -> (DrillSession<ManualClock, StdRng>, ManualClock) {
    let clock = ManualClock::new();
    let session = DrillSession::with_clock_and_rng(
        letters.chars().collect(),
        upcoming,
        settings,
        stats,
        clock.clone(),
        StdRng::seed_from_u64(seed),
    )
    .unwrap();
    (session, clock)
}

#[test]
fn scenario_a_two_letter_pool() {
    let settings = Settings {
        upcoming_count: 1,
        ..Settings::default()
    };
    let (s, _) = session_with("ab", 1, &settings, &HashMap::new(), 1);
    assert_eq!(s.queue().len(), 2);
    assert!(s.queue().iter().all(|l| *l == 'a' || *l == 'b'));
}

#[test]
fn scenario_b_first_hit() {
    let settings = Settings::default();
    let stats = HashMap::new();
    let (mut s, clock) = session_with("abcdef", 2, &settings, &stats, 2);
    let second = s.queue()[1];

    clock.advance_ms(900);
    let target = s.current_letter().unwrap();
    let out = s.handle_input(target, &settings, &stats);

    assert!(out.hit);
    assert!(out.is_first);
    assert_eq!(out.time_ms, 0);
    assert_eq!(out.speed, None);
    assert_eq!((s.attempts(), s.correct()), (1, 1));
    assert_eq!(s.current_letter(), Some(second));
}

#[test]
fn scenario_c_miss_then_hit_on_second_target() {
    let settings = Settings::default();
    let stats = HashMap::new();
    let (mut s, clock) = session_with("abcdef", 2, &settings, &stats, 3);

    let first = s.current_letter().unwrap();
    s.handle_input(first, &settings, &stats);

    let target = s.current_letter().unwrap();
    let wrong = if target == 'a' { 'b' } else { 'a' };
    clock.advance_ms(120);
    let miss = s.handle_input(wrong, &settings, &stats);
    assert!(!miss.hit);
    assert_eq!(s.current_letter(), Some(target));
    assert_eq!(s.queue().len(), 3);

    let next = s.queue()[1];
    clock.advance_ms(80);
    let hit = s.handle_input(target, &settings, &stats);
    assert!(hit.hit);
    assert!(hit.skip_time);
    assert_eq!(hit.speed, None);
    assert_eq!(hit.time_ms, 0);
    assert_eq!(s.current_letter(), Some(next));
    assert_eq!(s.queue().len(), 3);
    assert_eq!((s.attempts(), s.correct()), (3, 2));
}

#[test]
fn scenario_d_singleton_slow_set_always_wins() {
    let mut stats = HashMap::new();
    stats.insert(
        'x',
        LetterStat {
            total_ms: 3000,
            timed_count: 3,
            ..Default::default()
        },
    );
    let settings = Settings {
        slow_pct: 100,
        ..Settings::default()
    };
    let (mut s, clock) = session_with("abcx", 2, &settings, &stats, 4);
    assert!(s.queue().iter().all(|&l| l == 'x'));

    for _ in 0..20 {
        clock.advance_ms(300);
        let out = s.handle_input('x', &settings, &stats);
        assert!(out.hit);
        assert!(s.queue().iter().all(|&l| l == 'x'));
    }
}

#[test]
fn invariants_hold_over_random_keystrokes() {
    let stats = LetterStats::new();
    let mut rng = StdRng::seed_from_u64(99);
    let clock = ManualClock::new();
    let mut settings = Settings::default();
    let mut s = DrillSession::with_clock_and_rng(
        "asdfjkl".chars().collect(),
        settings.upcoming_count,
        &settings,
        &stats,
        clock.clone(),
        StdRng::seed_from_u64(5),
    )
    .unwrap();

    let mut prev_attempts = s.attempts();
    for step in 0..500 {
        // Vary the queue depth upward now and then; the queue only ever grows
        if step % 97 == 0 {
            settings.upcoming_count += 1;
        }
        clock.advance_ms(rng.gen_range(0..5000));

        let before_letter = s.current_letter();
        let before_len = s.queue().len();
        let typed = if rng.gen_bool(0.7) {
            s.current_letter().unwrap()
        } else {
            'z'
        };
        let out = s.handle_input(typed, &settings, &stats);

        assert_eq!(s.attempts(), prev_attempts + 1);
        prev_attempts = s.attempts();
        assert!(s.correct() <= s.attempts());
        assert_eq!(out.is_first, step == 0);

        if out.hit {
            assert_eq!(s.queue().len(), 1 + settings.upcoming_count);
            if let Some(speed) = out.speed {
                assert!(!out.skip_time);
                let expected = Speed::classify(out.time_ms, &settings);
                assert_eq!(speed, expected);
                assert!(out.time_ms <= settings.pause_ms);
            } else {
                assert!(out.skip_time);
                assert_eq!(out.time_ms, 0);
            }
        } else {
            assert_eq!(s.current_letter(), before_letter);
            assert_eq!(s.queue().len(), before_len);
            assert!(out.skip_time);
            assert_eq!(out.speed, None);
        }
    }
}
