use crate::clock::{elapsed_ms, Clock, MonotonicClock};
use crate::error::{DrillError, DrillResult};
use crate::selector::{LetterSelector, SlowBiasSelector};
use crate::settings::Settings;
use crate::stats::StatsSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, trace};

/// Speed tier of a timed correct reaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Speed {
    Fast,
    Medium,
    Slow,
}

impl Speed {
    pub fn classify(raw_ms: u64, settings: &Settings) -> Self {
        if raw_ms <= settings.fast_ms {
            Speed::Fast
        } else if raw_ms <= settings.medium_ms {
            Speed::Medium
        } else {
            Speed::Slow
        }
    }
}

/// What a single keystroke meant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputOutcome {
    pub hit: bool,
    /// The target letter at the time of the keystroke
    pub letter: char,
    /// `None` when the reaction was not timed
    pub speed: Option<Speed>,
    pub time_ms: u64,
    /// True when this keystroke must not contribute a timing sample
    pub skip_time: bool,
    /// True only for the first keystroke of the session
    pub is_first: bool,
}

impl InputOutcome {
    fn untimed(hit: bool, letter: char, is_first: bool) -> Self {
        Self {
            hit,
            letter,
            speed: None,
            time_ms: 0,
            skip_time: true,
            is_first,
        }
    }
}

/// One practice run: the upcoming-letter queue plus progress counters.
///
/// A session is never reset; start a new run by constructing a new one.
#[derive(Debug)]
pub struct DrillSession<C: Clock = MonotonicClock, R: Rng = StdRng> {
    letters: Vec<char>,
    queue: VecDeque<char>,
    correct: u32,
    attempts: u32,
    mistake_on_current: bool,
    is_first: bool,
    target_shown_at: Instant,
    session_start: Option<Instant>,
    clock: C,
    rng: R,
}

impl DrillSession {
    /// Session on the system clock with an entropy-seeded RNG
    pub fn new<S: StatsSource + ?Sized>(
        letters: Vec<char>,
        upcoming_count: usize,
        settings: &Settings,
        stats: &S,
    ) -> DrillResult<Self> {
        Self::with_clock_and_rng(
            letters,
            upcoming_count,
            settings,
            stats,
            MonotonicClock,
            StdRng::from_entropy(),
        )
    }

    /// Session on the system clock with a reproducible letter sequence
    pub fn seeded<S: StatsSource + ?Sized>(
        letters: Vec<char>,
        upcoming_count: usize,
        settings: &Settings,
        stats: &S,
        seed: u64,
    ) -> DrillResult<Self> {
        Self::with_clock_and_rng(
            letters,
            upcoming_count,
            settings,
            stats,
            MonotonicClock,
            StdRng::seed_from_u64(seed),
        )
    }
}

impl<C: Clock, R: Rng> DrillSession<C, R> {
    pub fn with_clock_and_rng<S: StatsSource + ?Sized>(
        letters: Vec<char>,
        upcoming_count: usize,
        settings: &Settings,
        stats: &S,
        clock: C,
        rng: R,
    ) -> DrillResult<Self> {
        if letters.is_empty() {
            return Err(DrillError::InvalidPool);
        }

        let now = clock.now();
        let mut session = Self {
            letters,
            queue: VecDeque::with_capacity(1 + upcoming_count),
            correct: 0,
            attempts: 0,
            mistake_on_current: false,
            is_first: true,
            target_shown_at: now,
            session_start: None,
            clock,
            rng,
        };
        session.fill(upcoming_count, settings, stats);
        session.target_shown_at = session.clock.now();
        debug!(pool = session.letters.len(), queue = ?session.queue, "drill session created");
        Ok(session)
    }

    pub fn current_letter(&self) -> Option<char> {
        self.queue.front().copied()
    }

    pub fn queue(&self) -> &VecDeque<char> {
        &self.queue
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn is_first(&self) -> bool {
        self.is_first
    }

    pub fn mistake_on_current(&self) -> bool {
        self.mistake_on_current
    }

    pub fn has_started(&self) -> bool {
        self.session_start.is_some()
    }

    /// Percentage of keystrokes that hit, once any were made
    pub fn accuracy(&self) -> Option<u32> {
        if self.attempts == 0 {
            return None;
        }
        Some((f64::from(self.correct) / f64::from(self.attempts) * 100.0).round() as u32)
    }

    /// Correct letters per minute since the first keystroke
    pub fn lpm(&self) -> Option<u32> {
        let start = self.session_start?;
        if self.correct < 2 {
            return None;
        }
        let mins = self.clock.now().saturating_duration_since(start).as_secs_f64() / 60.0;
        if mins <= 0.0 {
            return None;
        }
        Some((f64::from(self.correct) / mins).round() as u32)
    }

    /// Evaluate one keystroke against the current target
    pub fn handle_input<S: StatsSource + ?Sized>(
        &mut self,
        typed: char,
        settings: &Settings,
        stats: &S,
    ) -> InputOutcome {
        let now = self.clock.now();
        let raw_ms = elapsed_ms(self.target_shown_at, now);
        let paused = raw_ms > settings.pause_ms;
        let Some(letter) = self.current_letter() else {
            // Unreachable for a constructed session: the queue always holds a target
            return InputOutcome::untimed(false, typed, self.is_first);
        };
        let hit = typed == letter;
        trace!(%typed, %letter, raw_ms, hit, "keystroke");

        if self.is_first {
            // The first reaction has no meaningful anchor and is never timed
            self.is_first = false;
            self.session_start = Some(now);
            self.attempts += 1;
            if hit {
                self.correct += 1;
                self.advance(settings.upcoming_count, settings, stats);
            } else {
                self.mistake_on_current = true;
            }
            return InputOutcome::untimed(hit, letter, true);
        }

        self.attempts += 1;

        if !hit {
            self.mistake_on_current = true;
            return InputOutcome::untimed(false, letter, false);
        }

        self.correct += 1;
        let skip_time = paused || self.mistake_on_current;
        let outcome = if skip_time {
            InputOutcome::untimed(true, letter, false)
        } else {
            InputOutcome {
                hit: true,
                letter,
                speed: Some(Speed::classify(raw_ms, settings)),
                time_ms: raw_ms,
                skip_time: false,
                is_first: false,
            }
        };
        self.advance(settings.upcoming_count, settings, stats);
        outcome
    }

    /// Move to the next target, topping the queue up to `1 + upcoming_count`
    pub fn advance<S: StatsSource + ?Sized>(
        &mut self,
        upcoming_count: usize,
        settings: &Settings,
        stats: &S,
    ) {
        self.queue.pop_front();
        self.fill(upcoming_count, settings, stats);
        self.target_shown_at = self.clock.now();
        self.mistake_on_current = false;
        debug!(current = ?self.current_letter(), "advanced");
    }

    fn fill<S: StatsSource + ?Sized>(&mut self, upcoming_count: usize, settings: &Settings, stats: &S) {
        let needed = 1 + upcoming_count;
        let selector = SlowBiasSelector::new(stats, settings.slow_pct, settings.slow_n);
        while self.queue.len() < needed {
            let last = self.queue.back().copied();
            match selector.select_letter(&self.letters, last, &mut self.rng) {
                Some(letter) => self.queue.push_back(letter),
                None => break,
            }
        }
    }
}
