use crate::stats::StatsSource;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Draws allowed when trying to avoid repeating the tail letter from the slow set
pub const SLOW_PICK_MAX_TRIES: usize = 10;

/// Uniform draws allowed per pool letter before falling back to a deterministic pick
pub const UNIFORM_RETRIES_PER_LETTER: usize = 16;

/// Strategy for choosing the next letter to append to the queue
pub trait LetterSelector {
    /// Pick a letter from `letters`, avoiding an immediate repeat of `last`
    /// where the strategy can. Returns `None` only for an empty pool.
    fn select_letter<R: Rng + ?Sized>(
        &self,
        letters: &[char],
        last: Option<char>,
        rng: &mut R,
    ) -> Option<char>;
}

/// Uniform pick from the whole pool
pub struct UniformSelector;

impl LetterSelector for UniformSelector {
    fn select_letter<R: Rng + ?Sized>(
        &self,
        letters: &[char],
        last: Option<char>,
        rng: &mut R,
    ) -> Option<char> {
        if letters.len() <= 1 {
            return letters.first().copied();
        }

        for _ in 0..UNIFORM_RETRIES_PER_LETTER * letters.len() {
            let letter = *letters.choose(rng)?;
            if Some(letter) != last {
                return Some(letter);
            }
        }

        // A pool of two or more distinct letters always has one that differs from `last`
        letters
            .iter()
            .copied()
            .find(|&l| Some(l) != last)
            .or_else(|| letters.first().copied())
    }
}

/// Pick biased toward the letters with the slowest average reaction time
pub struct SlowBiasSelector<'a, S: StatsSource + ?Sized> {
    pub stats: &'a S,
    /// Chance (0-100) of attempting a slow pick
    pub percent: u32,
    /// Number of slowest letters to draw from
    pub pool_size: usize,
}

impl<'a, S: StatsSource + ?Sized> SlowBiasSelector<'a, S> {
    pub fn new(stats: &'a S, percent: u32, pool_size: usize) -> Self {
        Self {
            stats,
            percent,
            pool_size,
        }
    }

    fn triggers<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        if self.percent == 0 {
            return false;
        }
        rng.gen_range(0.0..100.0) < f64::from(self.percent)
    }
}

impl<S: StatsSource + ?Sized> LetterSelector for SlowBiasSelector<'_, S> {
    fn select_letter<R: Rng + ?Sized>(
        &self,
        letters: &[char],
        last: Option<char>,
        rng: &mut R,
    ) -> Option<char> {
        if self.triggers(rng) {
            let slowest = slow_set(letters, self.stats, self.pool_size);
            if !slowest.is_empty() {
                let mut letter = *slowest.choose(rng)?;
                let mut tries = 1;
                while Some(letter) == last && slowest.len() > 1 && tries < SLOW_PICK_MAX_TRIES {
                    letter = *slowest.choose(rng)?;
                    tries += 1;
                }
                debug!(%letter, slow_set = ?slowest, "slow-biased pick");
                return Some(letter);
            }
        }

        UniformSelector.select_letter(letters, last, rng)
    }
}

/// The `pool_size` pool letters with the highest average reaction time.
/// Letters without timed observations are left out; ties keep pool order.
pub fn slow_set<S: StatsSource + ?Sized>(letters: &[char], stats: &S, pool_size: usize) -> Vec<char> {
    letters
        .iter()
        .filter_map(|&l| {
            stats
                .letter_stat(l)
                .and_then(|s| s.avg_ms())
                .map(|avg| (l, avg))
        })
        .sorted_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
        .take(pool_size)
        .map(|(l, _)| l)
        .collect()
}
