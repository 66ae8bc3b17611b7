use crate::drill::{InputOutcome, Speed};

/// Per-run summary built from the outcomes a drill session hands back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTally {
    pub fast: u32,
    pub medium: u32,
    pub slow: u32,
    pub untimed_hits: u32,
    pub misses: u32,
    pub timed_ms: Vec<u64>,
    pub last: Option<InputOutcome>,
}

impl SessionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &InputOutcome) {
        self.last = Some(*outcome);
        if !outcome.hit {
            self.misses += 1;
            return;
        }
        match outcome.speed {
            Some(Speed::Fast) => self.fast += 1,
            Some(Speed::Medium) => self.medium += 1,
            Some(Speed::Slow) => self.slow += 1,
            None => self.untimed_hits += 1,
        }
        if !outcome.skip_time {
            self.timed_ms.push(outcome.time_ms);
        }
    }

    pub fn mean_ms(&self) -> Option<f64> {
        mean(&self.timed_ms)
    }

    pub fn std_dev_ms(&self) -> Option<f64> {
        std_dev(&self.timed_ms)
    }
}

fn mean(data: &[u64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<u64>() as f64 / count as f64),
    }
}

fn std_dev(data: &[u64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|&value| {
            let diff = data_mean - value as f64;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(hit: bool, speed: Option<Speed>, time_ms: u64) -> InputOutcome {
        InputOutcome {
            hit,
            letter: 'a',
            speed,
            time_ms,
            skip_time: speed.is_none(),
            is_first: false,
        }
    }

    #[test]
    fn empty_tally_has_no_averages() {
        let tally = SessionTally::new();
        assert_eq!(tally.mean_ms(), None);
        assert_eq!(tally.std_dev_ms(), None);
        assert!(tally.last.is_none());
    }

    #[test]
    fn tally_counts_tiers_and_misses() {
        let mut tally = SessionTally::new();
        tally.record(&outcome(true, Some(Speed::Fast), 200));
        tally.record(&outcome(true, Some(Speed::Medium), 600));
        tally.record(&outcome(true, Some(Speed::Slow), 1000));
        tally.record(&outcome(true, None, 0));
        tally.record(&outcome(false, None, 0));

        assert_eq!((tally.fast, tally.medium, tally.slow), (1, 1, 1));
        assert_eq!(tally.untimed_hits, 1);
        assert_eq!(tally.misses, 1);
        assert_eq!(tally.timed_ms, vec![200, 600, 1000]);
        assert_eq!(tally.mean_ms(), Some(600.0));
        assert_eq!(tally.last.map(|o| o.hit), Some(false));
    }

    #[test]
    fn std_dev_of_timed_samples() {
        assert_eq!(std_dev(&[5, 5, 5, 5]), Some(0.0));
        assert_eq!(std_dev(&[42]), Some(0.0));
        let sd = std_dev(&[100, 120, 90, 102, 94]).unwrap();
        assert!((sd - 10.322790320451151).abs() < 1e-9);
    }
}
