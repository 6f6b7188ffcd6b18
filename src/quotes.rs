//! Encouragement shown next to today's score. Cosmetic: nothing here is persisted, a quote is
//! picked again on every display.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::entities::Score;

const LOW_QUOTES: [&str; 2] = ["Every small step counts!", "Keep going, you'll get there!"];
const MEDIUM_QUOTES: [&str; 2] = ["Good work! Keep building momentum.", "You're doing great!"];
const HIGH_QUOTES: [&str; 2] = [
    "Amazing consistency! You're crushing it!",
    "Outstanding effort!",
];

/// Source of pick indices for quote selection. Exists so that tests can pin the pick.
pub trait QuotePicker {
    /// Returns an index that will be reduced into `0..pool_len`.
    fn pick(&self, pool_len: usize) -> usize;
}

/// Picks off the subsecond clock. Plenty uniform for choosing a greeting from a two-element
/// pool.
pub struct EntropyPicker;

impl QuotePicker for EntropyPicker {
    fn pick(&self, pool_len: usize) -> usize {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|v| v.subsec_nanos())
            .unwrap_or(0);
        nanos as usize % pool_len
    }
}

fn pool_for(score: Score) -> &'static [&'static str] {
    match score.value() {
        0..=3 => &LOW_QUOTES,
        4..=7 => &MEDIUM_QUOTES,
        _ => &HIGH_QUOTES,
    }
}

/// Selects a message for the given score. Scores 0-3 draw from the low pool, 4-7 from the
/// medium one, 8-10 from the high one; the pick within a pool is uniform.
pub fn quote_for(score: Score, picker: &impl QuotePicker) -> &'static str {
    let pool = pool_for(score);
    pool[picker.pick(pool.len()) % pool.len()]
}

#[cfg(test)]
mod tests {
    use crate::store::entities::Score;

    use super::{quote_for, QuotePicker, HIGH_QUOTES, LOW_QUOTES, MEDIUM_QUOTES};

    struct FixedPicker(usize);

    impl QuotePicker for FixedPicker {
        fn pick(&self, _pool_len: usize) -> usize {
            self.0
        }
    }

    fn score(value: i64) -> Score {
        Score::new(value).unwrap()
    }

    #[test]
    fn test_pools_partition_by_range() {
        for v in 0..=3 {
            assert!(LOW_QUOTES.contains(&quote_for(score(v), &FixedPicker(0))));
        }
        for v in 4..=7 {
            assert!(MEDIUM_QUOTES.contains(&quote_for(score(v), &FixedPicker(0))));
        }
        for v in 8..=10 {
            assert!(HIGH_QUOTES.contains(&quote_for(score(v), &FixedPicker(0))));
        }
    }

    #[test]
    fn test_every_pool_member_is_reachable() {
        assert_eq!(quote_for(score(9), &FixedPicker(0)), HIGH_QUOTES[0]);
        assert_eq!(quote_for(score(9), &FixedPicker(1)), HIGH_QUOTES[1]);
    }

    #[test]
    fn test_overflowing_pick_stays_in_pool() {
        assert!(LOW_QUOTES.contains(&quote_for(score(2), &FixedPicker(17))));
    }
}
