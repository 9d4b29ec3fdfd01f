//! Running statistics
//!
//! A [`DeltaStatistic`] follows a cumulative counter: each update computes the
//! change since the previous sample and folds it into an exponential moving
//! average, so the average estimates the per-interval rate while `total`
//! mirrors the counter itself.

use serde::Serialize;

/// Smoothing factor applied to every new sample
pub const EMA_SMOOTHING_FACTOR: f64 = 0.1;

/// Exponential moving average with min/max tracking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistic {
    pub moving_average: f64,
    pub min: f64,
    pub max: f64,
    pub samples: u64,
}

impl Statistic {
    pub fn new() -> Self {
        Self {
            moving_average: 0.0,
            min: 0.0,
            max: 0.0,
            samples: 0,
        }
    }

    /// Fold a sample into the average. The first sample seeds it.
    pub fn update(&mut self, value: f64) {
        if self.samples == 0 {
            self.moving_average = value;
            self.min = value;
            self.max = value;
        } else {
            self.moving_average =
                EMA_SMOOTHING_FACTOR * value + (1.0 - EMA_SMOOTHING_FACTOR) * self.moving_average;
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.samples += 1;
    }
}

impl Default for Statistic {
    fn default() -> Self {
        Self::new()
    }
}

/// Cumulative total plus the smoothed per-interval delta
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeltaStatistic {
    pub total: u64,
    pub delta: Statistic,
}

impl DeltaStatistic {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reset a statistic to its startup state
pub fn initialize(stat: &mut DeltaStatistic) {
    *stat = DeltaStatistic::new();
}

/// Record the counter value observed at this tick
///
/// A value below the previous total means the counter holder was reset; the
/// new value is then taken as the whole delta.
pub fn update(stat: &mut DeltaStatistic, current_value: u64) {
    let delta = match current_value.checked_sub(stat.total) {
        Some(delta) => delta,
        None => {
            log::trace!(
                "Counter went back from {} to {}, resynchronizing",
                stat.total,
                current_value
            );
            current_value
        }
    };
    stat.delta.update(delta as f64);
    stat.total = current_value;
}

/// Smoothed per-interval delta; divide by the interval to get a rate
pub fn exponential_moving_average(stat: &DeltaStatistic) -> f64 {
    stat.delta.moving_average
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_total_follows_increasing_counter() {
        let mut stat = DeltaStatistic::new();
        for value in [3, 10, 10, 42, 1000] {
            update(&mut stat, value);
            assert_eq!(stat.total, value);
            assert!(exponential_moving_average(&stat) >= 0.0);
        }
    }

    #[test]
    fn test_smoothed_deltas() {
        let mut stat = DeltaStatistic::new();
        let expected = [100.0, 105.0, 94.5, 100.05];

        for (value, ema) in [100, 250, 250, 400].into_iter().zip(expected) {
            update(&mut stat, value);
            assert!(approx_eq(exponential_moving_average(&stat), ema));
        }
        assert_eq!(stat.total, 400);
        assert_eq!(stat.delta.min, 0.0);
        assert_eq!(stat.delta.max, 150.0);
    }

    #[test]
    fn test_counter_reset_resynchronizes() {
        let mut stat = DeltaStatistic::new();
        update(&mut stat, 500);
        update(&mut stat, 20);

        assert_eq!(stat.total, 20);
        // 0.1 * 20 + 0.9 * 500
        assert!(approx_eq(exponential_moving_average(&stat), 452.0));
    }

    #[test]
    fn test_initialize_clears_state() {
        let mut stat = DeltaStatistic::new();
        update(&mut stat, 77);
        initialize(&mut stat);

        assert_eq!(stat, DeltaStatistic::new());
        assert_eq!(exponential_moving_average(&stat), 0.0);
    }
}
