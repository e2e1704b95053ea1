use std::sync::Mutex;

use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Classification, IntensityReading, IntensitySource};
use crate::error::FetchError;

/// Representative forecast intensity (gCO2/kWh) for each level.
const LEVEL_FORECAST: [i32; 5] = [30, 90, 170, 260, 350];

/// Minutes per reported window.
const WINDOW_MINUTES: u64 = 30;

struct WalkState {
    level: usize,
    window: u64,
    rng: StdRng,
}

/// Offline intensity source driven by a seeded random walk.
///
/// Each fetch moves the classification at most one level up or down
/// (clamped at the ends), so consecutive readings drift the way a real grid
/// mix does rather than jumping between extremes. Never fails.
pub struct SimulatedSource {
    state: Mutex<WalkState>,
}

impl SimulatedSource {
    /// Creates a walk starting at `moderate`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: Mutex::new(WalkState {
                level: 2,
                window: 0,
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }

    /// Advances the walk and returns the next reading.
    pub fn next_reading(&self) -> IntensityReading {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let step: i32 = state.rng.random_range(-1..=1);
        let last = Classification::LEVELS.len() as i32 - 1;
        state.level = (state.level as i32 + step).clamp(0, last) as usize;

        let jitter: i32 = state.rng.random_range(-10..=10);
        let forecast = LEVEL_FORECAST[state.level] + jitter;
        let from = window_label(state.window);
        state.window = state.window.wrapping_add(1);
        let to = window_label(state.window);

        IntensityReading {
            from,
            to,
            forecast,
            actual: Some(forecast),
            classification: Classification::LEVELS[state.level].clone(),
        }
    }
}

/// Formats a window index as an `HH:MM` offset from the start of the walk.
fn window_label(window: u64) -> String {
    let minutes = window.wrapping_mul(WINDOW_MINUTES);
    format!("+{:02}:{:02}", minutes / 60, minutes % 60)
}

#[async_trait]
impl IntensitySource for SimulatedSource {
    async fn fetch_current(&self) -> Result<IntensityReading, FetchError> {
        Ok(self.next_reading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let a = SimulatedSource::new(7);
        let b = SimulatedSource::new(7);
        for _ in 0..50 {
            assert_eq!(a.next_reading(), b.next_reading());
        }
    }

    #[test]
    fn walk_moves_at_most_one_level() {
        let source = SimulatedSource::new(42);
        let mut previous = 2usize;
        for _ in 0..200 {
            let reading = source.next_reading();
            let level = reading
                .classification
                .level_index()
                .expect("walk only emits known levels");
            assert!(level.abs_diff(previous) <= 1);
            previous = level;
        }
    }

    #[test]
    fn window_counter_survives_long_runs() {
        let source = SimulatedSource::new(3);
        source.state.lock().expect("walk state").window = u64::MAX;
        let reading = source.next_reading();
        assert_eq!(reading.to, "+00:00");
        assert!(!reading.from.is_empty());
    }

    #[test]
    fn windows_are_contiguous() {
        let source = SimulatedSource::new(1);
        let first = source.next_reading();
        let second = source.next_reading();
        assert_eq!(first.from, "+00:00");
        assert_eq!(first.to, second.from);
        assert_eq!(second.to, "+01:00");
    }

    #[tokio::test]
    async fn fetch_never_fails() {
        let source = SimulatedSource::new(3);
        for _ in 0..10 {
            assert!(source.fetch_current().await.is_ok());
        }
    }
}
