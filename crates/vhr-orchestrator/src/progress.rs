//! Progress checkpoints, polling progress, and cosmetic interpolation.
//!
//! Real checkpoints: 0 validating, 10 starting, 20..=90 polling (by
//! attempt), 100 completed. Interpolation only ever moves progress forward
//! and never past [`POLLING_CEILING`]; completion is always a real event.

use std::time::Duration;

use crate::config::PollConfig;

pub const VALIDATING: u8 = 0;
pub const STARTING: u8 = 10;
pub const POLLING_FLOOR: u8 = 20;
pub const POLLING_CEILING: u8 = 90;
pub const COMPLETED: u8 = 100;

/// Period of the optional interpolation ticker.
pub const INTERPOLATION_TICK: Duration = Duration::from_millis(500);

/// Progress for poll attempt `attempt` (1-based) out of `max_attempts`:
/// `min(90, 20 + floor(attempt / max * 70))`.
pub fn polling_progress(attempt: u32, max_attempts: u32) -> u8 {
    let max = u64::from(max_attempts.max(1));
    let attempt = u64::from(attempt).min(max);
    let span = u64::from(POLLING_CEILING - POLLING_FLOOR);
    let advance = u8::try_from(attempt * span / max).unwrap_or(POLLING_CEILING - POLLING_FLOOR);
    (POLLING_FLOOR + advance).clamp(POLLING_FLOOR, POLLING_CEILING)
}

pub fn polling_step(attempt: u32, max_attempts: u32) -> String {
    format!("Polling for results (attempt {attempt}/{max_attempts})")
}

/// Seconds left before polling gives up: the smaller of the remaining
/// attempt budget and the remaining wall-clock budget, rounded up.
pub fn estimated_seconds_remaining(attempt: u32, config: &PollConfig, elapsed: Duration) -> u64 {
    let remaining_attempts = config.max_attempts.saturating_sub(attempt);
    let by_attempts = config.interval.saturating_mul(remaining_attempts);
    let by_clock = config.timeout.saturating_sub(elapsed);
    by_attempts.min(by_clock).as_secs_f64().ceil() as u64
}

/// Label for a progress value, used while interpolating.
pub fn step_label(progress: u8) -> &'static str {
    match progress {
        0..=9 => "Validating VIN",
        10..=39 => "Gathering vehicle data",
        40..=69 => "Analysing vehicle history",
        70..=89 => "Generating report",
        _ => "Finalizing report",
    }
}

/// Next interpolated value: a tenth of the remaining distance to the
/// ceiling, at least one point, never past it.
pub fn interpolate(current: u8) -> u8 {
    if current >= POLLING_CEILING {
        return current;
    }
    let step = ((POLLING_CEILING - current) / 10).max(1);
    current + step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polling_progress_matches_formula() {
        assert_eq!(polling_progress(1, 100), 20);
        assert_eq!(polling_progress(50, 100), 55);
        assert_eq!(polling_progress(100, 100), 90);
        assert_eq!(polling_progress(1, 3), 43);
        assert_eq!(polling_progress(3, 3), 90);
    }

    #[test]
    fn polling_progress_stays_in_band() {
        for max in [1, 2, 7, 100] {
            let mut last = 0;
            for attempt in 0..=max + 5 {
                let p = polling_progress(attempt, max);
                assert!((POLLING_FLOOR..=POLLING_CEILING).contains(&p));
                assert!(p >= last);
                last = p;
            }
        }
        assert_eq!(polling_progress(0, 0), POLLING_FLOOR);
    }

    #[test]
    fn eta_takes_the_tighter_budget() {
        let config = PollConfig {
            interval: Duration::from_secs(2),
            max_attempts: 100,
            timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(60),
        };
        // 98 attempts left (196 s) vs 50 s of clock: clock wins.
        assert_eq!(estimated_seconds_remaining(2, &config, Duration::from_secs(10)), 50);
        // 3 attempts left (6 s) vs 55 s of clock: attempts win.
        assert_eq!(estimated_seconds_remaining(97, &config, Duration::from_secs(5)), 6);
        assert_eq!(estimated_seconds_remaining(100, &config, Duration::from_secs(5)), 0);
        assert_eq!(estimated_seconds_remaining(1, &config, Duration::from_secs(90)), 0);
    }

    #[test]
    fn interpolation_is_monotone_and_capped() {
        let mut p = POLLING_FLOOR;
        for _ in 0..200 {
            let next = interpolate(p);
            assert!(next >= p);
            assert!(next <= POLLING_CEILING);
            p = next;
        }
        assert_eq!(p, POLLING_CEILING);
        assert_eq!(interpolate(95), 95);
    }

    #[test]
    fn step_labels_cover_bands() {
        assert_eq!(step_label(VALIDATING), "Validating VIN");
        assert_eq!(step_label(POLLING_FLOOR), "Gathering vehicle data");
        assert_eq!(step_label(55), "Analysing vehicle history");
        assert_eq!(step_label(75), "Generating report");
        assert_eq!(step_label(POLLING_CEILING), "Finalizing report");
    }

    #[test]
    fn polling_step_names_attempts() {
        assert_eq!(polling_step(4, 100), "Polling for results (attempt 4/100)");
    }
}
