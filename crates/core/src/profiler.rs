// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Repeated, timed execution of a workload.
//!
//! [`Profiler::profile`] invokes a workload a fixed number of times and
//! reports iteration count, total, average, minimum and maximum duration in
//! whole microseconds. The total is measured around the whole loop, so it
//! includes the overhead between iterations and is generally not equal to
//! the sum of the per-iteration samples.

use crate::clock::{MonotonicClock, SystemClock};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Aggregate statistics for one profiled workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResult {
    /// Number of times the workload was invoked.
    pub iterations: u32,
    /// Duration of the whole iteration loop.
    pub total_micros: u32,
    /// `total_micros / iterations`, integer division.
    pub average_micros: u32,
    /// Shortest single iteration.
    pub min_micros: u32,
    /// Longest single iteration.
    pub max_micros: u32,
    /// Per-iteration durations in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<u32>,
}

impl ProfileResult {
    /// Compute statistics from the loop total and per-iteration samples.
    ///
    /// Returns `None` unless `iterations` is non-zero and there is exactly
    /// one sample per iteration.
    pub fn from_samples(iterations: u32, total_micros: u32, samples: Vec<u32>) -> Option<Self> {
        if iterations == 0 || samples.len() != iterations as usize {
            return None;
        }
        let (min_micros, max_micros) = samples
            .iter()
            .fold((u32::MAX, 0), |(min, max), &s| (min.min(s), max.max(s)));

        Some(Self {
            iterations,
            total_micros,
            average_micros: total_micros / iterations,
            min_micros,
            max_micros,
            samples,
        })
    }

    /// Total duration in milliseconds.
    pub fn total_ms(&self) -> f64 {
        micros_to_ms(self.total_micros)
    }

    /// Average duration in milliseconds.
    pub fn average_ms(&self) -> f64 {
        micros_to_ms(self.average_micros)
    }

    /// Minimum duration in milliseconds.
    pub fn min_ms(&self) -> f64 {
        micros_to_ms(self.min_micros)
    }

    /// Maximum duration in milliseconds.
    pub fn max_ms(&self) -> f64 {
        micros_to_ms(self.max_micros)
    }
}

/// Convert whole microseconds to fractional milliseconds.
pub fn micros_to_ms(micros: u32) -> f64 {
    f64::from(micros) / 1000.0
}

/// Times workloads against a monotonic clock.
pub struct Profiler {
    clock: Box<dyn MonotonicClock>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler").finish_non_exhaustive()
    }
}

impl Profiler {
    /// A profiler reading the system monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// A profiler reading the given clock.
    pub fn with_clock(clock: impl MonotonicClock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    /// Invoke `workload` exactly `iterations` times and measure it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIterations`] when `iterations` is zero.
    /// - [`Error::ClockFault`] when the clock is observed going backwards.
    pub fn profile<F>(&self, name: &str, iterations: u32, mut workload: F) -> Result<ProfileResult>
    where
        F: FnMut(),
    {
        if iterations == 0 {
            return Err(Error::InvalidIterations(name.to_string()));
        }

        let mut samples = Vec::with_capacity(iterations as usize);

        info!(name, iterations, "Starting");

        let profile_start = self.clock.now();
        for _ in 0..iterations {
            let iteration_start = self.clock.now();
            workload();
            let iteration_end = self.clock.now();
            samples.push(elapsed_micros(name, iteration_start, iteration_end)?);
        }
        let total_micros = elapsed_micros(name, profile_start, self.clock.now())?;

        let result = ProfileResult::from_samples(iterations, total_micros, samples)
            .ok_or_else(|| Error::InvalidIterations(name.to_string()))?;

        info!(
            name,
            total_ms = result.total_ms(),
            "Completed in {:.3}ms",
            result.total_ms()
        );

        Ok(result)
    }
}

/// Whole microseconds between two readings, truncated and clamped to `u32`.
fn elapsed_micros(name: &str, start: Instant, end: Instant) -> Result<u32> {
    match end.checked_duration_since(start) {
        Some(elapsed) => Ok(u32::try_from(elapsed.as_micros()).unwrap_or(u32::MAX)),
        None => Err(Error::ClockFault {
            name: name.to_string(),
            regression: start.duration_since(end),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::rc::Rc;
    use std::time::Duration;

    fn manual_profiler() -> (Profiler, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        (Profiler::with_clock(Rc::clone(&clock)), clock)
    }

    #[test]
    fn test_fixed_duration_workload() {
        let (profiler, clock) = manual_profiler();
        let mut calls = 0;

        let result = profiler
            .profile("Suite::fixed", 5, || {
                calls += 1;
                clock.advance(Duration::from_micros(1000));
            })
            .unwrap();

        assert_eq!(calls, 5);
        assert_eq!(result.iterations, 5);
        assert_eq!(result.total_micros, 5000);
        assert_eq!(result.average_micros, 1000);
        assert_eq!(result.min_micros, 1000);
        assert_eq!(result.max_micros, 1000);
        assert_eq!(result.samples, vec![1000; 5]);
    }

    #[test]
    fn test_varying_durations() {
        let (profiler, clock) = manual_profiler();
        let durations = [300u64, 100, 700, 200];
        let mut next = durations.iter();

        let result = profiler
            .profile("Suite::varying", 4, || {
                clock.advance(Duration::from_micros(*next.next().unwrap()));
            })
            .unwrap();

        assert_eq!(result.total_micros, 1300);
        assert_eq!(result.average_micros, 1300 / 4);
        assert_eq!(result.min_micros, 100);
        assert_eq!(result.max_micros, 700);
        assert!(result.min_micros <= result.average_micros);
        assert!(result.average_micros <= result.max_micros);
    }

    #[test]
    fn test_samples_truncate_to_whole_micros() {
        let (profiler, clock) = manual_profiler();

        let result = profiler
            .profile("Suite::truncate", 3, || {
                clock.advance(Duration::from_nanos(1999));
            })
            .unwrap();

        assert_eq!(result.samples, vec![1, 1, 1]);
        // The loop total is measured independently: 5997ns -> 5us.
        assert_eq!(result.total_micros, 5);
        assert_eq!(result.average_micros, 1);
    }

    #[test]
    fn test_total_includes_overhead_between_iterations() {
        let clock = Rc::new(ManualClock::new());
        // Every clock reading costs 10us of "overhead" after the workload.
        struct CostlyClock(Rc<ManualClock>);
        impl MonotonicClock for CostlyClock {
            fn now(&self) -> Instant {
                let reading = self.0.now();
                self.0.advance(Duration::from_micros(10));
                reading
            }
        }
        let profiler = Profiler::with_clock(CostlyClock(Rc::clone(&clock)));

        let result = profiler
            .profile("Suite::overhead", 2, || clock.advance(Duration::from_micros(100)))
            .unwrap();

        let sum: u32 = result.samples.iter().sum();
        assert!(result.total_micros > sum);
        assert_eq!(result.average_micros, result.total_micros / 2);
    }

    #[test]
    fn test_zero_iterations_is_rejected() {
        let profiler = Profiler::new();
        let mut calls = 0;
        let err = profiler.profile("Suite::zero", 0, || calls += 1).unwrap_err();
        assert!(matches!(err, Error::InvalidIterations(_)));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_clock_regression_is_a_fault() {
        let (profiler, clock) = manual_profiler();
        clock.advance(Duration::from_millis(10));

        let err = profiler
            .profile("Suite::backwards", 3, || clock.rewind(Duration::from_micros(5)))
            .unwrap_err();

        match err {
            Error::ClockFault { name, regression } => {
                assert_eq!(name, "Suite::backwards");
                assert_eq!(regression, Duration::from_micros(5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sleeping_workload_with_system_clock() {
        let profiler = Profiler::new();
        let result = profiler
            .profile("Suite::sleep", 5, || std::thread::sleep(Duration::from_micros(1000)))
            .unwrap();

        assert_eq!(result.iterations, 5);
        assert!(result.min_micros >= 1000);
        assert!(result.total_micros >= 5000);
        assert_eq!(result.average_micros, result.total_micros / 5);
        assert!(result.min_micros <= result.max_micros);
    }

    #[test]
    fn test_millisecond_conversions() {
        let result = ProfileResult::from_samples(2, 3000, vec![1000, 1500]).unwrap();
        assert_eq!(result.total_ms(), 3.0);
        assert_eq!(result.average_ms(), 1.5);
        assert_eq!(result.min_ms(), 1.0);
        assert_eq!(result.max_ms(), 1.5);
    }

    #[test]
    fn test_from_samples_rejects_inconsistent_input() {
        assert!(ProfileResult::from_samples(0, 10, vec![]).is_none());
        assert!(ProfileResult::from_samples(2, 10, vec![]).is_none());
        assert!(ProfileResult::from_samples(2, 10, vec![5]).is_none());

        let single = ProfileResult::from_samples(1, 0, vec![0]).unwrap();
        assert_eq!(single.min_micros, 0);
        assert_eq!(single.max_micros, 0);
    }
}
