// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Monotonic time sources for the profiler.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A source of monotonic instants.
///
/// Implementations are expected never to go backwards. The profiler still
/// checks every delta and treats a regression as a fatal clock fault.
pub trait MonotonicClock {
    /// Current reading.
    fn now(&self) -> Instant;
}

/// The platform monotonic clock ([`Instant::now`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl MonotonicClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// A clock that only moves when told to.
///
/// Workloads under test advance it to simulate an exact duration, which makes
/// profiler statistics fully deterministic. Share it between the profiler and
/// the workload through an [`Rc`].
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    elapsed: Cell<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock reading an arbitrary fixed origin.
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Move the clock backward, saturating at the origin.
    pub fn rewind(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get().saturating_sub(by));
    }

    /// Total time elapsed since the origin.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed.get()
    }
}
