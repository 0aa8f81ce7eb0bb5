// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The logistic map, `x -> r * x * (1 - x)`.  A population model
//! that settles, oscillates or goes chaotic depending on the growth
//! rate `r`.  The first `transient` steps of a trajectory are thrown
//! away so that what gets recorded is the long-run behavior rather
//! than the approach to it.
//!
//! Nothing here clamps or rejects a rate or a starting value.  Outside
//! `r` in `[0, 4]` and `x0` in `[0, 1]` the recurrence diverges, and
//! that divergence is reported faithfully.

use crate::errors::{invalid, Result};

/// One trajectory request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LogisticParams {
    /// Growth rate.
    pub r: f64,
    /// Initial population.
    pub x0: f64,
    iterations: usize,
    transient: usize,
}

impl LogisticParams {
    /// `iterations` is the number of recorded values and must be
    /// positive; `transient` is the number of discarded warm-up steps.
    pub fn new(r: f64, x0: f64, iterations: usize, transient: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(invalid("iterations must be positive"));
        }
        Ok(LogisticParams {
            r,
            x0,
            iterations,
            transient,
        })
    }

    /// Number of recorded values.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of discarded warm-up steps.
    pub fn transient(&self) -> usize {
        self.transient
    }

    /// Runs the recurrence and returns the recorded values in order.
    pub fn iterate(&self) -> Vec<f64> {
        let mut trajectory = Vec::with_capacity(self.iterations);
        extend_trajectory(
            &mut trajectory,
            self.r,
            self.x0,
            self.iterations,
            self.transient,
        );
        trajectory
    }
}

/// Applies the map `transient` times, then `iterations` more times,
/// appending each of the latter to `out`.
#[inline]
pub(crate) fn extend_trajectory(
    out: &mut Vec<f64>,
    r: f64,
    x0: f64,
    iterations: usize,
    transient: usize,
) {
    let mut x = x0;
    for _ in 0..transient {
        x = r * x * (1.0 - x);
    }
    out.extend((0..iterations).map(|_| {
        x = r * x * (1.0 - x);
        x
    }));
}

/// Validates and runs a single trajectory.
pub fn iterate(r: f64, x0: f64, iterations: usize, transient: usize) -> Result<Vec<f64>> {
    LogisticParams::new(r, x0, iterations, transient).map(|params| params.iterate())
}
