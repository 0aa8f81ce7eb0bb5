#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Chaos kernels
//!
//! Two numerical datasets that show off chaotic dynamics.
//!
//! The Mandelbrot set takes a point on the complex plane, starts at
//! zero, and repeatedly squares-and-adds, measuring how many steps it
//! takes for the result to leave the circle of radius two.  Laying a
//! grid of pixels over a window of the plane and doing that for every
//! pixel gives an `EscapeGrid`, which a renderer turns into the
//! familiar picture.
//!
//! The logistic map, `x -> r * x * (1 - x)`, is the simplest
//! population model that goes chaotic.  Sweeping the growth rate `r`
//! and recording where randomly started populations end up gives a
//! `BifurcationDataset`: the period-doubling cascade as a point cloud.
//!
//! Both samplers are pure.  Every pixel, and every (rate, start) pair,
//! is independent of every other, so the work is split across a pool
//! of scoped threads without changing a single bit of the output.
//! What the numbers look like on screen is somebody else's problem.

extern crate crossbeam;
extern crate failure;
extern crate num;
extern crate num_cpus;
extern crate rand;

pub mod bifurcation;
pub mod errors;
pub mod escape;
pub mod grid;
pub mod logistic;
pub mod planes;

pub use bifurcation::{
    BifurcationDataset, BifurcationEntry, BifurcationRequest, BifurcationSampler,
};
pub use errors::{checked_count, Error, Result};
pub use escape::escape_time;
pub use grid::{EscapeGrid, GridSampler};
pub use logistic::{iterate, LogisticParams};
pub use planes::{linspace, ComplexWindow, GridSpec, Pixel, PlaneMapper};

/// Samples a `height x width` grid laid over `[xmin, xmax] x [ymin,
/// ymax]` with the given iteration budget, on one thread per logical
/// CPU.
pub fn compute_grid(
    width: usize,
    height: usize,
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    max_iter: u32,
) -> Result<EscapeGrid> {
    let grid = GridSpec::new(width, height)?;
    let window = ComplexWindow::new(xmin, xmax, ymin, ymax)?;
    GridSampler::new(grid, window, max_iter)?.sample(num_cpus::get())
}

/// Samples `r_steps` growth rates over `[r_min, r_max]`, `samples`
/// random starts per rate and `iterations` values per start, with no
/// transient, drawing the starts from the thread-local generator on
/// one thread per logical CPU.  Use `BifurcationSampler` directly for
/// a seeded or otherwise controlled generator.
pub fn compute_bifurcation(
    r_min: f64,
    r_max: f64,
    r_steps: usize,
    samples: usize,
    iterations: usize,
) -> Result<BifurcationDataset> {
    let request = BifurcationRequest::new(r_min, r_max, r_steps, samples, iterations)?;
    BifurcationSampler::new(request).sample(&mut rand::thread_rng(), num_cpus::get())
}
