// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The bifurcation sampler collects the long-run values of the
//! logistic map across a sweep of growth rates.  For every rate it
//! starts a number of trajectories from random populations and pours
//! everything they visit into one bucket.  Plotted as a point cloud
//! against the rate, those buckets show the period-doubling cascade
//! and the onset of chaos.
//!
//! Randomness comes from the caller.  Before any work is handed out,
//! one sub-seed per rate is drawn from the caller's generator, in rate
//! order; each rate then seeds its own generator from that.  The
//! output therefore depends only on the caller's generator state and
//! never on how many threads did the work.

use std::mem::size_of;
use std::sync::Mutex;

use crossbeam::thread::ScopedJoinHandle;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::errors::{buffer_len, invalid, Result};
use crate::logistic::extend_trajectory;
use crate::planes::linspace;

/// What to sample.  Once built, this object is valid and immutable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BifurcationRequest {
    r_min: f64,
    r_max: f64,
    r_steps: usize,
    samples: usize,
    iterations: usize,
    transient: usize,
}

impl BifurcationRequest {
    /// `r_steps` rates over `[r_min, r_max]`, `samples` random starts
    /// per rate, `iterations` recorded values per start.  The range
    /// must be finite and increasing; a single-point range is accepted
    /// only with a single step.  The transient starts at zero, see
    /// `with_transient`.
    pub fn new(
        r_min: f64,
        r_max: f64,
        r_steps: usize,
        samples: usize,
        iterations: usize,
    ) -> Result<Self> {
        if !(r_min.is_finite() && r_max.is_finite()) {
            return Err(invalid(format!(
                "rate bounds must be finite (got {}..{})",
                r_min, r_max
            )));
        }
        if r_steps == 0 {
            return Err(invalid("r_steps must be positive"));
        }
        if r_min > r_max || (r_min == r_max && r_steps > 1) {
            return Err(invalid(format!(
                "r_min ({}) must be less than r_max ({})",
                r_min, r_max
            )));
        }
        if iterations == 0 {
            return Err(invalid("iterations must be positive"));
        }
        buffer_len("rate sweep", r_steps, 1, size_of::<f64>())?;
        buffer_len("bifurcation entry", samples, iterations, size_of::<f64>())?;
        Ok(BifurcationRequest {
            r_min,
            r_max,
            r_steps,
            samples,
            iterations,
            transient: 0,
        })
    }

    /// Discard `transient` warm-up steps at the start of every
    /// trajectory.
    pub fn with_transient(self, transient: usize) -> Self {
        BifurcationRequest { transient, ..self }
    }

    /// The number of rates sampled.
    pub fn r_steps(&self) -> usize {
        self.r_steps
    }

    /// Random starts per rate.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Recorded values per start.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Discarded steps per start.
    pub fn transient(&self) -> usize {
        self.transient
    }

    /// The rates, in ascending order.
    pub fn r_values(&self) -> Vec<f64> {
        linspace(self.r_min, self.r_max, self.r_steps)
    }

    /// Values in each entry of the dataset this request produces.
    /// Checked against overflow when the request was built.
    pub fn entry_len(&self) -> usize {
        self.samples * self.iterations
    }
}

/// Everything sampled at one growth rate.  The order of `values` is
/// not meaningful; treat it as a point cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct BifurcationEntry {
    /// The growth rate.
    pub r: f64,
    /// The concatenated trajectories.
    pub values: Vec<f64>,
}

/// One entry per rate, in ascending rate order.
#[derive(Clone, Debug, PartialEq)]
pub struct BifurcationDataset {
    entries: Vec<BifurcationEntry>,
}

impl BifurcationDataset {
    /// Number of rates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a dataset built from a valid request.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry for the `index`-th rate.
    pub fn get(&self, index: usize) -> Option<&BifurcationEntry> {
        self.entries.get(index)
    }

    /// All entries in rate order.
    pub fn iter(&self) -> std::slice::Iter<BifurcationEntry> {
        self.entries.iter()
    }

    /// Just the rates.
    pub fn r_values(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.r).collect()
    }

    /// Every sampled value paired with its rate, ready to scatter.
    pub fn points<'a>(&'a self) -> impl Iterator<Item = (f64, f64)> + 'a {
        self.entries
            .iter()
            .flat_map(|entry| entry.values.iter().map(move |&x| (entry.r, x)))
    }

    /// Gives up the entries.
    pub fn into_entries(self) -> Vec<BifurcationEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a BifurcationDataset {
    type Item = &'a BifurcationEntry;
    type IntoIter = std::slice::Iter<'a, BifurcationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Initial populations, uniform on `[0, 1)`.
struct InitialConditions(Uniform<f64>, StdRng);

impl InitialConditions {
    pub fn new(seed: u64) -> Self {
        InitialConditions(Uniform::new(0.0_f64, 1.0), StdRng::seed_from_u64(seed))
    }
    pub fn get(&mut self) -> f64 {
        self.0.sample(&mut self.1)
    }
}

/// Work unit: slot index, rate, sub-seed.
type Slot = (usize, f64, u64);

/// Runs a validated request.
pub struct BifurcationSampler {
    request: BifurcationRequest,
}

impl BifurcationSampler {
    /// Wraps a request.  All validation already happened when the
    /// request was built.
    pub fn new(request: BifurcationRequest) -> Self {
        BifurcationSampler { request }
    }

    /// The request being sampled.
    pub fn request(&self) -> &BifurcationRequest {
        &self.request
    }

    fn slots<R: Rng>(&self, rng: &mut R) -> Vec<Slot> {
        self.request
            .r_values()
            .into_iter()
            .enumerate()
            .map(|(index, r)| (index, r, rng.gen::<u64>()))
            .collect()
    }

    /// All trajectories for one rate, concatenated.
    fn sample_slot(&self, r: f64, seed: u64) -> Vec<f64> {
        let mut starts = InitialConditions::new(seed);
        let mut values = Vec::with_capacity(self.request.entry_len());
        for _ in 0..self.request.samples {
            let x0 = starts.get();
            extend_trajectory(
                &mut values,
                r,
                x0,
                self.request.iterations,
                self.request.transient,
            );
        }
        values
    }

    /// The single-threaded sweep.
    pub fn sample_single<R: Rng>(&self, rng: &mut R) -> BifurcationDataset {
        let entries = self
            .slots(rng)
            .into_iter()
            .map(|(_, r, seed)| BifurcationEntry {
                r,
                values: self.sample_slot(r, seed),
            })
            .collect();
        BifurcationDataset { entries }
    }

    /// A multi-threaded version of the sweep that takes a thread
    /// count.  Produces exactly what `sample_single` would from the
    /// same generator state.
    pub fn sample<R: Rng>(&self, rng: &mut R, threads: usize) -> Result<BifurcationDataset> {
        if threads == 0 {
            return Err(invalid("thread count must be positive"));
        }
        let slots = self.slots(rng);
        let workers = threads.min(slots.len());
        debug!(
            r_steps = self.request.r_steps,
            samples = self.request.samples,
            iterations = self.request.iterations,
            transient = self.request.transient,
            workers,
            "sampling bifurcation diagram"
        );

        let queue = Mutex::new(slots.into_iter());
        let queue = &queue;
        let mut sampled: Vec<(usize, BifurcationEntry)> = vec![];
        crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Vec<(usize, BifurcationEntry)>>> = (0..workers)
                .map(|_| {
                    spawner.spawn(move |_| {
                        let mut entries: Vec<(usize, BifurcationEntry)> = vec![];
                        loop {
                            let slot = queue.lock().ok().and_then(|mut slots| slots.next());
                            match slot {
                                Some((index, r, seed)) => entries.push((
                                    index,
                                    BifurcationEntry {
                                        r,
                                        values: self.sample_slot(r, seed),
                                    },
                                )),
                                None => {
                                    break;
                                }
                            }
                        }
                        entries
                    })
                })
                .collect();

            sampled = handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect();
        })
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

        sampled.sort_by_key(|&(index, _)| index);
        Ok(BifurcationDataset {
            entries: sampled.into_iter().map(|(_, entry)| entry).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn request_validation() {
        assert!(BifurcationRequest::new(2.8, 4.0, 0, 10, 10).is_err());
        assert!(BifurcationRequest::new(4.0, 2.8, 10, 10, 10).is_err());
        assert!(BifurcationRequest::new(3.0, 3.0, 2, 10, 10).is_err());
        assert!(BifurcationRequest::new(2.8, 4.0, 10, 10, 0).is_err());
        assert!(BifurcationRequest::new(std::f64::NAN, 4.0, 10, 10, 10).is_err());
        assert!(BifurcationRequest::new(3.0, 3.0, 1, 1, 1).is_ok());
        assert!(BifurcationRequest::new(2.8, 4.0, 10, 0, 10).is_ok());
    }

    #[test]
    fn oversized_requests_are_rejected() {
        assert!(BifurcationRequest::new(2.8, 4.0, 1, usize::MAX / 2, 3).is_err());
        assert!(BifurcationRequest::new(2.8, 4.0, 1, isize::MAX as usize / 4, 1).is_err());
        assert!(BifurcationRequest::new(2.8, 4.0, usize::MAX, 1, 1).is_err());
        let request = BifurcationRequest::new(2.8, 4.0, 1, 1 << 10, 1 << 10).unwrap();
        assert_eq!(request.entry_len(), 1 << 20);
    }

    #[test]
    fn single_rate_single_value() {
        let request = BifurcationRequest::new(3.0, 3.0, 1, 1, 1).unwrap();
        let data = BifurcationSampler::new(request)
            .sample(&mut seeded(), 4)
            .unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get(0).map(|e| e.values.len()), Some(1));
        assert_eq!(data.r_values(), vec![3.0]);
    }

    #[test]
    fn entries_follow_rate_order() {
        let request = BifurcationRequest::new(2.8, 4.0, 7, 3, 5).unwrap();
        let data = BifurcationSampler::new(request)
            .sample(&mut seeded(), 3)
            .unwrap();
        assert_eq!(data.r_values(), request.r_values());
        assert!(data.iter().all(|entry| entry.values.len() == 15));
    }

    #[test]
    fn threads_do_not_change_the_output() {
        let request = BifurcationRequest::new(2.5, 4.0, 23, 4, 8).unwrap().with_transient(50);
        let sampler = BifurcationSampler::new(request);
        let single = sampler.sample_single(&mut seeded());
        for &threads in &[1, 2, 5, 64] {
            assert_eq!(sampler.sample(&mut seeded(), threads).unwrap(), single);
        }
    }

    #[test]
    fn same_seed_same_data() {
        let request = BifurcationRequest::new(3.5, 4.0, 10, 5, 5).unwrap();
        let sampler = BifurcationSampler::new(request);
        let a = sampler.sample(&mut seeded(), 2).unwrap();
        let b = sampler.sample(&mut seeded(), 2).unwrap();
        assert_eq!(a, b);
        let c = sampler.sample(&mut StdRng::seed_from_u64(7), 2).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn stable_rate_settles_on_its_fixed_point() {
        // For 1 < r < 3 every start in (0, 1) converges to 1 - 1/r.
        let request = BifurcationRequest::new(2.5, 2.5, 1, 20, 4)
            .unwrap()
            .with_transient(500);
        let data = BifurcationSampler::new(request).sample_single(&mut seeded());
        let fixed = 1.0 - 1.0 / 2.5;
        assert!(data.points().all(|(r, x)| r == 2.5 && (x - fixed).abs() < 1e-9));
    }

    #[test]
    fn zero_samples_gives_empty_entries() {
        let request = BifurcationRequest::new(2.8, 4.0, 4, 0, 10).unwrap();
        let data = BifurcationSampler::new(request).sample(&mut seeded(), 2).unwrap();
        assert_eq!(data.len(), 4);
        assert!(data.iter().all(|entry| entry.values.is_empty()));
        assert_eq!(data.points().count(), 0);
    }

    #[test]
    fn zero_threads_is_invalid() {
        let request = BifurcationRequest::new(2.8, 4.0, 4, 1, 1).unwrap();
        assert!(BifurcationSampler::new(request).sample(&mut seeded(), 0).is_err());
    }

    #[test]
    fn points_pair_values_with_their_rate() {
        let request = BifurcationRequest::new(3.0, 4.0, 3, 2, 2).unwrap();
        let data = BifurcationSampler::new(request).sample_single(&mut seeded());
        let points: Vec<(f64, f64)> = data.points().collect();
        assert_eq!(points.len(), 12);
        assert_eq!(points[0].0, 3.0);
        assert_eq!(points[4].0, 3.5);
        assert_eq!(points[11].0, 4.0);
        let entries = data.into_entries();
        assert_eq!(points[5].1, entries[1].values[1]);
    }
}
