// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Grid sampler
//!
//! Lays a pixel grid over a window of the complex plane and asks the
//! escape-time evaluator about every pixel.  Pixels share nothing, so
//! the threaded version simply hands out whole rows of the output
//! buffer to whichever worker asks next; each worker writes only into
//! the row it holds, and the result is bit-identical to the
//! single-threaded walk no matter how the rows were scheduled.

use std::iter::Enumerate;
use std::ops::Index;
use std::slice::ChunksMut;
use std::sync::Mutex;

use num::Complex;
use tracing::debug;

use crate::errors::{invalid, Result};
use crate::escape::escape_count;
use crate::planes::{ComplexWindow, GridSpec, PlaneMapper};

type RowQueue<'a> = Mutex<Enumerate<ChunksMut<'a, u32>>>;

/// A `height x width` matrix of escape counts, row-major.  Row `i`,
/// column `j` holds the count for the `j`-th real sample and the
/// `i`-th imaginary sample of the window.  Every value lies in
/// `[0, max_iter]`; `max_iter` means "did not escape within budget".
#[derive(Clone, Debug, PartialEq)]
pub struct EscapeGrid {
    grid: GridSpec,
    max_iter: u32,
    counts: Vec<u32>,
}

impl EscapeGrid {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// The budget the grid was computed with, which doubles as the
    /// sentinel for pixels that never escaped.
    pub fn max_iter(&self) -> u32 {
        self.max_iter
    }

    /// The count at `row`, `column`, if that pixel exists.
    pub fn get(&self, row: usize, column: usize) -> Option<u32> {
        if row < self.height() && column < self.width() {
            Some(self.counts[row * self.width() + column])
        } else {
            None
        }
    }

    /// One row of counts.  Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[u32] {
        let width = self.width();
        &self.counts[row * width..(row + 1) * width]
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> std::slice::Chunks<u32> {
        self.counts.chunks(self.width())
    }

    /// The raw row-major buffer.
    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }

    /// Gives up the raw row-major buffer.
    pub fn into_vec(self) -> Vec<u32> {
        self.counts
    }

    /// Copies the grid out as `matrix[height][width]`.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}

impl Index<(usize, usize)> for EscapeGrid {
    type Output = u32;

    fn index(&self, (row, column): (usize, usize)) -> &u32 {
        assert!(column < self.width(), "column {} out of bounds", column);
        &self.counts[row * self.width() + column]
    }
}

/// Holds a validated pixel-to-plane mapping and an iteration budget.
/// Once built, a sampler can be run any number of times and always
/// produces the same grid.
pub struct GridSampler {
    plane: PlaneMapper,
    max_iter: u32,
}

impl GridSampler {
    /// Requires the pixel dimensions, the window of the complex plane
    /// to lay them over, and the per-pixel iteration budget.
    pub fn new(grid: GridSpec, window: ComplexWindow, max_iter: u32) -> Result<Self> {
        if max_iter == 0 {
            return Err(invalid("max_iter must be positive"));
        }
        Ok(GridSampler {
            plane: PlaneMapper::new(grid, window),
            max_iter,
        })
    }

    /// The mapping this sampler evaluates.
    pub fn plane(&self) -> &PlaneMapper {
        &self.plane
    }

    /// Fills one row of the output.
    fn sample_row(&self, row: usize, counts: &mut [u32]) {
        let im = self.plane.rows()[row];
        for (count, &re) in counts.iter_mut().zip(self.plane.columns()) {
            *count = escape_count(Complex::new(re, im), self.max_iter);
        }
    }

    fn allocate(&self) -> Vec<u32> {
        vec![0 as u32; self.plane.len()]
    }

    fn finish(&self, counts: Vec<u32>) -> EscapeGrid {
        EscapeGrid {
            grid: self.plane.grid,
            max_iter: self.max_iter,
            counts,
        }
    }

    /// The single-threaded walk, row by row.
    pub fn sample_single(&self) -> EscapeGrid {
        let mut counts = self.allocate();
        for (row, counts) in counts.chunks_mut(self.plane.grid.width()).enumerate() {
            self.sample_row(row, counts);
        }
        self.finish(counts)
    }

    /// A multi-threaded version of the sampler that takes a thread
    /// count.  Never starts more workers than there are rows.
    pub fn sample(&self, threads: usize) -> Result<EscapeGrid> {
        if threads == 0 {
            return Err(invalid("thread count must be positive"));
        }
        let workers = threads.min(self.plane.grid.height());
        debug!(
            width = self.plane.grid.width(),
            height = self.plane.grid.height(),
            max_iter = self.max_iter,
            workers,
            "sampling escape grid"
        );

        let mut counts = self.allocate();
        {
            let rows: RowQueue =
                Mutex::new(counts.chunks_mut(self.plane.grid.width()).enumerate());
            let rows = &rows;
            crossbeam::scope(|spawner| {
                for _ in 0..workers {
                    spawner.spawn(move |_| loop {
                        let next = rows.lock().ok().and_then(|mut rows| rows.next());
                        match next {
                            Some((row, counts)) => self.sample_row(row, counts),
                            None => {
                                break;
                            }
                        }
                    });
                }
            })
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        }
        Ok(self.finish(counts))
    }
}
