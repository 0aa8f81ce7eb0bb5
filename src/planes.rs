// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a grid of pixels with an origin at 0,0 and a rectangular
//! window on the complex plane.  Unlike a plotter that maps pixels to
//! the upper-left corner of the cell they cover, the mapping here is
//! a linspace: the first pixel sits exactly on the low bound and the
//! last pixel exactly on the high bound of each axis.
use num::Complex;
use std::mem::size_of;

use crate::errors::{buffer_len, invalid, Result};

/// Returns `n` evenly spaced values over `[a, b]`, both endpoints
/// included.  A single sample is `a`; zero samples is an empty vector.
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![a],
        _ => {
            let last = n - 1;
            let step = (b - a) / (last as f64);
            let mut values: Vec<f64> = (0..last).map(|k| a + (k as f64) * step).collect();
            // Pinned, so the far corner of a grid is exactly the bound
            // the caller asked for.
            values.push(b);
            values
        }
    }
}

/// The pixel dimensions of the grid being sampled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridSpec {
    width: usize,
    height: usize,
}

impl GridSpec {
    /// Both dimensions must be positive.
    pub fn new(width: usize, height: usize) -> Result<GridSpec> {
        if width == 0 {
            return Err(invalid("grid width must be positive"));
        }
        if height == 0 {
            return Err(invalid("grid height must be positive"));
        }
        buffer_len("grid", width, height, size_of::<u32>())?;
        buffer_len("grid columns", width, 1, size_of::<f64>())?;
        buffer_len("grid rows", height, 1, size_of::<f64>())?;
        Ok(GridSpec { width, height })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of pixels in the grid.  Used to calculate
    /// memory needs.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// A validated grid always has at least one pixel.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The bounds of the region of the complex plane being sampled, with
/// the real part as the x-component and the imaginary part as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexWindow {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl ComplexWindow {
    /// Bounds must be finite and each axis must have positive extent.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<ComplexWindow> {
        if !(xmin.is_finite() && xmax.is_finite() && ymin.is_finite() && ymax.is_finite()) {
            return Err(invalid(format!(
                "window bounds must be finite (got x {}..{}, y {}..{})",
                xmin, xmax, ymin, ymax
            )));
        }
        if !(xmin < xmax) {
            return Err(invalid(format!("xmin ({}) must be less than xmax ({})", xmin, xmax)));
        }
        if !(ymin < ymax) {
            return Err(invalid(format!("ymin ({}) must be less than ymax ({})", ymin, ymax)));
        }
        Ok(ComplexWindow {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Built from the left-lower and right-upper corners.
    pub fn from_corners(
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<ComplexWindow> {
        ComplexWindow::new(leftlower.re, rightupper.re, leftlower.im, rightupper.im)
    }

    /// The left-lower corner.
    pub fn leftlower(&self) -> Complex<f64> {
        Complex::new(self.xmin, self.ymin)
    }

    /// The right-upper corner.
    pub fn rightupper(&self) -> Complex<f64> {
        Complex::new(self.xmax, self.ymax)
    }
}

/// Describes the x, y of a pixel in the grid: column, then row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Contains the definitions of two planes: the integral pixel grid
/// and the complex window.  Maps pixels from one to the other.  The
/// sample coordinates are computed once up front so every pixel
/// lookup is two loads.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The pixel grid.
    pub grid: GridSpec,
    /// The complex window the grid covers.
    pub window: ComplexWindow,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PlaneMapper {
    /// Constructor.  Both halves arrive already validated.
    pub fn new(grid: GridSpec, window: ComplexWindow) -> PlaneMapper {
        PlaneMapper {
            grid,
            window,
            xs: linspace(window.xmin, window.xmax, grid.width),
            ys: linspace(window.ymin, window.ymax, grid.height),
        }
    }

    /// The total number of pixels in the grid.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Describes that the grid is of a size.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// The real part of every column.
    pub fn columns(&self) -> &[f64] {
        &self.xs
    }

    /// The imaginary part of every row.
    pub fn rows(&self) -> &[f64] {
        &self.ys
    }

    /// Given a pixel on the grid, return the complex number it
    /// samples.  Pixels outside the grid have no point.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Option<Complex<f64>> {
        match (self.xs.get(pixel.0), self.ys.get(pixel.1)) {
            (Some(&re), Some(&im)) => Some(Complex::new(re, im)),
            _ => None,
        }
    }
}
