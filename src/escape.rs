// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  Takes a point on the complex plane and
//! repeatedly squares-and-adds, measuring how quickly the orbit of the
//! origin leaves the circle of radius two.  This "velocity" is the
//! number a renderer turns into a color.

use num::Complex;

use crate::errors::{invalid, Result};

/// Returns the number of updates of `z = z * z + c`, starting at zero,
/// after which `|z| > 2`.  The count is 1-indexed: a point already
/// outside the circle escapes on update 1.
///
/// If the orbit is still inside after `max_iter` updates the result is
/// `max_iter` itself.  That is a censored value, not a measurement: a
/// point that escapes on exactly the last update reports the same
/// number as one that never escapes.
pub fn escape_time(c: Complex<f64>, max_iter: u32) -> Result<u32> {
    if max_iter == 0 {
        return Err(invalid("max_iter must be positive"));
    }
    Ok(escape_count(c, max_iter))
}

/// The unchecked loop.  Callers validate `max_iter` once and then call
/// this per pixel.
#[inline]
pub(crate) fn escape_count(c: Complex<f64>, max_iter: u32) -> u32 {
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    for i in 1..=max_iter {
        z = z * z + c;
        if z.norm_sqr() > 4.0 {
            return i;
        }
    }
    max_iter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_origin_never_escapes() {
        for &n in &[1, 2, 17, 100, 1000] {
            assert_eq!(escape_time(Complex::new(0.0, 0.0), n), Ok(n));
        }
    }

    #[test]
    fn points_outside_the_circle_escape_on_the_first_update() {
        for &c in &[
            Complex::new(2.5, 0.0),
            Complex::new(0.0, -3.0),
            Complex::new(1.5, 1.5),
            Complex::new(-100.0, 42.0),
        ] {
            assert_eq!(escape_time(c, 1), Ok(1));
            assert_eq!(escape_time(c, 500), Ok(1));
        }
    }

    #[test]
    fn the_boundary_itself_is_not_an_escape() {
        // z1 = 2, |z1| == 2 exactly; z2 = 6.
        assert_eq!(escape_time(Complex::new(2.0, 0.0), 10), Ok(2));
        // -2 is a fixed point of the map after one step.
        assert_eq!(escape_time(Complex::new(-2.0, 0.0), 50), Ok(50));
    }

    #[test]
    fn known_escape_counts() {
        // 1 -> 2 -> 5
        assert_eq!(escape_time(Complex::new(1.0, 0.0), 100), Ok(3));
        // i -> -1+i -> -i -> -1+i ... stays bounded.
        assert_eq!(escape_time(Complex::new(0.0, 1.0), 100), Ok(100));
    }

    #[test]
    fn interior_points_are_censored() {
        // Main cardioid; no shortcut, just the budget.
        assert_eq!(escape_time(Complex::new(-0.1, 0.1), 250), Ok(250));
        // Period-2 bulb.
        assert_eq!(escape_time(Complex::new(-1.0, 0.0), 250), Ok(250));
    }

    #[test]
    fn budget_is_monotone() {
        let c = Complex::new(-0.75, 0.1);
        let mut last = 0;
        for n in 1..200 {
            let count = escape_time(c, n).unwrap();
            assert!(count >= last);
            assert!(count <= n);
            last = count;
        }
    }

    #[test]
    fn zero_budget_is_invalid() {
        assert!(escape_time(Complex::new(0.0, 0.0), 0).is_err());
    }
}
