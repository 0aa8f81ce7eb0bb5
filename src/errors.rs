// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one way every kernel in this crate can fail: somebody handed
//! it an argument outside its domain.  All checks happen before any
//! computation starts, so an error never comes with partial output.

use failure::Fail;
use std::convert::TryFrom;

/// Errors produced by the kernels and samplers.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum Error {
    /// An argument violated one of the documented invariants.
    #[fail(display = "invalid argument: {}", _0)]
    InvalidArgument(String),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Helper for building an `InvalidArgument` out of anything printable.
pub(crate) fn invalid<S: Into<String>>(reason: S) -> Error {
    Error::InvalidArgument(reason.into())
}

/// Number of `elem_size`-byte elements in an `a x b` buffer, refused
/// when the element count overflows or the buffer would be larger
/// than any allocation can be.
pub(crate) fn buffer_len(what: &str, a: usize, b: usize, elem_size: usize) -> Result<usize> {
    a.checked_mul(b)
        .filter(|len| {
            len.checked_mul(elem_size)
                .map_or(false, |bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| invalid(format!("{} of {} x {} values is too large", what, a, b)))
}

/// Converts a signed count, as a user would type it, into the
/// unsigned type the kernels take.  Negative values and values too
/// large for the target type are both `InvalidArgument`.
pub fn checked_count<T: TryFrom<i64>>(name: &str, value: i64) -> Result<T> {
    if value < 0 {
        return Err(invalid(format!("{} must not be negative (got {})", name, value)));
    }
    T::try_from(value).map_err(|_| invalid(format!("{} is out of range (got {})", name, value)))
}
