// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub mod bounds;

pub use bounds::Bounds;

/// Scalar cost unit. All cost accumulation happens in 64 bit.
pub type Cost = i64;

/// Closed cost interval, the workhorse of the cost cache.
pub type CostBounds = Bounds<Cost>;

/// Narrow a 64-bit cost to the 32-bit range of a decision variable.
///
/// Clamping is never fatal; it only loosens a bound. A clamp is logged so
/// saturating instances can be spotted in debug runs.
#[inline]
pub fn clamp_cost(value: Cost) -> i32 {
    if value > i32::MAX as Cost {
        tracing::debug!(value, "cost bound exceeds 32-bit range, clamping");
        i32::MAX
    } else if value < i32::MIN as Cost {
        tracing::debug!(value, "cost bound below 32-bit range, clamping");
        i32::MIN
    } else {
        value as i32
    }
}
