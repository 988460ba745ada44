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

use num_traits::Bounded;

/// Closed interval `[min, max]` over an ordered scalar.
///
/// An interval with `min > max` is empty; `Bounds::collector()` starts from
/// the empty extreme so repeated `include` calls accumulate a hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds<T> {
    min: T,
    max: T,
}

impl<T: Copy + Ord> Bounds<T> {
    #[inline]
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn point(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[inline]
    pub fn min(&self) -> T {
        self.min
    }

    #[inline]
    pub fn max(&self) -> T {
        self.max
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// True when the two intervals share no value.
    #[inline]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.max < other.min || other.max < self.min
    }

    /// Grow this interval to cover `other`.
    #[inline]
    pub fn include(&mut self, other: Self) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

impl<T: Copy + Ord + Bounded> Bounds<T> {
    /// The full representable range.
    #[inline]
    pub fn full() -> Self {
        Self {
            min: T::min_value(),
            max: T::max_value(),
        }
    }

    /// The empty accumulator: `include` of any interval yields that interval.
    #[inline]
    pub fn collector() -> Self {
        Self {
            min: T::max_value(),
            max: T::min_value(),
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Bounds<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}..{}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_point_and_accessors() {
        let b = Bounds::new(-3, 7);
        assert_eq!(b.min(), -3);
        assert_eq!(b.max(), 7);
        assert!(!b.is_empty());

        let p = Bounds::point(5);
        assert_eq!(p.min(), 5);
        assert_eq!(p.max(), 5);
    }

    #[test]
    fn test_collector_is_empty_until_included() {
        let mut c = Bounds::<i64>::collector();
        assert!(c.is_empty());

        c.include(Bounds::new(2, 4));
        assert_eq!(c, Bounds::new(2, 4));

        c.include(Bounds::point(-1));
        assert_eq!(c, Bounds::new(-1, 4));
    }

    #[test]
    fn test_full_contains_everything() {
        let f = Bounds::<i32>::full();
        assert!(f.contains(i32::MIN));
        assert!(f.contains(0));
        assert!(f.contains(i32::MAX));
    }

    #[test]
    fn test_disjoint_and_contains() {
        let a = Bounds::new(0, 10);
        let b = Bounds::new(11, 20);
        let c = Bounds::new(10, 15);
        assert!(a.is_disjoint(&b));
        assert!(b.is_disjoint(&a));
        assert!(!a.is_disjoint(&c));
        assert!(a.contains(10));
        assert!(!a.contains(11));
    }

    #[test]
    fn test_display() {
        assert_eq!(Bounds::new(1, 2).to_string(), "[1..2]");
    }
}
