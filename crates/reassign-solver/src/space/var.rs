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

use super::Infeasible;
use fixedbitset::FixedBitSet;
use reassign_model::common::MachineId;

/// Machine decision variable: a bitset domain over all machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineVar {
    domain: FixedBitSet,
    len: usize,
}

impl MachineVar {
    pub fn full(num_machines: usize) -> Self {
        let mut domain = FixedBitSet::with_capacity(num_machines);
        domain.insert_range(..);
        Self {
            domain,
            len: num_machines,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.len == 1
    }

    #[inline]
    pub fn contains(&self, m: MachineId) -> bool {
        self.domain.contains(m.get())
    }

    /// The single remaining machine, once assigned.
    #[inline]
    pub fn value(&self) -> Option<MachineId> {
        if self.is_assigned() {
            self.domain.ones().next().map(MachineId::new)
        } else {
            None
        }
    }

    /// Remove `m`; reports whether the domain changed.
    #[inline]
    pub fn remove(&mut self, m: MachineId) -> bool {
        if self.domain.contains(m.get()) {
            self.domain.set(m.get(), false);
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Collapse the domain to `m`.
    pub fn assign(&mut self, m: MachineId) -> Result<bool, Infeasible> {
        if !self.domain.contains(m.get()) {
            return Err(Infeasible);
        }
        if self.len == 1 {
            return Ok(false);
        }
        self.domain.clear();
        self.domain.insert(m.get());
        self.len = 1;
        Ok(true)
    }

    /// Intersect the domain with `machines`; reports whether it changed.
    pub fn retain_in(&mut self, machines: &[MachineId]) -> bool {
        let mut mask = FixedBitSet::with_capacity(self.domain.len());
        for &m in machines {
            mask.insert(m.get());
        }
        mask.intersect_with(&self.domain);
        let new_len = mask.count_ones(..);
        if new_len == self.len {
            return false;
        }
        self.domain = mask;
        self.len = new_len;
        true
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = MachineId> + '_ {
        self.domain.ones().map(MachineId::new)
    }
}

/// Cost decision variable with 32-bit bounds, as in the CP layer the
/// engine was designed against. Accumulation happens in 64 bit and is
/// clamped on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostVar {
    min: i32,
    max: i32,
}

impl CostVar {
    #[inline]
    pub fn full() -> Self {
        Self {
            min: i32::MIN,
            max: i32::MAX,
        }
    }

    #[inline]
    pub fn min(&self) -> i32 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.min == self.max
    }

    /// Width of the bound interval in 64 bit (the brancher's gap measure).
    #[inline]
    pub fn width(&self) -> i64 {
        self.max as i64 - self.min as i64
    }

    /// Raise the lower bound; reports whether it changed.
    pub fn tighten_min(&mut self, value: i32) -> Result<bool, Infeasible> {
        if value > self.max {
            return Err(Infeasible);
        }
        if value > self.min {
            self.min = value;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Lower the upper bound; reports whether it changed.
    pub fn tighten_max(&mut self, value: i32) -> Result<bool, Infeasible> {
        if value < self.min {
            return Err(Infeasible);
        }
        if value < self.max {
            self.max = value;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Fix the variable to `value`.
    pub fn assign(&mut self, value: i32) -> Result<bool, Infeasible> {
        if value < self.min || value > self.max {
            return Err(Infeasible);
        }
        let changed = self.min != value || self.max != value;
        self.min = value;
        self.max = value;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid(m: usize) -> MachineId {
        MachineId::new(m)
    }

    #[test]
    fn test_machine_var_full_and_remove() {
        let mut var = MachineVar::full(4);
        assert_eq!(var.len(), 4);
        assert!(!var.is_assigned());

        assert!(var.remove(mid(2)));
        assert!(!var.remove(mid(2)));
        assert_eq!(var.len(), 3);
        assert!(!var.contains(mid(2)));
        assert_eq!(var.iter().collect::<Vec<_>>(), vec![mid(0), mid(1), mid(3)]);
    }

    #[test]
    fn test_machine_var_assign() {
        let mut var = MachineVar::full(3);
        assert!(var.assign(mid(1)).unwrap());
        assert!(var.is_assigned());
        assert_eq!(var.value(), Some(mid(1)));
        // Re-assigning the same value is a no-op.
        assert!(!var.assign(mid(1)).unwrap());
        // Assigning a removed value fails.
        assert_eq!(var.assign(mid(2)), Err(Infeasible));
    }

    #[test]
    fn test_machine_var_retain_in() {
        let mut var = MachineVar::full(5);
        assert!(var.retain_in(&[mid(1), mid(3)]));
        assert_eq!(var.len(), 2);
        assert!(!var.retain_in(&[mid(3), mid(1)]));
        assert!(var.retain_in(&[mid(0)]));
        assert!(var.is_empty());
    }

    #[test]
    fn test_cost_var_tighten_and_assign() {
        let mut cost = CostVar::full();
        assert!(cost.tighten_min(-5).unwrap());
        assert!(cost.tighten_max(10).unwrap());
        assert!(!cost.tighten_min(-7).unwrap());
        assert_eq!(cost.width(), 15);

        assert!(cost.assign(3).unwrap());
        assert!(cost.is_assigned());
        assert_eq!(cost.assign(4), Err(Infeasible));
    }

    #[test]
    fn test_cost_var_crossing_bounds_fail() {
        let mut cost = CostVar::full();
        cost.tighten_max(5).unwrap();
        assert_eq!(cost.tighten_min(6), Err(Infeasible));
    }
}
