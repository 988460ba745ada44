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

use reassign_core::prelude::{Cost, CostBounds};
use reassign_model::common::MachineId;
use std::collections::HashMap;

/// A machine together with the cost bound it realises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundMachine {
    pub machine: MachineId,
    pub cost: Cost,
}

/// Cheapest and most expensive candidate of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostExtremes {
    pub min: BoundMachine,
    pub max: BoundMachine,
}

impl CostExtremes {
    /// Collector extreme: any real entry replaces it.
    pub fn collector() -> Self {
        Self {
            min: BoundMachine {
                machine: MachineId::new(0),
                cost: Cost::MAX,
            },
            max: BoundMachine {
                machine: MachineId::new(0),
                cost: Cost::MIN,
            },
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.cost > self.max.cost
    }

    #[inline]
    pub fn include(&mut self, machine: MachineId, bounds: CostBounds) {
        if bounds.min() < self.min.cost {
            self.min = BoundMachine {
                machine,
                cost: bounds.min(),
            };
        }
        if bounds.max() > self.max.cost {
            self.max = BoundMachine {
                machine,
                cost: bounds.max(),
            };
        }
    }
}

/// Per-slot memo of the cost a process would add on each candidate
/// machine, with extremum tracking for the brancher.
#[derive(Debug, Clone)]
pub struct CostCache {
    entries: Vec<HashMap<usize, CostBounds>>,
    extremes: Vec<CostExtremes>,
}

impl CostCache {
    pub fn new(slots: usize) -> Self {
        Self {
            entries: vec![HashMap::new(); slots],
            extremes: vec![CostExtremes::collector(); slots],
        }
    }

    #[inline]
    pub fn set(&mut self, slot: usize, machine: MachineId, bounds: CostBounds) {
        self.entries[slot].insert(machine.get(), bounds);
    }

    #[inline]
    pub fn get(&self, slot: usize, machine: MachineId) -> Option<CostBounds> {
        self.entries[slot].get(&machine.get()).copied()
    }

    #[inline]
    pub fn remove(&mut self, slot: usize, machine: MachineId) {
        self.entries[slot].remove(&machine.get());
    }

    #[inline]
    pub fn extremes(&self, slot: usize) -> &CostExtremes {
        &self.extremes[slot]
    }

    #[inline]
    pub fn set_extremes(&mut self, slot: usize, extremes: CostExtremes) {
        self.extremes[slot] = extremes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reassign_core::prelude::Bounds;

    #[test]
    fn test_extremes_track_min_and_max_machines() {
        let mut extremes = CostExtremes::collector();
        assert!(extremes.is_empty());

        extremes.include(MachineId::new(1), Bounds::new(5, 9));
        extremes.include(MachineId::new(2), Bounds::new(3, 4));
        extremes.include(MachineId::new(3), Bounds::new(6, 12));

        assert_eq!(extremes.min.machine, MachineId::new(2));
        assert_eq!(extremes.min.cost, 3);
        assert_eq!(extremes.max.machine, MachineId::new(3));
        assert_eq!(extremes.max.cost, 12);
    }

    #[test]
    fn test_cache_set_get_remove() {
        let mut cache = CostCache::new(2);
        cache.set(0, MachineId::new(4), Bounds::new(-1, 7));
        assert_eq!(cache.get(0, MachineId::new(4)), Some(Bounds::new(-1, 7)));
        assert_eq!(cache.get(1, MachineId::new(4)), None);

        cache.remove(0, MachineId::new(4));
        assert_eq!(cache.get(0, MachineId::new(4)), None);
    }
}
