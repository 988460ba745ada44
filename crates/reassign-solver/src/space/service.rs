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

//! Service-level constraints inside a space: no two members of a service
//! on one machine, and enough distinct locations to meet the service's
//! minimum spread.

use super::Infeasible;
use super::core::SpaceCore;
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

/// Pairwise-distinct machines among the movable members of one service.
#[derive(Debug, Clone)]
pub struct DistinctPropagator {
    slots: SmallVec<[usize; 4]>,
}

impl DistinctPropagator {
    pub fn new(slots: SmallVec<[usize; 4]>) -> Self {
        Self { slots }
    }

    pub fn propagate(&mut self, core: &mut SpaceCore<'_>) -> Result<(), Infeasible> {
        for i in 0..self.slots.len() {
            let Some(m) = core.vars[self.slots[i]].value() else {
                continue;
            };
            for &other in &self.slots {
                if other == self.slots[i] {
                    continue;
                }
                if core.vars[other].value() == Some(m) {
                    return Err(Infeasible);
                }
                core.remove_machine(other, m);
                if core.failed {
                    return Err(Infeasible);
                }
            }
        }
        Ok(())
    }
}

/// Lower bound on the distinct locations a service ends up occupying.
///
/// Locations of staying members are fixed; movable members contribute
/// through their domains. The check is conservative while slots are open
/// and exact once every slot is assigned.
#[derive(Debug, Clone)]
pub struct SpreadPropagator {
    slots: SmallVec<[usize; 4]>,
    staying_locations: FixedBitSet,
    min_spread: usize,
}

impl SpreadPropagator {
    pub fn new(
        slots: SmallVec<[usize; 4]>,
        staying_locations: FixedBitSet,
        min_spread: usize,
    ) -> Self {
        Self {
            slots,
            staying_locations,
            min_spread,
        }
    }

    pub fn propagate(&mut self, core: &mut SpaceCore<'_>) -> Result<(), Infeasible> {
        let instance = core.instance;

        let mut fixed = self.staying_locations.clone();
        let mut unassigned: SmallVec<[usize; 4]> = SmallVec::new();
        for &slot in &self.slots {
            match core.vars[slot].value() {
                Some(m) => fixed.insert(instance.machine(m).location().get()),
                None => unassigned.push(slot),
            }
        }

        let covered = fixed.count_ones(..);
        if covered >= self.min_spread {
            return Ok(());
        }
        let missing = self.min_spread - covered;

        // Locations reachable by the open slots beyond the fixed set.
        let mut reachable = FixedBitSet::with_capacity(instance.num_locations());
        for &slot in &unassigned {
            for m in core.vars[slot].iter() {
                let l = instance.machine(m).location().get();
                if !fixed.contains(l) {
                    reachable.insert(l);
                }
            }
        }

        let achievable = unassigned.len().min(reachable.count_ones(..));
        if achievable < missing {
            return Err(Infeasible);
        }

        // Every open slot must contribute a new location.
        if missing == unassigned.len() {
            for &slot in &unassigned {
                let drop: SmallVec<[_; 8]> = core.vars[slot]
                    .iter()
                    .filter(|&m| fixed.contains(instance.machine(m).location().get()))
                    .collect();
                for m in drop {
                    core.remove_machine(slot, m);
                }
                if core.failed {
                    return Err(Infeasible);
                }
            }
        }

        Ok(())
    }
}
