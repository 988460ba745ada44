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
use super::core::SpaceCore;
use super::cost_cache::CostExtremes;
use reassign_core::prelude::{Bounds, Cost, CostBounds, clamp_cost};
use reassign_model::common::{MachineId, ProcessId};
use smallvec::SmallVec;

/// Maintains the cost bounds of one slot over its candidate machines.
///
/// Rebuilds the slot's cost-cache entries from the current patches and
/// unassigned-balance pools, evicts machines whose achievable cost range
/// is impossible or disjoint from the cost variable, and narrows the cost
/// variable to the hull of the surviving candidates.
#[derive(Debug, Clone)]
pub struct CostPropagator {
    slot: usize,
    done: bool,
}

impl CostPropagator {
    pub fn new(slot: usize) -> Self {
        Self { slot, done: false }
    }

    pub fn propagate(&mut self, core: &mut SpaceCore<'_>) -> Result<(), Infeasible> {
        if self.done {
            return Ok(());
        }
        if core.vars[self.slot].is_assigned() {
            self.done = true;
            return Ok(());
        }

        let process = core.slot_process(self.slot);
        let cost_min = core.costs[self.slot].min() as Cost;
        let cost_max = core.costs[self.slot].max() as Cost;

        let mut blacklist: SmallVec<[MachineId; 8]> = SmallVec::new();
        let mut extremes = CostExtremes::collector();
        let mut fresh: SmallVec<[(MachineId, CostBounds); 32]> = SmallVec::new();

        for m in core.vars[self.slot].iter() {
            match additional_cost(core, process, m) {
                Some(bounds) => {
                    if bounds.min() > cost_max || bounds.max() < cost_min {
                        blacklist.push(m);
                    } else {
                        fresh.push((m, bounds));
                        extremes.include(m, bounds);
                    }
                }
                None => blacklist.push(m),
            }
        }

        for (m, bounds) in fresh {
            core.cache.set(self.slot, m, bounds);
        }
        core.cache.set_extremes(self.slot, extremes);

        for &m in &blacklist {
            core.cache.remove(self.slot, m);
            core.remove_machine(self.slot, m);
        }
        if core.failed || extremes.is_empty() {
            return Err(Infeasible);
        }

        let changed_min = core.costs[self.slot].tighten_min(clamp_cost(extremes.min.cost))?;
        let changed_max = core.costs[self.slot].tighten_max(clamp_cost(extremes.max.cost))?;
        core.changed |= changed_min || changed_max;

        Ok(())
    }
}

/// Cost range moving `process` onto `m` would add, given the current
/// patches; `None` when capacity or transient capacity rules it out.
pub fn additional_cost(
    core: &SpaceCore<'_>,
    process: ProcessId,
    m: MachineId,
) -> Option<CostBounds> {
    let instance = core.instance;
    let proc = instance.process(process);
    let machine = instance.machine(m);
    let original = proc.original_machine();
    let transient_count = instance.transient_count();

    let mut cost: Cost = 0;

    for (r, &req) in proc.requirements().iter().enumerate() {
        let excess = core.patched_excess(m, r);
        let gap = machine.capacity(r.into()) - machine.safety_capacity(r.into()) - excess;
        if gap < req {
            return None;
        }

        if r < transient_count {
            let transient = core.patched_transient(m, r);
            let added = if original == m { 0 } else { req };
            if transient + added > machine.capacity(r.into()) {
                return None;
            }
        }

        cost += ((excess + req).max(0) - excess.max(0))
            * instance.resource(r.into()).weight_load_cost();
    }

    if original != m {
        cost += proc.move_cost() * instance.weight_process_move();
    }
    cost += instance.machine(original).move_cost_to(m) * instance.weight_machine_move();

    let (balance_min, balance_max) = balance_cost_bounds(core, process, m);

    Some(Bounds::new(cost + balance_min, cost + balance_max))
}

/// Bounds of the balance cost delta of placing `process` on `m`, derived
/// from the machine's patched balance and the signed pools of balance
/// deltas still unassigned.
fn balance_cost_bounds(core: &SpaceCore<'_>, process: ProcessId, m: MachineId) -> (Cost, Cost) {
    let instance = core.instance;
    let proc = instance.process(process);

    let mut min_cost: Cost = 0;
    let mut max_cost: Cost = 0;

    for b in 0..instance.num_balances() {
        let bal = instance.balance(b.into());
        let machine_balance = core.patched_balance(m, b);
        let process_balance = proc.requirement(bal.resource2())
            - bal.target() * proc.requirement(bal.resource1());

        let min_pool = core.min_unassigned_balance[b];
        let max_pool = core.max_unassigned_balance[b];

        if process_balance < 0 {
            let old_min = (machine_balance + max_pool).max(0);
            let new_min = (machine_balance + max_pool + process_balance).max(0);
            let old_max = (machine_balance + min_pool - process_balance).max(0);
            let new_max = (machine_balance + min_pool).max(0);
            min_cost += (new_min - old_min) * bal.weight();
            max_cost += (new_max - old_max) * bal.weight();
        } else {
            let old_min = (machine_balance + min_pool - process_balance).max(0);
            let new_min = (machine_balance + min_pool).max(0);
            let old_max = (machine_balance + max_pool).max(0);
            let new_max = (machine_balance + max_pool + process_balance).max(0);
            min_cost += (new_min - old_min) * bal.weight();
            max_cost += (new_max - old_max) * bal.weight();
        }
    }

    (min_cost, max_cost)
}
