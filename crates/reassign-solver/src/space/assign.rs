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
use reassign_core::prelude::{Cost, clamp_cost};
use smallvec::SmallVec;

/// Commits one slot's machine choice into the speculative state.
///
/// Fires once the slot's machine variable is assigned: folds the process
/// into the machine's patch (excess, transient, balance), fails on a
/// capacity or transient violation, prunes the machine from slots it can
/// no longer host, and fixes the slot's cost variable to the exact
/// contribution.
#[derive(Debug, Clone)]
pub struct AssignPropagator {
    slot: usize,
    done: bool,
}

impl AssignPropagator {
    pub fn new(slot: usize) -> Self {
        Self { slot, done: false }
    }

    pub fn propagate(&mut self, core: &mut SpaceCore<'_>) -> Result<(), Infeasible> {
        if self.done {
            return Ok(());
        }
        let Some(m) = core.vars[self.slot].value() else {
            return Ok(());
        };

        let instance = core.instance;
        let process_id = core.slot_process(self.slot);
        let process = instance.process(process_id);
        let machine = instance.machine(m);
        let original = process.original_machine();
        let transient_count = instance.transient_count();

        let mut cost: Cost = 0;

        {
            let patch = core.ensure_patch(m);
            for (r, &req) in process.requirements().iter().enumerate() {
                let old_excess = patch.excess[r].max(0);
                patch.excess[r] += req;
                let new_excess = patch.excess[r].max(0);

                if patch.excess[r]
                    > machine.capacity(r.into()) - machine.safety_capacity(r.into())
                {
                    return Err(Infeasible);
                }

                if r < transient_count && original != m {
                    patch.transient[r] += req;
                    if patch.transient[r] > machine.capacity(r.into()) {
                        return Err(Infeasible);
                    }
                }

                cost += (new_excess - old_excess)
                    * instance.resource(r.into()).weight_load_cost();
            }
        }

        // The machine may no longer fit other, still-unassigned slots.
        let excess: SmallVec<[i64; 16]> = {
            let patch = &core.patches[&m];
            SmallVec::from_slice(&patch.excess)
        };
        let transient: SmallVec<[i64; 16]> = {
            let patch = &core.patches[&m];
            SmallVec::from_slice(&patch.transient)
        };
        for j in 0..core.num_slots() {
            if core.vars[j].is_assigned() || !core.vars[j].contains(m) {
                continue;
            }
            let other = instance.process(core.slot_process(j));
            let fits = other.requirements().iter().enumerate().all(|(r, &req)| {
                if excess[r] + req > machine.capacity(r.into()) - machine.safety_capacity(r.into())
                {
                    return false;
                }
                if r < transient_count
                    && other.original_machine() != m
                    && transient[r] + req > machine.capacity(r.into())
                {
                    return false;
                }
                true
            });
            if !fits {
                core.remove_machine(j, m);
                if core.failed {
                    return Err(Infeasible);
                }
            }
        }

        // Balance: this slot leaves the unassigned pools and lands in the
        // machine's patch.
        for b in 0..instance.num_balances() {
            let bal = instance.balance(b.into());
            let process_balance = process.requirement(bal.resource2())
                - bal.target() * process.requirement(bal.resource1());

            if process_balance < 0 {
                core.min_unassigned_balance[b] -= process_balance;
            } else {
                core.max_unassigned_balance[b] -= process_balance;
            }

            let patch = core.ensure_patch(m);
            let old_balance = patch.balance[b].max(0);
            patch.balance[b] += process_balance;
            let new_balance = patch.balance[b].max(0);

            cost += (new_balance - old_balance) * bal.weight();
        }

        if original != m {
            cost += process.move_cost() * instance.weight_process_move();
        }
        cost += instance.machine(original).move_cost_to(m) * instance.weight_machine_move();

        core.costs[self.slot].assign(clamp_cost(cost))?;
        // Patches and balance pools moved; every cost bound is stale.
        core.changed = true;

        self.done = true;
        Ok(())
    }
}
