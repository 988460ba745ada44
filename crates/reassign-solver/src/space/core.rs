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

use super::cost_cache::CostCache;
use super::patch::{MachinePatch, PatchMap};
use super::var::{CostVar, MachineVar};
use crate::state::ReAssignment;
use reassign_core::prelude::Cost;
use reassign_model::common::{MachineId, ProcessId};
use reassign_model::problem::Instance;
use smallvec::SmallVec;

/// Shared mutable state of one space: decision variables, patches, the
/// cost cache and the unassigned-balance pools. Propagators and the
/// brancher operate on this; the propagator list lives next to it in
/// `RescheduleSpace` so both can be borrowed at once.
#[derive(Debug, Clone)]
pub struct SpaceCore<'a> {
    pub instance: &'a Instance,
    pub state: &'a ReAssignment,
    pub moved: SmallVec<[ProcessId; 8]>,
    pub vars: Vec<MachineVar>,
    pub costs: Vec<CostVar>,
    /// Baseline cost outside the CP scope (offset of the objective).
    pub base_total_cost: Cost,
    /// Exclusive upper bound on the sum of the slot cost variables.
    pub limit: Cost,
    pub patches: PatchMap,
    pub cache: CostCache,
    /// Signed magnitude pools of the not-yet-assigned balance deltas.
    pub min_unassigned_balance: Vec<i64>,
    pub max_unassigned_balance: Vec<i64>,
    /// Set by any domain mutation; drives the fixpoint loop.
    pub changed: bool,
    /// Set when a domain empties or a root posting is impossible.
    pub failed: bool,
}

impl<'a> SpaceCore<'a> {
    pub fn new(instance: &'a Instance, state: &'a ReAssignment, moved: &[ProcessId]) -> Self {
        Self {
            instance,
            state,
            moved: SmallVec::from_slice(moved),
            vars: vec![MachineVar::full(instance.num_machines()); moved.len()],
            costs: vec![CostVar::full(); moved.len()],
            base_total_cost: 0,
            limit: Cost::MAX,
            patches: PatchMap::new(),
            cache: CostCache::new(moved.len()),
            min_unassigned_balance: vec![0; instance.num_balances()],
            max_unassigned_balance: vec![0; instance.num_balances()],
            changed: false,
            failed: false,
        }
    }

    #[inline]
    pub fn num_slots(&self) -> usize {
        self.moved.len()
    }

    #[inline]
    pub fn slot_process(&self, slot: usize) -> ProcessId {
        self.moved[slot]
    }

    #[inline]
    pub fn all_assigned(&self) -> bool {
        self.vars.iter().all(MachineVar::is_assigned)
    }

    /// Sum of the slot cost values once every slot is assigned.
    #[inline]
    pub fn total_value(&self) -> Cost {
        debug_assert!(self.all_assigned());
        self.costs.iter().map(|c| c.min() as Cost).sum()
    }

    #[inline]
    pub fn remove_machine(&mut self, slot: usize, m: MachineId) {
        if self.vars[slot].remove(m) {
            self.changed = true;
            if self.vars[slot].is_empty() {
                self.failed = true;
            }
        }
    }

    #[inline]
    pub fn assign_slot(&mut self, slot: usize, m: MachineId) {
        match self.vars[slot].assign(m) {
            Ok(changed) => self.changed |= changed,
            Err(_) => self.failed = true,
        }
    }

    #[inline]
    pub fn retain_slot(&mut self, slot: usize, machines: &[MachineId]) {
        if self.vars[slot].retain_in(machines) {
            self.changed = true;
            if self.vars[slot].is_empty() {
                self.failed = true;
            }
        }
    }

    /// The patch of `m`, created from the baseline on first touch.
    #[inline]
    pub fn ensure_patch(&mut self, m: MachineId) -> &mut MachinePatch {
        let state = self.state;
        self.patches
            .entry(m)
            .or_insert_with(|| MachinePatch::from_state(state, m))
    }

    /// Patched excess of `(m, r)`, falling back to the baseline.
    #[inline]
    pub fn patched_excess(&self, m: MachineId, r: usize) -> i64 {
        match self.patches.get(&m) {
            Some(patch) => patch.excess[r],
            None => self.state.excess_row(m)[r],
        }
    }

    #[inline]
    pub fn patched_transient(&self, m: MachineId, r: usize) -> i64 {
        match self.patches.get(&m) {
            Some(patch) => patch.transient[r],
            None => self.state.transient_row(m)[r],
        }
    }

    #[inline]
    pub fn patched_balance(&self, m: MachineId, b: usize) -> i64 {
        match self.patches.get(&m) {
            Some(patch) => patch.balance[b],
            None => self.state.balance_row(m)[b],
        }
    }
}
