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
use super::assign::AssignPropagator;
use super::core::SpaceCore;
use super::cost::CostPropagator;
use super::objective::ObjectivePropagator;
use super::service::{DistinctPropagator, SpreadPropagator};
use crate::state::ReAssignment;
use fixedbitset::FixedBitSet;
use reassign_core::prelude::Cost;
use reassign_model::common::{MachineId, NeighborhoodId, ProcessId, ServiceId};
use reassign_model::problem::Instance;
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// Propagator variant; one engine loop dispatches over it.
#[derive(Debug, Clone)]
pub enum Propagator {
    Assign(AssignPropagator),
    Cost(CostPropagator),
    Distinct(DistinctPropagator),
    Spread(SpreadPropagator),
    Objective(ObjectivePropagator),
}

impl Propagator {
    fn propagate(&mut self, core: &mut SpaceCore<'_>) -> Result<(), Infeasible> {
        match self {
            Propagator::Assign(p) => p.propagate(core),
            Propagator::Cost(p) => p.propagate(core),
            Propagator::Distinct(p) => p.propagate(core),
            Propagator::Spread(p) => p.propagate(core),
            Propagator::Objective(p) => p.propagate(core),
        }
    }
}

/// CP subproblem over a small neighborhood of movable processes.
///
/// Construction removes the moved processes from their machines' patches,
/// folds the removal into `base_total_cost`, posts the service
/// constraints, and bounds the objective strictly below the baseline.
/// The depth-first search clones the whole space at every branch point;
/// clones are structurally independent.
#[derive(Debug, Clone)]
pub struct RescheduleSpace<'a> {
    pub(crate) core: SpaceCore<'a>,
    props: Vec<Propagator>,
}

impl<'a> RescheduleSpace<'a> {
    pub fn new(instance: &'a Instance, state: &'a ReAssignment, moved: &[ProcessId]) -> Self {
        debug_assert!(
            moved
                .iter()
                .collect::<BTreeSet<_>>()
                .len()
                == moved.len(),
            "neighborhood must not repeat processes"
        );

        let mut core = SpaceCore::new(instance, state, moved);
        let mut props = Vec::with_capacity(2 * moved.len() + 4);

        // Remove each moved process from its current machine's patch.
        let mut process_move_delta: Cost = 0;
        let mut machine_move_delta: Cost = 0;
        for &p in moved {
            let current = state.machine_of(p);
            let process = instance.process(p);
            let displaced = process.original_machine() != current;

            let patch = core.ensure_patch(current);
            for (r, &req) in process.requirements().iter().enumerate() {
                patch.excess[r] -= req;
                if displaced && r < instance.transient_count() {
                    patch.transient[r] -= req;
                }
            }

            if displaced {
                process_move_delta -= process.move_cost();
                machine_move_delta -= instance
                    .machine(process.original_machine())
                    .move_cost_to(current);
            }
        }

        // Load cost of the emptied machines relative to the baseline.
        let mut moved_load_cost: Cost = 0;
        for (&m, patch) in &core.patches {
            for (r, &excess) in patch.excess.iter().enumerate() {
                let old = state.excess_row(m)[r].max(0);
                let new = excess.max(0);
                moved_load_cost += (new - old) * instance.resource(r.into()).weight_load_cost();
            }
        }

        // Balance deltas of the moved processes enter the unassigned pools
        // and leave their machines' patches.
        let mut moved_balance_cost: Cost = 0;
        for b in 0..instance.num_balances() {
            let bal = instance.balance(b.into());
            for &p in moved {
                let process = instance.process(p);
                let diff = process.requirement(bal.resource2())
                    - bal.target() * process.requirement(bal.resource1());
                if diff < 0 {
                    core.min_unassigned_balance[b] += diff;
                } else {
                    core.max_unassigned_balance[b] += diff;
                }

                let patch = core
                    .patches
                    .get_mut(&state.machine_of(p))
                    .expect("moved process machines are patched");
                let old = patch.balance[b].max(0);
                patch.balance[b] -= diff;
                let new = patch.balance[b].max(0);
                moved_balance_cost += (new - old) * bal.weight();
            }
        }

        core.base_total_cost = (state.process_moves() + process_move_delta)
            * instance.weight_process_move()
            + (state.machine_moves() + machine_move_delta) * instance.weight_machine_move()
            + state.load_cost()
            + moved_load_cost
            + state.balance_cost()
            + moved_balance_cost;
        core.limit = state.total_cost() - core.base_total_cost;

        post_conflict(instance, state, &mut core, &mut props);
        post_spread(instance, state, &mut core, &mut props);
        post_dependency(instance, state, &mut core);

        for slot in 0..core.num_slots() {
            props.push(Propagator::Assign(AssignPropagator::new(slot)));
            props.push(Propagator::Cost(CostPropagator::new(slot)));
        }
        props.push(Propagator::Objective(ObjectivePropagator));

        Self { core, props }
    }

    /// Pin a slot to a machine before the search starts.
    pub fn post_assignment(&mut self, slot: usize, machine: MachineId) {
        self.core.assign_slot(slot, machine);
    }

    /// Tighten the objective below the best solution found so far.
    pub fn constrain(&mut self, best: &RescheduleSpace<'_>) {
        let limit = best.core.base_total_cost + best.core.total_value() - self.core.base_total_cost;
        self.core.limit = self.core.limit.min(limit);
    }

    /// Run all propagators to a fixpoint.
    pub fn propagate(&mut self) -> Result<(), Infeasible> {
        loop {
            if self.core.failed {
                return Err(Infeasible);
            }
            self.core.changed = false;
            for prop in &mut self.props {
                prop.propagate(&mut self.core)?;
                if self.core.failed {
                    return Err(Infeasible);
                }
            }
            if !self.core.changed {
                return Ok(());
            }
        }
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.core.all_assigned()
    }

    #[inline]
    pub fn base_total_cost(&self) -> Cost {
        self.core.base_total_cost
    }

    /// Objective value inside the CP scope, once solved.
    #[inline]
    pub fn total_value(&self) -> Cost {
        self.core.total_value()
    }

    /// Rebuild a full state from the baseline and this space's solution.
    pub fn result_state(&self) -> ReAssignment {
        debug_assert!(self.is_solved());
        let instance = self.core.instance;
        let state = self.core.state;
        let mut result = state.clone();

        for (slot, &p) in self.core.moved.iter().enumerate() {
            let target = self.core.vars[slot]
                .value()
                .expect("solved space has assigned slots");
            result.assignment[p.get()] = target;

            let process = instance.process(p);
            let original = process.original_machine();
            let previous = state.machine_of(p);
            if original == previous {
                if original != target {
                    result.process_moves += process.move_cost();
                }
            } else if original == target {
                result.process_moves -= process.move_cost();
            }

            result.machine_moves -= instance.machine(original).move_cost_to(previous);
            result.machine_moves += instance.machine(original).move_cost_to(target);
        }

        for (&m, patch) in &self.core.patches {
            for (r, &excess) in patch.excess.iter().enumerate() {
                let old = result.excess[m.get()][r].max(0);
                let new = excess.max(0);
                result.load_cost += (new - old) * instance.resource(r.into()).weight_load_cost();
            }
            for (b, &balance) in patch.balance.iter().enumerate() {
                let old = result.balance[m.get()][b].max(0);
                let new = balance.max(0);
                result.balance_cost += (new - old) * instance.balance(b.into()).weight();
            }

            result.excess[m.get()].copy_from_slice(&patch.excess);
            result.transient[m.get()].copy_from_slice(&patch.transient);
            result.balance[m.get()].copy_from_slice(&patch.balance);
        }

        debug_assert_eq!(
            result.total_cost(),
            self.core.base_total_cost + self.core.total_value(),
            "rebuilt cost must match the space's accounting"
        );

        result
    }
}

/// No two members of one service on the same machine: distinct machines
/// among movable members, and the machines of staying members removed
/// from each movable member's domain.
fn post_conflict(
    instance: &Instance,
    state: &ReAssignment,
    core: &mut SpaceCore<'_>,
    props: &mut Vec<Propagator>,
) {
    let mut by_service: BTreeMap<ServiceId, SmallVec<[usize; 4]>> = BTreeMap::new();
    for (slot, &p) in core.moved.iter().enumerate() {
        by_service
            .entry(instance.process(p).service())
            .or_default()
            .push(slot);
    }

    for slots in by_service.values() {
        if slots.len() > 1 {
            props.push(Propagator::Distinct(DistinctPropagator::new(slots.clone())));
        }
    }

    let moved = core.moved.clone();
    for (slot, &p) in moved.iter().enumerate() {
        for &member in instance.service(instance.process(p).service()).processes() {
            if member != p && !moved.contains(&member) {
                core.remove_machine(slot, state.machine_of(member));
            }
        }
    }
}

/// Spread: posted only for services whose staying members cover fewer
/// locations than the minimum spread.
fn post_spread(
    instance: &Instance,
    state: &ReAssignment,
    core: &mut SpaceCore<'_>,
    props: &mut Vec<Propagator>,
) {
    let mut by_service: BTreeMap<ServiceId, SmallVec<[usize; 4]>> = BTreeMap::new();
    for (slot, &p) in core.moved.iter().enumerate() {
        let service = instance.process(p).service();
        if instance.service(service).min_spread() > 1 {
            by_service.entry(service).or_default().push(slot);
        }
    }

    for (service, slots) in by_service {
        let mut staying = FixedBitSet::with_capacity(instance.num_locations());
        for &member in instance.service(service).processes() {
            if !core.moved.contains(&member) {
                staying.insert(instance.machine(state.machine_of(member)).location().get());
            }
        }

        let min_spread = instance.service(service).min_spread();
        if staying.count_ones(..) < min_spread {
            props.push(Propagator::Spread(SpreadPropagator::new(
                slots, staying, min_spread,
            )));
        }
    }
}

/// Dependency: moved processes of depended-upon services may be pinned to
/// their neighborhood; moved processes of dependent services are
/// restricted to neighborhoods their dependencies cover.
fn post_dependency(instance: &Instance, state: &ReAssignment, core: &mut SpaceCore<'_>) {
    let moved = core.moved.clone();

    // A depended-upon process may not leave a neighborhood in which it is
    // the last member while a dependent process lives there.
    for (slot, &p) in moved.iter().enumerate() {
        let service = instance.service(instance.process(p).service());
        if service.required_by().is_empty() {
            continue;
        }

        let current = instance.machine(state.machine_of(p)).neighborhood();
        let stays = service.processes().iter().any(|&member| {
            instance.machine(state.machine_of(member)).neighborhood() == current
                && !moved.contains(&member)
        });
        if stays {
            continue;
        }

        let needed = service.required_by().iter().any(|&dependent| {
            instance
                .service(dependent)
                .processes()
                .iter()
                .any(|&q| instance.machine(state.machine_of(q)).neighborhood() == current)
        });
        if needed {
            core.retain_slot(slot, instance.neighborhood_machines(current));
        }
    }

    // Dependent services: intersect the neighborhoods covered by the
    // staying members of every required service.
    let mut by_service: BTreeMap<ServiceId, SmallVec<[usize; 4]>> = BTreeMap::new();
    for (slot, &p) in moved.iter().enumerate() {
        let service = instance.process(p).service();
        if !instance.service(service).depends_on().is_empty() {
            by_service.entry(service).or_default().push(slot);
        }
    }

    for (service, slots) in by_service {
        let mut intersection: Option<BTreeSet<NeighborhoodId>> = None;
        for &dependency in instance.service(service).depends_on() {
            let covered: BTreeSet<NeighborhoodId> = instance
                .service(dependency)
                .processes()
                .iter()
                .filter(|&&q| !moved.contains(&q))
                .map(|&q| instance.machine(state.machine_of(q)).neighborhood())
                .collect();
            intersection = Some(match intersection {
                None => covered,
                Some(acc) => acc.intersection(&covered).copied().collect(),
            });
        }
        let intersection = intersection.unwrap_or_default();

        // Covering every neighborhood constrains nothing.
        if intersection.len() == instance.num_neighborhoods() {
            continue;
        }

        if intersection.is_empty() {
            // A required service has all its members in the moved list;
            // those stay put, so the dependent members are pinned too.
            for &slot in &slots {
                core.assign_slot(slot, state.machine_of(core.moved[slot]));
            }
            continue;
        }

        let mut machines: Vec<MachineId> = Vec::new();
        for &neighborhood in &intersection {
            machines.extend_from_slice(instance.neighborhood_machines(neighborhood));
        }
        for &slot in &slots {
            core.retain_slot(slot, &machines);
        }
    }
}
