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

use super::core::SpaceCore;
use reassign_core::prelude::Cost;
use reassign_model::common::MachineId;

/// A binary choice: try `slot = machine` first, then `slot != machine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot: usize,
    pub machine: MachineId,
}

/// Pick the unassigned slot with the widest cost gap and its cheapest
/// cached machine. The widest gap is the largest open decision; taking
/// the cheapest candidate first keeps the incumbent tight.
pub fn best_cost_choice(core: &SpaceCore<'_>) -> Option<Choice> {
    let mut widest: i64 = i64::MIN;
    let mut slot = None;
    for i in 0..core.num_slots() {
        if !core.vars[i].is_assigned() && core.costs[i].width() > widest {
            widest = core.costs[i].width();
            slot = Some(i);
        }
    }
    let slot = slot?;

    let mut machine = core.cache.extremes(slot).min.machine;
    if !core.vars[slot].contains(machine) {
        // The cached argmin was pruned since the last rebuild; fall back
        // to the cheapest machine still in the domain.
        let mut best_cost = Cost::MAX;
        for m in core.vars[slot].iter() {
            let cached = core
                .cache
                .get(slot, m)
                .map(|bounds| bounds.min())
                .unwrap_or(Cost::MAX);
            if cached < best_cost {
                best_cost = cached;
                machine = m;
            }
        }
        if !core.vars[slot].contains(machine) {
            machine = core.vars[slot].iter().next()?;
        }
    }

    Some(Choice { slot, machine })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ReAssignment;
    use reassign_core::prelude::Bounds;
    use reassign_model::common::ProcessId;
    use reassign_model::prelude::InstanceBuilder;

    #[test]
    fn test_picks_widest_gap_and_cached_argmin() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![10], vec![0, 0, 0])
            .machine(0, 0, vec![10], vec![10], vec![0, 0, 0])
            .machine(0, 0, vec![10], vec![10], vec![0, 0, 0])
            .service(1, vec![])
            .service(1, vec![])
            .process(0, vec![1], 1)
            .process(1, vec![1], 1)
            .weights(1, 1, 1)
            .build(vec![0, 1])
            .unwrap();
        let state = ReAssignment::from_initial(&instance);
        let mut core = super::super::core::SpaceCore::new(
            &instance,
            &state,
            &[ProcessId::new(0), ProcessId::new(1)],
        );

        // Slot 0: narrow gap; slot 1: wide gap with argmin machine 2.
        core.costs[0].tighten_min(0).unwrap();
        core.costs[0].tighten_max(2).unwrap();
        core.costs[1].tighten_min(0).unwrap();
        core.costs[1].tighten_max(100).unwrap();

        let mut extremes = super::super::cost_cache::CostExtremes::collector();
        extremes.include(MachineId::new(2), Bounds::new(1, 3));
        extremes.include(MachineId::new(0), Bounds::new(4, 100));
        core.cache.set(1, MachineId::new(2), Bounds::new(1, 3));
        core.cache.set(1, MachineId::new(0), Bounds::new(4, 100));
        core.cache.set_extremes(1, extremes);

        let choice = best_cost_choice(&core).unwrap();
        assert_eq!(choice.slot, 1);
        assert_eq!(choice.machine, MachineId::new(2));
    }

    #[test]
    fn test_falls_back_when_argmin_was_pruned() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![10], vec![0, 0])
            .machine(0, 0, vec![10], vec![10], vec![0, 0])
            .service(1, vec![])
            .process(0, vec![1], 1)
            .weights(1, 1, 1)
            .build(vec![0])
            .unwrap();
        let state = ReAssignment::from_initial(&instance);
        let mut core =
            super::super::core::SpaceCore::new(&instance, &state, &[ProcessId::new(0)]);

        let mut extremes = super::super::cost_cache::CostExtremes::collector();
        extremes.include(MachineId::new(0), Bounds::new(1, 1));
        extremes.include(MachineId::new(1), Bounds::new(5, 5));
        core.cache.set(0, MachineId::new(0), Bounds::new(1, 1));
        core.cache.set(0, MachineId::new(1), Bounds::new(5, 5));
        core.cache.set_extremes(0, extremes);

        // Prune the cached argmin; the brancher walks the domain instead.
        core.remove_machine(0, MachineId::new(0));
        let choice = best_cost_choice(&core).unwrap();
        assert_eq!(choice.machine, MachineId::new(1));
    }
}
