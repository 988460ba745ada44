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

//! Neighborhood strategies: each iteration picks a small set of movable
//! processes, explores it with a Reschedule Space, and returns the
//! improved state if the search found one.

pub mod process_neighborhood;
pub mod target_move;
pub mod undo_move;
pub mod weighted_random;

pub use process_neighborhood::ProcessNeighborhoodSearch;
pub use target_move::TargetMoveSearch;
pub use undo_move::UndoMoveSearch;
pub use weighted_random::WeightedRandomSearch;

use crate::state::{ProcessFixing, ReAssignment};
use reassign_core::prelude::Cost;
use reassign_model::common::ProcessId;
use reassign_model::problem::Instance;
use std::time::Instant;

/// Shared read-only inputs of one strategy window.
pub struct SearchContext<'a> {
    pub instance: &'a Instance,
    pub fixing: &'a ProcessFixing,
    /// Hard stop for this window (already capped at the global deadline).
    pub deadline: Instant,
}

impl SearchContext<'_> {
    #[inline]
    pub fn out_of_time(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

pub trait Strategy {
    fn name(&self) -> &'static str;

    /// One iteration: pick a neighborhood, explore it, return the
    /// improved state or `None`.
    fn run_once(&mut self, ctx: &SearchContext<'_>, state: &ReAssignment)
    -> Option<ReAssignment>;
}

/// Iterate a strategy until its window closes or it fails
/// `MAX_CONSECUTIVE_FAILURES` times in a row. Improvements feed the next
/// iteration; the best one is returned.
pub fn run_strategy(
    strategy: &mut dyn Strategy,
    ctx: &SearchContext<'_>,
    best_known: &ReAssignment,
) -> Option<ReAssignment> {
    const MAX_CONSECUTIVE_FAILURES: u32 = 50_000;

    let mut best: Option<ReAssignment> = None;
    let mut failures = 0_u32;
    let mut iterations = 0_u64;

    while !ctx.out_of_time() && failures < MAX_CONSECUTIVE_FAILURES {
        iterations += 1;
        let current = best.as_ref().unwrap_or(best_known);
        match strategy.run_once(ctx, current) {
            Some(improved) => {
                tracing::debug!(
                    strategy = strategy.name(),
                    iterations,
                    cost = improved.total_cost(),
                    "strategy improved"
                );
                best = Some(improved);
                failures = 0;
            }
            None => failures += 1,
        }
    }

    best
}

/// Upper bound of the cost recovered by moving each movable process off
/// its machine: the load cost its requirement causes there, plus the
/// move costs it would get back by returning home.
pub fn process_gains(
    instance: &Instance,
    state: &ReAssignment,
    fixing: &ProcessFixing,
) -> Vec<(ProcessId, Cost)> {
    let mut gains = Vec::with_capacity(instance.num_processes());

    for p in instance.iter_processes() {
        if fixing.is_fixed(p) {
            continue;
        }
        let process = instance.process(p);
        let m = state.machine_of(p);

        let mut gain = load_gain(instance, state, p);
        if m != process.original_machine() {
            gain += process.move_cost() * instance.weight_process_move();
            gain += instance
                .machine(process.original_machine())
                .move_cost_to(m)
                * instance.weight_machine_move();
        }
        gains.push((p, gain));
    }

    gains
}

/// Load cost `p`'s requirement causes on its current machine.
pub fn load_gain(instance: &Instance, state: &ReAssignment, p: ProcessId) -> Cost {
    let process = instance.process(p);
    let m = state.machine_of(p);
    process
        .requirements()
        .iter()
        .enumerate()
        .map(|(r, &req)| {
            let excess = state.excess_row(m)[r];
            (excess.max(0) - (excess - req).max(0))
                * instance.resource(r.into()).weight_load_cost()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reassign_model::prelude::InstanceBuilder;

    #[test]
    fn test_process_gains_skip_fixed_and_count_moves() {
        let instance = InstanceBuilder::new()
            .resource(false, 2)
            .machine(0, 0, vec![10], vec![2], vec![0, 1])
            .machine(0, 0, vec![10], vec![2], vec![1, 0])
            .service(1, vec![])
            .service(1, vec![])
            .process(0, vec![4], 3)
            .process(1, vec![4], 5)
            .weights(7, 1, 11)
            .build(vec![0, 0])
            .unwrap();
        let fixing = ProcessFixing::new(&instance);

        // Both on machine 0: load 8, excess 6. Removing one recovers
        // (6 - 2) * 2 = 8.
        let state = ReAssignment::from_initial(&instance);
        let gains = process_gains(&instance, &state, &fixing);
        assert_eq!(gains.len(), 2);
        assert!(gains.iter().all(|&(_, g)| g == 8));

        // Displace process 1 to machine 1: load part (2 - 0) * 2 = 4 plus
        // the process move (5 * 7) and machine move (1 * 11) it would
        // recover by returning home.
        let displaced = ReAssignment::from_assignment(
            &instance,
            vec![
                reassign_model::common::MachineId::new(0),
                reassign_model::common::MachineId::new(1),
            ],
        );
        let gains = process_gains(&instance, &displaced, &fixing);
        let g1 = gains
            .iter()
            .find(|(p, _)| *p == ProcessId::new(1))
            .unwrap()
            .1;
        assert_eq!(g1, 4 + 35 + 11);
    }
}
