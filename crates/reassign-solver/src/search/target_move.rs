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

use super::{SearchContext, Strategy, load_gain};
use crate::space::{RescheduleSpace, solve_dfs};
use crate::state::ReAssignment;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use reassign_core::prelude::Cost;
use reassign_model::common::{MachineId, ProcessId};
use smallvec::SmallVec;

/// Number of co-resident processes freed up alongside the targeted move.
const MAX_EVICTED: usize = 7;

/// Move the most load-expensive process onto an attractive target machine
/// and let the space reshuffle a handful of processes already there.
#[derive(Debug)]
pub struct TargetMoveSearch {
    rng: ChaCha8Rng,
}

impl TargetMoveSearch {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl Strategy for TargetMoveSearch {
    fn name(&self) -> &'static str {
        "target-move"
    }

    fn run_once(
        &mut self,
        ctx: &SearchContext<'_>,
        state: &ReAssignment,
    ) -> Option<ReAssignment> {
        let instance = ctx.instance;

        let mut gains: Vec<(ProcessId, Cost)> = ctx
            .fixing
            .movable_by_size()
            .iter()
            .map(|&p| (p, load_gain(instance, state, p)))
            .collect();
        gains.sort_by(|a, b| b.1.cmp(&a.1));

        for &(p, gain) in &gains {
            if gain <= 0 || ctx.out_of_time() {
                return None;
            }
            let process = instance.process(p);

            // Target machines that can hold the process at all, rated by
            // how loaded they would end up (crowded machines score high).
            let mut targets: Vec<(MachineId, Cost)> = Vec::new();
            for m in instance.iter_machines() {
                let machine = instance.machine(m);
                let mut score: Cost = 0;
                let mut fits = true;
                for (r, &req) in process.requirements().iter().enumerate() {
                    if machine.capacity(r.into()) < req {
                        fits = false;
                        break;
                    }
                    let crowded = state.excess_row(m)[r] + req;
                    score += if crowded > 0 { 2 * crowded } else { crowded };
                }
                if fits {
                    targets.push((m, score));
                }
            }
            targets.sort_by(|a, b| b.1.cmp(&a.1));

            // Try the least crowded targets first, while the recovered
            // cost still beats the target's score.
            for &(m, score) in targets.iter().rev() {
                if gain <= score || ctx.out_of_time() {
                    break;
                }
                if m == state.machine_of(p) {
                    continue;
                }

                let mut residents: Vec<ProcessId> = ctx
                    .fixing
                    .movable_by_size()
                    .iter()
                    .copied()
                    .filter(|&q| state.machine_of(q) == m)
                    .collect();
                residents.shuffle(&mut self.rng);
                residents.truncate(MAX_EVICTED);

                let mut moved: SmallVec<[ProcessId; 8]> = SmallVec::from_vec(residents);
                moved.push(p);
                let forced_slot = moved.len() - 1;

                let mut space = RescheduleSpace::new(instance, state, &moved);
                space.post_assignment(forced_slot, m);

                if let Some(solved) = solve_dfs(space, moved.len() * 5) {
                    return Some(solved.result_state());
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProcessFixing;
    use rand::SeedableRng;
    use reassign_model::prelude::InstanceBuilder;
    use reassign_model::validation;
    use std::time::{Duration, Instant};

    #[test]
    fn test_target_move_relieves_overloaded_machine() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![20], vec![4], vec![0, 0])
            .machine(0, 0, vec![20], vec![4], vec![0, 0])
            .service(1, vec![])
            .service(1, vec![])
            .service(1, vec![])
            .process(0, vec![4], 0)
            .process(1, vec![4], 0)
            .process(2, vec![4], 0)
            .weights(0, 0, 0)
            .build(vec![0, 0, 0])
            .unwrap();
        let state = ReAssignment::from_initial(&instance);
        assert_eq!(state.total_cost(), 8);

        let fixing = ProcessFixing::new(&instance);
        let ctx = SearchContext {
            instance: &instance,
            fixing: &fixing,
            deadline: Instant::now() + Duration::from_secs(5),
        };

        let mut strategy = TargetMoveSearch::new(ChaCha8Rng::seed_from_u64(1));
        let improved = strategy.run_once(&ctx, &state).expect("finds an improvement");
        assert!(improved.total_cost() < state.total_cost());
        assert!(validation::is_feasible(&instance, improved.assignment()));
    }
}
