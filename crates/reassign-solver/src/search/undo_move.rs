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

use super::{SearchContext, Strategy};
use crate::space::{RescheduleSpace, solve_dfs};
use crate::state::ReAssignment;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use reassign_model::common::ProcessId;
use smallvec::SmallVec;

/// Displaced co-residents cleared out of the way of the returning process.
const MAX_OBSTACLES: usize = 5;

/// Send a displaced process back to its original machine, evicting a few
/// processes that moved onto it in the meantime.
#[derive(Debug)]
pub struct UndoMoveSearch {
    rng: ChaCha8Rng,
}

impl UndoMoveSearch {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl Strategy for UndoMoveSearch {
    fn name(&self) -> &'static str {
        "undo-move"
    }

    fn run_once(
        &mut self,
        ctx: &SearchContext<'_>,
        state: &ReAssignment,
    ) -> Option<ReAssignment> {
        let instance = ctx.instance;
        let num_processes = instance.num_processes();

        // Scan from a random start for a movable, displaced process.
        let start = self.rng.random_range(0..num_processes);
        let mut candidate = None;
        for offset in 0..num_processes {
            let p = ProcessId::new((start + offset) % num_processes);
            if !ctx.fixing.is_fixed(p)
                && state.machine_of(p) != instance.process(p).original_machine()
            {
                candidate = Some(p);
                break;
            }
        }
        let p = candidate?;
        let home = instance.process(p).original_machine();

        // Processes that moved onto the original machine stand in the way.
        let mut obstacles: Vec<ProcessId> = ctx
            .fixing
            .movable_by_size()
            .iter()
            .copied()
            .filter(|&q| {
                state.machine_of(q) == home && instance.process(q).original_machine() != home
            })
            .collect();
        obstacles.shuffle(&mut self.rng);
        obstacles.truncate(MAX_OBSTACLES);

        let mut moved: SmallVec<[ProcessId; 8]> = SmallVec::new();
        moved.push(p);
        moved.extend(obstacles);

        let mut space = RescheduleSpace::new(instance, state, &moved);
        space.post_assignment(0, home);

        solve_dfs(space, moved.len() * 5).map(|solved| solved.result_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProcessFixing;
    use rand::SeedableRng;
    use reassign_model::common::MachineId;
    use reassign_model::prelude::InstanceBuilder;
    use reassign_model::validation;
    use std::time::{Duration, Instant};

    #[test]
    fn test_undo_move_returns_process_home() {
        // Process 0 was displaced to machine 1 although home is free; the
        // move costs make returning strictly cheaper.
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![8], vec![0, 2])
            .machine(0, 0, vec![10], vec![8], vec![2, 0])
            .service(1, vec![])
            .process(0, vec![4], 3)
            .weights(1, 1, 1)
            .build(vec![0])
            .unwrap();
        let displaced =
            ReAssignment::from_assignment(&instance, vec![MachineId::new(1)]);
        // Process move 3 plus machine move 2.
        assert_eq!(displaced.total_cost(), 5);

        let fixing = ProcessFixing::new(&instance);
        let ctx = SearchContext {
            instance: &instance,
            fixing: &fixing,
            deadline: Instant::now() + Duration::from_secs(5),
        };

        let mut strategy = UndoMoveSearch::new(ChaCha8Rng::seed_from_u64(11));
        let improved = strategy.run_once(&ctx, &displaced).expect("undoes the move");
        assert_eq!(improved.machine_of(ProcessId::new(0)), MachineId::new(0));
        assert_eq!(improved.total_cost(), 0);
        assert!(validation::is_feasible(&instance, improved.assignment()));
    }

    #[test]
    fn test_no_displaced_process_returns_none() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![8], vec![0])
            .service(1, vec![])
            .process(0, vec![4], 3)
            .weights(1, 1, 1)
            .build(vec![0])
            .unwrap();
        let state = ReAssignment::from_initial(&instance);
        let fixing = ProcessFixing::new(&instance);
        let ctx = SearchContext {
            instance: &instance,
            fixing: &fixing,
            deadline: Instant::now() + Duration::from_secs(1),
        };

        let mut strategy = UndoMoveSearch::new(ChaCha8Rng::seed_from_u64(13));
        assert!(strategy.run_once(&ctx, &state).is_none());
    }
}
