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

use super::{SearchContext, Strategy, process_gains};
use crate::space::{RescheduleSpace, solve_dfs};
use crate::state::ReAssignment;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use reassign_model::common::ProcessId;
use smallvec::SmallVec;

/// Slots taken from the top of the cost-contribution list.
const RANKED: usize = 4;
/// Random movable top-up.
const RANDOM: usize = 3;

/// Explore the most cost-expensive processes together with a few random
/// ones; on failure advance down the ranked list.
#[derive(Debug)]
pub struct ProcessNeighborhoodSearch {
    rng: ChaCha8Rng,
}

impl ProcessNeighborhoodSearch {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl Strategy for ProcessNeighborhoodSearch {
    fn name(&self) -> &'static str {
        "process-neighborhood"
    }

    fn run_once(
        &mut self,
        ctx: &SearchContext<'_>,
        state: &ReAssignment,
    ) -> Option<ReAssignment> {
        let instance = ctx.instance;

        let mut gains = process_gains(instance, state, ctx.fixing);
        gains.sort_by(|a, b| b.1.cmp(&a.1));
        gains.retain(|&(_, g)| g > 0);

        let movable = ctx.fixing.movable_by_size();
        if movable.is_empty() {
            return None;
        }

        let mut start = 0;
        loop {
            let mut moved: SmallVec<[ProcessId; 8]> = SmallVec::new();
            for &(p, _) in gains.iter().skip(start).take(RANKED) {
                moved.push(p);
            }

            // Random top-up to the full neighborhood size.
            let want = (RANKED + RANDOM).min(movable.len());
            let mut attempts = 0;
            while moved.len() < want && attempts < 64 {
                attempts += 1;
                let p = movable[self.rng.random_range(0..movable.len())];
                if !moved.contains(&p) {
                    moved.push(p);
                }
            }
            if moved.is_empty() {
                return None;
            }

            let space = RescheduleSpace::new(instance, state, &moved);
            if let Some(solved) = solve_dfs(space, moved.len() * 5) {
                return Some(solved.result_state());
            }

            start += RANKED;
            if start >= gains.len() || ctx.out_of_time() {
                return None;
            }
        }
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
    fn test_process_neighborhood_spreads_load() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![30], vec![2], vec![0, 0, 0])
            .machine(0, 0, vec![30], vec![2], vec![0, 0, 0])
            .machine(0, 0, vec![30], vec![2], vec![0, 0, 0])
            .service(1, vec![])
            .service(1, vec![])
            .service(1, vec![])
            .service(1, vec![])
            .process(0, vec![2], 0)
            .process(1, vec![2], 0)
            .process(2, vec![2], 0)
            .process(3, vec![2], 0)
            .weights(0, 0, 0)
            .build(vec![0, 0, 0, 0])
            .unwrap();
        let state = ReAssignment::from_initial(&instance);
        assert_eq!(state.total_cost(), 6);

        let fixing = ProcessFixing::new(&instance);
        let ctx = SearchContext {
            instance: &instance,
            fixing: &fixing,
            deadline: Instant::now() + Duration::from_secs(5),
        };

        let mut strategy = ProcessNeighborhoodSearch::new(ChaCha8Rng::seed_from_u64(7));
        let improved = strategy.run_once(&ctx, &state).expect("finds an improvement");
        assert!(improved.total_cost() < state.total_cost());
        assert!(validation::is_feasible(&instance, improved.assignment()));
    }
}
