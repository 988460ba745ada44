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
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand_chacha::ChaCha8Rng;
use reassign_model::common::ProcessId;
use smallvec::SmallVec;

/// Sample a neighborhood of distinct processes with probability
/// proportional to their cost contribution (plus a floor so cost-free
/// processes stay reachable).
#[derive(Debug)]
pub struct WeightedRandomSearch {
    rng: ChaCha8Rng,
    size: usize,
}

impl WeightedRandomSearch {
    pub fn new(rng: ChaCha8Rng, size: usize) -> Self {
        Self { rng, size }
    }
}

impl Strategy for WeightedRandomSearch {
    fn name(&self) -> &'static str {
        "weighted-random"
    }

    fn run_once(
        &mut self,
        ctx: &SearchContext<'_>,
        state: &ReAssignment,
    ) -> Option<ReAssignment> {
        let instance = ctx.instance;

        let gains = process_gains(instance, state, ctx.fixing);
        if gains.is_empty() {
            return None;
        }

        let weights: Vec<i64> = gains.iter().map(|&(_, g)| g + 10).collect();
        let Ok(index) = WeightedIndex::new(&weights) else {
            return None;
        };

        let count = self.size.min(gains.len());
        if count == 0 {
            return None;
        }

        while !ctx.out_of_time() {
            let mut moved: SmallVec<[ProcessId; 8]> = SmallVec::new();
            while moved.len() < count {
                let p = gains[index.sample(&mut self.rng)].0;
                if !moved.contains(&p) {
                    moved.push(p);
                }
            }

            let space = RescheduleSpace::new(instance, state, &moved);
            if let Some(solved) = solve_dfs(space, moved.len() * 5) {
                return Some(solved.result_state());
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
    fn test_weighted_random_finds_improvement() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![20], vec![2], vec![0, 0])
            .machine(0, 0, vec![20], vec![2], vec![0, 0])
            .service(1, vec![])
            .service(1, vec![])
            .process(0, vec![4], 0)
            .process(1, vec![4], 0)
            .weights(0, 0, 0)
            .build(vec![0, 0])
            .unwrap();
        let state = ReAssignment::from_initial(&instance);
        assert_eq!(state.total_cost(), 6);

        let fixing = ProcessFixing::new(&instance);
        let ctx = SearchContext {
            instance: &instance,
            fixing: &fixing,
            deadline: Instant::now() + Duration::from_secs(5),
        };

        let mut strategy = WeightedRandomSearch::new(ChaCha8Rng::seed_from_u64(3), 2);
        let improved = strategy.run_once(&ctx, &state).expect("finds an improvement");
        assert!(improved.total_cost() < state.total_cost());
        assert!(validation::is_feasible(&instance, improved.assignment()));
    }

    #[test]
    fn test_empty_movable_set_returns_none() {
        let instance = InstanceBuilder::new()
            .resource(true, 1)
            .machine(0, 0, vec![10], vec![10], vec![0])
            .service(1, vec![])
            .process(0, vec![1], 0)
            .weights(1, 1, 1)
            .build(vec![0])
            .unwrap();
        let state = ReAssignment::from_initial(&instance);
        let mut fixing = ProcessFixing::new(&instance);
        fixing.fix_transient(&instance, 1.0);
        assert_eq!(fixing.num_movable(), 0);

        let ctx = SearchContext {
            instance: &instance,
            fixing: &fixing,
            deadline: Instant::now() + Duration::from_millis(200),
        };
        let mut strategy = WeightedRandomSearch::new(ChaCha8Rng::seed_from_u64(5), 7);
        assert!(strategy.run_once(&ctx, &state).is_none());
    }
}
