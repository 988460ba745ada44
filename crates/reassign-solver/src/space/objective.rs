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

/// Branch-and-bound objective: the sum of the slot cost variables must
/// stay strictly below the space's limit. Fails when the lower bounds
/// alone reach the limit and tightens each slot's upper bound to the
/// slack the other slots leave.
#[derive(Debug, Clone)]
pub struct ObjectivePropagator;

impl ObjectivePropagator {
    pub fn propagate(&mut self, core: &mut SpaceCore<'_>) -> Result<(), Infeasible> {
        let sum_min: Cost = core.costs.iter().map(|c| c.min() as Cost).sum();
        if sum_min >= core.limit {
            return Err(Infeasible);
        }

        for i in 0..core.costs.len() {
            let others = sum_min - core.costs[i].min() as Cost;
            let slack = core.limit - 1 - others;
            let changed = core.costs[i].tighten_max(clamp_cost(slack))?;
            core.changed |= changed;
        }

        Ok(())
    }
}
