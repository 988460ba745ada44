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

use crate::state::ReAssignment;
use reassign_model::common::MachineId;
use std::collections::BTreeMap;

/// Speculative overlay of one machine's excess/transient/balance rows.
///
/// Created lazily from the baseline the first time a machine is touched;
/// from then on the patch is the authoritative view of that machine inside
/// the space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachinePatch {
    pub excess: Vec<i64>,
    pub transient: Vec<i64>,
    pub balance: Vec<i64>,
}

impl MachinePatch {
    pub fn from_state(state: &ReAssignment, m: MachineId) -> Self {
        Self {
            excess: state.excess_row(m).to_vec(),
            transient: state.transient_row(m).to_vec(),
            balance: state.balance_row(m).to_vec(),
        }
    }
}

/// Patches of all machines touched by this space, keyed by machine.
///
/// Ordered so that `result_state` walks machines deterministically.
pub type PatchMap = BTreeMap<MachineId, MachinePatch>;

#[cfg(test)]
mod tests {
    use super::*;
    use reassign_model::prelude::InstanceBuilder;

    #[test]
    fn test_patch_copies_baseline_rows() {
        let instance = InstanceBuilder::new()
            .resource(true, 1)
            .resource(false, 2)
            .machine(0, 0, vec![10, 10], vec![5, 5], vec![0])
            .service(1, vec![])
            .process(0, vec![3, 4], 1)
            .weights(1, 1, 1)
            .build(vec![0])
            .unwrap();
        let state = ReAssignment::from_initial(&instance);
        let m = MachineId::new(0);

        let mut patch = MachinePatch::from_state(&state, m);
        assert_eq!(patch.excess, state.excess_row(m));
        assert_eq!(patch.transient, state.transient_row(m));

        // Mutating the patch leaves the baseline untouched.
        patch.excess[0] += 7;
        assert_ne!(patch.excess[0], state.excess(m, reassign_model::common::ResourceId::new(0)));
    }
}
