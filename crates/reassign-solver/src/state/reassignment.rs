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

use reassign_core::prelude::Cost;
use reassign_model::common::{BalanceId, MachineId, ProcessId, ResourceId};
use reassign_model::problem::Instance;

/// A full assignment together with the cached per-machine load state and
/// the aggregate cost terms.
///
/// `excess[m][r]` is load minus safety capacity and may be negative.
/// `transient[m][r]` covers the transient resource prefix and counts every
/// process that is currently on `m` or originally was. The state is
/// replaced wholesale whenever a search finds an improvement; `Clone` is a
/// deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReAssignment {
    pub(crate) assignment: Vec<MachineId>,
    pub(crate) excess: Vec<Vec<i64>>,
    pub(crate) transient: Vec<Vec<i64>>,
    pub(crate) balance: Vec<Vec<i64>>,
    pub(crate) load_cost: Cost,
    pub(crate) balance_cost: Cost,
    pub(crate) process_moves: Cost,
    pub(crate) machine_moves: Cost,
    weight_process_move: Cost,
    weight_machine_move: Cost,
}

impl ReAssignment {
    /// State for the instance's initial assignment.
    pub fn from_initial(instance: &Instance) -> Self {
        Self::from_assignment(instance, instance.initial_assignment().to_vec())
    }

    /// State for an arbitrary assignment; original machines stay those of
    /// the instance, so displaced processes accrue move costs and keep
    /// their transient claim.
    pub fn from_assignment(instance: &Instance, assignment: Vec<MachineId>) -> Self {
        let num_machines = instance.num_machines();
        let num_resources = instance.num_resources();
        let transient_count = instance.transient_count();

        let mut excess = vec![vec![0_i64; num_resources]; num_machines];
        let mut transient = vec![vec![0_i64; transient_count]; num_machines];
        let mut balance = vec![vec![0_i64; instance.num_balances()]; num_machines];

        let mut process_moves: Cost = 0;
        let mut machine_moves: Cost = 0;

        for (p, &machine) in assignment.iter().enumerate() {
            let process = instance.process(ProcessId::new(p));
            for r in instance.iter_resources() {
                excess[machine.get()][r.get()] += process.requirement(r);
            }
            for r in instance.iter_transient_resources() {
                transient[machine.get()][r.get()] += process.requirement(r);
                let original = process.original_machine();
                if original != machine {
                    transient[original.get()][r.get()] += process.requirement(r);
                }
            }
            if process.original_machine() != machine {
                process_moves += process.move_cost();
                machine_moves += instance
                    .machine(process.original_machine())
                    .move_cost_to(machine);
            }
        }

        let mut load_units = vec![0_i64; num_resources];
        let mut balance_units = vec![0_i64; instance.num_balances()];

        for m in instance.iter_machines() {
            let machine = instance.machine(m);
            for r in instance.iter_resources() {
                excess[m.get()][r.get()] -= machine.safety_capacity(r);
                load_units[r.get()] += excess[m.get()][r.get()].max(0);
            }
            for b in instance.iter_balances() {
                let bal = instance.balance(b);
                let available = |r: ResourceId| {
                    machine.capacity(r) - machine.safety_capacity(r) - excess[m.get()][r.get()]
                };
                balance[m.get()][b.get()] =
                    bal.target() * available(bal.resource1()) - available(bal.resource2());
                balance_units[b.get()] += balance[m.get()][b.get()].max(0);
            }
        }

        let load_cost = instance
            .iter_resources()
            .map(|r| load_units[r.get()] * instance.resource(r).weight_load_cost())
            .sum();
        let balance_cost = instance
            .iter_balances()
            .map(|b| balance_units[b.get()] * instance.balance(b).weight())
            .sum();

        Self {
            assignment,
            excess,
            transient,
            balance,
            load_cost,
            balance_cost,
            process_moves,
            machine_moves,
            weight_process_move: instance.weight_process_move(),
            weight_machine_move: instance.weight_machine_move(),
        }
    }

    #[inline]
    pub fn assignment(&self) -> &[MachineId] {
        &self.assignment
    }

    #[inline]
    pub fn machine_of(&self, p: ProcessId) -> MachineId {
        self.assignment[p.get()]
    }

    #[inline]
    pub fn excess(&self, m: MachineId, r: ResourceId) -> i64 {
        self.excess[m.get()][r.get()]
    }

    #[inline]
    pub fn excess_row(&self, m: MachineId) -> &[i64] {
        &self.excess[m.get()]
    }

    #[inline]
    pub fn transient(&self, m: MachineId, r: ResourceId) -> i64 {
        self.transient[m.get()][r.get()]
    }

    #[inline]
    pub fn transient_row(&self, m: MachineId) -> &[i64] {
        &self.transient[m.get()]
    }

    #[inline]
    pub fn balance(&self, m: MachineId, b: BalanceId) -> i64 {
        self.balance[m.get()][b.get()]
    }

    #[inline]
    pub fn balance_row(&self, m: MachineId) -> &[i64] {
        &self.balance[m.get()]
    }

    #[inline]
    pub fn load_cost(&self) -> Cost {
        self.load_cost
    }

    #[inline]
    pub fn balance_cost(&self) -> Cost {
        self.balance_cost
    }

    #[inline]
    pub fn process_moves(&self) -> Cost {
        self.process_moves
    }

    #[inline]
    pub fn machine_moves(&self) -> Cost {
        self.machine_moves
    }

    #[inline]
    pub fn total_cost(&self) -> Cost {
        self.load_cost
            + self.balance_cost
            + self.process_moves * self.weight_process_move
            + self.machine_moves * self.weight_machine_move
    }
}

impl std::fmt::Display for ReAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ReAssignment(load: {}, balance: {}, process_moves: {}, machine_moves: {}, total: {})",
            self.load_cost,
            self.balance_cost,
            self.process_moves,
            self.machine_moves,
            self.total_cost()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reassign_model::prelude::InstanceBuilder;

    fn small_instance() -> Instance {
        InstanceBuilder::new()
            .resource(true, 10)
            .resource(false, 1)
            .machine(0, 0, vec![20, 30], vec![10, 25], vec![0, 4])
            .machine(0, 1, vec![20, 30], vec![10, 25], vec![3, 0])
            .service(1, vec![])
            .service(1, vec![])
            .process(0, vec![8, 12], 5)
            .process(1, vec![6, 10], 7)
            .weights(2, 1, 3)
            .build(vec![0, 0])
            .unwrap()
    }

    #[test]
    fn test_initial_state_caches() {
        let instance = small_instance();
        let state = ReAssignment::from_initial(&instance);

        // Machine 0 carries both processes: load (14, 22).
        assert_eq!(state.excess(MachineId::new(0), ResourceId::new(0)), 4);
        assert_eq!(state.excess(MachineId::new(0), ResourceId::new(1)), -3);
        // Machine 1 is empty.
        assert_eq!(state.excess(MachineId::new(1), ResourceId::new(0)), -10);
        // Transient prefix counts both processes on machine 0.
        assert_eq!(state.transient(MachineId::new(0), ResourceId::new(0)), 14);
        assert_eq!(state.transient(MachineId::new(1), ResourceId::new(0)), 0);

        // No moves in the initial state.
        assert_eq!(state.process_moves(), 0);
        assert_eq!(state.machine_moves(), 0);

        // Load cost: only machine 0 resource 0 exceeds safety: 4 * 10.
        assert_eq!(state.load_cost(), 40);
        assert_eq!(state.total_cost(), 40);
    }

    #[test]
    fn test_displaced_assignment_accrues_moves_and_keeps_transient_claim() {
        let instance = small_instance();
        let state = ReAssignment::from_assignment(
            &instance,
            vec![MachineId::new(0), MachineId::new(1)],
        );

        // Process 1 moved 0 -> 1: process move 7, machine move cost 4.
        assert_eq!(state.process_moves(), 7);
        assert_eq!(state.machine_moves(), 4);

        // Transient: process 1 claims resource 0 on both machines.
        assert_eq!(state.transient(MachineId::new(0), ResourceId::new(0)), 14);
        assert_eq!(state.transient(MachineId::new(1), ResourceId::new(0)), 6);

        // Excess drops on machine 0.
        assert_eq!(state.excess(MachineId::new(0), ResourceId::new(0)), -2);
        assert_eq!(state.excess(MachineId::new(1), ResourceId::new(0)), -4);

        // total = load 0 + balance 0 + 7*2 + 4*3.
        assert_eq!(state.total_cost(), 26);
    }

    #[test]
    fn test_clone_is_deep() {
        let instance = small_instance();
        let state = ReAssignment::from_initial(&instance);
        let mut copy = state.clone();
        copy.assignment[0] = MachineId::new(1);
        copy.excess[0][0] = 99;
        assert_eq!(state.assignment[0], MachineId::new(0));
        assert_eq!(state.excess[0][0], 4);
    }
}
