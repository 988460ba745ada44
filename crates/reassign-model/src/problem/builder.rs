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

use crate::common::{LocationId, MachineId, NeighborhoodId, ResourceId, ServiceId};
use crate::problem::err::{AssignmentLengthError, InstanceError};
use crate::problem::{Balance, Instance, Machine, Process, Resource, Service};
use reassign_core::prelude::Cost;

/// Programmatic instance assembly, mainly for tests and benches.
///
/// Entities are referenced by insertion order, matching the file format.
#[derive(Debug, Default)]
pub struct InstanceBuilder {
    resources: Vec<Resource>,
    machines: Vec<Machine>,
    services: Vec<Service>,
    processes: Vec<(usize, Vec<i64>, Cost)>,
    balances: Vec<Balance>,
    weight_process_move: Cost,
    weight_service_move: Cost,
    weight_machine_move: Cost,
}

impl InstanceBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, transient: bool, weight_load_cost: Cost) -> Self {
        self.resources.push(Resource::new(transient, weight_load_cost));
        self
    }

    pub fn machine(
        mut self,
        neighborhood: usize,
        location: usize,
        capacity: Vec<i64>,
        safety_capacity: Vec<i64>,
        move_cost: Vec<Cost>,
    ) -> Self {
        self.machines.push(Machine::new(
            NeighborhoodId::new(neighborhood),
            LocationId::new(location),
            capacity,
            safety_capacity,
            move_cost,
        ));
        self
    }

    pub fn service(mut self, min_spread: usize, depends_on: Vec<usize>) -> Self {
        self.services.push(Service::new(
            min_spread,
            depends_on.into_iter().map(ServiceId::new).collect(),
        ));
        self
    }

    pub fn process(mut self, service: usize, requirement: Vec<i64>, move_cost: Cost) -> Self {
        self.processes.push((service, requirement, move_cost));
        self
    }

    pub fn balance(mut self, resource1: usize, resource2: usize, target: i64, weight: Cost) -> Self {
        self.balances.push(Balance::new(
            ResourceId::new(resource1),
            ResourceId::new(resource2),
            target,
            weight,
        ));
        self
    }

    pub fn weights(mut self, process_move: Cost, service_move: Cost, machine_move: Cost) -> Self {
        self.weight_process_move = process_move;
        self.weight_service_move = service_move;
        self.weight_machine_move = machine_move;
        self
    }

    /// Finish with the initial assignment (one machine index per process).
    pub fn build(self, initial_assignment: Vec<usize>) -> Result<Instance, InstanceError> {
        if initial_assignment.len() != self.processes.len() {
            return Err(
                AssignmentLengthError::new(self.processes.len(), initial_assignment.len()).into(),
            );
        }

        let processes = self
            .processes
            .into_iter()
            .zip(initial_assignment)
            .map(|((service, requirement, move_cost), machine)| {
                Process::new(
                    ServiceId::new(service),
                    requirement,
                    move_cost,
                    MachineId::new(machine),
                )
            })
            .collect();

        Instance::new(
            self.resources,
            self.machines,
            self.services,
            processes,
            self.balances,
            self.weight_process_move,
            self.weight_service_move,
            self.weight_machine_move,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assembles_minimal_instance() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![5], vec![0])
            .service(1, vec![])
            .process(0, vec![2], 1)
            .weights(1, 10, 100)
            .build(vec![0])
            .unwrap();

        assert_eq!(instance.num_resources(), 1);
        assert_eq!(instance.num_machines(), 1);
        assert_eq!(instance.num_processes(), 1);
        assert_eq!(instance.weight_process_move(), 1);
        assert_eq!(instance.weight_machine_move(), 100);
        assert_eq!(instance.initial_assignment(), &[MachineId::new(0)]);
    }
}
