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

use crate::common::{BalanceId, LocationId, MachineId, NeighborhoodId, ProcessId, ResourceId, ServiceId};
use crate::problem::err::{
    BalanceResourceError, DependencyNotFoundError, InstanceError, MachineNotFoundError,
    ResourceVectorLengthError, ServiceNotFoundError,
};
use crate::problem::{Balance, Machine, Process, Resource, Service};
use reassign_core::prelude::Cost;

/// Immutable problem data.
///
/// Construction reorders resources so transient resources form a prefix,
/// attaches processes to their services, inverts the dependency relation,
/// and precomputes the by-size orders used by the search strategies.
/// The instance never changes afterwards.
#[derive(Debug, Clone)]
pub struct Instance {
    resources: Vec<Resource>,
    transient_count: usize,
    machines: Vec<Machine>,
    neighborhoods: Vec<Vec<MachineId>>,
    locations: Vec<Vec<MachineId>>,
    services: Vec<Service>,
    processes: Vec<Process>,
    balances: Vec<Balance>,
    weight_process_move: Cost,
    weight_service_move: Cost,
    weight_machine_move: Cost,
    initial_assignment: Vec<MachineId>,
    processes_by_size: Vec<ProcessId>,
    machines_by_size: Vec<MachineId>,
}

impl Instance {
    pub fn new(
        mut resources: Vec<Resource>,
        mut machines: Vec<Machine>,
        mut services: Vec<Service>,
        mut processes: Vec<Process>,
        mut balances: Vec<Balance>,
        weight_process_move: Cost,
        weight_service_move: Cost,
        weight_machine_move: Cost,
    ) -> Result<Self, InstanceError> {
        validate(&resources, &machines, &services, &processes, &balances)?;

        // Transient resources move to the prefix of the resource order.
        let order = transient_first_order(&resources);
        let transient_count = resources.iter().filter(|r| r.is_transient()).count();
        if transient_count > 0 {
            resources = order.iter().map(|&r| resources[r]).collect();
            for machine in &mut machines {
                machine.reorder_resources(&order);
            }
            for process in &mut processes {
                process.reorder_resources(&order);
            }
            for balance in &mut balances {
                balance.reorder_resources(&order);
            }
        }

        let mut neighborhoods: Vec<Vec<MachineId>> = Vec::new();
        let mut locations: Vec<Vec<MachineId>> = Vec::new();
        for (m, machine) in machines.iter().enumerate() {
            let n = machine.neighborhood().get();
            if neighborhoods.len() <= n {
                neighborhoods.resize_with(n + 1, Vec::new);
            }
            neighborhoods[n].push(MachineId::new(m));

            let l = machine.location().get();
            if locations.len() <= l {
                locations.resize_with(l + 1, Vec::new);
            }
            locations[l].push(MachineId::new(m));
        }

        for (p, process) in processes.iter().enumerate() {
            services[process.service().get()].push_process(ProcessId::new(p));
        }

        for s in 0..services.len() {
            let deps = services[s].depends_on().to_vec();
            for d in deps {
                services[d.get()].push_required_by(ServiceId::new(s));
            }
        }

        let initial_assignment = processes.iter().map(|p| p.original_machine()).collect();

        let mut processes_by_size: Vec<ProcessId> =
            (0..processes.len()).map(ProcessId::new).collect();
        processes_by_size.sort_by_key(|&p| processes[p.get()].total_requirement());

        let mut machines_by_size: Vec<MachineId> =
            (0..machines.len()).map(MachineId::new).collect();
        machines_by_size.sort_by_key(|&m| {
            (0..resources.len())
                .map(|r| machines[m.get()].safety_capacity(ResourceId::new(r)))
                .sum::<i64>()
        });

        Ok(Self {
            resources,
            transient_count,
            machines,
            neighborhoods,
            locations,
            services,
            processes,
            balances,
            weight_process_move,
            weight_service_move,
            weight_machine_move,
            initial_assignment,
            processes_by_size,
            machines_by_size,
        })
    }

    #[inline]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    #[inline]
    pub fn resource(&self, r: ResourceId) -> &Resource {
        &self.resources[r.get()]
    }

    #[inline]
    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    #[inline]
    pub fn iter_resources(&self) -> impl Iterator<Item = ResourceId> {
        (0..self.resources.len()).map(ResourceId::new)
    }

    /// Length of the transient prefix of the resource order.
    #[inline]
    pub fn transient_count(&self) -> usize {
        self.transient_count
    }

    #[inline]
    pub fn has_transient_resources(&self) -> bool {
        self.transient_count > 0
    }

    #[inline]
    pub fn iter_transient_resources(&self) -> impl Iterator<Item = ResourceId> {
        (0..self.transient_count).map(ResourceId::new)
    }

    #[inline]
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    #[inline]
    pub fn machine(&self, m: MachineId) -> &Machine {
        &self.machines[m.get()]
    }

    #[inline]
    pub fn num_machines(&self) -> usize {
        self.machines.len()
    }

    #[inline]
    pub fn iter_machines(&self) -> impl Iterator<Item = MachineId> {
        (0..self.machines.len()).map(MachineId::new)
    }

    #[inline]
    pub fn neighborhood_machines(&self, n: NeighborhoodId) -> &[MachineId] {
        &self.neighborhoods[n.get()]
    }

    #[inline]
    pub fn num_neighborhoods(&self) -> usize {
        self.neighborhoods.len()
    }

    #[inline]
    pub fn location_machines(&self, l: LocationId) -> &[MachineId] {
        &self.locations[l.get()]
    }

    #[inline]
    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    #[inline]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    #[inline]
    pub fn service(&self, s: ServiceId) -> &Service {
        &self.services[s.get()]
    }

    #[inline]
    pub fn num_services(&self) -> usize {
        self.services.len()
    }

    #[inline]
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    #[inline]
    pub fn process(&self, p: ProcessId) -> &Process {
        &self.processes[p.get()]
    }

    #[inline]
    pub fn num_processes(&self) -> usize {
        self.processes.len()
    }

    #[inline]
    pub fn iter_processes(&self) -> impl Iterator<Item = ProcessId> {
        (0..self.processes.len()).map(ProcessId::new)
    }

    #[inline]
    pub fn balances(&self) -> &[Balance] {
        &self.balances
    }

    #[inline]
    pub fn balance(&self, b: BalanceId) -> &Balance {
        &self.balances[b.get()]
    }

    #[inline]
    pub fn num_balances(&self) -> usize {
        self.balances.len()
    }

    #[inline]
    pub fn iter_balances(&self) -> impl Iterator<Item = BalanceId> {
        (0..self.balances.len()).map(BalanceId::new)
    }

    #[inline]
    pub fn weight_process_move(&self) -> Cost {
        self.weight_process_move
    }

    #[inline]
    pub fn weight_service_move(&self) -> Cost {
        self.weight_service_move
    }

    #[inline]
    pub fn weight_machine_move(&self) -> Cost {
        self.weight_machine_move
    }

    #[inline]
    pub fn initial_assignment(&self) -> &[MachineId] {
        &self.initial_assignment
    }

    /// Process ids ordered by ascending total requirement.
    #[inline]
    pub fn processes_by_size(&self) -> &[ProcessId] {
        &self.processes_by_size
    }

    /// Machine ids ordered by ascending total safety capacity.
    #[inline]
    pub fn machines_by_size(&self) -> &[MachineId] {
        &self.machines_by_size
    }

    /// Cost of relocating `p` from its original machine to `target`.
    #[inline]
    pub fn machine_move_cost(&self, p: ProcessId, target: MachineId) -> Cost {
        self.machine(self.process(p).original_machine())
            .move_cost_to(target)
    }
}

fn transient_first_order(resources: &[Resource]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..resources.len())
        .filter(|&r| resources[r].is_transient())
        .collect();
    order.extend((0..resources.len()).filter(|&r| !resources[r].is_transient()));
    order
}

fn validate(
    resources: &[Resource],
    machines: &[Machine],
    services: &[Service],
    processes: &[Process],
    balances: &[Balance],
) -> Result<(), InstanceError> {
    let num_resources = resources.len();
    let num_machines = machines.len();

    for machine in machines {
        if machine.resource_count() != num_resources {
            return Err(
                ResourceVectorLengthError::new(num_resources, machine.resource_count()).into(),
            );
        }
    }

    for (s, service) in services.iter().enumerate() {
        for &d in service.depends_on() {
            if d.get() >= services.len() {
                return Err(DependencyNotFoundError::new(ServiceId::new(s), d).into());
            }
        }
    }

    for (p, process) in processes.iter().enumerate() {
        if process.requirements().len() != num_resources {
            return Err(ResourceVectorLengthError::new(
                num_resources,
                process.requirements().len(),
            )
            .into());
        }
        if process.service().get() >= services.len() {
            return Err(ServiceNotFoundError::new(ProcessId::new(p), process.service()).into());
        }
        if process.original_machine().get() >= num_machines {
            return Err(
                MachineNotFoundError::new(ProcessId::new(p), process.original_machine()).into(),
            );
        }
    }

    for (b, balance) in balances.iter().enumerate() {
        if balance.resource1().get() >= num_resources || balance.resource2().get() >= num_resources
        {
            return Err(BalanceResourceError::new(BalanceId::new(b)).into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::builder::InstanceBuilder;

    fn two_machine_instance() -> Instance {
        InstanceBuilder::new()
            .resource(false, 10)
            .resource(true, 100)
            .machine(0, 0, vec![100, 50], vec![80, 40], vec![0, 1])
            .machine(0, 1, vec![100, 50], vec![80, 40], vec![1, 0])
            .service(1, vec![])
            .process(0, vec![10, 5], 3)
            .process(0, vec![20, 6], 4)
            .weights(1, 10, 100)
            .build(vec![0, 1])
            .unwrap()
    }

    #[test]
    fn test_transient_resources_move_to_prefix() {
        let instance = two_machine_instance();
        assert_eq!(instance.transient_count(), 1);
        assert!(instance.resource(ResourceId::new(0)).is_transient());
        assert!(!instance.resource(ResourceId::new(1)).is_transient());
        // Weights follow the reorder.
        assert_eq!(instance.resource(ResourceId::new(0)).weight_load_cost(), 100);
        assert_eq!(instance.resource(ResourceId::new(1)).weight_load_cost(), 10);
        // Machine and process vectors follow too.
        let m0 = instance.machine(MachineId::new(0));
        assert_eq!(m0.capacity(ResourceId::new(0)), 50);
        assert_eq!(m0.capacity(ResourceId::new(1)), 100);
        let p1 = instance.process(ProcessId::new(1));
        assert_eq!(p1.requirement(ResourceId::new(0)), 6);
        assert_eq!(p1.requirement(ResourceId::new(1)), 20);
    }

    #[test]
    fn test_service_membership_and_dependency_inverse() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![100], vec![50], vec![0])
            .service(1, vec![1])
            .service(1, vec![])
            .process(0, vec![1], 0)
            .process(1, vec![1], 0)
            .weights(1, 1, 1)
            .build(vec![0, 0])
            .unwrap();

        assert_eq!(
            instance.service(ServiceId::new(0)).processes(),
            &[ProcessId::new(0)]
        );
        assert_eq!(
            instance.service(ServiceId::new(1)).required_by(),
            &[ServiceId::new(0)]
        );
    }

    #[test]
    fn test_by_size_orders() {
        let instance = two_machine_instance();
        // Process 0 demands 15 total, process 1 demands 26.
        assert_eq!(
            instance.processes_by_size(),
            &[ProcessId::new(0), ProcessId::new(1)]
        );
        assert_eq!(instance.machines_by_size().len(), 2);
    }

    #[test]
    fn test_neighborhood_and_location_lists() {
        let instance = two_machine_instance();
        assert_eq!(instance.num_neighborhoods(), 1);
        assert_eq!(
            instance.neighborhood_machines(NeighborhoodId::new(0)),
            &[MachineId::new(0), MachineId::new(1)]
        );
        assert_eq!(instance.num_locations(), 2);
        assert_eq!(
            instance.location_machines(LocationId::new(1)),
            &[MachineId::new(1)]
        );
    }

    #[test]
    fn test_unknown_service_is_rejected() {
        let err = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![5], vec![0])
            .process(7, vec![1], 0)
            .weights(1, 1, 1)
            .build(vec![0])
            .unwrap_err();
        assert!(matches!(err, InstanceError::ServiceNotFound(_)));
    }

    #[test]
    fn test_assignment_length_mismatch_is_rejected() {
        let err = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![5], vec![0])
            .service(1, vec![])
            .process(0, vec![1], 0)
            .weights(1, 1, 1)
            .build(vec![0, 0])
            .unwrap_err();
        assert!(matches!(err, InstanceError::AssignmentLength(_)));
    }
}
