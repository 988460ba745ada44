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
use crate::problem::err::{AssignmentLengthError, InstanceLoadError};
use crate::problem::{Balance, Instance, Machine, Process, Resource, Service};
use crate::solution::read_assignment;
use reassign_core::scan::Scanner;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parser for the whitespace-separated instance format.
///
/// Token order: resources (transient flag, load-cost weight); machines
/// (neighborhood, location, capacities, safety capacities, move-cost row);
/// services (min spread, dependency list); processes (service,
/// requirements, move cost); balance triples; the three scalar weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceLoader;

impl InstanceLoader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    pub fn from_paths(
        &self,
        model: &Path,
        assignment: &Path,
    ) -> Result<Instance, InstanceLoadError> {
        let model_reader = BufReader::new(File::open(model)?);
        let assignment_reader = BufReader::new(File::open(assignment)?);
        self.from_readers(model_reader, assignment_reader)
    }

    pub fn from_readers<M: BufRead, A: BufRead>(
        &self,
        model: M,
        assignment: A,
    ) -> Result<Instance, InstanceLoadError> {
        let assignment = read_assignment(assignment)?;
        self.from_reader_with_assignment(model, &assignment)
    }

    pub fn from_reader_with_assignment<M: BufRead>(
        &self,
        model: M,
        assignment: &[MachineId],
    ) -> Result<Instance, InstanceLoadError> {
        let mut sc = Scanner::new(model);

        let num_resources = sc.next_usize()?;
        let mut resources = Vec::with_capacity(num_resources);
        for _ in 0..num_resources {
            let transient = sc.next_i64()? != 0;
            let weight = sc.next_i64()?;
            resources.push(Resource::new(transient, weight));
        }

        let num_machines = sc.next_usize()?;
        let mut machines = Vec::with_capacity(num_machines);
        for _ in 0..num_machines {
            let neighborhood = NeighborhoodId::new(sc.next_usize()?);
            let location = LocationId::new(sc.next_usize()?);
            let mut capacity = Vec::with_capacity(num_resources);
            for _ in 0..num_resources {
                capacity.push(sc.next_i64()?);
            }
            let mut safety_capacity = Vec::with_capacity(num_resources);
            for _ in 0..num_resources {
                safety_capacity.push(sc.next_i64()?);
            }
            let mut move_cost = Vec::with_capacity(num_machines);
            for _ in 0..num_machines {
                move_cost.push(sc.next_i64()?);
            }
            machines.push(Machine::new(
                neighborhood,
                location,
                capacity,
                safety_capacity,
                move_cost,
            ));
        }

        let num_services = sc.next_usize()?;
        let mut services = Vec::with_capacity(num_services);
        for _ in 0..num_services {
            let min_spread = sc.next_usize()?;
            let num_deps = sc.next_usize()?;
            let mut depends_on = Vec::with_capacity(num_deps);
            for _ in 0..num_deps {
                depends_on.push(ServiceId::new(sc.next_usize()?));
            }
            services.push(Service::new(min_spread, depends_on));
        }

        let num_processes = sc.next_usize()?;
        if assignment.len() != num_processes {
            return Err(InstanceLoadError::Instance(
                AssignmentLengthError::new(num_processes, assignment.len()).into(),
            ));
        }
        let mut processes = Vec::with_capacity(num_processes);
        for p in 0..num_processes {
            let service = ServiceId::new(sc.next_usize()?);
            let mut requirement = Vec::with_capacity(num_resources);
            for _ in 0..num_resources {
                requirement.push(sc.next_i64()?);
            }
            let move_cost = sc.next_i64()?;
            processes.push(Process::new(service, requirement, move_cost, assignment[p]));
        }

        let num_balances = sc.next_usize()?;
        let mut balances = Vec::with_capacity(num_balances);
        for _ in 0..num_balances {
            let resource1 = ResourceId::new(sc.next_usize()?);
            let resource2 = ResourceId::new(sc.next_usize()?);
            let target = sc.next_i64()?;
            let weight = sc.next_i64()?;
            balances.push(Balance::new(resource1, resource2, target, weight));
        }

        let weight_process_move = sc.next_i64()?;
        let weight_service_move = sc.next_i64()?;
        let weight_machine_move = sc.next_i64()?;

        Ok(Instance::new(
            resources,
            machines,
            services,
            processes,
            balances,
            weight_process_move,
            weight_service_move,
            weight_machine_move,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // 2 resources (second transient), 2 machines, 2 services, 3 processes,
    // 1 balance triple, weights 1/10/100.
    const MODEL: &str = "2\n\
        0 100\n\
        1 10\n\
        2\n\
        0 0  8 16  6 12  0 1\n\
        1 1  8 16  6 12  2 0\n\
        2\n\
        2 0\n\
        1 1 0\n\
        3\n\
        0 2 4 1\n\
        0 2 4 2\n\
        1 1 2 3\n\
        1\n\
        0 1 20 50\n\
        1 10 100\n";

    #[test]
    fn test_loads_full_instance() {
        let loader = InstanceLoader::new();
        let instance = loader
            .from_readers(Cursor::new(MODEL), Cursor::new("0 1 0\n"))
            .unwrap();

        assert_eq!(instance.num_resources(), 2);
        assert_eq!(instance.num_machines(), 2);
        assert_eq!(instance.num_services(), 2);
        assert_eq!(instance.num_processes(), 3);
        assert_eq!(instance.num_balances(), 1);
        assert_eq!(instance.weight_process_move(), 1);
        assert_eq!(instance.weight_service_move(), 10);
        assert_eq!(instance.weight_machine_move(), 100);

        // The transient resource (file position 1) is reordered to the front.
        assert_eq!(instance.transient_count(), 1);
        assert!(instance.resource(ResourceId::new(0)).is_transient());
        assert_eq!(instance.resource(ResourceId::new(0)).weight_load_cost(), 10);

        // Machine 1 reads back with reordered capacities.
        let m1 = instance.machine(MachineId::new(1));
        assert_eq!(m1.capacity(ResourceId::new(0)), 16);
        assert_eq!(m1.capacity(ResourceId::new(1)), 8);
        assert_eq!(m1.move_cost_to(MachineId::new(0)), 2);

        // Balance resource ids follow the reorder: r0->1, r1->0.
        let bal = instance.balance(crate::common::BalanceId::new(0));
        assert_eq!(bal.resource1().get(), 1);
        assert_eq!(bal.resource2().get(), 0);

        // Originals come from the assignment file.
        assert_eq!(
            instance.initial_assignment(),
            &[MachineId::new(0), MachineId::new(1), MachineId::new(0)]
        );

        // Service dependency inversion.
        assert_eq!(
            instance.service(ServiceId::new(0)).required_by(),
            &[ServiceId::new(1)]
        );
    }

    #[test]
    fn test_truncated_input_reports_eof() {
        let loader = InstanceLoader::new();
        let err = loader
            .from_readers(Cursor::new("2\n0 100\n"), Cursor::new(""))
            .unwrap_err();
        assert!(matches!(err, InstanceLoadError::Scan(_)));
    }

    #[test]
    fn test_assignment_length_mismatch() {
        let loader = InstanceLoader::new();
        let err = loader
            .from_readers(Cursor::new(MODEL), Cursor::new("0 1\n"))
            .unwrap_err();
        assert!(matches!(err, InstanceLoadError::Instance(_)));
    }
}
