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

use crate::common::{BalanceId, MachineId, ProcessId, ServiceId};
use reassign_core::scan::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineNotFoundError {
    process: ProcessId,
    machine: MachineId,
}

impl MachineNotFoundError {
    pub fn new(process: ProcessId, machine: MachineId) -> Self {
        Self { process, machine }
    }

    pub fn process(&self) -> ProcessId {
        self.process
    }

    pub fn machine(&self) -> MachineId {
        self.machine
    }
}

impl std::fmt::Display for MachineNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is assigned to unknown {}",
            self.process, self.machine
        )
    }
}

impl std::error::Error for MachineNotFoundError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceNotFoundError {
    process: ProcessId,
    service: ServiceId,
}

impl ServiceNotFoundError {
    pub fn new(process: ProcessId, service: ServiceId) -> Self {
        Self { process, service }
    }

    pub fn process(&self) -> ProcessId {
        self.process
    }

    pub fn service(&self) -> ServiceId {
        self.service
    }
}

impl std::fmt::Display for ServiceNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} belongs to unknown {}", self.process, self.service)
    }
}

impl std::error::Error for ServiceNotFoundError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyNotFoundError {
    service: ServiceId,
    dependency: ServiceId,
}

impl DependencyNotFoundError {
    pub fn new(service: ServiceId, dependency: ServiceId) -> Self {
        Self {
            service,
            dependency,
        }
    }

    pub fn service(&self) -> ServiceId {
        self.service
    }

    pub fn dependency(&self) -> ServiceId {
        self.dependency
    }
}

impl std::fmt::Display for DependencyNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} depends on unknown {}", self.service, self.dependency)
    }
}

impl std::error::Error for DependencyNotFoundError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceVectorLengthError {
    expected: usize,
    actual: usize,
}

impl ResourceVectorLengthError {
    pub fn new(expected: usize, actual: usize) -> Self {
        Self { expected, actual }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn actual(&self) -> usize {
        self.actual
    }
}

impl std::fmt::Display for ResourceVectorLengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "per-resource vector has length {}, expected {}",
            self.actual, self.expected
        )
    }
}

impl std::error::Error for ResourceVectorLengthError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceResourceError {
    balance: BalanceId,
}

impl BalanceResourceError {
    pub fn new(balance: BalanceId) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> BalanceId {
        self.balance
    }
}

impl std::fmt::Display for BalanceResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} references an unknown resource", self.balance)
    }
}

impl std::error::Error for BalanceResourceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssignmentLengthError {
    expected: usize,
    actual: usize,
}

impl AssignmentLengthError {
    pub fn new(expected: usize, actual: usize) -> Self {
        Self { expected, actual }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn actual(&self) -> usize {
        self.actual
    }
}

impl std::fmt::Display for AssignmentLengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "assignment lists {} machines for {} processes",
            self.actual, self.expected
        )
    }
}

impl std::error::Error for AssignmentLengthError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    MachineNotFound(MachineNotFoundError),
    ServiceNotFound(ServiceNotFoundError),
    DependencyNotFound(DependencyNotFoundError),
    ResourceVectorLength(ResourceVectorLengthError),
    BalanceResource(BalanceResourceError),
    AssignmentLength(AssignmentLengthError),
}

impl std::fmt::Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceError::MachineNotFound(e) => write!(f, "{}", e),
            InstanceError::ServiceNotFound(e) => write!(f, "{}", e),
            InstanceError::DependencyNotFound(e) => write!(f, "{}", e),
            InstanceError::ResourceVectorLength(e) => write!(f, "{}", e),
            InstanceError::BalanceResource(e) => write!(f, "{}", e),
            InstanceError::AssignmentLength(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InstanceError {}

impl From<MachineNotFoundError> for InstanceError {
    fn from(err: MachineNotFoundError) -> Self {
        InstanceError::MachineNotFound(err)
    }
}

impl From<ServiceNotFoundError> for InstanceError {
    fn from(err: ServiceNotFoundError) -> Self {
        InstanceError::ServiceNotFound(err)
    }
}

impl From<DependencyNotFoundError> for InstanceError {
    fn from(err: DependencyNotFoundError) -> Self {
        InstanceError::DependencyNotFound(err)
    }
}

impl From<ResourceVectorLengthError> for InstanceError {
    fn from(err: ResourceVectorLengthError) -> Self {
        InstanceError::ResourceVectorLength(err)
    }
}

impl From<BalanceResourceError> for InstanceError {
    fn from(err: BalanceResourceError) -> Self {
        InstanceError::BalanceResource(err)
    }
}

impl From<AssignmentLengthError> for InstanceError {
    fn from(err: AssignmentLengthError) -> Self {
        InstanceError::AssignmentLength(err)
    }
}

#[derive(Debug)]
pub enum InstanceLoadError {
    Io(std::io::Error),
    Scan(ScanError),
    Instance(InstanceError),
}

impl From<std::io::Error> for InstanceLoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ScanError> for InstanceLoadError {
    fn from(e: ScanError) -> Self {
        Self::Scan(e)
    }
}

impl From<InstanceError> for InstanceLoadError {
    fn from(e: InstanceError) -> Self {
        Self::Instance(e)
    }
}

impl std::fmt::Display for InstanceLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceLoadError::Io(e) => write!(f, "I/O error: {e}"),
            InstanceLoadError::Scan(e) => write!(f, "malformed instance file: {e}"),
            InstanceLoadError::Instance(e) => write!(f, "inconsistent instance: {e}"),
        }
    }
}

impl std::error::Error for InstanceLoadError {}
