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

use crate::common::{MachineId, ResourceId, ServiceId};
use reassign_core::prelude::Cost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    service: ServiceId,
    requirement: Vec<i64>,
    move_cost: Cost,
    /// Machine of the initial assignment; transient load stays claimed here.
    original_machine: MachineId,
}

impl Process {
    #[inline]
    pub fn new(
        service: ServiceId,
        requirement: Vec<i64>,
        move_cost: Cost,
        original_machine: MachineId,
    ) -> Self {
        Self {
            service,
            requirement,
            move_cost,
            original_machine,
        }
    }

    #[inline]
    pub fn service(&self) -> ServiceId {
        self.service
    }

    #[inline]
    pub fn requirement(&self, r: ResourceId) -> i64 {
        self.requirement[r.get()]
    }

    #[inline]
    pub fn requirements(&self) -> &[i64] {
        &self.requirement
    }

    #[inline]
    pub fn total_requirement(&self) -> i64 {
        self.requirement.iter().sum()
    }

    #[inline]
    pub fn move_cost(&self) -> Cost {
        self.move_cost
    }

    #[inline]
    pub fn original_machine(&self) -> MachineId {
        self.original_machine
    }

    pub(crate) fn reorder_resources(&mut self, order: &[usize]) {
        self.requirement = order.iter().map(|&r| self.requirement[r]).collect();
    }
}
