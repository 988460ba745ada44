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

use crate::common::{LocationId, MachineId, NeighborhoodId, ResourceId};
use reassign_core::prelude::Cost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    neighborhood: NeighborhoodId,
    location: LocationId,
    capacity: Vec<i64>,
    safety_capacity: Vec<i64>,
    /// Cost of relocating a process from this machine to each target machine.
    move_cost: Vec<Cost>,
}

impl Machine {
    #[inline]
    pub fn new(
        neighborhood: NeighborhoodId,
        location: LocationId,
        capacity: Vec<i64>,
        safety_capacity: Vec<i64>,
        move_cost: Vec<Cost>,
    ) -> Self {
        Self {
            neighborhood,
            location,
            capacity,
            safety_capacity,
            move_cost,
        }
    }

    #[inline]
    pub fn neighborhood(&self) -> NeighborhoodId {
        self.neighborhood
    }

    #[inline]
    pub fn location(&self) -> LocationId {
        self.location
    }

    #[inline]
    pub fn capacity(&self, r: ResourceId) -> i64 {
        self.capacity[r.get()]
    }

    #[inline]
    pub fn safety_capacity(&self, r: ResourceId) -> i64 {
        self.safety_capacity[r.get()]
    }

    /// Hard headroom above the safety capacity.
    #[inline]
    pub fn safety_gap(&self, r: ResourceId) -> i64 {
        self.capacity[r.get()] - self.safety_capacity[r.get()]
    }

    #[inline]
    pub fn move_cost_to(&self, target: MachineId) -> Cost {
        self.move_cost[target.get()]
    }

    #[inline]
    pub fn resource_count(&self) -> usize {
        self.capacity.len()
    }

    pub(crate) fn reorder_resources(&mut self, order: &[usize]) {
        self.capacity = order.iter().map(|&r| self.capacity[r]).collect();
        self.safety_capacity = order.iter().map(|&r| self.safety_capacity[r]).collect();
    }
}
