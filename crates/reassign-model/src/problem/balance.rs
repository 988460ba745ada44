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

use crate::common::ResourceId;
use reassign_core::prelude::Cost;

/// Balance objective: keep `target` units of available resource 1 per unit
/// of available resource 2 on every machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Balance {
    resource1: ResourceId,
    resource2: ResourceId,
    target: i64,
    weight: Cost,
}

impl Balance {
    #[inline]
    pub fn new(resource1: ResourceId, resource2: ResourceId, target: i64, weight: Cost) -> Self {
        Self {
            resource1,
            resource2,
            target,
            weight,
        }
    }

    #[inline]
    pub fn resource1(&self) -> ResourceId {
        self.resource1
    }

    #[inline]
    pub fn resource2(&self) -> ResourceId {
        self.resource2
    }

    #[inline]
    pub fn target(&self) -> i64 {
        self.target
    }

    #[inline]
    pub fn weight(&self) -> Cost {
        self.weight
    }

    pub(crate) fn reorder_resources(&mut self, order: &[usize]) {
        let position = |r: ResourceId| {
            order
                .iter()
                .position(|&o| o == r.get())
                .map(ResourceId::new)
                .unwrap_or(r)
        };
        self.resource1 = position(self.resource1);
        self.resource2 = position(self.resource2);
    }
}
