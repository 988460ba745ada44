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

use crate::common::{ProcessId, ServiceId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    min_spread: usize,
    depends_on: Vec<ServiceId>,
    /// Depth-1 inverse of `depends_on`, filled during instance construction.
    required_by: Vec<ServiceId>,
    /// Member processes, filled during instance construction.
    processes: Vec<ProcessId>,
}

impl Service {
    #[inline]
    pub fn new(min_spread: usize, depends_on: Vec<ServiceId>) -> Self {
        Self {
            min_spread,
            depends_on,
            required_by: Vec::new(),
            processes: Vec::new(),
        }
    }

    #[inline]
    pub fn min_spread(&self) -> usize {
        self.min_spread
    }

    #[inline]
    pub fn depends_on(&self) -> &[ServiceId] {
        &self.depends_on
    }

    #[inline]
    pub fn required_by(&self) -> &[ServiceId] {
        &self.required_by
    }

    #[inline]
    pub fn processes(&self) -> &[ProcessId] {
        &self.processes
    }

    pub(crate) fn push_required_by(&mut self, dependent: ServiceId) {
        self.required_by.push(dependent);
    }

    pub(crate) fn push_process(&mut self, process: ProcessId) {
        self.processes.push(process);
    }
}
