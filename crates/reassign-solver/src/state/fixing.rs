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

use reassign_model::common::ProcessId;
use reassign_model::problem::Instance;

/// Worker-local set of processes pinned to their original machine during
/// the opening phase of the search.
///
/// Transient-heavy processes are expensive to move twice (their load stays
/// claimed on the original machine), so they are fixed early and released
/// after the opening phase. Strategies draw candidates from
/// `movable_by_size` only.
#[derive(Debug, Clone)]
pub struct ProcessFixing {
    fixed: Vec<bool>,
    movable_by_size: Vec<ProcessId>,
}

impl ProcessFixing {
    pub fn new(instance: &Instance) -> Self {
        Self {
            fixed: vec![false; instance.num_processes()],
            movable_by_size: instance.processes_by_size().to_vec(),
        }
    }

    #[inline]
    pub fn is_fixed(&self, p: ProcessId) -> bool {
        self.fixed[p.get()]
    }

    /// Movable process ids in ascending total-requirement order.
    #[inline]
    pub fn movable_by_size(&self) -> &[ProcessId] {
        &self.movable_by_size
    }

    #[inline]
    pub fn num_movable(&self) -> usize {
        self.movable_by_size.len()
    }

    #[inline]
    pub fn num_fixed(&self) -> usize {
        self.fixed.iter().filter(|&&f| f).count()
    }

    /// Release every fixed process. Idempotent.
    pub fn reset(&mut self, instance: &Instance) {
        self.fixed.fill(false);
        self.movable_by_size.clear();
        self.movable_by_size
            .extend_from_slice(instance.processes_by_size());
    }

    /// Greedily fix the most transient-heavy processes while each original
    /// machine's fixed usage stays within `safety * safety_capacity` for
    /// every resource.
    pub fn fix_transient(&mut self, instance: &Instance, safety: f64) {
        self.reset(instance);

        if !instance.has_transient_resources() {
            return;
        }

        let num_resources = instance.num_resources();
        let mut buffer = vec![0_i64; num_resources];
        for r in instance.iter_resources() {
            let capacity: i64 = instance
                .iter_machines()
                .map(|m| instance.machine(m).capacity(r))
                .sum();
            let used: i64 = instance
                .processes()
                .iter()
                .map(|p| p.requirements()[r.get()])
                .sum();
            buffer[r.get()] = (capacity - used).max(1);
        }

        // Usage relative to the global buffer of transient resources.
        let mut usage: Vec<(ProcessId, f64)> = instance
            .iter_processes()
            .map(|p| {
                let score = instance
                    .iter_transient_resources()
                    .map(|r| instance.process(p).requirement(r) as f64 / buffer[r.get()] as f64)
                    .sum();
                (p, score)
            })
            .collect();
        usage.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut fixed_usage =
            vec![vec![0_i64; num_resources]; instance.num_machines()];

        for (p, _) in usage {
            let process = instance.process(p);
            let m = process.original_machine();
            let has_space = instance.iter_resources().all(|r| {
                (fixed_usage[m.get()][r.get()] + process.requirement(r)) as f64
                    <= safety * instance.machine(m).safety_capacity(r) as f64
            });
            if has_space {
                self.fixed[p.get()] = true;
                for r in instance.iter_resources() {
                    fixed_usage[m.get()][r.get()] += process.requirement(r);
                }
            }
        }

        self.movable_by_size.clear();
        for &p in instance.processes_by_size() {
            if !self.fixed[p.get()] {
                self.movable_by_size.push(p);
            }
        }

        tracing::debug!(
            fixed = self.num_fixed(),
            total = instance.num_processes(),
            "fixed transient-heavy processes"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reassign_model::prelude::InstanceBuilder;

    fn transient_instance() -> Instance {
        InstanceBuilder::new()
            .resource(true, 1)
            .machine(0, 0, vec![100], vec![50], vec![0, 0])
            .machine(0, 0, vec![100], vec![50], vec![0, 0])
            .service(1, vec![])
            .service(1, vec![])
            .service(1, vec![])
            .process(0, vec![40], 1)
            .process(1, vec![30], 1)
            .process(2, vec![5], 1)
            .weights(1, 1, 1)
            .build(vec![0, 0, 1])
            .unwrap()
    }

    #[test]
    fn test_fix_transient_respects_safety_budget() {
        let instance = transient_instance();
        let mut fixing = ProcessFixing::new(&instance);
        fixing.fix_transient(&instance, 0.9);

        // Budget on machine 0 is 45: process 0 (40) fits, process 1 (30)
        // does not on top of it; process 2 (5) fits on top on machine 1.
        assert!(fixing.is_fixed(ProcessId::new(0)));
        assert!(!fixing.is_fixed(ProcessId::new(1)));
        assert!(fixing.is_fixed(ProcessId::new(2)));
        assert_eq!(fixing.num_movable(), 1);
        assert_eq!(fixing.movable_by_size(), &[ProcessId::new(1)]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let instance = transient_instance();
        let mut fixing = ProcessFixing::new(&instance);
        fixing.fix_transient(&instance, 0.9);
        assert!(fixing.num_fixed() > 0);

        fixing.reset(&instance);
        let after_one = fixing.clone();
        fixing.reset(&instance);
        assert_eq!(fixing.fixed, after_one.fixed);
        assert_eq!(fixing.movable_by_size, after_one.movable_by_size);
        assert_eq!(fixing.num_movable(), instance.num_processes());
    }

    #[test]
    fn test_no_transient_resources_fixes_nothing() {
        let instance = InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![10], vec![0])
            .service(1, vec![])
            .process(0, vec![1], 1)
            .weights(1, 1, 1)
            .build(vec![0])
            .unwrap();
        let mut fixing = ProcessFixing::new(&instance);
        fixing.fix_transient(&instance, 0.9);
        assert_eq!(fixing.num_fixed(), 0);
    }
}
