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

use crate::state::ReAssignment;
use parking_lot::Mutex;
use reassign_core::prelude::Cost;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// The global best state, shared by the workers.
///
/// One mutex guards the state; the cost is mirrored in an atomic so the
/// hot path can pre-check without locking. Successful installs carry a
/// monotonically increasing version, and installed costs are strictly
/// decreasing.
#[derive(Debug)]
pub struct SharedIncumbent {
    best: Mutex<ReAssignment>,
    best_cost: AtomicI64,
    version: AtomicU64,
}

impl SharedIncumbent {
    pub fn new(initial: ReAssignment) -> Self {
        Self {
            best_cost: AtomicI64::new(initial.total_cost()),
            best: Mutex::new(initial),
            version: AtomicU64::new(0),
        }
    }

    /// Best-known cost without locking.
    #[inline]
    pub fn peek_cost(&self) -> Cost {
        self.best_cost.load(Ordering::Acquire)
    }

    /// Number of installs so far.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Deep copy of the current best.
    pub fn snapshot(&self) -> ReAssignment {
        self.best.lock().clone()
    }

    /// Install `candidate` if it strictly beats the incumbent. Returns
    /// the new version on success.
    pub fn try_update(&self, candidate: &ReAssignment) -> Option<u64> {
        let candidate_cost = candidate.total_cost();

        // Race-tolerant pre-check; the lock below decides.
        if candidate_cost >= self.peek_cost() {
            return None;
        }

        let mut guard = self.best.lock();
        if candidate_cost >= guard.total_cost() {
            return None;
        }

        *guard = candidate.clone();
        self.best_cost.store(candidate_cost, Ordering::Release);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;

        tracing::info!(cost = candidate_cost, version, "new global best");
        Some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reassign_model::common::MachineId;
    use reassign_model::prelude::InstanceBuilder;
    use reassign_model::problem::Instance;

    fn instance() -> Instance {
        InstanceBuilder::new()
            .resource(false, 1)
            .machine(0, 0, vec![10], vec![2], vec![0, 0])
            .machine(0, 0, vec![10], vec![2], vec![0, 0])
            .service(1, vec![])
            .service(1, vec![])
            .process(0, vec![4], 0)
            .process(1, vec![4], 0)
            .weights(0, 0, 0)
            .build(vec![0, 0])
            .unwrap()
    }

    #[test]
    fn test_install_requires_strict_improvement() {
        let instance = instance();
        let initial = ReAssignment::from_initial(&instance);
        let incumbent = SharedIncumbent::new(initial.clone());
        assert_eq!(incumbent.peek_cost(), 6);
        assert_eq!(incumbent.version(), 0);

        // Same cost: rejected.
        assert!(incumbent.try_update(&initial).is_none());

        // Strictly better: installed.
        let better = ReAssignment::from_assignment(
            &instance,
            vec![MachineId::new(0), MachineId::new(1)],
        );
        assert_eq!(better.total_cost(), 4);
        assert_eq!(incumbent.try_update(&better), Some(1));
        assert_eq!(incumbent.peek_cost(), 4);
        assert_eq!(incumbent.snapshot().total_cost(), 4);

        // The worse state is rejected again.
        assert!(incumbent.try_update(&initial).is_none());
        assert_eq!(incumbent.version(), 1);
    }
}
