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

use super::shared_incumbent::SharedIncumbent;
use crate::search::{SearchContext, Strategy, run_strategy};
use crate::state::{ProcessFixing, ReAssignment};
use reassign_model::problem::Instance;
use std::time::{Duration, Instant};

/// Seconds after which the fixing worker releases its fixed processes.
const FIXING_RELEASE_AFTER: Duration = Duration::from_secs(45);
/// Every how many global improvements the best is persisted.
const PERSIST_EVERY: u64 = 5;

/// One strategy with its activity window within the run.
pub struct ScheduleEntry {
    pub strategy: Box<dyn Strategy + Send>,
    /// Elapsed time after which the strategy becomes active.
    pub earliest_start: Duration,
    /// Elapsed time after which it is no longer started, if any.
    pub latest_start: Option<Duration>,
    /// Length of one strategy window.
    pub duration: Duration,
}

/// Callback persisting an improved state (written every 5th improvement).
pub type PersistFn<'e> = dyn Fn(&ReAssignment) + Send + Sync + 'e;

/// A worker rotates through its schedule, adopting the global best before
/// each window and publishing every improvement it finds. All search
/// state, including process fixing, is owned by the worker; the shared
/// incumbent is the only cross-thread state.
pub struct SearchWorker<'e, 'p> {
    id: usize,
    instance: &'p Instance,
    incumbent: &'e SharedIncumbent,
    entries: Vec<ScheduleEntry>,
    local_best: ReAssignment,
    fixing: ProcessFixing,
    manage_fixing: bool,
    start: Instant,
    deadline: Instant,
    persist: Option<&'e PersistFn<'e>>,
}

impl<'e, 'p> SearchWorker<'e, 'p> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        instance: &'p Instance,
        incumbent: &'e SharedIncumbent,
        entries: Vec<ScheduleEntry>,
        local_best: ReAssignment,
        manage_fixing: bool,
        start: Instant,
        deadline: Instant,
        persist: Option<&'e PersistFn<'e>>,
    ) -> Self {
        Self {
            id,
            instance,
            incumbent,
            entries,
            local_best,
            fixing: ProcessFixing::new(instance),
            manage_fixing,
            start,
            deadline,
            persist,
        }
    }

    pub fn run(mut self) {
        if self.manage_fixing {
            let safety = if self.instance.num_processes() > 3000 {
                0.9
            } else {
                0.8
            };
            self.fixing.fix_transient(self.instance, safety);
        }

        tracing::debug!(worker = self.id, "worker started");

        while Instant::now() < self.deadline {
            for i in 0..self.entries.len() {
                let now = Instant::now();
                if now >= self.deadline {
                    break;
                }

                let elapsed = now - self.start;
                if elapsed < self.entries[i].earliest_start {
                    continue;
                }
                if let Some(latest) = self.entries[i].latest_start
                    && elapsed > latest
                {
                    continue;
                }

                // Adopt a better global best before searching.
                if self.incumbent.peek_cost() < self.local_best.total_cost() {
                    self.local_best = self.incumbent.snapshot();
                }

                let window_end = (now + self.entries[i].duration).min(self.deadline);
                let ctx = SearchContext {
                    instance: self.instance,
                    fixing: &self.fixing,
                    deadline: window_end,
                };

                if let Some(improved) =
                    run_strategy(self.entries[i].strategy.as_mut(), &ctx, &self.local_best)
                {
                    if let Some(version) = self.incumbent.try_update(&improved)
                        && version.is_multiple_of(PERSIST_EVERY)
                        && let Some(persist) = self.persist
                    {
                        persist(&improved);
                    }
                    self.local_best = improved;
                }

                if self.manage_fixing && self.start.elapsed() >= FIXING_RELEASE_AFTER {
                    self.manage_fixing = false;
                    self.fixing.reset(self.instance);
                    tracing::debug!(worker = self.id, "released fixed processes");
                }
            }
        }

        tracing::debug!(
            worker = self.id,
            best = self.local_best.total_cost(),
            "worker finished"
        );
    }
}
