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

//! The neighborhood-restricted CP subproblem: decision variables over
//! machines, speculative per-machine patches, the memoised cost cache,
//! specialised propagators, the best-cost brancher, and the depth-first
//! branch-and-bound loop. Spaces are cloned on branching; a clone shares
//! nothing mutable with its parent.

pub mod assign;
pub mod brancher;
pub mod core;
pub mod cost;
pub mod cost_cache;
pub mod dfs;
pub mod objective;
pub mod patch;
pub mod service;
pub mod space;
pub mod var;

pub use dfs::solve_dfs;
pub use space::RescheduleSpace;

/// Marker for a failed space: a constraint cannot be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infeasible;
