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

mod report;

use clap::Parser;
use reassign_model::prelude::InstanceLoader;
use reassign_model::solution::{read_assignment_from_path, write_assignment, write_assignment_to_path};
use reassign_solver::engine::{Solver, SolverParams};
use reassign_solver::state::ReAssignment;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TEAM_IDENTIFIER: &str = "J25";

#[derive(Debug, Parser)]
#[command(
    name = "machine-reassign",
    about = "Machine reassignment solver (ROADEF/EURO 2012)"
)]
struct Args {
    /// Total wall-clock budget in seconds.
    #[arg(short = 't', long = "time-limit", default_value_t = 300)]
    time_limit: u64,

    /// Problem instance file.
    #[arg(short = 'p', long = "problem")]
    problem: Option<PathBuf>,

    /// Initial assignment file.
    #[arg(short = 'i', long = "initial")]
    initial: Option<PathBuf>,

    /// Output file for the best assignment (stdout when omitted).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Random seed.
    #[arg(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,

    /// Print the team identifier and exit.
    #[arg(short = 'n', long = "name")]
    name: bool,

    /// Write an HTML machine-load chart to stdout instead of solving.
    #[arg(short = 'c', long = "chart")]
    chart: bool,

    /// Write the service dependency graph to stdout instead of solving.
    #[arg(short = 'd', long = "dependency-graph")]
    dependency_graph: bool,

    /// Current assignment to chart (defaults to the initial assignment).
    #[arg(short = 'j', long = "current")]
    current: Option<PathBuf>,

    /// Neighborhood size hint for the random strategies.
    #[arg(short = 'r', long = "neighborhood")]
    neighborhood: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version requests are not configuration errors.
            if err.use_stderr() {
                eprintln!("{err}");
                std::process::exit(1);
            }
            err.exit();
        }
    };

    if let Err(message) = run(args) {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    if args.name {
        println!("{TEAM_IDENTIFIER}");
        return Ok(());
    }

    let Some(problem) = args.problem.as_deref() else {
        return Err("instance file not given".into());
    };
    let Some(initial) = args.initial.as_deref() else {
        return Err("assignment file not given".into());
    };

    let instance = InstanceLoader::new()
        .from_paths(problem, initial)
        .map_err(|e| format!("could not load {}: {e}", problem.display()))?;

    if args.chart {
        let current = match args.current.as_deref() {
            Some(path) => read_assignment_from_path(path)
                .map_err(|e| format!("could not read {}: {e}", path.display()))?,
            None => instance.initial_assignment().to_vec(),
        };
        let mut stdout = std::io::stdout().lock();
        return report::write_chart(&mut stdout, &instance, &current)
            .map_err(|e| format!("could not write chart: {e}"));
    }

    if args.dependency_graph {
        let mut stdout = std::io::stdout().lock();
        return report::write_dependency_graph(&mut stdout, &instance)
            .map_err(|e| format!("could not write dependency graph: {e}"));
    }

    let params = SolverParams {
        time_budget: Duration::from_secs(args.time_limit),
        seed: args.seed,
        ..SolverParams::default()
    }
    .with_neighborhood_hint(args.neighborhood);

    let output = args.output.clone();
    let persist = move |state: &ReAssignment| {
        if let Some(path) = &output
            && let Err(e) = write_assignment_to_path(path, state.assignment())
        {
            tracing::warn!("could not persist intermediate solution: {e}");
        }
    };

    let best = Solver::new(&instance, params).with_persist(&persist).solve();

    tracing::info!(
        load = best.load_cost(),
        balance = best.balance_cost(),
        process_moves = best.process_moves(),
        machine_moves = best.machine_moves(),
        total = best.total_cost(),
        "final result"
    );

    match args.output.as_deref() {
        Some(path) => write_assignment_to_path(path, best.assignment())
            .map_err(|e| format!("could not write {}: {e}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            write_assignment(&mut stdout, best.assignment())
                .map_err(|e| format!("could not write solution: {e}"))
        }
    }
}
