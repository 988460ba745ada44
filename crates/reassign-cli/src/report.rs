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

//! Inspection output: an HTML machine-load table and the service
//! dependency graph in Graphviz form.

use reassign_model::common::{MachineId, ProcessId};
use reassign_model::problem::Instance;
use std::io::Write;

/// Colour ramp from green (idle) over yellow (at safety capacity) to red
/// (at capacity).
fn load_color(load: i64, safety: i64, capacity: i64) -> String {
    if load < safety {
        let value = load * 255 / safety.max(1);
        format!("#{:02x}FF00", value.clamp(0, 255))
    } else {
        let value = 255 - (load - safety) * 255 / (capacity - safety).max(1);
        format!("#FF{:02x}00", value.clamp(0, 255))
    }
}

fn percent(part: i64, whole: i64) -> i64 {
    part * 100 / whole.max(1)
}

/// Machine-load table of `current`, one row per machine with per-resource
/// utilisation relative to capacity (and transient utilisation where the
/// resource is transient).
pub fn write_chart<W: Write>(
    out: &mut W,
    instance: &Instance,
    current: &[MachineId],
) -> std::io::Result<()> {
    let num_resources = instance.num_resources();
    let mut load = vec![vec![0_i64; num_resources]; instance.num_machines()];
    let mut transient = vec![vec![0_i64; instance.transient_count()]; instance.num_machines()];

    for (p, &machine) in current.iter().enumerate() {
        let process = instance.process(ProcessId::new(p));
        for r in instance.iter_resources() {
            load[machine.get()][r.get()] += process.requirement(r);
        }
        for r in instance.iter_transient_resources() {
            transient[machine.get()][r.get()] += process.requirement(r);
            let original = process.original_machine();
            if original != machine {
                transient[original.get()][r.get()] += process.requirement(r);
            }
        }
    }

    writeln!(out, "<html><head><title>machine load</title></head><body>")?;
    writeln!(out, "<table border=\"1\"><thead><tr><th>machine</th><th>load cost</th>")?;
    for r in 0..num_resources {
        writeln!(out, "<th>r{r}</th>")?;
    }
    writeln!(out, "</tr></thead><tbody>")?;

    for m in instance.iter_machines() {
        let machine = instance.machine(m);
        let load_cost: i64 = instance
            .iter_resources()
            .map(|r| {
                (load[m.get()][r.get()] - machine.safety_capacity(r)).max(0)
                    * instance.resource(r).weight_load_cost()
            })
            .sum();

        writeln!(out, "<tr><td>machine {}</td><td>{}</td>", m.get(), load_cost)?;
        for r in instance.iter_resources() {
            let used = load[m.get()][r.get()];
            let color = load_color(used, machine.safety_capacity(r), machine.capacity(r));
            write!(
                out,
                "<td style=\"background: {color};\">{used} ({}%",
                percent(used, machine.capacity(r))
            )?;
            if r.get() < instance.transient_count() {
                write!(
                    out,
                    " | {}%",
                    percent(transient[m.get()][r.get()], machine.capacity(r))
                )?;
            }
            writeln!(out, ")</td>")?;
        }
        writeln!(out, "</tr>")?;
    }

    writeln!(out, "</tbody></table></body></html>")
}

/// Service dependencies as a Graphviz digraph.
pub fn write_dependency_graph<W: Write>(out: &mut W, instance: &Instance) -> std::io::Result<()> {
    writeln!(out, "digraph {{")?;
    for (s, service) in instance.services().iter().enumerate() {
        for d in service.depends_on() {
            writeln!(out, "    {s} -> {};", d.get())?;
        }
    }
    writeln!(out, "}}")
}
