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

//! Assignment files: whitespace-separated machine ids, one per process,
//! read and written in the same shape.

use crate::common::MachineId;
use reassign_core::scan::{ScanError, Scanner};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub fn read_assignment<R: BufRead>(reader: R) -> Result<Vec<MachineId>, ScanError> {
    let mut sc = Scanner::new(reader);
    Ok(sc.drain_usize()?.into_iter().map(MachineId::new).collect())
}

pub fn read_assignment_from_path(path: &Path) -> Result<Vec<MachineId>, ScanError> {
    read_assignment(BufReader::new(File::open(path)?))
}

pub fn write_assignment<W: Write>(writer: &mut W, assignment: &[MachineId]) -> std::io::Result<()> {
    for machine in assignment {
        write!(writer, "{} ", machine.get())?;
    }
    writeln!(writer)
}

pub fn write_assignment_to_path(path: &Path, assignment: &[MachineId]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_assignment(&mut writer, assignment)?;
    writer.flush()
}
