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

use std::io::BufRead;
use std::num::ParseIntError;

/// Whitespace-separated integer scanner over a buffered reader.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: R,
    tokens: Vec<String>,
    cursor: usize,
}

#[derive(Debug)]
pub enum ScanError {
    Io(std::io::Error),
    ParseInt(ParseIntError),
    UnexpectedEof,
}

impl From<std::io::Error> for ScanError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseIntError> for ScanError {
    fn from(e: ParseIntError) -> Self {
        Self::ParseInt(e)
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Io(e) => write!(f, "I/O error: {e}"),
            ScanError::ParseInt(e) => write!(f, "parse-int error: {e}"),
            ScanError::UnexpectedEof => write!(f, "unexpected end of input"),
        }
    }
}

impl std::error::Error for ScanError {}

impl<R: BufRead> Scanner<R> {
    #[inline]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tokens: Vec::new(),
            cursor: 0,
        }
    }

    fn refill(&mut self) -> Result<bool, ScanError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            self.tokens.clear();
            self.tokens
                .extend(line.split_whitespace().map(str::to_owned));
            self.cursor = 0;
            if !self.tokens.is_empty() {
                return Ok(true);
            }
        }
    }

    /// Next integer token, or `UnexpectedEof` when the input is exhausted.
    pub fn next_i64(&mut self) -> Result<i64, ScanError> {
        if self.cursor >= self.tokens.len() && !self.refill()? {
            return Err(ScanError::UnexpectedEof);
        }
        let token = &self.tokens[self.cursor];
        self.cursor += 1;
        Ok(token.parse::<i64>()?)
    }

    pub fn next_usize(&mut self) -> Result<usize, ScanError> {
        if self.cursor >= self.tokens.len() && !self.refill()? {
            return Err(ScanError::UnexpectedEof);
        }
        let token = &self.tokens[self.cursor];
        self.cursor += 1;
        Ok(token.parse::<usize>()?)
    }

    /// Read every remaining integer until end of input.
    pub fn drain_i64(&mut self) -> Result<Vec<i64>, ScanError> {
        let mut out = Vec::new();
        loop {
            if self.cursor >= self.tokens.len() && !self.refill()? {
                return Ok(out);
            }
            let token = &self.tokens[self.cursor];
            self.cursor += 1;
            out.push(token.parse::<i64>()?);
        }
    }

    /// Read every remaining unsigned integer until end of input.
    pub fn drain_usize(&mut self) -> Result<Vec<usize>, ScanError> {
        let mut out = Vec::new();
        loop {
            if self.cursor >= self.tokens.len() && !self.refill()? {
                return Ok(out);
            }
            let token = &self.tokens[self.cursor];
            self.cursor += 1;
            out.push(token.parse::<usize>()?);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_tokens_across_lines_and_spacing() {
        let mut sc = Scanner::new(Cursor::new("1 2\n  3\n\n4 \t5"));
        for expected in 1..=5 {
            assert_eq!(sc.next_i64().unwrap(), expected);
        }
        assert!(matches!(sc.next_i64(), Err(ScanError::UnexpectedEof)));
    }

    #[test]
    fn test_negative_and_large_values() {
        let mut sc = Scanner::new(Cursor::new("-7 4294967296"));
        assert_eq!(sc.next_i64().unwrap(), -7);
        assert_eq!(sc.next_i64().unwrap(), 4_294_967_296);
    }

    #[test]
    fn test_parse_error_on_garbage() {
        let mut sc = Scanner::new(Cursor::new("12 oops"));
        assert_eq!(sc.next_i64().unwrap(), 12);
        assert!(matches!(sc.next_i64(), Err(ScanError::ParseInt(_))));
    }

    #[test]
    fn test_drain_reads_everything() {
        let mut sc = Scanner::new(Cursor::new("0 1\n2 3 4"));
        assert_eq!(sc.drain_i64().unwrap(), vec![0, 1, 2, 3, 4]);
    }
}
