//! This lexer normalizes BASIL source lines.
//!
//! BASIL only supports a single instruction per line, so the
//! lexer's whole job is to strip comments and whitespace,
//! lower-case what is left, and drop the lines that end up empty.
use std::io::{self, BufRead};

/// A normalized, non-empty source line and the 1-based
/// line number it was read from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

/// Normalizes a raw line. Returns None if nothing but
/// whitespace and comments remain.
pub fn normalize(raw: &str) -> Option<String> {
    let code = match raw.find(';') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_ascii_lowercase())
    }
}

/// Lazily yields normalized lines from a reader, skipping
/// blank and comment-only lines.
pub struct SourceLines<R> {
    reader: R,
    buffer: Vec<u8>,
    line_num: usize,
    done: bool,
}

impl<R: BufRead> SourceLines<R> {
    pub fn new(reader: R) -> Self {
        SourceLines { reader, buffer: Vec::with_capacity(256), line_num: 0, done: false }
    }
}

impl<R: BufRead> Iterator for SourceLines<R> {
    type Item = io::Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_num += 1;
                    let raw = String::from_utf8_lossy(&self.buffer);
                    if let Some(text) = normalize(&raw) {
                        return Some(Ok(Line { number: self.line_num, text }));
                    }
                    trace!("skipping blank line {}", self.line_num);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
