//! The Assembler module is in charge of taking a
//! BASIL source file and producing the packed object bytes.
//!
//! It does this with a single streaming pass: the lexer
//! yields normalized lines, the parser resolves each line
//! to an instruction, and the packer pairs the resulting
//! nibbles into bytes.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod packer;
pub mod parser;

use std::io::BufRead;

use self::error::AssemblyError;
use self::lexer::SourceLines;
use self::packer::PackedBytes;
use self::parser::Parser;

/// Runs the whole pipeline over `reader` and returns the object bytes.
/// Nothing is returned on failure; the first error aborts the run.
pub fn assemble<R: BufRead>(reader: R) -> Result<Vec<u8>, AssemblyError> {
    let statements = Parser::new(SourceLines::new(reader));
    PackedBytes::new(statements.map(|stmt| stmt.map(|s| s.instruction))).collect()
}
