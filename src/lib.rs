//! BASIL assembler core.
//!
//! Translates BASIL source, one instruction per line, into a packed
//! object stream of 4-bit instructions, two per byte.
#[macro_use] extern crate log;
extern crate regex;
extern crate thiserror;

pub mod assembler;
