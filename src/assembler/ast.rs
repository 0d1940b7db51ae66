//! This AST describes a single resolved BASIL instruction.
//!
//! BASIL is a 4-bit stack machine. Every instruction is one
//! nibble wide except `push`, which carries a second nibble
//! holding its immediate operand.
//! Comments are prefixed with semicolons (;) and are single-line only.
//! Instructions are delimited by newlines.
//!
//! Supported Instructions:
//!
//! ```nasm
//! push #IMM ; 0x0 push the 4-bit immediate (0-15)
//! and       ; 0x1
//! not       ; 0x2
//! or        ; 0x3
//! mul       ; 0x4
//! div       ; 0x5
//! add       ; 0x6
//! cmp       ; 0x7
//! pop       ; 0x8
//! swp       ; 0x9
//! dup       ; 0xA
//! ppc       ; 0xB
//! get       ; 0xC
//! put       ; 0xD
//! br        ; 0xE
//! ```
//!
//! Opcode 0xF is reserved.

use std::fmt;

/// A 4-bit immediate. Values above 0x0F are rejected by the parser.
pub type Immediate = u8;

/// The opcode nibble shared by every `push`.
pub const PUSH_OPCODE: u8 = 0b0000;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    Push(Immediate),
    And,
    Not,
    Or,
    Mul,
    Div,
    Add,
    Cmp,
    Pop,
    Swp,
    Dup,
    Ppc,
    Get,
    Put,
    Br,
}

/// Bare mnemonics in opcode order, starting at 0x1.
/// `push` is absent since it takes an operand.
pub const MNEMONICS: [(&str, Instruction); 14] = [
    ("and", Instruction::And),
    ("not", Instruction::Not),
    ("or",  Instruction::Or),
    ("mul", Instruction::Mul),
    ("div", Instruction::Div),
    ("add", Instruction::Add),
    ("cmp", Instruction::Cmp),
    ("pop", Instruction::Pop),
    ("swp", Instruction::Swp),
    ("dup", Instruction::Dup),
    ("ppc", Instruction::Ppc),
    ("get", Instruction::Get),
    ("put", Instruction::Put),
    ("br",  Instruction::Br),
];

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "push #{}", value),
            other => write!(f, "{}", other.mnemonic()),
        }
    }
}

impl Instruction {
    /// Looks up a bare (operand-less) mnemonic. The match is exact,
    /// so callers must normalize case and whitespace first.
    pub fn from_mnemonic(name: &str) -> Option<Instruction> {
        MNEMONICS
            .iter()
            .find(|(mnemonic, _)| *mnemonic == name)
            .map(|(_, ins)| *ins)
    }

    pub fn mnemonic(&self) -> &'static str {
        use Instruction::*;
        match self {
            Push(_) => "push",
            And     => "and",
            Not     => "not",
            Or      => "or",
            Mul     => "mul",
            Div     => "div",
            Add     => "add",
            Cmp     => "cmp",
            Pop     => "pop",
            Swp     => "swp",
            Dup     => "dup",
            Ppc     => "ppc",
            Get     => "get",
            Put     => "put",
            Br      => "br",
        }
    }

    /// Returns the opcode nibble of the instruction.
    pub fn opcode(&self) -> u8 {
        use Instruction::*;
        match self {
            Push(_) => PUSH_OPCODE,
            And     => 0b0001,
            Not     => 0b0010,
            Or      => 0b0011,
            Mul     => 0b0100,
            Div     => 0b0101,
            Add     => 0b0110,
            Cmp     => 0b0111,
            Pop     => 0b1000,
            Swp     => 0b1001,
            Dup     => 0b1010,
            Ppc     => 0b1011,
            Get     => 0b1100,
            Put     => 0b1101,
            Br      => 0b1110,
        }
    }

    /// The immediate operand; only `push` has one.
    pub fn immediate(&self) -> Option<Immediate> {
        match self {
            Instruction::Push(value) => Some(*value & 0x0F),
            _ => None,
        }
    }

    /// The nibbles this instruction contributes to the object stream,
    /// in emission order.
    pub fn nibbles(&self) -> Vec<u8> {
        match self.immediate() {
            Some(value) => vec![self.opcode(), value],
            None => vec![self.opcode()],
        }
    }
}
