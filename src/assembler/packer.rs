//! The packer pairs instruction nibbles into object bytes.
//!
//! Each byte is `(high << 4) | low`. A `push` is two nibbles, and
//! it may start on either half of a byte: when its opcode nibble
//! fills a pending low half, its immediate becomes the high half
//! of the next byte.
use super::ast::{Instruction, PUSH_OPCODE};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum State {
    Empty,
    /// A nibble waiting for its low-half partner.
    Holding(u8),
}

#[derive(Debug)]
pub struct Packer {
    state: State,
}

impl Default for Packer {
    fn default() -> Self {
        Packer::new()
    }
}

impl Packer {
    pub fn new() -> Self {
        Packer { state: State::Empty }
    }

    /// Feeds one instruction, returning the byte it completes, if any.
    /// At most one byte is completed per instruction.
    pub fn pack(&mut self, ins: Instruction) -> Option<u8> {
        let op = ins.opcode();
        let (byte, next) = match self.state {
            State::Empty => match ins.immediate() {
                Some(value) => (Some(PUSH_OPCODE << 4 | value), State::Empty),
                None => (None, State::Holding(op)),
            },
            State::Holding(high) => {
                let next = match ins.immediate() {
                    Some(value) => State::Holding(value),
                    None => State::Empty,
                };
                (Some(high << 4 | op), next)
            }
        };
        self.state = next;
        if let Some(b) = byte {
            trace!("packed byte 0x{:02X}", b);
        }
        byte
    }

    /// Emits the pending nibble, if any, in the high half of a final
    /// byte. The low half is padded with zero.
    pub fn flush(&mut self) -> Option<u8> {
        match std::mem::replace(&mut self.state, State::Empty) {
            State::Holding(high) => {
                trace!("flushed trailing nibble 0x{:X}", high);
                Some(high << 4)
            }
            State::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state == State::Empty
    }
}

/// Streams packed bytes out of a stream of instructions.
///
/// The packer is flushed once the upstream runs dry. An upstream
/// error is passed through once and ends the stream; nothing after
/// it is packed.
pub struct PackedBytes<I> {
    instructions: I,
    packer: Packer,
    done: bool,
}

impl<I> PackedBytes<I> {
    pub fn new(instructions: I) -> Self {
        PackedBytes { instructions, packer: Packer::new(), done: false }
    }
}

impl<I, E> Iterator for PackedBytes<I>
where
    I: Iterator<Item = Result<Instruction, E>>,
{
    type Item = Result<u8, E>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.instructions.next() {
                Some(Ok(ins)) => {
                    if let Some(byte) = self.packer.pack(ins) {
                        return Some(Ok(byte));
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return self.packer.flush().map(Ok);
                }
            }
        }
        None
    }
}
