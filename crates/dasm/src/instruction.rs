//! A decoded instruction positioned within a bytecode buffer.

use asm::OpCode;

/// An opcode decoded at a specific offset in a bytecode buffer, with its immediate bytes (if
/// any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedInstruction {
    /// Byte offset of this instruction's opcode within the original buffer.
    offset: usize,
    /// The decoded opcode.
    opcode: OpCode,
    /// Immediate bytes following the opcode (non-empty only for `PUSHn`).
    immediate: Vec<u8>,
}

impl PositionedInstruction {
    /// Creates a new positioned instruction.
    #[must_use]
    pub fn new(offset: usize, opcode: OpCode, immediate: Vec<u8>) -> Self {
        Self {
            offset,
            opcode,
            immediate,
        }
    }

    /// Byte offset of the opcode within the original buffer.
    ///
    /// # Example
    /// ```
    /// # use tlsc_dasm::instruction::PositionedInstruction;
    /// # use tlsc_asm::{Mnemonic, OpCode};
    /// let ins = PositionedInstruction::new(3, OpCode::Known(Mnemonic::GAS), vec![]);
    /// assert_eq!(ins.offset(), 3);
    /// ```
    #[must_use]
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The decoded opcode.
    #[must_use]
    #[inline]
    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    /// The immediate bytes following the opcode, if any.
    ///
    /// For a `PUSHn` instruction truncated at the end of the buffer, this may be shorter than
    /// `n` bytes.
    #[must_use]
    #[inline]
    pub fn immediate(&self) -> &[u8] {
        &self.immediate
    }

    /// Total width of this instruction in bytes: the opcode plus its immediate.
    #[must_use]
    #[inline]
    pub fn width(&self) -> usize {
        1 + self.immediate.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asm::Mnemonic;

    #[test]
    fn width_accounts_for_immediate() {
        let push = PositionedInstruction::new(0, OpCode::Known(Mnemonic::PUSH4), vec![0; 4]);
        assert_eq!(push.width(), 5);

        let stop = PositionedInstruction::new(5, OpCode::Known(Mnemonic::STOP), vec![]);
        assert_eq!(stop.width(), 1);
    }
}
