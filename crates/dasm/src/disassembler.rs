//! EVM disassembler.

use thiserror::Error;

use crate::{
    assembly::{Assembly, effective_length},
    bytecode::Bytecode,
    instruction::PositionedInstruction,
    source::BytecodeSource,
};
use asm::OpCode;

/// Errors that can happen when disassembling bytecode.
///
/// Disassembly itself never fails: unknown bytes become [`OpCode::Unknown`] and a truncated
/// `PUSHn` immediate is simply shorter than `n`. This type exists so source-backed entry points
/// have somewhere to hang an extraction failure off of.
#[derive(Debug, Error)]
pub enum DasmError {}

/// An error that can happen when disassembling from a [`BytecodeSource`].
#[derive(Debug, Error)]
pub enum SourceDasmError<E> {
    /// Failed to extract bytecode from source.
    #[error("source extraction failed: {0}")]
    Extraction(E),

    /// A failure to disassemble the bytecode.
    #[error("disassembly failed: {0}")]
    Dasm(#[from] DasmError),
}

/// A linear EVM disassembler.
///
/// Walks a bytecode buffer from address zero, mapping each byte to an [`OpCode`] and skipping
/// `PUSHn` immediates, after trimming a trailing Swarm-hash metadata blob if present.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disassembler;

impl Disassembler {
    /// Creates a new disassembler.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Disassembles EVM bytecode into an instruction list.
    ///
    /// # Errors
    /// Never actually fails; see [`DasmError`].
    pub fn disassemble(&self, bytecode: &Bytecode) -> Result<Assembly, DasmError> {
        Ok(Assembly::new(decode(bytecode.as_ref())))
    }

    /// Disassembles any source that provides [`Bytecode`] into EVM assembly.
    ///
    /// # Errors
    /// Returns an error if bytecode could not be extracted from the source or if disassembly
    /// failed (see [`Disassembler::disassemble`]).
    pub fn disassemble_from_source<T: BytecodeSource>(
        &self,
        source: T,
    ) -> Result<Assembly, SourceDasmError<T::Error>> {
        let bytecode = source.extract().map_err(SourceDasmError::Extraction)?;
        Ok(self.disassemble(&bytecode)?)
    }

    /// Disassembles a hex string (optionally `0x`-prefixed) into EVM assembly.
    ///
    /// # Errors
    /// Returns an error if the hex string could not be parsed or if disassembly failed (see
    /// [`Disassembler::disassemble`]).
    pub fn disassemble_hex<T: AsRef<str>>(
        &self,
        hex: T,
    ) -> Result<Assembly, SourceDasmError<<&str as BytecodeSource>::Error>> {
        self.disassemble_from_source(hex.as_ref())
    }

    /// Disassembles raw bytes into EVM assembly.
    ///
    /// # Errors
    /// Returns an error if disassembly failed (see [`Disassembler::disassemble`]).
    pub fn disassemble_bytes<T: AsRef<[u8]>>(
        &self,
        bytes: T,
    ) -> Result<Assembly, SourceDasmError<<&[u8] as BytecodeSource>::Error>> {
        self.disassemble_from_source(bytes.as_ref())
    }
}

/// Linearly decodes `bytes` (after metadata trimming) into positioned instructions.
fn decode(bytes: &[u8]) -> Vec<PositionedInstruction> {
    let effective = &bytes[..effective_length(bytes)];

    let mut instructions = Vec::new();
    let mut cursor = 0usize;

    while cursor < effective.len() {
        let start = cursor;
        let opcode = OpCode::from_byte(effective[start]);
        let immediate_size = opcode.immediate_size() as usize;

        let immediate_start = start + 1;
        let immediate_end = (immediate_start + immediate_size).min(effective.len());
        let immediate = effective[immediate_start..immediate_end].to_vec();

        cursor = immediate_end;
        instructions.push(PositionedInstruction::new(start, opcode, immediate));
    }

    instructions
}
