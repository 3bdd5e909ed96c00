//! A linear EVM disassembler and time-locked-contract classifier.

pub mod assembly;
pub mod bytecode;
pub mod disassembler;
pub mod instruction;
pub mod source;
pub mod timelock;

pub use assembly::Assembly;
pub use bytecode::Bytecode;
pub use disassembler::{DasmError, Disassembler, SourceDasmError};
pub use instruction::PositionedInstruction;
pub use source::BytecodeSource;
pub use timelock::is_potentially_time_locked;
