//! EVM operation codes and mnemonics.

#![deny(unsafe_code)]

mod mnemonic;
mod opcode;

pub use mnemonic::{Mnemonic, MnemonicIter};
pub use opcode::OpCode;
