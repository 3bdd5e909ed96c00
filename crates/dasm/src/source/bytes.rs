//! Extraction of bytecode from an array of bytes.

use super::BytecodeSource;
use crate::bytecode::Bytecode;
use std::convert::Infallible;

impl BytecodeSource for Vec<u8> {
    type Error = Infallible;

    fn extract(self) -> Result<Bytecode, Self::Error> {
        Ok(Bytecode::from(self))
    }
}

impl BytecodeSource for &[u8] {
    type Error = Infallible;

    fn extract(self) -> Result<Bytecode, Self::Error> {
        Ok(Bytecode::from(self))
    }
}

impl<const N: usize> BytecodeSource for [u8; N] {
    type Error = Infallible;

    fn extract(self) -> Result<Bytecode, Self::Error> {
        Ok(Bytecode::from(self.to_vec()))
    }
}
