//! EVM operation codes.

use derive_more::{Binary, LowerHex, Octal, UpperHex};

use crate::Mnemonic;

/// EVM operation code.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    derive_more::Display,
    LowerHex,
    UpperHex,
    Binary,
    Octal,
    Hash,
)]
pub enum OpCode {
    /// A known opcode represented as a mnemonic.
    Known(Mnemonic),
    /// An unknown opcode represented as a byte.
    Unknown(u8),
}

impl OpCode {
    /// Returns [`true`] if the opcode is known.
    ///
    /// # Example
    /// ```
    /// # use tlsc_asm::{OpCode, Mnemonic};
    /// assert_eq!(OpCode::Known(Mnemonic::GAS).is_known(), true);
    /// assert_eq!(OpCode::Unknown(0xF).is_known(), false);
    /// ```
    #[must_use]
    #[inline]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Returns [`true`] if the opcode is unknown.
    ///
    /// # Example
    /// ```
    /// # use tlsc_asm::{OpCode, Mnemonic};
    /// assert_eq!(OpCode::Unknown(0xF).is_unknown(), true);
    /// assert_eq!(OpCode::Known(Mnemonic::GAS).is_unknown(), false);
    /// ```
    #[must_use]
    #[inline]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Convert a byte into an [`OpCode`], returning [`OpCode::Unknown`] if no known mnemonic
    /// exists.
    ///
    /// # Example
    /// ```
    /// # use tlsc_asm::{OpCode, Mnemonic};
    /// assert_eq!(OpCode::from_byte(0x5A), OpCode::Known(Mnemonic::GAS));
    /// assert_eq!(OpCode::from_byte(0xF), OpCode::Unknown(0xF));
    /// ```
    #[must_use]
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        match Mnemonic::from_repr(byte) {
            Some(mnemonic) => Self::Known(mnemonic),
            None => Self::Unknown(byte),
        }
    }

    /// Try to convert a byte into a known mnemonic.
    /// Returns `None` if the opcode is unknown.
    ///
    /// # Example
    /// ```
    /// # use tlsc_asm::{OpCode, Mnemonic};
    /// assert_eq!(OpCode::try_from_byte(0x5A), Some(OpCode::Known(Mnemonic::GAS)));
    /// assert_eq!(OpCode::try_from_byte(0xF), None);
    /// ```
    #[must_use]
    #[inline]
    pub const fn try_from_byte(byte: u8) -> Option<Self> {
        if let Some(mnemonic) = Mnemonic::from_repr(byte) {
            Some(Self::Known(mnemonic))
        } else {
            None
        }
    }

    /// Convert opcode into a byte.
    ///
    /// # Example
    /// ```
    /// # use tlsc_asm::{OpCode, Mnemonic};
    /// assert_eq!(OpCode::Known(Mnemonic::GAS).into_byte(), 0x5A);
    /// assert_eq!(OpCode::Unknown(0xF).into_byte(), 0xF);
    /// ```
    #[must_use]
    #[inline]
    pub const fn into_byte(self) -> u8 {
        match self {
            OpCode::Known(mnemonic) => mnemonic as u8,
            OpCode::Unknown(byte) => byte,
        }
    }

    /// Returns a value signifying whether this opcode is of the type `PUSHx`.
    ///
    /// # Example
    /// ```
    /// # use tlsc_asm::{OpCode, Mnemonic};
    /// assert_eq!(OpCode::Known(Mnemonic::PUSH7).is_push(), true);
    /// assert_eq!(OpCode::Known(Mnemonic::GAS).is_push(), false);
    /// ```
    #[must_use]
    #[inline]
    pub const fn is_push(&self) -> bool {
        match self {
            OpCode::Known(mnemonic) => mnemonic.is_push(),
            OpCode::Unknown(_) => false,
        }
    }

    /// Returns a value signifying whether this opcode is of the type `DUPx`.
    #[must_use]
    #[inline]
    pub const fn is_dup(&self) -> bool {
        match self {
            OpCode::Known(mnemonic) => mnemonic.is_dup(),
            OpCode::Unknown(_) => false,
        }
    }

    /// Returns a value signifying whether this opcode is of the type `SWAPx`.
    #[must_use]
    #[inline]
    pub const fn is_swap(&self) -> bool {
        match self {
            OpCode::Known(mnemonic) => mnemonic.is_swap(),
            OpCode::Unknown(_) => false,
        }
    }

    /// Returns a value signifying whether this opcode is of the type `LOGx`.
    #[must_use]
    #[inline]
    pub const fn is_log(&self) -> bool {
        match self {
            OpCode::Known(mnemonic) => mnemonic.is_log(),
            OpCode::Unknown(_) => false,
        }
    }

    /// Returns [`true`] for opcodes that terminate execution of the smart contract.
    ///
    /// # Example
    /// ```
    /// # use tlsc_asm::{OpCode, Mnemonic};
    /// assert_eq!(OpCode::Known(Mnemonic::RETURN).is_terminator(), true);
    /// assert_eq!(OpCode::Unknown(0xF).is_terminator(), true);
    /// assert_eq!(OpCode::Known(Mnemonic::GAS).is_terminator(), false);
    /// ```
    #[must_use]
    #[inline]
    pub const fn is_terminator(&self) -> bool {
        match self {
            OpCode::Known(mnemonic) => mnemonic.is_terminator(),
            OpCode::Unknown(_) => true,
        }
    }

    /// Returns the number of immediate bytes following this opcode in the bytecode stream.
    ///
    /// Unknown opcodes carry no immediate, since there is no mnemonic to define one.
    #[must_use]
    #[inline]
    pub const fn immediate_size(&self) -> u8 {
        match self {
            OpCode::Known(mnemonic) => mnemonic.immediate_size(),
            OpCode::Unknown(_) => 0,
        }
    }
}

impl PartialEq<Mnemonic> for OpCode {
    #[inline]
    fn eq(&self, other: &Mnemonic) -> bool {
        u8::from(self) == *other as u8
    }
}

impl PartialOrd<Mnemonic> for OpCode {
    #[inline]
    fn partial_cmp(&self, other: &Mnemonic) -> Option<std::cmp::Ordering> {
        u8::from(self).partial_cmp(&(*other as u8))
    }
}

impl PartialEq<u8> for OpCode {
    #[inline]
    fn eq(&self, other: &u8) -> bool {
        u8::from(self).eq(other)
    }
}

impl PartialOrd<u8> for OpCode {
    #[inline]
    fn partial_cmp(&self, other: &u8) -> Option<std::cmp::Ordering> {
        u8::from(self).partial_cmp(other)
    }
}

impl From<OpCode> for u8 {
    #[inline]
    fn from(opcode: OpCode) -> Self {
        opcode.into_byte()
    }
}

impl From<&OpCode> for u8 {
    #[inline]
    fn from(opcode: &OpCode) -> Self {
        opcode.into_byte()
    }
}

impl From<u8> for OpCode {
    #[inline]
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<Mnemonic> for OpCode {
    #[inline]
    fn from(value: Mnemonic) -> Self {
        Self::Known(value)
    }
}
