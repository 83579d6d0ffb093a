//! A 128-bit word: the unit seeds, correction words, and messages are built from.
use std::ops::{BitXor, BitXorAssign};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::bits::{flip_lsb, lsb};

/// One 128-bit value. Its least significant bit doubles as a control bit
/// wherever a `Block` is used as a tree seed; the remaining 127 bits are
/// the pseudorandom payload. Byte conversion is always little-endian,
/// independent of the platform's native representation, per the
/// interoperable wire-format recommendation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, Zeroize)]
pub struct Block(u128);

pub const BLOCK_SIZE: usize = 16;

impl Block {
    pub const ZERO: Block = Block(0);

    #[inline]
    pub fn from_le_bytes(bytes: [u8; BLOCK_SIZE]) -> Self {
        Block(u128::from_le_bytes(bytes))
    }

    #[inline]
    pub fn to_le_bytes(self) -> [u8; BLOCK_SIZE] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; BLOCK_SIZE];
        buf.copy_from_slice(bytes);
        Block::from_le_bytes(buf)
    }

    #[inline]
    pub fn lsb(self) -> u8 {
        lsb(self.0)
    }

    #[inline]
    pub fn flip_lsb(self) -> Block {
        Block(flip_lsb(self.0))
    }

    /// `self XOR (cb * other)`, i.e. XOR `other` in only if the control bit is set.
    #[inline]
    pub fn xor_if(self, cb: u8, other: Block) -> Block {
        if cb == 1 {
            self ^ other
        } else {
            self
        }
    }

    #[inline]
    pub fn as_u128(self) -> u128 {
        self.0
    }

    #[inline]
    pub fn from_u128(v: u128) -> Self {
        Block(v)
    }
}

impl BitXor for Block {
    type Output = Block;

    #[inline]
    fn bitxor(self, rhs: Block) -> Block {
        Block(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Block) {
        self.0 ^= rhs.0;
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block({:#034x})", self.0)
    }
}

#[cfg(any(test, feature = "testing"))]
use proptest::prelude::*;

#[cfg(any(test, feature = "testing"))]
impl Arbitrary for Block {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        any::<u128>().prop_map(Block::from_u128).boxed()
    }
}
