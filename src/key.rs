//! Key container: a contiguous byte buffer with a layout self-describing
//! given `(branching_factor, depth, msg_len)`, plus a handle to the PRF
//! keys it must be combined with at evaluation time.
use serde::{Deserialize, Serialize};

use crate::block::{Block, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::prf::PrfKeySet;

/// One party's share of a generated DPF.
///
/// Layout (§3): `seed (16B) | CW[0][0..n) (16n B) | ... | CW[B-1][0..n) (16n B) | OCW[0..m) (16m B)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Key {
    buf: Vec<u8>,
    branching_factor: usize,
    depth: usize,
    msg_len: usize,
    #[serde(skip)]
    prf_keys: Option<PrfKeySet>,
}

impl Key {
    /// Assemble a key from its logical parts. Used by the generator; callers
    /// deserializing a key from the wire should use [`Key::from_bytes`].
    pub(crate) fn new(
        prf_keys: PrfKeySet,
        branching_factor: usize,
        depth: usize,
        msg_len: usize,
        seed: Block,
        cw: &[Vec<Block>],
        ocw: &[Block],
    ) -> Result<Self> {
        if branching_factor < 2 {
            return Err(Error::InvalidArgument("branching_factor must be at least 2"));
        }
        if depth == 0 {
            return Err(Error::InvalidArgument("depth must be at least 1"));
        }
        if msg_len == 0 {
            return Err(Error::InvalidArgument("msg_len must be at least 1"));
        }
        if cw.len() != branching_factor || cw.iter().any(|level_cws| level_cws.len() != depth) {
            return Err(Error::InvalidArgument("correction word table has wrong shape"));
        }
        if ocw.len() != msg_len {
            return Err(Error::InvalidArgument("output correction word has wrong length"));
        }

        let size = Key::byte_size(branching_factor, depth, msg_len)?;
        let mut buf = Vec::with_capacity(size);
        buf.extend_from_slice(&seed.to_le_bytes());
        for branch_cws in cw {
            for block in branch_cws {
                buf.extend_from_slice(&block.to_le_bytes());
            }
        }
        for block in ocw {
            buf.extend_from_slice(&block.to_le_bytes());
        }
        debug_assert_eq!(buf.len(), size);

        Ok(Key {
            buf,
            branching_factor,
            depth,
            msg_len,
            prf_keys: Some(prf_keys),
        })
    }

    /// Reconstruct a key from a raw buffer and its out-of-band parameters.
    pub fn from_bytes(
        prf_keys: PrfKeySet,
        branching_factor: usize,
        depth: usize,
        msg_len: usize,
        buf: Vec<u8>,
    ) -> Result<Self> {
        let expected = Key::byte_size(branching_factor, depth, msg_len)?;
        if buf.len() != expected {
            return Err(Error::InvalidArgument("key buffer length does not match (b, n, m)"));
        }
        Ok(Key {
            buf,
            branching_factor,
            depth,
            msg_len,
            prf_keys: Some(prf_keys),
        })
    }

    pub fn byte_size(branching_factor: usize, depth: usize, msg_len: usize) -> Result<usize> {
        let blocks = 1usize
            .checked_add(
                depth
                    .checked_mul(branching_factor)
                    .ok_or(Error::IntegerOverflow("n*B overflowed usize"))?,
            )
            .and_then(|v| v.checked_add(msg_len))
            .ok_or(Error::IntegerOverflow("key size overflowed usize"))?;
        blocks
            .checked_mul(BLOCK_SIZE)
            .ok_or(Error::IntegerOverflow("key size in bytes overflowed usize"))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn msg_len(&self) -> usize {
        self.msg_len
    }

    pub fn prf_keys(&self) -> Result<&PrfKeySet> {
        self.prf_keys
            .as_ref()
            .ok_or(Error::InvalidArgument("key has no attached PRF key set; call with_prf_keys first"))
    }

    /// Attach a PRF key set to a key reconstructed without one (e.g. after
    /// `serde` deserialization, which never carries key material).
    pub fn with_prf_keys(mut self, prf_keys: PrfKeySet) -> Self {
        self.prf_keys = Some(prf_keys);
        self
    }

    fn block_at(&self, block_index: usize) -> Block {
        let offset = block_index * BLOCK_SIZE;
        Block::from_bytes_slice(&self.buf[offset..offset + BLOCK_SIZE])
    }

    pub fn initial_seed(&self) -> Block {
        self.block_at(0)
    }

    /// The correction word for `branch` at tree `level` (`0 <= level < depth`).
    pub fn cw(&self, branch: usize, level: usize) -> Result<Block> {
        if branch >= self.branching_factor || level >= self.depth {
            return Err(Error::InvalidArgument("cw(branch, level) out of range"));
        }
        let block_index = 1 + branch * self.depth + level;
        Ok(self.block_at(block_index))
    }

    /// The `k`-th output correction word block (`0 <= k < msg_len`).
    pub fn ocw(&self, k: usize) -> Result<Block> {
        if k >= self.msg_len {
            return Err(Error::InvalidArgument("ocw(k) out of range"));
        }
        let block_index = 1 + self.branching_factor * self.depth + k;
        Ok(self.block_at(block_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> Key {
        let keys = PrfKeySet::random(3);
        let cw = vec![
            vec![Block::from_u128(1), Block::from_u128(2)],
            vec![Block::from_u128(3), Block::from_u128(4)],
            vec![Block::from_u128(5), Block::from_u128(6)],
        ];
        let ocw = vec![Block::from_u128(100)];
        Key::new(keys, 3, 2, 1, Block::from_u128(42), &cw, &ocw).unwrap()
    }

    #[test]
    fn test_byte_size_formula() {
        // |k| = 16 * (1 + n*B + m)
        assert_eq!(Key::byte_size(3, 2, 1).unwrap(), 16 * (1 + 2 * 3 + 1));
    }

    #[test]
    fn test_accessors_roundtrip() {
        let key = sample_key();
        assert_eq!(key.initial_seed(), Block::from_u128(42));
        assert_eq!(key.cw(0, 0).unwrap(), Block::from_u128(1));
        assert_eq!(key.cw(0, 1).unwrap(), Block::from_u128(2));
        assert_eq!(key.cw(1, 0).unwrap(), Block::from_u128(3));
        assert_eq!(key.cw(2, 1).unwrap(), Block::from_u128(6));
        assert_eq!(key.ocw(0).unwrap(), Block::from_u128(100));
    }

    #[test]
    fn test_accessors_reject_out_of_range() {
        let key = sample_key();
        assert!(key.cw(3, 0).is_err());
        assert!(key.cw(0, 2).is_err());
        assert!(key.ocw(1).is_err());
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        let keys = PrfKeySet::random(2);
        assert!(Key::from_bytes(keys, 2, 3, 1, vec![0u8; 5]).is_err());
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let key = sample_key();
        let keys = PrfKeySet::random(3);
        let bytes = key.as_bytes().to_vec();
        let reloaded = Key::from_bytes(keys, 3, 2, 1, bytes).unwrap();
        assert_eq!(reloaded.initial_seed(), key.initial_seed());
        assert_eq!(reloaded.ocw(0).unwrap(), key.ocw(0).unwrap());
    }
}
