//! The PRF façade: `B` independent keyed 128-bit-to-128-bit maps.
//!
//! Backed by AES-128 in ECB mode with padding disabled, evaluated one block
//! at a time. This inverts the teacher crate's `AESPRG` (there, the *seed*
//! is the AES key and a fixed all-zero plaintext is encrypted to stretch
//! it); here the long-lived `PrfKey` is the AES key and the tree seed being
//! expanded is the plaintext, matching `PRFEval(prf_key_j, &parent, &out)`
//! in the reference implementation.
use std::convert::TryFrom;
use std::sync::Arc;

use derivative::Derivative;
use openssl::symm::{Cipher, Crypter, Mode};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::block::{Block, BLOCK_SIZE};
use crate::error::{Error, Result};

/// A single AES-128 key, used as one of the `B` independent PRFs.
#[derive(Derivative)]
#[derivative(Clone, PartialEq, Eq)]
pub struct PrfKey {
    #[derivative(PartialEq = "ignore")]
    bytes: Zeroizing<[u8; 16]>,
}

impl std::fmt::Debug for PrfKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrfKey").finish_non_exhaustive()
    }
}

impl PrfKey {
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        PrfKey {
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        PrfKey {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Evaluate this PRF on a single 128-bit input.
    pub fn eval(&self, input: Block) -> Block {
        let mut out = [Block::ZERO];
        self.batch_eval(&[input], &mut out);
        out[0]
    }

    /// Evaluate this PRF on `inputs`, writing one output block per input
    /// into `outputs`. `outputs` may overlap with `inputs`'s backing memory
    /// only in the sense that it is permitted to be a wholly distinct
    /// buffer -- the façade never requires in-place evaluation.
    pub fn batch_eval(&self, inputs: &[Block], outputs: &mut [Block]) {
        assert_eq!(inputs.len(), outputs.len(), "batch size mismatch");
        if inputs.is_empty() {
            return;
        }
        let mut plaintext = Vec::with_capacity(inputs.len() * BLOCK_SIZE);
        for block in inputs {
            plaintext.extend_from_slice(&block.to_le_bytes());
        }

        let cipher = Cipher::aes_128_ecb();
        let mut crypter = Crypter::new(cipher, Mode::Encrypt, &*self.bytes, None)
            .expect("AES-128-ECB crypter construction cannot fail for a 16-byte key");
        crypter.pad(false);

        let mut ciphertext = vec![0u8; plaintext.len() + cipher.block_size()];
        let mut written = crypter
            .update(&plaintext, &mut ciphertext)
            .expect("ECB encryption of whole blocks cannot fail");
        written += crypter
            .finalize(&mut ciphertext[written..])
            .expect("no padding means nothing left to flush");
        ciphertext.truncate(written);

        for (chunk, out) in ciphertext.chunks_exact(BLOCK_SIZE).zip(outputs.iter_mut()) {
            *out = Block::from_bytes_slice(chunk);
        }
    }
}

/// `B` independent PRF keys, indexed `0..B`, shared (read-only) between the
/// generator and every evaluator that consumes keys it produced.
#[derive(Clone, Debug)]
pub struct PrfKeySet {
    keys: Arc<Vec<PrfKey>>,
}

impl PrfKeySet {
    pub fn new(keys: Vec<PrfKey>) -> Self {
        PrfKeySet {
            keys: Arc::new(keys),
        }
    }

    pub fn random(branching_factor: usize) -> Self {
        PrfKeySet::new((0..branching_factor).map(|_| PrfKey::random()).collect())
    }

    pub fn branching_factor(&self) -> usize {
        self.keys.len()
    }

    pub fn key(&self, branch: usize) -> Result<&PrfKey> {
        self.keys
            .get(branch)
            .ok_or(Error::InvalidArgument("branch index out of range of PRF key set"))
    }

    /// The reserved key used by the output extender's counter-mode stretch.
    /// Any fixed, in-range key works as long as generator and evaluator agree;
    /// branch 0 is as good as any other.
    pub fn extension_key(&self) -> Result<&PrfKey> {
        self.key(0)
    }

    pub fn require_branching_factor(&self, expected: usize) -> Result<()> {
        if self.keys.len() != expected {
            return Err(Error::InvalidArgument("PRF key count does not match branching factor"));
        }
        Ok(())
    }
}

impl TryFrom<Vec<[u8; 16]>> for PrfKeySet {
    type Error = Error;

    fn try_from(raw: Vec<[u8; 16]>) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidArgument("PRF key set must have at least one key"));
        }
        Ok(PrfKeySet::new(raw.into_iter().map(PrfKey::from_bytes).collect()))
    }
}
