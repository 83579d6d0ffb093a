//! The generator's random byte source, abstracted so tests can inject a
//! source that reports `InsufficientEntropy` instead of always succeeding.
use rand::rngs::OsRng;
use rand_core::RngCore;

use crate::error::{Error, Result};

/// A source of cryptographically strong random bytes. The production
/// implementation ([`OsEntropy`]) is backed by `rand::rngs::OsRng` via the
/// `rand_core::RngCore` trait, the same pairing of crates the teacher crate
/// already depends on for `jubjub` compatibility.
pub trait EntropySource {
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<()>;
}

#[derive(Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|_| Error::InsufficientEntropy)
    }
}

#[cfg(test)]
pub struct FailingEntropy;

#[cfg(test)]
impl EntropySource for FailingEntropy {
    fn fill_bytes(&mut self, _buf: &mut [u8]) -> Result<()> {
        Err(Error::InsufficientEntropy)
    }
}
