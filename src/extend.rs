//! Output extender: stretches a leaf seed into `msg_len` 128-bit blocks.
//!
//! Grounded on `ExtendOutput`/`ExtendOutputZ` in the reference C
//! implementation, whose callers (`DPFGen`, `DPFFullDomainEval`) rely on the
//! contract spelled out here: block 0 of each leaf's stretch *is* the
//! original seed, unmodified, so the evaluator can recover the leaf's
//! control bit from the stretched buffer without a parallel table.
use crate::block::Block;
use crate::error::{Error, Result};
use crate::prf::PrfKeySet;

/// Stretch each of `leaf_seeds.len()` leaf seeds into `msg_len` blocks,
/// writing `leaf_seeds.len() * msg_len` blocks into `out`.
///
/// `out[leaf * msg_len]` is always exactly `leaf_seeds[leaf]`; blocks
/// `1..msg_len` are produced by the key set's reserved extension PRF,
/// evaluated in counter mode (`PRF(seed XOR counter)`), batched across all
/// leaves for a given counter value.
pub fn extend(keys: &PrfKeySet, leaf_seeds: &[Block], msg_len: usize, out: &mut [Block]) -> Result<()> {
    if msg_len == 0 {
        return Err(Error::InvalidArgument("msg_len must be at least 1"));
    }
    if out.len() != leaf_seeds.len() * msg_len {
        return Err(Error::InvalidArgument("extend: output buffer size mismatch"));
    }

    for (leaf, seed) in leaf_seeds.iter().enumerate() {
        out[leaf * msg_len] = *seed;
    }

    if msg_len == 1 {
        return Ok(());
    }

    let extension_key = keys.extension_key()?;
    let mut inputs = vec![Block::ZERO; leaf_seeds.len()];
    let mut scratch = vec![Block::ZERO; leaf_seeds.len()];
    for counter in 1..msg_len {
        let tweak = Block::from_u128(counter as u128);
        for (input, seed) in inputs.iter_mut().zip(leaf_seeds.iter()) {
            *input = *seed ^ tweak;
        }
        extension_key.batch_eval(&inputs, &mut scratch);
        for (leaf, block) in scratch.iter().enumerate() {
            out[leaf * msg_len + counter] = *block;
        }
    }
    Ok(())
}
