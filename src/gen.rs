//! The generator: produces a correlated DPF key pair for a secret index and message.
//!
//! Line-for-line grounded on `DPFGen`/`DPFGenZ` in the reference C
//! implementation's level-synchronous correction-word recurrence.
use zeroize::Zeroizing;

use crate::bits::{digit, ipow};
use crate::block::Block;
use crate::entropy::{EntropySource, OsEntropy};
use crate::error::{Error, Result};
use crate::extend::extend;
use crate::key::Key;
use crate::prf::PrfKeySet;

/// General base-`B` key generation (`GenZ` in the external-interfaces table).
///
/// `prf_keys` must expose exactly `branching_factor` subkeys. `alpha` is the
/// secret index in `[0, branching_factor^depth)`; `msg` is the `m`-block
/// message reconstructed only at `alpha`.
pub fn gen_z(
    prf_keys: &PrfKeySet,
    branching_factor: usize,
    depth: usize,
    alpha: usize,
    msg: &[Block],
) -> Result<(Key, Key)> {
    gen_z_with_entropy(prf_keys, branching_factor, depth, alpha, msg, &mut OsEntropy)
}

pub fn gen_z_with_entropy(
    prf_keys: &PrfKeySet,
    branching_factor: usize,
    depth: usize,
    alpha: usize,
    msg: &[Block],
    entropy: &mut dyn EntropySource,
) -> Result<(Key, Key)> {
    if branching_factor < 2 {
        return Err(Error::InvalidArgument("branching_factor (B) must be at least 2"));
    }
    if depth == 0 {
        return Err(Error::InvalidArgument("depth (n) must be at least 1"));
    }
    if msg.is_empty() {
        return Err(Error::InvalidArgument("message must have at least one block"));
    }
    prf_keys.require_branching_factor(branching_factor)?;

    let domain_size = ipow(branching_factor, depth as u32)?;
    if alpha >= domain_size {
        return Err(Error::InvalidArgument("alpha must be < branching_factor^depth"));
    }

    let s_a = Zeroizing::new(random_block(entropy)?);
    let s_b = Zeroizing::new(random_block(entropy)?);
    let s_a = Zeroizing::new(if (*s_a ^ *s_b).lsb() == 0 { s_a.flip_lsb() } else { *s_a });

    let mut pa = Zeroizing::new(*s_a);
    let mut pb = Zeroizing::new(*s_b);

    // cw[branch][level]
    let mut cw: Vec<Vec<Block>> = vec![vec![Block::ZERO; depth]; branching_factor];

    let mut sa = Zeroizing::new(vec![Block::ZERO; branching_factor]);
    let mut sb = Zeroizing::new(vec![Block::ZERO; branching_factor]);

    for level in 0..depth {
        let ca_prev = pa.lsb();
        let cb_prev = pb.lsb();

        for branch in 0..branching_factor {
            let key = prf_keys.key(branch)?;
            sa[branch] = key.eval(*pa);
            sb[branch] = key.eval(*pb);
        }

        let t = digit(branching_factor, alpha, depth, level);
        debug_assert!(t < branching_factor, "digit() must stay within [0, B)");

        let mut r = Zeroizing::new(random_block(entropy)?);
        if (sa[t] ^ sb[t] ^ *r).lsb() == 0 {
            *r = r.flip_lsb();
        }

        for branch in 0..branching_factor {
            cw[branch][level] = if branch == t { *r } else { sa[branch] ^ sb[branch] };
        }

        pa = Zeroizing::new(sa[t].xor_if(ca_prev, *r));
        pb = Zeroizing::new(sb[t].xor_if(cb_prev, *r));
    }

    // After the loop, `pa`/`pb` are exactly the two parties' leaf seeds at
    // `alpha`: the final iteration's child-update step *is* the leaf-seed
    // computation, so there is no separate last-level special case.
    let leaf_seed_a = Zeroizing::new(*pa);
    let leaf_seed_b = Zeroizing::new(*pb);

    let mut stretch_a = Zeroizing::new(vec![Block::ZERO; msg.len()]);
    let mut stretch_b = Zeroizing::new(vec![Block::ZERO; msg.len()]);
    extend(prf_keys, &[*leaf_seed_a], msg.len(), &mut stretch_a)?;
    extend(prf_keys, &[*leaf_seed_b], msg.len(), &mut stretch_b)?;

    let ocw: Vec<Block> = stretch_a
        .iter()
        .zip(stretch_b.iter())
        .zip(msg.iter())
        .map(|((a, b), m)| *a ^ *b ^ *m)
        .collect();

    let k0 = Key::new(prf_keys.clone(), branching_factor, depth, msg.len(), *s_a, &cw, &ocw)?;
    let k1 = Key::new(prf_keys.clone(), branching_factor, depth, msg.len(), *s_b, &cw, &ocw)?;
    Ok((k0, k1))
}

/// Binary DPF generation (`Gen` in the external-interfaces table): a thin
/// `branching_factor = 2` wrapper over [`gen_z`], per the Design Notes
/// decision to keep one generic implementation rather than a hand-unrolled
/// binary tree walk.
pub fn gen(prf_keys: &PrfKeySet, depth: usize, alpha: usize, msg: &[Block]) -> Result<(Key, Key)> {
    gen_z(prf_keys, 2, depth, alpha, msg)
}

/// Ternary DPF generation: the `branching_factor = 3` fast path named in the
/// spec, likewise a thin wrapper.
pub fn gen_ternary(prf_keys: &PrfKeySet, depth: usize, alpha: usize, msg: &[Block]) -> Result<(Key, Key)> {
    gen_z(prf_keys, 3, depth, alpha, msg)
}

fn random_block(entropy: &mut dyn EntropySource) -> Result<Block> {
    let mut buf = [0u8; 16];
    entropy.fill_bytes(&mut buf)?;
    Ok(Block::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::FailingEntropy;

    #[test]
    fn test_rejects_bad_branching_factor() {
        let keys = PrfKeySet::random(1);
        assert!(matches!(
            gen_z(&keys, 1, 2, 0, &[Block::ZERO]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_zero_depth() {
        let keys = PrfKeySet::random(2);
        assert!(gen_z(&keys, 2, 0, 0, &[Block::ZERO]).is_err());
    }

    #[test]
    fn test_rejects_empty_message() {
        let keys = PrfKeySet::random(2);
        assert!(gen_z(&keys, 2, 2, 0, &[]).is_err());
    }

    #[test]
    fn test_rejects_alpha_out_of_range() {
        let keys = PrfKeySet::random(2);
        assert!(gen_z(&keys, 2, 2, 4, &[Block::ZERO]).is_err());
    }

    #[test]
    fn test_rejects_mismatched_key_count() {
        let keys = PrfKeySet::random(2);
        assert!(gen_z(&keys, 3, 2, 0, &[Block::ZERO]).is_err());
    }

    #[test]
    fn test_keys_share_all_but_seed() {
        let keys = PrfKeySet::random(2);
        let (k0, k1) = gen(&keys, 3, 5, &[Block::from_u128(0xBEEF)]).unwrap();
        assert_ne!(k0.initial_seed(), k1.initial_seed());
        for level in 0..3 {
            for branch in 0..2 {
                assert_eq!(k0.cw(branch, level).unwrap(), k1.cw(branch, level).unwrap());
            }
        }
        assert_eq!(k0.ocw(0).unwrap(), k1.ocw(0).unwrap());
    }

    #[test]
    fn test_key_size_matches_formula() {
        let keys = PrfKeySet::random(3);
        let (k0, _) = gen_ternary(&keys, 4, 10, &[Block::ZERO, Block::from_u128(1)]).unwrap();
        assert_eq!(k0.as_bytes().len(), 16 * (1 + 4 * 3 + 2));
    }

    #[test]
    fn test_insufficient_entropy_propagates() {
        let keys = PrfKeySet::random(2);
        let err = gen_z_with_entropy(&keys, 2, 2, 0, &[Block::ZERO], &mut FailingEntropy).unwrap_err();
        assert_eq!(err, Error::InsufficientEntropy);
    }
}
