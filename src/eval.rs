//! The evaluator: expands one key into its shares for every domain element.
//!
//! Grounded on `DPFFullDomainEval`/`DPFFullDomainEvalZ` in the reference C
//! implementation, including its double-buffered, batched tree walk. Unlike
//! the source, batches always scatter children to their canonical domain
//! position (`parent_idx * B + branch`) rather than a branch-major group
//! within the batch — see SPEC_FULL.md §9, Open Question 1.
use crate::bits::ipow;
use crate::block::Block;
use crate::error::{Error, Result};
use crate::extend::extend;
use crate::key::Key;

const LOG_BATCH_SIZE: u32 = 6;

/// General base-`B` full-domain evaluation (`FullDomainEvalZ`).
///
/// `cache` and `output` must each hold exactly `B^n * m` blocks. On success,
/// `output[leaf * m .. leaf * m + m]` is this key's share at domain element
/// `leaf`, for every `leaf` in `[0, B^n)`.
pub fn full_domain_eval_z(key: &Key, cache: &mut [Block], output: &mut [Block]) -> Result<()> {
    let b = key.branching_factor();
    let n = key.depth();
    let m = key.msg_len();
    let domain_size = ipow(b, n as u32)?;
    let total = domain_size
        .checked_mul(m)
        .ok_or(Error::IntegerOverflow("B^n * m overflowed usize"))?;
    if output.len() != total || cache.len() != total {
        return Err(Error::InvalidArgument("scratch buffers must hold exactly B^n * m blocks"));
    }

    let (mut cur_output, mut cur_cache): (&mut [Block], &mut [Block]) = if n % 2 == 1 {
        (cache, output)
    } else {
        (output, cache)
    };

    cur_output[0] = key.initial_seed();
    let mut num_nodes = 1usize;
    let max_batch = ipow(b, LOG_BATCH_SIZE).unwrap_or(domain_size).min(domain_size.max(1));

    let prf_keys = key.prf_keys()?;

    for level in 0..n {
        let batch_size = num_nodes.min(max_batch);
        let num_batches = num_nodes / batch_size;

        let mut children = vec![vec![Block::ZERO; batch_size]; b];

        for batch in 0..num_batches {
            let offset = batch * batch_size;
            let parents = &cur_output[offset..offset + batch_size];

            for branch in 0..b {
                prf_keys.key(branch)?.batch_eval(parents, &mut children[branch]);
            }

            for p in 0..batch_size {
                let cb = cur_output[offset + p].lsb();
                let child_base = (offset + p) * b;
                for branch in 0..b {
                    let cw = key.cw(branch, level)?;
                    cur_cache[child_base + branch] = children[branch][p].xor_if(cb, cw);
                }
            }
        }

        std::mem::swap(&mut cur_output, &mut cur_cache);
        num_nodes *= b;
    }
    debug_assert_eq!(num_nodes, domain_size);

    // `cur_output` now holds `domain_size` unstretched leaf seeds, one block
    // each, in its first `domain_size` slots. Stretch them into `cur_cache`,
    // then write the OCW-corrected final shares back into `cur_output`
    // (which is the caller's `output` buffer, per the parity argument above).
    extend(prf_keys, &cur_output[0..domain_size], m, cur_cache)?;

    for leaf in 0..domain_size {
        let cb = cur_cache[leaf * m].lsb();
        for k in 0..m {
            let ocw = key.ocw(k)?;
            cur_output[leaf * m + k] = cur_cache[leaf * m + k].xor_if(cb, ocw);
        }
    }

    Ok(())
}

/// Binary full-domain evaluation (`FullDomainEval`): a thin wrapper,
/// provided for callers who only ever generate binary keys.
pub fn full_domain_eval(key: &Key, cache: &mut [Block], output: &mut [Block]) -> Result<()> {
    if key.branching_factor() != 2 {
        return Err(Error::InvalidArgument("full_domain_eval requires a branching_factor = 2 key"));
    }
    full_domain_eval_z(key, cache, output)
}
