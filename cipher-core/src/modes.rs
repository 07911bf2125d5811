//! Block-cipher-mode layer: ECB, CBC, PCBC, CFB, OFB, CTR and RandomDelta
//! over either block primitive, dispatched through a single tagged
//! [`Primitive`] enum rather than a type parameter — one dispatch point,
//! no `dyn` in the per-block hot loop.

use num_bigint_dig::BigUint;
use rayon::prelude::*;

use crate::rc5::RC5ControlBlock;
use crate::rc6::RC6ControlBlock;
use crate::{Reason, bail};

/// The two block primitives a [`crate::context::CipherContext`] can drive.
/// RC5 is always instantiated at its fixed external config-surface
/// parameters (w=64, r=12, b=64); RC6 is fixed by the algorithm itself.
pub enum Primitive {
    Rc5(RC5ControlBlock<u64>),
    Rc6(RC6ControlBlock),
}

impl Primitive {
    pub fn block_size(&self) -> usize {
        match self {
            Primitive::Rc5(_) => RC5ControlBlock::<u64>::native_block_size(),
            Primitive::Rc6(_) => 16,
        }
    }

    pub fn algorithm_name(&self) -> &'static str {
        match self {
            Primitive::Rc5(_) => "RC5",
            Primitive::Rc6(_) => "RC6",
        }
    }

    pub fn parametric_version(&self) -> String {
        match self {
            Primitive::Rc5(block) => block.parametric_version(),
            Primitive::Rc6(block) => block.parametric_version(),
        }
    }

    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, Reason> {
        bail!(
            block.len() != self.block_size(),
            Reason::PrimitiveFailure(format!(
                "block of {} bytes, expected {}",
                block.len(),
                self.block_size()
            ))
        );
        Ok(match self {
            Primitive::Rc5(b) => b.encrypt_bytes(block),
            Primitive::Rc6(b) => b.encrypt_bytes(block),
        })
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, Reason> {
        bail!(
            block.len() != self.block_size(),
            Reason::PrimitiveFailure(format!(
                "block of {} bytes, expected {}",
                block.len(),
                self.block_size()
            ))
        );
        Ok(match self {
            Primitive::Rc5(b) => b.decrypt_bytes(block),
            Primitive::Rc6(b) => b.decrypt_bytes(block),
        })
    }

    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Reason> {
        match self {
            Primitive::Rc5(b) => b.set_key(key),
            Primitive::Rc6(b) => b.set_key(key),
        }
    }
}

/// Mode tag selected by the configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTag {
    Ecb,
    Cbc,
    Pcbc,
    Cfb,
    Ofb,
    Ctr,
    RandomDelta,
}

impl ModeTag {
    /// CBC/PCBC/CFB/OFB/CTR/RandomDelta all require an IV; only ECB does not.
    pub fn requires_iv(self) -> bool {
        !matches!(self, ModeTag::Ecb)
    }

    /// Whether blocks in this mode may be processed by independent workers.
    pub fn is_parallelisable(self) -> bool {
        matches!(self, ModeTag::Ecb | ModeTag::Ctr | ModeTag::RandomDelta)
    }
}

/// Running chain state threaded across mode invocations. A fresh context
/// operation (single-shot `encrypt`/`decrypt`) starts from [`ChainState::fresh`];
/// the chunked streaming driver keeps this alive across chunk boundaries
/// so sequential modes chain correctly and counter modes keep incrementing
/// from the right block index.
#[derive(Clone)]
pub enum ChainState {
    /// ECB has no inter-block state.
    None,
    /// CBC: previous ciphertext block. CFB: previous ciphertext block.
    /// OFB: previous keystream output block `O_i`.
    Feedback(Vec<u8>),
    /// PCBC needs both the previous plaintext and previous ciphertext block.
    Pcbc { prev_pt: Vec<u8>, prev_ct: Vec<u8> },
    /// CTR/RandomDelta: the absolute index of the next block to process.
    Counter(u64),
}

impl ChainState {
    pub fn fresh(mode: ModeTag, iv: &[u8]) -> Self {
        match mode {
            ModeTag::Ecb => ChainState::None,
            ModeTag::Cbc | ModeTag::Cfb | ModeTag::Ofb => ChainState::Feedback(iv.to_vec()),
            ModeTag::Pcbc => ChainState::Pcbc {
                prev_pt: vec![0u8; iv.len()],
                prev_ct: iv.to_vec(),
            },
            ModeTag::Ctr | ModeTag::RandomDelta => ChainState::Counter(0),
        }
    }
}

fn xor_into(dst: &mut [u8], a: &[u8], b: &[u8]) {
    for i in 0..dst.len() {
        dst[i] = a[i] ^ b[i];
    }
}

/// A bounded rayon thread pool for the parallel modes, built once and
/// reused for every invocation rather than per call — a streamed file
/// drives one of these through hundreds of chunks, and standing up a new
/// `rayon::ThreadPool` on every chunk would dwarf the actual cipher work.
pub struct WorkerPool(Option<rayon::ThreadPool>);

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        // Falls back to the global pool if a bespoke one can't be built
        // (e.g. the caller asked for zero threads on a starved system).
        WorkerPool(rayon::ThreadPoolBuilder::new().num_threads(workers.max(1)).build().ok())
    }

    fn install<T: Send>(&self, f: impl FnOnce() -> T + Send) -> T {
        match &self.0 {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

/// Collect per-block parallel results, returning the first error by
/// ascending block index and discarding the rest of the batch on failure.
fn collect_blocks(results: Vec<Result<Vec<u8>, Reason>>) -> Result<Vec<u8>, Reason> {
    let mut out = Vec::new();
    for result in results {
        out.extend(result?);
    }
    Ok(out)
}

/// ECB — each block is independent, parallelisable.
pub fn ecb_encrypt(primitive: &Primitive, data: &[u8], pool: &WorkerPool) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let results = pool.install(|| {
        data.par_chunks(bs)
            .map(|block| primitive.encrypt_block(block))
            .collect::<Vec<_>>()
    });
    collect_blocks(results)
}

pub fn ecb_decrypt(primitive: &Primitive, data: &[u8], pool: &WorkerPool) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let results = pool.install(|| {
        data.par_chunks(bs)
            .map(|block| primitive.decrypt_block(block))
            .collect::<Vec<_>>()
    });
    collect_blocks(results)
}

/// CBC — `C_i = E_K(B_i XOR C_{i-1})`, sequential.
pub fn cbc_encrypt(primitive: &Primitive, state: &mut ChainState, data: &[u8]) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let ChainState::Feedback(prev) = state else {
        return Err(Reason::PrimitiveFailure("CBC requires feedback state".into()));
    };

    let mut out = Vec::with_capacity(data.len());
    let mut xored = vec![0u8; bs];
    for block in data.chunks(bs) {
        xor_into(&mut xored, block, prev);
        let ct = primitive.encrypt_block(&xored)?;
        prev.copy_from_slice(&ct);
        out.extend(ct);
    }
    Ok(out)
}

/// CBC decrypt — `B_i = D_K(C_i) XOR C_{i-1}`.
pub fn cbc_decrypt(primitive: &Primitive, state: &mut ChainState, data: &[u8]) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let ChainState::Feedback(prev) = state else {
        return Err(Reason::PrimitiveFailure("CBC requires feedback state".into()));
    };

    let mut out = Vec::with_capacity(data.len());
    for block in data.chunks(bs) {
        let decrypted = primitive.decrypt_block(block)?;
        let mut pt = vec![0u8; bs];
        xor_into(&mut pt, &decrypted, prev);
        prev.copy_from_slice(block);
        out.extend(pt);
    }
    Ok(out)
}

/// PCBC — `C_i = E_K(B_i XOR P_{i-1} XOR C_{i-1})`, sequential, not
/// parallelisable even for decryption since the plaintext feeds forward.
pub fn pcbc_encrypt(primitive: &Primitive, state: &mut ChainState, data: &[u8]) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let ChainState::Pcbc { prev_pt, prev_ct } = state else {
        return Err(Reason::PrimitiveFailure("PCBC requires pcbc state".into()));
    };

    let mut out = Vec::with_capacity(data.len());
    let mut input_block = vec![0u8; bs];
    for block in data.chunks(bs) {
        for i in 0..bs {
            input_block[i] = block[i] ^ prev_pt[i] ^ prev_ct[i];
        }
        let ct = primitive.encrypt_block(&input_block)?;
        prev_pt.copy_from_slice(block);
        prev_ct.copy_from_slice(&ct);
        out.extend(ct);
    }
    Ok(out)
}

pub fn pcbc_decrypt(primitive: &Primitive, state: &mut ChainState, data: &[u8]) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let ChainState::Pcbc { prev_pt, prev_ct } = state else {
        return Err(Reason::PrimitiveFailure("PCBC requires pcbc state".into()));
    };

    let mut out = Vec::with_capacity(data.len());
    for block in data.chunks(bs) {
        let decrypted = primitive.decrypt_block(block)?;
        let mut pt = vec![0u8; bs];
        for i in 0..bs {
            pt[i] = decrypted[i] ^ prev_pt[i] ^ prev_ct[i];
        }
        prev_pt.copy_from_slice(&pt);
        prev_ct.copy_from_slice(block);
        out.extend(pt);
    }
    Ok(out)
}

/// CFB — `C_i = B_i XOR E_K(C_{i-1})`, sequential in both directions.
pub fn cfb_encrypt(primitive: &Primitive, state: &mut ChainState, data: &[u8]) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let ChainState::Feedback(prev) = state else {
        return Err(Reason::PrimitiveFailure("CFB requires feedback state".into()));
    };

    let mut out = Vec::with_capacity(data.len());
    for block in data.chunks(bs) {
        let keystream = primitive.encrypt_block(prev)?;
        let mut ct = vec![0u8; bs];
        xor_into(&mut ct, block, &keystream);
        prev.copy_from_slice(&ct);
        out.extend(ct);
    }
    Ok(out)
}

pub fn cfb_decrypt(primitive: &Primitive, state: &mut ChainState, data: &[u8]) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let ChainState::Feedback(prev) = state else {
        return Err(Reason::PrimitiveFailure("CFB requires feedback state".into()));
    };

    let mut out = Vec::with_capacity(data.len());
    for block in data.chunks(bs) {
        let keystream = primitive.encrypt_block(prev)?;
        let mut pt = vec![0u8; bs];
        xor_into(&mut pt, block, &keystream);
        prev.copy_from_slice(block);
        out.extend(pt);
    }
    Ok(out)
}

/// OFB — `O_i = E_K(O_{i-1})`, `C_i = B_i XOR O_i`; encrypt and decrypt are
/// the same keystream-XOR operation.
pub fn ofb_apply(primitive: &Primitive, state: &mut ChainState, data: &[u8]) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(
        data.is_empty() || data.len() % bs != 0,
        Reason::InvalidInput(data.len(), bs)
    );
    let ChainState::Feedback(prev) = state else {
        return Err(Reason::PrimitiveFailure("OFB requires feedback state".into()));
    };

    let mut out = Vec::with_capacity(data.len());
    for block in data.chunks(bs) {
        let keystream = primitive.encrypt_block(prev)?;
        let mut ct = vec![0u8; bs];
        xor_into(&mut ct, block, &keystream);
        prev.copy_from_slice(&keystream);
        out.extend(ct);
    }
    Ok(out)
}

/// Big-integer counter arithmetic: `(IV + index * delta) mod 2^(8*block_size)`,
/// computed with true big-integer addition rather than a per-byte
/// multiplier-carry approximation. `delta = None` means CTR's plain
/// `IV + index`; an all-zero `delta` is rejected at context construction,
/// not special-cased here — `Some` always honors the formula literally,
/// including when it happens to evaluate to a constant.
fn counter_block(iv: &[u8], delta: Option<&[u8]>, index: u64) -> Vec<u8> {
    let n = iv.len();
    let modulus = BigUint::from(1u8) << (8 * n);
    let base = BigUint::from_bytes_be(iv);
    let offset = match delta {
        Some(d) => BigUint::from_bytes_be(d) * BigUint::from(index),
        None => BigUint::from(index),
    };
    let value = (base + offset) % &modulus;

    let mut bytes = value.to_bytes_be();
    if bytes.len() < n {
        let mut padded = vec![0u8; n - bytes.len()];
        padded.append(&mut bytes);
        bytes = padded;
    }
    bytes
}

/// CTR — `C_i = B_i XOR E_K(IV + i)`, parallelisable, keystream
/// precomputable. `base_index` lets the streaming driver continue the
/// counter across chunk boundaries.
pub fn ctr_apply(
    primitive: &Primitive,
    iv: &[u8],
    base_index: u64,
    data: &[u8],
    pool: &WorkerPool,
) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(data.is_empty(), Reason::InvalidInput(data.len(), bs));

    let results = pool.install(|| {
        data.par_chunks(bs)
            .enumerate()
            .map(|(i, block)| {
                let counter = counter_block(iv, None, base_index + i as u64);
                let keystream = primitive.encrypt_block(&counter)?;
                let mut ct = vec![0u8; block.len()];
                xor_into(&mut ct, block, &keystream[..block.len()]);
                Ok(ct)
            })
            .collect::<Vec<_>>()
    });
    collect_blocks(results)
}

/// RandomDelta — `C_i = B_i XOR E_K(IV + i*delta)`, parallelisable,
/// 0-based per-block index like CTR (block 0 uses `IV + 0*delta = IV`).
pub fn random_delta_apply(
    primitive: &Primitive,
    iv: &[u8],
    delta: &[u8],
    base_index: u64,
    data: &[u8],
    pool: &WorkerPool,
) -> Result<Vec<u8>, Reason> {
    let bs = primitive.block_size();
    bail!(data.is_empty(), Reason::InvalidInput(data.len(), bs));
    bail!(delta.len() != bs, Reason::RandomDeltaInvalid(bs));

    let results = pool.install(|| {
        data.par_chunks(bs)
            .enumerate()
            .map(|(i, block)| {
                let counter = counter_block(iv, Some(delta), base_index + i as u64);
                let keystream = primitive.encrypt_block(&counter)?;
                let mut ct = vec![0u8; block.len()];
                xor_into(&mut ct, block, &keystream[..block.len()]);
                Ok(ct)
            })
            .collect::<Vec<_>>()
    });
    collect_blocks(results)
}
