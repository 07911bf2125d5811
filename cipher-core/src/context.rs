//! `CipherContext` — owns a block primitive, mode, padding, IV and the
//! optional Random-Delta vector; the single place where single-shot and
//! chunked operations are driven. Dispatch runs through a tagged
//! [`Primitive`] enum instead of an interface value, with the mode switch
//! collapsed into `modes.rs` rather than repeated per operation.

use std::num::NonZeroUsize;

use crate::modes::{self, ChainState, ModeTag, Primitive, WorkerPool};
use crate::padding::{self, Padding};
use crate::{Reason, bail};

/// A symmetric cipher session: one primitive, one mode, one padding
/// scheme, for the lifetime of a room.
pub struct CipherContext {
    primitive: Primitive,
    mode: ModeTag,
    padding: Padding,
    iv: Vec<u8>,
    delta: Option<Vec<u8>>,
    block_size: usize,
    workers: usize,
    pool: WorkerPool,
    state: ChainState,
}

impl CipherContext {
    /// Construct a context, validating: (i) `block_size` matches the
    /// primitive's native block size, (ii) an IV of exactly `block_size`
    /// bytes is required for every mode but ECB, (iii) RandomDelta
    /// requires a `block_size`-length, non-zero delta.
    pub fn new(
        primitive: Primitive,
        mode: ModeTag,
        padding: Padding,
        iv: Option<Vec<u8>>,
        delta: Option<Vec<u8>>,
    ) -> Result<Self, Reason> {
        let block_size = primitive.block_size();

        let iv = if mode.requires_iv() {
            let iv = iv.ok_or(Reason::IvInvalid(block_size))?;
            bail!(iv.len() != block_size, Reason::IvInvalid(block_size));
            iv
        } else {
            vec![0u8; block_size]
        };

        if mode == ModeTag::RandomDelta {
            let delta = delta.as_ref().ok_or(Reason::RandomDeltaMissing)?;
            bail!(
                delta.len() != block_size,
                Reason::RandomDeltaInvalid(block_size),
                delta.iter().all(|b| *b == 0),
                Reason::RandomDeltaInvalid(block_size),
            );
        }

        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let pool = WorkerPool::new(workers);

        let state = ChainState::fresh(mode, &iv);

        Ok(Self {
            primitive,
            mode,
            padding,
            iv,
            delta,
            block_size,
            workers,
            pool,
            state,
        })
    }

    /// Override the default worker count (default: hardware concurrency),
    /// rebuilding the bounded thread pool to match.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.pool = WorkerPool::new(self.workers);
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn mode(&self) -> ModeTag {
        self.mode
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.primitive.algorithm_name()
    }

    pub fn parametric_version(&self) -> String {
        self.primitive.parametric_version()
    }

    /// Re-key the underlying primitive and reset the running chain state.
    /// Callers must serialise calls to this against any in-flight
    /// operation.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Reason> {
        self.primitive.set_key(key)?;
        self.reset();
        Ok(())
    }

    /// Rewind the running chain state back to the original IV — every
    /// single-shot `encrypt`/`decrypt` call starts from a fresh state so
    /// repeated calls under the same context are independent of each
    /// other and deterministic.
    fn reset(&mut self) {
        self.state = ChainState::fresh(self.mode, &self.iv);
    }

    /// Single-shot encrypt: pad the whole buffer, then apply the mode over
    /// the complete, freshly-reset chain state.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, Reason> {
        self.reset();
        let mut buf = plaintext.to_vec();
        padding::pad(&mut buf, self.block_size, self.padding)?;
        self.apply_encrypt(&buf)
    }

    /// Single-shot decrypt: apply the mode, then strip padding from the
    /// final block.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, Reason> {
        self.reset();
        bail!(
            ciphertext.is_empty() || ciphertext.len() % self.block_size != 0,
            Reason::InvalidInput(ciphertext.len(), self.block_size)
        );
        let mut buf = self.apply_decrypt(ciphertext)?;
        padding::strip(&mut buf, self.block_size, self.padding)?;
        Ok(buf)
    }

    /// Process one chunk of a streamed buffer without resetting state.
    /// Padding is applied only when `is_final`. Used by [`crate::stream`];
    /// not reset between calls so the running IV/counter threads across
    /// chunk boundaries.
    pub(crate) fn encrypt_chunk(&mut self, data: &[u8], is_final: bool) -> Result<Vec<u8>, Reason> {
        let mut buf = data.to_vec();
        if is_final {
            padding::pad(&mut buf, self.block_size, self.padding)?;
        }
        self.apply_encrypt(&buf)
    }

    /// Process one ciphertext chunk; padding is stripped only on the final
    /// chunk.
    pub(crate) fn decrypt_chunk(&mut self, data: &[u8], is_final: bool) -> Result<Vec<u8>, Reason> {
        let mut buf = self.apply_decrypt(data)?;
        if is_final {
            padding::strip(&mut buf, self.block_size, self.padding)?;
        }
        Ok(buf)
    }

    fn apply_encrypt(&mut self, buf: &[u8]) -> Result<Vec<u8>, Reason> {
        match self.mode {
            ModeTag::Ecb => modes::ecb_encrypt(&self.primitive, buf, &self.pool),
            ModeTag::Cbc => modes::cbc_encrypt(&self.primitive, &mut self.state, buf),
            ModeTag::Pcbc => modes::pcbc_encrypt(&self.primitive, &mut self.state, buf),
            ModeTag::Cfb => modes::cfb_encrypt(&self.primitive, &mut self.state, buf),
            ModeTag::Ofb => modes::ofb_apply(&self.primitive, &mut self.state, buf),
            ModeTag::Ctr => {
                let ChainState::Counter(base) = &mut self.state else {
                    unreachable!("CTR always carries a Counter chain state")
                };
                let result = modes::ctr_apply(&self.primitive, &self.iv, *base, buf, &self.pool);
                *base += buf.len().div_ceil(self.block_size) as u64;
                result
            }
            ModeTag::RandomDelta => {
                let delta = self.delta.clone().ok_or(Reason::RandomDeltaMissing)?;
                let ChainState::Counter(base) = &mut self.state else {
                    unreachable!("RandomDelta always carries a Counter chain state")
                };
                let result = modes::random_delta_apply(&self.primitive, &self.iv, &delta, *base, buf, &self.pool);
                *base += buf.len().div_ceil(self.block_size) as u64;
                result
            }
        }
    }

    fn apply_decrypt(&mut self, buf: &[u8]) -> Result<Vec<u8>, Reason> {
        match self.mode {
            ModeTag::Ecb => modes::ecb_decrypt(&self.primitive, buf, &self.pool),
            ModeTag::Cbc => modes::cbc_decrypt(&self.primitive, &mut self.state, buf),
            ModeTag::Pcbc => modes::pcbc_decrypt(&self.primitive, &mut self.state, buf),
            ModeTag::Cfb => modes::cfb_decrypt(&self.primitive, &mut self.state, buf),
            ModeTag::Ofb => modes::ofb_apply(&self.primitive, &mut self.state, buf),
            ModeTag::Ctr => {
                let ChainState::Counter(base) = &mut self.state else {
                    unreachable!("CTR always carries a Counter chain state")
                };
                let result = modes::ctr_apply(&self.primitive, &self.iv, *base, buf, &self.pool);
                *base += buf.len().div_ceil(self.block_size) as u64;
                result
            }
            ModeTag::RandomDelta => {
                let delta = self.delta.clone().ok_or(Reason::RandomDeltaMissing)?;
                let ChainState::Counter(base) = &mut self.state else {
                    unreachable!("RandomDelta always carries a Counter chain state")
                };
                let result = modes::random_delta_apply(&self.primitive, &self.iv, &delta, *base, buf, &self.pool);
                *base += buf.len().div_ceil(self.block_size) as u64;
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rc6::RC6ControlBlock;

    fn rc6_context(mode: ModeTag, padding: Padding, iv: Option<Vec<u8>>, delta: Option<Vec<u8>>) -> CipherContext {
        let primitive = Primitive::Rc6(RC6ControlBlock::new(&[0x11u8; 16]).unwrap());
        CipherContext::new(primitive, mode, padding, iv, delta).unwrap()
    }

    #[test]
    fn scenario_rc6_cbc_pkcs7_one_data_block_one_pad_block() {
        let mut ctx = rc6_context(ModeTag::Cbc, Padding::Pkcs7, Some(vec![0x22u8; 16]), None);
        let plaintext = vec![0x33u8; 16];

        let ct = ctx.encrypt(&plaintext).unwrap();
        assert_eq!(ct.len(), 32);

        let pt = ctx.decrypt(&ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn scenario_rc5_ecb_pkcs7_hello() {
        let primitive = Primitive::Rc5(crate::rc5::RC5ControlBlock::<u64>::new_fixed(&[0u8; 64]).unwrap());
        let mut ctx = CipherContext::new(primitive, ModeTag::Ecb, Padding::Pkcs7, None, None).unwrap();

        let ct = ctx.encrypt(b"hello").unwrap();
        assert_eq!(ct.len(), 16);
        assert_eq!(ctx.decrypt(&ct).unwrap(), b"hello");
    }

    #[test]
    fn repeated_single_shot_calls_are_deterministic() {
        let mut ctx = rc6_context(ModeTag::Cfb, Padding::Pkcs7, Some(vec![0x01u8; 16]), None);
        let plaintext = b"the quick brown fox jumps".to_vec();

        let first = ctx.encrypt(&plaintext).unwrap();
        let second = ctx.encrypt(&plaintext).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_iv_for_cbc_is_rejected() {
        let primitive = Primitive::Rc6(RC6ControlBlock::new(&[0x11u8; 16]).unwrap());
        let result = CipherContext::new(primitive, ModeTag::Cbc, Padding::Pkcs7, None, None);
        assert!(matches!(result, Err(Reason::IvInvalid(16))));
    }

    #[test]
    fn missing_delta_for_random_delta_is_rejected() {
        let primitive = Primitive::Rc6(RC6ControlBlock::new(&[0x11u8; 16]).unwrap());
        let result = CipherContext::new(primitive, ModeTag::RandomDelta, Padding::Pkcs7, Some(vec![0u8; 16]), None);
        assert!(matches!(result, Err(Reason::RandomDeltaMissing)));
    }

    #[test]
    fn all_zero_delta_for_random_delta_is_rejected() {
        let primitive = Primitive::Rc6(RC6ControlBlock::new(&[0x11u8; 16]).unwrap());
        let result = CipherContext::new(
            primitive,
            ModeTag::RandomDelta,
            Padding::Pkcs7,
            Some(vec![0u8; 16]),
            Some(vec![0u8; 16]),
        );
        assert!(matches!(result, Err(Reason::RandomDeltaInvalid(16))));
    }

    #[test]
    fn set_key_resets_chain_state() {
        let mut ctx = rc6_context(ModeTag::Cbc, Padding::Pkcs7, Some(vec![0x22u8; 16]), None);
        let plaintext = vec![0x33u8; 32];
        let before = ctx.encrypt(&plaintext).unwrap();

        ctx.set_key(&[0x11u8; 16]).unwrap();
        let after = ctx.encrypt(&plaintext).unwrap();
        assert_eq!(before, after);
    }
}
