use std::array::from_fn;

use rand::thread_rng;

use crate::types::Word;

/// Rotate `x` left by `n` bits, modulo the word width.
#[inline]
pub fn rotl<W: Word>(x: W, n: W) -> W {
    x.rotate_left(n)
}

/// Rotate `x` right by `n` bits, modulo the word width.
#[inline]
pub fn rotr<W: Word>(x: W, n: W) -> W {
    x.rotate_right(n)
}

/// Pack a little-endian byte slice into a sequence of words. The final
/// word is zero-extended if `bytes.len()` is not a multiple of `W::BYTES`.
pub fn bytes_to_words<W: Word>(bytes: &[u8]) -> Vec<W> {
    let word_bytes = W::BYTES;
    let num_words = bytes.len().div_ceil(word_bytes);
    let mut words = Vec::with_capacity(num_words);

    for chunk_start in (0..num_words).map(|i| i * word_bytes) {
        let end = (chunk_start + word_bytes).min(bytes.len());
        let mut buf = vec![0u8; word_bytes];
        buf[..end - chunk_start].copy_from_slice(&bytes[chunk_start..end]);
        words.push(W::from_bytes_slice(&buf).expect("buffer is exactly word-sized"));
    }

    words
}

/// Unpack a single word into little-endian bytes.
pub fn word_to_bytes<W: Word>(word: W) -> Vec<u8> {
    word.to_bytes_slice()
}

/// Generate a pseudo-random IV of `[W; N]`.
pub fn random_iv<W, const N: usize>() -> [W; N]
where
    W: Word,
{
    let mut rng = thread_rng();
    from_fn(|_| W::random(&mut rng))
}

/// Generate a pseudo-random block-sized IV as raw bytes.
pub fn random_iv_bytes(block_size: usize) -> Vec<u8> {
    let mut rng = thread_rng();
    let mut iv = vec![0u8; block_size];
    rand::RngCore::fill_bytes(&mut rng, &mut iv);
    iv
}

/// Generate a pseudo-random block of `N` words where the last word is zero
/// (suitable as a CTR-mode nonce/counter seed).
pub fn random_nonce_and_counter<W, const N: usize>() -> [W; N]
where
    W: Word,
{
    let mut rng = thread_rng();
    from_fn(|i| if i == N - 1 { W::ZERO } else { W::random(&mut rng) })
}
