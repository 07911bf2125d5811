use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::types::{Version, Word};
use crate::utils::{bytes_to_words, word_to_bytes};
use crate::{BlockCipher, Reason, bail};

const MAX_ROUNDS: usize = 255;
const MAX_KEY_BYTES: usize = 255;

/// RC5 control block: key schedule state and round count for a given word
/// size `W`.
pub struct RC5ControlBlock<W: Word> {
    version: Version,
    key: RC5Key<W>,
    rounds: usize,
}

impl<W: Word> RC5ControlBlock<W> {
    /// Construct an RC5 control block from a raw key and round count.
    /// Fails with [`Reason::InvalidKey`], [`Reason::KeyTooLong`] or
    /// [`Reason::InvalidRounds`] if the parameters are out of bounds
    /// (`w ∈ {16,32,64}`, `r ∈ [0,255]`, `b ∈ [0,255]`).
    pub fn new<K>(key: K, rounds: usize) -> Result<Self, Reason>
    where
        K: AsRef<[u8]>,
    {
        let key = RC5Key::from_raw(key, rounds)?;
        Ok(Self {
            version: Version::new((W::BYTES * 8) as u16, rounds as u8, key.raw_len() as u8),
            rounds,
            key,
        })
    }

    #[inline]
    pub fn s_table(&self) -> &[W] {
        &self.key.s_table
    }

    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// The block size in bytes, `2 * W::BYTES`.
    #[inline]
    pub fn native_block_size() -> usize {
        W::BYTES * 2
    }

    #[inline]
    pub fn parametric_version(&self) -> String {
        self.version.version()
    }

    /// Re-derive the expanded S-table from a new key, keeping the round
    /// count fixed. The context is otherwise immutable after construction.
    pub fn set_key<K>(&mut self, key: K) -> Result<(), Reason>
    where
        K: AsRef<[u8]>,
    {
        let rounds = self.rounds;
        self.key = RC5Key::from_raw(key, rounds)?;
        self.version = Version::new((W::BYTES * 8) as u16, rounds as u8, self.key.raw_len() as u8);
        Ok(())
    }

    /// Encrypt a raw byte block of exactly `block_size()` bytes.
    pub fn encrypt_bytes(&self, block: &[u8]) -> Vec<u8> {
        let words: Vec<W> = bytes_to_words(block);
        let [a, b] = self.encrypt([words[0], words[1]]);
        [word_to_bytes(a), word_to_bytes(b)].concat()
    }

    /// Decrypt a raw byte block of exactly `block_size()` bytes.
    pub fn decrypt_bytes(&self, block: &[u8]) -> Vec<u8> {
        let words: Vec<W> = bytes_to_words(block);
        let [a, b] = self.decrypt([words[0], words[1]]);
        [word_to_bytes(a), word_to_bytes(b)].concat()
    }
}

impl RC5ControlBlock<u64> {
    /// The RC5-64/12/64 instantiation required by the external
    /// configuration surface (key: exactly 64 bytes, w=64, r=12, b=64).
    pub fn new_fixed(key: &[u8; 64]) -> Result<Self, Reason> {
        Self::new(key, 12)
    }
}

impl<W: Word> BlockCipher<W, 2> for RC5ControlBlock<W> {
    fn control_block_version(&self) -> String {
        self.parametric_version()
    }

    fn block_size(&self) -> usize {
        W::BYTES * 2
    }

    fn encrypt(&self, pt: [W; 2]) -> [W; 2] {
        let s = self.s_table();
        let [mut a, mut b] = pt;

        a = a.wrapping_add(s[0]);
        b = b.wrapping_add(s[1]);

        for r in 1..=self.rounds() {
            a = (a ^ b).rotate_left(b).wrapping_add(s[2 * r]);
            b = (b ^ a).rotate_left(a).wrapping_add(s[2 * r + 1]);
        }

        [a, b]
    }

    fn decrypt(&self, ct: [W; 2]) -> [W; 2] {
        let s = self.s_table();
        let [mut a, mut b] = ct;

        for r in (1..=self.rounds()).rev() {
            b = b.wrapping_sub(s[2 * r + 1]).rotate_right(a) ^ a;
            a = a.wrapping_sub(s[2 * r]).rotate_right(b) ^ b;
        }

        b = b.wrapping_sub(s[1]);
        a = a.wrapping_sub(s[0]);

        [a, b]
    }
}

/// Internal key container: the raw key bytes and the expanded S-table.
/// Both are zeroised on drop so key material doesn't linger in memory
/// after the control block is discarded.
#[derive(ZeroizeOnDrop)]
struct RC5Key<W: Word> {
    raw_key: Vec<u8>,
    s_table: Vec<W>,
    raw_len: usize,
}

// `Word` types are plain integers; zeroize's blanket impls cover Vec<u8>
// and the integer Vec<W> is zeroed manually since `Word` is not `Zeroize`.
impl<W: Word> Zeroize for RC5Key<W> {
    fn zeroize(&mut self) {
        self.raw_key.zeroize();
        for w in self.s_table.iter_mut() {
            *w = W::ZERO;
        }
    }
}

impl<W: Word> RC5Key<W> {
    fn from_raw<K>(raw: K, rounds: usize) -> Result<Self, Reason>
    where
        K: AsRef<[u8]>,
    {
        let key_bytes = raw.as_ref();

        bail!(
            key_bytes.is_empty(),
            Reason::InvalidKey,
            key_bytes.len() > MAX_KEY_BYTES,
            Reason::KeyTooLong {
                current: key_bytes.len(),
                supported: MAX_KEY_BYTES,
            },
            rounds > MAX_ROUNDS,
            Reason::InvalidRounds(rounds),
        );

        Ok(Self {
            s_table: expand_key::<W>(key_bytes, rounds),
            raw_len: key_bytes.len(),
            raw_key: key_bytes.to_vec(),
        })
    }

    fn raw_len(&self) -> usize {
        self.raw_len
    }
}

/// RC5 key expansion: builds the `S`-table from the magic constants and
/// mixes in the user key.
fn expand_key<W: Word>(key: &[u8], rounds: usize) -> Vec<W> {
    let word_bytes = W::BYTES;
    let key_length = key.len().max(1);
    let expanded_length = key_length.div_ceil(word_bytes);

    let mut key_words = vec![W::ZERO; expanded_length];
    for index in (0..key.len()).rev() {
        let ix = index / word_bytes;
        key_words[ix] = key_words[ix]
            .rotate_left(W::from_u8(8))
            .wrapping_add(W::from_u8(key[index]));
    }

    let table_size = 2 * (rounds + 1);
    let mut s_table = vec![W::ZERO; table_size];
    s_table[0] = W::P;
    for i in 1..table_size {
        s_table[i] = s_table[i - 1].wrapping_add(W::Q);
    }

    let (mut i, mut j) = (0, 0);
    let (mut a, mut b) = (W::ZERO, W::ZERO);

    for _ in 0..(3 * table_size.max(expanded_length)) {
        a = s_table[i].wrapping_add(a).wrapping_add(b).rotate_left(W::from_u8(3));
        b = key_words[j]
            .wrapping_add(a)
            .wrapping_add(b)
            .rotate_left(a.wrapping_add(b));

        s_table[i] = a;
        key_words[j] = b;

        i = (i + 1) % table_size;
        j = (j + 1) % expanded_length;
    }

    s_table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc5_32_12_16_known_answer_vectors() {
        // https://github.com/cantora/avr-crypto-lib/blob/master/testvectors/Rc5-128-64.verified.test-vectors
        let cases: &[(u128, &str)] = &[
            (0x80000000000000000000000000000000, "8F681D7F285CDC2F"),
            (0x40000000000000000000000000000000, "DC14832CF4FE61A8"),
            (0x20000000000000000000000000000000, "2F2494A0D96958E7"),
        ];

        for (key, expected) in cases {
            let key_bytes = key.to_be_bytes();
            let block = RC5ControlBlock::<u32>::new(key_bytes, 12).unwrap();
            let ct = block.encrypt([0u32, 0u32]);
            let bytes: Vec<u8> = ct.iter().flat_map(|w| w.to_le_bytes()).collect();
            assert_eq!(hex::encode_upper(&bytes), *expected);

            let pt = block.decrypt(ct);
            assert_eq!(pt, [0u32, 0u32]);
        }
    }

    #[test]
    fn round_trip_across_word_sizes() {
        macro_rules! round_trip {
            ($w:ty, $key:expr, $rounds:expr) => {{
                let block = RC5ControlBlock::<$w>::new($key, $rounds).unwrap();
                let pt = [<$w>::MAX / 3, <$w>::MAX / 7];
                let ct = block.encrypt(pt);
                assert_eq!(block.decrypt(ct), pt);
            }};
        }

        round_trip!(u16, [0u8; 8], 8);
        round_trip!(u32, [0u8; 16], 12);
        round_trip!(u64, [0u8; 24], 20);
    }

    #[test]
    fn rejects_empty_key() {
        let result = RC5ControlBlock::<u32>::new([], 12);
        assert!(matches!(result, Err(Reason::InvalidKey)));
    }

    #[test]
    fn rejects_excess_rounds() {
        let result = RC5ControlBlock::<u32>::new([0u8; 16], 300);
        assert!(matches!(result, Err(Reason::InvalidRounds(300))));
    }
}
