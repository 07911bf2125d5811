use zeroize::Zeroize;

use crate::{BlockCipher, Reason, bail};

const W: u32 = 32;
const ROUNDS: u32 = 20;
const TABLE_SIZE: usize = 2 * (ROUNDS as usize + 2);

/// RC6 control block: fixed `w=32`, `r=20`, 16-byte block, key length in
/// `{16,24,32}` bytes.
///
/// RC6 is not generic over word size — the algorithm fixes `w=32` — so
/// this type works directly with `u32` rather than through the `Word`
/// trait.
pub struct RC6ControlBlock {
    s_table: Vec<u32>,
    key_len: usize,
}

impl RC6ControlBlock {
    /// Construct an RC6 control block. Fails with
    /// [`Reason::InvalidKeyLength`] unless `key.len()` is 16, 24 or 32.
    pub fn new(key: &[u8]) -> Result<Self, Reason> {
        bail!(
            !matches!(key.len(), 16 | 24 | 32),
            Reason::InvalidKeyLength {
                current: key.len(),
                expected: "16, 24 or 32",
            }
        );

        Ok(Self {
            s_table: expand_key(key),
            key_len: key.len(),
        })
    }

    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Re-derive the expanded S-table from a new key.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Reason> {
        bail!(
            !matches!(key.len(), 16 | 24 | 32),
            Reason::InvalidKeyLength {
                current: key.len(),
                expected: "16, 24 or 32",
            }
        );
        self.s_table.zeroize();
        self.s_table = expand_key(key);
        self.key_len = key.len();
        Ok(())
    }

    pub fn parametric_version(&self) -> String {
        format!("RC6-32/20/{}", self.key_len)
    }

    pub fn encrypt_bytes(&self, block: &[u8]) -> Vec<u8> {
        let words = unpack_words(block);
        let ct = self.encrypt(words);
        pack_words(ct)
    }

    pub fn decrypt_bytes(&self, block: &[u8]) -> Vec<u8> {
        let words = unpack_words(block);
        let pt = self.decrypt(words);
        pack_words(pt)
    }
}

impl BlockCipher<u32, 4> for RC6ControlBlock {
    fn control_block_version(&self) -> String {
        self.parametric_version()
    }

    fn block_size(&self) -> usize {
        16
    }

    fn encrypt(&self, pt: [u32; 4]) -> [u32; 4] {
        let s = &self.s_table;
        let [mut a, mut b, mut c, mut d] = pt;

        b = b.wrapping_add(s[0]);
        d = d.wrapping_add(s[1]);

        for i in 1..=ROUNDS as usize {
            let t = b.wrapping_mul(2u32.wrapping_mul(b).wrapping_add(1)).rotate_left(5);
            let u = d.wrapping_mul(2u32.wrapping_mul(d).wrapping_add(1)).rotate_left(5);

            a = (a ^ t).rotate_left(u & 31).wrapping_add(s[2 * i]);
            c = (c ^ u).rotate_left(t & 31).wrapping_add(s[2 * i + 1]);

            (a, b, c, d) = (b, c, d, a);
        }

        a = a.wrapping_add(s[2 * ROUNDS as usize + 2]);
        c = c.wrapping_add(s[2 * ROUNDS as usize + 3]);

        [a, b, c, d]
    }

    fn decrypt(&self, ct: [u32; 4]) -> [u32; 4] {
        let s = &self.s_table;
        let [mut a, mut b, mut c, mut d] = ct;

        c = c.wrapping_sub(s[2 * ROUNDS as usize + 3]);
        a = a.wrapping_sub(s[2 * ROUNDS as usize + 2]);

        for i in (1..=ROUNDS as usize).rev() {
            (a, b, c, d) = (d, a, b, c);

            let u = d.wrapping_mul(2u32.wrapping_mul(d).wrapping_add(1)).rotate_left(5);
            let t = b.wrapping_mul(2u32.wrapping_mul(b).wrapping_add(1)).rotate_left(5);

            c = (c.wrapping_sub(s[2 * i + 1])).rotate_right(t & 31) ^ u;
            a = (a.wrapping_sub(s[2 * i])).rotate_right(u & 31) ^ t;
        }

        d = d.wrapping_sub(s[1]);
        b = b.wrapping_sub(s[0]);

        [a, b, c, d]
    }
}

impl Drop for RC6ControlBlock {
    fn drop(&mut self) {
        self.s_table.zeroize();
    }
}

fn unpack_words(block: &[u8]) -> [u32; 4] {
    [
        u32::from_le_bytes(block[0..4].try_into().unwrap()),
        u32::from_le_bytes(block[4..8].try_into().unwrap()),
        u32::from_le_bytes(block[8..12].try_into().unwrap()),
        u32::from_le_bytes(block[12..16].try_into().unwrap()),
    ]
}

fn pack_words(words: [u32; 4]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// RC6 key expansion — identical shape to RC5's, over the fixed `w=32`
/// word size and table length `2*(r+2)=44`.
fn expand_key(key: &[u8]) -> Vec<u32> {
    const P32: u32 = 0xb7e1_5163;
    const Q32: u32 = 0x9e37_79b9;

    let key_length = key.len().max(1);
    let expanded_length = key_length.div_ceil(4);
    let mut key_words = vec![0u32; expanded_length];

    for index in (0..key.len()).rev() {
        let ix = index / 4;
        key_words[ix] = key_words[ix].rotate_left(8).wrapping_add(key[index] as u32);
    }

    let mut s_table = vec![0u32; TABLE_SIZE];
    s_table[0] = P32;
    for i in 1..TABLE_SIZE {
        s_table[i] = s_table[i - 1].wrapping_add(Q32);
    }

    let (mut i, mut j) = (0, 0);
    let (mut a, mut b) = (0u32, 0u32);

    for _ in 0..(3 * TABLE_SIZE.max(expanded_length)) {
        a = s_table[i].wrapping_add(a).wrapping_add(b).rotate_left(3);
        b = key_words[j]
            .wrapping_add(a)
            .wrapping_add(b)
            .rotate_left((a.wrapping_add(b)) & (W - 1));

        s_table[i] = a;
        key_words[j] = b;

        i = (i + 1) % TABLE_SIZE;
        j = (j + 1) % expanded_length;
    }

    s_table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc6_32_20_16_known_answer_vector() {
        // Published RC6 test vector: all-zero 128-bit key and plaintext.
        let key = [0u8; 16];
        let plaintext = [0u8; 16];
        let expected = "8FC3A53656B1F778C129DF4E9848A41E";

        let block = RC6ControlBlock::new(&key).unwrap();
        let ct = block.encrypt_bytes(&plaintext);
        assert_eq!(hex::encode_upper(&ct), expected);

        let pt = block.decrypt_bytes(&ct);
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn round_trip_for_all_key_lengths() {
        for key_len in [16, 24, 32] {
            let key = vec![0x11u8; key_len];
            let block = RC6ControlBlock::new(&key).unwrap();
            let pt = [0x33u8; 16];
            let ct = block.encrypt_bytes(&pt);
            assert_eq!(ct.len(), 16);
            assert_eq!(block.decrypt_bytes(&ct), pt);
        }
    }

    #[test]
    fn rejects_bad_key_length() {
        let result = RC6ControlBlock::new(&[0u8; 20]);
        assert!(matches!(result, Err(Reason::InvalidKeyLength { .. })));
    }
}
