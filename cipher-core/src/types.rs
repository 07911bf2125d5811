use rand::Rng;

/// A core trait defining a word in `N`-sized blocks of a block cipher. This
/// word must support the arithmetic and binary operations required by the
/// RC5 key schedule and round function.
///
/// Implemented for `u16`, `u32` and `u64` — the three word sizes RC5
/// supports. RC6 fixes its word size to 32 bits and operates on raw
/// `u32`s directly rather than through this trait (see [`crate::rc6`]).
pub trait Word: Clone + Copy + std::ops::BitXor<Output = Self> {
    /// A constant zero value for a `Word` type.
    const ZERO: Self;

    /// Number of bytes in this word.
    const BYTES: usize;

    /// Magic constant `P`, used in RC5 key expansion.
    const P: Self;

    /// Magic constant `Q`, used in RC5 key expansion.
    const Q: Self;

    /// Cast an 8-bit value to this word type.
    fn from_u8(val: u8) -> Self;

    /// Parse this word from a little-endian byte slice of length `BYTES`.
    ///
    /// Returns `None` if the slice length is not equal to `Word::BYTES`.
    fn from_bytes_slice(slice: &[u8]) -> Option<Self>;

    /// Serialize this word to a little-endian byte vector.
    fn to_bytes_slice(&self) -> Vec<u8>;

    /// Generate a random word using the given RNG.
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Wrapping addition, modulo `2^BYTES*8`.
    fn wrapping_add(self, val: Self) -> Self;

    /// Wrapping subtraction, modulo `2^BYTES*8`.
    fn wrapping_sub(self, val: Self) -> Self;

    /// Left bitwise rotation; the shift amount is reduced modulo the word
    /// width by the implementation.
    fn rotate_left(self, bits: Self) -> Self;

    /// Right bitwise rotation; the shift amount is reduced modulo the word
    /// width by the implementation.
    fn rotate_right(self, bits: Self) -> Self;

    /// This word as a `usize`, used to index rotation amounts.
    fn as_usize(self) -> usize;
}

macro_rules! magic_consts {
    (u16) => {
        const P: u16 = 0xb7e1;
        const Q: u16 = 0x9e37;
    };
    (u32) => {
        const P: u32 = 0xb7e15163;
        const Q: u32 = 0x9e3779b9;
    };
    (u64) => {
        const P: u64 = 0xb7e151628aed2a6b;
        const Q: u64 = 0x9e3779b97f4a7c15;
    };
}

macro_rules! impl_word_for_prim {
    ($($t:ident),*) => {
        $(
            impl Word for $t {
                const ZERO: $t = 0;
                const BYTES: usize = (<$t>::BITS / 8) as usize;

                magic_consts!($t);

                #[inline]
                fn from_u8(val: u8) -> Self {
                    val as $t
                }

                #[inline]
                fn from_bytes_slice(slice: &[u8]) -> Option<Self> {
                    slice.try_into().ok().map(<$t>::from_le_bytes)
                }

                #[inline]
                fn to_bytes_slice(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }

                #[inline]
                fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
                    rng.r#gen()
                }

                #[inline]
                fn wrapping_add(self, other: Self) -> Self {
                    <$t>::wrapping_add(self, other)
                }

                #[inline]
                fn wrapping_sub(self, other: Self) -> Self {
                    <$t>::wrapping_sub(self, other)
                }

                #[inline]
                fn rotate_left(self, bits: Self) -> Self {
                    <$t>::rotate_left(self, (bits % (<$t>::BITS as $t)) as u32)
                }

                #[inline]
                fn rotate_right(self, bits: Self) -> Self {
                    <$t>::rotate_right(self, (bits % (<$t>::BITS as $t)) as u32)
                }

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    }
}

impl_word_for_prim!(u16, u32, u64);

/// A parametric RC5 version tag, rendered as `RC5-w/r/b`.
pub struct Version {
    word_bits: u16,
    rounds: u8,
    key_bytes: u8,
}

impl Version {
    pub fn new(word_bits: u16, rounds: u8, key_bytes: u8) -> Self {
        Self {
            word_bits,
            rounds,
            key_bytes,
        }
    }

    pub fn version(&self) -> String {
        format!("RC5-{}/{}/{}", self.word_bits, self.rounds, self.key_bytes)
    }
}
