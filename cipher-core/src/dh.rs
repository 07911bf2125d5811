//! Finite-field Diffie-Hellman key agreement: safe-prime generation,
//! private/public key pairs, and shared-secret derivation. The safe-prime
//! search is a from-scratch Miller-Rabin test over `BigUint::modpow`,
//! built on `num-bigint-dig` (feature `prime`).

use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{Rng, thread_rng};

use crate::Reason;

/// Fixed generator.
pub const GENERATOR: u8 = 2;

/// Miller-Rabin witness rounds for the safe-prime search below. 40 rounds
/// gives a false-positive probability below `2^-80`, the same margin
/// RSA-style key generators aim for.
const MILLER_RABIN_ROUNDS: usize = 40;

/// Miller-Rabin probable-primality test, built directly on `BigUint`'s
/// modular exponentiation rather than a library primality routine.
fn is_probably_prime(n: &BigUint, rounds: usize, rng: &mut impl Rng) -> bool {
    let zero = BigUint::zero();
    let one = BigUint::one();
    let two = BigUint::from(2u8);
    let three = BigUint::from(3u8);

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if (n % &two) == zero {
        return false;
    }

    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while (&d % &two) == zero {
        d /= &two;
        r += 1;
    }

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &(n - &two));
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generate a safe prime `p = 2q + 1` of the requested bit length, where
/// both `q` and `p` are probable primes. Candidates are drawn uniformly
/// from the top bit set (to guarantee the requested bit length) and the
/// low bit set (to guarantee oddness), and retried until both primality
/// checks pass.
pub fn generate_prime(bits: usize) -> Result<BigUint, Reason> {
    if bits < 8 {
        return Err(Reason::InvalidDhParameter(format!(
            "prime bit length {bits} is too small to be useful"
        )));
    }
    let mut rng = thread_rng();
    let q_bits = bits - 1;

    loop {
        let mut q = rng.gen_biguint(q_bits);
        q.set_bit((q_bits - 1) as u64, true);
        q.set_bit(0, true);

        if !is_probably_prime(&q, MILLER_RABIN_ROUNDS, &mut rng) {
            continue;
        }

        let p = &q * BigUint::from(2u8) + BigUint::one();
        if is_probably_prime(&p, MILLER_RABIN_ROUNDS, &mut rng) {
            return Ok(p);
        }
    }
}

/// One party's half of a Diffie-Hellman exchange: the shared prime/
/// generator, a private scalar, and the derived public value.
pub struct DhPrivateKey {
    prime: BigUint,
    generator: BigUint,
    private: BigUint,
    public: BigUint,
}

impl DhPrivateKey {
    /// Choose a private scalar uniformly in `[2, p-2]` and derive the
    /// public value `g^a mod p`.
    pub fn generate(prime: &BigUint) -> Result<Self, Reason> {
        let two = BigUint::from(2u8);
        if *prime <= BigUint::from(4u8) {
            return Err(Reason::InvalidDhParameter("prime is too small for DH".into()));
        }
        let upper = prime - &two; // exclusive upper bound for [2, p-2]
        let mut rng = thread_rng();
        let private = &two + rng.gen_biguint_below(&(upper - &two + BigUint::one()));
        let generator = BigUint::from(GENERATOR);
        let public = generator.modpow(&private, prime);

        Ok(Self {
            prime: prime.clone(),
            generator,
            private,
            public,
        })
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    pub fn public_value(&self) -> &BigUint {
        &self.public
    }

    /// The private scalar. Exposed so a caller can persist it (e.g. to a
    /// local key file) and reconstruct the session later — this module
    /// does not define a persistence format itself.
    pub fn private_scalar(&self) -> &BigUint {
        &self.private
    }

    /// Raw big-endian shared-secret bytes `peer_public^a mod p`. The raw
    /// bytes are the shared secret itself — no further hashing happens
    /// here.
    pub fn shared_secret(&self, peer_public: &BigUint) -> Vec<u8> {
        peer_public.modpow(&self.private, &self.prime).to_bytes_be()
    }
}

/// Truncate-or-zero-pad a raw shared secret to the key length the chosen
/// block primitive requires. No KDF is applied; see `DESIGN.md` for the
/// follow-up to replace this with a proper key-derivation function.
pub fn derive_key(shared_secret: &[u8], key_len: usize) -> Vec<u8> {
    if shared_secret.len() >= key_len {
        shared_secret[shared_secret.len() - key_len..].to_vec()
    } else {
        let mut padded = vec![0u8; key_len - shared_secret.len()];
        padded.extend_from_slice(shared_secret);
        padded
    }
}
