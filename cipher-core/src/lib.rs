//! # cipher-core
//!
//! The cryptographic core of a peer-to-peer encrypted messaging system:
//! RC5 and RC6 block ciphers, a pluggable block-cipher-mode layer (ECB,
//! CBC, PCBC, CFB, OFB, CTR, RandomDelta), four padding schemes (Zeros,
//! ANSI X.923, PKCS#7, ISO 10126), a chunked file-streaming driver, and
//! finite-field Diffie-Hellman key agreement.
//!
//! This crate generalises `rc5-rs::rc5_block` (single cipher, three
//! modes, PKCS7-only) into a configuration-driven [`CipherContext`] that
//! drives either primitive through any supported mode/padding
//! combination, plus the chunked streaming and key-agreement layers a
//! messaging client needs around it.
//!
//! ## Example
//!
//! ```rust
//! use cipher_core::config::{Algorithm, Config};
//! use cipher_core::modes::ModeTag;
//! use cipher_core::padding::Padding;
//!
//! let mut ctx = Config {
//!     algorithm: Algorithm::Rc6,
//!     mode: ModeTag::Cbc,
//!     padding: Padding::Pkcs7,
//!     key: vec![0x11u8; 16],
//!     iv: Some(vec![0x22u8; 16]),
//!     random_delta: None,
//! }
//! .build()
//! .unwrap();
//!
//! let ciphertext = ctx.encrypt(b"hello, room").unwrap();
//! assert_eq!(ctx.decrypt(&ciphertext).unwrap(), b"hello, room");
//! ```

pub use crate::config::{Algorithm, Config};
pub use crate::context::CipherContext;
pub use crate::dh::{DhPrivateKey, GENERATOR};
pub use crate::error::Reason;
pub use crate::modes::{ModeTag, Primitive};
pub use crate::padding::Padding;
pub use crate::rc5::RC5ControlBlock;
pub use crate::rc6::RC6ControlBlock;
pub use crate::stream::{CancellationToken, decrypt_file, encrypt_file};
pub use crate::types::{Version, Word};
pub use crate::utils::{random_iv_bytes, random_nonce_and_counter};

pub mod config;
pub mod context;
pub mod dh;
pub mod error;
pub mod modes;
pub mod padding;
mod rc5;
mod rc6;
pub mod stream;
mod types;
mod utils;

#[cfg(test)]
mod tests;

/// A core trait every raw block-cipher primitive implements so it can be
/// driven generically by the mode layer's single-block operations.
/// [`crate::modes::Primitive`] wraps concrete implementors rather than
/// boxing this trait, but the trait itself is still the seam between a
/// control block and its raw encrypt/decrypt.
///
/// Generics:
/// - `W`: the word type implementing [`Word`].
/// - `N`: words per block (2 for RC5; RC6 works in raw bytes instead,
///   see [`crate::rc6::RC6ControlBlock`]).
pub trait BlockCipher<W: Word, const N: usize> {
    /// Human-readable parametric version, e.g. `"RC5-64/12/64"`.
    fn control_block_version(&self) -> String;

    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Encrypt a single `[W; N]` block.
    fn encrypt(&self, pt: [W; N]) -> [W; N];

    /// Decrypt a single `[W; N]` block.
    fn decrypt(&self, ct: [W; N]) -> [W; N];
}
