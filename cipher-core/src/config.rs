//! Configuration surface: case-insensitive string parsing for
//! `algorithm`/`mode`/`padding`, and a `Config` -> `CipherContext`
//! builder.

use crate::context::CipherContext;
use crate::modes::{ModeTag, Primitive};
use crate::padding::Padding;
use crate::rc5::RC5ControlBlock;
use crate::rc6::RC6ControlBlock;
use crate::{Reason, bail};

/// Block-cipher algorithm named by the configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Rc5,
    Rc6,
}

/// Parse `"RC5"`/`"RC6"` case-insensitively.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, Reason> {
    match name.to_ascii_uppercase().as_str() {
        "RC5" => Ok(Algorithm::Rc5),
        "RC6" => Ok(Algorithm::Rc6),
        _ => Err(Reason::UnsupportedAlgorithm(name.to_string())),
    }
}

/// Parse a mode tag.
pub fn parse_mode(name: &str) -> Result<ModeTag, Reason> {
    match name.to_ascii_uppercase().as_str() {
        "ECB" => Ok(ModeTag::Ecb),
        "CBC" => Ok(ModeTag::Cbc),
        "PCBC" => Ok(ModeTag::Pcbc),
        "CFB" => Ok(ModeTag::Cfb),
        "OFB" => Ok(ModeTag::Ofb),
        "CTR" => Ok(ModeTag::Ctr),
        "RANDOMDELTA" => Ok(ModeTag::RandomDelta),
        _ => Err(Reason::UnsupportedMode(name.to_string())),
    }
}

/// Parse a padding tag.
pub fn parse_padding(name: &str) -> Result<Padding, Reason> {
    match name.to_ascii_uppercase().as_str() {
        "ZEROS" => Ok(Padding::Zeros),
        "ANSIX923" => Ok(Padding::AnsiX923),
        "PKCS7" => Ok(Padding::Pkcs7),
        "ISO10126" => Ok(Padding::Iso10126),
        _ => Err(Reason::UnsupportedPadding(name.to_string())),
    }
}

/// The full configuration surface accepted by `CipherContext` construction.
/// Fields other than `algorithm` carry raw bytes already decoded from
/// whatever external representation (hex string, file) the caller used —
/// this module owns only the string-tag parsing and the resulting
/// invariant checks, not hex decoding (see `cipher-cli::opts` for that).
pub struct Config {
    pub algorithm: Algorithm,
    pub mode: ModeTag,
    pub padding: Padding,
    pub key: Vec<u8>,
    pub iv: Option<Vec<u8>>,
    pub random_delta: Option<Vec<u8>>,
}

impl Config {
    /// Build a `CipherContext` from this configuration. `key` must be 64
    /// bytes for RC5 (the fixed RC5-64/12/64 instantiation the surface
    /// exposes) or 16/24/32 bytes for RC6.
    pub fn build(self) -> Result<CipherContext, Reason> {
        let primitive = match self.algorithm {
            Algorithm::Rc5 => {
                bail!(
                    self.key.len() != 64,
                    Reason::InvalidKeyLength {
                        current: self.key.len(),
                        expected: "64",
                    }
                );
                let key: [u8; 64] = self.key.try_into().expect("length checked above");
                Primitive::Rc5(RC5ControlBlock::<u64>::new_fixed(&key)?)
            }
            Algorithm::Rc6 => Primitive::Rc6(RC6ControlBlock::new(&self.key)?),
        };

        CipherContext::new(primitive, self.mode, self.padding, self.iv, self.random_delta)
    }
}
