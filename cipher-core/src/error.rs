use hex::FromHexError;
use thiserror::Error;

/// Errors surfaced by cipher operations. Propagation policy is "surface
/// unchanged" — no variant here is silently recovered from by the core.
#[derive(Error, Debug)]
pub enum Reason {
    #[error("[Cipher-Error] word size mismatch")]
    WordSize,

    #[error("[Cipher-Error] invalid {0:?} padding")]
    Padding(crate::padding::Padding),

    #[error("[Cipher-Error] RC5/RC6 key is too long, supported: {supported:?} max, current: {current:?}")]
    KeyTooLong { current: usize, supported: usize },

    #[error("[Cipher-Error] invalid key, received an empty key")]
    InvalidKey,

    #[error("[Cipher-Error] invalid key length {current}, expected one of {expected}")]
    InvalidKeyLength {
        current: usize,
        expected: &'static str,
    },

    #[error("[Cipher-Error] rounds out of bounds, must be within 0-255, got {0}")]
    InvalidRounds(usize),

    #[error("[Cipher-Error] unsupported algorithm {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("[Cipher-Error] unsupported mode {0:?}")]
    UnsupportedMode(String),

    #[error("[Cipher-Error] unsupported padding scheme {0:?}")]
    UnsupportedPadding(String),

    #[error("[Cipher-Error] unable to parse hex string: {0}")]
    ParseHex(#[from] FromHexError),

    #[error("[Cipher-Error] IV must be exactly {0} bytes (the cipher's block size)")]
    IvInvalid(usize),

    #[error("[Cipher-Error] random-delta must be exactly {0} bytes (the cipher's block size)")]
    RandomDeltaInvalid(usize),

    #[error("[Cipher-Error] random-delta is required for RandomDelta mode but was not supplied")]
    RandomDeltaMissing,

    #[error("[Cipher-Error] input length {0} is not a multiple of the block size {1}")]
    InvalidInput(usize, usize),

    #[error("[Cipher-Error] block primitive rejected a block it should never reject: {0}")]
    PrimitiveFailure(String),

    #[error("[Cipher-Error] operation cancelled")]
    Cancelled,

    #[error("[Cipher-Error] I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("[Cipher-Error] invalid Diffie-Hellman parameter: {0}")]
    InvalidDhParameter(String),

    #[error("[Cipher-Error] declared block size {declared} does not match the primitive's native block size {native}")]
    BlockSizeMismatch { declared: usize, native: usize },
}

/// Helper macro to bail out early with a `Reason` error if any condition is
/// true. Reads well at every validation site in this crate.
#[macro_export]
macro_rules! bail {
    ($expression:expr, $err:expr) => {
        if $expression {
            return Err($err);
        }
    };
    ( $( $cond:expr , $err:expr ),+ $(,)? ) => {
        $(
            if $cond {
                return Err($err);
            }
        )+
    };
}
