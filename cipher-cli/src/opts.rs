use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

const ABOUT: &str = "A command-line RC5/RC6 encryption, decryption and key-agreement tool";
const LONG_ABOUT: &str = "\
cipher-cli drives the cipher-core library against files on disk. It supports RC5 and \
RC6 block ciphers under ECB, CBC, PCBC, CFB, OFB, CTR and RandomDelta modes, all four \
padding schemes, and a standalone Diffie-Hellman key-agreement helper for establishing \
a shared key out of band.";

#[derive(Parser, Debug)]
#[command(name = "cipher-cli", version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Opts {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt or decrypt a file under a symmetric key.
    Cipher(CipherOpts),

    /// Diffie-Hellman key-agreement helpers.
    #[command(subcommand)]
    Dh(DhCommand),
}

#[derive(clap::Args, Debug)]
pub struct CipherOpts {
    /// Which block primitive to use.
    #[arg(long, value_enum)]
    pub algorithm: AlgorithmArg,

    /// Secret key as a hex string. 64 bytes for RC5, 16/24/32 for RC6.
    #[arg(short, long)]
    pub key: String,

    /// Which block-cipher mode of operation to use.
    #[command(subcommand)]
    pub mode: ModeArg,

    /// Padding scheme applied to the final block.
    #[arg(short, long, value_enum, default_value_t = PaddingArg::Pkcs7)]
    pub padding: PaddingArg,

    /// Source file path to read plaintext/ciphertext from.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Destination file path to write the result to.
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Whether to encrypt or decrypt.
    #[arg(short, long, value_enum)]
    pub action: Action,

    /// Number of worker threads for parallelisable modes (ECB, CTR,
    /// RandomDelta). Defaults to hardware concurrency.
    #[arg(long)]
    pub workers: Option<usize>,
}

impl CipherOpts {
    pub fn dest_path(&self) -> PathBuf {
        if let Some(path) = &self.dest {
            return path.clone();
        }

        let mut path = PathBuf::new();
        path.push("./");
        path.push("processed.bin");
        path
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    Rc5,
    Rc6,
}

#[derive(Debug, Subcommand)]
pub enum ModeArg {
    /// Electronic-Code-Book mode.
    Ecb,

    /// Cipher-Block-Chaining mode.
    Cbc {
        /// Initialization vector, as a hex string of exactly block-size bytes.
        #[arg(long)]
        iv: String,
    },

    /// Propagating Cipher-Block-Chaining mode.
    Pcbc {
        #[arg(long)]
        iv: String,
    },

    /// Cipher-Feedback mode.
    Cfb {
        #[arg(long)]
        iv: String,
    },

    /// Output-Feedback mode.
    Ofb {
        #[arg(long)]
        iv: String,
    },

    /// Counter mode.
    Ctr {
        #[arg(long)]
        iv: String,
    },

    /// Counter mode with a caller-supplied per-block delta.
    RandomDelta {
        #[arg(long)]
        iv: String,
        #[arg(long)]
        delta: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PaddingArg {
    Zeros,
    AnsiX923,
    Pkcs7,
    Iso10126,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Action {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Subcommand)]
pub enum DhCommand {
    /// Generate a safe prime of the requested bit length and a private/
    /// public key pair, writing the private scalar to a file.
    GenParams {
        /// Bit length of the safe prime to generate.
        #[arg(long)]
        gen_prime_bits: usize,

        /// Where to write the private scalar (hex), prime (hex) and
        /// public value (hex), one per line.
        #[arg(long)]
        dh_private_out: PathBuf,
    },

    /// Derive the shared secret from a stored private key and a peer's
    /// public value, then print a truncated/zero-padded key of the
    /// requested length.
    DeriveKey {
        /// Path to the private-key file written by `gen-params`.
        #[arg(long)]
        dh_private_in: PathBuf,

        /// The peer's public value, as a hex string.
        #[arg(long)]
        peer_public: String,

        /// Desired key length in bytes (64 for RC5, 16/24/32 for RC6).
        #[arg(long)]
        key_len: usize,
    },
}
