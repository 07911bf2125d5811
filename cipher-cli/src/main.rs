mod opts;

use std::fs;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use num_bigint_dig::BigUint;

use cipher_core::config::{Algorithm, Config};
use cipher_core::modes::ModeTag;
use cipher_core::padding::Padding;
use cipher_core::stream::{CancellationToken, decrypt_file, encrypt_file};
use cipher_core::{DhPrivateKey, dh};

use opts::{Action, AlgorithmArg, CipherOpts, Command, DhCommand, ModeArg, Opts, PaddingArg};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    match opts.command {
        Command::Cipher(cipher_opts) => run_cipher(cipher_opts),
        Command::Dh(dh_command) => run_dh(dh_command),
    }
}

fn run_cipher(opts: CipherOpts) -> Result<()> {
    let algorithm = match opts.algorithm {
        AlgorithmArg::Rc5 => Algorithm::Rc5,
        AlgorithmArg::Rc6 => Algorithm::Rc6,
    };
    let padding = match opts.padding {
        PaddingArg::Zeros => Padding::Zeros,
        PaddingArg::AnsiX923 => Padding::AnsiX923,
        PaddingArg::Pkcs7 => Padding::Pkcs7,
        PaddingArg::Iso10126 => Padding::Iso10126,
    };
    let key = hex::decode(&opts.key).context("decoding --key as hex")?;

    let (mode, iv, random_delta) = match &opts.mode {
        ModeArg::Ecb => (ModeTag::Ecb, None, None),
        ModeArg::Cbc { iv } => (ModeTag::Cbc, Some(hex::decode(iv)?), None),
        ModeArg::Pcbc { iv } => (ModeTag::Pcbc, Some(hex::decode(iv)?), None),
        ModeArg::Cfb { iv } => (ModeTag::Cfb, Some(hex::decode(iv)?), None),
        ModeArg::Ofb { iv } => (ModeTag::Ofb, Some(hex::decode(iv)?), None),
        ModeArg::Ctr { iv } => (ModeTag::Ctr, Some(hex::decode(iv)?), None),
        ModeArg::RandomDelta { iv, delta } => (
            ModeTag::RandomDelta,
            Some(hex::decode(iv)?),
            Some(hex::decode(delta)?),
        ),
    };

    let config = Config {
        algorithm,
        mode,
        padding,
        key,
        iv,
        random_delta,
    };
    let mut ctx = config.build().map_err(|reason| anyhow!(reason.to_string()))?;
    if let Some(workers) = opts.workers {
        ctx = ctx.with_workers(workers);
    }

    tracing::info!(
        algorithm = ctx.algorithm_name(),
        version = %ctx.parametric_version(),
        mode = ?ctx.mode(),
        "starting {:?}",
        opts.action
    );

    let dest = opts.dest_path();
    let mut last_progress = 0;
    let cancel = CancellationToken::new();
    let mut progress = |done: usize, total: usize| {
        if done == total || done - last_progress >= (total / 20).max(1) {
            tracing::info!(done, total, "progress");
            last_progress = done;
        }
    };

    match opts.action {
        Action::Encrypt => encrypt_file(&mut ctx, &opts.file, &dest, &mut progress, &cancel),
        Action::Decrypt => decrypt_file(&mut ctx, &opts.file, &dest, &mut progress, &cancel),
    }
    .map_err(|reason| anyhow!(reason.to_string()))?;

    tracing::info!(dest = %dest.display(), "done");
    Ok(())
}

fn run_dh(command: DhCommand) -> Result<()> {
    match command {
        DhCommand::GenParams {
            gen_prime_bits,
            dh_private_out,
        } => {
            let prime = dh::generate_prime(gen_prime_bits).map_err(|reason| anyhow!(reason.to_string()))?;
            let private_key = DhPrivateKey::generate(&prime).map_err(|reason| anyhow!(reason.to_string()))?;

            let contents = format!(
                "prime={}\nprivate={}\npublic={}\n",
                private_key.prime().to_str_radix(16),
                private_key.private_scalar().to_str_radix(16),
                private_key.public_value().to_str_radix(16),
            );
            fs::write(&dh_private_out, contents).context("writing DH private-key file")?;

            tracing::info!(
                public = %private_key.public_value().to_str_radix(16),
                path = %dh_private_out.display(),
                "generated Diffie-Hellman parameters"
            );
            Ok(())
        }
        DhCommand::DeriveKey {
            dh_private_in,
            peer_public,
            key_len,
        } => {
            let contents = fs::read_to_string(&dh_private_in).context("reading DH private-key file")?;
            let private = parse_field(&contents, "private")?;
            let prime = parse_field(&contents, "prime")?;

            let peer_public = BigUint::parse_bytes(peer_public.as_bytes(), 16)
                .ok_or_else(|| anyhow!("--peer-public is not a valid hex number"))?;
            let private_value = BigUint::parse_bytes(private.as_bytes(), 16)
                .ok_or_else(|| anyhow!("stored private scalar is not a valid hex number"))?;
            let prime_value =
                BigUint::parse_bytes(prime.as_bytes(), 16).ok_or_else(|| anyhow!("stored prime is not a valid hex number"))?;

            let shared_secret = peer_public.modpow(&private_value, &prime_value).to_bytes_be();
            let key = dh::derive_key(&shared_secret, key_len);

            println!("{}", hex::encode(key));
            Ok(())
        }
    }
}

fn parse_field<'a>(contents: &'a str, field: &str) -> Result<&'a str> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix(&format!("{field}=")))
        .ok_or_else(|| anyhow!("missing `{field}=` line in DH private-key file"))
}
