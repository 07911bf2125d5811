//! Chunked streaming driver: read/encrypt/write a file in fixed-size
//! chunks over `std::fs`/`std::io`, with a `Progress` callback and an
//! `Arc<AtomicBool>` cancellation token. A single `CipherContext` is
//! reused across the whole file so its running IV/counter state threads
//! correctly from one chunk to the next rather than resetting at each
//! chunk boundary.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::context::CipherContext;
use crate::Reason;

/// Progress callback invoked once per completed chunk with `(done, total)`,
/// in chunk order.
pub type Progress<'a> = dyn FnMut(usize, usize) + 'a;

/// A cooperative cancellation flag, checked between chunks.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Encrypt `in_path` into `out_path` in fixed-size chunks of
/// `block_size * 1024` bytes, padding only the final chunk. On any error
/// or cancellation the partially-written output is deleted.
pub fn encrypt_file(
    ctx: &mut CipherContext,
    in_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    progress: &mut Progress,
    cancel: &CancellationToken,
) -> Result<(), Reason> {
    run_chunked(ctx, in_path, out_path, progress, cancel, CipherContext::encrypt_chunk)
}

/// Decrypt `in_path` into `out_path`, stripping padding only on the final
/// chunk.
pub fn decrypt_file(
    ctx: &mut CipherContext,
    in_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    progress: &mut Progress,
    cancel: &CancellationToken,
) -> Result<(), Reason> {
    run_chunked(ctx, in_path, out_path, progress, cancel, CipherContext::decrypt_chunk)
}

fn run_chunked(
    ctx: &mut CipherContext,
    in_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    progress: &mut Progress,
    cancel: &CancellationToken,
    op: impl Fn(&mut CipherContext, &[u8], bool) -> Result<Vec<u8>, Reason>,
) -> Result<(), Reason> {
    let in_path = in_path.as_ref();
    let out_path = out_path.as_ref();

    let metadata = fs::metadata(in_path)?;
    let file_size = metadata.len();
    let chunk_size = ctx.block_size() * 1024;
    let total_chunks = if file_size == 0 {
        1
    } else {
        file_size.div_ceil(chunk_size as u64) as usize
    };

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut input = File::open(in_path)?;
    let mut output = File::create(out_path)?;
    let mut buffer = vec![0u8; chunk_size];

    let result = (|| -> Result<(), Reason> {
        for index in 0..total_chunks {
            if cancel.is_cancelled() {
                return Err(Reason::Cancelled);
            }

            let read = read_full(&mut input, &mut buffer)?;
            if read == 0 && index + 1 != total_chunks {
                break;
            }

            let is_final = index == total_chunks - 1;
            let processed = op(ctx, &buffer[..read], is_final)?;
            output.write_all(&processed)?;

            progress(index + 1, total_chunks);
        }
        Ok(())
    })();

    if result.is_err() {
        drop(output);
        let _ = fs::remove_file(out_path);
        return result;
    }

    if cancel.is_cancelled() {
        drop(output);
        let _ = fs::remove_file(out_path);
        return Err(Reason::Cancelled);
    }

    Ok(())
}

/// Read until `buf` is full or EOF, returning the number of bytes read —
/// `Read::read` is permitted to return short reads before EOF.
fn read_full(input: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match input.read(&mut buf[total..])? {
            0 => break,
            n => total += n,
        }
    }
    Ok(total)
}
