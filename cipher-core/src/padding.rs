use rand::RngCore;

use crate::{Reason, bail};

/// Padding scheme applied to the final block of a plaintext buffer so its
/// length becomes a multiple of the block size.
///
/// Padding is always additive: `1..=block_size` bytes are appended, even
/// when the input is already block-aligned (a full block of padding is
/// added in that case) — this is what makes PKCS7/ANSI X.923 unambiguous
/// to strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Zero-fill. Ambiguous on plaintext that itself ends in zero bytes —
    /// this is a property of the scheme, not a bug; callers who need exact
    /// length recovery for binary data should pick PKCS7 or ANSI X.923
    /// instead.
    Zeros,
    AnsiX923,
    Pkcs7,
    Iso10126,
}

/// Apply padding in place, returning the number of bytes added.
pub fn pad(buf: &mut Vec<u8>, block_size: usize, scheme: Padding) -> Result<usize, Reason> {
    let rem = buf.len() % block_size;
    let pad_len = if rem > 0 { block_size - rem } else { block_size };

    match scheme {
        Padding::Zeros => {
            buf.extend(std::iter::repeat_n(0u8, pad_len));
        }
        Padding::AnsiX923 => {
            buf.extend(std::iter::repeat_n(0u8, pad_len - 1));
            buf.push(pad_len as u8);
        }
        Padding::Pkcs7 => {
            buf.extend(std::iter::repeat_n(pad_len as u8, pad_len));
        }
        Padding::Iso10126 => {
            let mut filler = vec![0u8; pad_len - 1];
            rand::thread_rng().fill_bytes(&mut filler);
            buf.extend(filler);
            buf.push(pad_len as u8);
        }
    }

    Ok(pad_len)
}

/// Strip padding in place, returning the number of bytes removed.
///
/// Always returns the same error variant on any malformed padding to avoid
/// giving an oracle a reason to distinguish failure modes.
pub fn strip(buf: &mut Vec<u8>, block_size: usize, scheme: Padding) -> Result<usize, Reason> {
    let len = buf.len();
    bail!(len == 0 || len % block_size != 0, Reason::Padding(scheme));

    match scheme {
        Padding::Zeros => {
            let stripped = len - buf.iter().rev().take_while(|b| **b == 0).count();
            buf.truncate(stripped);
            Ok(len - stripped)
        }
        Padding::AnsiX923 => {
            let pad_len = *buf.last().unwrap() as usize;
            bail!(
                pad_len == 0 || pad_len > block_size,
                Reason::Padding(scheme),
                !buf[len - pad_len..len - 1].iter().all(|b| *b == 0),
                Reason::Padding(scheme),
            );
            buf.truncate(len - pad_len);
            Ok(pad_len)
        }
        Padding::Pkcs7 => {
            let pad_len = *buf.last().unwrap() as usize;
            bail!(
                pad_len == 0 || pad_len > block_size,
                Reason::Padding(scheme),
                !buf[len - pad_len..].iter().all(|b| *b == pad_len as u8),
                Reason::Padding(scheme),
            );
            buf.truncate(len - pad_len);
            Ok(pad_len)
        }
        Padding::Iso10126 => {
            let pad_len = *buf.last().unwrap() as usize;
            bail!(pad_len == 0 || pad_len > block_size, Reason::Padding(scheme));
            buf.truncate(len - pad_len);
            Ok(pad_len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkcs7_pads_aligned_data_with_a_full_block() {
        let mut data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let added = pad(&mut data, 8, Padding::Pkcs7).unwrap();
        assert_eq!(added, 8);
        assert_eq!(data.len(), 16);
        assert_eq!(&data[8..], &[8; 8]);
    }

    #[test]
    fn pkcs7_round_trip() {
        let mut data = b"hello".to_vec();
        pad(&mut data, 8, Padding::Pkcs7).unwrap();
        assert_eq!(data.len(), 8);
        let removed = strip(&mut data, 8, Padding::Pkcs7).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(data, b"hello");
    }

    #[test]
    fn pkcs7_rejects_corrupted_trailer() {
        let mut data = b"bad\x04\x04\x04\x02".to_vec();
        let result = strip(&mut data, 4, Padding::Pkcs7);
        assert!(matches!(result, Err(Reason::Padding(Padding::Pkcs7))));
    }

    #[test]
    fn ansi_x923_round_trip() {
        let mut data = b"world".to_vec();
        pad(&mut data, 8, Padding::AnsiX923).unwrap();
        assert_eq!(&data[5..], &[0, 0, 3]);
        let removed = strip(&mut data, 8, Padding::AnsiX923).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(data, b"world");
    }

    #[test]
    fn iso10126_round_trip_ignores_random_filler() {
        let mut data = b"world".to_vec();
        pad(&mut data, 8, Padding::Iso10126).unwrap();
        assert_eq!(data.len(), 8);
        assert_eq!(*data.last().unwrap(), 3);
        let removed = strip(&mut data, 8, Padding::Iso10126).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(data, b"world");
    }

    #[test]
    fn zeros_round_trip_when_plaintext_has_no_trailing_zero() {
        let mut data = b"hello".to_vec();
        pad(&mut data, 8, Padding::Zeros).unwrap();
        assert_eq!(data, b"hello\0\0\0");
        let removed = strip(&mut data, 8, Padding::Zeros).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(data, b"hello");
    }

    #[test]
    fn every_scheme_adds_between_one_and_block_size_bytes() {
        for scheme in [
            Padding::Zeros,
            Padding::AnsiX923,
            Padding::Pkcs7,
            Padding::Iso10126,
        ] {
            for len in 0..16usize {
                let mut data = vec![0xAAu8; len];
                let added = pad(&mut data, 8, scheme).unwrap();
                assert!((1..=8).contains(&added));
                assert_eq!(data.len() % 8, 0);
            }
        }
    }
}
