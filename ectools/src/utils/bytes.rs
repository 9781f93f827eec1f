/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use ibig::{IBig, UBig};

/// Reads `bytes` as an unsigned big-endian integer.
///
/// ```ignore
/// # use ibig::ibig;
/// # use ectools::utils::bytes::to_ibig_be;
/// assert_eq!(to_ibig_be(&[0x01, 0x00]), ibig!(256));
/// ```
pub fn to_ibig_be(bytes: &[u8]) -> IBig {
    IBig::from(UBig::from_be_bytes(bytes))
}

/// Writes a non-negative `num` as exactly `len` big-endian bytes.
/// Returns `None` for negative values or values that do not fit.
pub fn ibig_to_be_bytes(num: &IBig, len: usize) -> Option<Vec<u8>> {
    let b = <UBig as TryFrom<IBig>>::try_from(num.clone()).ok()?;
    let b = b.to_be_bytes();
    if b.len() > len {
        return None;
    }
    let mut res = vec![0; len - b.len()];
    res.extend_from_slice(&b);
    Some(res)
}

pub fn from_hex(s: &str) -> Option<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.len() % 2 == 0 {
        (0..s.len())
            .step_by(2)
            .map(|i| {
                s.get(i..i + 2)
                    .and_then(|sub| u8::from_str_radix(sub, 16).ok())
            })
            .collect()
    } else {
        None
    }
}
