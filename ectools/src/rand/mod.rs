/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use ibig::{ibig, IBig};
use rand_core::TryCryptoRng;

use crate::crypto::ellipticcurve::math;
use crate::utils::{bytes, error::EcError};

pub use rand_core::OsRng;

/// Every draw lands below the bound with probability above 1/2.
const MAX_DRAWS: u32 = 128;

/// Draws a uniformly distributed integer from `[0, bound)`.
///
/// Reads as many bytes as `bound` needs, masks the excess bits of the first
/// byte and draws again whenever the candidate is not below `bound`, at
/// most `MAX_DRAWS` times.
pub fn random_below<R>(rng: &mut R, bound: &IBig) -> Result<IBig, EcError>
where
    R: TryCryptoRng + ?Sized,
{
    if *bound <= ibig!(0) {
        return Err(EcError::InvalidScalar);
    }
    let bits = math::bit_len(bound);
    let mask = match bits % 8 {
        0 => 0xff,
        b => (1u8 << b) - 1,
    };
    let mut buf = vec![0u8; (bits + 7) / 8];
    for _ in 0..MAX_DRAWS {
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| EcError::Rng(e.to_string()))?;
        buf[0] &= mask;
        let candidate = bytes::to_ibig_be(&buf);
        if candidate < *bound {
            return Ok(candidate);
        }
    }
    log::error!("rand: no value below {bound} after {MAX_DRAWS} draws");
    Err(EcError::Rng(format!("no value below the bound after {MAX_DRAWS} draws")))
}

/// Draws a uniformly distributed scalar from `[1, n - 1]`.
pub fn random_scalar<R>(rng: &mut R, n: &IBig) -> Result<IBig, EcError>
where
    R: TryCryptoRng + ?Sized,
{
    Ok(random_below(rng, &(n - ibig!(1)))? + ibig!(1))
}
