/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use std::fmt;

use ibig::{ibig, IBig};
use rand_core::TryCryptoRng;

use super::ecdsa::{self, SignOptions};
use super::{curve::Curve, publickey::PublicKey, Signature};
use crate::rand::{self, OsRng};
use crate::utils::{bytes, error::EcError};

/// A secret scalar `d` in `[1, n - 1]` bound to a curve.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey<'c> {
    curve: &'c Curve,
    secret: IBig,
}

impl<'c> PrivateKey<'c> {
    pub fn new(curve: &'c Curve, secret: IBig) -> Result<Self, EcError> {
        if secret < ibig!(1) || secret >= *curve.n() {
            return Err(EcError::InvalidScalar);
        }
        Ok(PrivateKey { curve, secret })
    }

    /// Reads the secret from raw big-endian bytes.
    pub fn from_be_bytes(curve: &'c Curve, secret: &[u8]) -> Result<Self, EcError> {
        Self::new(curve, bytes::to_ibig_be(secret))
    }

    /// Reads the secret from a hex string, with or without `0x` prefix.
    pub fn from_hex(curve: &'c Curve, secret: &str) -> Result<Self, EcError> {
        let raw = bytes::from_hex(secret).ok_or(EcError::InvalidEncoding("not a hex string"))?;
        Self::from_be_bytes(curve, &raw)
    }

    pub fn random<R>(curve: &'c Curve, rng: &mut R) -> Result<Self, EcError>
    where
        R: TryCryptoRng + ?Sized,
    {
        let secret = rand::random_scalar(rng, curve.n())?;
        Self::new(curve, secret)
    }

    /// Generates a fresh key from the operating system's random source.
    pub fn generate(curve: &'c Curve) -> Result<Self, EcError> {
        Self::random(curve, &mut OsRng)
    }

    pub fn curve(&self) -> &'c Curve {
        self.curve
    }

    pub fn secret(&self) -> &IBig {
        &self.secret
    }

    /// The secret as big-endian bytes, as wide as the group order.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let len = (self.curve.order_bits() + 7) / 8;
        // 0 < d < n always fits
        bytes::ibig_to_be_bytes(&self.secret, len).unwrap_or_default()
    }

    /// `d * G`
    pub fn public_key(&self) -> Result<PublicKey<'c>, EcError> {
        let point = self.curve.generator().multiply(&self.secret)?;
        PublicKey::derived(point)
    }

    pub fn sign<H>(&self, message: &[u8], hash: H) -> Result<Signature, EcError>
    where
        H: Fn(&[u8]) -> Vec<u8>,
    {
        self.sign_with_rng(message, hash, &mut OsRng)
    }

    pub fn sign_with_rng<R, H>(&self, message: &[u8], hash: H, rng: &mut R) -> Result<Signature, EcError>
    where
        R: TryCryptoRng + ?Sized,
        H: Fn(&[u8]) -> Vec<u8>,
    {
        ecdsa::sign_digest(rng, &SignOptions::default(), self, &hash(message))
    }
}

impl PrivateKey<'static> {
    /// Binds `secret` to the registered curve called `curve`.
    pub fn from_name(curve: &str, secret: IBig) -> Result<Self, EcError> {
        Self::new(Curve::by_name(curve)?, secret)
    }
}

impl fmt::Debug for PrivateKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("curve", &self.curve.name())
            .finish_non_exhaustive()
    }
}
