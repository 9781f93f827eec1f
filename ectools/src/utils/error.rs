/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use thiserror::Error;

/// Everything that can go wrong while building curves, points and keys or
/// while signing.
///
/// Verification never produces an error, a bad signature is simply `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcError {
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),
    #[error("invalid curve parameters: {0}")]
    InvalidCurve(&'static str),
    #[error("points are not on the same curve")]
    CurveMismatch,
    #[error("point not on curve")]
    PointNotOnCurve,
    #[error("scalar out of range [1, n-1]")]
    InvalidScalar,
    #[error("invalid public key: {0}")]
    InvalidPublicKey(&'static str),
    #[error("invalid encoding: {0}")]
    InvalidEncoding(&'static str),
    #[error("random number generator failed: {0}")]
    Rng(String),
    /// An arithmetic result broke an invariant that holds for every valid
    /// input. Retrying will not help.
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

impl EcError {
    pub fn is_internal(&self) -> bool {
        matches!(self, EcError::Internal(_))
    }
}
