/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

//! Ready-made hash capabilities for signing and verification.
//!
//! Any `Fn(&[u8]) -> Vec<u8>` can be used, these are the common ones.

use sha2::{Digest, Sha256, Sha384, Sha512};

/// Variants carry their digest length in bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HashType {
    SHA256 = 32,
    SHA384 = 48,
    SHA512 = 64,
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

pub fn sha384(data: &[u8]) -> Vec<u8> {
    Sha384::digest(data).to_vec()
}

pub fn sha512(data: &[u8]) -> Vec<u8> {
    Sha512::digest(data).to_vec()
}

pub fn sha_x(typ: HashType, data: &[u8]) -> Vec<u8> {
    match typ {
        HashType::SHA256 => sha256(data),
        HashType::SHA384 => sha384(data),
        HashType::SHA512 => sha512(data),
    }
}

#[cfg(test)]
mod tests {
    use super::{sha_x, HashType};
    use crate::utils::bytes;

    #[test]
    fn test_sha256() {
        let digest = sha_x(HashType::SHA256, b"Message for ECDSA signing");
        assert_eq!(
            digest,
            bytes::from_hex("de2d515297cad600f0365ef2be0f6d7e2ea3e757c7a9c8b3cdf49d8483670b1c")
                .unwrap()
        );
    }

    #[test]
    fn test_lengths() {
        for typ in [HashType::SHA256, HashType::SHA384, HashType::SHA512] {
            assert_eq!(sha_x(typ, b"abc").len(), typ as usize);
        }
    }
}
