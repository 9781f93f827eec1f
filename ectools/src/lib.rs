/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

//! Elliptic curve arithmetic over prime fields and ECDSA on top of it.
//!
//! ```
//! use ectools::{hash::sha256, Curve, PrivateKey};
//!
//! let privkey = PrivateKey::generate(Curve::secp256k1()).unwrap();
//! let pubkey = privkey.public_key().unwrap();
//! let sign = privkey.sign(b"hello", sha256).unwrap();
//! assert!(pubkey.verify(&sign, b"hello", sha256));
//! ```

pub mod crypto;
pub mod hash;
pub mod rand;
pub mod utils;

pub use crypto::ellipticcurve::{Curve, Ecdsa, Point, PrivateKey, PublicKey, SignOptions, Signature};
pub use utils::error::EcError;
