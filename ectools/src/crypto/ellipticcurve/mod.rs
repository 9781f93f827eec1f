/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

pub mod curve;
pub mod ecdsa;
pub mod math;
pub mod point;
pub mod privatekey;
pub mod publickey;
pub mod signature;

pub use curve::Curve;
pub use ecdsa::{Ecdsa, SignOptions};
pub use point::Point;
pub use privatekey::PrivateKey;
pub use publickey::PublicKey;
pub use signature::Signature;
