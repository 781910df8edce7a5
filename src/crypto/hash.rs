//! Hash helpers shared by the address encoders.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// RIPEMD160(SHA256(data)), the 20-byte key hash used by P2PKH, P2SH and P2WPKH.
#[inline]
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// SHA256(SHA256(data)).
#[inline]
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}
