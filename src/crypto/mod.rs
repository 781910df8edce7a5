//! Cryptographic operations for wallet generation and address derivation.
//!
//! This module provides:
//! - BIP39 mnemonic generation and seed expansion
//! - BIP32 child key derivation along fixed paths
//! - Bitcoin (P2PKH, P2SH-P2WPKH, P2WPKH, P2TR) and Stacks c32check addresses

pub mod address;
pub mod c32;
mod hash;
pub mod hdkey;
pub mod mnemonic;
pub mod network;

pub use address::{AddressError, BitcoinFormat};
pub use hash::{hash160, sha256d};
pub use hdkey::{ChildIndex, DerivationPath, DeriveError, ExtendedKey};
pub use mnemonic::{generate_mnemonic, seed_from_mnemonic, Strength, StrengthError};
pub use network::{DerivationPaths, Network, NetworkParams};
