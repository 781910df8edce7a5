//! Bitcoin and Stacks address encodings for a compressed secp256k1 key.

use std::fmt;

use bech32::{segwit, Fe32, Hrp};
use secp256k1::{PublicKey, SecretKey};

use super::c32::{self, C32Error};
use super::hash::hash160;
use super::network::NetworkParams;

/// WIF suffix marking the key as belonging to a compressed public key.
const COMPRESSED_FLAG: u8 = 0x01;

/// Errors raised while encoding or decoding addresses.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("segwit encoding failed: {0}")]
    Segwit(String),

    #[error("invalid base58check string: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error(transparent)]
    C32(#[from] C32Error),

    #[error("unexpected payload length {0}")]
    Length(usize),
}

/// Which Bitcoin address is derived (and searched, with `--bitcoin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitcoinFormat {
    /// BIP49 P2SH-wrapped P2WPKH (`3...` / `2...`)
    #[default]
    SegwitP2sh,
    /// BIP84 P2WPKH (`bc1q...` / `tb1q...`)
    NativeSegwit,
    /// BIP86 path, P2TR over the untweaked x-only key (`bc1p...` / `tb1p...`)
    Taproot,
}

impl BitcoinFormat {
    /// Length of the fixed leading part every address of this format shares,
    /// which carries no vanity information.
    pub fn prefix_len(self) -> usize {
        match self {
            BitcoinFormat::SegwitP2sh => 1,
            BitcoinFormat::NativeSegwit | BitcoinFormat::Taproot => 4,
        }
    }

    /// Characters an address body of this format can contain, as they appear
    /// in the address.
    pub fn alphabet(self) -> &'static str {
        match self {
            BitcoinFormat::SegwitP2sh => {
                "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz"
            }
            BitcoinFormat::NativeSegwit | BitcoinFormat::Taproot => {
                "qpzry9x8gf2tvdw0s3jn54khce6mua7l"
            }
        }
    }
}

impl fmt::Display for BitcoinFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitcoinFormat::SegwitP2sh => write!(f, "segwit (p2sh)"),
            BitcoinFormat::NativeSegwit => write!(f, "native segwit"),
            BitcoinFormat::Taproot => write!(f, "taproot"),
        }
    }
}

#[inline]
fn base58check(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 1);
    data.push(version);
    data.extend_from_slice(payload);
    bs58::encode(data).with_check().into_string()
}

/// Legacy P2PKH address: base58check(version || HASH160(pubkey)).
pub fn p2pkh_address(public_key: &PublicKey, params: &NetworkParams) -> String {
    base58check(params.pubkey_hash_version, &hash160(&public_key.serialize()))
}

/// Stacks address: the P2PKH version and hash re-encoded under c32check.
pub fn stacks_address(public_key: &PublicKey, params: &NetworkParams) -> Result<String, AddressError> {
    let legacy = p2pkh_address(public_key, params);
    let (version, hash) = decode_base58_address(&legacy)?;
    Ok(c32::c32_address(c32::stacks_version_for(version), &hash)?)
}

/// P2SH-P2WPKH: the witness script `OP_0 PUSH20 <HASH160(pubkey)>` hashed
/// again and wrapped in a P2SH address.
pub fn p2sh_p2wpkh_address(public_key: &PublicKey, params: &NetworkParams) -> String {
    let mut witness_script = [0u8; 22];
    witness_script[0] = 0x00;
    witness_script[1] = 0x14;
    witness_script[2..].copy_from_slice(&hash160(&public_key.serialize()));
    base58check(params.script_hash_version, &hash160(&witness_script))
}

/// Native segwit v0 (bech32) over HASH160(pubkey).
pub fn p2wpkh_address(public_key: &PublicKey, params: &NetworkParams) -> Result<String, AddressError> {
    segwit_address(params.hrp, segwit::VERSION_0, &hash160(&public_key.serialize()))
}

/// Segwit v1 (bech32m) over the 32-byte x-only key, without a taproot tweak.
pub fn p2tr_address(public_key: &PublicKey, params: &NetworkParams) -> Result<String, AddressError> {
    let compressed = public_key.serialize();
    segwit_address(params.hrp, segwit::VERSION_1, &compressed[1..])
}

fn segwit_address(hrp: Hrp, version: Fe32, program: &[u8]) -> Result<String, AddressError> {
    segwit::encode(hrp, version, program).map_err(|e| AddressError::Segwit(e.to_string()))
}

/// Encodes the Bitcoin address of `format`.
pub fn bitcoin_address(
    public_key: &PublicKey,
    format: BitcoinFormat,
    params: &NetworkParams,
) -> Result<String, AddressError> {
    match format {
        BitcoinFormat::SegwitP2sh => Ok(p2sh_p2wpkh_address(public_key, params)),
        BitcoinFormat::NativeSegwit => p2wpkh_address(public_key, params),
        BitcoinFormat::Taproot => p2tr_address(public_key, params),
    }
}

/// Wallet import format: base58check(version || key || 0x01).
pub fn wif(secret_key: &SecretKey, params: &NetworkParams) -> String {
    let mut payload = [0u8; 33];
    payload[..32].copy_from_slice(&secret_key.secret_bytes());
    payload[32] = COMPRESSED_FLAG;
    base58check(params.wif_version, &payload)
}

/// Splits a base58check address into its version byte and 20-byte hash.
pub fn decode_base58_address(address: &str) -> Result<(u8, [u8; 20]), AddressError> {
    let payload = bs58::decode(address).with_check(None).into_vec()?;
    if payload.len() != 21 {
        return Err(AddressError::Length(payload.len()));
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok((payload[0], hash))
}

/// Splits a WIF string into its version byte and private key bytes.
pub fn decode_wif(wif: &str) -> Result<(u8, [u8; 32]), AddressError> {
    let payload = bs58::decode(wif).with_check(None).into_vec()?;
    if payload.len() != 34 || payload[33] != COMPRESSED_FLAG {
        return Err(AddressError::Length(payload.len()));
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&payload[1..33]);
    Ok((payload[0], key))
}

/// Decodes a segwit address into (hrp, witness version, program).
pub fn decode_segwit_address(address: &str) -> Result<(Hrp, u8, Vec<u8>), AddressError> {
    let (hrp, version, program) =
        segwit::decode(address).map_err(|e| AddressError::Segwit(e.to_string()))?;
    Ok((hrp, version.to_u8(), program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::network::Network;
    use secp256k1::SECP256K1;

    fn key_one() -> (SecretKey, PublicKey) {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        let secret = SecretKey::from_slice(&bytes).unwrap();
        (secret, PublicKey::from_secret_key(SECP256K1, &secret))
    }

    fn public_key(hex_str: &str) -> PublicKey {
        PublicKey::from_slice(&hex::decode(hex_str).unwrap()).unwrap()
    }

    #[test]
    fn test_wif_of_key_one() {
        let (secret, _) = key_one();
        let params = NetworkParams::new(Network::Mainnet);
        let encoded = wif(&secret, &params);
        assert_eq!(encoded, "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn");
        assert_eq!(
            decode_wif(&encoded).unwrap(),
            (128, secret.secret_bytes())
        );
    }

    #[test]
    fn test_legacy_and_native_of_key_one() {
        let (_, public) = key_one();
        let params = NetworkParams::new(Network::Mainnet);
        assert_eq!(
            p2pkh_address(&public, &params),
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
        );
        assert_eq!(
            p2wpkh_address(&public, &params).unwrap(),
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"
        );
    }

    #[test]
    fn test_bip49_testnet_vector() {
        let public = public_key("03a1af804ac108a8a51782198c2d034b28bf90c8803f5a53f76276fa69a4eae77f");
        let params = NetworkParams::new(Network::Testnet);
        assert_eq!(
            p2sh_p2wpkh_address(&public, &params),
            "2Mww8dCYPUpKHofjgcXcBCEGmniw9CoaiD2"
        );
    }

    #[test]
    fn test_bip84_vector() {
        let public = public_key("0330d54fd0dd420a6e5f8d3624f5f3482cae350f79d5f0753bf5beef9c2d91af3c");
        let params = NetworkParams::new(Network::Mainnet);
        assert_eq!(
            bitcoin_address(&public, BitcoinFormat::NativeSegwit, &params).unwrap(),
            "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"
        );
    }

    #[test]
    fn test_taproot_carries_x_only_key() {
        let public = public_key("03cc8a4bc64d897bddc5fbc2f670f7a8ba0b386779106cf1223c6fc5d7cd6fc115");
        let params = NetworkParams::new(Network::Mainnet);
        let address = p2tr_address(&public, &params).unwrap();
        assert!(address.starts_with("bc1p"));

        let (hrp, version, program) = decode_segwit_address(&address).unwrap();
        assert_eq!(hrp, bech32::hrp::BC);
        assert_eq!(version, 1);
        assert_eq!(
            hex::encode(program),
            "cc8a4bc64d897bddc5fbc2f670f7a8ba0b386779106cf1223c6fc5d7cd6fc115"
        );
    }

    #[test]
    fn test_decoded_hashes_match_inputs() {
        let (_, public) = key_one();
        let key_hash = hash160(&public.serialize());

        for network in [Network::Mainnet, Network::Testnet] {
            let params = NetworkParams::new(network);

            let (version, hash) = decode_base58_address(&p2pkh_address(&public, &params)).unwrap();
            assert_eq!(version, params.pubkey_hash_version);
            assert_eq!(hash, key_hash);

            let (version, script_hash) =
                decode_base58_address(&p2sh_p2wpkh_address(&public, &params)).unwrap();
            assert_eq!(version, params.script_hash_version);
            let mut script = vec![0x00, 0x14];
            script.extend_from_slice(&key_hash);
            assert_eq!(script_hash, hash160(&script));

            let (hrp, version, program) =
                decode_segwit_address(&p2wpkh_address(&public, &params).unwrap()).unwrap();
            assert_eq!(hrp, params.hrp);
            assert_eq!(version, 0);
            assert_eq!(program, key_hash);

            let (version, hash) =
                c32::c32_address_decode(&stacks_address(&public, &params).unwrap()).unwrap();
            assert_eq!(version, params.stacks_version);
            assert_eq!(hash, key_hash);
        }
    }

    #[test]
    fn test_stacks_address_equals_direct_c32check() {
        let (_, public) = key_one();
        for network in [Network::Mainnet, Network::Testnet] {
            let params = NetworkParams::new(network);
            let via_legacy = stacks_address(&public, &params).unwrap();
            let direct =
                c32::c32_address(params.stacks_version, &hash160(&public.serialize())).unwrap();
            assert_eq!(via_legacy, direct);
            assert_eq!(
                via_legacy,
                c32::b58_to_c32(&p2pkh_address(&public, &params)).unwrap()
            );
        }
    }

    #[test]
    fn test_format_prefix_lengths() {
        assert_eq!(BitcoinFormat::SegwitP2sh.prefix_len(), 1);
        assert_eq!(BitcoinFormat::NativeSegwit.prefix_len(), 4);
        assert_eq!(BitcoinFormat::Taproot.prefix_len(), 4);
    }
}
