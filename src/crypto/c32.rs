//! Crockford base32 ("c32") with the Stacks c32check checksum.
//!
//! A c32 string is the base-32 representation of the input read as a
//! big-endian integer, with one extra `0` digit per leading zero byte. This
//! keeps leading zeros round-trippable the same way base58 does.

use super::hash::sha256d;

/// Stacks c32 alphabet (Crockford base32, no I, L, O, U).
pub const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Stacks address versions.
pub mod version {
    pub const MAINNET_P2PKH: u8 = 22;
    pub const MAINNET_P2SH: u8 = 20;
    pub const TESTNET_P2PKH: u8 = 26;
    pub const TESTNET_P2SH: u8 = 21;
}

/// Bitcoin base58 versions that have a Stacks counterpart.
const BITCOIN_MAINNET_P2PKH: u8 = 0;
const BITCOIN_MAINNET_P2SH: u8 = 5;
const BITCOIN_TESTNET_P2PKH: u8 = 111;
const BITCOIN_TESTNET_P2SH: u8 = 196;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum C32Error {
    #[error("invalid c32 character {0:?}")]
    InvalidCharacter(char),

    #[error("c32 version {0} does not fit in one c32 digit")]
    InvalidVersion(u8),

    #[error("c32check payload is too short")]
    TooShort,

    #[error("c32check checksum mismatch")]
    ChecksumMismatch,

    #[error("Stacks addresses start with 'S'")]
    MissingPrefix,

    #[error("invalid base58check address: {0}")]
    Base58(String),
}

/// Returns the numeric value of an (already normalized) c32 digit.
#[inline]
fn digit_value(c: u8) -> Option<u8> {
    C32_ALPHABET.iter().position(|&d| d == c).map(|p| p as u8)
}

/// Upper-cases and folds the Crockford look-alikes (O -> 0, I/L -> 1).
pub fn c32_normalize(input: &str) -> String {
    input
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'O' => '0',
            'I' | 'L' => '1',
            other => other,
        })
        .collect()
}

/// Encodes bytes as c32.
pub fn c32_encode(data: &[u8]) -> String {
    // Least-significant digit first, reversed at the end.
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 8 / 5 + 2);
    let mut acc: u32 = 0;
    let mut bits = 0u32;

    for &byte in data.iter().rev() {
        acc |= u32::from(byte) << bits;
        bits += 8;
        while bits >= 5 {
            digits.push(C32_ALPHABET[(acc & 0x1f) as usize]);
            acc >>= 5;
            bits -= 5;
        }
    }
    if bits > 0 {
        digits.push(C32_ALPHABET[(acc & 0x1f) as usize]);
    }

    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    let leading_zero_bytes = data.iter().take_while(|&&b| b == 0).count();
    digits.extend(std::iter::repeat(b'0').take(leading_zero_bytes));

    digits.iter().rev().map(|&d| char::from(d)).collect()
}

/// Decodes a c32 string (normalizing look-alike characters first).
pub fn c32_decode(input: &str) -> Result<Vec<u8>, C32Error> {
    let normalized = c32_normalize(input);
    let values = normalized
        .chars()
        .map(|c| {
            u8::try_from(c)
                .ok()
                .and_then(digit_value)
                .ok_or(C32Error::InvalidCharacter(c))
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let leading_zero_digits = values.iter().take_while(|&&v| v == 0).count();

    let mut bytes: Vec<u8> = Vec::with_capacity(values.len() * 5 / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    for &value in values.iter().rev() {
        acc |= u32::from(value) << bits;
        bits += 5;
        if bits >= 8 {
            bytes.push((acc & 0xff) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 && acc != 0 {
        bytes.push(acc as u8);
    }

    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    bytes.extend(std::iter::repeat(0u8).take(leading_zero_digits));
    bytes.reverse();
    Ok(bytes)
}

/// First four bytes of SHA256(SHA256(version || data)).
fn c32_checksum(version: u8, data: &[u8]) -> [u8; 4] {
    let mut preimage = Vec::with_capacity(data.len() + 1);
    preimage.push(version);
    preimage.extend_from_slice(data);
    let digest = sha256d(&preimage);
    [digest[0], digest[1], digest[2], digest[3]]
}

/// c32check encoding: version digit followed by c32(data || checksum).
pub fn c32check_encode(version: u8, data: &[u8]) -> Result<String, C32Error> {
    if usize::from(version) >= C32_ALPHABET.len() {
        return Err(C32Error::InvalidVersion(version));
    }

    let mut payload = Vec::with_capacity(data.len() + 4);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&c32_checksum(version, data));

    let mut out = String::with_capacity(payload.len() * 8 / 5 + 2);
    out.push(char::from(C32_ALPHABET[usize::from(version)]));
    out.push_str(&c32_encode(&payload));
    Ok(out)
}

/// Inverse of [`c32check_encode`]; verifies the checksum.
pub fn c32check_decode(input: &str) -> Result<(u8, Vec<u8>), C32Error> {
    let normalized = c32_normalize(input);
    let mut chars = normalized.chars();
    let version_char = chars.next().ok_or(C32Error::TooShort)?;
    let version = u8::try_from(version_char)
        .ok()
        .and_then(digit_value)
        .ok_or(C32Error::InvalidCharacter(version_char))?;

    let mut payload = c32_decode(chars.as_str())?;
    if payload.len() < 4 {
        return Err(C32Error::TooShort);
    }
    let checksum = payload.split_off(payload.len() - 4);
    if checksum != c32_checksum(version, &payload) {
        return Err(C32Error::ChecksumMismatch);
    }
    Ok((version, payload))
}

/// Builds a Stacks address: `S` + c32check(version, hash160).
pub fn c32_address(version: u8, hash160: &[u8]) -> Result<String, C32Error> {
    Ok(format!("S{}", c32check_encode(version, hash160)?))
}

/// Splits a Stacks address into its version and hash.
pub fn c32_address_decode(address: &str) -> Result<(u8, Vec<u8>), C32Error> {
    if address.len() <= 5 {
        return Err(C32Error::TooShort);
    }
    match address.strip_prefix('S') {
        Some(rest) => c32check_decode(rest),
        None => Err(C32Error::MissingPrefix),
    }
}

/// Maps a Bitcoin base58 version byte to the matching Stacks version.
pub fn stacks_version_for(bitcoin_version: u8) -> u8 {
    match bitcoin_version {
        BITCOIN_MAINNET_P2PKH => version::MAINNET_P2PKH,
        BITCOIN_MAINNET_P2SH => version::MAINNET_P2SH,
        BITCOIN_TESTNET_P2PKH => version::TESTNET_P2PKH,
        BITCOIN_TESTNET_P2SH => version::TESTNET_P2SH,
        other => other,
    }
}

/// Maps a Stacks address version back to its Bitcoin base58 version.
pub fn bitcoin_version_for(stacks_version: u8) -> u8 {
    match stacks_version {
        version::MAINNET_P2PKH => BITCOIN_MAINNET_P2PKH,
        version::MAINNET_P2SH => BITCOIN_MAINNET_P2SH,
        version::TESTNET_P2PKH => BITCOIN_TESTNET_P2PKH,
        version::TESTNET_P2SH => BITCOIN_TESTNET_P2SH,
        other => other,
    }
}

/// Re-encodes a base58check Bitcoin address as the equivalent Stacks address.
pub fn b58_to_c32(b58_address: &str) -> Result<String, C32Error> {
    let payload = bs58::decode(b58_address)
        .with_check(None)
        .into_vec()
        .map_err(|e| C32Error::Base58(e.to_string()))?;
    let (&bitcoin_version, hash) = payload.split_first().ok_or(C32Error::TooShort)?;
    c32_address(stacks_version_for(bitcoin_version), hash)
}

/// Re-encodes a Stacks address as the equivalent base58check Bitcoin address.
pub fn c32_to_b58(c32_address: &str) -> Result<String, C32Error> {
    let (stacks_version, hash) = c32_address_decode(c32_address)?;
    let mut payload = Vec::with_capacity(hash.len() + 1);
    payload.push(bitcoin_version_for(stacks_version));
    payload.extend_from_slice(&hash);
    Ok(bs58::encode(payload).with_check().into_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "a46ff88886c2ef9762d970b4d2c63678835bd39d";

    #[test]
    fn test_known_address() {
        let hash = hex::decode(HASH).unwrap();
        assert_eq!(
            c32_address(version::MAINNET_P2PKH, &hash).unwrap(),
            "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"
        );
    }

    #[test]
    fn test_b58_to_c32_matches_direct_encoding() {
        assert_eq!(
            b58_to_c32("1FzTxL9Mxnm2fdmnQEArfhzJHevwbvcH6d").unwrap(),
            "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"
        );
        assert_eq!(
            c32_to_b58("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7").unwrap(),
            "1FzTxL9Mxnm2fdmnQEArfhzJHevwbvcH6d"
        );
    }

    #[test]
    fn test_leading_zero_bytes_survive() {
        let data = [0u8, 0, 0x01, 0xff];
        let encoded = c32_encode(&data);
        assert!(encoded.starts_with("00"));
        assert_eq!(c32_decode(&encoded).unwrap(), data);

        assert_eq!(c32_encode(&[]), "");
        assert_eq!(c32_encode(&[0]), "0");
        assert_eq!(c32_decode("0").unwrap(), vec![0]);
    }

    #[test]
    fn test_small_values() {
        assert_eq!(c32_encode(&[31]), "Z");
        assert_eq!(c32_encode(&[32]), "10");
        assert_eq!(c32_decode("10").unwrap(), vec![32]);
    }

    #[test]
    fn test_decode_normalizes_lookalikes() {
        assert_eq!(c32_decode("1o").unwrap(), c32_decode("10").unwrap());
        assert_eq!(c32_decode("L0").unwrap(), c32_decode("10").unwrap());
        assert_eq!(c32_decode("U"), Err(C32Error::InvalidCharacter('U')));
    }

    #[test]
    fn test_address_decode_roundtrip() {
        let (version, hash) =
            c32_address_decode("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7").unwrap();
        assert_eq!(version, version::MAINNET_P2PKH);
        assert_eq!(hex::encode(hash), HASH);
    }

    #[test]
    fn test_checksum_mismatch_detected() {
        // Last digit altered
        assert_eq!(
            c32_address_decode("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ8"),
            Err(C32Error::ChecksumMismatch)
        );
        assert_eq!(
            c32_address_decode("XP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"),
            Err(C32Error::MissingPrefix)
        );
    }

    #[test]
    fn test_version_out_of_range() {
        assert_eq!(
            c32check_encode(32, &[1, 2, 3]),
            Err(C32Error::InvalidVersion(32))
        );
    }

    #[test]
    fn test_version_mapping() {
        assert_eq!(stacks_version_for(0), version::MAINNET_P2PKH);
        assert_eq!(stacks_version_for(111), version::TESTNET_P2PKH);
        assert_eq!(bitcoin_version_for(version::MAINNET_P2SH), 5);
        assert_eq!(bitcoin_version_for(version::TESTNET_P2SH), 196);
        assert_eq!(stacks_version_for(7), 7);
    }
}
