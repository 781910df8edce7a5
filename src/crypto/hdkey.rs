//! BIP32 hierarchical deterministic key derivation over secp256k1.

use std::fmt;

use hmac::{Hmac, Mac};
use secp256k1::{PublicKey, Scalar, SecretKey, SECP256K1};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Offset added to an index to mark it hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Errors raised while deriving keys.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeriveError {
    /// IL was >= the curve order or the resulting key was zero.
    #[error("derived key material is out of range at index {0}")]
    InvalidKey(u32),

    #[error("master key material is out of range")]
    InvalidMaster,

    #[cfg(test)]
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),
}

/// A single derivation path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildIndex {
    Normal(u32),
    Hardened(u32),
}

impl ChildIndex {
    /// Index as it is serialized into the HMAC input.
    #[inline]
    pub fn to_u32(self) -> u32 {
        match self {
            ChildIndex::Normal(i) => i,
            ChildIndex::Hardened(i) => i | HARDENED_OFFSET,
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildIndex::Normal(i) => write!(f, "{}", i),
            ChildIndex::Hardened(i) => write!(f, "{}'", i),
        }
    }
}

/// A derivation path such as `m/44'/5757'/0'/0/0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    /// `m/purpose'/coin'/0'/0/0`, the first receive key of the first account.
    pub fn bip44_style(purpose: u32, coin_type: u32) -> Self {
        Self(vec![
            ChildIndex::Hardened(purpose),
            ChildIndex::Hardened(coin_type),
            ChildIndex::Hardened(0),
            ChildIndex::Normal(0),
            ChildIndex::Normal(0),
        ])
    }

    pub fn segments(&self) -> &[ChildIndex] {
        &self.0
    }
}

/// Parses `m/...` notation; `'` and `h` both mark a hardened segment.
#[cfg(test)]
impl std::str::FromStr for DerivationPath {
    type Err = DeriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(DeriveError::InvalidPath(s.into()));
        }

        parts
            .map(|part| {
                let (digits, hardened) = match part
                    .strip_suffix('\'')
                    .or_else(|| part.strip_suffix('h'))
                {
                    Some(digits) => (digits, true),
                    None => (part, false),
                };
                let index: u32 = digits
                    .parse()
                    .map_err(|_| DeriveError::InvalidPath(s.into()))?;
                if index >= HARDENED_OFFSET {
                    return Err(DeriveError::InvalidPath(s.into()));
                }
                Ok(if hardened {
                    ChildIndex::Hardened(index)
                } else {
                    ChildIndex::Normal(index)
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(DerivationPath)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// An HD tree node: private key, its public key and the chain code.
#[derive(Clone)]
pub struct ExtendedKey {
    secret_key: SecretKey,
    public_key: PublicKey,
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Master node: HMAC-SHA512 keyed with "Bitcoin seed" over the seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, DeriveError> {
        let mut mac =
            HmacSha512::new_from_slice(b"Bitcoin seed").map_err(|_| DeriveError::InvalidMaster)?;
        mac.update(seed);
        let output = mac.finalize().into_bytes();

        let secret_key =
            SecretKey::from_slice(&output[..32]).map_err(|_| DeriveError::InvalidMaster)?;
        Ok(Self::from_parts(secret_key, &output[32..]))
    }

    fn from_parts(secret_key: SecretKey, chain_code: &[u8]) -> Self {
        let mut code = [0u8; 32];
        code.copy_from_slice(chain_code);
        Self {
            public_key: PublicKey::from_secret_key(SECP256K1, &secret_key),
            secret_key,
            chain_code: code,
        }
    }

    /// CKDpriv: derives one child.
    ///
    /// Hardened children hash `0x00 || k || index`, normal children hash
    /// `serP(K) || index`; the child key is `IL + k mod n`.
    pub fn derive_child(&self, index: ChildIndex) -> Result<Self, DeriveError> {
        let raw = index.to_u32();
        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .map_err(|_| DeriveError::InvalidKey(raw))?;
        if matches!(index, ChildIndex::Hardened(_)) {
            mac.update(&[0]);
            mac.update(&self.secret_key.secret_bytes());
        } else {
            mac.update(&self.public_key.serialize());
        }
        mac.update(&raw.to_be_bytes());
        let output = mac.finalize().into_bytes();

        let mut il = [0u8; 32];
        il.copy_from_slice(&output[..32]);
        let tweak = Scalar::from_be_bytes(il).map_err(|_| DeriveError::InvalidKey(raw))?;
        let child_key = self
            .secret_key
            .add_tweak(&tweak)
            .map_err(|_| DeriveError::InvalidKey(raw))?;

        Ok(Self::from_parts(child_key, &output[32..]))
    }

    /// Walks every segment of `path` from this node.
    pub fn derive(&self, path: &DerivationPath) -> Result<Self, DeriveError> {
        path.segments()
            .iter()
            .try_fold(self.clone(), |node, &index| node.derive_child(index))
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// The 32 private key bytes.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.secret_key.secret_bytes()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("public_key", &hex::encode(self.public_key.serialize()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP32 test vector 1
    const SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn master() -> ExtendedKey {
        ExtendedKey::from_seed(&hex::decode(SEED).unwrap()).unwrap()
    }

    #[test]
    fn test_master_from_seed() {
        let m = master();
        assert_eq!(
            hex::encode(m.private_key_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(m.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
    }

    #[test]
    fn test_hardened_then_normal_child() {
        let path: DerivationPath = "m/0'/1".parse().unwrap();
        let child = master().derive(&path).unwrap();
        assert_eq!(
            hex::encode(child.private_key_bytes()),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(
            hex::encode(child.chain_code()),
            "2a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c19"
        );
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let path = DerivationPath::bip44_style(44, 5757);
        let a = master().derive(&path).unwrap();
        let b = master().derive(&path).unwrap();
        assert_eq!(a.private_key_bytes(), b.private_key_bytes());
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_path_parse_and_display() {
        let path: DerivationPath = "m/44'/5757'/0'/0/0".parse().unwrap();
        assert_eq!(path, DerivationPath::bip44_style(44, 5757));
        assert_eq!(path.to_string(), "m/44'/5757'/0'/0/0");
        assert_eq!(path.segments()[1].to_u32(), 5757 | HARDENED_OFFSET);

        let h: DerivationPath = "m/84h/0h".parse().unwrap();
        assert_eq!(h.to_string(), "m/84'/0'");

        assert!("44'/0'".parse::<DerivationPath>().is_err());
        assert!("m/x".parse::<DerivationPath>().is_err());
        assert!("m/2147483648".parse::<DerivationPath>().is_err());
        assert_eq!("m".parse::<DerivationPath>().unwrap().segments().len(), 0);
    }
}
