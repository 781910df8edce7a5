//! BIP39 mnemonic generation over the English word list.

use std::fmt;

use bip39::Mnemonic;
use rand::RngCore;

/// Mnemonic entropy strength in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strength(u32);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid mnemonic strength {0}: expected 128, 160, 192, 224 or 256 bits")]
pub struct StrengthError(pub u32);

impl Strength {
    pub const MIN_BITS: u32 = 128;
    pub const MAX_BITS: u32 = 256;

    /// Validates a bit count: a multiple of 32 between 128 and 256.
    pub fn from_bits(bits: u32) -> Result<Self, StrengthError> {
        if (Self::MIN_BITS..=Self::MAX_BITS).contains(&bits) && bits % 32 == 0 {
            Ok(Self(bits))
        } else {
            Err(StrengthError(bits))
        }
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Number of entropy bytes drawn per mnemonic.
    pub fn entropy_bytes(self) -> usize {
        (self.0 / 8) as usize
    }

    /// Words in the resulting phrase (3 words per 32 bits).
    pub fn word_count(self) -> usize {
        (self.0 / 32 * 3) as usize
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self(Self::MAX_BITS)
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bits ({} words)", self.0, self.word_count())
    }
}

/// Generates a fresh mnemonic from the thread-local CSPRNG.
pub fn generate_mnemonic(strength: Strength) -> Mnemonic {
    let mut entropy = [0u8; 32];
    let entropy = &mut entropy[..strength.entropy_bytes()];
    rand::thread_rng().fill_bytes(entropy);
    mnemonic_from_entropy(entropy)
}

/// Builds the mnemonic for `entropy` (checksum appended, 11-bit words).
///
/// `entropy` always comes from a validated [`Strength`], so every length
/// reaching this point is one BIP39 accepts.
fn mnemonic_from_entropy(entropy: &[u8]) -> Mnemonic {
    match Mnemonic::from_entropy(entropy) {
        Ok(mnemonic) => mnemonic,
        Err(e) => unreachable!("entropy of {} bytes rejected: {}", entropy.len(), e),
    }
}

/// BIP39 seed with an empty passphrase.
pub fn seed_from_mnemonic(mnemonic: &Mnemonic) -> [u8; 64] {
    mnemonic.to_seed("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_counts() {
        for (bits, words) in [(128, 12), (160, 15), (192, 18), (224, 21), (256, 24)] {
            let strength = Strength::from_bits(bits).unwrap();
            assert_eq!(strength.word_count(), words);
            assert_eq!(generate_mnemonic(strength).word_count(), words);
        }
    }

    #[test]
    fn test_invalid_strength() {
        for bits in [0, 96, 127, 129, 200, 288] {
            assert_eq!(Strength::from_bits(bits), Err(StrengthError(bits)));
        }
        assert_eq!(Strength::default().bits(), 256);
    }

    #[test]
    fn test_fresh_mnemonics_differ() {
        let a = generate_mnemonic(Strength::default());
        let b = generate_mnemonic(Strength::default());
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_known_seed() {
        let mnemonic = Mnemonic::parse(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        )
        .unwrap();
        let seed = seed_from_mnemonic(&mnemonic);
        assert_eq!(hex::encode(&seed[..16]), "5eb00bbddcf069084889a8ab91555681");
    }

    #[test]
    fn test_entropy_roundtrip() {
        let entropy = [0x7fu8; 16];
        let mnemonic = mnemonic_from_entropy(&entropy);
        assert_eq!(mnemonic.to_entropy(), entropy.to_vec());
    }
}
