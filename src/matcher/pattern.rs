//! Pattern matching implementation.

use crate::crypto::c32::C32_ALPHABET;
use crate::crypto::BitcoinFormat;
use crate::wallet::Wallet;

/// Fixed `S` + version prefix of every Stacks address.
const STACKS_PREFIX_LEN: usize = 2;

/// Expected wallets per match of the first character of a Stacks body.
///
/// The c32 payload (hash160 and checksum) is 192 bits, so a full-length body
/// opens with a digit holding only the top two bits: 1, 2 or 3 for three
/// addresses in four. Other digits lead the one-digit-shorter bodies (1 in
/// 128 each), and `0` only appears for a leading zero byte.
fn stacks_leading_odds(first: u8) -> u64 {
    match C32_ALPHABET.iter().position(|&c| c == first) {
        Some(0) => 256,
        Some(1..=3) => 4,
        _ => 128,
    }
}

/// The type of pattern matching to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternType {
    /// Match at the beginning of the address body
    #[default]
    Prefix,
    /// Match at the end of the address
    Suffix,
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternType::Prefix => write!(f, "prefix"),
            PatternType::Suffix => write!(f, "suffix"),
        }
    }
}

/// Which of a wallet's addresses is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Stacks,
    Bitcoin(BitcoinFormat),
}

impl Target {
    /// Length of the fixed leading part skipped before matching.
    pub fn prefix_len(self) -> usize {
        match self {
            Target::Stacks => STACKS_PREFIX_LEN,
            Target::Bitcoin(format) => format.prefix_len(),
        }
    }

    /// Maximum slice length accepted on the command line.
    pub const MAX_SLICE_LEN: usize = 10;

    /// Returns true if `slice` is made of characters valid for this target:
    /// c32 digits for Stacks, ASCII alphanumerics for Bitcoin.
    pub fn accepts(self, slice: &str) -> bool {
        if slice.is_empty() || slice.len() > Self::MAX_SLICE_LEN {
            return false;
        }
        match self {
            Target::Stacks => slice.bytes().all(|c| C32_ALPHABET.contains(&c)),
            Target::Bitcoin(_) => slice.bytes().all(|c| c.is_ascii_alphanumeric()),
        }
    }

    /// Characters of `slice` that no address body of this target contains.
    pub fn unreachable_chars(self, slice: &str, case_sensitive: bool) -> Vec<char> {
        let alphabet = match self {
            Target::Stacks => return Vec::new(),
            Target::Bitcoin(format) => format.alphabet(),
        };
        slice
            .chars()
            .filter(|&c| {
                if case_sensitive {
                    !alphabet.contains(c)
                } else {
                    !alphabet.chars().any(|a| a.eq_ignore_ascii_case(&c))
                }
            })
            .collect()
    }

    /// Number of distinct symbols one matched character is drawn from.
    fn symbol_count(self, case_sensitive: bool) -> u64 {
        match self {
            Target::Stacks => 32,
            Target::Bitcoin(BitcoinFormat::SegwitP2sh) if case_sensitive => 58,
            // base58 folded to upper case: 1-9 and A-Z
            Target::Bitcoin(BitcoinFormat::SegwitP2sh) => 35,
            Target::Bitcoin(_) => 32,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Stacks => write!(f, "stacks"),
            Target::Bitcoin(format) => write!(f, "bitcoin {}", format),
        }
    }
}

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// A vanity slice bound to its target address and matching mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// The slice (upper-cased unless case sensitive)
    slice: String,
    /// The pattern type
    pattern_type: PatternType,
    /// Which address is matched
    target: Target,
    /// Whether matching is case sensitive
    case_sensitive: bool,
}

impl Pattern {
    /// Creates a new pattern.
    ///
    /// Stacks addresses are always compared case-insensitively; the flag only
    /// applies to Bitcoin targets.
    pub fn new(
        slice: impl Into<String>,
        pattern_type: PatternType,
        target: Target,
        case_sensitive: bool,
    ) -> Self {
        let case_sensitive = case_sensitive && matches!(target, Target::Bitcoin(_));
        let slice = slice.into();
        let slice = if case_sensitive {
            slice
        } else {
            slice.to_uppercase()
        };

        Self {
            slice,
            pattern_type,
            target,
            case_sensitive,
        }
    }

    /// Returns the slice being searched for.
    pub fn slice(&self) -> &str {
        &self.slice
    }

    /// Returns the pattern type.
    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Matches the targeted address of a wallet.
    #[inline]
    pub fn matches(&self, wallet: &Wallet) -> MatchResult {
        let addresses = wallet.addresses();
        match self.target {
            Target::Stacks => self.matches_address(&addresses.stacks),
            Target::Bitcoin(_) => self.matches_address(&addresses.bitcoin),
        }
    }

    /// Matches a full address string of this pattern's target.
    pub fn matches_address(&self, address: &str) -> MatchResult {
        let body = match address.get(self.target.prefix_len()..) {
            Some(body) => body,
            None => return MatchResult::NoMatch,
        };

        let matched = if self.case_sensitive {
            self.test(body)
        } else {
            self.test(&body.to_uppercase())
        };

        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    #[inline]
    fn test(&self, body: &str) -> bool {
        match self.pattern_type {
            PatternType::Prefix => body.starts_with(&self.slice),
            PatternType::Suffix => body.ends_with(&self.slice),
        }
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// Each character is treated as uniformly drawn from the target alphabet,
    /// so expected attempts = alphabet^n, except for the first character of a
    /// Stacks prefix (see [`stacks_leading_odds`]). Bitcoin prefixes ignore
    /// the bias of the character after the version prefix.
    pub fn estimated_difficulty(&self) -> u64 {
        let symbols = self.target.symbol_count(self.case_sensitive);
        let n = self.slice.len() as u32;

        match (self.target, self.pattern_type, self.slice.bytes().next()) {
            (Target::Stacks, PatternType::Prefix, Some(first)) => {
                stacks_leading_odds(first).saturating_mul(symbols.saturating_pow(n - 1))
            }
            _ => symbols.saturating_pow(n),
        }
    }

    /// Returns a human-readable difficulty estimate.
    ///
    /// Wallet derivation runs PBKDF2 per candidate, so a core manages a few
    /// hundred candidates per second.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (seconds)".into(),
            1_001..=100_000 => "Easy (minutes)".into(),
            100_001..=10_000_000 => "Medium (hours)".into(),
            10_000_001..=1_000_000_000 => "Hard (weeks)".into(),
            _ => "Very Hard (years or more)".into(),
        }
    }
}
