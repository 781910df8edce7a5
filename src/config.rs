//! Runtime configuration for the vanity address generator.

use std::collections::HashSet;

use clap::Parser;

use crate::crypto::{BitcoinFormat, Network, Strength, StrengthError};
use crate::matcher::{Pattern, PatternType, Target};
use crate::wallet::WalletOptions;

/// Stacks (and Bitcoin) vanity address generator
#[derive(Parser, Debug, Clone)]
#[command(name = "stacks-vanity", author, version, about, long_about = None)]
pub struct Config {
    /// Vanity c32 slices to search for, like 123 or C0PA
    #[arg(value_name = "SLICE", required = true)]
    pub slices: Vec<String>,

    /// Search in the Bitcoin address instead of Stacks
    #[arg(short, long)]
    pub bitcoin: bool,

    /// Case sensitive matching (only valid for Bitcoin)
    #[arg(short = 'c', long)]
    pub case_sensitive: bool,

    /// Use the native segwit Bitcoin address
    #[arg(short, long, conflicts_with = "taproot")]
    pub native: bool,

    /// Use the taproot Bitcoin address
    #[arg(short = 'r', long)]
    pub taproot: bool,

    /// Match the suffix instead of the prefix
    #[arg(short, long)]
    pub suffix: bool,

    /// Testnet instead of mainnet
    #[arg(short, long)]
    pub testnet: bool,

    /// Mnemonic entropy in bits (128, 160, 192, 224 or 256)
    #[arg(long, default_value = "256")]
    pub strength: u32,

    /// Progress report interval in seconds (0 = no progress reports)
    #[arg(short = 'i', long, default_value = "10")]
    pub report_interval: u64,
}

/// Everything a search run needs, derived from a validated [`Config`].
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub patterns: Vec<Pattern>,
    pub options: WalletOptions,
}

impl Config {
    /// Returns the Bitcoin address format.
    pub fn format(&self) -> BitcoinFormat {
        if self.native {
            BitcoinFormat::NativeSegwit
        } else if self.taproot {
            BitcoinFormat::Taproot
        } else {
            BitcoinFormat::SegwitP2sh
        }
    }

    pub fn network(&self) -> Network {
        if self.testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        }
    }

    /// Returns which address is searched.
    pub fn target(&self) -> Target {
        if self.bitcoin {
            Target::Bitcoin(self.format())
        } else {
            Target::Stacks
        }
    }

    pub fn pattern_type(&self) -> PatternType {
        if self.suffix {
            PatternType::Suffix
        } else {
            PatternType::Prefix
        }
    }

    /// Case sensitivity only applies to Bitcoin; Stacks slices are always
    /// upper-cased.
    pub fn is_case_sensitive(&self) -> bool {
        self.bitcoin && self.case_sensitive
    }

    /// Returns the slices normalized for matching (upper-case unless case
    /// sensitive), checked against the target alphabet.
    pub fn normalized_slices(&self) -> Result<Vec<String>, ConfigError> {
        let target = self.target();
        let mut seen = HashSet::new();

        self.slices
            .iter()
            .map(|slice| {
                let normalized = if self.is_case_sensitive() {
                    slice.clone()
                } else {
                    slice.to_uppercase()
                };

                if !target.accepts(&normalized) {
                    return Err(ConfigError::InvalidSlice(slice.clone()));
                }
                if !seen.insert(normalized.clone()) {
                    return Err(ConfigError::DuplicateSlice(slice.clone()));
                }
                Ok(normalized)
            })
            .collect()
    }

    /// Returns the wallet derivation options.
    pub fn wallet_options(&self) -> Result<WalletOptions, ConfigError> {
        Ok(WalletOptions::new(
            self.network(),
            self.format(),
            Strength::from_bits(self.strength)?,
        ))
    }

    /// Validates the configuration and builds the search plan.
    pub fn plan(&self) -> Result<SearchPlan, ConfigError> {
        let target = self.target();
        let case_sensitive = self.is_case_sensitive();

        let patterns = self
            .normalized_slices()?
            .into_iter()
            .map(|slice| {
                let unreachable = target.unreachable_chars(&slice, case_sensitive);
                if !unreachable.is_empty() {
                    tracing::warn!(
                        slice = %slice,
                        chars = ?unreachable,
                        "slice contains characters {} addresses never have; this search cannot finish",
                        target
                    );
                }
                Pattern::new(slice, self.pattern_type(), target, case_sensitive)
            })
            .collect();

        Ok(SearchPlan {
            patterns,
            options: self.wallet_options()?,
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid vanity slice \"{0}\"")]
    InvalidSlice(String),

    #[error("duplicate vanity slice \"{0}\"")]
    DuplicateSlice(String),

    #[error(transparent)]
    Strength(#[from] StrengthError),
}
