//! # stacks_vanity
//!
//! Vanity address search for Stacks and Bitcoin wallets backed by BIP39
//! mnemonics.
//!
//! ## Architecture
//!
//! - `crypto`: Mnemonics, BIP32 derivation and address encodings
//! - `wallet`: Wallet assembly from a mnemonic
//! - `matcher`: Slice matching against address bodies
//! - `worker`: Per-slice search loops and their coordinator
//! - `config`: Command line configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod wallet;
pub mod worker;

pub use config::{Config, ConfigError, SearchPlan};
pub use crypto::{BitcoinFormat, Network, Strength};
pub use matcher::{MatchResult, Pattern, PatternType, Target};
pub use wallet::{Addresses, Wallet, WalletError, WalletOptions};
pub use worker::{SearchCoordinator, SearchError, SearchResult};
