//! Per-network constants: version bytes, bech32 prefixes and derivation paths.

use std::fmt;

use bech32::Hrp;

use super::c32;
use super::hdkey::DerivationPath;

/// The Bitcoin network the wallets are derived for. Stacks follows it
/// (mainnet `SP...`, testnet `ST...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// Derivation paths used for every generated wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPaths {
    /// Stacks account key, also exported as WIF
    pub stacks: DerivationPath,
    /// BIP49 P2SH-wrapped segwit
    pub segwit: DerivationPath,
    /// BIP84 native segwit
    pub native: DerivationPath,
    /// BIP86 taproot
    pub taproot: DerivationPath,
}

impl DerivationPaths {
    /// Builds the paths for `network`; the Bitcoin coin type is 0 on mainnet
    /// and 1 on testnet.
    pub fn for_network(network: Network) -> Self {
        let coin = match network {
            Network::Mainnet => 0,
            Network::Testnet => 1,
        };
        Self {
            stacks: DerivationPath::bip44_style(44, 5757),
            segwit: DerivationPath::bip44_style(49, coin),
            native: DerivationPath::bip44_style(84, coin),
            taproot: DerivationPath::bip44_style(86, coin),
        }
    }
}

/// Immutable bundle of network constants, built once and passed down to the
/// derivation and encoding layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    pub network: Network,
    /// WIF version byte (128 / 239)
    pub wif_version: u8,
    /// P2PKH base58 version byte (0 / 111)
    pub pubkey_hash_version: u8,
    /// P2SH base58 version byte (5 / 196)
    pub script_hash_version: u8,
    /// Stacks single-sig address version (22 `P` / 26 `T`)
    pub stacks_version: u8,
    /// Segwit human-readable part (`bc` / `tb`)
    pub hrp: Hrp,
    pub paths: DerivationPaths,
}

impl NetworkParams {
    pub fn new(network: Network) -> Self {
        match network {
            Network::Mainnet => Self {
                network,
                wif_version: 128,
                pubkey_hash_version: 0,
                script_hash_version: 5,
                stacks_version: c32::version::MAINNET_P2PKH,
                hrp: bech32::hrp::BC,
                paths: DerivationPaths::for_network(network),
            },
            Network::Testnet => Self {
                network,
                wif_version: 239,
                pubkey_hash_version: 111,
                script_hash_version: 196,
                stacks_version: c32::version::TESTNET_P2PKH,
                hrp: bech32::hrp::TB,
                paths: DerivationPaths::for_network(network),
            },
        }
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::new(Network::Mainnet)
    }
}
