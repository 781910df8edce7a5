//! Wallet assembly: mnemonic -> keys -> addresses.

use std::fmt;

use bip39::Mnemonic;

use crate::crypto::address::{self, AddressError, BitcoinFormat};
use crate::crypto::{
    generate_mnemonic, seed_from_mnemonic, DeriveError, ExtendedKey, Network, NetworkParams,
    Strength,
};

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error(transparent)]
    Derive(#[from] DeriveError),

    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Options every wallet of a run is derived with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalletOptions {
    pub params: NetworkParams,
    pub format: BitcoinFormat,
    pub strength: Strength,
}

impl WalletOptions {
    pub fn new(network: Network, format: BitcoinFormat, strength: Strength) -> Self {
        Self {
            params: NetworkParams::new(network),
            format,
            strength,
        }
    }

    pub fn network(&self) -> Network {
        self.params.network
    }
}

/// Addresses derived for one wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addresses {
    /// Stacks address of the `m/44'/5757'/0'/0/0` key
    pub stacks: String,
    /// Bitcoin address of the configured format
    pub bitcoin: String,
}

/// A generated wallet.
#[derive(Clone, PartialEq, Eq)]
pub struct Wallet {
    mnemonic: Mnemonic,
    wif: String,
    addresses: Addresses,
}

impl Wallet {
    /// Generates a wallet from a fresh random mnemonic.
    pub fn generate(options: &WalletOptions) -> Result<Self, WalletError> {
        Self::from_mnemonic(generate_mnemonic(options.strength), options)
    }

    /// Derives the wallet for `mnemonic`. The result depends only on the
    /// mnemonic and `options`.
    pub fn from_mnemonic(mnemonic: Mnemonic, options: &WalletOptions) -> Result<Self, WalletError> {
        let params = &options.params;
        let root = ExtendedKey::from_seed(&seed_from_mnemonic(&mnemonic))?;

        let stacks_key = root.derive(&params.paths.stacks)?;
        let wif = address::wif(stacks_key.secret_key(), params);
        let stacks = address::stacks_address(stacks_key.public_key(), params)?;

        let bitcoin_path = match options.format {
            BitcoinFormat::SegwitP2sh => &params.paths.segwit,
            BitcoinFormat::NativeSegwit => &params.paths.native,
            BitcoinFormat::Taproot => &params.paths.taproot,
        };
        let bitcoin_key = root.derive(bitcoin_path)?;
        let bitcoin = address::bitcoin_address(bitcoin_key.public_key(), options.format, params)?;

        Ok(Self {
            mnemonic,
            wif,
            addresses: Addresses { stacks, bitcoin },
        })
    }

    pub fn mnemonic(&self) -> &Mnemonic {
        &self.mnemonic
    }

    /// WIF export of the Stacks key.
    pub fn wif(&self) -> &str {
        &self.wif
    }

    pub fn addresses(&self) -> &Addresses {
        &self.addresses
    }

    /// A wallet with arbitrary addresses, for driving searches in tests.
    #[cfg(test)]
    pub(crate) fn synthetic(stacks: &str, bitcoin: &str) -> Self {
        Self {
            mnemonic: Mnemonic::from_entropy(&[0u8; 16]).unwrap(),
            wif: String::new(),
            addresses: Addresses {
                stacks: stacks.into(),
                bitcoin: bitcoin.into(),
            },
        }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn abandon() -> Mnemonic {
        Mnemonic::parse(ABANDON).unwrap()
    }

    fn options(network: Network, format: BitcoinFormat) -> WalletOptions {
        WalletOptions::new(network, format, Strength::default())
    }

    #[test]
    fn test_mainnet_reference_wallet() {
        let wallet =
            Wallet::from_mnemonic(abandon(), &options(Network::Mainnet, BitcoinFormat::SegwitP2sh))
                .unwrap();
        assert_eq!(
            wallet.addresses().stacks,
            "SPC5KHM41H6WHAST7MWWDD807YSPRQKJ69FSH54J"
        );
        assert_eq!(wallet.addresses().bitcoin, "37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf");
        assert_eq!(
            wallet.wif(),
            "Kyc9n7rrNLprDXUqRDRorHFkkRb4Z7mpPvyeSCT4gwPYFHGdGVwH"
        );
        assert_eq!(wallet.mnemonic().to_string(), ABANDON);
    }

    #[test]
    fn test_bitcoin_formats() {
        let native =
            Wallet::from_mnemonic(abandon(), &options(Network::Mainnet, BitcoinFormat::NativeSegwit))
                .unwrap();
        assert_eq!(
            native.addresses().bitcoin,
            "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"
        );

        let taproot =
            Wallet::from_mnemonic(abandon(), &options(Network::Mainnet, BitcoinFormat::Taproot))
                .unwrap();
        assert_eq!(
            taproot.addresses().bitcoin,
            "bc1pej9yh3jd39aam30mctm8paaghg9nsemezpk0zg3udlza0nt0cy2sqvps98"
        );
        // The Stacks side does not depend on the Bitcoin format.
        assert_eq!(native.addresses().stacks, taproot.addresses().stacks);
    }

    #[test]
    fn test_testnet_reference_wallet() {
        let wallet =
            Wallet::from_mnemonic(abandon(), &options(Network::Testnet, BitcoinFormat::SegwitP2sh))
                .unwrap();
        assert_eq!(
            wallet.addresses().stacks,
            "STC5KHM41H6WHAST7MWWDD807YSPRQKJ68T330BQ"
        );
        assert_eq!(wallet.addresses().bitcoin, "2Mww8dCYPUpKHofjgcXcBCEGmniw9CoaiD2");
        assert_eq!(
            wallet.wif(),
            "cPy9F2rhoQX7Nxx6odEwDbkpNetUDZsWTy87YcuaC43YW2KLeLqQ"
        );

        let native =
            Wallet::from_mnemonic(abandon(), &options(Network::Testnet, BitcoinFormat::NativeSegwit))
                .unwrap();
        assert_eq!(
            native.addresses().bitcoin,
            "tb1q6rz28mcfaxtmd6v789l9rrlrusdprr9pqcpvkl"
        );
    }

    #[test]
    fn test_rederivation_is_identical() {
        let opts = options(Network::Mainnet, BitcoinFormat::Taproot);
        let first = Wallet::generate(&opts).unwrap();
        let again = Wallet::from_mnemonic(first.mnemonic().clone(), &opts).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_generated_wallet_shapes() {
        let opts = WalletOptions::new(
            Network::Testnet,
            BitcoinFormat::SegwitP2sh,
            Strength::from_bits(128).unwrap(),
        );
        let wallet = Wallet::generate(&opts).unwrap();
        assert_eq!(wallet.mnemonic().word_count(), 12);
        assert!(wallet.addresses().stacks.starts_with("ST"));
        assert!(wallet.addresses().bitcoin.starts_with('2'));
        assert!(wallet.wif().starts_with('c'));
    }
}
