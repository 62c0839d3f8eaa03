/// Supported UTXO networks.
///
/// Each network fixes its address parameters; adding a network means adding
/// one arm to each match below, not new logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtxoNetwork {
    LitecoinMainnet,
    LitecoinTestnet,
    BitcoinMainnet,
    BitcoinTestnet,
}

impl UtxoNetwork {
    /// Human-readable part of native SegWit addresses.
    pub fn bech32_hrp(self) -> &'static str {
        match self {
            UtxoNetwork::LitecoinMainnet => "ltc",
            UtxoNetwork::LitecoinTestnet => "tltc",
            UtxoNetwork::BitcoinMainnet => "bc",
            UtxoNetwork::BitcoinTestnet => "tb",
        }
    }

    /// Base58Check version byte of P2PKH addresses.
    pub fn p2pkh_version(self) -> u8 {
        match self {
            UtxoNetwork::LitecoinMainnet => 0x30,
            UtxoNetwork::LitecoinTestnet | UtxoNetwork::BitcoinTestnet => 0x6f,
            UtxoNetwork::BitcoinMainnet => 0x00,
        }
    }

    /// Base58Check version bytes accepted for P2SH addresses.
    ///
    /// The first entry is the one used when producing addresses. Litecoin
    /// still accepts the legacy `3...` / `2...` prefixes it shared with Bitcoin.
    pub fn p2sh_versions(self) -> &'static [u8] {
        match self {
            UtxoNetwork::LitecoinMainnet => &[0x32, 0x05],
            UtxoNetwork::LitecoinTestnet => &[0x3a, 0xc4],
            UtxoNetwork::BitcoinMainnet => &[0x05],
            UtxoNetwork::BitcoinTestnet => &[0xc4],
        }
    }

    /// Preferred P2SH version byte.
    pub fn p2sh_version(self) -> u8 {
        self.p2sh_versions()[0]
    }

    /// SLIP-44 coin type used in derivation paths.
    pub fn coin_type(self) -> u32 {
        match self {
            UtxoNetwork::LitecoinMainnet => 2,
            UtxoNetwork::BitcoinMainnet => 0,
            UtxoNetwork::LitecoinTestnet | UtxoNetwork::BitcoinTestnet => 1,
        }
    }

    /// Ticker of the native asset.
    pub fn symbol(self) -> &'static str {
        match self {
            UtxoNetwork::LitecoinMainnet | UtxoNetwork::LitecoinTestnet => "LTC",
            UtxoNetwork::BitcoinMainnet | UtxoNetwork::BitcoinTestnet => "BTC",
        }
    }

    pub fn is_testnet(self) -> bool {
        matches!(
            self,
            UtxoNetwork::LitecoinTestnet | UtxoNetwork::BitcoinTestnet
        )
    }
}

impl std::fmt::Display for UtxoNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UtxoNetwork::LitecoinMainnet => write!(f, "litecoin"),
            UtxoNetwork::LitecoinTestnet => write!(f, "litecoin-testnet"),
            UtxoNetwork::BitcoinMainnet => write!(f, "bitcoin"),
            UtxoNetwork::BitcoinTestnet => write!(f, "bitcoin-testnet"),
        }
    }
}
