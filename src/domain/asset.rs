//! Tradable assets and their asset classes.

use std::fmt;
use std::str::FromStr;

use super::error::DcaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Crypto,
    Stock,
}

impl AssetClass {
    /// Net gain (percent) required before the engine takes profit.
    pub fn default_profit_threshold_percent(&self) -> f64 {
        match self {
            AssetClass::Crypto => 1.0,
            AssetClass::Stock => 2.0,
        }
    }

    /// `[data]` key naming the directory this class's prices are read from.
    pub fn data_dir_key(&self) -> &'static str {
        match self {
            AssetClass::Crypto => "crypto_dir",
            AssetClass::Stock => "stock_dir",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Crypto => "crypto",
            AssetClass::Stock => "stock",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Bitcoin,
    Solana,
    Ethereum,
    Xrp,
    Cardano,
    Shiba,
    Sp500,
    Nvda,
}

impl Asset {
    pub const ALL: [Asset; 8] = [
        Asset::Bitcoin,
        Asset::Solana,
        Asset::Ethereum,
        Asset::Xrp,
        Asset::Cardano,
        Asset::Shiba,
        Asset::Sp500,
        Asset::Nvda,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "bitcoin",
            Asset::Solana => "solana",
            Asset::Ethereum => "ethereum",
            Asset::Xrp => "xrp",
            Asset::Cardano => "cardano",
            Asset::Shiba => "shiba",
            Asset::Sp500 => "sp500",
            Asset::Nvda => "nvda",
        }
    }

    /// Market symbol as the price provider knows it.
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "BTCUSDT",
            Asset::Solana => "SOLUSDT",
            Asset::Ethereum => "ETHUSDT",
            Asset::Xrp => "XRPUSDT",
            Asset::Cardano => "ADAUSDT",
            Asset::Shiba => "SHIBUSDT",
            Asset::Sp500 => "^GSPC",
            Asset::Nvda => "NVDA",
        }
    }

    pub fn class(&self) -> AssetClass {
        match self {
            Asset::Sp500 | Asset::Nvda => AssetClass::Stock,
            _ => AssetClass::Crypto,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Asset {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Asset::ALL
            .iter()
            .copied()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| DcaError::UnknownAsset {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Bitcoin".parse::<Asset>().unwrap(), Asset::Bitcoin);
        assert_eq!(" NVDA ".parse::<Asset>().unwrap(), Asset::Nvda);
    }

    #[test]
    fn parse_unknown_asset_fails() {
        let err = "dogecoin".parse::<Asset>().unwrap_err();
        assert!(matches!(err, DcaError::UnknownAsset { name } if name == "dogecoin"));
    }

    #[test]
    fn every_asset_round_trips_through_name() {
        for asset in Asset::ALL {
            assert_eq!(asset.name().parse::<Asset>().unwrap(), asset);
        }
    }

    #[test]
    fn classes_and_thresholds() {
        assert_eq!(Asset::Solana.class(), AssetClass::Crypto);
        assert_eq!(Asset::Sp500.class(), AssetClass::Stock);
        assert_eq!(AssetClass::Crypto.default_profit_threshold_percent(), 1.0);
        assert_eq!(AssetClass::Stock.default_profit_threshold_percent(), 2.0);
    }

    #[test]
    fn symbols() {
        assert_eq!(Asset::Cardano.symbol(), "ADAUSDT");
        assert_eq!(Asset::Sp500.symbol(), "^GSPC");
    }

    #[test]
    fn data_dir_keys() {
        assert_eq!(AssetClass::Crypto.data_dir_key(), "crypto_dir");
        assert_eq!(AssetClass::Stock.data_dir_key(), "stock_dir");
    }
}
