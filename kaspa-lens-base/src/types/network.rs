use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, EnumIter, EnumString};

pub const MAINNET_ADDRESS_PREFIX: &str = "kaspa:";
pub const TESTNET_ADDRESS_PREFIX: &str = "kaspatest:";

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Network {
    #[default]
    #[strum(serialize = "kaspa_mainnet")]
    #[serde(rename = "kaspa_mainnet")]
    Mainnet,
    #[strum(serialize = "kaspa_testnet_10")]
    #[serde(rename = "kaspa_testnet_10")]
    Testnet10,
}

impl Network {
    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Testnet10)
    }

    pub fn address_prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_ADDRESS_PREFIX,
            Network::Testnet10 => TESTNET_ADDRESS_PREFIX,
        }
    }

    // 根据地址前缀推断网络
    pub fn from_address(address: &str) -> Option<Self> {
        let address = address.to_lowercase();

        if address.starts_with(TESTNET_ADDRESS_PREFIX) {
            Some(Network::Testnet10)
        } else if address.starts_with(MAINNET_ADDRESS_PREFIX) {
            Some(Network::Mainnet)
        } else {
            None
        }
    }
}

impl From<Network> for String {
    fn from(value: Network) -> Self {
        value.as_ref().to_string()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network() {
        let network = "kaspa_testnet_10".parse::<Network>().unwrap();
        assert_eq!(network, Network::Testnet10);
        assert!(network.is_testnet());
        assert_eq!(Network::Mainnet.as_ref(), "kaspa_mainnet");

        let err = "kaspa_devnet".parse::<Network>().unwrap_err();
        assert_eq!(err.to_string(), "Matching variant not found");
    }

    #[test]
    fn test_network_from_address() {
        assert_eq!(
            Network::from_address("kaspatest:qpnq3pt49cqn7xmu"),
            Some(Network::Testnet10)
        );
        assert_eq!(
            Network::from_address("Kaspa:qz0s9fr6a4"),
            Some(Network::Mainnet)
        );
        assert_eq!(Network::from_address("bitcoin:1abc"), None);
    }
}
