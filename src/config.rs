use crate::consts::*;
use crate::helpers::parse_address;
use crate::prelude::Result;
use crate::Error;
use ethers::types::{Address, H256};
use log::debug;
use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn chain_id(self) -> u64 {
        match self {
            Network::Mainnet => CRONOS_MAINNET_CHAIN_ID,
            Network::Testnet => CRONOS_TESTNET_CHAIN_ID,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            CRONOS_MAINNET_CHAIN_ID => Some(Network::Mainnet),
            CRONOS_TESTNET_CHAIN_ID => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(Error::Config(format!(
                "unknown network {other:?}, expected \"mainnet\" or \"testnet\""
            ))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// Everything an operation needs to know about its target chain. Passed
/// explicitly into every operation; nothing is read from ambient state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    pub chain_id: u64,
    pub rpc_url: String,
    pub router_address: Address,
    pub wrapped_native_address: Address,
    pub native_symbol: String,
    pub explorer_url: String,
    /// Network name used inside payment envelopes.
    pub payment_network: String,
}

impl NetworkConfig {
    pub fn mainnet() -> Self {
        NetworkConfig {
            network: Network::Mainnet,
            chain_id: CRONOS_MAINNET_CHAIN_ID,
            rpc_url: CRONOS_MAINNET_RPC.to_string(),
            router_address: known_address(VVS_ROUTER),
            wrapped_native_address: known_address(WRAPPED_CRO),
            native_symbol: "CRO".to_string(),
            explorer_url: CRONOS_MAINNET_EXPLORER.to_string(),
            payment_network: PAYMENT_NETWORK_MAINNET.to_string(),
        }
    }

    pub fn testnet() -> Self {
        NetworkConfig {
            network: Network::Testnet,
            chain_id: CRONOS_TESTNET_CHAIN_ID,
            rpc_url: CRONOS_TESTNET_RPC.to_string(),
            router_address: known_address(VVS_ROUTER),
            wrapped_native_address: known_address(WRAPPED_CRO),
            native_symbol: "TCRO".to_string(),
            explorer_url: CRONOS_TESTNET_EXPLORER.to_string(),
            payment_network: PAYMENT_NETWORK_TESTNET.to_string(),
        }
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Build the config for `network`, applying overrides from the process
    /// environment (and `.env`, if present).
    ///
    /// Recognised variables: `CRONOS_RPC_URL` (mainnet), `CRONOS_TESTNET_RPC_URL`,
    /// `VVS_ROUTER_ADDRESS`, `WRAPPED_NATIVE_ADDRESS`.
    pub fn from_env(network: Network) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::for_network(network);
        let rpc_var = match network {
            Network::Mainnet => "CRONOS_RPC_URL",
            Network::Testnet => "CRONOS_TESTNET_RPC_URL",
        };
        if let Ok(url) = env::var(rpc_var) {
            debug!("{rpc_var} overrides rpc url for {network}");
            config.rpc_url = url;
        }
        if let Ok(router) = env::var("VVS_ROUTER_ADDRESS") {
            config.router_address = parse_address(&router)
                .map_err(|e| Error::Config(format!("VVS_ROUTER_ADDRESS: {e}")))?;
        }
        if let Ok(wrapped) = env::var("WRAPPED_NATIVE_ADDRESS") {
            config.wrapped_native_address = parse_address(&wrapped)
                .map_err(|e| Error::Config(format!("WRAPPED_NATIVE_ADDRESS: {e}")))?;
        }
        Ok(config)
    }

    pub fn tx_url(&self, hash: H256) -> String {
        format!("{}/tx/{hash:?}", self.explorer_url)
    }

    /// Resolve a user-supplied asset: a registry symbol (`"USDC"`), the native
    /// symbol, or a raw token address. The zero address means native.
    pub fn resolve_asset(&self, input: &str) -> Result<Asset> {
        let symbol = input.trim().to_ascii_uppercase();
        if symbol == "CRO" || symbol == self.native_symbol {
            return Ok(Asset::Native);
        }
        if let Some(address) = token_registry(self.network)
            .iter()
            .find(|(name, _)| *name == symbol)
            .map(|(_, address)| known_address(address))
        {
            return Ok(Asset::Token(address));
        }
        if input.trim().starts_with("0x") || input.trim().starts_with("0X") {
            let address = parse_address(input)?;
            return Ok(if address.is_zero() {
                Asset::Native
            } else {
                Asset::Token(address)
            });
        }
        let known: Vec<&str> = token_registry(self.network)
            .iter()
            .map(|(name, _)| *name)
            .collect();
        Err(Error::invalid_address(
            input,
            format!(
                "unknown token on {}; known tokens: {}, {}",
                self.network,
                self.native_symbol,
                known.join(", ")
            ),
        ))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    Token(Address),
}

impl Asset {
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Address used in routes and bridge intents (zero address for native).
    pub fn address(&self) -> Address {
        match self {
            Asset::Native => Address::zero(),
            Asset::Token(address) => *address,
        }
    }
}

fn token_registry(network: Network) -> &'static [(&'static str, &'static str)] {
    match network {
        Network::Mainnet => &[
            ("WCRO", WRAPPED_CRO),
            ("USDC", "0xc21223249CA28397B4B6541dfFaEcC539BfF0c59"),
            ("USDT", "0x66e428c3f67a68878562e79A0234c1F83c208770"),
            ("DAI", "0xF2001B145b43032AAF5Ee2884e456CCd805F677D"),
            ("WBTC", "0x062E66477Faf219F25E27e6b5C67602625781309"),
            ("WETH", "0xe44Fd7fCb2b1581822D0c862B68222998a0c299a"),
        ],
        Network::Testnet => &[("WTCRO", WRAPPED_CRO)],
    }
}

/// Token pairs known to the bridge: (symbol, decimals, [(chain id, address)]).
const BRIDGE_TOKENS: &[(&str, u8, &[(u64, &str)])] = &[(
    "USDC",
    6,
    &[
        (CRONOS_MAINNET_CHAIN_ID, "0xc21223249CA28397B4B6541dfFaEcC539BfF0c59"),
        (1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
    ],
)];

/// Counterpart of `token` (deployed on `source_chain`) on `destination_chain`.
pub fn bridge_counterpart(
    source_chain: u64,
    token: Address,
    destination_chain: u64,
) -> Option<Address> {
    BRIDGE_TOKENS.iter().find_map(|(_, _, deployments)| {
        let on_source = deployments
            .iter()
            .any(|(chain, address)| *chain == source_chain && known_address(address) == token);
        if !on_source {
            return None;
        }
        deployments
            .iter()
            .find(|(chain, _)| *chain == destination_chain)
            .map(|(_, address)| known_address(address))
    })
}

// Only ever called on the literals in this file.
fn known_address(literal: &str) -> Address {
    literal
        .parse()
        .unwrap_or_else(|_| panic!("invalid built-in address literal {literal}"))
}
