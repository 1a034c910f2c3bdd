//! Router pricing and slippage-adjusted minimum output.
//!
//! All arithmetic is integer: the slippage percentage is parsed as an exact
//! decimal and the minimum output is
//! `expected * floor((100 - pct) * 100) / 10_000`, rounded down.

use crate::abi::{self, SwapDirection};
use crate::config::{Asset, NetworkConfig};
use crate::consts::{BPS_DENOMINATOR, DEFAULT_SLIPPAGE_BPS};
use crate::helpers::parse_units;
use crate::prelude::Result;
use crate::rpc::NetworkRpc;
use crate::Error;
use ethers::types::{Address, U256, U512};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slippage {
    bps: u32,
}

impl Slippage {
    pub fn from_bps(bps: u32) -> Result<Self> {
        if bps > BPS_DENOMINATOR {
            return Err(Error::invalid_amount(
                bps.to_string(),
                "slippage cannot exceed 10000 bps",
            ));
        }
        Ok(Slippage { bps })
    }

    /// Parse a percentage such as `"0.5"`. Precision beyond basis points rounds
    /// the kept share down, i.e. towards more tolerance.
    pub fn from_percent(percent: &str) -> Result<Self> {
        let scale = U256::exp10(18);
        let hundred = U256::from(100u64) * scale;
        let pct = parse_units(percent, 18)?;
        if pct > hundred {
            return Err(Error::invalid_amount(percent, "slippage cannot exceed 100%"));
        }
        let keep = (hundred - pct) * U256::from(100u64) / scale;
        Ok(Slippage {
            bps: BPS_DENOMINATOR - keep.as_u32(),
        })
    }

    pub fn bps(self) -> u32 {
        self.bps
    }

    pub fn minimum_out(self, expected: U256) -> U256 {
        let keep = U256::from(BPS_DENOMINATOR - self.bps);
        let scaled = expected.full_mul(keep) / U512::from(BPS_DENOMINATOR);
        // scaled <= expected, so it always fits.
        U256::try_from(scaled).unwrap_or(expected)
    }
}

impl Default for Slippage {
    fn default() -> Self {
        Slippage {
            bps: DEFAULT_SLIPPAGE_BPS,
        }
    }
}

impl FromStr for Slippage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_percent(s)
    }
}

impl fmt::Display for Slippage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.bps / 100, self.bps % 100)
    }
}

/// Transient router price for one request; never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub amount_in: U256,
    pub expected_amount_out: U256,
    pub minimum_amount_out: U256,
    pub route: Vec<Address>,
    pub slippage_bps: u32,
}

/// Router entry point and candidate paths (preferred first) for a pair.
pub fn candidate_paths(
    from: Asset,
    to: Asset,
    wrapped_native: Address,
) -> Result<(SwapDirection, Vec<Vec<Address>>)> {
    match (from, to) {
        (Asset::Native, Asset::Native) => Err(Error::NoRoute(
            "source and destination are both the native currency".to_string(),
        )),
        (Asset::Native, Asset::Token(token)) | (Asset::Token(token), Asset::Native)
            if token == wrapped_native =>
        {
            Err(Error::NoRoute(
                "wrapping and unwrapping go through the wrapped-native contract, not the router"
                    .to_string(),
            ))
        }
        (Asset::Native, Asset::Token(token)) => Ok((
            SwapDirection::NativeToToken,
            vec![vec![wrapped_native, token]],
        )),
        (Asset::Token(token), Asset::Native) => Ok((
            SwapDirection::TokenToNative,
            vec![vec![token, wrapped_native]],
        )),
        (Asset::Token(a), Asset::Token(b)) if a == b => Err(Error::NoRoute(format!(
            "source and destination are the same token {a:?}"
        ))),
        (Asset::Token(a), Asset::Token(b)) => {
            let mut paths = vec![vec![a, b]];
            if a != wrapped_native && b != wrapped_native {
                paths.push(vec![a, wrapped_native, b]);
            }
            Ok((SwapDirection::TokenToToken, paths))
        }
    }
}

#[derive(Debug)]
pub struct QuoteEngine<'a, R: NetworkRpc + ?Sized> {
    rpc: &'a R,
    network: &'a NetworkConfig,
}

impl<'a, R: NetworkRpc + ?Sized> QuoteEngine<'a, R> {
    pub fn new(rpc: &'a R, network: &'a NetworkConfig) -> Self {
        QuoteEngine { rpc, network }
    }

    /// Amounts along `path` as priced by the router right now.
    pub async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        let data = abi::encode_get_amounts_out(amount_in, path)?;
        let raw = self.rpc.call(self.network.router_address, data).await?;
        let amounts = abi::decode_amounts_out(&raw)?;
        if amounts.len() != path.len() {
            return Err(Error::NetworkError(format!(
                "router returned {} amounts for a {}-token path",
                amounts.len(),
                path.len()
            )));
        }
        Ok(amounts)
    }

    pub async fn quote(
        &self,
        from: Asset,
        to: Asset,
        amount_in: U256,
        slippage: Slippage,
    ) -> Result<Quote> {
        if amount_in.is_zero() {
            return Err(Error::invalid_amount("0", "swap amount must be positive"));
        }
        let (_, candidates) = candidate_paths(from, to, self.network.wrapped_native_address)?;

        let mut last_failure = String::from("router priced no candidate path");
        for path in candidates {
            match self.amounts_out(amount_in, &path).await {
                Ok(amounts) => {
                    let expected = amounts.last().copied().unwrap_or_default();
                    if expected.is_zero() {
                        last_failure = format!("path {path:?} returns zero output");
                        continue;
                    }
                    debug!("Quoted {amount_in} via {path:?}: {expected} out");
                    return Ok(Quote {
                        amount_in,
                        expected_amount_out: expected,
                        minimum_amount_out: slippage.minimum_out(expected),
                        route: path,
                        slippage_bps: slippage.bps(),
                    });
                }
                Err(err) => {
                    debug!("Path {path:?} unavailable: {err}");
                    last_failure = format!("path {path:?}: {err}");
                }
            }
        }
        Err(Error::NoRoute(last_failure))
    }
}
