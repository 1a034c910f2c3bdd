use super::TransactionDraft;
use crate::config::NetworkConfig;
use crate::helpers::{parse_address, parse_units};
use crate::prelude::Result;
use ethers::types::{Address, Bytes, U256};

/// Turns operation parameters into a [`TransactionDraft`] bound to one network.
///
/// Validation happens here, before any network call: malformed recipients fail
/// with `InvalidAddress`, inexact amounts with `InvalidAmount`.
#[derive(Debug, Clone)]
pub struct TransactionBuilder<'a> {
    pub network: &'a NetworkConfig,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(network: &'a NetworkConfig) -> Self {
        TransactionBuilder { network }
    }

    pub fn build(&self, to: &str, value: U256, data: Option<Bytes>) -> Result<TransactionDraft> {
        let to = parse_address(to)?;
        Ok(self.build_to(to, value, data))
    }

    /// Like [`build`](Self::build) with `amount` given in human units of a token
    /// with `decimals` decimals.
    pub fn build_with_amount(
        &self,
        to: &str,
        amount: &str,
        decimals: u8,
        data: Option<Bytes>,
    ) -> Result<TransactionDraft> {
        let to = parse_address(to)?;
        let value = parse_units(amount, decimals)?;
        Ok(self.build_to(to, value, data))
    }

    /// For destinations that are already validated (router, token contract).
    pub fn build_to(&self, to: Address, value: U256, data: Option<Bytes>) -> TransactionDraft {
        TransactionDraft {
            to,
            value,
            data: data.unwrap_or_default(),
            chain_id: self.network.chain_id,
        }
    }
}
