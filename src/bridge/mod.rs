mod symbiosis;

pub use symbiosis::SymbiosisClient;

use crate::helpers::{parse_address, parse_hex_bytes};
use crate::prelude::Result;
use crate::Error;
use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256, U256};
use std::fmt::Debug;

/// A cross-chain transfer request as sent to the quote service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeIntent {
    pub source_chain: u64,
    pub destination_chain: u64,
    pub from_token: Address,
    pub to_token: Address,
    pub amount: U256,
    pub recipient: Address,
    pub sender: Address,
    pub slippage_bps: u32,
}

/// Unsigned call returned by the quote service. Untrusted until
/// [`validate`](Self::validate) has accepted it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BridgeQuote {
    pub to: String,
    pub data: String,
    pub value: U256,
    pub gas_limit: Option<U256>,
    /// Contract that pulls the tokens, when it differs from `to`.
    pub approve_to: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeCall {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: Option<U256>,
    pub spender: Address,
}

impl BridgeQuote {
    /// Reject quotes that would strand or overdraw funds: empty call data, a
    /// target that is not an address, or a native value other than the one
    /// `intent` asked to move (the bridged amount for native, zero for tokens).
    pub fn validate(&self, intent: &BridgeIntent) -> Result<BridgeCall> {
        let data = parse_hex_bytes(&self.data).map_err(|e| {
            Error::InvalidBridgeResponse(format!("call data {:?} is not hex: {e}", self.data))
        })?;
        if data.is_empty() {
            return Err(Error::InvalidBridgeResponse(
                "quote returned empty call data; broadcasting it would send funds to the \
                 bridge with no cross-chain leg"
                    .to_string(),
            ));
        }
        let to = parse_address(&self.to)
            .map_err(|e| Error::InvalidBridgeResponse(format!("transaction target: {e}")))?;
        if to.is_zero() {
            return Err(Error::InvalidBridgeResponse(
                "transaction target is the zero address".to_string(),
            ));
        }
        let expected_value = if intent.from_token.is_zero() {
            intent.amount
        } else {
            U256::zero()
        };
        if self.value != expected_value {
            return Err(Error::InvalidBridgeResponse(format!(
                "quote attaches value {} but bridging {} of {:?} requires {expected_value}",
                self.value, intent.amount, intent.from_token
            )));
        }
        let spender = match &self.approve_to {
            Some(spender) if !spender.is_empty() => parse_address(spender)
                .map_err(|e| Error::InvalidBridgeResponse(format!("approveTo: {e}")))?,
            _ => to,
        };
        Ok(BridgeCall {
            to,
            data,
            value: self.value,
            gas_limit: self.gas_limit,
            spender,
        })
    }
}

#[async_trait]
pub trait BridgeQuoteService: Debug + Send + Sync {
    async fn request_quote(&self, intent: &BridgeIntent) -> Result<BridgeQuote>;

    /// Cross-chain status of a source-chain transaction; `None` while the
    /// service has not seen it yet.
    async fn transfer_status(&self, chain_id: u64, hash: H256) -> Result<Option<serde_json::Value>>;
}
