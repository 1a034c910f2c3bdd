//! Gas limit and gas price selection.
//!
//! The limit is the node's estimate times [`GAS_SAFETY_MULTIPLIER`], never below
//! a per-call-type floor. When the node cannot simulate the call (reverts are
//! common for router calls that still succeed with enough gas, e.g. a swap
//! estimated before its approval is mined) the floor is used instead of
//! failing the operation. This fallback is expected behaviour.

use crate::consts::*;
use crate::prelude::Result;
use crate::rpc::NetworkRpc;
use crate::unsigned::TransactionDraft;
use ethers::types::{Address, U256};
use log::{debug, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallKind {
    NativeTransfer,
    TokenTransfer,
    Approval,
    NativeToTokenSwap,
    TokenSwap,
    Bridge,
}

impl CallKind {
    pub fn gas_floor(self) -> U256 {
        U256::from(match self {
            CallKind::NativeTransfer => NATIVE_TRANSFER_GAS_FLOOR,
            CallKind::TokenTransfer => TOKEN_TRANSFER_GAS_FLOOR,
            CallKind::Approval => APPROVAL_GAS_FLOOR,
            CallKind::NativeToTokenSwap => NATIVE_TO_TOKEN_SWAP_GAS_FLOOR,
            CallKind::TokenSwap => TOKEN_SWAP_GAS_FLOOR,
            CallKind::Bridge => BRIDGE_GAS_FLOOR,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FeeEstimate {
    pub gas_limit: U256,
    pub gas_price: U256,
    /// Raw node estimate; `None` when simulation failed and the floor was used.
    pub simulated: Option<U256>,
}

impl FeeEstimate {
    pub fn max_fee(&self) -> U256 {
        self.gas_limit.saturating_mul(self.gas_price)
    }

    pub fn used_fallback(&self) -> bool {
        self.simulated.is_none()
    }
}

/// Apply the safety multiplier and floor to a node estimate.
pub fn padded_gas_limit(simulated: U256, floor: U256) -> U256 {
    simulated
        .saturating_mul(U256::from(GAS_SAFETY_MULTIPLIER))
        .max(floor)
}

#[derive(Debug)]
pub struct FeeEstimator<'a, R: NetworkRpc + ?Sized> {
    rpc: &'a R,
}

impl<'a, R: NetworkRpc + ?Sized> FeeEstimator<'a, R> {
    pub fn new(rpc: &'a R) -> Self {
        FeeEstimator { rpc }
    }

    /// `min_gas_limit` raises the floor above the call kind's default (e.g. a
    /// gas hint supplied by a bridge quote).
    pub async fn estimate(
        &self,
        from: Address,
        draft: &TransactionDraft,
        kind: CallKind,
        min_gas_limit: Option<U256>,
    ) -> Result<FeeEstimate> {
        let gas_price = self.rpc.get_gas_price().await?;
        let floor = kind.gas_floor().max(min_gas_limit.unwrap_or_default());

        let estimate = match self.rpc.estimate_gas(&draft.call_request(from)).await {
            Ok(simulated) => {
                let gas_limit = padded_gas_limit(simulated, floor);
                debug!(
                    "{kind:?}: simulated {simulated} gas, using limit {gas_limit} (floor {floor})"
                );
                FeeEstimate {
                    gas_limit,
                    gas_price,
                    simulated: Some(simulated),
                }
            }
            Err(err) => {
                warn!("{kind:?}: gas estimation failed ({err}), falling back to floor {floor}");
                FeeEstimate {
                    gas_limit: floor,
                    gas_price,
                    simulated: None,
                }
            }
        };
        Ok(estimate)
    }
}
