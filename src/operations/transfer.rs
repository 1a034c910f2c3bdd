use super::{OperationClient, OperationKind, OperationResult, OperationStage, StageTracker};
use crate::abi;
use crate::config::{Asset, NetworkConfig};
use crate::consts::NATIVE_DECIMALS;
use crate::fee::CallKind;
use crate::helpers::{parse_address, parse_units, validate_positive_amount};
use crate::prelude::Result;
use crate::rpc::NetworkRpc;
use crate::unsigned::{TransactionBuilder, TransactionDraft};
use crate::Error;
use ethers::types::{Address, U256};
use log::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferParams {
    pub recipient: String,
    /// Human units, e.g. `"1.5"`.
    pub amount: String,
    pub asset: Asset,
}

impl TransferParams {
    pub fn native(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        TransferParams {
            recipient: recipient.into(),
            amount: amount.into(),
            asset: Asset::Native,
        }
    }

    pub fn token(recipient: impl Into<String>, amount: impl Into<String>, token: Address) -> Self {
        TransferParams {
            recipient: recipient.into(),
            amount: amount.into(),
            asset: Asset::Token(token),
        }
    }
}

pub(super) fn parse_recipient(recipient: &str) -> Result<Address> {
    let address = parse_address(recipient)?;
    if address.is_zero() {
        return Err(Error::invalid_address(recipient, "refusing to send to the zero address"));
    }
    Ok(address)
}

pub(super) fn parse_positive_amount(amount: &str, decimals: u8) -> Result<U256> {
    let value = parse_units(amount, decimals)?;
    if value.is_zero() {
        return Err(Error::invalid_amount(amount, "amount must be greater than zero"));
    }
    Ok(value)
}

/// Everything about `amount` that can be checked before the first network
/// call. Token amounts get their exact-decimals check once `decimals()` is read.
pub(super) fn precheck_amount(amount: &str, asset: Asset) -> Result<()> {
    validate_positive_amount(amount)?;
    if asset.is_native() {
        parse_units(amount, NATIVE_DECIMALS)?;
    }
    Ok(())
}

impl<R: NetworkRpc> OperationClient<R> {
    /// Send native currency or an ERC-20 token. Returns as soon as the node
    /// accepts the transaction.
    pub async fn transfer(
        &mut self,
        network: &NetworkConfig,
        params: TransferParams,
    ) -> Result<OperationResult> {
        let mut tracker = StageTracker::start(OperationKind::Transfer);
        let recipient = parse_recipient(&params.recipient)?;
        precheck_amount(&params.amount, params.asset)?;
        self.ensure_rpc_chain(network).await?;

        let (draft, kind) = self.transfer_draft(network, &params, recipient).await?;
        tracker.advance(OperationStage::Estimating);
        let fees = self.prepare(network, &draft, kind, None).await?;
        self.execute(network, draft, fees, tracker, None).await
    }

    pub(super) async fn transfer_draft(
        &self,
        network: &NetworkConfig,
        params: &TransferParams,
        recipient: Address,
    ) -> Result<(TransactionDraft, CallKind)> {
        let decimals = self.token_decimals(params.asset).await?;
        let amount = parse_positive_amount(&params.amount, decimals)?;
        let builder = TransactionBuilder::new(network);
        match params.asset {
            Asset::Native => {
                info!(
                    "Transfer {} {} to {recipient:?}",
                    params.amount, network.native_symbol
                );
                Ok((builder.build_to(recipient, amount, None), CallKind::NativeTransfer))
            }
            Asset::Token(token) => {
                self.broadcaster()
                    .ensure_token_balance(token, self.address(), amount, decimals)
                    .await?;
                info!("Transfer {} of token {token:?} to {recipient:?}", params.amount);
                let data = abi::encode_transfer(recipient, amount)?;
                Ok((
                    builder.build_to(token, U256::zero(), Some(data)),
                    CallKind::TokenTransfer,
                ))
            }
        }
    }
}
