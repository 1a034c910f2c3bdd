use super::transfer::{parse_positive_amount, parse_recipient, precheck_amount};
use super::{
    after_approval, OperationClient, OperationKind, OperationResult, OperationStage, PreparedCall,
    StageTracker,
};
use crate::bridge::{BridgeIntent, BridgeQuoteService};
use crate::config::{bridge_counterpart, Asset, NetworkConfig};
use crate::consts::DEFAULT_BRIDGE_SLIPPAGE_BPS;
use crate::fee::CallKind;
use crate::helpers::parse_address;
use crate::prelude::Result;
use crate::rpc::NetworkRpc;
use crate::unsigned::TransactionBuilder;
use crate::Error;
use ethers::types::{Address, H256};
use log::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeParams {
    /// Source-chain token: registry symbol or address.
    pub token: String,
    /// Human units of `token`.
    pub amount: String,
    pub recipient_address: String,
    pub destination_chain: u64,
    /// Token to receive on the destination chain. Looked up in the bridge
    /// token map when `None`.
    pub destination_token: Option<String>,
    pub slippage_bps: u32,
}

impl BridgeParams {
    pub fn new(
        token: impl Into<String>,
        amount: impl Into<String>,
        recipient_address: impl Into<String>,
        destination_chain: u64,
    ) -> Self {
        BridgeParams {
            token: token.into(),
            amount: amount.into(),
            recipient_address: recipient_address.into(),
            destination_chain,
            destination_token: None,
            slippage_bps: DEFAULT_BRIDGE_SLIPPAGE_BPS,
        }
    }

    pub fn with_destination_token(mut self, token: impl Into<String>) -> Self {
        self.destination_token = Some(token.into());
        self
    }
}

fn destination_token(
    network: &NetworkConfig,
    asset: Asset,
    params: &BridgeParams,
) -> Result<Address> {
    if let Some(token) = &params.destination_token {
        return parse_address(token);
    }
    match asset {
        Asset::Native => Ok(Address::zero()),
        Asset::Token(token) => bridge_counterpart(network.chain_id, token, params.destination_chain)
            .ok_or_else(|| {
                Error::NoRoute(format!(
                    "no known counterpart of token {token:?} on chain {}; pass a destination token",
                    params.destination_chain
                ))
            }),
    }
}

impl<R: NetworkRpc> OperationClient<R> {
    /// Move funds to another chain with call data from `service`. The quote is
    /// validated before anything is approved or signed.
    pub async fn bridge(
        &mut self,
        network: &NetworkConfig,
        service: &dyn BridgeQuoteService,
        params: BridgeParams,
    ) -> Result<OperationResult> {
        let mut tracker = StageTracker::start(OperationKind::Bridge);
        let asset = network.resolve_asset(&params.token)?;
        let recipient = parse_recipient(&params.recipient_address)?;
        if params.destination_chain == network.chain_id {
            return Err(Error::NoRoute(format!(
                "destination chain {} is the source chain",
                params.destination_chain
            )));
        }
        precheck_amount(&params.amount, asset)?;
        let to_token = destination_token(network, asset, &params)?;
        self.ensure_rpc_chain(network).await?;

        let decimals = self.token_decimals(asset).await?;
        let amount = parse_positive_amount(&params.amount, decimals)?;
        if let Asset::Token(token) = asset {
            self.broadcaster()
                .ensure_token_balance(token, self.address(), amount, decimals)
                .await?;
        }

        let intent = BridgeIntent {
            source_chain: network.chain_id,
            destination_chain: params.destination_chain,
            from_token: asset.address(),
            to_token,
            amount,
            recipient,
            sender: self.address(),
            slippage_bps: params.slippage_bps,
        };
        let call = service.request_quote(&intent).await?.validate(&intent)?;
        info!(
            "Bridge {} to chain {} via {:?} (spender {:?})",
            params.amount, params.destination_chain, call.to, call.spender
        );

        let draft = TransactionBuilder::new(network).build_to(call.to, call.value, Some(call.data));
        tracker.advance(OperationStage::Estimating);
        let fees = self
            .prepare(network, &draft, CallKind::Bridge, call.gas_limit)
            .await?;
        let prepared = PreparedCall {
            draft,
            kind: CallKind::Bridge,
            min_gas_limit: call.gas_limit,
            fees,
        };

        let approval_hash = match asset {
            Asset::Token(token) => {
                self.ensure_allowance(network, &mut tracker, token, call.spender, amount, amount)
                    .await?
            }
            Asset::Native => None,
        };

        let outcome = self.finish(network, prepared, tracker, approval_hash).await;
        after_approval(approval_hash, outcome)
    }

    /// Cross-chain status of a bridge transaction sent from `network`.
    pub async fn bridge_status(
        &self,
        network: &NetworkConfig,
        service: &dyn BridgeQuoteService,
        hash: H256,
    ) -> Result<Option<serde_json::Value>> {
        service.transfer_status(network.chain_id, hash).await
    }
}
