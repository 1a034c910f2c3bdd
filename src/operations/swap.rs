use super::transfer::{parse_positive_amount, precheck_amount};
use super::{
    after_approval, OperationClient, OperationKind, OperationResult, OperationStage, PreparedCall,
    StageTracker,
};
use crate::abi::{self, SwapDirection};
use crate::config::{Asset, NetworkConfig};
use crate::consts::SWAP_DEADLINE;
use crate::fee::CallKind;
use crate::helpers::{deadline_after, parse_address};
use crate::prelude::Result;
use crate::quote::{candidate_paths, Quote, QuoteEngine, Slippage};
use crate::rpc::NetworkRpc;
use crate::unsigned::TransactionBuilder;
use ethers::types::{Address, U256};
use log::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Registry symbol (`"CRO"`, `"USDC"`) or token address.
    pub from_token: String,
    pub to_token: String,
    /// Human units of `from_token`.
    pub amount: String,
    pub slippage: Slippage,
    /// Receiver of the output; the wallet itself when `None`.
    pub recipient: Option<String>,
}

impl SwapParams {
    pub fn new(
        from_token: impl Into<String>,
        to_token: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        SwapParams {
            from_token: from_token.into(),
            to_token: to_token.into(),
            amount: amount.into(),
            slippage: Slippage::default(),
            recipient: None,
        }
    }

    pub fn with_slippage(mut self, slippage: Slippage) -> Self {
        self.slippage = slippage;
        self
    }
}

struct ResolvedSwap {
    from: Asset,
    to: Asset,
    direction: SwapDirection,
    amount_in: U256,
    decimals: u8,
    recipient: Option<Address>,
}

impl<R: NetworkRpc> OperationClient<R> {
    async fn resolve_swap(
        &self,
        network: &NetworkConfig,
        params: &SwapParams,
    ) -> Result<ResolvedSwap> {
        let from = network.resolve_asset(&params.from_token)?;
        let to = network.resolve_asset(&params.to_token)?;
        let (direction, _) = candidate_paths(from, to, network.wrapped_native_address)?;
        let recipient = params.recipient.as_deref().map(parse_address).transpose()?;
        precheck_amount(&params.amount, from)?;
        self.ensure_rpc_chain(network).await?;

        let decimals = self.token_decimals(from).await?;
        let amount_in = parse_positive_amount(&params.amount, decimals)?;
        Ok(ResolvedSwap {
            from,
            to,
            direction,
            amount_in,
            decimals,
            recipient,
        })
    }

    /// Price a swap without signing anything.
    pub async fn quote_swap(&self, network: &NetworkConfig, params: &SwapParams) -> Result<Quote> {
        let swap = self.resolve_swap(network, params).await?;
        QuoteEngine::new(&self.rpc, network)
            .quote(swap.from, swap.to, swap.amount_in, params.slippage)
            .await
    }

    /// Quote, approve the router if needed, then swap with the slippage floor
    /// and a ten-minute deadline. The quote is taken fresh here, never reused
    /// from an earlier [`quote_swap`](Self::quote_swap).
    pub async fn swap(
        &mut self,
        network: &NetworkConfig,
        params: SwapParams,
    ) -> Result<OperationResult> {
        let mut tracker = StageTracker::start(OperationKind::Swap);
        let swap = self.resolve_swap(network, &params).await?;

        let quote = QuoteEngine::new(&self.rpc, network)
            .quote(swap.from, swap.to, swap.amount_in, params.slippage)
            .await?;
        info!(
            "Swap {} via {:?}: expect {}, minimum {} ({})",
            swap.amount_in,
            quote.route,
            quote.expected_amount_out,
            quote.minimum_amount_out,
            params.slippage
        );
        if let Asset::Token(token) = swap.from {
            self.broadcaster()
                .ensure_token_balance(token, self.address(), swap.amount_in, swap.decimals)
                .await?;
        }

        let data = abi::encode_swap(
            swap.direction,
            swap.amount_in,
            quote.minimum_amount_out,
            &quote.route,
            swap.recipient.unwrap_or_else(|| self.address()),
            deadline_after(SWAP_DEADLINE),
        )?;
        let value = if swap.from.is_native() {
            swap.amount_in
        } else {
            U256::zero()
        };
        let draft =
            TransactionBuilder::new(network).build_to(network.router_address, value, Some(data));
        let kind = match swap.direction {
            SwapDirection::NativeToToken => CallKind::NativeToTokenSwap,
            _ => CallKind::TokenSwap,
        };

        tracker.advance(OperationStage::Estimating);
        let fees = self.prepare(network, &draft, kind, None).await?;
        let call = PreparedCall {
            draft,
            kind,
            min_gas_limit: None,
            fees,
        };

        let approval_hash = match swap.from {
            Asset::Token(token) => {
                self.ensure_allowance(
                    network,
                    &mut tracker,
                    token,
                    network.router_address,
                    swap.amount_in,
                    U256::MAX,
                )
                .await?
            }
            Asset::Native => None,
        };

        let outcome = self.finish(network, call, tracker, approval_hash).await;
        after_approval(approval_hash, outcome)
    }
}
