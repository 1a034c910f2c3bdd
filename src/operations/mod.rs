//! User-facing operations: transfer, swap, bridge and payment headers.
//!
//! Every operation runs the same sequence, `Building -> Estimating ->
//! (Approving ->)? Signing -> Broadcasting -> Pending`, as a chain of awaited
//! calls. Operations take `&mut self`, so one client never has two signing
//! passes for its sender in flight and each nonce is read right before the
//! transaction that uses it. Nothing here retries a failed step.

mod bridge;
mod payment;
mod stage;
mod swap;
mod transfer;

pub use bridge::BridgeParams;
pub use payment::{PaymentEnvelope, PaymentHeader, PaymentParams, PaymentPayload};
pub use stage::{OperationKind, OperationStage};
pub use swap::SwapParams;
pub use transfer::TransferParams;

use crate::abi;
use crate::assembler::TransactionAssembler;
use crate::broadcast::{Broadcaster, OperationStatus};
use crate::config::{Asset, NetworkConfig};
use crate::consts::{DEFAULT_POLL_INTERVAL, NATIVE_DECIMALS, TRANSFER_CONFIRMATION_TIMEOUT};
use crate::fee::{CallKind, FeeEstimate, FeeEstimator};
use crate::prelude::Result;
use crate::rpc::NetworkRpc;
use crate::signer::{EmbeddedWallet, SignerAdapter};
use crate::unsigned::{SignedTransaction, TransactionBuilder, TransactionDraft};
use crate::Error;
use ethers::types::{Address, H256, U256};
use log::{debug, info, warn};
use serde::Serialize;
use stage::StageTracker;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationOptions {
    /// Ask the wallet to switch networks instead of failing with
    /// `NetworkMismatch`.
    pub auto_switch_chain: bool,
    pub poll_interval: Duration,
    /// How long a swap or bridge waits for its approval to be mined.
    pub approval_timeout: Duration,
}

impl Default for OperationOptions {
    fn default() -> Self {
        OperationOptions {
            auto_switch_chain: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            approval_timeout: TRANSFER_CONFIRMATION_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub kind: OperationKind,
    pub hash: H256,
    pub status: OperationStatus,
    pub nonce: U256,
    pub approval_hash: Option<H256>,
    pub explorer_url: String,
    pub stages: Vec<OperationStage>,
}

/// A call that has been built, estimated and funds-checked.
struct PreparedCall {
    draft: TransactionDraft,
    kind: CallKind,
    /// Extra floor for re-estimation (bridge quote gas hint).
    min_gas_limit: Option<U256>,
    fees: FeeEstimate,
}

/// The most recent transaction this client broadcast on a chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct LastBroadcast {
    nonce: U256,
    hash: H256,
}

/// Runs operations for one embedded wallet against one RPC endpoint.
#[derive(Debug)]
pub struct OperationClient<R: NetworkRpc> {
    rpc: R,
    signer: SignerAdapter,
    options: OperationOptions,
    /// Last broadcast per chain id.
    last_broadcast: HashMap<u64, LastBroadcast>,
}

impl<R: NetworkRpc> OperationClient<R> {
    pub fn new(rpc: R, wallet: EmbeddedWallet) -> Self {
        Self::with_options(rpc, wallet, OperationOptions::default())
    }

    pub fn with_options(rpc: R, wallet: EmbeddedWallet, options: OperationOptions) -> Self {
        OperationClient {
            rpc,
            signer: SignerAdapter::new(wallet),
            options,
            last_broadcast: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn options(&self) -> &OperationOptions {
        &self.options
    }

    /// Poll until the operation's transaction is mined or `timeout` elapses,
    /// updating `result` in place.
    pub async fn await_confirmation(
        &self,
        result: &mut OperationResult,
        timeout: Duration,
    ) -> Result<OperationStatus> {
        let status = self
            .broadcaster()
            .await_confirmation(result.hash, timeout)
            .await?;
        result.status = status;
        result.stages.push(match status {
            OperationStatus::Failed => OperationStage::Failed,
            _ => OperationStage::Confirmed,
        });
        Ok(status)
    }

    /// [`await_confirmation`](Self::await_confirmation) with the default bound
    /// for the operation's kind.
    pub async fn wait_for_confirmation(
        &self,
        result: &mut OperationResult,
    ) -> Result<OperationStatus> {
        let timeout = result.kind.confirmation_timeout();
        self.await_confirmation(result, timeout).await
    }

    fn broadcaster(&self) -> Broadcaster<'_, R> {
        Broadcaster::new(&self.rpc).poll_interval(self.options.poll_interval)
    }

    fn assembler(&self) -> TransactionAssembler<'_> {
        TransactionAssembler::new(&self.signer).auto_switch_chain(self.options.auto_switch_chain)
    }

    /// The RPC endpoint must serve the chain the operation targets.
    async fn ensure_rpc_chain(&self, network: &NetworkConfig) -> Result<()> {
        let actual = self.rpc.chain_id().await?;
        if actual != network.chain_id {
            return Err(Error::NetworkMismatch {
                context: format!("rpc endpoint {}", network.rpc_url),
                expected: network.chain_id,
                actual,
            });
        }
        Ok(())
    }

    async fn token_decimals(&self, asset: Asset) -> Result<u8> {
        let token = match asset {
            Asset::Native => return Ok(NATIVE_DECIMALS),
            Asset::Token(token) => token,
        };
        let read = async {
            let data = abi::encode_decimals()?;
            abi::decode_decimals(&self.rpc.call(token, data).await?)
        };
        read.await.map_err(|e| {
            Error::NetworkError(format!("cannot read decimals of token {token:?}: {e}"))
        })
    }

    /// Gas estimate plus the client-side funds check. Nothing is signed or
    /// sent if this fails.
    async fn prepare(
        &self,
        network: &NetworkConfig,
        draft: &TransactionDraft,
        kind: CallKind,
        min_gas_limit: Option<U256>,
    ) -> Result<FeeEstimate> {
        let fees = FeeEstimator::new(&self.rpc)
            .estimate(self.address(), draft, kind, min_gas_limit)
            .await?;
        self.broadcaster()
            .ensure_funds(self.address(), draft.value, &fees, &network.native_symbol)
            .await?;
        Ok(fees)
    }

    /// The node's pending nonce, unless it has not caught up with a
    /// transaction this client broadcast and the node still holds. A dropped
    /// transaction leaves its nonce free, so the node's count wins then.
    async fn next_nonce(&self, chain_id: u64) -> Result<U256> {
        let pending = self.rpc.get_transaction_count(self.address()).await?;
        let last = match self.last_broadcast.get(&chain_id) {
            Some(last) if pending <= last.nonce => *last,
            _ => return Ok(pending),
        };
        if self.rpc.get_transaction(last.hash).await?.is_none() {
            warn!(
                "{:?} (nonce {}) was dropped by the node, using pending nonce {pending}",
                last.hash, last.nonce
            );
            return Ok(pending);
        }
        let nonce = last.nonce + 1;
        warn!(
            "Node reports pending nonce {pending} but {} was already broadcast, using {nonce}",
            last.nonce
        );
        Ok(nonce)
    }

    async fn sign(&self, draft: TransactionDraft, fees: &FeeEstimate) -> Result<SignedTransaction> {
        let nonce = self.next_nonce(draft.chain_id).await?;
        debug!("Using nonce {nonce} on chain {}", draft.chain_id);
        let unsigned = draft.complete(nonce, fees.gas_limit, fees.gas_price);
        self.assembler().assemble(unsigned).await
    }

    async fn submit(&mut self, signed: &SignedTransaction) -> Result<H256> {
        let hash = self.broadcaster().submit(signed).await?;
        self.last_broadcast.insert(
            signed.tx.chain_id,
            LastBroadcast {
                nonce: signed.tx.nonce,
                hash,
            },
        );
        Ok(hash)
    }

    /// Final `Signing -> Broadcasting -> Pending` pass of an operation.
    async fn execute(
        &mut self,
        network: &NetworkConfig,
        draft: TransactionDraft,
        fees: FeeEstimate,
        mut tracker: StageTracker,
        approval_hash: Option<H256>,
    ) -> Result<OperationResult> {
        tracker.advance(OperationStage::Signing);
        let signed = self.sign(draft, &fees).await?;
        tracker.advance(OperationStage::Broadcasting);
        let hash = self.submit(&signed).await?;
        tracker.advance(OperationStage::Pending);
        info!("Pending: {}", network.tx_url(hash));
        Ok(OperationResult {
            kind: tracker.kind(),
            hash,
            status: OperationStatus::Pending,
            nonce: signed.tx.nonce,
            approval_hash,
            explorer_url: network.tx_url(hash),
            stages: tracker.into_stages(),
        })
    }

    /// Finish a prepared call. Once an approval was mined the original
    /// estimate predates it, so the call is simulated and funded again first.
    async fn finish(
        &mut self,
        network: &NetworkConfig,
        call: PreparedCall,
        tracker: StageTracker,
        approval_hash: Option<H256>,
    ) -> Result<OperationResult> {
        let fees = match approval_hash {
            Some(_) => {
                self.prepare(network, &call.draft, call.kind, call.min_gas_limit)
                    .await?
            }
            None => call.fees,
        };
        self.execute(network, call.draft, fees, tracker, approval_hash)
            .await
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256> {
        let data = abi::encode_allowance(self.address(), spender)?;
        abi::decode_allowance(&self.rpc.call(token, data).await?)
    }

    /// Send `approve(spender, amount)` and wait for it to be mined, so the
    /// follow-up transaction sees the allowance and takes the next nonce.
    async fn approve(
        &mut self,
        network: &NetworkConfig,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<H256> {
        let data = abi::encode_approve(spender, amount)?;
        let draft = TransactionBuilder::new(network).build_to(token, U256::zero(), Some(data));
        let fees = self.prepare(network, &draft, CallKind::Approval, None).await?;
        let signed = self.sign(draft, &fees).await?;
        let hash = self.submit(&signed).await?;
        info!(
            "Approval {hash:?} for spender {spender:?} sent, waiting up to {}s",
            self.options.approval_timeout.as_secs()
        );
        match self
            .broadcaster()
            .await_confirmation(hash, self.options.approval_timeout)
            .await?
        {
            OperationStatus::Failed => Err(Error::SimulationRevert(format!(
                "approval {hash:?} of token {token:?} reverted on-chain"
            ))),
            _ => Ok(hash),
        }
    }

    /// Raise the allowance of `spender` over `token` to `approve_amount` when
    /// it is below `required`. Returns the approval hash if one was sent.
    async fn ensure_allowance(
        &mut self,
        network: &NetworkConfig,
        tracker: &mut StageTracker,
        token: Address,
        spender: Address,
        required: U256,
        approve_amount: U256,
    ) -> Result<Option<H256>> {
        let current = self.allowance(token, spender).await?;
        if current >= required {
            debug!("Allowance {current} of {spender:?} covers {required}");
            return Ok(None);
        }
        info!("Allowance {current} of {spender:?} below {required}, approving");
        tracker.advance(OperationStage::Approving);
        self.approve(network, token, spender, approve_amount)
            .await
            .map(Some)
    }
}

/// Wrap any failure that happens after an approval was mined so the caller
/// knows an allowance is outstanding.
fn after_approval<T>(approval_hash: Option<H256>, outcome: Result<T>) -> Result<T> {
    match (outcome, approval_hash) {
        (Err(err), Some(approval_hash)) => {
            warn!("Follow-up to approval {approval_hash:?} failed: {err}");
            Err(Error::ApprovedButSwapFailed {
                approval_hash,
                source: Box::new(err),
            })
        }
        (outcome, _) => outcome,
    }
}
