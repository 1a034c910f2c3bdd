//! Network RPC surface consumed by the pipeline.

mod classify;
mod provider;

pub use classify::{classify_node_error, decode_revert_reason};
pub use provider::EthersRpc;

use crate::prelude::Result;
use async_trait::async_trait;
use ethers::types::{Address, Bytes, Transaction, TransactionReceipt, H256, U256};
use std::fmt::Debug;

/// Parameters of a call to simulate or read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// The JSON-RPC methods the gateway needs from a node. Every implementation
/// maps node failures into the crate error taxonomy.
#[async_trait]
pub trait NetworkRpc: Debug + Send + Sync {
    async fn chain_id(&self) -> Result<u64>;
    async fn get_balance(&self, address: Address) -> Result<U256>;
    /// Pending-block transaction count, i.e. the next nonce to use.
    async fn get_transaction_count(&self, address: Address) -> Result<U256>;
    async fn get_gas_price(&self) -> Result<U256>;
    async fn estimate_gas(&self, call: &CallRequest) -> Result<U256>;
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256>;
    /// `None` once the node no longer knows the transaction (never seen, or
    /// evicted from its mempool).
    async fn get_transaction(&self, hash: H256) -> Result<Option<Transaction>>;
    async fn get_transaction_receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>>;
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}
