use super::{classify_node_error, CallRequest, NetworkRpc};
use crate::config::NetworkConfig;
use crate::prelude::Result;
use crate::Error;
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider, ProviderError, RpcError};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    Address, BlockNumber, Bytes, Transaction, TransactionReceipt, TransactionRequest, H256, U256,
};
use log::debug;

/// [`NetworkRpc`] over an ethers HTTP provider.
#[derive(Debug, Clone)]
pub struct EthersRpc {
    provider: Provider<Http>,
}

impl EthersRpc {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| Error::Config(format!("invalid rpc url {rpc_url:?}: {e}")))?;
        Ok(EthersRpc { provider })
    }

    pub fn for_network(config: &NetworkConfig) -> Result<Self> {
        Self::new(&config.rpc_url)
    }

    pub fn provider(&self) -> &Provider<Http> {
        &self.provider
    }
}

fn node_error(err: ProviderError) -> Error {
    if let Some(response) = err.as_error_response() {
        let data = response
            .data
            .as_ref()
            .and_then(|data| data.as_str().map(str::to_string));
        return classify_node_error(Some(response.code), &response.message, data.as_deref());
    }
    classify_node_error(None, &err.to_string(), None)
}

fn typed(call: &CallRequest) -> TypedTransaction {
    let mut request = TransactionRequest::new()
        .to(call.to)
        .value(call.value)
        .data(call.data.clone());
    if let Some(from) = call.from {
        request = request.from(from);
    }
    request.into()
}

#[async_trait]
impl NetworkRpc for EthersRpc {
    async fn chain_id(&self) -> Result<u64> {
        let chain_id = self.provider.get_chainid().await.map_err(node_error)?;
        Ok(chain_id.low_u64())
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address, None)
            .await
            .map_err(node_error)
    }

    async fn get_transaction_count(&self, address: Address) -> Result<U256> {
        self.provider
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(node_error)
    }

    async fn get_gas_price(&self) -> Result<U256> {
        self.provider.get_gas_price().await.map_err(node_error)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<U256> {
        self.provider
            .estimate_gas(&typed(call), None)
            .await
            .map_err(node_error)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256> {
        debug!("eth_sendRawTransaction ({} bytes)", raw.len());
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(node_error)?;
        Ok(pending.tx_hash())
    }

    async fn get_transaction(&self, hash: H256) -> Result<Option<Transaction>> {
        self.provider
            .get_transaction(hash)
            .await
            .map_err(node_error)
    }

    async fn get_transaction_receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>> {
        self.provider
            .get_transaction_receipt(hash)
            .await
            .map_err(node_error)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let call = CallRequest {
            to,
            data,
            ..Default::default()
        };
        self.provider
            .call(&typed(&call), None)
            .await
            .map_err(node_error)
    }
}
