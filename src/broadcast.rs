use crate::abi;
use crate::consts::{DEFAULT_POLL_INTERVAL, NATIVE_DECIMALS};
use crate::fee::FeeEstimate;
use crate::helpers::format_units;
use crate::prelude::Result;
use crate::rpc::NetworkRpc;
use crate::unsigned::SignedTransaction;
use crate::Error;
use ethers::types::{Address, H256, U256, U64};
use log::{debug, info, warn};
use serde::Serialize;
use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Submits signed transactions and tracks them to inclusion.
#[derive(Debug)]
pub struct Broadcaster<'a, R: NetworkRpc + ?Sized> {
    rpc: &'a R,
    poll_interval: Duration,
}

impl<'a, R: NetworkRpc + ?Sized> Broadcaster<'a, R> {
    pub fn new(rpc: &'a R) -> Self {
        Broadcaster {
            rpc,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Client-side `balance >= value + gas_limit * gas_price` check, run before
    /// signing so an underfunded account never reaches the node.
    pub async fn ensure_funds(
        &self,
        owner: Address,
        value: U256,
        fees: &FeeEstimate,
        native_symbol: &str,
    ) -> Result<U256> {
        let balance = self.rpc.get_balance(owner).await?;
        let gas_cost = fees.max_fee();
        let required = value.saturating_add(gas_cost);
        if balance < required {
            return Err(Error::InsufficientFunds(format!(
                "balance {} {native_symbol} is below the required {} {native_symbol} ({} {native_symbol} value + {} {native_symbol} max gas fee)",
                format_units(balance, NATIVE_DECIMALS),
                format_units(required, NATIVE_DECIMALS),
                format_units(value, NATIVE_DECIMALS),
                format_units(gas_cost, NATIVE_DECIMALS),
            )));
        }
        debug!("Balance {balance} covers required {required}");
        Ok(balance)
    }

    /// ERC-20 counterpart of [`ensure_funds`](Self::ensure_funds) for the
    /// amount being moved.
    pub async fn ensure_token_balance(
        &self,
        token: Address,
        owner: Address,
        amount: U256,
        decimals: u8,
    ) -> Result<U256> {
        let data = abi::encode_balance_of(owner)?;
        let balance = abi::decode_balance_of(&self.rpc.call(token, data).await?)?;
        if balance < amount {
            return Err(Error::InsufficientFunds(format!(
                "token {token:?} balance {} is below the required {}",
                format_units(balance, decimals),
                format_units(amount, decimals),
            )));
        }
        Ok(balance)
    }

    pub async fn submit(&self, signed: &SignedTransaction) -> Result<H256> {
        let hash = self.rpc.send_raw_transaction(signed.raw.clone()).await?;
        if hash != signed.hash {
            warn!(
                "Node reported hash {hash:?}, locally computed {:?}",
                signed.hash
            );
        }
        info!("Broadcast {hash:?} (nonce {})", signed.tx.nonce);
        Ok(hash)
    }

    /// Poll for the receipt until it appears or `timeout` elapses. Transient
    /// network errors while polling are logged and retried.
    pub async fn await_confirmation(
        &self,
        hash: H256,
        timeout: Duration,
    ) -> Result<OperationStatus> {
        let poll = async {
            loop {
                match self.rpc.get_transaction_receipt(hash).await {
                    Ok(Some(receipt)) => {
                        let status = if receipt.status == Some(U64::one()) {
                            OperationStatus::Confirmed
                        } else {
                            OperationStatus::Failed
                        };
                        info!("{hash:?} included in block {:?}: {status:?}", receipt.block_number);
                        return Ok(status);
                    }
                    Ok(None) => debug!("{hash:?} not yet included"),
                    Err(Error::NetworkError(message)) => {
                        warn!("Receipt lookup for {hash:?} failed: {message}")
                    }
                    Err(err) => return Err(err),
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| Error::ConfirmationTimeout {
                hash,
                timeout_secs: timeout.as_secs(),
            })?
    }
}
