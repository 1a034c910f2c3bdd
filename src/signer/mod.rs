//! Wallet discrimination and the signing capability handed to the pipeline.

mod adapter;
mod local;

pub use adapter::{normalize_recovery_id, RecoverableSignature, SignerAdapter};
pub use local::LocalEmbeddedWallet;

use crate::consts::EMBEDDED_WALLET_CLIENT;
use crate::prelude::Result;
use crate::Error;
use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256};
use log::info;
use std::fmt::Debug;
use std::sync::Arc;

/// Resolved once when a wallet connects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletKind {
    Embedded,
    External(String),
}

impl WalletKind {
    pub fn from_client_identifier(identifier: &str) -> Self {
        if identifier.trim().eq_ignore_ascii_case(EMBEDDED_WALLET_CLIENT) {
            WalletKind::Embedded
        } else {
            WalletKind::External(identifier.trim().to_string())
        }
    }
}

/// What the gateway needs from a wallet provider.
#[async_trait]
pub trait WalletProvider: Debug + Send + Sync {
    fn address(&self) -> Address;
    async fn current_chain_id(&self) -> Result<u64>;
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;
    /// Sign a 32-byte hash with no user prompt. Returns `r || s || marker`
    /// (65 bytes), the marker being `0/1` or `27/28`.
    async fn sign_raw_hash(&self, hash: H256) -> Result<Bytes>;
}

#[derive(Clone, Debug)]
pub struct ConnectedWallet {
    kind: WalletKind,
    provider: Arc<dyn WalletProvider>,
}

impl ConnectedWallet {
    pub fn connect(provider: Arc<dyn WalletProvider>, client_identifier: &str) -> Self {
        let kind = WalletKind::from_client_identifier(client_identifier);
        info!("Wallet {:?} connected as {kind:?}", provider.address());
        ConnectedWallet { kind, provider }
    }

    pub fn kind(&self) -> &WalletKind {
        &self.kind
    }

    pub fn address(&self) -> Address {
        self.provider.address()
    }

    /// Only embedded wallets can sign silently; external wallets must go
    /// through their own confirmation flow.
    pub fn into_embedded(self) -> Result<EmbeddedWallet> {
        match self.kind {
            WalletKind::Embedded => Ok(EmbeddedWallet {
                provider: self.provider,
            }),
            WalletKind::External(name) => Err(Error::UnsupportedWallet(format!(
                "{name} wallet {:?} cannot sign without user confirmation",
                self.provider.address()
            ))),
        }
    }
}

/// A wallet proven to be embedded. The only input [`SignerAdapter`] accepts.
#[derive(Clone, Debug)]
pub struct EmbeddedWallet {
    provider: Arc<dyn WalletProvider>,
}

impl EmbeddedWallet {
    pub fn address(&self) -> Address {
        self.provider.address()
    }

    pub(crate) fn provider(&self) -> &dyn WalletProvider {
        self.provider.as_ref()
    }
}
