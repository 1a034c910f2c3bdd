use super::{EmbeddedWallet, WalletProvider};
use crate::prelude::Result;
use crate::Error;
use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, H256};
use log::info;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Embedded wallet backed by a private key held in process, for server-side
/// signing, scripts and tests. Produces the legacy `27/28` recovery marker.
#[derive(Debug)]
pub struct LocalEmbeddedWallet {
    wallet: LocalWallet,
    chain_id: AtomicU64,
}

impl LocalEmbeddedWallet {
    pub fn new(wallet: LocalWallet, chain_id: u64) -> Self {
        LocalEmbeddedWallet {
            wallet,
            chain_id: AtomicU64::new(chain_id),
        }
    }

    pub fn from_private_key(private_key: &str, chain_id: u64) -> Result<Self> {
        let wallet = LocalWallet::from_str(private_key.trim_start_matches("0x"))
            .map_err(|e| Error::Config(format!("invalid private key: {e}")))?;
        Ok(Self::new(wallet, chain_id))
    }

    pub fn random(chain_id: u64) -> Self {
        Self::new(LocalWallet::new(&mut rand::thread_rng()), chain_id)
    }

    pub fn into_embedded(self) -> EmbeddedWallet {
        EmbeddedWallet {
            provider: Arc::new(self),
        }
    }
}

#[async_trait]
impl WalletProvider for LocalEmbeddedWallet {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn current_chain_id(&self) -> Result<u64> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        let previous = self.chain_id.swap(chain_id, Ordering::SeqCst);
        if previous != chain_id {
            info!("Local wallet switched from chain {previous} to {chain_id}");
        }
        Ok(())
    }

    async fn sign_raw_hash(&self, hash: H256) -> Result<Bytes> {
        let signature = self
            .wallet
            .sign_hash(hash)
            .map_err(|e| Error::InvalidSignature(e.to_string()))?;
        Ok(Bytes::from(signature.to_vec()))
    }
}
