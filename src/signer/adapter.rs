use super::EmbeddedWallet;
use crate::prelude::Result;
use crate::Error;
use ethers::types::{Address, Signature, H256, U256};
use log::{debug, info};

/// Map a raw recovery marker to a recovery id. Wallets report either the
/// recovery id itself (`0/1`) or the legacy `27/28` form.
pub fn normalize_recovery_id(marker: u8) -> Result<u8> {
    match marker {
        0 | 1 => Ok(marker),
        27 | 28 => Ok(marker - 27),
        other => Err(Error::InvalidSignature(format!(
            "unexpected recovery marker {other}, expected 0, 1, 27 or 28"
        ))),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: U256,
    pub s: U256,
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// Parse the 65-byte `r || s || marker` layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 65 {
            return Err(Error::InvalidSignature(format!(
                "expected 65 signature bytes, got {}",
                bytes.len()
            )));
        }
        Ok(RecoverableSignature {
            r: U256::from_big_endian(&bytes[..32]),
            s: U256::from_big_endian(&bytes[32..64]),
            recovery_id: normalize_recovery_id(bytes[64])?,
        })
    }

    /// EIP-155 `v`: `recovery_id + chain_id * 2 + 35`.
    pub fn eip155_v(&self, chain_id: u64) -> u64 {
        self.recovery_id as u64 + chain_id * 2 + 35
    }

    pub fn recover(&self, hash: H256) -> Result<Address> {
        Signature {
            r: self.r,
            s: self.s,
            v: self.recovery_id as u64 + 27,
        }
        .recover(hash)
        .map_err(|e| Error::InvalidSignature(format!("cannot recover signer: {e}")))
    }
}

/// Silent signer over an [`EmbeddedWallet`].
///
/// Holds no lock of its own: the operation client takes `&mut self`, so one
/// sender never has two signing passes in flight.
#[derive(Clone, Debug)]
pub struct SignerAdapter {
    wallet: EmbeddedWallet,
}

impl SignerAdapter {
    pub fn new(wallet: EmbeddedWallet) -> Self {
        SignerAdapter { wallet }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Fails with `NetworkMismatch` unless the wallet is on `expected`. With
    /// `auto_switch` one switch request is made first.
    pub async fn ensure_chain(&self, expected: u64, auto_switch: bool) -> Result<()> {
        let provider = self.wallet.provider();
        let mut actual = provider.current_chain_id().await?;
        if actual != expected && auto_switch {
            info!("Wallet on chain {actual}, requesting switch to {expected}");
            provider.switch_chain(expected).await?;
            actual = provider.current_chain_id().await?;
        }
        if actual != expected {
            return Err(Error::NetworkMismatch {
                context: format!("wallet {:?}", self.address()),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Sign `hash` without user interaction and check that the signature
    /// recovers to this wallet's address. Addresses are compared as bytes, so
    /// checksum casing never matters.
    pub async fn sign_hash(&self, hash: H256) -> Result<RecoverableSignature> {
        let raw = self.wallet.provider().sign_raw_hash(hash).await?;
        let signature = RecoverableSignature::from_bytes(&raw)?;
        let recovered = signature.recover(hash)?;
        let expected = self.address();
        if recovered != expected {
            return Err(Error::SignatureVerificationFailed {
                expected,
                recovered,
            });
        }
        debug!(
            "Signed {hash:?} (marker {}, recovery id {})",
            raw[64], signature.recovery_id
        );
        Ok(signature)
    }
}
