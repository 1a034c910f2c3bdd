use crate::prelude::Result;
use crate::signer::SignerAdapter;
use crate::unsigned::{SignedTransaction, UnsignedTransaction};
use crate::Error;
use log::{debug, info};

/// Hashes, signs and re-encodes a legacy transaction with EIP-155 replay
/// protection.
///
/// The chain id placed in the signing payload is the same one used for `v`,
/// and the wallet must be on that chain before anything is signed.
#[derive(Debug)]
pub struct TransactionAssembler<'a> {
    signer: &'a SignerAdapter,
    auto_switch_chain: bool,
}

impl<'a> TransactionAssembler<'a> {
    pub fn new(signer: &'a SignerAdapter) -> Self {
        TransactionAssembler {
            signer,
            auto_switch_chain: false,
        }
    }

    pub fn auto_switch_chain(mut self, enabled: bool) -> Self {
        self.auto_switch_chain = enabled;
        self
    }

    pub async fn assemble(&self, tx: UnsignedTransaction) -> Result<SignedTransaction> {
        self.signer
            .ensure_chain(tx.chain_id, self.auto_switch_chain)
            .await?;

        let sighash = tx.sighash();
        debug!(
            "Signing nonce {} for chain {} (sighash {sighash:?})",
            tx.nonce, tx.chain_id
        );
        let signature = self.signer.sign_hash(sighash).await?;

        let v = signature.eip155_v(tx.chain_id);
        let signed = SignedTransaction::new(tx, signature.r, signature.s, v);

        // The final encoding must recover the same signer with the chain-bound v.
        let recovered = signed.recover_signer()?;
        if recovered != self.signer.address() {
            return Err(Error::SignatureVerificationFailed {
                expected: self.signer.address(),
                recovered,
            });
        }
        info!(
            "Assembled transaction {:?} (nonce {}, v {})",
            signed.hash, signed.tx.nonce, signed.v
        );
        Ok(signed)
    }
}
