use crate::prelude::Result;
use crate::rpc::CallRequest;
use crate::Error;
use ethers::types::{Address, Bytes, Signature, H256, U256};
use ethers::utils::keccak256;
use ethers::utils::rlp::RlpStream;

/// Builder output: destination, value, payload and chain. Nonce and gas are
/// filled in just before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub to: Address,
    pub value: U256,
    pub data: Bytes, // empty for plain value transfers
    pub chain_id: u64,
}

impl TransactionDraft {
    pub fn call_request(&self, from: Address) -> CallRequest {
        CallRequest {
            from: Some(from),
            to: self.to,
            value: self.value,
            data: self.data.clone(),
        }
    }

    pub fn complete(self, nonce: U256, gas_limit: U256, gas_price: U256) -> UnsignedTransaction {
        UnsignedTransaction {
            to: self.to,
            value: self.value,
            data: self.data,
            nonce,
            gas_limit,
            gas_price,
            chain_id: self.chain_id,
        }
    }
}

/// Fully resolved legacy (type 0) transaction, ready to hash and sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub nonce: U256,
    pub gas_limit: U256,
    pub gas_price: U256,
    pub chain_id: u64,
}

const LEGACY_TX_FIELDS: usize = 9;

impl UnsignedTransaction {
    fn rlp_base(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        stream.append(&self.to);
        stream.append(&self.value);
        stream.append(&self.data.to_vec());
    }

    /// EIP-155 signing payload: `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`.
    pub fn rlp(&self) -> Bytes {
        let mut stream = RlpStream::new_list(LEGACY_TX_FIELDS);
        self.rlp_base(&mut stream);
        stream.append(&self.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        Bytes::from(stream.out().to_vec())
    }

    pub fn sighash(&self) -> H256 {
        H256::from(keccak256(self.rlp()))
    }

    /// Network encoding with the signature attached. `v` must already carry the
    /// EIP-155 chain encoding.
    pub fn rlp_signed(&self, v: u64, r: U256, s: U256) -> Bytes {
        let mut stream = RlpStream::new_list(LEGACY_TX_FIELDS);
        self.rlp_base(&mut stream);
        stream.append(&v);
        stream.append(&r);
        stream.append(&s);
        Bytes::from(stream.out().to_vec())
    }

    /// Upper bound of the native currency this transaction can debit.
    pub fn max_cost(&self) -> U256 {
        self.value
            .saturating_add(self.gas_limit.saturating_mul(self.gas_price))
    }
}

/// An [`UnsignedTransaction`] plus its EIP-155 signature and network encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: UnsignedTransaction,
    pub r: U256,
    pub s: U256,
    /// `recovery_id + chain_id * 2 + 35`
    pub v: u64,
    pub raw: Bytes,
    pub hash: H256,
}

impl SignedTransaction {
    pub fn new(tx: UnsignedTransaction, r: U256, s: U256, v: u64) -> Self {
        let raw = tx.rlp_signed(v, r, s);
        let hash = H256::from(keccak256(&raw));
        SignedTransaction {
            tx,
            r,
            s,
            v,
            raw,
            hash,
        }
    }

    /// `None` when `v` is not an EIP-155 value for this transaction's chain.
    pub fn recovery_id(&self) -> Option<u8> {
        let base = self.tx.chain_id.checked_mul(2)?.checked_add(35)?;
        match self.v.checked_sub(base)? {
            id @ (0 | 1) => Some(id as u8),
            _ => None,
        }
    }

    pub fn signature(&self) -> Signature {
        Signature {
            r: self.r,
            s: self.s,
            v: self.v,
        }
    }

    pub fn recover_signer(&self) -> Result<Address> {
        self.signature()
            .recover(self.tx.sighash())
            .map_err(|e| Error::InvalidSignature(format!("cannot recover signer: {e}")))
    }

    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}
