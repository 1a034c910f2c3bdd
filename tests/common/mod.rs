#![allow(dead_code)]

use async_trait::async_trait;
use cro_gateway::abi::{selector, ERC20_ABI, ROUTER_ABI};
use cro_gateway::prelude::Result;
use cro_gateway::{
    BridgeIntent, BridgeQuote, BridgeQuoteService, CallRequest, ConnectedWallet, EmbeddedWallet,
    Error, LocalEmbeddedWallet, NetworkConfig, NetworkRpc, OperationClient, OperationOptions,
    WalletProvider,
};
use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, Transaction, TransactionReceipt, H256, U256, U64};
use ethers::utils::keccak256;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Key was randomly generated for testing and shouldn't be used with any real funds
pub const TEST_KEY: &str = "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";
pub const RECIPIENT: &str = "0x1234567890123456789012345678901234567890";

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(18)
}

pub fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(9)
}

/// Stand-in ERC-20 address.
pub fn token(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

#[derive(Debug)]
pub struct MockState {
    pub chain_id: u64,
    pub balance: U256,
    pub nonce: U256,
    /// Pending nonce the node reports, when it lags behind `nonce`.
    pub reported_nonce: Option<U256>,
    pub gas_price: U256,
    pub gas_estimate: U256,
    pub fail_estimate: bool,
    /// Output per hop is `amount * rate_num / rate_den`.
    pub rate_num: u64,
    pub rate_den: u64,
    /// Hops the router has no pool for.
    pub unpriced: Vec<(Address, Address)>,
    pub allowance: U256,
    pub token_balance: U256,
    pub decimals: Option<u8>,
    pub receipt_success: bool,
    /// Reject every broadcast once this many have been accepted.
    pub fail_send_after: Option<usize>,
    pub sent: Vec<Bytes>,
    pub sent_hashes: Vec<H256>,
    pub estimate_calls: usize,
    pub nonce_reads: Vec<U256>,
    /// Selectors of every `eth_call`, in order.
    pub calls: Vec<[u8; 4]>,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            chain_id: 338,
            balance: ether(5),
            nonce: U256::from(7u64),
            reported_nonce: None,
            gas_price: gwei(5_000),
            gas_estimate: U256::from(21_000u64),
            fail_estimate: false,
            rate_num: 2,
            rate_den: 1,
            unpriced: Vec::new(),
            allowance: U256::zero(),
            token_balance: ether(1_000),
            decimals: Some(18),
            receipt_success: true,
            fail_send_after: None,
            sent: Vec::new(),
            sent_hashes: Vec::new(),
            estimate_calls: 0,
            nonce_reads: Vec::new(),
            calls: Vec::new(),
        }
    }
}

/// In-memory node. Clones share state, so a test keeps one handle while the
/// client owns another.
#[derive(Clone, Debug, Default)]
pub struct MockRpc {
    pub state: Arc<Mutex<MockState>>,
}

impl MockRpc {
    pub fn with(configure: impl FnOnce(&mut MockState)) -> Self {
        let rpc = MockRpc::default();
        configure(&mut rpc.state.lock().unwrap());
        rpc
    }

    pub fn sent_count(&self) -> usize {
        self.state.lock().unwrap().sent.len()
    }

    fn price(state: &MockState, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        let mut amounts = vec![amount_in];
        for hop in path.windows(2) {
            if state.unpriced.contains(&(hop[0], hop[1])) {
                return Err(Error::SimulationRevert(
                    "execution reverted: INSUFFICIENT_LIQUIDITY".to_string(),
                ));
            }
            let last = *amounts.last().unwrap();
            amounts.push(last * U256::from(state.rate_num) / U256::from(state.rate_den));
        }
        Ok(amounts)
    }
}

fn uint(value: U256) -> Bytes {
    Bytes::from(encode(&[Token::Uint(value)]))
}

#[async_trait]
impl NetworkRpc for MockRpc {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn get_balance(&self, _address: Address) -> Result<U256> {
        Ok(self.state.lock().unwrap().balance)
    }

    async fn get_transaction_count(&self, _address: Address) -> Result<U256> {
        let mut state = self.state.lock().unwrap();
        let nonce = state.reported_nonce.unwrap_or(state.nonce);
        state.nonce_reads.push(nonce);
        Ok(nonce)
    }

    async fn get_gas_price(&self) -> Result<U256> {
        Ok(self.state.lock().unwrap().gas_price)
    }

    async fn estimate_gas(&self, _call: &CallRequest) -> Result<U256> {
        let mut state = self.state.lock().unwrap();
        state.estimate_calls += 1;
        if state.fail_estimate {
            return Err(Error::SimulationRevert(
                "execution reverted: TransferHelper: TRANSFER_FROM_FAILED".to_string(),
            ));
        }
        Ok(state.gas_estimate)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256> {
        let mut state = self.state.lock().unwrap();
        if state.fail_send_after.map_or(false, |limit| state.sent.len() >= limit) {
            return Err(Error::NetworkError("rpc error -32000: node unavailable".to_string()));
        }
        let hash = H256::from(keccak256(&raw));
        let tx: Transaction = ethers::utils::rlp::decode(&raw)
            .map_err(|e| Error::NetworkError(format!("undecodable transaction: {e}")))?;
        if tx.nonce < state.nonce {
            return Err(Error::NonceConflict(format!(
                "nonce too low: {} < {}",
                tx.nonce, state.nonce
            )));
        }
        if tx.input.len() >= 4 && tx.input[..4] == selector(&ERC20_ABI, "approve") {
            let args = ERC20_ABI
                .function("approve")
                .unwrap()
                .decode_input(&tx.input[4..])
                .unwrap();
            state.allowance = args[1].clone().into_uint().unwrap();
        }
        state.nonce = tx.nonce + 1;
        state.sent.push(raw);
        state.sent_hashes.push(hash);
        Ok(hash)
    }

    async fn get_transaction(&self, hash: H256) -> Result<Option<Transaction>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sent_hashes
            .iter()
            .position(|sent| *sent == hash)
            .map(|index| decode_sent(&state.sent[index])))
    }

    async fn get_transaction_receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>> {
        let state = self.state.lock().unwrap();
        if !state.sent_hashes.contains(&hash) {
            return Ok(None);
        }
        Ok(Some(TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(U64::from(1u64)),
            status: Some(U64::from(state.receipt_success as u64)),
            ..Default::default()
        }))
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes> {
        let mut state = self.state.lock().unwrap();
        let mut sig = [0u8; 4];
        sig.copy_from_slice(&data[..4]);
        state.calls.push(sig);

        if sig == selector(&ERC20_ABI, "allowance") {
            Ok(uint(state.allowance))
        } else if sig == selector(&ERC20_ABI, "balanceOf") {
            Ok(uint(state.token_balance))
        } else if sig == selector(&ERC20_ABI, "decimals") {
            match state.decimals {
                Some(decimals) => Ok(uint(U256::from(decimals))),
                None => Err(Error::SimulationRevert("execution reverted".to_string())),
            }
        } else if sig == selector(&ROUTER_ABI, "getAmountsOut") {
            let args = ROUTER_ABI
                .function("getAmountsOut")
                .unwrap()
                .decode_input(&data[4..])
                .unwrap();
            let amount_in = args[0].clone().into_uint().unwrap();
            let path: Vec<Address> = args[1]
                .clone()
                .into_array()
                .unwrap()
                .into_iter()
                .map(|t| t.into_address().unwrap())
                .collect();
            let amounts = Self::price(&state, amount_in, &path)?;
            Ok(Bytes::from(encode(&[Token::Array(
                amounts.into_iter().map(Token::Uint).collect(),
            )])))
        } else {
            Err(Error::SimulationRevert(format!(
                "unknown selector 0x{}",
                hex::encode(sig)
            )))
        }
    }
}

#[derive(Debug)]
pub struct MockBridge {
    pub quote: BridgeQuote,
    pub requests: Mutex<Vec<BridgeIntent>>,
}

impl MockBridge {
    pub fn returning(data: &str) -> Self {
        MockBridge {
            quote: BridgeQuote {
                to: "0x5523985926aa12ba58dc5ad00ddca99678d7227e".to_string(),
                data: data.to_string(),
                value: U256::zero(),
                gas_limit: Some(U256::from(450_000u64)),
                approve_to: Some("0xfb7bd5a0ce6a2f0e3d72b3c4e0a0b6cb3f9a1c5d".to_string()),
            },
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BridgeQuoteService for MockBridge {
    async fn request_quote(&self, intent: &BridgeIntent) -> Result<BridgeQuote> {
        self.requests.lock().unwrap().push(intent.clone());
        Ok(self.quote.clone())
    }

    async fn transfer_status(
        &self,
        _chain_id: u64,
        _hash: H256,
    ) -> Result<Option<serde_json::Value>> {
        Ok(Some(serde_json::json!({"status": {"code": 0, "text": "Success"}})))
    }
}

/// Wraps a local key but reports the recovery marker as `base + recovery_id`,
/// so both the `0/1` and `27/28` conventions can be exercised.
#[derive(Debug)]
pub struct MarkerWallet {
    pub inner: LocalEmbeddedWallet,
    pub base: u8,
}

#[async_trait]
impl WalletProvider for MarkerWallet {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn current_chain_id(&self) -> Result<u64> {
        self.inner.current_chain_id().await
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        self.inner.switch_chain(chain_id).await
    }

    async fn sign_raw_hash(&self, hash: H256) -> Result<Bytes> {
        let mut raw = self.inner.sign_raw_hash(hash).await?.to_vec();
        raw[64] = raw[64] - 27 + self.base;
        Ok(Bytes::from(raw))
    }
}

/// Claims one address but signs with a different key.
#[derive(Debug)]
pub struct ImpostorWallet {
    pub claimed: Address,
    pub signer: LocalEmbeddedWallet,
}

#[async_trait]
impl WalletProvider for ImpostorWallet {
    fn address(&self) -> Address {
        self.claimed
    }

    async fn current_chain_id(&self) -> Result<u64> {
        self.signer.current_chain_id().await
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        self.signer.switch_chain(chain_id).await
    }

    async fn sign_raw_hash(&self, hash: H256) -> Result<Bytes> {
        self.signer.sign_raw_hash(hash).await
    }
}

pub fn embedded(provider: impl WalletProvider + 'static) -> EmbeddedWallet {
    ConnectedWallet::connect(Arc::new(provider), "privy")
        .into_embedded()
        .unwrap()
}

pub fn test_wallet(chain_id: u64) -> EmbeddedWallet {
    LocalEmbeddedWallet::from_private_key(TEST_KEY, chain_id)
        .unwrap()
        .into_embedded()
}

pub fn fast_options() -> OperationOptions {
    OperationOptions {
        poll_interval: Duration::from_millis(5),
        approval_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

pub fn client(rpc: &MockRpc) -> OperationClient<MockRpc> {
    OperationClient::with_options(rpc.clone(), test_wallet(338), fast_options())
}

pub fn testnet() -> NetworkConfig {
    NetworkConfig::testnet()
}

pub fn decode_sent(raw: &Bytes) -> Transaction {
    ethers::utils::rlp::decode(raw).unwrap()
}
