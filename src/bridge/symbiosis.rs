use super::{BridgeIntent, BridgeQuote, BridgeQuoteService};
use crate::consts::SYMBIOSIS_API_URL;
use crate::helpers::checksummed;
use crate::prelude::Result;
use crate::req::HttpClient;
use crate::Error;
use async_trait::async_trait;
use ethers::types::{H256, U256};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SwapRequest {
    from_chain_id: u64,
    to_chain_id: u64,
    from_token_address: String,
    to_token_address: String,
    amount: String,
    recipient: String,
    from: String,
    slippage: u32,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Quantity {
    Number(u64),
    Text(String),
}

impl Quantity {
    fn to_u256(&self, field: &str) -> Result<U256> {
        match self {
            Quantity::Number(n) => Ok(U256::from(*n)),
            Quantity::Text(text) => {
                let text = text.trim();
                let parsed = match text.strip_prefix("0x") {
                    Some(hex) => U256::from_str_radix(hex, 16).ok(),
                    None => U256::from_dec_str(text).ok(),
                };
                parsed.ok_or_else(|| {
                    Error::InvalidBridgeResponse(format!("{field} {text:?} is not a number"))
                })
            }
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SwapTx {
    to: Option<String>,
    data: Option<String>,
    value: Option<Quantity>,
    gas_limit: Option<Quantity>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    tx: Option<SwapTx>,
    approve_to: Option<String>,
}

/// Client for a Symbiosis-style cross-chain swap API (`POST /v1/swap`,
/// `GET /v1/tx/{chainId}/{hash}`).
#[derive(Debug, Clone)]
pub struct SymbiosisClient {
    http_client: HttpClient,
}

impl SymbiosisClient {
    pub fn new(client: Option<Client>, base_url: Option<String>) -> Self {
        SymbiosisClient {
            http_client: HttpClient::new(
                client,
                base_url.unwrap_or_else(|| SYMBIOSIS_API_URL.to_string()),
            ),
        }
    }

    fn parse_quote(text: &str) -> Result<BridgeQuote> {
        let response: SwapResponse = serde_json::from_str(text)
            .map_err(|e| Error::InvalidBridgeResponse(format!("malformed swap response: {e}")))?;
        let tx = response.tx.ok_or_else(|| {
            Error::InvalidBridgeResponse("swap response has no tx object".to_string())
        })?;
        Ok(BridgeQuote {
            to: tx.to.unwrap_or_default(),
            data: tx.data.unwrap_or_default(),
            value: match &tx.value {
                Some(value) => value.to_u256("value")?,
                None => U256::zero(),
            },
            gas_limit: tx
                .gas_limit
                .as_ref()
                .map(|gas| gas.to_u256("gasLimit"))
                .transpose()?,
            approve_to: response.approve_to,
        })
    }
}

#[async_trait]
impl BridgeQuoteService for SymbiosisClient {
    async fn request_quote(&self, intent: &BridgeIntent) -> Result<BridgeQuote> {
        let request = SwapRequest {
            from_chain_id: intent.source_chain,
            to_chain_id: intent.destination_chain,
            from_token_address: checksummed(&intent.from_token),
            to_token_address: checksummed(&intent.to_token),
            amount: intent.amount.to_string(),
            recipient: checksummed(&intent.recipient),
            from: checksummed(&intent.sender),
            slippage: intent.slippage_bps,
        };
        let data = serde_json::to_string(&request)?;
        debug!("Requesting bridge quote: {data}");

        let text = self.http_client.post("/v1/swap", data).await?;
        let quote = Self::parse_quote(&text)?;
        info!(
            "Bridge quote {} -> {}: target {}, value {}",
            intent.source_chain, intent.destination_chain, quote.to, quote.value
        );
        Ok(quote)
    }

    async fn transfer_status(
        &self,
        chain_id: u64,
        hash: H256,
    ) -> Result<Option<serde_json::Value>> {
        let path = format!("/v1/tx/{chain_id}/{hash:?}");
        match self.http_client.get(&path).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => {
                debug!("Bridge service has not seen {hash:?} yet");
                Ok(None)
            }
        }
    }
}
