use super::transfer::{parse_recipient, precheck_amount};
use super::{OperationClient, TransferParams};
use crate::config::{Asset, NetworkConfig};
use crate::consts::{PAYMENT_SCHEME, PAYMENT_X402_VERSION};
use crate::prelude::Result;
use crate::rpc::NetworkRpc;
use crate::unsigned::SignedTransaction;
use crate::Error;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentParams {
    pub pay_to: String,
    pub amount: String,
    pub asset: Asset,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub raw_transaction: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEnvelope {
    #[serde(rename = "x402Version")]
    pub x402_version: u8,
    pub scheme: String,
    pub network: String,
    pub payload: PaymentPayload,
}

impl PaymentEnvelope {
    pub fn new(network: &NetworkConfig, signed: &SignedTransaction) -> Self {
        PaymentEnvelope {
            x402_version: PAYMENT_X402_VERSION,
            scheme: PAYMENT_SCHEME.to_string(),
            network: network.payment_network.clone(),
            payload: PaymentPayload {
                raw_transaction: signed.raw_hex(),
            },
        }
    }

    /// Standard-alphabet base64 of the JSON envelope.
    pub fn encode(&self) -> Result<String> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }

    pub fn decode(header: &str) -> Result<Self> {
        let json = STANDARD
            .decode(header.trim())
            .map_err(|e| Error::JsonParse(format!("payment header is not base64: {e}")))?;
        Ok(serde_json::from_slice(&json)?)
    }
}

/// A signed payment that has not been broadcast. `value` goes into the
/// payment header verbatim; the payee settles it.
#[derive(Clone, Debug)]
pub struct PaymentHeader {
    pub value: String,
    pub signed: SignedTransaction,
}

impl<R: NetworkRpc> OperationClient<R> {
    /// Sign a transfer to `pay_to` and wrap it as a payment header. Nothing is
    /// broadcast, so the local nonce record is left untouched.
    pub async fn payment_header(
        &mut self,
        network: &NetworkConfig,
        params: PaymentParams,
    ) -> Result<PaymentHeader> {
        let recipient = parse_recipient(&params.pay_to)?;
        precheck_amount(&params.amount, params.asset)?;
        self.ensure_rpc_chain(network).await?;

        let transfer = TransferParams {
            recipient: params.pay_to,
            amount: params.amount,
            asset: params.asset,
        };
        let (draft, kind) = self.transfer_draft(network, &transfer, recipient).await?;
        let fees = self.prepare(network, &draft, kind, None).await?;
        let signed = self.sign(draft, &fees).await?;

        let value = PaymentEnvelope::new(network, &signed).encode()?;
        info!(
            "Payment header signed for {recipient:?} (nonce {}, tx {:?})",
            signed.tx.nonce, signed.hash
        );
        Ok(PaymentHeader { value, signed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> PaymentEnvelope {
        PaymentEnvelope {
            x402_version: 1,
            scheme: "exact".to_string(),
            network: "cronos-testnet".to_string(),
            payload: PaymentPayload {
                raw_transaction: "0xf86c".to_string(),
            },
        }
    }

    #[test]
    fn envelope_json_shape() {
        assert_eq!(
            serde_json::to_value(envelope()).unwrap(),
            json!({
                "x402Version": 1,
                "scheme": "exact",
                "network": "cronos-testnet",
                "payload": {"rawTransaction": "0xf86c"}
            })
        );
    }

    #[test]
    fn header_is_standard_base64_of_envelope() {
        let header = envelope().encode().unwrap();
        let json = STANDARD.decode(&header).unwrap();
        assert!(json.starts_with(b"{\"x402Version\":1"));
        assert_eq!(PaymentEnvelope::decode(&header).unwrap(), envelope());
        assert!(PaymentEnvelope::decode("not base64!").is_err());
    }
}
