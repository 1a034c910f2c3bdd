use crate::consts::REVERT_ERROR_SELECTOR;
use crate::helpers::parse_hex_bytes;
use crate::Error;
use ethers::abi::{decode, ParamType};

/// Map a node-side failure onto the error taxonomy using the JSON-RPC error
/// code, message text and optional revert data.
pub fn classify_node_error(code: Option<i64>, message: &str, data: Option<&str>) -> Error {
    let lowered = message.to_ascii_lowercase();

    if lowered.contains("insufficient funds") || lowered.contains("insufficient balance") {
        return Error::InsufficientFunds(format!("node rejected the transaction: {message}"));
    }
    if lowered.contains("nonce too low")
        || lowered.contains("nonce too high")
        || lowered.contains("already known")
        || lowered.contains("replacement transaction underpriced")
        || lowered.contains("invalid nonce")
    {
        return Error::NonceConflict(message.to_string());
    }
    if code == Some(3) || lowered.contains("revert") || lowered.contains("execution reverted") {
        let reason = data
            .and_then(|data| parse_hex_bytes(data).ok())
            .and_then(|bytes| decode_revert_reason(&bytes));
        return match reason {
            Some(reason) => Error::SimulationRevert(format!("{message} (reason: {reason})")),
            None => Error::SimulationRevert(message.to_string()),
        };
    }
    match code {
        Some(code) => Error::NetworkError(format!("rpc error {code}: {message}")),
        None => Error::NetworkError(message.to_string()),
    }
}

/// Decode an `Error(string)` revert payload; `None` for anything else.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 || data[..4] != REVERT_ERROR_SELECTOR {
        return None;
    }
    decode(&[ParamType::String], &data[4..])
        .ok()?
        .into_iter()
        .next()?
        .into_string()
}
