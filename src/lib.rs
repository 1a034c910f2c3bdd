pub mod abi;
mod assembler;
pub mod bridge;
mod broadcast;
mod config;
pub mod consts;
mod errors;
mod fee;
mod helpers;
mod operations;
pub mod prelude;
mod quote;
mod req;
pub mod rpc;
pub mod signer;
mod unsigned;

pub use assembler::TransactionAssembler;
pub use bridge::{BridgeCall, BridgeIntent, BridgeQuote, BridgeQuoteService, SymbiosisClient};
pub use broadcast::{Broadcaster, OperationStatus};
pub use config::{bridge_counterpart, Asset, Network, NetworkConfig};
pub use errors::Error;
pub use fee::{padded_gas_limit, CallKind, FeeEstimate, FeeEstimator};
pub use helpers::{
    checksummed, deadline_after, format_units, parse_address, parse_units, validate_positive_amount,
};
pub use operations::{
    BridgeParams, OperationClient, OperationKind, OperationOptions, OperationResult, OperationStage,
    PaymentEnvelope, PaymentHeader, PaymentParams, PaymentPayload, SwapParams, TransferParams,
};
pub use quote::{candidate_paths, Quote, QuoteEngine, Slippage};
pub use rpc::{CallRequest, EthersRpc, NetworkRpc};
pub use signer::{
    ConnectedWallet, EmbeddedWallet, LocalEmbeddedWallet, SignerAdapter, WalletKind, WalletProvider,
};
pub use unsigned::{SignedTransaction, TransactionBuilder, TransactionDraft, UnsignedTransaction};
