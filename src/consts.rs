use std::time::Duration;

pub const CRONOS_MAINNET_CHAIN_ID: u64 = 25;
pub const CRONOS_TESTNET_CHAIN_ID: u64 = 338;

pub const CRONOS_MAINNET_RPC: &str = "https://evm.cronos.org";
// evm-t3.cronos.org sits behind bot protection and rejects programmatic JSON-RPC.
pub const CRONOS_TESTNET_RPC: &str = "https://cronos-testnet.drpc.org";

pub const CRONOS_MAINNET_EXPLORER: &str = "https://cronoscan.com";
pub const CRONOS_TESTNET_EXPLORER: &str = "https://testnet.cronoscan.com";

/// VVS Finance router (UniswapV2-style).
pub const VVS_ROUTER: &str = "0x145863Eb42Cf62847A6Ca784e6416C1682b1b2Ae";
/// Wrapped CRO (WETH9 layout).
pub const WRAPPED_CRO: &str = "0x5C7F8A570d578ED84E63fdFA7b1eE72dEae1AE23";

pub const NATIVE_DECIMALS: u8 = 18;

/// Estimated gas is multiplied by this before the floor is applied.
pub const GAS_SAFETY_MULTIPLIER: u64 = 2;

pub const NATIVE_TRANSFER_GAS_FLOOR: u64 = 21_000;
pub const TOKEN_TRANSFER_GAS_FLOOR: u64 = 65_000;
pub const APPROVAL_GAS_FLOOR: u64 = 100_000;
pub const NATIVE_TO_TOKEN_SWAP_GAS_FLOOR: u64 = 250_000;
pub const TOKEN_SWAP_GAS_FLOOR: u64 = 300_000;
pub const BRIDGE_GAS_FLOOR: u64 = 300_000;

pub const BPS_DENOMINATOR: u32 = 10_000;
/// 1%
pub const DEFAULT_SLIPPAGE_BPS: u32 = 100;
/// 3%, applied by the bridge aggregator on the destination leg.
pub const DEFAULT_BRIDGE_SLIPPAGE_BPS: u32 = 300;

pub const SWAP_DEADLINE: Duration = Duration::from_secs(10 * 60);

pub const TRANSFER_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const BRIDGE_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const SYMBIOSIS_API_URL: &str = "https://api.symbiosis.finance";

pub const PAYMENT_HEADER_NAME: &str = "X-PAYMENT";
pub const PAYMENT_X402_VERSION: u8 = 1;
pub const PAYMENT_SCHEME: &str = "exact";
pub const PAYMENT_NETWORK_MAINNET: &str = "cronos";
pub const PAYMENT_NETWORK_TESTNET: &str = "cronos-testnet";

/// `Error(string)` revert payload selector.
pub const REVERT_ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Client identifier reported by the embedded (custodial) wallet SDK.
pub const EMBEDDED_WALLET_CLIENT: &str = "privy";
