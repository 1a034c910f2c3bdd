//! ABI fragments for the ERC-20 token and UniswapV2-style router calls the
//! gateway makes, with typed encoders/decoders around them.

use crate::prelude::Result;
use crate::Error;
use ethers::abi::{parse_abi, Abi, Function, Token};
use ethers::types::{Address, Bytes, U256};
use lazy_static::lazy_static;

lazy_static! {
    pub static ref ERC20_ABI: Abi = parse_abi(&[
        "function approve(address spender, uint256 amount) external returns (bool)",
        "function allowance(address owner, address spender) external view returns (uint256)",
        "function balanceOf(address owner) external view returns (uint256)",
        "function transfer(address to, uint256 amount) external returns (bool)",
        "function decimals() external view returns (uint8)",
    ])
    .expect("static ERC-20 ABI parses");
    pub static ref ROUTER_ABI: Abi = parse_abi(&[
        "function getAmountsOut(uint256 amountIn, address[] path) external view returns (uint256[] amounts)",
        "function swapExactETHForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline) external payable returns (uint256[] amounts)",
        "function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts)",
        "function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts)",
    ])
    .expect("static router ABI parses");
}

/// Which router entry point a swap goes through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwapDirection {
    NativeToToken,
    TokenToNative,
    TokenToToken,
}

impl SwapDirection {
    pub fn router_function(self) -> &'static str {
        match self {
            SwapDirection::NativeToToken => "swapExactETHForTokens",
            SwapDirection::TokenToNative => "swapExactTokensForETH",
            SwapDirection::TokenToToken => "swapExactTokensForTokens",
        }
    }
}

fn function<'a>(abi: &'a Abi, name: &str) -> &'a Function {
    // Both tables are static and every name used below is present in them.
    abi.function(name)
        .unwrap_or_else(|_| panic!("function {name} missing from static ABI"))
}

fn encode(abi: &Abi, name: &str, args: &[Token]) -> Result<Bytes> {
    function(abi, name)
        .encode_input(args)
        .map(Bytes::from)
        .map_err(|e| Error::invalid_amount(name, format!("cannot encode call arguments: {e}")))
}

fn decode(abi: &Abi, name: &str, data: &[u8]) -> Result<Vec<Token>> {
    function(abi, name).decode_output(data).map_err(|e| {
        Error::NetworkError(format!(
            "malformed {name} return data (0x{}): {e}",
            hex::encode(data)
        ))
    })
}

fn single_uint(abi: &Abi, name: &str, data: &[u8]) -> Result<U256> {
    decode(abi, name, data)?
        .into_iter()
        .next()
        .and_then(Token::into_uint)
        .ok_or_else(|| Error::NetworkError(format!("{name} did not return a uint")))
}

pub fn selector(abi: &Abi, name: &str) -> [u8; 4] {
    function(abi, name).short_signature()
}

pub fn encode_approve(spender: Address, amount: U256) -> Result<Bytes> {
    encode(&ERC20_ABI, "approve", &[Token::Address(spender), Token::Uint(amount)])
}

pub fn encode_transfer(to: Address, amount: U256) -> Result<Bytes> {
    encode(&ERC20_ABI, "transfer", &[Token::Address(to), Token::Uint(amount)])
}

pub fn encode_allowance(owner: Address, spender: Address) -> Result<Bytes> {
    encode(&ERC20_ABI, "allowance", &[Token::Address(owner), Token::Address(spender)])
}

pub fn decode_allowance(data: &[u8]) -> Result<U256> {
    single_uint(&ERC20_ABI, "allowance", data)
}

pub fn encode_balance_of(owner: Address) -> Result<Bytes> {
    encode(&ERC20_ABI, "balanceOf", &[Token::Address(owner)])
}

pub fn decode_balance_of(data: &[u8]) -> Result<U256> {
    single_uint(&ERC20_ABI, "balanceOf", data)
}

pub fn encode_decimals() -> Result<Bytes> {
    encode(&ERC20_ABI, "decimals", &[])
}

pub fn decode_decimals(data: &[u8]) -> Result<u8> {
    let decimals = single_uint(&ERC20_ABI, "decimals", data)?;
    if decimals > U256::from(u8::MAX) {
        return Err(Error::NetworkError(format!(
            "decimals() returned out-of-range value {decimals}"
        )));
    }
    Ok(decimals.as_u32() as u8)
}

fn path_token(path: &[Address]) -> Token {
    Token::Array(path.iter().copied().map(Token::Address).collect())
}

pub fn encode_get_amounts_out(amount_in: U256, path: &[Address]) -> Result<Bytes> {
    encode(
        &ROUTER_ABI,
        "getAmountsOut",
        &[Token::Uint(amount_in), path_token(path)],
    )
}

pub fn decode_amounts_out(data: &[u8]) -> Result<Vec<U256>> {
    let amounts = decode(&ROUTER_ABI, "getAmountsOut", data)?
        .into_iter()
        .next()
        .and_then(Token::into_array)
        .ok_or_else(|| Error::NetworkError("getAmountsOut did not return an array".to_string()))?;
    amounts
        .into_iter()
        .map(|token| {
            token
                .into_uint()
                .ok_or_else(|| Error::NetworkError("getAmountsOut returned a non-uint".to_string()))
        })
        .collect()
}

/// Router swap call data for `direction`. `amount_in` is carried in the
/// transaction value (not the call data) for native-input swaps.
pub fn encode_swap(
    direction: SwapDirection,
    amount_in: U256,
    amount_out_min: U256,
    path: &[Address],
    recipient: Address,
    deadline: U256,
) -> Result<Bytes> {
    let name = direction.router_function();
    let tail = [
        path_token(path),
        Token::Address(recipient),
        Token::Uint(deadline),
    ];
    let args: Vec<Token> = match direction {
        SwapDirection::NativeToToken => std::iter::once(Token::Uint(amount_out_min))
            .chain(tail)
            .collect(),
        SwapDirection::TokenToNative | SwapDirection::TokenToToken => {
            [Token::Uint(amount_in), Token::Uint(amount_out_min)]
                .into_iter()
                .chain(tail)
                .collect()
        }
    };
    encode(&ROUTER_ABI, name, &args)
}
