use cro_gateway::prelude::Result;
use cro_gateway::{
    EthersRpc, LocalEmbeddedWallet, Network, NetworkConfig, OperationClient, SwapParams,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Quotes need no funds, so a throwaway key is enough
    let network = NetworkConfig::from_env(Network::Mainnet)?;
    let wallet = LocalEmbeddedWallet::random(network.chain_id).into_embedded();
    let client = OperationClient::new(EthersRpc::for_network(&network)?, wallet);

    println!("Quoting on {} (chain {})", network.network, network.chain_id);

    let pairs = [("CRO", "USDC", "10"), ("USDC", "CRO", "25"), ("USDC", "WETH", "100")];
    for (from, to, amount) in pairs {
        let params = SwapParams::new(from, to, amount).with_slippage("0.5".parse()?);
        match client.quote_swap(&network, &params).await {
            Ok(quote) => {
                println!("\n{amount} {from} -> {to}");
                println!("  route:    {:?}", quote.route);
                println!("  expected: {}", quote.expected_amount_out);
                println!("  minimum:  {}", quote.minimum_amount_out);
                println!("  slippage: {} bps", quote.slippage_bps);
            }
            Err(e) => println!("\n{amount} {from} -> {to}: {e}"),
        }
    }

    Ok(())
}
