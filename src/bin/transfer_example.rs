use cro_gateway::prelude::Result;
use cro_gateway::{
    Error, EthersRpc, LocalEmbeddedWallet, Network, NetworkConfig, OperationClient,
    TransferParams,
};
use log::info;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let network = NetworkConfig::from_env(Network::Testnet)?;

    // Key must hold testnet funds only
    let private_key = env::var("PRIVATE_KEY")
        .map_err(|_| Error::Config("PRIVATE_KEY must be set".to_string()))?;
    let wallet =
        LocalEmbeddedWallet::from_private_key(&private_key, network.chain_id)?.into_embedded();

    let rpc = EthersRpc::for_network(&network)?;
    let mut client = OperationClient::new(rpc, wallet);

    let recipient = env::args()
        .nth(1)
        .unwrap_or_else(|| "0x1234567890123456789012345678901234567890".to_string());
    let amount = env::args().nth(2).unwrap_or_else(|| "0.01".to_string());

    let mut result = client
        .transfer(&network, TransferParams::native(recipient, amount))
        .await?;
    info!("sent: {}", result.explorer_url);

    let status = client.wait_for_confirmation(&mut result).await?;
    info!("status: {status:?}, stages: {:?}", result.stages);
    Ok(())
}
