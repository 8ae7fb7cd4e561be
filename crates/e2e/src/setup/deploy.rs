use {
    super::{Error, StorageContract, onchain_components::wait_for_receipt},
    contracts::alloy::Storage,
    ethrpc::{Rpc, Signer},
    std::time::Duration,
};

/// Deploys the storage contract and waits until the deployment is mined.
///
/// Fails before submitting anything if `signer` is bound to a different
/// chain than the one the node reports.
pub async fn deploy(
    rpc: &Rpc,
    signer: &Signer,
    mining_timeout: Duration,
) -> Result<StorageContract, Error> {
    let node = rpc.chain_id().await?;
    if node != signer.chain_id() {
        return Err(Error::ChainIdMismatch {
            signer: signer.chain_id(),
            node,
        });
    }

    let pending = Storage::Instance::deploy_builder(rpc.provider().clone())
        .from(signer.address())
        .send()
        .await
        .map_err(Error::Deployment)?;
    let hash = *pending.tx_hash();
    tracing::debug!(?hash, "submitted deployment transaction");

    let receipt = wait_for_receipt(pending, mining_timeout).await?;
    let address = receipt
        .contract_address
        .filter(|_| receipt.status())
        .ok_or(Error::NotDeployed(hash))?;
    tracing::info!(?address, ?hash, "storage contract deployed");

    Ok(StorageContract::new(address, rpc))
}
