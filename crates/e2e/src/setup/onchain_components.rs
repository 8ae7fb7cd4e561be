use {
    super::Error,
    alloy::{
        network::Ethereum,
        primitives::{Address, U256},
        providers::PendingTransactionBuilder,
        rpc::types::TransactionReceipt,
    },
    contracts::alloy::Storage,
    ethrpc::{Rpc, Signer},
    std::{fmt, time::Duration},
    url::Url,
};

/// Handle to a deployed storage contract.
#[derive(Clone, Debug)]
pub struct StorageContract {
    contract: Storage::Instance,
    url: Url,
}

impl StorageContract {
    /// Binds the contract at `address` to the node `rpc` is connected to.
    pub fn new(address: Address, rpc: &Rpc) -> Self {
        Self {
            contract: Storage::Instance::new(address, rpc.provider().clone()),
            url: rpc.url().clone(),
        }
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Submits a transaction signed by `signer` that stores `value` under
    /// `key`. The value is only visible to [`StorageContract::retrieve`] once
    /// the returned transaction is mined.
    ///
    /// Fails without submitting anything if `signer` is bound to a chain
    /// other than the node's.
    pub async fn store(&self, signer: &Signer, key: Address, value: U256) -> Result<PendingTx, Error> {
        let contract = Storage::Instance::new(
            self.address(),
            ethrpc::alloy::provider_with_signer(&self.url, signer),
        );
        let pending = contract
            .store(key, value)
            .from(signer.address())
            .send()
            .await
            .map_err(Error::Call)?;
        tracing::debug!(hash = ?pending.tx_hash(), from = ?signer.address(), ?key, %value, "submitted store");
        Ok(PendingTx(pending))
    }

    /// Reads the value stored under `key` in the latest block.
    pub async fn retrieve(&self, key: Address) -> Result<U256, Error> {
        self.contract
            .retrieve(key)
            .call()
            .await
            .map_err(Error::Call)
    }
}

/// A submitted transaction that may not be mined yet.
pub struct PendingTx(PendingTransactionBuilder<Ethereum>);

impl fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PendingTx").field(self.0.tx_hash()).finish()
    }
}

impl PendingTx {
    /// Waits until the transaction is mined and checks that it succeeded.
    pub async fn mined(self, timeout: Duration) -> Result<TransactionReceipt, Error> {
        let receipt = wait_for_receipt(self.0, timeout).await?;
        if !receipt.status() {
            return Err(Error::Reverted(receipt.transaction_hash));
        }
        Ok(receipt)
    }
}

pub(crate) async fn wait_for_receipt(
    pending: PendingTransactionBuilder<Ethereum>,
    timeout: Duration,
) -> Result<TransactionReceipt, Error> {
    let hash = *pending.tx_hash();
    tokio::time::timeout(timeout, pending.get_receipt())
        .await
        .map_err(|_| Error::MiningTimeout { hash, timeout })?
        .map_err(|source| Error::Confirmation { hash, source })
}
