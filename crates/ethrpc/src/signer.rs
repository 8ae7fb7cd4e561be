use {
    crate::Error,
    alloy::{
        primitives::{Address, ChainId},
        signers::{Signer as _, local::PrivateKeySigner},
    },
    std::str::FromStr,
};

/// Private key of the first account anvil funds by default. It is publicly
/// known and must never hold real funds.
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Signs transactions for exactly one chain.
///
/// Transactions for any other chain ID are refused when they get signed, so
/// a mismatch surfaces when the transaction is submitted.
#[derive(Clone, Debug)]
pub struct Signer {
    inner: PrivateKeySigner,
    chain_id: ChainId,
}

impl Signer {
    /// Derives a signer from a hex encoded private key (with or without
    /// `0x` prefix).
    pub fn new(private_key: &str, chain_id: ChainId) -> Result<Self, Error> {
        let inner = PrivateKeySigner::from_str(private_key)?.with_chain_id(Some(chain_id));
        Ok(Self { inner, chain_id })
    }

    pub fn address(&self) -> Address {
        self.inner.address()
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn inner(&self) -> &PrivateKeySigner {
        &self.inner
    }
}
