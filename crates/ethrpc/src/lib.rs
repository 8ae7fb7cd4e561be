pub mod alloy;
mod signer;

pub use signer::{Signer, TEST_PRIVATE_KEY};
use {
    ::alloy::{
        primitives::ChainId,
        providers::{DynProvider, Provider},
        signers::local::LocalSignerError,
        transports::TransportError,
    },
    std::time::Duration,
    url::Url,
};

pub type AlloyProvider = DynProvider;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to {url}: {source}")]
    Connection {
        url: Url,
        #[source]
        source: TransportError,
    },
    #[error("no response from {url} within {timeout:?}")]
    Timeout { url: Url, timeout: Duration },
    #[error("invalid private key: {0}")]
    KeyDecode(#[from] LocalSignerError),
    #[error("rpc error: {0}")]
    Rpc(#[from] TransportError),
}

/// An Ethereum RPC connection.
#[derive(Clone, Debug)]
pub struct Rpc {
    provider: AlloyProvider,
    url: Url,
    network: Network,
}

/// Network information observed when the connection was established.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Network {
    pub chain: ChainId,
}

impl Rpc {
    /// Connects a read-only client to the node at `url`.
    ///
    /// The connection is verified with a round trip, so an unreachable node
    /// is reported here rather than on first use.
    pub async fn new(url: &Url, timeout: Duration) -> Result<Self, Error> {
        Self::connect(url, crate::alloy::provider(url), timeout).await
    }

    /// Returns a connection to the same node whose transactions are signed
    /// by `signer`.
    pub fn signed_by(&self, signer: &Signer) -> Self {
        Self {
            provider: crate::alloy::provider_with_signer(&self.url, signer),
            url: self.url.clone(),
            network: self.network,
        }
    }

    async fn connect(url: &Url, provider: AlloyProvider, timeout: Duration) -> Result<Self, Error> {
        let handshake = async {
            let version = provider.get_client_version().await?;
            let chain = provider.get_chain_id().await?;
            Ok::<_, TransportError>((version, chain))
        };

        let (version, chain) = tokio::time::timeout(timeout, handshake)
            .await
            .map_err(|_| Error::Timeout {
                url: url.clone(),
                timeout,
            })?
            .map_err(|source| Error::Connection {
                url: url.clone(),
                source,
            })?;
        tracing::debug!(%url, %version, chain, "connected to node");

        Ok(Self {
            provider,
            url: url.clone(),
            network: Network { chain },
        })
    }

    /// Queries the chain ID the node currently reports.
    pub async fn chain_id(&self) -> Result<ChainId, Error> {
        Ok(self.provider.get_chain_id().await?)
    }

    /// Network information as observed when connecting.
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn provider(&self) -> &AlloyProvider {
        &self.provider
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Releases the connection.
    pub fn close(self) {
        tracing::debug!(url = %self.url, "closing rpc connection");
    }
}
