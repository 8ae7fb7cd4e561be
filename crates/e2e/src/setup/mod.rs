mod config;
mod deploy;
mod onchain_components;

pub use {config::Config, deploy::deploy, onchain_components::*};
use {
    alloy::{
        primitives::{ChainId, TxHash},
        providers::PendingTransactionError,
    },
    docker::Node,
    ethrpc::{Rpc, Signer},
    futures::FutureExt,
    std::{
        future::Future,
        panic::{self, AssertUnwindSafe},
        time::Duration,
    },
    url::Url,
};

/// Log filter installed for every test.
const LOG_FILTER: &str = "warn,e2e=debug,docker=debug,ethrpc=debug";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Node(#[from] docker::Error),
    #[error(transparent)]
    Rpc(#[from] ethrpc::Error),
    #[error("node is not running")]
    NodeNotRunning,
    #[error("signer is bound to chain {signer} but the node reports chain {node}")]
    ChainIdMismatch { signer: ChainId, node: ChainId },
    #[error("failed to submit deployment: {0}")]
    Deployment(#[source] alloy::contract::Error),
    #[error("deployment transaction {0} did not create a contract")]
    NotDeployed(TxHash),
    #[error("transaction {hash} was not mined within {timeout:?}")]
    MiningTimeout { hash: TxHash, timeout: Duration },
    #[error("failed to wait for transaction {hash}: {source}")]
    Confirmation {
        hash: TxHash,
        #[source]
        source: PendingTransactionError,
    },
    #[error("contract call failed: {0}")]
    Call(#[source] alloy::contract::Error),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A freshly deployed storage contract on a node that lives for the duration
/// of one test.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub config: Config,
    pub endpoint: Url,
    pub rpc: Rpc,
    pub signer: Signer,
    pub storage: StorageContract,
}

impl Fixture {
    /// Connects to the node at `endpoint`, derives the signer from the
    /// configured key and deploys the storage contract.
    pub async fn connect(endpoint: Url, config: Config) -> Result<Self, Error> {
        let rpc = Rpc::new(&endpoint, config.connect_timeout).await?;
        tracing::info!(%endpoint, chain = rpc.network().chain, "connected to node");

        let signer = Signer::new(&config.private_key, config.node.chain_id)?;
        let rpc = rpc.signed_by(&signer);
        let storage = deploy(&rpc, &signer, config.mining_timeout).await?;

        Ok(Self {
            config,
            endpoint,
            rpc,
            signer,
            storage,
        })
    }

    /// Releases the RPC connection. The node itself is stopped by whoever
    /// provisioned it.
    pub fn teardown(self) {
        self.rpc.close();
    }
}

/// *Testing* function that provisions a node, deploys the storage contract to
/// it and passes the resulting [`Fixture`] to `f`.
///
/// The node is stopped afterwards no matter whether setup failed, the test
/// panicked or it passed.
pub async fn run_test<F, Fut>(f: F)
where
    F: FnOnce(Fixture) -> Fut,
    Fut: Future<Output = ()>,
{
    run_test_with_config(Config::default(), f).await
}

/// Like [`run_test`] but with a custom configuration.
pub async fn run_test_with_config<F, Fut>(config: Config, f: F)
where
    F: FnOnce(Fixture) -> Fut,
    Fut: Future<Output = ()>,
{
    let node_config = config.node.clone();
    with_node(&node_config, |endpoint| async move {
        let fixture = Fixture::connect(endpoint, config).await?;
        f(fixture.clone()).await;
        fixture.teardown();
        Ok(())
    })
    .await
}

/// *Testing* function that provisions a bare node and passes its endpoint
/// to `f`. The node is stopped afterwards on every path.
pub async fn run_node_test<F, Fut>(config: docker::node::Config, f: F)
where
    F: FnOnce(Url) -> Fut,
    Fut: Future<Output = ()>,
{
    with_node(&config, |endpoint| async move {
        f(endpoint).await;
        Ok(())
    })
    .await
}

async fn with_node<F, Fut>(config: &docker::node::Config, body: F)
where
    F: FnOnce(Url) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    observe::tracing::initialize_reentrant(LOG_FILTER);

    let mut node = Node::default();

    // Hack: the closure may actually be unwind unsafe; moreover, `catch_unwind`
    // does not catch some types of panics. In those cases the container is
    // only removed when `node` gets dropped.
    let result = AssertUnwindSafe(async {
        node = Node::start(config).await?;
        let endpoint = node.url().cloned().ok_or(Error::NodeNotRunning)?;
        body(endpoint).await
    })
    .catch_unwind()
    .await;

    let teardown = node.stop().await;
    if let Err(err) = &teardown {
        tracing::error!(?err, "failed to tear down node");
    }

    match result {
        Err(panic) => panic::resume_unwind(panic),
        Ok(Err(err)) => panic!("test setup failed: {err}"),
        Ok(Ok(())) => {
            if let Err(err) = teardown {
                panic!("test teardown failed: {err}");
            }
        }
    }
}
