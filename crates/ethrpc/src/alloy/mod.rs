mod instrumentation;

pub use instrumentation::{InstrumentationLayer, InstrumentedTransport};
use {
    crate::{AlloyProvider, Signer},
    alloy::{
        network::EthereumWallet,
        providers::{Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
    },
    url::Url,
};

/// Creates a read-only provider for the node at `url`.
pub fn provider(url: &Url) -> AlloyProvider {
    let rpc = ClientBuilder::default()
        .layer(InstrumentationLayer::new("main"))
        .http(url.clone());
    ProviderBuilder::new().connect_client(rpc).erased()
}

/// Creates a provider that signs outgoing transactions with `signer`.
pub fn provider_with_signer(url: &Url, signer: &Signer) -> AlloyProvider {
    let rpc = ClientBuilder::default()
        .layer(InstrumentationLayer::new("signer"))
        .http(url.clone());
    let wallet = EthereumWallet::new(signer.inner().clone());

    ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(rpc)
        .erased()
}
