use {
    docker::{Node, node::Config},
    e2e::setup::run_node_test,
    ethrpc::Rpc,
    futures::FutureExt,
    rstest::rstest,
    std::{
        panic::AssertUnwindSafe,
        sync::{Arc, Mutex},
        time::Duration,
    },
    url::Url,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
#[ignore]
async fn local_node_is_immediately_connectable() {
    run_node_test(Config::default(), |endpoint| async move {
        assert_eq!(endpoint.scheme(), "http");
        assert!(endpoint.port().is_some());

        let rpc = Rpc::new(&endpoint, CONNECT_TIMEOUT).await.unwrap();
        assert_eq!(rpc.network().chain, 1234);
        rpc.close();
    })
    .await;
}

#[rstest]
#[case(1)]
#[case(1111)]
#[case(1234)]
#[case(31337)]
#[tokio::test]
#[ignore]
async fn local_node_reports_configured_chain_id(#[case] chain_id: u64) {
    let config = Config {
        chain_id,
        ..Default::default()
    };
    run_node_test(config, move |endpoint| async move {
        let rpc = Rpc::new(&endpoint, CONNECT_TIMEOUT).await.unwrap();
        assert_eq!(rpc.chain_id().await.unwrap(), chain_id);
        rpc.close();
    })
    .await;
}

#[tokio::test]
#[ignore]
async fn local_node_stops_idempotently() {
    let mut node = Node::start(&Config::default()).await.unwrap();
    assert!(node.is_running());
    let endpoint = node.url().cloned().unwrap();

    node.stop().await.unwrap();
    assert!(!node.is_running());
    assert!(node.url().is_none());
    node.stop().await.unwrap();

    // The endpoint is gone together with the container.
    assert!(Rpc::new(&endpoint, CONNECT_TIMEOUT).await.is_err());
}

#[tokio::test]
#[ignore]
async fn local_node_is_removed_when_test_panics() {
    let endpoint = Arc::new(Mutex::new(None::<Url>));

    let seen = endpoint.clone();
    let result = AssertUnwindSafe(run_node_test(Config::default(), |url| async move {
        *seen.lock().unwrap() = Some(url);
        panic!("test body failed");
    }))
    .catch_unwind()
    .await;

    let panic = result.unwrap_err();
    assert_eq!(panic.downcast_ref::<&str>(), Some(&"test body failed"));

    let endpoint = endpoint.lock().unwrap().clone().unwrap();
    assert!(Rpc::new(&endpoint, CONNECT_TIMEOUT).await.is_err());
}
