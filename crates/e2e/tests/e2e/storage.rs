use {
    alloy::primitives::{Address, U256, address},
    e2e::setup::{Config, Error, Fixture, deploy, run_test, run_test_with_config},
    ethrpc::{Signer, TEST_PRIVATE_KEY},
};

/// Key of the second account anvil funds on startup.
const SECOND_PRIVATE_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

#[tokio::test]
#[ignore]
async fn local_node_storage_round_trip() {
    run_test(storage_round_trip).await;
}

/// Stores a number under the caller's own address and reads it back.
async fn storage_round_trip(fixture: Fixture) {
    assert_eq!(fixture.rpc.chain_id().await.unwrap(), 1234);

    let user = fixture.signer.address();
    let number = U256::from(1234);
    fixture
        .storage
        .store(&fixture.signer, user, number)
        .await
        .unwrap()
        .mined(fixture.config.mining_timeout)
        .await
        .unwrap();

    assert_eq!(fixture.storage.retrieve(user).await.unwrap(), number);
}

#[tokio::test]
#[ignore]
async fn local_node_writes_are_isolated_by_key() {
    run_test(writes_are_isolated_by_key).await;
}

async fn writes_are_isolated_by_key(fixture: Fixture) {
    let Fixture {
        config,
        signer,
        storage,
        ..
    } = fixture;
    let a = signer.address();
    let b = Address::repeat_byte(0x42);

    storage
        .store(&signer, a, U256::from(1234))
        .await
        .unwrap()
        .mined(config.mining_timeout)
        .await
        .unwrap();
    assert_eq!(storage.retrieve(b).await.unwrap(), U256::ZERO);

    storage
        .store(&signer, b, U256::from(7))
        .await
        .unwrap()
        .mined(config.mining_timeout)
        .await
        .unwrap();
    assert_eq!(storage.retrieve(a).await.unwrap(), U256::from(1234));
    assert_eq!(storage.retrieve(b).await.unwrap(), U256::from(7));
}

#[tokio::test]
#[ignore]
async fn local_node_later_store_supersedes_earlier() {
    run_test(later_store_supersedes_earlier).await;
}

async fn later_store_supersedes_earlier(fixture: Fixture) {
    let key = fixture.signer.address();

    for value in [U256::from(1), U256::MAX, U256::ZERO, U256::from(1234)] {
        let receipt = fixture
            .storage
            .store(&fixture.signer, key, value)
            .await
            .unwrap()
            .mined(fixture.config.mining_timeout)
            .await
            .unwrap();
        assert!(receipt.status());
        assert_eq!(fixture.storage.retrieve(key).await.unwrap(), value);
    }
}

#[tokio::test]
#[ignore]
async fn local_node_rejects_signer_for_other_chain() {
    run_test(rejects_signer_for_other_chain).await;
}

async fn rejects_signer_for_other_chain(fixture: Fixture) {
    let foreign = Signer::new(TEST_PRIVATE_KEY, 1).unwrap();
    let err = deploy(&fixture.rpc, &foreign, fixture.config.mining_timeout)
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::ChainIdMismatch { signer: 1, node: 1234 }),
        "{err:?}"
    );
}

#[tokio::test]
#[ignore]
async fn local_node_custom_chain_id() {
    let mut config = Config::default();
    config.node.chain_id = 1111;
    run_test_with_config(config, |fixture| async move {
        assert_eq!(fixture.signer.chain_id(), 1111);
        assert_eq!(fixture.rpc.chain_id().await.unwrap(), 1111);
        assert_ne!(fixture.storage.address(), Address::ZERO);

        let value = U256::from(42);
        let key = fixture.signer.address();
        fixture
            .storage
            .store(&fixture.signer, key, value)
            .await
            .unwrap()
            .mined(fixture.config.mining_timeout)
            .await
            .unwrap();
        assert_eq!(fixture.storage.retrieve(key).await.unwrap(), value);
    })
    .await;
}

#[tokio::test]
#[ignore]
async fn local_node_store_is_signed_by_given_signer() {
    run_test(store_is_signed_by_given_signer).await;
}

/// Stores from an account other than the one that deployed the contract.
async fn store_is_signed_by_given_signer(fixture: Fixture) {
    let second = Signer::new(SECOND_PRIVATE_KEY, fixture.signer.chain_id()).unwrap();
    assert_eq!(
        second.address(),
        address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
    );

    let key = second.address();
    let receipt = fixture
        .storage
        .store(&second, key, U256::from(99))
        .await
        .unwrap()
        .mined(fixture.config.mining_timeout)
        .await
        .unwrap();
    assert_eq!(receipt.from, second.address());
    assert_eq!(fixture.storage.retrieve(key).await.unwrap(), U256::from(99));
    assert_eq!(
        fixture.storage.retrieve(fixture.signer.address()).await.unwrap(),
        U256::ZERO
    );
}

#[tokio::test]
#[ignore]
async fn local_node_store_rejects_signer_for_other_chain() {
    run_test(store_rejects_signer_for_other_chain).await;
}

async fn store_rejects_signer_for_other_chain(fixture: Fixture) {
    let foreign = Signer::new(SECOND_PRIVATE_KEY, 1).unwrap();
    let err = fixture
        .storage
        .store(&foreign, foreign.address(), U256::from(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Call(_)), "{err:?}");
    assert_eq!(
        fixture.storage.retrieve(foreign.address()).await.unwrap(),
        U256::ZERO
    );
}

#[tokio::test]
#[ignore]
#[should_panic(expected = "test setup failed")]
async fn local_node_malformed_private_key_fails_setup() {
    let config = Config {
        private_key: "0xnot-a-key".to_owned(),
        ..Default::default()
    };
    run_test_with_config(config, |_| async {}).await;
}
