use {
    crate::{DockerError, Error},
    bollard::{
        Docker,
        container::{Config as ContainerConfig, ListContainersOptions, RemoveContainerOptions},
        service::HostConfig,
    },
    serde::Deserialize,
    std::{fmt, time::Duration},
    url::Url,
};

const FOUNDRY_IMAGE: &str = "ghcr.io/foundry-rs/foundry:latest";

fn default_image() -> String {
    FOUNDRY_IMAGE.to_owned()
}

const fn default_chain_id() -> u64 {
    1234
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

/// Anvil's default listening port.
const fn default_port() -> u16 {
    8545
}

const fn default_ready_timeout() -> Duration {
    Duration::from_secs(10)
}

const fn default_poll_interval() -> Duration {
    Duration::from_millis(100)
}

/// Parameters of a dockerized anvil node.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Image that provides the `anvil` binary.
    #[serde(default = "default_image")]
    pub image: String,

    /// Chain ID the node reports and signs transactions for.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Interface anvil binds to inside the container.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port anvil listens on inside the container. The port on the docker
    /// host is allocated dynamically.
    #[serde(default = "default_port")]
    pub port: u16,

    /// How long to wait for the node to answer its first request.
    #[serde(with = "humantime_serde", default = "default_ready_timeout")]
    pub ready_timeout: Duration,

    /// Delay between two readiness probes.
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: default_image(),
            chain_id: default_chain_id(),
            host: default_host(),
            port: default_port(),
            ready_timeout: default_ready_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl Config {
    fn args(&self) -> Vec<String> {
        vec![
            "--host".to_owned(),
            self.host.clone(),
            "--port".to_owned(),
            self.port.to_string(),
            "--chain-id".to_owned(),
            self.chain_id.to_string(),
        ]
    }

    fn exposed_port(&self) -> String {
        format!("{}/tcp", self.port)
    }
}

/// A dockerized blockchain node for testing purposes.
///
/// The default value is a handle that was never started. Stopping it (or
/// stopping a node twice) is a no-op so cleanup code can run unconditionally.
#[derive(Default)]
pub struct Node {
    running: Option<Running>,
}

struct Running {
    docker: Docker,
    container: String,
    url: Url,
    chain_id: u64,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("container", &self.container_id())
            .field("url", &self.url().map(Url::as_str))
            .finish()
    }
}

impl Node {
    /// Spawns a new anvil container and waits until it serves requests.
    ///
    /// The container keeps running until [`Node::stop`] is called.
    pub async fn start(config: &Config) -> Result<Self, Error> {
        let docker = Docker::connect_with_local_defaults().map_err(Error::Provision)?;

        crate::pull_image(&docker, &config.image)
            .await
            .map_err(Error::Provision)?;

        let container = docker
            .create_container::<String, String>(
                None,
                ContainerConfig {
                    image: Some(config.image.clone()),
                    entrypoint: Some(vec!["anvil".to_owned()]),
                    cmd: Some(config.args()),
                    // Expose anvil's listening port so `publish_all_ports` will actually
                    // cause the dynamically allocated host port to show up when listing the
                    // container.
                    exposed_ports: Some([(config.exposed_port(), Default::default())].into()),
                    host_config: Some(HostConfig {
                        publish_all_ports: Some(true),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .map_err(Error::Provision)?
            .id;
        tracing::debug!(%container, image = %config.image, "created node container");

        match Self::launch(&docker, &container, config).await {
            Ok(url) => {
                tracing::info!(%url, chain_id = config.chain_id, "node is running");
                Ok(Self {
                    running: Some(Running {
                        docker,
                        container,
                        url,
                        chain_id: config.chain_id,
                    }),
                })
            }
            Err(err) => {
                if let Err(cleanup) = remove(&docker, &container).await {
                    tracing::warn!(?cleanup, %container, "failed to remove container of broken node");
                }
                Err(err)
            }
        }
    }

    async fn launch(docker: &Docker, container: &str, config: &Config) -> Result<Url, Error> {
        docker
            .start_container::<String>(container, None)
            .await
            .map_err(Error::Provision)?;

        let port = published_port(docker, container, config.port).await?;
        let url = Url::parse(&format!("http://{}:{port}", crate::published_host()))?;
        await_ready(&url, config).await?;

        Ok(url)
    }

    /// Terminates the container and invalidates the endpoint.
    pub async fn stop(&mut self) -> Result<(), Error> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };

        if let Err(err) = remove(&running.docker, &running.container).await {
            // Keep the handle so dropping it makes another attempt.
            self.running = Some(running);
            return Err(Error::Teardown(err));
        }

        tracing::info!(container = %running.container, "node stopped");
        Ok(())
    }

    /// The JSON-RPC endpoint of the running node.
    pub fn url(&self) -> Option<&Url> {
        self.running.as_ref().map(|running| &running.url)
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.running.as_ref().map(|running| running.chain_id)
    }

    pub fn container_id(&self) -> Option<&str> {
        self.running
            .as_ref()
            .map(|running| running.container.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

/// Dropping a running node only schedules the container removal on the
/// current runtime. A runtime that shuts down right after (as the one of a
/// `#[tokio::test]` does) cancels that task and the container is leaked, so
/// callers should [`Node::stop`] explicitly.
impl Drop for Node {
    fn drop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        tracing::warn!(container = %running.container, "node dropped without being stopped");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = remove(&running.docker, &running.container).await {
                        tracing::error!(?err, container = %running.container, "failed to remove node container");
                    }
                });
            }
            Err(_) => {
                tracing::error!(container = %running.container, "no runtime left to remove node container");
            }
        }
    }
}

async fn remove(docker: &Docker, container: &str) -> Result<(), DockerError> {
    docker
        .remove_container(
            container,
            Some(RemoveContainerOptions {
                force: true,
                v: true,
                ..Default::default()
            }),
        )
        .await
}

/// Looks up the host port docker allocated for the container's `port`.
async fn published_port(docker: &Docker, container: &str, port: u16) -> Result<u16, Error> {
    let summary = docker
        .list_containers(Some(ListContainersOptions::<String> {
            filters: [("id".to_owned(), vec![container.to_owned()])].into(),
            ..Default::default()
        }))
        .await
        .map_err(Error::Provision)?;

    summary
        .iter()
        .flat_map(|entry| entry.ports.iter().flatten())
        .find(|binding| binding.private_port == port && binding.public_port.is_some())
        .and_then(|binding| binding.public_port)
        .ok_or_else(|| Error::UnpublishedPort {
            container: container.to_owned(),
            port,
        })
}

/// Waits for the node at `url` to answer, giving up after the configured
/// readiness timeout.
async fn await_ready(url: &Url, config: &Config) -> Result<(), Error> {
    tokio::time::timeout(
        config.ready_timeout,
        wait_until_node_ready(url, config.poll_interval),
    )
    .await
    .map_err(|_| Error::Timeout(config.ready_timeout))
}

/// The node might not be able to handle requests right after being spawned.
/// To not fail tests due to synchronization issues we periodically query
/// the node until it returned the first successful response.
async fn wait_until_node_ready(url: &Url, poll_interval: Duration) {
    let client = reqwest::Client::new();

    let query_node = || {
        client
            .post(url.clone())
            .json(&serde_json::json!({
                "id": 1,
                "jsonrpc": "2.0",
                "method": "web3_clientVersion"
            }))
            .send()
    };

    let start = std::time::Instant::now();

    while !query_node()
        .await
        .is_ok_and(|res| res.status().is_success())
    {
        tokio::time::sleep(poll_interval).await;
    }

    tracing::debug!(start_up = ?start.elapsed(), "node is ready to use");
}
