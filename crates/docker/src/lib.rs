//! Dockerized services that tests can spin up on demand and tear down again
//! once they are done.
pub mod node;

pub use node::Node;
use {
    bollard::{Docker, errors::Error as DockerError, image::CreateImageOptions},
    futures::TryStreamExt,
    std::time::Duration,
    url::Url,
};

/// Host the published container ports are reachable on when the docker
/// daemon runs locally.
const LOCALHOST: &str = "127.0.0.1";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to provision container: {0}")]
    Provision(#[source] DockerError),
    #[error("container {container} does not publish port {port}")]
    UnpublishedPort { container: String, port: u16 },
    #[error("invalid node endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("node did not become ready within {0:?}")]
    Timeout(Duration),
    #[error("failed to terminate container: {0}")]
    Teardown(#[source] DockerError),
}

/// Pulls `image` unless it is already available locally.
pub async fn pull_image(docker: &Docker, image: &str) -> Result<(), DockerError> {
    if docker.inspect_image(image).await.is_ok() {
        tracing::debug!(image, "image already present");
        return Ok(());
    }

    tracing::info!(image, "pulling image");
    docker
        .create_image(
            Some(CreateImageOptions {
                from_image: image,
                ..Default::default()
            }),
            None,
            None,
        )
        .try_collect::<Vec<_>>()
        .await?;
    Ok(())
}

/// Returns the host on which published container ports can be reached.
///
/// A daemon reached over TCP (`DOCKER_HOST=tcp://10.0.0.5:2375`) publishes
/// ports on that machine, for everything else (unix sockets, named pipes)
/// the ports are bound on the local machine.
pub fn published_host() -> String {
    resolve_host(std::env::var("DOCKER_HOST").ok().as_deref())
}

fn resolve_host(docker_host: Option<&str>) -> String {
    docker_host
        .and_then(|host| Url::parse(host).ok())
        .filter(|url| matches!(url.scheme(), "tcp" | "http" | "https"))
        .and_then(|url| url.host_str().map(str::to_owned))
        .unwrap_or_else(|| LOCALHOST.to_owned())
}
