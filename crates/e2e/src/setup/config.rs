use {
    super::Error,
    serde::Deserialize,
    std::{path::Path, time::Duration},
};

fn default_private_key() -> String {
    ethrpc::TEST_PRIVATE_KEY.to_owned()
}

const fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

const fn default_mining_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Everything needed to bring up a fixture.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// The dockerized node to provision.
    #[serde(default)]
    pub node: docker::node::Config,

    /// Hex encoded key of the account deploying and calling the contract.
    /// Defaults to the well-known first anvil account.
    #[serde(default = "default_private_key")]
    pub private_key: String,

    /// Upper bound for establishing the RPC connection.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Upper bound for a submitted transaction to get mined.
    #[serde(with = "humantime_serde", default = "default_mining_timeout")]
    pub mining_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node: Default::default(),
            private_key: default_private_key(),
            connect_timeout: default_connect_timeout(),
            mining_timeout: default_mining_timeout(),
        }
    }
}

impl Config {
    pub fn from_toml(data: &str) -> Result<Self, Error> {
        Ok(toml::from_str(data)?)
    }

    /// Reads the configuration from a TOML file.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let data = tokio::fs::read_to_string(path).await?;
        Self::from_toml(&data)
    }
}
