use std::{
    env, fs,
    path::{Path, PathBuf},
};

use keyvault_client::VaultClientConfig;
use keyvault_logger::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    cli_ensure,
    error::{
        KeyVaultCliError,
        result::{KeyVaultCliResult, KeyVaultCliResultHelper},
    },
};

pub const KV_CLI_CONF_ENV: &str = "KV_CLI_CONF";
pub(crate) const KV_CLI_CONF_PATH: &str = ".keyvault/kvcli.toml";

/// The configuration of `kvcli`, read from a TOML file:
///
/// ```toml
/// [vault_config]
/// vault_dns_suffix = "vault.azure.net"
/// api_version = "7.4"
/// access_token = "eyJ0eXAiOi..."
/// timeout_secs = 60
/// ```
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
#[serde(default)]
pub struct ClientConf {
    pub vault_config: VaultClientConfig,
}

/// Returns the path to the current user's home folder.
fn get_home_folder() -> Option<PathBuf> {
    if let Some(home) = env::var_os("HOME") {
        return Some(PathBuf::from(home))
    }
    if let Some(profile) = env::var_os("USERPROFILE") {
        return Some(PathBuf::from(profile))
    }
    None
}

impl ClientConf {
    /// The location of the configuration file, from:
    /// - the `--conf` arg
    /// - the `KV_CLI_CONF` environment variable
    /// - `~/.keyvault/kvcli.toml`
    ///
    /// # Errors
    /// if an explicitly given file does not exist
    pub fn location(conf: Option<PathBuf>) -> KeyVaultCliResult<Option<PathBuf>> {
        if let Some(conf_path) = conf {
            cli_ensure!(
                conf_path.exists(),
                KeyVaultCliError::Configuration(format!(
                    "configuration file {} from CLI arg does not exist",
                    conf_path.display()
                ))
            );
            return Ok(Some(conf_path))
        }
        if let Ok(conf_path) = env::var(KV_CLI_CONF_ENV).map(PathBuf::from) {
            cli_ensure!(
                conf_path.exists(),
                KeyVaultCliError::Configuration(format!(
                    "configuration file {} specified in {KV_CLI_CONF_ENV} environment variable \
                     does not exist",
                    conf_path.display()
                ))
            );
            return Ok(Some(conf_path))
        }
        Ok(get_home_folder().map(|home| home.join(KV_CLI_CONF_PATH)))
    }

    /// Load the configuration; a missing default file yields the default configuration.
    ///
    /// # Errors
    /// if the file cannot be read or is not valid TOML
    pub fn load(conf: Option<PathBuf>) -> KeyVaultCliResult<Self> {
        match Self::location(conf)? {
            Some(conf_path) if conf_path.exists() => Self::from_toml(&conf_path),
            _ => {
                info!("no configuration file found, using the default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Read the configuration from a TOML file.
    ///
    /// # Errors
    /// if the file cannot be read or is not valid TOML
    pub fn from_toml(conf_path: &Path) -> KeyVaultCliResult<Self> {
        debug!("Loading configuration from: {}", conf_path.display());
        let content = fs::read_to_string(conf_path).with_context(|| {
            format!("unable to read configuration file {}", conf_path.display())
        })?;
        toml::from_str(&content).map_err(|e| {
            KeyVaultCliError::Configuration(format!(
                "error while parsing configuration file {}: {e}",
                conf_path.display()
            ))
        })
    }
}
