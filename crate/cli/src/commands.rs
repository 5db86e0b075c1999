use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keyvault_client::{VaultClientConfig, VaultRestClient};
use keyvault_logger::{info, log_init, trace};
use url::Url;

use crate::{
    actions::keys::KeysCommands, config::ClientConf, error::result::KeyVaultCliResult,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file location
    ///
    /// This is an alternative to the env variable `KV_CLI_CONF`.
    /// Takes precedence over `KV_CLI_CONF` env variable.
    #[arg(short, long)]
    pub conf: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommands,

    /// The URL of the vault, instead of `https://<vault-name>.<vault_dns_suffix>`
    #[arg(long, env = "KV_VAULT_URL")]
    pub vault_url: Option<String>,

    /// The bearer access token sent to the vault
    #[arg(long, env = "KV_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Allow to connect using a self-signed cert or untrusted cert chain
    #[arg(long)]
    pub accept_invalid_certs: Option<bool>,
}

#[derive(Subcommand)]
pub enum CliCommands {
    /// Create or import vault keys
    #[command(subcommand)]
    Keys(KeysCommands),
}

impl Cli {
    /// The vault client configuration: the configuration file
    /// overridden by the command line arguments.
    ///
    /// # Errors
    /// - the configuration file cannot be loaded
    /// - the vault URL is not a valid URL
    pub fn vault_config(&self) -> KeyVaultCliResult<VaultClientConfig> {
        let mut conf = ClientConf::load(self.conf.clone())?;

        if let Some(url) = &self.vault_url {
            Url::parse(url)?;
            conf.vault_config.vault_url = Some(url.clone());
        }
        if let Some(access_token) = &self.access_token {
            conf.vault_config.access_token = Some(access_token.clone());
        }
        if let Some(accept_invalid_certs) = self.accept_invalid_certs {
            conf.vault_config.accept_invalid_certs = accept_invalid_certs;
        }
        trace!("Configuration: {conf:?}");
        Ok(conf.vault_config)
    }

    /// Run the parsed command against the vault REST API.
    ///
    /// # Errors
    /// if the command parameters or the configuration are invalid, or the command fails
    pub async fn run(&self) -> KeyVaultCliResult<()> {
        match &self.command {
            CliCommands::Keys(keys_commands) => {
                keys_commands
                    .process(|| Ok(VaultRestClient::new(self.vault_config()?)?))
                    .await
            }
        }
    }
}

/// Main function of the `kvcli` application.
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration file cannot be located or loaded.
/// - The command fails.
pub async fn kvcli_main() -> KeyVaultCliResult<()> {
    log_init(None);
    let cli = Cli::parse();
    info!("Starting kvcli");
    cli.run().await
}
