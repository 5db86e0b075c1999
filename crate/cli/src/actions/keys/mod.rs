mod add_key;

pub use add_key::AddKeyAction;
use clap::Subcommand;
use keyvault_client::VaultClient;

use crate::error::result::KeyVaultCliResult;

/// Manage the keys of a vault.
#[derive(Subcommand)]
pub enum KeysCommands {
    Add(AddKeyAction),
}

impl KeysCommands {
    /// Process the keys command.
    ///
    /// The parameters are validated before `connect` is called,
    /// so a bad invocation never reads the configuration.
    ///
    /// # Errors
    /// if the underlying action fails or the vault client cannot be built
    pub async fn process<C, F>(&self, connect: F) -> KeyVaultCliResult<()>
    where
        C: VaultClient,
        F: FnOnce() -> KeyVaultCliResult<C>,
    {
        match self {
            Self::Add(action) => {
                let request = action.build_request()?;
                let vault_client = connect()?;
                action.send(request, &vault_client).await?;
            }
        }
        Ok(())
    }
}
