use async_trait::async_trait;

use crate::{ClientResult, JsonWebKey, KeyAttributes, KeyBundle, KeyCreationRequest, Tags};

/// The operations of a key vault used to add keys.
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// Ask the vault to generate a new key named `key_name`.
    async fn create_key(
        &self,
        vault_name: &str,
        key_name: &str,
        attributes: &KeyAttributes,
        tags: &Tags,
    ) -> ClientResult<KeyBundle>;

    /// Upload existing key material under `key_name`.
    ///
    /// With `hsm` set to `None`, the vault decides where the key is stored.
    async fn import_key(
        &self,
        vault_name: &str,
        key_name: &str,
        attributes: &KeyAttributes,
        tags: &Tags,
        material: &JsonWebKey,
        hsm: Option<bool>,
    ) -> ClientResult<KeyBundle>;

    /// Send a request built for either mode.
    ///
    /// Errors raised by the vault are returned unchanged.
    async fn create_or_import(&self, request: KeyCreationRequest) -> ClientResult<KeyBundle> {
        match request.material() {
            Some(material) => {
                self.import_key(
                    request.vault_name(),
                    request.key_name(),
                    request.attributes(),
                    request.tags(),
                    material,
                    request.hsm(),
                )
                .await
            }
            None => {
                self.create_key(
                    request.vault_name(),
                    request.key_name(),
                    request.attributes(),
                    request.tags(),
                )
                .await
            }
        }
    }
}
