use std::path::PathBuf;

use clap::{
    Parser,
    builder::{OsStringValueParser, TypedValueParser},
};
use keyvault_client::{KeyBundle, KeyCreationRequest, KeyUsage, VaultClient};
use keyvault_client_utils::{
    attributes_utils::{parse_rfc3339, parse_tag, tags_from_pairs},
    create_utils::{Destination, KeyCreationRequestBuilder, KeyOperation, KeyRequestParams},
};
use keyvault_logger::info;
use time::OffsetDateTime;
use zeroize::Zeroizing;

use crate::{actions::console, error::result::KeyVaultCliResult};

/// Create a new RSA key in a vault, or import an existing one.
///
/// Two parameter sets:
///   * create: `--destination` is mandatory, the vault generates the key
///   * import: `--key-file-path` is mandatory, the destination is optional
///     and defaults to the vault's choice.
///
/// Supported key files:
///   * .byok: a BYOK transfer blob, imported in an HSM
///   * .pfx, .p12: a PKCS#12 bundle holding an RSA private key,
///     decrypted with `--key-file-password`
///
/// Tags are optional `NAME=VALUE` pairs attached to the key.
#[derive(Parser, Debug)]
#[clap(verbatim_doc_comment)]
pub struct AddKeyAction {
    /// The name of the vault
    #[clap(long, required = true)]
    pub(crate) vault_name: String,

    /// The name of the key in the vault
    #[clap(long = "name", short = 'n', required = true)]
    pub(crate) key_name: String,

    /// Where the vault stores the key.
    /// Mandatory when creating a key.
    #[clap(long, short = 'd', value_enum)]
    pub(crate) destination: Option<Destination>,

    /// The key file to import. When absent, a new key is created.
    #[clap(
        long,
        short = 'f',
        value_parser = OsStringValueParser::new().map(PathBuf::from)
    )]
    pub(crate) key_file_path: Option<PathBuf>,

    /// The password protecting the key file, if its format requires one
    #[clap(long, env = "KV_KEY_FILE_PASSWORD", hide_env_values = true)]
    pub(crate) key_file_password: Option<String>,

    /// Create the key disabled
    #[clap(long = "disable", default_value = "false")]
    pub(crate) disabled: bool,

    /// Expiration date of the key, RFC 3339 (e.g. `2030-01-31T12:00:00Z`)
    #[clap(long, value_parser = parse_rfc3339)]
    pub(crate) expires: Option<OffsetDateTime>,

    /// Activation date of the key, RFC 3339
    #[clap(long, value_parser = parse_rfc3339)]
    pub(crate) not_before: Option<OffsetDateTime>,

    /// The cryptographic operations the key is allowed to perform:
    /// encrypt, decrypt, sign, verify, wrapKey, unwrapKey, import, export
    #[clap(long, num_args = 1..)]
    pub(crate) key_ops: Option<Vec<KeyUsage>>,

    /// A tag to attach to the key, `NAME=VALUE`.
    /// To specify multiple tags, use the option multiple times.
    #[clap(long = "tag", short = 't', value_name = "NAME=VALUE", value_parser = parse_tag)]
    pub(crate) tags: Vec<(String, String)>,
}

impl AddKeyAction {
    /// Select the mode once: a non-empty key file path means import.
    #[must_use]
    pub fn key_operation(&self) -> KeyOperation {
        KeyOperation::select(
            self.key_file_path.clone(),
            self.key_file_password.clone().map(Zeroizing::new),
            self.destination,
        )
    }

    fn request_params(&self) -> KeyRequestParams {
        KeyRequestParams {
            vault_name: self.vault_name.clone(),
            key_name: self.key_name.clone(),
            disabled: self.disabled,
            not_before: self.not_before,
            expires: self.expires,
            key_ops: self.key_ops.clone(),
            tags: tags_from_pairs(&self.tags),
        }
    }

    /// Validate the parameters and build the request, without contacting the vault.
    ///
    /// # Errors
    /// see [`KeyCreationRequestBuilder::build`]
    pub fn build_request(&self) -> KeyVaultCliResult<KeyCreationRequest> {
        Ok(KeyCreationRequestBuilder::default()
            .build(self.request_params(), &self.key_operation())?)
    }

    /// Send a request built by [`Self::build_request`] and print the key returned by the vault.
    ///
    /// # Errors
    /// if the vault rejects the request or the result cannot be printed
    pub async fn send(
        &self,
        request: KeyCreationRequest,
        vault_client: &impl VaultClient,
    ) -> KeyVaultCliResult<KeyBundle> {
        let import = request.is_import();
        info!(
            "{} key {} in vault {}",
            if import { "importing" } else { "creating" },
            request.key_name(),
            request.vault_name()
        );

        let key_bundle = vault_client.create_or_import(request).await?;

        let verb = if import { "imported into" } else { "created in" };
        let mut stdout = console::Stdout::new(&format!(
            "The key {} has been {verb} the vault {}.",
            self.key_name, self.vault_name
        ));
        stdout.set_key_bundle(&key_bundle);
        stdout.write()?;

        Ok(key_bundle)
    }

    /// Create or import the key and print the key returned by the vault.
    ///
    /// # Errors
    /// - the parameters are invalid
    /// - the key file is missing, cannot be decoded or decrypted
    /// - the vault rejects the request
    pub async fn run(&self, vault_client: &impl VaultClient) -> KeyVaultCliResult<KeyBundle> {
        let request = self.build_request()?;
        self.send(request, vault_client).await
    }
}
