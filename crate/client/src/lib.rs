pub use config::{DEFAULT_API_VERSION, DEFAULT_VAULT_DNS_SUFFIX, VaultClientConfig};
pub use error::{
    ClientError,
    result::{ClientResult, ClientResultHelper},
};
pub use file_utils::read_bytes_from_file;
pub use json_web_key::{JsonWebKey, RsaComponents};
pub use key_attributes::{KeyAttributes, KeyType, KeyUsage};
pub use key_bundle::{KeyBundle, KeyBundleAttributes};
pub use requests::{KeyCreationRequest, Tags};
pub use vault_client::VaultClient;
pub use vault_rest_client::VaultRestClient;

mod config;
mod error;
mod file_utils;
mod json_web_key;
mod key_attributes;
mod key_bundle;
mod requests;
mod vault_client;
mod vault_rest_client;

pub mod reexport {
    pub use time;
    pub use zeroize;
}
