use std::fmt;

use serde::{Deserialize, Serialize};

/// DNS suffix of the public cloud vaults: `https://<vault>.<suffix>`
pub const DEFAULT_VAULT_DNS_SUFFIX: &str = "vault.azure.net";
/// Version of the vault REST API the client speaks
pub const DEFAULT_API_VERSION: &str = "7.4";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// used for serialization
const fn not(b: &bool) -> bool {
    !*b
}

/// Connection settings of the vault REST client.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct VaultClientConfig {
    /// Appended to the vault name to build the vault URL.
    pub vault_dns_suffix: String,
    /// When set, used as is instead of `https://<vault>.<vault_dns_suffix>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_url: Option<String>,
    pub api_version: String,
    /// Bearer token sent in the `Authorization` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Allow to connect using a self-signed cert or untrusted cert chain
    #[serde(skip_serializing_if = "not")]
    pub accept_invalid_certs: bool,
    pub timeout_secs: u64,
}

impl Default for VaultClientConfig {
    fn default() -> Self {
        Self {
            vault_dns_suffix: DEFAULT_VAULT_DNS_SUFFIX.to_owned(),
            vault_url: None,
            api_version: DEFAULT_API_VERSION.to_owned(),
            access_token: None,
            accept_invalid_certs: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for VaultClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultClientConfig")
            .field("vault_dns_suffix", &self.vault_dns_suffix)
            .field("vault_url", &self.vault_url)
            .field("api_version", &self.api_version)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
