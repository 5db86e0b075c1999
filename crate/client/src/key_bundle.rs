use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{JsonWebKey, Tags};

/// The key descriptor returned by the vault after a create or an import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBundle {
    pub key: JsonWebKey,
    #[serde(default)]
    pub attributes: KeyBundleAttributes,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
}

impl KeyBundle {
    /// The key identifier assigned by the vault, if any.
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.key.kid.as_deref()
    }
}

/// The key attributes as reported by the vault.
///
/// Dates are unix timestamps (seconds).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyBundleAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_level: Option<String>,
}

impl KeyBundleAttributes {
    #[must_use]
    pub fn not_before(&self) -> Option<OffsetDateTime> {
        self.nbf.and_then(|t| OffsetDateTime::from_unix_timestamp(t).ok())
    }

    #[must_use]
    pub fn expires(&self) -> Option<OffsetDateTime> {
        self.exp.and_then(|t| OffsetDateTime::from_unix_timestamp(t).ok())
    }

    #[must_use]
    pub fn created(&self) -> Option<OffsetDateTime> {
        self.created
            .and_then(|t| OffsetDateTime::from_unix_timestamp(t).ok())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::KeyBundle;
    use crate::KeyType;

    #[test]
    fn deserialize_vault_response() {
        let bundle: KeyBundle = serde_json::from_value(json!({
            "key": {
                "kid": "https://v1.vault.azure.net/keys/k1/78deebed173b48e48f55abf87ed4cf71",
                "kty": "RSA",
                "key_ops": ["encrypt", "decrypt", "sign", "verify", "wrapKey", "unwrapKey"],
                "n": "wwH_",
                "e": "AQAB"
            },
            "attributes": {
                "enabled": true,
                "nbf": 1_700_000_000,
                "created": 1_493_942_451,
                "updated": 1_493_942_451,
                "recoveryLevel": "Recoverable+Purgeable"
            },
            "tags": { "purpose": "unit test" }
        }))
        .unwrap();
        assert_eq!(
            bundle.kid(),
            Some("https://v1.vault.azure.net/keys/k1/78deebed173b48e48f55abf87ed4cf71")
        );
        assert_eq!(bundle.key.kty, KeyType::Rsa);
        assert_eq!(bundle.attributes.enabled, Some(true));
        assert_eq!(
            bundle.attributes.recovery_level.as_deref(),
            Some("Recoverable+Purgeable")
        );
        assert_eq!(
            bundle.attributes.not_before().unwrap().unix_timestamp(),
            1_700_000_000
        );
        assert!(bundle.attributes.expires().is_none());
        assert_eq!(bundle.tags["purpose"], "unit test");
    }
}
