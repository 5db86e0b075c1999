use keyvault_client::{KeyBundle, Tags};
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::error::result::KeyVaultCliResult;

pub const KV_CLI_FORMAT: &str = "KV_CLI_FORMAT";
pub const CLI_DEFAULT_FORMAT: &str = "text";
pub const CLI_JSON_FORMAT: &str = "json";

/// A summary of the key returned by the vault.
#[derive(Serialize, Debug, Default, PartialEq, Eq)]
pub struct KeySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    pub key_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
}

fn rfc3339(date: Option<OffsetDateTime>) -> Option<String> {
    date.and_then(|date| date.format(&Rfc3339).ok())
}

impl From<&KeyBundle> for KeySummary {
    fn from(bundle: &KeyBundle) -> Self {
        Self {
            kid: bundle.kid().map(str::to_owned),
            key_type: bundle.key.kty.to_string(),
            enabled: bundle.attributes.enabled,
            not_before: rfc3339(bundle.attributes.not_before()),
            expires: rfc3339(bundle.attributes.expires()),
            created: rfc3339(bundle.attributes.created()),
            key_ops: bundle
                .key
                .key_ops
                .as_ref()
                .map(|ops| ops.iter().map(ToString::to_string).collect()),
        }
    }
}

#[derive(Serialize, Debug, Default)]
pub struct Stdout {
    stdout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<KeySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

impl Stdout {
    #[must_use]
    pub fn new(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_owned(),
            ..Default::default()
        }
    }

    pub fn set_key_bundle(&mut self, bundle: &KeyBundle) {
        self.key = Some(KeySummary::from(bundle));
        self.tags = Some(bundle.tags.clone());
    }

    /// Render the output in the format selected by `KV_CLI_FORMAT`.
    ///
    /// # Errors
    /// if the JSON serialization fails
    pub fn render(&self) -> KeyVaultCliResult<String> {
        let json_format_from_env = std::env::var(KV_CLI_FORMAT)
            .unwrap_or_else(|_| CLI_DEFAULT_FORMAT.to_owned())
            .to_lowercase()
            == CLI_JSON_FORMAT;
        if json_format_from_env {
            return Ok(serde_json::to_string_pretty(&self)?)
        }

        let mut lines = Vec::new();
        if !self.stdout.is_empty() {
            lines.push(self.stdout.clone());
        }
        if let Some(key) = &self.key {
            if let Some(kid) = &key.kid {
                lines.push(format!("\t  Key identifier: {kid}"));
            }
            lines.push(format!("\t  Key type: {}", key.key_type));
            if let Some(enabled) = key.enabled {
                lines.push(format!("\t  Enabled: {enabled}"));
            }
            if let Some(not_before) = &key.not_before {
                lines.push(format!("\t  Not before: {not_before}"));
            }
            if let Some(expires) = &key.expires {
                lines.push(format!("\t  Expires: {expires}"));
            }
            if let Some(created) = &key.created {
                lines.push(format!("\t  Created: {created}"));
            }
            if let Some(key_ops) = &key.key_ops {
                lines.push(format!("\t  Key operations: {}", key_ops.join(", ")));
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.is_empty() {
                lines.push("\n  Tags:".to_owned());
                for (name, value) in tags {
                    lines.push(format!("    - {name}={value}"));
                }
            }
        }
        Ok(lines.join("\n"))
    }

    /// # Errors
    /// if the JSON serialization fails
    #[allow(clippy::print_stdout)]
    pub fn write(&self) -> KeyVaultCliResult<()> {
        println!("{}", self.render()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use keyvault_client::KeyBundle;

    use super::{KeySummary, Stdout};

    fn bundle() -> KeyBundle {
        serde_json::from_value(serde_json::json!({
            "key": {
                "kid": "https://v1.vault.azure.net/keys/k1/0123",
                "kty": "RSA",
                "key_ops": ["sign", "verify"],
                "n": "wwH_",
                "e": "AQAB"
            },
            "attributes": {
                "enabled": true,
                "exp": 1_900_000_000,
                "created": 1_700_000_000
            },
            "tags": {"env": "test"}
        }))
        .unwrap()
    }

    #[test]
    fn summary_of_a_bundle() {
        let summary = KeySummary::from(&bundle());
        assert_eq!(
            summary.kid.as_deref(),
            Some("https://v1.vault.azure.net/keys/k1/0123")
        );
        assert_eq!(summary.key_type, "RSA");
        assert_eq!(summary.enabled, Some(true));
        assert_eq!(summary.expires.as_deref(), Some("2030-03-17T17:46:40Z"));
        assert_eq!(summary.created.as_deref(), Some("2023-11-14T22:13:20Z"));
        assert_eq!(
            summary.key_ops,
            Some(vec!["sign".to_owned(), "verify".to_owned()])
        );
        assert!(summary.not_before.is_none());
    }

    #[test]
    fn text_output() {
        let mut stdout = Stdout::new("The key k1 has been created in the vault v1.");
        stdout.set_key_bundle(&bundle());
        let text = stdout.render().unwrap();
        if text.starts_with('{') {
            // KV_CLI_FORMAT=json in the environment
            return
        }
        assert!(text.contains("Key identifier: https://v1.vault.azure.net/keys/k1/0123"));
        assert!(text.contains("Key type: RSA"));
        assert!(text.contains("- env=test"));
    }
}
