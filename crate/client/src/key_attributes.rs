use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use time::OffsetDateTime;

/// The type of a vault key.
///
/// The `-HSM` variant asks the vault to protect the key in a hardware security module.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum KeyType {
    #[serde(rename = "RSA")]
    #[strum(serialize = "RSA")]
    Rsa,
    #[serde(rename = "RSA-HSM")]
    #[strum(serialize = "RSA-HSM")]
    RsaHsm,
}

impl KeyType {
    #[must_use]
    pub const fn is_hsm(self) -> bool {
        matches!(self, Self::RsaHsm)
    }
}

/// The cryptographic operations a key is allowed to perform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    WrapKey,
    UnwrapKey,
    Import,
    Export,
}

/// The policy attached to a key when it is created or imported.
///
/// `key_type` stays `None` unless the caller chose a destination:
/// the vault then picks its default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyAttributes {
    pub enabled: bool,
    pub not_before: Option<OffsetDateTime>,
    pub expires: Option<OffsetDateTime>,
    pub key_type: Option<KeyType>,
    pub key_ops: Option<Vec<KeyUsage>>,
}

impl KeyAttributes {
    /// Whether the validity window is consistent, i.e. `not_before` is not after `expires`.
    #[must_use]
    pub fn has_valid_window(&self) -> bool {
        match (self.not_before, self.expires) {
            (Some(not_before), Some(expires)) => not_before <= expires,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;
    use time::{Duration, OffsetDateTime};

    use super::{KeyAttributes, KeyType, KeyUsage};

    #[test]
    fn key_usage_wire_names() {
        assert_eq!(
            serde_json::to_string(&KeyUsage::WrapKey).unwrap(),
            "\"wrapKey\""
        );
        assert_eq!(KeyUsage::from_str("unwrapkey").unwrap(), KeyUsage::UnwrapKey);
        assert_eq!(KeyUsage::from_str("sign").unwrap(), KeyUsage::Sign);
        assert_eq!(KeyUsage::from_str("import").unwrap(), KeyUsage::Import);
        assert_eq!(
            serde_json::from_str::<KeyUsage>("\"export\"").unwrap(),
            KeyUsage::Export
        );
        assert!(KeyUsage::from_str("derive").is_err());
        for usage in KeyUsage::iter() {
            assert_eq!(KeyUsage::from_str(&usage.to_string()).unwrap(), usage);
        }
    }

    #[test]
    fn key_type_wire_names() {
        assert_eq!(serde_json::to_string(&KeyType::RsaHsm).unwrap(), "\"RSA-HSM\"");
        assert_eq!(KeyType::Rsa.to_string(), "RSA");
        assert!(KeyType::RsaHsm.is_hsm());
        assert!(!KeyType::Rsa.is_hsm());
    }

    #[test]
    fn validity_window() {
        let now = OffsetDateTime::now_utc();
        let mut attributes = KeyAttributes {
            enabled: true,
            not_before: Some(now),
            expires: Some(now + Duration::days(1)),
            ..Default::default()
        };
        assert!(attributes.has_valid_window());
        attributes.expires = Some(now - Duration::days(1));
        assert!(!attributes.has_valid_window());
        attributes.not_before = None;
        assert!(attributes.has_valid_window());
    }
}
