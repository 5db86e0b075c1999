use keyvault_client::{KeyType, Tags};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{create_utils::Destination, error::UtilsError};

/// Where a key is stored, derived once from the caller's destination.
///
/// `key_type` and `hsm` always agree: both come from the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoragePolicy {
    pub key_type: Option<KeyType>,
    pub hsm: Option<bool>,
}

impl From<Option<Destination>> for StoragePolicy {
    fn from(destination: Option<Destination>) -> Self {
        match destination {
            Some(Destination::Hsm) => Self {
                key_type: Some(KeyType::RsaHsm),
                hsm: Some(true),
            },
            Some(Destination::Software) => Self {
                key_type: Some(KeyType::Rsa),
                hsm: Some(false),
            },
            None => Self::default(),
        }
    }
}

/// Parse an RFC 3339 date such as `2030-01-31T12:00:00Z`.
///
/// # Errors
/// if the string is not a valid RFC 3339 date
pub fn parse_rfc3339(date: &str) -> Result<OffsetDateTime, UtilsError> {
    OffsetDateTime::parse(date.trim(), &Rfc3339)
        .map_err(|e| UtilsError::Validation(format!("invalid RFC 3339 date {date:?}: {e}")))
}

/// Parse a `name=value` tag.
///
/// # Errors
/// if the `=` separator is missing or the name is empty
pub fn parse_tag(tag: &str) -> Result<(String, String), UtilsError> {
    let (name, value) = tag.split_once('=').ok_or_else(|| {
        UtilsError::Validation(format!("invalid tag {tag:?}: expected NAME=VALUE"))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(UtilsError::Validation(format!(
            "invalid tag {tag:?}: the name is empty"
        )));
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}

/// Collect parsed tags; the last value wins for a repeated name.
#[must_use]
pub fn tags_from_pairs(pairs: &[(String, String)]) -> Tags {
    pairs.iter().cloned().collect()
}
