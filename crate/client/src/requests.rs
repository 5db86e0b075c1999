use std::collections::BTreeMap;

use serde::Serialize;

use crate::{JsonWebKey, KeyAttributes, KeyType, KeyUsage};

/// Free-form `name = value` pairs attached to a key.
pub type Tags = BTreeMap<String, String>;

/// A create or import request, ready to be sent to a vault.
///
/// The request is built once and never mutated afterwards:
/// its fields are only reachable through getters.
#[derive(Debug, Clone)]
pub struct KeyCreationRequest {
    vault_name: String,
    key_name: String,
    attributes: KeyAttributes,
    tags: Tags,
    material: Option<JsonWebKey>,
    hsm: Option<bool>,
}

impl KeyCreationRequest {
    /// A request asking the vault to generate a new key.
    #[must_use]
    pub fn create(
        vault_name: String,
        key_name: String,
        attributes: KeyAttributes,
        tags: Tags,
    ) -> Self {
        Self {
            vault_name,
            key_name,
            attributes,
            tags,
            material: None,
            hsm: None,
        }
    }

    /// A request uploading existing key material.
    ///
    /// `hsm` set to `None` lets the vault decide where the key is stored.
    #[must_use]
    pub fn import(
        vault_name: String,
        key_name: String,
        attributes: KeyAttributes,
        tags: Tags,
        material: JsonWebKey,
        hsm: Option<bool>,
    ) -> Self {
        Self {
            vault_name,
            key_name,
            attributes,
            tags,
            material: Some(material),
            hsm,
        }
    }

    #[must_use]
    pub fn vault_name(&self) -> &str {
        &self.vault_name
    }

    #[must_use]
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    #[must_use]
    pub const fn attributes(&self) -> &KeyAttributes {
        &self.attributes
    }

    #[must_use]
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    #[must_use]
    pub const fn material(&self) -> Option<&JsonWebKey> {
        self.material.as_ref()
    }

    #[must_use]
    pub const fn hsm(&self) -> Option<bool> {
        self.hsm
    }

    #[must_use]
    pub const fn is_import(&self) -> bool {
        self.material.is_some()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_tags(tags: &&Tags) -> bool {
    tags.is_empty()
}

/// The `attributes` member of the create and import bodies.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub(crate) struct AttributesBody {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    nbf: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

impl From<&KeyAttributes> for AttributesBody {
    fn from(attributes: &KeyAttributes) -> Self {
        Self {
            enabled: attributes.enabled,
            nbf: attributes.not_before.map(|t| t.unix_timestamp()),
            exp: attributes.expires.map(|t| t.unix_timestamp()),
        }
    }
}

/// Body of `POST /keys/{name}/create`
#[derive(Serialize, Debug)]
pub(crate) struct CreateKeyBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) kty: Option<KeyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) key_ops: Option<&'a [KeyUsage]>,
    pub(crate) attributes: AttributesBody,
    #[serde(skip_serializing_if = "no_tags")]
    pub(crate) tags: &'a Tags,
}

impl<'a> CreateKeyBody<'a> {
    pub(crate) fn new(attributes: &'a KeyAttributes, tags: &'a Tags) -> Self {
        Self {
            kty: attributes.key_type,
            key_ops: attributes.key_ops.as_deref(),
            attributes: AttributesBody::from(attributes),
            tags,
        }
    }
}

/// Body of `PUT /keys/{name}`
#[derive(Serialize, Debug)]
pub(crate) struct ImportKeyBody<'a> {
    pub(crate) key: &'a JsonWebKey,
    #[serde(rename = "Hsm", skip_serializing_if = "Option::is_none")]
    pub(crate) hsm: Option<bool>,
    pub(crate) attributes: AttributesBody,
    #[serde(skip_serializing_if = "no_tags")]
    pub(crate) tags: &'a Tags,
}

impl<'a> ImportKeyBody<'a> {
    pub(crate) fn new(
        key: &'a JsonWebKey,
        hsm: Option<bool>,
        attributes: &'a KeyAttributes,
        tags: &'a Tags,
    ) -> Self {
        Self {
            key,
            hsm,
            attributes: AttributesBody::from(attributes),
            tags,
        }
    }
}
