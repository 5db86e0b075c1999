use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{KeyType, KeyUsage};

/// A JSON Web Key (RFC 7517) as exchanged with the vault.
///
/// An imported key carries either the RSA components (`n`, `e` and the private
/// CRT components) or, for a BYOK transfer blob, the opaque `key_hsm` bytes.
/// Byte fields are base64url encoded without padding on the wire.
/// Private components are zeroized when the key is dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct JsonWebKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub kid: Option<String>,
    #[zeroize(skip)]
    pub kty: KeyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub key_ops: Option<Vec<KeyUsage>>,
    #[serde(default, with = "base64url", skip_serializing_if = "Option::is_none")]
    pub n: Option<Vec<u8>>,
    #[serde(default, with = "base64url", skip_serializing_if = "Option::is_none")]
    pub e: Option<Vec<u8>>,
    #[serde(default, with = "base64url", skip_serializing_if = "Option::is_none")]
    pub d: Option<Vec<u8>>,
    #[serde(default, with = "base64url", skip_serializing_if = "Option::is_none")]
    pub p: Option<Vec<u8>>,
    #[serde(default, with = "base64url", skip_serializing_if = "Option::is_none")]
    pub q: Option<Vec<u8>>,
    #[serde(default, with = "base64url", skip_serializing_if = "Option::is_none")]
    pub dp: Option<Vec<u8>>,
    #[serde(default, with = "base64url", skip_serializing_if = "Option::is_none")]
    pub dq: Option<Vec<u8>>,
    #[serde(default, with = "base64url", skip_serializing_if = "Option::is_none")]
    pub qi: Option<Vec<u8>>,
    /// The BYOK transfer blob
    #[serde(
        rename = "key_hsm",
        default,
        with = "base64url",
        skip_serializing_if = "Option::is_none"
    )]
    pub t: Option<Vec<u8>>,
}

/// The RSA components of a key pair, big-endian encoded.
pub struct RsaComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
    pub d: Vec<u8>,
    pub p: Vec<u8>,
    pub q: Vec<u8>,
    pub dp: Vec<u8>,
    pub dq: Vec<u8>,
    pub qi: Vec<u8>,
}

impl Drop for RsaComponents {
    fn drop(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qi.zeroize();
    }
}

impl JsonWebKey {
    /// Build a software RSA key from its components.
    #[must_use]
    pub fn from_rsa_components(components: &RsaComponents) -> Self {
        Self {
            kid: None,
            kty: KeyType::Rsa,
            key_ops: None,
            n: Some(components.n.clone()),
            e: Some(components.e.clone()),
            d: Some(components.d.clone()),
            p: Some(components.p.clone()),
            q: Some(components.q.clone()),
            dp: Some(components.dp.clone()),
            dq: Some(components.dq.clone()),
            qi: Some(components.qi.clone()),
            t: None,
        }
    }

    /// Build an HSM key from a BYOK transfer blob.
    #[must_use]
    pub fn from_byok_blob(blob: &[u8]) -> Self {
        Self {
            kid: None,
            kty: KeyType::RsaHsm,
            key_ops: None,
            n: None,
            e: None,
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
            t: Some(blob.to_vec()),
        }
    }

    #[must_use]
    pub const fn has_private_material(&self) -> bool {
        self.d.is_some() || self.t.is_some()
    }
}

// never print private components
impl fmt::Debug for JsonWebKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWebKey")
            .field("kid", &self.kid)
            .field("kty", &self.kty)
            .field("key_ops", &self.key_ops)
            .field("n_len", &self.n.as_ref().map(Vec::len))
            .field("e", &self.e)
            .field("has_private_material", &self.has_private_material())
            .finish()
    }
}

mod base64url {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&URL_SAFE_NO_PAD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| {
                URL_SAFE_NO_PAD
                    .decode(s.trim_end_matches('='))
                    .map_err(D::Error::custom)
            })
            .transpose()
    }
}
