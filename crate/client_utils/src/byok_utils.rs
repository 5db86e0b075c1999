use std::path::Path;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use keyvault_client::{JsonWebKey, read_bytes_from_file};
use keyvault_logger::debug;
use serde::Deserialize;

use crate::{
    error::{UtilsError, UtilsResult},
    import_utils::{KeyFileConverter, has_extension},
};

/// A `.byok` transfer file, as produced by the HSM vendor tools:
///
/// ```json
/// {
///   "schema_version": "1.0.0",
///   "header": { "kid": "<KEK id>", "alg": "dir", "enc": "CKM_RSA_AES_KEY_WRAP" },
///   "ciphertext": "<base64url wrapped key>",
///   "generator": "<tool name>"
/// }
/// ```
#[derive(Deserialize, Debug)]
struct ByokFile {
    #[serde(default)]
    schema_version: Option<String>,
    header: ByokHeader,
    ciphertext: String,
    #[serde(default)]
    generator: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ByokHeader {
    kid: String,
    alg: String,
    enc: String,
}

/// Converts `.byok` files: the whole file is sent to the vault as the HSM
/// transfer blob of an `RSA-HSM` key.
pub struct ByokConverter;

impl ByokConverter {
    const EXTENSIONS: [&'static str; 1] = ["byok"];

    fn validate(key_file: &Path, bytes: &[u8]) -> UtilsResult<()> {
        let invalid = |reason: String| {
            UtilsError::UnsupportedFormat(format!(
                "{} is not a valid BYOK file: {reason}",
                key_file.display()
            ))
        };
        let byok: ByokFile = serde_json::from_slice(bytes).map_err(|e| invalid(e.to_string()))?;
        if byok.header.kid.is_empty() {
            return Err(invalid("the key encryption key id (kid) is empty".to_owned()));
        }
        let ciphertext = URL_SAFE_NO_PAD
            .decode(byok.ciphertext.trim_end_matches('='))
            .map_err(|e| invalid(format!("the ciphertext is not base64url: {e}")))?;
        if ciphertext.is_empty() {
            return Err(invalid("the ciphertext is empty".to_owned()));
        }
        debug!(
            "BYOK file: schema {:?}, kek {}, alg {}, enc {}, generator {:?}, {} wrapped bytes",
            byok.schema_version,
            byok.header.kid,
            byok.header.alg,
            byok.header.enc,
            byok.generator,
            ciphertext.len()
        );
        Ok(())
    }
}

impl KeyFileConverter for ByokConverter {
    fn name(&self) -> &'static str {
        "BYOK"
    }

    fn try_decode(
        &self,
        key_file: &Path,
        password: Option<&str>,
    ) -> UtilsResult<Option<JsonWebKey>> {
        if !has_extension(key_file, &Self::EXTENSIONS) {
            return Ok(None);
        }
        if password.is_some() {
            debug!("BYOK files are not password protected: the password is ignored");
        }
        let bytes = read_bytes_from_file(&key_file)?;
        Self::validate(key_file, &bytes)?;
        Ok(Some(JsonWebKey::from_byok_blob(&bytes)))
    }
}
