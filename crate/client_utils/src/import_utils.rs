use std::path::Path;

use keyvault_client::JsonWebKey;
use keyvault_logger::debug;

use crate::{
    byok_utils::ByokConverter,
    error::{UtilsError, UtilsResult},
    pkcs12_utils::Pkcs12Converter,
};

/// Decodes one key file format into key material.
pub trait KeyFileConverter: Send + Sync {
    /// A short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Decode `key_file` if it is in the format handled by this converter.
    ///
    /// Returns `Ok(None)` when the file is not in this format, so that the next
    /// converter of the chain is tried. Returns an error when the file is in
    /// this format but cannot be used (malformed content, wrong password).
    ///
    /// # Errors
    /// - [`UtilsError::UnsupportedFormat`] for malformed content
    /// - [`UtilsError::Decryption`] for a wrong or missing password
    fn try_decode(&self, key_file: &Path, password: Option<&str>)
    -> UtilsResult<Option<JsonWebKey>>;
}

/// The key file converters, tried in a fixed priority order.
pub struct KeyFileConverterChain {
    converters: Vec<Box<dyn KeyFileConverter>>,
}

impl Default for KeyFileConverterChain {
    /// BYOK transfer blobs first, then PKCS#12 bundles.
    fn default() -> Self {
        Self::new(vec![Box::new(ByokConverter), Box::new(Pkcs12Converter)])
    }
}

impl KeyFileConverterChain {
    #[must_use]
    pub fn new(converters: Vec<Box<dyn KeyFileConverter>>) -> Self {
        Self { converters }
    }

    /// The names of the converters, in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// Convert `key_file` with the first converter accepting it.
    ///
    /// # Errors
    /// - [`UtilsError::UnsupportedFormat`] when no converter accepts the file
    /// - any error raised by the accepting converter
    pub fn convert(&self, key_file: &Path, password: Option<&str>) -> UtilsResult<JsonWebKey> {
        for converter in &self.converters {
            if let Some(key) = converter.try_decode(key_file, password)? {
                debug!(
                    "key file {} decoded by the {} converter",
                    key_file.display(),
                    converter.name()
                );
                return Ok(key);
            }
        }
        Err(UtilsError::UnsupportedFormat(format!(
            "{}: supported formats are {}",
            key_file.display(),
            self.names().join(", ")
        )))
    }
}

/// Whether the file extension is one of `extensions` (case-insensitive).
pub(crate) fn has_extension(key_file: &Path, extensions: &[&str]) -> bool {
    key_file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
