use std::path::{Path, PathBuf};

use clap::ValueEnum;
use keyvault_client::{KeyAttributes, KeyCreationRequest, KeyUsage, Tags};
use keyvault_logger::{debug, info};
use strum::{Display, EnumString};
use time::OffsetDateTime;
use zeroize::Zeroizing;

use crate::{
    attributes_utils::StoragePolicy,
    error::{UtilsError, UtilsResult},
    import_utils::KeyFileConverterChain,
};

/// Where the vault stores the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum Destination {
    /// Hardware security module protected key (`RSA-HSM`)
    Hsm,
    /// Software protected key (`RSA`)
    Software,
}

/// The two mutually exclusive ways of adding a key.
///
/// The mode is selected once, when the caller's parameters are parsed;
/// the request builder never looks at which optional field is set.
#[derive(Debug, Clone)]
pub enum KeyOperation {
    /// Generate a new key inside the vault. The destination is mandatory.
    Create { destination: Option<Destination> },
    /// Upload the key material held in a local file.
    /// Without a destination, the vault picks the storage.
    Import {
        key_file: PathBuf,
        password: Option<Zeroizing<String>>,
        destination: Option<Destination>,
    },
}

impl KeyOperation {
    /// Select the mode from the caller's parameters:
    /// a non-empty key file path selects [`KeyOperation::Import`].
    #[must_use]
    pub fn select(
        key_file: Option<PathBuf>,
        password: Option<Zeroizing<String>>,
        destination: Option<Destination>,
    ) -> Self {
        match key_file {
            Some(key_file) if !key_file.as_os_str().is_empty() => Self::Import {
                key_file,
                password,
                destination,
            },
            _ => Self::Create { destination },
        }
    }

    #[must_use]
    pub const fn destination(&self) -> Option<Destination> {
        match self {
            Self::Create { destination } | Self::Import { destination, .. } => *destination,
        }
    }

    #[must_use]
    pub const fn is_import(&self) -> bool {
        matches!(self, Self::Import { .. })
    }
}

/// The parameters shared by both modes.
#[derive(Debug, Clone, Default)]
pub struct KeyRequestParams {
    pub vault_name: String,
    pub key_name: String,
    /// The key is created disabled
    pub disabled: bool,
    pub not_before: Option<OffsetDateTime>,
    pub expires: Option<OffsetDateTime>,
    pub key_ops: Option<Vec<KeyUsage>>,
    pub tags: Tags,
}

/// Validates the caller's parameters and builds the [`KeyCreationRequest`]
/// sent to the vault.
#[derive(Default)]
pub struct KeyCreationRequestBuilder {
    converters: KeyFileConverterChain,
}

impl KeyCreationRequestBuilder {
    #[must_use]
    pub const fn new(converters: KeyFileConverterChain) -> Self {
        Self { converters }
    }

    /// Build the request for `operation`.
    ///
    /// Validation happens before any file system access.
    ///
    /// # Errors
    /// - [`UtilsError::Validation`]: empty vault or key name, no destination
    ///   when creating a key, `not_before` after `expires`
    /// - [`UtilsError::FileNotFound`]: the key file to import does not exist
    /// - [`UtilsError::UnsupportedFormat`], [`UtilsError::Decryption`]:
    ///   the key file cannot be converted
    pub fn build(
        &self,
        params: KeyRequestParams,
        operation: &KeyOperation,
    ) -> UtilsResult<KeyCreationRequest> {
        validate(&params, operation)?;

        let policy = StoragePolicy::from(operation.destination());
        let attributes = KeyAttributes {
            enabled: !params.disabled,
            not_before: params.not_before,
            expires: params.expires,
            key_type: policy.key_type,
            key_ops: params.key_ops,
        };
        if !attributes.has_valid_window() {
            return Err(UtilsError::Validation(format!(
                "the key cannot become valid ({:?}) after it expires ({:?})",
                attributes.not_before, attributes.expires
            )));
        }

        match operation {
            KeyOperation::Create { .. } => {
                debug!(
                    "create request: vault {}, key {}, {attributes:?}",
                    params.vault_name, params.key_name
                );
                Ok(KeyCreationRequest::create(
                    params.vault_name,
                    params.key_name,
                    attributes,
                    params.tags,
                ))
            }
            KeyOperation::Import {
                key_file, password, ..
            } => {
                let key_file = resolve_key_file(key_file)?;
                let mut material = self.converters.convert(
                    &key_file,
                    password.as_ref().map(|password| password.as_str()),
                )?;
                material.key_ops.clone_from(&attributes.key_ops);
                info!(
                    "importing {} into vault {} as {} (hsm: {:?})",
                    key_file.display(),
                    params.vault_name,
                    params.key_name,
                    policy.hsm
                );
                Ok(KeyCreationRequest::import(
                    params.vault_name,
                    params.key_name,
                    attributes,
                    params.tags,
                    material,
                    policy.hsm,
                ))
            }
        }
    }
}

fn validate(params: &KeyRequestParams, operation: &KeyOperation) -> UtilsResult<()> {
    if params.vault_name.trim().is_empty() {
        return Err(UtilsError::Validation(
            "the vault name must not be empty".to_owned(),
        ));
    }
    if params.key_name.trim().is_empty() {
        return Err(UtilsError::Validation(
            "the key name must not be empty".to_owned(),
        ));
    }
    if let KeyOperation::Create { destination: None } = operation {
        return Err(UtilsError::Validation(
            "destination required: choose `hsm` or `software` when creating a key".to_owned(),
        ));
    }
    Ok(())
}

/// Resolve the key file against the current directory and check it exists.
fn resolve_key_file(key_file: &Path) -> UtilsResult<PathBuf> {
    let resolved = std::path::absolute(key_file).map_err(|e| {
        UtilsError::FileNotFound(format!("{}: {e}", key_file.display()))
    })?;
    if !resolved.is_file() {
        return Err(UtilsError::FileNotFound(resolved.display().to_string()));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::{Path, PathBuf},
        sync::{Arc, Mutex},
    };

    use keyvault_client::{JsonWebKey, KeyType, KeyUsage, RsaComponents, Tags};
    use tempfile::TempDir;
    use time::{Duration, OffsetDateTime};
    use zeroize::Zeroizing;

    use super::{
        Destination, KeyCreationRequestBuilder, KeyOperation, KeyRequestParams, resolve_key_file,
    };
    use crate::{
        error::{UtilsError, UtilsResult},
        import_utils::{KeyFileConverter, KeyFileConverterChain},
        pkcs12_utils::tests::write_rsa_pkcs12,
    };

    type Calls = Arc<Mutex<Vec<(PathBuf, Option<String>)>>>;

    /// Accepts any file and records the file and password it was given
    struct RecordingConverter {
        calls: Calls,
    }

    impl KeyFileConverter for RecordingConverter {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn try_decode(
            &self,
            key_file: &Path,
            password: Option<&str>,
        ) -> UtilsResult<Option<JsonWebKey>> {
            self.calls
                .lock()
                .unwrap()
                .push((key_file.to_path_buf(), password.map(str::to_owned)));
            Ok(Some(JsonWebKey::from_rsa_components(&RsaComponents {
                n: vec![1],
                e: vec![1, 0, 1],
                d: vec![2],
                p: vec![3],
                q: vec![4],
                dp: vec![5],
                dq: vec![6],
                qi: vec![7],
            })))
        }
    }

    fn recording_builder() -> (KeyCreationRequestBuilder, Calls) {
        let calls = Calls::default();
        let builder = KeyCreationRequestBuilder::new(KeyFileConverterChain::new(vec![Box::new(
            RecordingConverter {
                calls: calls.clone(),
            },
        )]));
        (builder, calls)
    }

    fn params(vault_name: &str, key_name: &str) -> KeyRequestParams {
        KeyRequestParams {
            vault_name: vault_name.to_owned(),
            key_name: key_name.to_owned(),
            ..Default::default()
        }
    }

    fn key_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"key material").unwrap();
        path
    }

    #[test]
    fn mode_selection() {
        assert!(!KeyOperation::select(None, None, None).is_import());
        assert!(!KeyOperation::select(Some(PathBuf::new()), None, None).is_import());
        assert!(
            !KeyOperation::select(Some(PathBuf::from("")), None, Some(Destination::Hsm))
                .is_import()
        );
        assert!(KeyOperation::select(Some(PathBuf::from("key.pfx")), None, None).is_import());
        assert!(KeyOperation::select(Some(PathBuf::from(" ")), None, None).is_import());
        assert_eq!(
            KeyOperation::select(Some(PathBuf::from("k.byok")), None, Some(Destination::Hsm))
                .destination(),
            Some(Destination::Hsm)
        );
    }

    #[test]
    fn create_requires_a_destination() {
        let (builder, calls) = recording_builder();
        let err = builder
            .build(
                params("v1", "k1"),
                &KeyOperation::Create { destination: None },
            )
            .unwrap_err();
        assert!(matches!(err, UtilsError::Validation(_)));
        assert!(err.to_string().contains("destination required"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn names_must_not_be_empty() {
        let (builder, _) = recording_builder();
        let create = KeyOperation::Create {
            destination: Some(Destination::Software),
        };
        for (vault, key) in [("", "k1"), ("v1", ""), ("  ", "k1")] {
            let err = builder.build(params(vault, key), &create).unwrap_err();
            assert!(matches!(err, UtilsError::Validation(_)), "{vault:?} {key:?}");
        }
    }

    #[test]
    fn key_type_follows_the_destination() {
        let (builder, _) = recording_builder();
        for (destination, key_type) in [
            (Destination::Hsm, KeyType::RsaHsm),
            (Destination::Software, KeyType::Rsa),
        ] {
            let request = builder
                .build(
                    params("v1", "k1"),
                    &KeyOperation::Create {
                        destination: Some(destination),
                    },
                )
                .unwrap();
            assert_eq!(request.attributes().key_type, Some(key_type));
        }

        let dir = TempDir::new().unwrap();
        let request = builder
            .build(
                params("v1", "k1"),
                &KeyOperation::Import {
                    key_file: key_file(&dir, "key.pfx"),
                    password: None,
                    destination: None,
                },
            )
            .unwrap();
        assert_eq!(request.attributes().key_type, None);
    }

    #[test]
    fn enabled_is_the_negation_of_disabled() {
        let (builder, _) = recording_builder();
        for disabled in [false, true] {
            let request = builder
                .build(
                    KeyRequestParams {
                        disabled,
                        ..params("v1", "k1")
                    },
                    &KeyOperation::Create {
                        destination: Some(Destination::Hsm),
                    },
                )
                .unwrap();
            assert_eq!(request.attributes().enabled, !disabled);
        }
    }

    #[test]
    fn missing_key_file() {
        let (builder, calls) = recording_builder();
        let dir = TempDir::new().unwrap();
        let err = builder
            .build(
                params("v1", "k2"),
                &KeyOperation::Import {
                    key_file: dir.path().join("missing.pfx"),
                    password: None,
                    destination: Some(Destination::Hsm),
                },
            )
            .unwrap_err();
        assert!(matches!(err, UtilsError::FileNotFound(_)), "{err}");
        assert!(calls.lock().unwrap().is_empty());

        // a directory is not a key file
        let err = builder
            .build(
                params("v1", "k2"),
                &KeyOperation::Import {
                    key_file: dir.path().to_path_buf(),
                    password: None,
                    destination: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, UtilsError::FileNotFound(_)), "{err}");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn hsm_flag_follows_the_destination() {
        let (builder, _) = recording_builder();
        let dir = TempDir::new().unwrap();
        let file = key_file(&dir, "key.pfx");
        let mut materials = Vec::new();
        for (destination, hsm) in [
            (Some(Destination::Hsm), Some(true)),
            (Some(Destination::Software), Some(false)),
            (None, None),
        ] {
            let request = builder
                .build(
                    params("v1", "k2"),
                    &KeyOperation::Import {
                        key_file: file.clone(),
                        password: None,
                        destination,
                    },
                )
                .unwrap();
            assert_eq!(request.hsm(), hsm);
            assert_eq!(
                request.attributes().key_type.map(KeyType::is_hsm),
                hsm,
                "key type and HSM flag come from the same destination"
            );
            materials.push(request.material().unwrap().clone());
        }
        assert!(materials.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn invalid_validity_window() {
        let (builder, _) = recording_builder();
        let now = OffsetDateTime::now_utc();
        let err = builder
            .build(
                KeyRequestParams {
                    not_before: Some(now),
                    expires: Some(now - Duration::hours(1)),
                    ..params("v1", "k1")
                },
                &KeyOperation::Create {
                    destination: Some(Destination::Software),
                },
            )
            .unwrap_err();
        assert!(matches!(err, UtilsError::Validation(_)));
    }

    #[test]
    fn scenario_create_software_key() {
        let (builder, calls) = recording_builder();
        let request = builder
            .build(
                KeyRequestParams {
                    disabled: false,
                    ..params("v1", "k1")
                },
                &KeyOperation::Create {
                    destination: Some(Destination::Software),
                },
            )
            .unwrap();
        assert_eq!(request.vault_name(), "v1");
        assert_eq!(request.key_name(), "k1");
        assert_eq!(request.attributes().key_type, Some(KeyType::Rsa));
        assert!(request.attributes().enabled);
        assert!(request.material().is_none());
        assert!(request.hsm().is_none());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn scenario_import_pfx_without_destination() {
        let (builder, calls) = recording_builder();
        let dir = TempDir::new().unwrap();
        let file = key_file(&dir, "key.pfx");
        let key_ops = vec![KeyUsage::Sign, KeyUsage::Verify];
        let request = builder
            .build(
                KeyRequestParams {
                    key_ops: Some(key_ops.clone()),
                    tags: Tags::from([("origin".to_owned(), "pfx".to_owned())]),
                    ..params("v1", "k2")
                },
                &KeyOperation::Import {
                    key_file: file.clone(),
                    password: Some(Zeroizing::new("p@ss".to_owned())),
                    destination: None,
                },
            )
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (file, Some("p@ss".to_owned())));

        let material = request.material().unwrap();
        assert_eq!(material.key_ops.as_deref(), Some(key_ops.as_slice()));
        assert!(request.hsm().is_none());
        assert!(request.attributes().key_type.is_none());
        assert_eq!(request.tags()["origin"], "pfx");
    }

    #[test]
    fn relative_key_file_is_resolved() {
        let relative = Path::new("no-such-dir").join("key.pfx");
        let err = resolve_key_file(&relative).unwrap_err();
        assert!(matches!(err, UtilsError::FileNotFound(_)));
        let absolute = std::env::current_dir().unwrap().join(&relative);
        assert!(
            err.to_string().contains(&absolute.display().to_string()),
            "{err}"
        );
    }

    #[test]
    fn import_with_the_default_converters() {
        let builder = KeyCreationRequestBuilder::default();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("key.pfx");
        write_rsa_pkcs12(&file, "p@ss");

        let request = builder
            .build(
                params("v1", "k2"),
                &KeyOperation::Import {
                    key_file: file.clone(),
                    password: Some(Zeroizing::new("p@ss".to_owned())),
                    destination: Some(Destination::Hsm),
                },
            )
            .unwrap();
        let material = request.material().unwrap();
        assert_eq!(material.kty, KeyType::Rsa);
        assert!(material.d.is_some());
        assert_eq!(request.hsm(), Some(true));

        let err = builder
            .build(
                params("v1", "k2"),
                &KeyOperation::Import {
                    key_file: file,
                    password: Some(Zeroizing::new("wrong".to_owned())),
                    destination: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, UtilsError::Decryption(_)));

        let unknown = key_file(&dir, "key.pem");
        let err = builder
            .build(
                params("v1", "k2"),
                &KeyOperation::Import {
                    key_file: unknown,
                    password: None,
                    destination: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, UtilsError::UnsupportedFormat(_)));
    }
}
