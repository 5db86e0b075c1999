use std::path::Path;

use keyvault_client::{JsonWebKey, RsaComponents, read_bytes_from_file};
use keyvault_logger::debug;
use openssl::{bn::BigNumRef, pkcs12::Pkcs12};

use crate::{
    error::{UtilsError, UtilsResult},
    import_utils::{KeyFileConverter, has_extension},
};

/// Converts PKCS#12 (`.pfx`, `.p12`) bundles holding an RSA private key.
///
/// A missing password is tried as the empty password.
pub struct Pkcs12Converter;

impl Pkcs12Converter {
    const EXTENSIONS: [&'static str; 2] = ["pfx", "p12"];
}

impl KeyFileConverter for Pkcs12Converter {
    fn name(&self) -> &'static str {
        "PKCS#12"
    }

    fn try_decode(
        &self,
        key_file: &Path,
        password: Option<&str>,
    ) -> UtilsResult<Option<JsonWebKey>> {
        if !has_extension(key_file, &Self::EXTENSIONS) {
            return Ok(None);
        }
        let der_bytes = read_bytes_from_file(&key_file)?;
        let components = rsa_components_from_pkcs12(key_file, &der_bytes, password)?;
        Ok(Some(JsonWebKey::from_rsa_components(&components)))
    }
}

/// Open a PKCS#12 bundle and extract the components of its RSA private key.
fn rsa_components_from_pkcs12(
    key_file: &Path,
    der_bytes: &[u8],
    password: Option<&str>,
) -> UtilsResult<RsaComponents> {
    let sealed_p12 = Pkcs12::from_der(der_bytes).map_err(|e| {
        UtilsError::UnsupportedFormat(format!(
            "{} is not a valid PKCS#12 file: {e}",
            key_file.display()
        ))
    })?;
    let p12 = sealed_p12
        .parse2(password.unwrap_or_default())
        .map_err(|e| {
            UtilsError::Decryption(match password {
                Some(_) => format!("wrong password for {}: {e}", key_file.display()),
                None => format!(
                    "a password is required to decrypt {}: {e}",
                    key_file.display()
                ),
            })
        })?;
    let pkey = p12.pkey.ok_or_else(|| {
        UtilsError::UnsupportedFormat(format!(
            "{} does not contain a private key",
            key_file.display()
        ))
    })?;
    let rsa = pkey.rsa().map_err(|_e| {
        UtilsError::UnsupportedFormat(format!(
            "the private key in {} is a {:?} key: only RSA keys can be imported",
            key_file.display(),
            pkey.id()
        ))
    })?;
    debug!(
        "PKCS#12 file {}: {} bits RSA key, certificate present: {}",
        key_file.display(),
        rsa.size() * 8,
        p12.cert.is_some()
    );

    let component = |value: Option<&BigNumRef>, name: &str| {
        value.map(BigNumRef::to_vec).ok_or_else(|| {
            UtilsError::UnsupportedFormat(format!(
                "the RSA key in {} has no {name} component",
                key_file.display()
            ))
        })
    };
    Ok(RsaComponents {
        n: rsa.n().to_vec(),
        e: rsa.e().to_vec(),
        d: rsa.d().to_vec(),
        p: component(rsa.p(), "p")?,
        q: component(rsa.q(), "q")?,
        dp: component(rsa.dmp1(), "dp")?,
        dq: component(rsa.dmq1(), "dq")?,
        qi: component(rsa.iqmp(), "qi")?,
    })
}
