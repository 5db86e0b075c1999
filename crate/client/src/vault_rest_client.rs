use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, ClientBuilder, Method, Response,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, trace};
use url::Url;

use crate::{
    ClientError, ClientResult, client_bail, JsonWebKey, KeyAttributes, KeyBundle, Tags, VaultClient,
    VaultClientConfig,
    requests::{CreateKeyBody, ImportKeyBody},
};

/// A [`VaultClient`] speaking the vault REST API.
#[derive(Clone)]
pub struct VaultRestClient {
    config: VaultClientConfig,
    client: Client,
}

impl VaultRestClient {
    /// Instantiate a new REST client.
    ///
    /// # Errors
    /// - the access token cannot be used as a header value
    /// - the underlying HTTP client cannot be built
    pub fn new(config: VaultClientConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(access_token) = &config.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {access_token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = ClientBuilder::new()
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    #[must_use]
    pub const fn config(&self) -> &VaultClientConfig {
        &self.config
    }

    /// The base URL of the vault named `vault_name`.
    ///
    /// # Errors
    /// if the resulting URL is invalid
    pub fn vault_url(&self, vault_name: &str) -> ClientResult<Url> {
        let url = match &self.config.vault_url {
            Some(url) => Url::parse(url)?,
            None => Url::parse(&format!(
                "https://{vault_name}.{}",
                self.config.vault_dns_suffix
            ))?,
        };
        Ok(url)
    }

    fn keys_url(&self, vault_name: &str, segments: &[&str]) -> ClientResult<Url> {
        if segments.iter().any(|segment| segment.is_empty()) {
            client_bail!("the key name is empty: cannot address a key of the vault {vault_name}");
        }
        let mut url = self.vault_url(vault_name)?;
        let base = url.to_string();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ClientError::Configuration(format!("the vault URL {base} cannot be a base URL"))
            })?;
            path.pop_if_empty().push("keys").extend(segments);
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version);
        Ok(url)
    }

    async fn send<B, R>(&self, method: Method, url: Url, body: &B) -> ClientResult<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        // the body is not traced: it may hold private key material
        debug!("{method} {url}");
        let response = self.client.request(method, url).json(body).send().await?;
        handle_response(response).await
    }
}

#[async_trait]
impl VaultClient for VaultRestClient {
    async fn create_key(
        &self,
        vault_name: &str,
        key_name: &str,
        attributes: &KeyAttributes,
        tags: &Tags,
    ) -> ClientResult<KeyBundle> {
        let url = self.keys_url(vault_name, &[key_name, "create"])?;
        let body = CreateKeyBody::new(attributes, tags);
        trace!("create key request: {body:?}");
        self.send(Method::POST, url, &body).await
    }

    async fn import_key(
        &self,
        vault_name: &str,
        key_name: &str,
        attributes: &KeyAttributes,
        tags: &Tags,
        material: &JsonWebKey,
        hsm: Option<bool>,
    ) -> ClientResult<KeyBundle> {
        let url = self.keys_url(vault_name, &[key_name])?;
        let body = ImportKeyBody::new(material, hsm, attributes, tags);
        self.send(Method::PUT, url, &body).await
    }
}

/// The error document returned by the vault
#[derive(Deserialize)]
struct VaultErrorBody {
    error: VaultError,
}

#[derive(Deserialize)]
struct VaultError {
    code: Option<String>,
    message: String,
}

async fn handle_response<R: DeserializeOwned>(response: Response) -> ClientResult<R> {
    let status_code = response.status();
    if status_code.is_success() {
        return response
            .json::<R>()
            .await
            .map_err(|e| ClientError::ResponseFailed(e.to_string()));
    }

    let body = response.text().await?;
    let message = match serde_json::from_str::<VaultErrorBody>(&body) {
        Ok(VaultErrorBody {
            error: VaultError {
                code: Some(code),
                message,
            },
        }) => format!("{code}: {message}"),
        Ok(VaultErrorBody { error }) => error.message,
        Err(_) if body.is_empty() => "no details".to_owned(),
        Err(_) => body,
    };
    Err(ClientError::RequestFailed(format!("{status_code}: {message}")))
}
