//! HTTP client for the PassKeeper API
//!
//! Wraps the account and secret endpoints. The token returned by register or
//! login is kept on the client and sent raw in the `Authorization` header.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::account::{Credentials, RegisteredAccount};
use crate::domain::{CreditCard, KeyValue, Secret, SecretId, SecretRequest, SecretType, Text};
use crate::secrets::{codec, FileInfo, SecretError};

/// Errors returned by [`PassKeeperClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-200 status
    #[error("request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("HTTP transport error")]
    Transport(#[from] reqwest::Error),

    #[error("failed to encode request")]
    Encode(#[from] serde_json::Error),

    #[error("{context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    #[error(transparent)]
    Codec(#[from] SecretError),

    /// The operation needs a token but the client has none
    #[error("not logged in")]
    MissingToken,

    #[error("{0}")]
    InvalidInput(String),
}

impl ClientError {
    /// HTTP status carried by a [`ClientError::Status`]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server (e.g. "http://127.0.0.1:8080")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: "http://127.0.0.1:8080".to_string(), timeout: 30 }
    }
}

#[derive(Debug, Clone)]
pub struct PassKeeperClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl PassKeeperClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout)).build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url, token: None })
    }

    /// Use a previously issued token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(builder.header(AUTHORIZATION, token))
    }

    /// Create an account and keep the issued token.
    pub async fn register(
        &mut self,
        login: &str,
        password: &str,
    ) -> ClientResult<RegisteredAccount> {
        let response = self
            .client
            .post(self.url("/api/account/register"))
            .json(&Credentials::new(login, password))
            .send()
            .await?;
        let header_token = token_from_header(&response);
        let account: RegisteredAccount = expect_json(response).await?;

        self.token = Some(header_token.unwrap_or_else(|| account.token.clone()));
        Ok(account)
    }

    /// Log in and keep the issued token. Returns the token.
    pub async fn login(&mut self, login: &str, password: &str) -> ClientResult<String> {
        let response = self
            .client
            .post(self.url("/api/account/login"))
            .json(&Credentials::new(login, password))
            .send()
            .await?;
        let header_token = token_from_header(&response);
        let body_token: String = expect_json(response).await?;

        let token = header_token.unwrap_or(body_token);
        self.token = Some(token.clone());
        Ok(token)
    }

    pub async fn list_secrets(&self) -> ClientResult<Vec<Secret>> {
        let request = self.authorized(self.client.get(self.url("/api/secrets")))?;
        expect_json(request.send().await?).await
    }

    pub async fn get_secret(&self, id: SecretId) -> ClientResult<Secret> {
        let request = self.authorized(self.client.get(self.url(&format!("/api/secret/{}", id))))?;
        expect_json(request.send().await?).await
    }

    pub async fn delete_secret(&self, id: SecretId) -> ClientResult<()> {
        let request =
            self.authorized(self.client.delete(self.url(&format!("/api/secret/{}", id))))?;
        let response = request.send().await?;
        ensure_success(response).await.map(|_| ())
    }

    /// Send a raw write request (id 0 creates, anything else overwrites).
    pub async fn post_secret(&self, request: &SecretRequest) -> ClientResult<Secret> {
        debug!(secret_type = %request.secret_type, secret_id = request.id, "posting secret");
        let builder = self.authorized(self.client.post(self.url("/api/secret")))?;
        expect_json(builder.json(request).send().await?).await
    }

    pub async fn post_text(&self, text: Text, meta: &str) -> ClientResult<Secret> {
        self.post_structured(SecretType::Text, &text, meta).await
    }

    pub async fn post_key_value(&self, key_value: KeyValue, meta: &str) -> ClientResult<Secret> {
        self.post_structured(SecretType::KeyValue, &key_value, meta).await
    }

    pub async fn post_credit_card(&self, card: CreditCard, meta: &str) -> ClientResult<Secret> {
        self.post_structured(SecretType::CreditCard, &card, meta).await
    }

    async fn post_structured<T: Serialize>(
        &self,
        secret_type: SecretType,
        data: &T,
        meta: &str,
    ) -> ClientResult<Secret> {
        let request = SecretRequest {
            secret_type: secret_type.as_str().to_string(),
            data: serde_json::to_value(data)?,
            meta: meta.to_string(),
            ..Default::default()
        };
        self.post_secret(&request).await
    }

    /// Upload a file as a `ByteSlice` secret.
    ///
    /// The metadata records `name|extension|description` so the file can be
    /// restored with [`save_binary_secret`].
    pub async fn post_file(&self, path: &Path, description: &str) -> ClientResult<Secret> {
        let info = file_info_for(path, description)?;
        let contents = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            source,
            context: format!("failed to read {}", path.display()),
        })?;

        let request = SecretRequest {
            secret_type: SecretType::ByteSlice.as_str().to_string(),
            byte_data: Some(STANDARD.encode(contents)),
            meta: info.to_metadata(),
            ..Default::default()
        };
        self.post_secret(&request).await
    }
}

fn file_info_for(path: &Path, description: &str) -> ClientResult<FileInfo> {
    let name = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    let description = if description.trim().is_empty() { name } else { description.trim() };

    let info = FileInfo::new(name, extension, description);
    if FileInfo::parse(&info.to_metadata()).as_ref() != Some(&info) {
        return Err(ClientError::InvalidInput(format!(
            "{} needs a name and an extension without '|'",
            path.display()
        )));
    }
    Ok(info)
}

/// Write a binary secret to `dir/name.extension` and return the path.
///
/// Non-binary secrets and metadata outside the file convention are refused.
pub async fn save_binary_secret(dir: &Path, secret: &Secret) -> ClientResult<PathBuf> {
    if secret.secret_type != SecretType::ByteSlice.as_str() {
        return Err(ClientError::InvalidInput(format!(
            "secret {} is a {} secret, not a file",
            secret.id, secret.secret_type
        )));
    }

    let info = FileInfo::parse(&secret.metadata).ok_or_else(|| {
        ClientError::InvalidInput(format!("secret {} has no file name in its metadata", secret.id))
    })?;

    let bytes = match codec::decode_typed(SecretType::ByteSlice, &secret.value)? {
        crate::domain::SecretVariant::ByteSlice(bytes) => bytes,
        _ => return Err(ClientError::InvalidInput("unexpected payload".to_string())),
    };

    let file_name = info.file_name();
    let plain = [info.name.as_str(), info.extension.as_str(), file_name.as_str()]
        .into_iter()
        .all(is_plain_file_name);
    if !plain {
        return Err(ClientError::InvalidInput(format!(
            "secret {} names a file outside the target directory: {}",
            secret.id, file_name
        )));
    }

    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await.map_err(|source| ClientError::Io {
        source,
        context: format!("failed to write {}", path.display()),
    })?;
    Ok(path)
}

/// True when `name` is a single normal path component.
fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

fn token_from_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    debug!(%status, "response received");

    if status != StatusCode::OK {
        let message = response.text().await.unwrap_or_else(|_| "<unable to read error>".into());
        return Err(ClientError::Status { status, message });
    }
    Ok(response)
}

async fn expect_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    Ok(ensure_success(response).await?.json::<T>().await?)
}
