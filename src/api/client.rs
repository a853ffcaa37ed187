//! Transport to the remote transaction service.

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;

use super::api_types::Operation;
use super::error::FetchError;

/// The single seam to the remote source.
///
/// Implementations issue exactly one remote call per `request`; caching
/// and retry policy live elsewhere.
pub trait Transport: Send + Sync {
  fn request(&self, operation: Operation, params: Value) -> BoxFuture<'static, Result<Value, FetchError>>;
}

/// HTTP transport: `POST {base_url}/{operation}` with the params as the
/// JSON body. An empty reply body decodes as `null`.
/// Clone is cheap, reqwest::Client shares its connection pool.
#[derive(Clone)]
pub struct HttpTransport {
  client: Client,
  base_url: Url,
}

impl HttpTransport {
  pub fn new(config: &ApiConfig) -> color_eyre::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;

    Ok(Self {
      client,
      base_url: config.base_url()?,
    })
  }

  fn endpoint(&self, operation: Operation) -> Result<Url, FetchError> {
    endpoint_url(&self.base_url, operation)
  }
}

/// Join an operation name onto the base URL, keeping any base path.
fn endpoint_url(base: &Url, operation: Operation) -> Result<Url, FetchError> {
  let mut base = base.clone();
  if !base.path().ends_with('/') {
    let path = format!("{}/", base.path());
    base.set_path(&path);
  }
  base
    .join(operation.as_str())
    .map_err(|e| FetchError::Transport(format!("Invalid endpoint for {}: {}", operation, e)))
}

impl Transport for HttpTransport {
  fn request(&self, operation: Operation, params: Value) -> BoxFuture<'static, Result<Value, FetchError>> {
    let client = self.client.clone();
    let url = self.endpoint(operation);

    async move {
      let url = url?;
      debug!(%url, %params, "Sending request");

      let response = client.post(url).json(&params).send().await?;

      let status = response.status();
      if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::from_status(status.as_u16(), &body));
      }

      let bytes = response.bytes().await?;
      if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
      }
      Ok(serde_json::from_slice(&bytes)?)
    }
    .boxed()
  }
}
