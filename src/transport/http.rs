use crate::config::AgentConfig;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::{stream, Stream, StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use url::Url;

/// Header the warehouse gateway uses to tell OAuth tokens from key-pair JWTs.
const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

/// Thin wrapper over a pooled `reqwest::Client`.
///
/// Timeouts are applied per request so the streaming and one-shot calls can share
/// the same connection pool while keeping their own bounds.
pub struct HttpTransport {
    client: reqwest::Client,
    /// Idle bound on the event stream: the wait for the response head and for each
    /// later chunk. A run that keeps sending events is never cut off.
    stream_timeout: Duration,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(
                env::var("LOADSTAR_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            // Agent runs can sit silent for a while between tool calls.
            .http2_keep_alive_interval(Some(Duration::from_secs(30)))
            .http2_keep_alive_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = config.proxy_url.as_deref() {
            if let Ok(proxy) = Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            stream_timeout: config.stream_timeout,
            request_timeout: config.request_timeout,
        })
    }

    fn post(&self, url: &Url, token: &str, body: &serde_json::Value, request_id: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url.clone())
            .bearer_auth(token)
            .header(TOKEN_TYPE_HEADER, "OAUTH")
            .header(CONTENT_TYPE, "application/json")
            // Our own correlation id. The agent ignores it, but it ties log lines together.
            .header("x-request-id", request_id)
            .json(body)
    }

    /// POST `body` and return the raw `text/event-stream` body as bytes.
    ///
    /// Non-200 responses are surfaced as [`Error::Remote`] before any byte is read.
    /// If the server goes quiet for longer than the stream timeout, the stream
    /// yields [`TransportError::Timeout`] and ends. Dropping the returned stream
    /// releases the connection.
    pub async fn open_event_stream(
        &self,
        url: &Url,
        token: &str,
        body: &serde_json::Value,
        request_id: &str,
    ) -> Result<BoxStream<'static, Bytes>> {
        let request = self
            .post(url, token, body, request_id)
            .header(ACCEPT, "text/event-stream")
            .send();
        let resp = tokio::time::timeout(self.stream_timeout, request)
            .await
            .map_err(|_| Error::Transport(TransportError::Timeout))?
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Remote {
                status: status.as_u16(),
                body: None,
            });
        }

        let byte_stream = resp
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(with_idle_timeout(byte_stream, self.stream_timeout))
    }

    /// POST `body` and decode the JSON response.
    pub async fn post_json(
        &self,
        url: &Url,
        token: &str,
        body: &serde_json::Value,
        request_id: &str,
    ) -> Result<serde_json::Value> {
        let resp = self
            .post(url, token, body, request_id)
            .header(ACCEPT, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.ok();
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))
    }
}

/// End `inner` with [`TransportError::Timeout`] once no item arrives within `idle`.
fn with_idle_timeout<S>(inner: S, idle: Duration) -> BoxStream<'static, Bytes>
where
    S: Stream<Item = Result<Bytes>> + Send + 'static,
{
    let timed = stream::unfold(Some(Box::pin(inner)), move |state| async move {
        let mut inner = state?;
        match tokio::time::timeout(idle, inner.next()).await {
            Ok(Some(item)) => Some((item, Some(inner))),
            Ok(None) => None,
            Err(_) => Some((Err(Error::Transport(TransportError::Timeout)), None)),
        }
    });
    Box::pin(timed)
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No response head or event chunk within the stream timeout.
    #[error("request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Other(String),
}
