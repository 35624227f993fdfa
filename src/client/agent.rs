use super::response::answer_or_placeholder;
use crate::config::AgentConfig;
use crate::pipeline::{AgentStream, Pipeline, ReducerOptions};
use crate::session::ChatSession;
use crate::transport::{read_token, HttpTransport};
use crate::types::AgentRequest;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// Client for one agent endpoint.
///
/// Cheap to clone; the HTTP connection pool is shared.
#[derive(Clone)]
pub struct AgentClient {
    config: AgentConfig,
    transport: Arc<HttpTransport>,
    pipeline: Pipeline,
}

impl AgentClient {
    pub fn new(config: AgentConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self {
            config,
            transport,
            pipeline: Pipeline::default(),
        })
    }

    /// Client configured from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(AgentConfig::from_env())
    }

    /// Change how reasoning is attributed in streamed answers.
    pub fn with_reducer_options(mut self, options: ReducerOptions) -> Self {
        self.pipeline = Pipeline::new(options);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Endpoint and token, or the configuration error that makes the agent unavailable.
    async fn prepare(&self) -> Result<(Url, String)> {
        let url = self.config.endpoint_url()?;
        let token = read_token(&self.config.token_path).await?;
        Ok((url, token))
    }

    async fn open(&self, question: &str, context: Option<&str>, request_id: &str) -> Result<AgentStream> {
        let (url, token) = self.prepare().await?;
        let body = serde_json::to_value(AgentRequest::question(question, context, true))?;
        let bytes = self
            .transport
            .open_event_stream(&url, &token, &body, request_id)
            .await?;
        Ok(self.pipeline.process_stream(bytes))
    }

    /// Ask a question and stream `(mode, text)` emissions.
    ///
    /// Never fails: a missing host or token, a non-200 status or a connection error
    /// yields a stream with one explanatory answer. No connection is opened when
    /// the configuration is incomplete.
    pub async fn ask_stream(&self, question: &str, context: Option<&str>) -> AgentStream {
        let request_id = Uuid::new_v4().to_string();
        info!(%request_id, context = context.unwrap_or(""), "agent stream requested");
        match self.open(question, context, &request_id).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%request_id, error = %err, "agent stream could not be opened");
                AgentStream::failed(err, self.pipeline.options())
            }
        }
    }

    /// Ask within a chat session, scoped to the session's broker context.
    ///
    /// Records the user turn; record the assistant turn from the stream's
    /// transcript once it ends.
    pub async fn ask_in_session(&self, session: &mut ChatSession, question: &str) -> AgentStream {
        session.push_user(question);
        self.ask_stream(question, session.context()).await
    }

    async fn ask_inner(&self, question: &str, context: Option<&str>, request_id: &str) -> Result<String> {
        let (url, token) = self.prepare().await?;
        let body = serde_json::to_value(AgentRequest::question(question, context, false))?;
        let response = self
            .transport
            .post_json(&url, &token, &body, request_id)
            .await?;
        Ok(answer_or_placeholder(&response))
    }

    /// Non-streaming fallback. Always returns displayable text.
    pub async fn ask(&self, question: &str, context: Option<&str>) -> String {
        let request_id = Uuid::new_v4().to_string();
        info!(%request_id, "agent request");
        match self.ask_inner(question, context, &request_id).await {
            Ok(answer) => answer,
            Err(err) => {
                log_failure(&request_id, &err);
                err.answer_text()
            }
        }
    }
}

fn log_failure(request_id: &str, err: &Error) {
    match err {
        Error::Remote { status, body } => warn!(
            %request_id,
            status,
            body = body.as_deref().unwrap_or(""),
            "agent returned non-success status"
        ),
        other => warn!(%request_id, error = %other, "agent request failed"),
    }
}
