//! Amazon Bedrock Agent Runtime (`InvokeAgent`) over HTTPS.

use std::str::FromStr;

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use futures::StreamExt;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::sigv4::uri_encode;
use crate::auth::{AwsCredentials, RequestSigner, SignableRequest};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::eventstream::{Message, MessageDecoder, EVENT_TYPE, EXCEPTION_TYPE, MESSAGE_TYPE};
use crate::session::SessionId;
use crate::types::{AgentEvent, ContentChunk, EventKind, InvokeRequest, TraceRecord};

use super::http::{exception_to_error, shared_client, status_to_error};
use super::{AgentRuntime, Invocation};

const SIGNING_SERVICE: &str = "bedrock";
const SESSION_ID_HEADER: &str = "x-amz-bedrock-agent-session-id";
const EVENTSTREAM_CONTENT_TYPE: &str = "application/vnd.amazon.eventstream";

pub struct BedrockAgentRuntime {
    endpoint: Url,
    signer: RequestSigner,
}

impl BedrockAgentRuntime {
    pub fn new(config: &AgentConfig, credentials: AwsCredentials) -> Result<Self, AgentError> {
        let endpoint_url = config.endpoint_url();
        let endpoint = Url::parse(&endpoint_url).map_err(|e| {
            AgentError::Configuration(format!("invalid endpoint {endpoint_url}: {e}"))
        })?;
        Ok(Self {
            endpoint,
            signer: RequestSigner::new(credentials, config.region.clone(), SIGNING_SERVICE),
        })
    }

    /// Build a runtime with credentials from the process environment.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        Self::new(config, AwsCredentials::from_env()?)
    }

    fn invoke_path(request: &InvokeRequest) -> String {
        format!(
            "/agents/{}/agentAliases/{}/sessions/{}/text",
            uri_encode(&request.agent.agent_id),
            uri_encode(&request.agent.agent_alias_id),
            uri_encode(request.session_id.as_str()),
        )
    }

    fn host(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    fn runtime_name(&self) -> &str {
        "bedrock"
    }

    async fn invoke_agent(&self, request: &InvokeRequest) -> Result<Invocation, AgentError> {
        let path = Self::invoke_path(request);
        let base = self.endpoint.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}{path}"))
            .map_err(|e| AgentError::InvalidArgument(format!("cannot build request URL: {e}")))?;
        let body = serde_json::to_vec(&request.body())?;

        let host = self.host();
        let signable = SignableRequest {
            method: "POST",
            host: &host,
            path: &path,
            headers: vec![("content-type", "application/json")],
            payload: &body,
        };
        let signed = self.signer.sign(&signable, Utc::now())?;

        debug!(url = %url, bytes = body.len(), "Bedrock invoke_agent");

        let mut builder = shared_client()
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, EVENTSTREAM_CONTENT_TYPE);
        for (name, value) in signed {
            builder = builder.header(name, value);
        }

        let resp = builder.body(body).send().await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let session_id = resp
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| SessionId::from_str(v).ok())
            .unwrap_or_else(|| request.session_id.clone());

        let byte_stream = resp.bytes_stream();

        let events = async_stream::stream! {
            let mut decoder = MessageDecoder::new();
            futures::pin_mut!(byte_stream);

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(AgentError::Network(e));
                        break 'read;
                    }
                };
                decoder.push(&chunk);

                loop {
                    match decoder.next_message() {
                        Ok(Some(message)) => match message_to_event(message) {
                            Ok(event) => yield Ok(event),
                            Err(e) => {
                                yield Err(e);
                                break 'read;
                            }
                        },
                        Ok(None) => break,
                        Err(e) => {
                            yield Err(e);
                            break 'read;
                        }
                    }
                }
            }

            if !decoder.is_empty() {
                warn!("event stream closed inside a message frame");
                yield Err(AgentError::Stream("connection closed mid-message".into()));
            }
        };

        Ok(Invocation {
            session_id,
            events: Box::pin(events),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    bytes: Option<String>,
}

/// Translate one wire message into an event, or the error it carries.
pub(crate) fn message_to_event(message: Message) -> Result<AgentEvent, AgentError> {
    match message.header_str(MESSAGE_TYPE) {
        Some("event") => {}
        Some("exception") => {
            let exception = message.header_str(EXCEPTION_TYPE).unwrap_or("unknownException");
            return Err(exception_to_error(exception, &message.payload));
        }
        Some("error") => {
            return Err(AgentError::Service {
                exception: message.header_str(":error-code").unwrap_or("error").to_string(),
                message: message.header_str(":error-message").unwrap_or_default().to_string(),
            });
        }
        other => {
            return Ok(AgentEvent::Unrecognized {
                kind: other.unwrap_or("<missing message type>").to_string(),
            });
        }
    }

    let kind = message.header_str(EVENT_TYPE).unwrap_or_default();
    match EventKind::from_str(kind) {
        Ok(EventKind::Chunk) => {
            let payload: ChunkPayload = serde_json::from_slice(&message.payload)?;
            let bytes = match payload.bytes {
                Some(encoded) => base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| AgentError::Protocol(format!("chunk bytes are not base64: {e}")))?,
                None => Vec::new(),
            };
            Ok(AgentEvent::Chunk(ContentChunk { bytes }))
        }
        Ok(EventKind::Trace) => {
            let value = serde_json::from_slice(&message.payload).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&message.payload).into_owned())
            });
            Ok(AgentEvent::Trace(TraceRecord(value)))
        }
        _ => Ok(AgentEvent::Unrecognized {
            kind: kind.to_string(),
        }),
    }
}
