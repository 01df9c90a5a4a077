//! The REST mirror of the graph primitives.
//!
//! Every call is one POST of `{action, "graph-name", ...params}` to the
//! configured endpoint, answered with `{"success": <payload>}`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use roam_core::{
    Action, ActionParams, BasicBlock, BasicPage, BlockInput, Location, PageInput, QueryRows,
};

use crate::config::ClientOptions;
use crate::error::{RestError, Result};
use crate::transport::{HttpTransport, Transport};

#[derive(Serialize)]
struct Request<'a> {
    action: Action,
    #[serde(rename = "graph-name")]
    graph_name: &'a str,
    #[serde(flatten)]
    params: ActionParams,
}

/// Client for the hosted backend API.
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    graph_name: String,
    headers: Vec<(&'static str, String)>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("endpoint", &self.endpoint)
            .field("graph_name", &self.graph_name)
            .finish()
    }
}

impl RestClient {
    /// Build an HTTP client. Key and token not set in `options` are read
    /// from `ROAM_CLIENT_API_KEY` / `ROAM_CLIENT_API_TOKEN`; if either is
    /// still missing this fails before any request is made.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let options = options.with_env_fallback();
        options.credentials()?;
        Self::with_transport(options, Arc::new(HttpTransport::new()?))
    }

    /// Build over an arbitrary transport. No environment fallback happens
    /// here; `options` must already carry both credentials.
    pub fn with_transport(options: ClientOptions, transport: Arc<dyn Transport>) -> Result<Self> {
        let credentials = options.credentials()?;
        tracing::debug!(graph = %options.graph_name, endpoint = %options.endpoint, "REST client ready");
        Ok(Self {
            transport,
            endpoint: options.endpoint,
            graph_name: options.graph_name,
            headers: vec![
                ("x-api-key", credentials.api_key),
                ("x-api-token", credentials.api_token),
                ("Content-Type", options.content_type),
            ],
        })
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Pull `uid` with `selector`. The payload is returned as-is.
    pub async fn pull(&self, selector: &str, uid: &str) -> Result<Value> {
        self.call(
            Action::Pull,
            ActionParams {
                selector: Some(selector.to_string()),
                uid: Some(uid.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    /// Run a datalog query with positional inputs.
    pub async fn q(&self, query: &str, inputs: &[Value]) -> Result<QueryRows> {
        let payload = self
            .call(
                Action::Q,
                ActionParams {
                    query: Some(query.to_string()),
                    inputs: Some(inputs.to_vec()),
                    ..Default::default()
                },
            )
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    // ── Blocks ───────────────────────────────────────────────────

    pub async fn create_block(&self, location: &Location, block: &BlockInput) -> Result<BasicBlock> {
        let payload = self
            .call(
                Action::CreateBlock,
                ActionParams {
                    location: Some(location.clone()),
                    block: Some(block.clone()),
                    ..Default::default()
                },
            )
            .await?;
        let echo = match (&block.string, &block.uid) {
            (Some(string), Some(uid)) => Some(BasicBlock {
                string: string.clone(),
                uid: uid.clone(),
            }),
            _ => None,
        };
        decode_record(payload, echo)
    }

    /// Update text and/or open state of the block `block.uid`.
    pub async fn update_block(&self, block: &BlockInput) -> Result<bool> {
        let payload = self
            .call(
                Action::UpdateBlock,
                ActionParams {
                    block: Some(block.clone()),
                    ..Default::default()
                },
            )
            .await?;
        Ok(acknowledged(&payload))
    }

    pub async fn move_block(&self, uid: &str, location: &Location) -> Result<bool> {
        let payload = self
            .call(
                Action::MoveBlock,
                ActionParams {
                    location: Some(location.clone()),
                    block: Some(BlockInput::with_uid(uid)),
                    ..Default::default()
                },
            )
            .await?;
        Ok(acknowledged(&payload))
    }

    pub async fn delete_block(&self, uid: &str) -> Result<bool> {
        let payload = self
            .call(
                Action::DeleteBlock,
                ActionParams {
                    block: Some(BlockInput::with_uid(uid)),
                    ..Default::default()
                },
            )
            .await?;
        Ok(acknowledged(&payload))
    }

    // ── Pages ────────────────────────────────────────────────────

    pub async fn create_page(&self, page: &PageInput) -> Result<BasicPage> {
        let payload = self
            .call(
                Action::CreatePage,
                ActionParams {
                    page: Some(page.clone()),
                    ..Default::default()
                },
            )
            .await?;
        decode_record(payload, page_echo(page))
    }

    pub async fn update_page(&self, uid: &str, title: &str) -> Result<BasicPage> {
        let page = PageInput::new(Some(uid.to_string()), Some(title.to_string()));
        let payload = self
            .call(
                Action::UpdatePage,
                ActionParams {
                    page: Some(page.clone()),
                    ..Default::default()
                },
            )
            .await?;
        decode_record(payload, page_echo(&page))
    }

    pub async fn delete_page(&self, uid: &str) -> Result<bool> {
        let payload = self
            .call(
                Action::DeletePage,
                ActionParams {
                    page: Some(PageInput::new(Some(uid.to_string()), None)),
                    ..Default::default()
                },
            )
            .await?;
        Ok(acknowledged(&payload))
    }

    // ── Transport ────────────────────────────────────────────────

    /// POST one action and return its `success` payload.
    async fn call(&self, action: Action, params: ActionParams) -> Result<Value> {
        let body = serde_json::to_value(Request {
            action,
            graph_name: &self.graph_name,
            params,
        })?;

        tracing::debug!(action = %action, graph = %self.graph_name, "Roam API request");
        let response = self.transport.post(&self.endpoint, &self.headers, &body).await?;
        success_payload(response)
    }
}

fn success_payload(response: Value) -> Result<Value> {
    match response {
        Value::Object(mut map) => match map.remove("success") {
            Some(payload) => Ok(payload),
            None => Err(RestError::MissingPayload(
                map.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("response has no `success` key")
                    .to_string(),
            )),
        },
        other => Err(RestError::MissingPayload(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// The backend wraps created records in a one-element array.
fn unwrap_single(payload: Value) -> Value {
    match payload {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

/// Decode a record payload. A bare `true` means the write succeeded without
/// echoing the record; `echo` is returned then, if the request carried it.
fn decode_record<T: DeserializeOwned>(payload: Value, echo: Option<T>) -> Result<T> {
    match unwrap_single(payload) {
        Value::Bool(true) => echo.ok_or_else(|| {
            RestError::MissingPayload("write acknowledged without a record".to_string())
        }),
        record => Ok(serde_json::from_value(record)?),
    }
}

fn page_echo(page: &PageInput) -> Option<BasicPage> {
    Some(BasicPage {
        title: page.title.clone()?,
        uid: page.uid.clone()?,
    })
}

/// `false` and `null` are refusals; any other payload is an acknowledgement.
fn acknowledged(payload: &Value) -> bool {
    !matches!(payload, Value::Bool(false) | Value::Null)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_flattens_params() {
        let body = serde_json::to_value(Request {
            action: Action::Pull,
            graph_name: "MY_GRAPH",
            params: ActionParams {
                selector: Some("[*]".to_string()),
                uid: Some("abc".to_string()),
                ..Default::default()
            },
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"action": "pull", "graph-name": "MY_GRAPH", "selector": "[*]", "uid": "abc"})
        );
    }

    #[test]
    fn test_success_payload() {
        assert_eq!(success_payload(json!({"success": true})).unwrap(), json!(true));

        let err = success_payload(json!({"message": "Graph not found"})).unwrap_err();
        assert!(matches!(err, RestError::MissingPayload(ref m) if m == "Graph not found"));

        assert!(success_payload(json!("oops")).is_err());
    }

    #[test]
    fn test_decode_record_unwraps_single_element() {
        let block: BasicBlock =
            decode_record(json!([{"string": "text", "uid": "childUid"}]), None).unwrap();
        assert_eq!(block.uid, "childUid");

        let page: BasicPage = decode_record(json!({"title": "T", "uid": "u"}), None).unwrap();
        assert_eq!(page.title, "T");
    }

    #[test]
    fn test_decode_record_acknowledgement() {
        let echo = BasicPage {
            title: "T".to_string(),
            uid: "u".to_string(),
        };
        let page = decode_record(json!(true), Some(echo.clone())).unwrap();
        assert_eq!(page, echo);

        let missing = decode_record::<BasicPage>(json!(true), None);
        assert!(matches!(missing, Err(RestError::MissingPayload(_))));
    }

    #[test]
    fn test_acknowledged() {
        assert!(acknowledged(&json!(true)));
        assert!(acknowledged(&json!({"uid": "u"})));
        assert!(!acknowledged(&json!(false)));
        assert!(!acknowledged(&Value::Null));
    }
}
