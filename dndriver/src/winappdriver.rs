use crate::engine::{AutomationEngine, Connector, ElementId, SessionOptions};
use crate::errors::AutomationError;
use crate::selector::Selector;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Legacy JSON wire protocol status for "no such element"
const STATUS_NO_SUCH_ELEMENT: i64 = 7;
/// W3C web element identifier key
const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Connects to a WinAppDriver (or Appium Windows driver) endpoint
#[derive(Debug, Clone)]
pub struct WinAppDriver {
    base_url: String,
}

/// Reply envelope. WinAppDriver speaks the legacy JSON wire protocol
/// (`status` + top-level `sessionId`), newer drivers speak W3C where
/// everything lives in `value`.
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    status: Option<i64>,
    #[serde(default)]
    value: Value,
}

#[derive(Debug)]
enum WireError {
    NoSuchElement,
    Other(AutomationError),
}

impl From<AutomationError> for WireError {
    fn from(e: AutomationError) -> Self {
        WireError::Other(e)
    }
}

impl WinAppDriver {
    /// Create a connector for the endpoint, e.g. `http://127.0.0.1:4723`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            base_url: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Connector for WinAppDriver {
    #[instrument(skip(self, options), fields(endpoint = %self.base_url, app = %options.app.display()))]
    async fn open(
        &self,
        options: &SessionOptions,
    ) -> Result<Arc<dyn AutomationEngine>, AutomationError> {
        // a zero command timeout means calls are not bounded
        let mut builder = reqwest::Client::builder();
        if !options.command_timeout.is_zero() {
            builder = builder.timeout(options.command_timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AutomationError::Connection(format!("Failed to build HTTP client: {e}")))?;

        let mut capabilities = json!({ "app": options.app.to_string_lossy() });
        if !options.launch_timeout.is_zero() {
            capabilities["ms:waitForAppLaunch"] =
                Value::String(options.launch_timeout.as_secs().to_string());
        }
        let body = json!({
            "desiredCapabilities": capabilities,
            "capabilities": { "alwaysMatch": capabilities },
        });

        // Launching waits on the app's window, so give it the launch budget on top.
        let mut request = client.post(format!("{}/session", self.base_url)).json(&body);
        if !options.command_timeout.is_zero() {
            request = request
                .timeout(options.launch_timeout.saturating_add(options.command_timeout));
        }
        let response = request
            .send()
            .await
            .map_err(|e| {
                AutomationError::Connection(format!(
                    "Failed to reach {}: {e}",
                    self.base_url
                ))
            })?;

        let reply = decode(response).await.map_err(|e| match e {
            WireError::NoSuchElement => {
                AutomationError::Connection("Application window not found".to_string())
            }
            WireError::Other(e) => e,
        })?;

        let session_id = reply
            .session_id
            .or_else(|| {
                reply
                    .value
                    .get("sessionId")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .ok_or_else(|| {
                AutomationError::Protocol("Session reply carried no session id".to_string())
            })?;

        info!(session_id = %session_id, "Remote session opened");
        Ok(Arc::new(WinAppDriverSession {
            client,
            session_url: format!("{}/session/{}", self.base_url, session_id),
        }))
    }
}

/// One live WinAppDriver session
pub struct WinAppDriverSession {
    client: reqwest::Client,
    session_url: String,
}

impl WinAppDriverSession {
    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WireError> {
        let url = format!("{}{}", self.session_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AutomationError::Connection(format!("Request to {url} failed: {e}")))?;
        Ok(decode(response).await?.value)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, AutomationError> {
        self.send(reqwest::Method::POST, path, Some(body))
            .await
            .map_err(|e| match e {
                WireError::NoSuchElement => {
                    AutomationError::ElementNotFound(format!("Element went away during {path}"))
                }
                WireError::Other(e) => e,
            })
    }
}

#[async_trait::async_trait]
impl AutomationEngine for WinAppDriverSession {
    async fn find_element(
        &self,
        selector: &Selector,
        root: Option<&str>,
    ) -> Result<Option<ElementId>, AutomationError> {
        let (using, value) = selector
            .strategy()
            .ok_or_else(|| AutomationError::InvalidSelector(selector.to_string()))?;
        let path = match root {
            Some(parent) => format!("/element/{parent}/element"),
            None => "/element".to_string(),
        };

        match self
            .send(
                reqwest::Method::POST,
                &path,
                Some(json!({ "using": using, "value": value })),
            )
            .await
        {
            Ok(value) => element_id(&value).map(Some),
            Err(WireError::NoSuchElement) => Ok(None),
            Err(WireError::Other(e)) => Err(e),
        }
    }

    async fn click(&self, element: &str) -> Result<(), AutomationError> {
        self.post(&format!("/element/{element}/click"), json!({}))
            .await
            .map(|_| ())
    }

    async fn clear(&self, element: &str) -> Result<(), AutomationError> {
        self.post(&format!("/element/{element}/clear"), json!({}))
            .await
            .map(|_| ())
    }

    async fn send_keys(&self, element: &str, text: &str) -> Result<(), AutomationError> {
        // legacy drivers read `value`, W3C drivers read `text`
        self.post(
            &format!("/element/{element}/value"),
            json!({ "value": [text], "text": text }),
        )
        .await
        .map(|_| ())
    }

    async fn close(&self) -> Result<(), AutomationError> {
        let window = self.send(reqwest::Method::DELETE, "/window", None).await;
        if let Err(WireError::Other(e)) = &window {
            warn!("Closing application window failed: {}", e);
        }
        match self.send(reqwest::Method::DELETE, "", None).await {
            Ok(_) => {
                debug!("Remote session deleted");
                Ok(())
            }
            Err(WireError::NoSuchElement) => Ok(()),
            Err(WireError::Other(e)) => Err(e),
        }
    }
}

async fn decode(response: reqwest::Response) -> Result<WireResponse, WireError> {
    let http_status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AutomationError::Connection(format!("Failed to read reply: {e}")))?;

    let reply: WireResponse = match serde_json::from_str(&text) {
        Ok(reply) => reply,
        Err(_) if http_status == reqwest::StatusCode::NOT_FOUND => {
            return Err(WireError::NoSuchElement)
        }
        Err(e) => {
            return Err(AutomationError::Protocol(format!(
                "Unreadable reply ({http_status}): {e}"
            ))
            .into())
        }
    };

    if let Some(error) = reply.value.get("error").and_then(Value::as_str) {
        if error == "no such element" {
            return Err(WireError::NoSuchElement);
        }
        let message = reply
            .value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(AutomationError::Protocol(format!("{error}: {message}")).into());
    }

    match reply.status {
        Some(0) | None if http_status.is_success() => Ok(reply),
        Some(STATUS_NO_SUCH_ELEMENT) => Err(WireError::NoSuchElement),
        None if http_status == reqwest::StatusCode::NOT_FOUND => Err(WireError::NoSuchElement),
        status => {
            let message = reply
                .value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Err(AutomationError::Protocol(format!(
                "Endpoint replied {http_status} (status {status:?}): {message}"
            ))
            .into())
        }
    }
}

fn element_id(value: &Value) -> Result<ElementId, AutomationError> {
    value
        .get("ELEMENT")
        .or_else(|| value.get(W3C_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AutomationError::Protocol(format!("Reply carried no element id: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_accepts_both_protocols() {
        assert_eq!(
            element_id(&json!({ "ELEMENT": "42.1" })).unwrap(),
            "42.1"
        );
        assert_eq!(
            element_id(&json!({ W3C_ELEMENT_KEY: "abc" })).unwrap(),
            "abc"
        );
        assert!(element_id(&json!({})).is_err());
    }

    #[test]
    fn test_endpoint_trailing_slash_is_dropped() {
        assert_eq!(
            WinAppDriver::new("http://127.0.0.1:4723/").endpoint(),
            "http://127.0.0.1:4723"
        );
    }
}
